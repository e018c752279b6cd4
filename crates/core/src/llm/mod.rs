pub mod anthropic;
pub mod error;
pub mod json;
pub mod openai;

use crate::config::Settings;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
    Disabled,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAI => "openai",
            Provider::Disabled => "disabled",
        }
    }
}

/// Text completion service used for ticker inference, news summaries and advice.
#[async_trait::async_trait]
pub trait IntelligenceGateway: Send + Sync {
    fn provider(&self) -> Provider;

    /// Whether a credential was configured. Callers skip straight to their
    /// deterministic fallback when this is false.
    fn is_available(&self) -> bool {
        true
    }

    async fn complete(&self, system_prompt: &str, context: &str) -> anyhow::Result<String>;
}

/// Stand-in used when no provider credential is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledIntelligence;

#[async_trait::async_trait]
impl IntelligenceGateway for DisabledIntelligence {
    fn provider(&self) -> Provider {
        Provider::Disabled
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn complete(&self, _system_prompt: &str, _context: &str) -> anyhow::Result<String> {
        anyhow::bail!("no intelligence provider configured")
    }
}

/// Picks the provider named by `INTELLIGENCE_PROVIDER`, else the first configured key
/// (Anthropic before OpenAI), else [`DisabledIntelligence`].
pub fn from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn IntelligenceGateway>> {
    let choice = settings
        .intelligence_provider
        .as_deref()
        .map(|s| s.trim().to_ascii_lowercase());

    let gateway: Arc<dyn IntelligenceGateway> = match choice.as_deref() {
        Some("none") | Some("disabled") => Arc::new(DisabledIntelligence),
        Some("anthropic") => Arc::new(anthropic::AnthropicClient::from_settings(settings)?),
        Some("openai") => Arc::new(openai::OpenAiClient::from_settings(settings)?),
        Some(other) => anyhow::bail!("unknown INTELLIGENCE_PROVIDER: {other}"),
        None if settings.anthropic_api_key.is_some() => {
            Arc::new(anthropic::AnthropicClient::from_settings(settings)?)
        }
        None if settings.openai_api_key.is_some() => {
            Arc::new(openai::OpenAiClient::from_settings(settings)?)
        }
        None => Arc::new(DisabledIntelligence),
    };

    tracing::info!(
        provider = ?gateway.provider(),
        available = gateway.is_available(),
        "intelligence gateway configured"
    );
    Ok(gateway)
}
