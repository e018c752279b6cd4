pub mod advice;
pub mod domain;
pub mod error;
pub mod llm;
pub mod market;
pub mod news;
pub mod pipeline;
pub mod portfolio;
pub mod resolve;
pub mod scoring;
pub mod services;
pub mod storage;
pub mod summary;

mod call;
#[cfg(test)]
mod testing;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_CALL_TIMEOUT_SECS: u64 = 20;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub openai_api_key: Option<String>,
        pub intelligence_provider: Option<String>,
        pub news_api_key: Option<String>,
        pub market_data_base_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub call_timeout: Duration,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let call_timeout_secs = match env_value("CALL_TIMEOUT_SECS") {
                Some(s) => s
                    .parse::<u64>()
                    .with_context(|| format!("CALL_TIMEOUT_SECS must be an integer (got {s})"))?,
                None => DEFAULT_CALL_TIMEOUT_SECS,
            };
            anyhow::ensure!(call_timeout_secs > 0, "CALL_TIMEOUT_SECS must be > 0");

            Ok(Self {
                database_url: env_value("DATABASE_URL"),
                anthropic_api_key: credential("ANTHROPIC_API_KEY"),
                openai_api_key: credential("OPENAI_API_KEY"),
                intelligence_provider: env_value("INTELLIGENCE_PROVIDER"),
                news_api_key: credential("NEWS_API_KEY"),
                market_data_base_url: env_value("MARKET_DATA_BASE_URL"),
                sentry_dsn: env_value("SENTRY_DSN"),
                call_timeout: Duration::from_secs(call_timeout_secs),
            })
        }

        /// Settings with every optional collaborator switched off.
        pub fn offline() -> Self {
            Self {
                database_url: None,
                anthropic_api_key: None,
                openai_api_key: None,
                intelligence_provider: None,
                news_api_key: None,
                market_data_base_url: None,
                sentry_dsn: None,
                call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            }
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }
    }

    fn env_value(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    // Template .env files ship with "your_..._here" placeholders; treat them as unset.
    fn credential(key: &str) -> Option<String> {
        env_value(key).filter(|s| !is_placeholder(s))
    }

    fn is_placeholder(value: &str) -> bool {
        let lower = value.to_ascii_lowercase();
        lower.starts_with("your_") || lower.ends_with("_here")
    }

}
