use crate::call;
use crate::domain::ticker::{is_bare_krx_code, CanonicalTicker, ResolvedTicker, KRX_SUFFIXES};
use crate::llm::{json, IntelligenceGateway};
use crate::market::MarketDataGateway;
use crate::resolve::catalog;
use serde::Deserialize;
use std::time::Duration;

/// Collaborators shared by every strategy for one resolution.
pub struct ResolveContext<'a> {
    pub market: &'a dyn MarketDataGateway,
    pub intelligence: &'a dyn IntelligenceGateway,
    pub call_timeout: Duration,
}

impl ResolveContext<'_> {
    /// Existence check. A timeout counts as "does not exist".
    pub async fn verify(&self, ticker: &CanonicalTicker) -> bool {
        let res = call::bounded(self.call_timeout, "existence check", async {
            Ok(self.market.exists(ticker.as_str()).await)
        })
        .await;

        match res {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!(%ticker, error = %err, "existence check failed");
                false
            }
        }
    }

    async fn first_existing(&self, candidates: Vec<CanonicalTicker>) -> Option<CanonicalTicker> {
        for c in candidates {
            if self.verify(&c).await {
                return Some(c);
            }
        }
        None
    }
}

/// One step of the resolution cascade. `None` passes the input on to the next step.
#[async_trait::async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, input: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedTicker>;
}

fn resolved(input: &str, id: CanonicalTicker, name: Option<&str>) -> ResolvedTicker {
    let name = name
        .map(str::to_string)
        .or_else(|| catalog::name_for(id.as_str()).map(str::to_string))
        .unwrap_or_else(|| id.to_string());
    ResolvedTicker::new(input, id, name)
}

// `005930` -> [005930.KS, 005930.KQ]
fn krx_candidates(code: &str) -> Vec<CanonicalTicker> {
    KRX_SUFFIXES
        .iter()
        .filter_map(|sfx| CanonicalTicker::parse(&format!("{code}.{sfx}")))
        .collect()
}

/// Input that already has a canonical shape.
pub struct FormatCheck;

#[async_trait::async_trait]
impl ResolutionStrategy for FormatCheck {
    fn name(&self) -> &'static str {
        "format_check"
    }

    async fn attempt(&self, input: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedTicker> {
        let id = CanonicalTicker::parse(input)?;
        if ctx.verify(&id).await {
            Some(resolved(input, id, None))
        } else {
            None
        }
    }
}

/// A 6-digit KRX code typed without its exchange suffix.
pub struct BareKrxCode;

#[async_trait::async_trait]
impl ResolutionStrategy for BareKrxCode {
    fn name(&self) -> &'static str {
        "bare_krx_code"
    }

    async fn attempt(&self, input: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedTicker> {
        let code = input.trim();
        if !is_bare_krx_code(code) {
            return None;
        }
        let id = ctx.first_existing(krx_candidates(code)).await?;
        Some(resolved(input, id, None))
    }
}

const INFERENCE_PROMPT: &str = "You map a company name, possibly misspelled or in Korean, to its \
stock ticker. Korean listings use the 6-digit code with .KS (KOSPI) or .KQ (KOSDAQ); US listings \
use the exchange symbol. Reply with exactly one JSON object: {\"ticker\": \"...\", \"name\": \"...\"}. \
If you are not sure, reply {\"ticker\": null, \"name\": null}.";

#[derive(Debug, Deserialize)]
struct InferredTicker {
    // Outer `None`: no "ticker" key. `Some(None)`: an explicit null, the "unsure" answer.
    #[serde(default, deserialize_with = "present")]
    ticker: Option<Option<String>>,
    #[serde(default)]
    name: Option<String>,
}

fn present<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

/// Asks the intelligence provider for a ticker, then checks it exists.
///
/// A nonexistent answer ends this step for the call; there is no re-prompt.
pub struct IntelligenceInference;

#[async_trait::async_trait]
impl ResolutionStrategy for IntelligenceInference {
    fn name(&self) -> &'static str {
        "intelligence_inference"
    }

    async fn attempt(&self, input: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedTicker> {
        if !ctx.intelligence.is_available() {
            return None;
        }

        let reference = catalog::POPULAR
            .iter()
            .map(|l| format!("{} {}", l.ticker, l.name))
            .collect::<Vec<_>>()
            .join("\n");
        let context = format!("Input: {}\n\nKnown tickers:\n{reference}", input.trim());

        let reply = match call::bounded(
            ctx.call_timeout,
            "ticker inference",
            ctx.intelligence.complete(INFERENCE_PROMPT, &context),
        )
        .await
        {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(%input, error = %err, "ticker inference unavailable");
                return None;
            }
        };

        let Some(inferred) =
            json::first_object_where(&reply, |t: &InferredTicker| t.ticker.is_some())
        else {
            tracing::debug!(%input, "ticker inference reply had no ticker record");
            return None;
        };
        let Some(raw) = inferred
            .ticker
            .as_ref()
            .and_then(|t| t.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
        else {
            tracing::debug!(%input, "ticker inference was unsure");
            return None;
        };

        let candidates = if is_bare_krx_code(raw) {
            krx_candidates(raw)
        } else {
            CanonicalTicker::parse(raw).into_iter().collect()
        };
        if candidates.is_empty() {
            tracing::debug!(%input, %raw, "inferred ticker has no canonical shape");
            return None;
        }

        let Some(id) = ctx.first_existing(candidates).await else {
            tracing::info!(%input, %raw, "inferred ticker does not exist");
            return None;
        };
        let name = inferred.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        Some(resolved(input, id, name))
    }
}

/// Substring match against the popular listing names.
pub struct PopularNames;

#[async_trait::async_trait]
impl ResolutionStrategy for PopularNames {
    fn name(&self) -> &'static str {
        "popular_names"
    }

    async fn attempt(&self, input: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedTicker> {
        for listing in catalog::popular_matches(input) {
            let Some(id) = CanonicalTicker::parse(listing.ticker) else {
                continue;
            };
            if ctx.verify(&id).await {
                return Some(resolved(input, id, Some(listing.name)));
            }
        }
        None
    }
}

/// Curated alternate spellings of well-known companies.
pub struct Transliterations;

#[async_trait::async_trait]
impl ResolutionStrategy for Transliterations {
    fn name(&self) -> &'static str {
        "transliterations"
    }

    async fn attempt(&self, input: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedTicker> {
        let candidates = catalog::alias_matches(input)
            .into_iter()
            .filter_map(CanonicalTicker::parse)
            .collect();
        let id = ctx.first_existing(candidates).await?;
        Some(resolved(input, id, None))
    }
}
