//! Free-form input to a verified canonical ticker.
//!
//! Strategies run in a fixed order and the first hit wins:
//! format check, bare KRX code, intelligence inference, popular names,
//! transliterations. Every accepted ticker has passed an existence check.

pub mod catalog;
pub mod strategies;

use crate::domain::ticker::ResolvedTicker;
use crate::error::ResolutionError;
use crate::llm::IntelligenceGateway;
use crate::market::MarketDataGateway;
use std::sync::Arc;
use std::time::Duration;
use strategies::{
    BareKrxCode, FormatCheck, IntelligenceInference, PopularNames, ResolutionStrategy,
    ResolveContext, Transliterations,
};

pub struct TickerResolver {
    market: Arc<dyn MarketDataGateway>,
    intelligence: Arc<dyn IntelligenceGateway>,
    call_timeout: Duration,
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl TickerResolver {
    pub fn new(
        market: Arc<dyn MarketDataGateway>,
        intelligence: Arc<dyn IntelligenceGateway>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            market,
            intelligence,
            call_timeout,
            strategies: vec![
                Box::new(FormatCheck),
                Box::new(BareKrxCode),
                Box::new(IntelligenceInference),
                Box::new(PopularNames),
                Box::new(Transliterations),
            ],
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(&self, input: &str) -> Result<ResolvedTicker, ResolutionError> {
        if input.trim().is_empty() {
            return Err(ResolutionError::empty_input(input));
        }

        let ctx = ResolveContext {
            market: self.market.as_ref(),
            intelligence: self.intelligence.as_ref(),
            call_timeout: self.call_timeout,
        };

        for strategy in &self.strategies {
            match strategy.attempt(input, &ctx).await {
                Some(found) => {
                    tracing::info!(
                        %input,
                        strategy = strategy.name(),
                        ticker = %found.canonical_id,
                        "resolved ticker"
                    );
                    return Ok(found);
                }
                None => tracing::debug!(%input, strategy = strategy.name(), "no match"),
            }
        }

        tracing::info!(%input, "ticker resolution failed");
        Err(ResolutionError::not_found(input.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{snapshot, FakeIntelligence, FakeMarket};

    fn resolver(market: Arc<FakeMarket>, llm: Arc<FakeIntelligence>) -> TickerResolver {
        TickerResolver::new(market, llm, Duration::from_secs(1))
    }

    #[test]
    fn cascade_order_is_fixed() {
        let r = resolver(Arc::new(FakeMarket::default()), Arc::new(FakeIntelligence::unavailable()));
        assert_eq!(
            r.strategy_names(),
            vec![
                "format_check",
                "bare_krx_code",
                "intelligence_inference",
                "popular_names",
                "transliterations"
            ]
        );
    }

    #[tokio::test]
    async fn canonical_existing_ticker_resolves_without_inference() {
        let market = Arc::new(FakeMarket::default().with(snapshot("005930.KS", "삼성전자", 77000.0, 1.0)));
        let llm = Arc::new(FakeIntelligence::unavailable());

        let r = resolver(market.clone(), llm.clone()).resolve("005930.KS").await.unwrap();
        assert_eq!(r.canonical_id.as_str(), "005930.KS");
        assert_eq!(r.raw_input, "005930.KS");
        assert_eq!(r.display_name, "삼성전자");
        assert_eq!(llm.calls(), 0);
        assert_eq!(market.calls(), 1);
    }

    #[tokio::test]
    async fn canonical_input_skips_inference_even_when_available() {
        let market = Arc::new(FakeMarket::default().with(snapshot("AAPL", "Apple", 190.0, 0.0)));
        let llm = Arc::new(FakeIntelligence::replying(r#"{"ticker": "MSFT"}"#));

        let r = resolver(market, llm.clone()).resolve(" aapl ").await.unwrap();
        assert_eq!(r.canonical_id.as_str(), "AAPL");
        assert_eq!(r.raw_input, " aapl ");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn wrong_inference_falls_through_to_local_dictionary() {
        let market = Arc::new(FakeMarket::default().with(snapshot("005930.KS", "삼성전자", 77000.0, 1.0)));
        let llm = Arc::new(FakeIntelligence::replying(r#"{"ticker": "SSNLF", "name": "Samsung"}"#));

        let r = resolver(market, llm.clone()).resolve("삼송전자").await.unwrap();
        assert_eq!(r.canonical_id.as_str(), "005930.KS");
        assert_eq!(r.raw_input, "삼송전자");
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn inference_failure_is_not_surfaced() {
        let market = Arc::new(FakeMarket::default().with(snapshot("035420.KS", "NAVER", 200000.0, 0.0)));
        let llm = Arc::new(FakeIntelligence::failing("connection reset"));

        let r = resolver(market, llm).resolve("네이버").await.unwrap();
        assert_eq!(r.canonical_id.as_str(), "035420.KS");
    }

    #[tokio::test]
    async fn unknown_input_names_the_query() {
        let market = Arc::new(FakeMarket::default());
        let llm = Arc::new(FakeIntelligence::unavailable());

        let err = resolver(market, llm).resolve("  없는회사  ").await.unwrap_err();
        assert_eq!(err.input, "없는회사");
        assert!(err.to_string().contains("없는회사"));
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_any_lookup() {
        let market = Arc::new(FakeMarket::default());
        let llm = Arc::new(FakeIntelligence::unavailable());

        let err = resolver(market.clone(), llm).resolve("   ").await.unwrap_err();
        assert_eq!(err, ResolutionError::empty_input("   "));
        assert_eq!(err.input, "   ");
        assert_eq!(market.calls(), 0);
    }
}
