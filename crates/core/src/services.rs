use crate::config::Settings;
use crate::llm::{self, IntelligenceGateway};
use crate::market::yahoo::YahooChartClient;
use crate::market::MarketDataGateway;
use crate::news::{self, NewsGateway};
use crate::pipeline::AnalysisPipeline;
use crate::portfolio::PortfolioAggregator;
use crate::resolve::TickerResolver;
use std::sync::Arc;
use std::time::Duration;

/// Gateways built once from settings and shared by every request.
#[derive(Clone)]
pub struct Services {
    pub market: Arc<dyn MarketDataGateway>,
    pub news: Arc<dyn NewsGateway>,
    pub intelligence: Arc<dyn IntelligenceGateway>,
    pub call_timeout: Duration,
}

impl Services {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let market: Arc<dyn MarketDataGateway> = Arc::new(YahooChartClient::from_settings(settings)?);
        let news = news::from_settings(settings)?;
        let intelligence = llm::from_settings(settings)?;

        tracing::info!(
            market = market.provider_name(),
            news = news.provider_name(),
            intelligence = intelligence.provider().as_str(),
            timeout_secs = settings.call_timeout.as_secs(),
            "services configured"
        );

        Ok(Self {
            market,
            news,
            intelligence,
            call_timeout: settings.call_timeout,
        })
    }

    pub fn resolver(&self) -> TickerResolver {
        TickerResolver::new(self.market.clone(), self.intelligence.clone(), self.call_timeout)
    }

    pub fn pipeline(&self) -> AnalysisPipeline {
        AnalysisPipeline::new(
            self.market.clone(),
            self.news.clone(),
            self.intelligence.clone(),
            self.call_timeout,
        )
    }

    pub fn portfolio(&self) -> PortfolioAggregator {
        PortfolioAggregator::new(Arc::new(self.pipeline()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;

    #[test]
    fn offline_settings_build_with_intelligence_disabled() {
        let services = Services::from_settings(&Settings::offline()).unwrap();
        assert_eq!(services.intelligence.provider(), Provider::Disabled);
        assert!(!services.intelligence.is_available());
        assert_eq!(services.market.provider_name(), "yahoo_chart");
        assert_eq!(services.news.provider_name(), "google_news_rss");
    }
}
