use crate::domain::market::round2;
use crate::domain::scores::RiskLevel;
use crate::domain::ticker::ResolvedTicker;
use crate::pipeline::{AnalysisPipeline, PipelineOptions};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighRiskHolding {
    pub ticker: String,
    pub display_name: String,
    pub risk_score: u8,
}

/// `total_count` is the number of holdings submitted, including skipped ones.
/// `high_risk_list` order is not meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_count: usize,
    pub high_risk_count: usize,
    pub high_risk_list: Vec<HighRiskHolding>,
    #[serde(default)]
    pub skipped_tickers: Vec<String>,
}

enum Outcome {
    Valued {
        value: f64,
        high_risk: Option<HighRiskHolding>,
    },
    Skipped(String),
}

pub struct PortfolioAggregator {
    pipeline: Arc<AnalysisPipeline>,
    concurrency: usize,
}

impl PortfolioAggregator {
    pub fn new(pipeline: Arc<AnalysisPipeline>) -> Self {
        Self {
            pipeline,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Screens every holding and folds the results. A holding that fails is skipped, never fatal.
    pub async fn aggregate(&self, holdings: &[Holding]) -> PortfolioSummary {
        let opts = PipelineOptions::screening();

        let screens: Vec<_> = holdings.iter().map(|h| self.screen(h, &opts)).collect();
        let outcomes: Vec<Outcome> = stream::iter(screens)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = PortfolioSummary {
            total_value: 0.0,
            total_count: holdings.len(),
            high_risk_count: 0,
            high_risk_list: Vec::new(),
            skipped_tickers: Vec::new(),
        };

        for outcome in outcomes {
            match outcome {
                Outcome::Valued { value, high_risk } => {
                    summary.total_value += value;
                    if let Some(h) = high_risk {
                        summary.high_risk_list.push(h);
                    }
                }
                Outcome::Skipped(ticker) => summary.skipped_tickers.push(ticker),
            }
        }
        summary.total_value = round2(summary.total_value);
        summary.high_risk_count = summary.high_risk_list.len();

        tracing::info!(
            holdings = summary.total_count,
            skipped = summary.skipped_tickers.len(),
            high_risk = summary.high_risk_count,
            "portfolio summarized"
        );
        summary
    }

    async fn screen(&self, holding: &Holding, opts: &PipelineOptions) -> Outcome {
        if !holding.shares.is_finite() || holding.shares < 0.0 {
            tracing::warn!(ticker = %holding.ticker, shares = holding.shares, "invalid share count; skipping");
            return Outcome::Skipped(holding.ticker.clone());
        }
        let Some(ticker) = ResolvedTicker::from_holding(&holding.ticker) else {
            tracing::warn!(ticker = %holding.ticker, "malformed ticker; skipping");
            return Outcome::Skipped(holding.ticker.clone());
        };

        let record = self.pipeline.run(ticker, opts).await;
        let (Some(snapshot), Some(risk)) = (&record.snapshot, &record.risk) else {
            tracing::warn!(
                ticker = %holding.ticker,
                error = record.error.as_deref().unwrap_or("incomplete analysis"),
                "holding skipped"
            );
            return Outcome::Skipped(holding.ticker.clone());
        };

        let high_risk = (risk.risk_level == RiskLevel::High).then(|| HighRiskHolding {
            ticker: snapshot.ticker.clone(),
            display_name: snapshot.display_name.clone(),
            risk_score: risk.risk_score,
        });

        Outcome::Valued {
            value: snapshot.position_value(holding.shares),
            high_risk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{snapshot, FakeIntelligence, FakeMarket, FakeNews};
    use std::time::Duration;

    fn aggregator(market: FakeMarket, news: FakeNews) -> PortfolioAggregator {
        let pipeline = AnalysisPipeline::new(
            Arc::new(market),
            Arc::new(news),
            Arc::new(FakeIntelligence::unavailable()),
            Duration::from_secs(1),
        );
        PortfolioAggregator::new(Arc::new(pipeline))
    }

    fn holding(ticker: &str, shares: f64) -> Holding {
        Holding {
            ticker: ticker.to_string(),
            shares,
        }
    }

    #[tokio::test]
    async fn failed_holding_is_skipped_but_still_counted() {
        let market = FakeMarket::default().with(snapshot("005930.KS", "삼성전자", 70000.0, 1.0));
        let agg = aggregator(market, FakeNews::default());

        let summary = agg
            .aggregate(&[holding("005930.KS", 10.0), holding("999999.KS", 5.0)])
            .await;

        assert_eq!(summary.total_value, 700000.0);
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.skipped_tickers, vec!["999999.KS".to_string()]);
        assert_eq!(summary.high_risk_count, 0);
    }

    #[tokio::test]
    async fn flags_high_risk_holdings() {
        let market = FakeMarket::default()
            .with(snapshot("035720.KS", "카카오", 40000.0, -30.0))
            .with(snapshot("AAPL", "Apple", 200.0, 1.0));
        let news = FakeNews::with_titles(&["실적 악화", "주가 급락"]);
        let agg = aggregator(market, news).with_concurrency(2);

        let summary = agg
            .aggregate(&[holding("035720.KS", 3.0), holding("AAPL", 2.5)])
            .await;

        assert_eq!(summary.total_value, 120500.0);
        assert_eq!(summary.high_risk_count, 2);
        let mut flagged: Vec<_> = summary.high_risk_list.iter().map(|h| h.ticker.as_str()).collect();
        flagged.sort();
        assert_eq!(flagged, vec!["035720.KS", "AAPL"]);
        let kakao = summary.high_risk_list.iter().find(|h| h.ticker == "035720.KS").unwrap();
        assert_eq!(kakao.display_name, "카카오");
        assert_eq!(kakao.risk_score, 85);
    }

    #[tokio::test]
    async fn malformed_input_is_skipped_without_lookup() {
        let market = FakeMarket::default();
        let agg = aggregator(market, FakeNews::default());

        let summary = agg
            .aggregate(&[holding("not a ticker", 1.0), holding("AAPL", f64::NAN)])
            .await;
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.total_value, 0.0);
        assert_eq!(summary.skipped_tickers.len(), 2);
    }

    #[tokio::test]
    async fn empty_portfolio_is_all_zero() {
        let agg = aggregator(FakeMarket::default(), FakeNews::default());
        let summary = agg.aggregate(&[]).await;
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.total_value, 0.0);
        assert!(summary.high_risk_list.is_empty());
    }
}
