use crate::advice::AdviceGenerator;
use crate::call;
use crate::domain::market::Period;
use crate::domain::news::NewsItem;
use crate::domain::profile::InvestmentProfile;
use crate::domain::record::AnalysisRecord;
use crate::domain::scores::SentimentResult;
use crate::domain::ticker::ResolvedTicker;
use crate::error::DataUnavailableError;
use crate::llm::IntelligenceGateway;
use crate::market::MarketDataGateway;
use crate::news::NewsGateway;
use crate::scoring::{risk, sentiment};
use crate::summary::NewsSummarizer;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_NEWS: usize = 5;
pub const SCREENING_MAX_NEWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchMarketData,
    FetchNews,
    ScoreSentiment,
    ScoreRisk,
    GenerateAdvice,
    Done,
    Error,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::FetchMarketData => "fetch_market_data",
            Stage::FetchNews => "fetch_news",
            Stage::ScoreSentiment => "score_sentiment",
            Stage::ScoreRisk => "score_risk",
            Stage::GenerateAdvice => "generate_advice",
            Stage::Done => "done",
            Stage::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub period: Period,
    pub profile: InvestmentProfile,
    pub max_news: usize,
    pub summarize_news: bool,
    pub generate_advice: bool,
}

impl PipelineOptions {
    pub fn full(period: Period, profile: InvestmentProfile) -> Self {
        Self {
            period,
            profile,
            max_news: DEFAULT_MAX_NEWS,
            summarize_news: true,
            generate_advice: true,
        }
    }

    /// Reduced run for portfolio screening: scores only, no narrative text.
    pub fn screening() -> Self {
        Self {
            period: Period::OneMonth,
            profile: InvestmentProfile::default(),
            max_news: SCREENING_MAX_NEWS,
            summarize_news: false,
            generate_advice: false,
        }
    }
}

/// Fixed-order analysis over one ticker.
///
/// Only a market data failure ends the run early; every later stage degrades
/// to a deterministic fallback instead. Holds no per-run state.
pub struct AnalysisPipeline {
    market: Arc<dyn MarketDataGateway>,
    news: Arc<dyn NewsGateway>,
    summarizer: NewsSummarizer,
    advisor: AdviceGenerator,
    call_timeout: Duration,
}

impl AnalysisPipeline {
    pub fn new(
        market: Arc<dyn MarketDataGateway>,
        news: Arc<dyn NewsGateway>,
        intelligence: Arc<dyn IntelligenceGateway>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            market,
            news,
            summarizer: NewsSummarizer::new(intelligence.clone(), call_timeout),
            advisor: AdviceGenerator::new(intelligence, call_timeout),
            call_timeout,
        }
    }

    pub async fn run(&self, ticker: ResolvedTicker, opts: &PipelineOptions) -> AnalysisRecord {
        let mut record = AnalysisRecord::new(ticker, opts.period, opts.profile);
        let mut stage = Stage::FetchMarketData;

        while !stage.is_terminal() {
            tracing::debug!(ticker = %record.ticker.canonical_id, stage = stage.as_str(), "pipeline stage");
            let (next_record, next_stage) = self.step(stage, record, opts).await;
            record = next_record;
            stage = next_stage;
        }

        tracing::info!(
            ticker = %record.ticker.canonical_id,
            outcome = stage.as_str(),
            risk = record.risk.as_ref().map(|r| r.risk_score),
            "analysis finished"
        );
        record
    }

    async fn step(
        &self,
        stage: Stage,
        record: AnalysisRecord,
        opts: &PipelineOptions,
    ) -> (AnalysisRecord, Stage) {
        match stage {
            Stage::FetchMarketData => match self.fetch_market_data(record).await {
                Ok(record) => (record, Stage::FetchNews),
                Err(record) => (record, Stage::Error),
            },
            Stage::FetchNews => (self.fetch_news(record, opts).await, Stage::ScoreSentiment),
            Stage::ScoreSentiment => (score_sentiment(record), Stage::ScoreRisk),
            Stage::ScoreRisk => (score_risk(record), Stage::GenerateAdvice),
            Stage::GenerateAdvice => (self.generate_advice(record, opts).await, Stage::Done),
            Stage::Done | Stage::Error => (record, stage),
        }
    }

    async fn fetch_market_data(
        &self,
        mut record: AnalysisRecord,
    ) -> Result<AnalysisRecord, AnalysisRecord> {
        let ticker = record.ticker.canonical_id.to_string();
        let res = call::bounded(
            self.call_timeout,
            "market data",
            self.market.get_history(&ticker, record.period),
        )
        .await;

        match res {
            Ok(mut snapshot) => {
                // Metadata gets its own deadline; losing it never fails the run.
                match call::bounded(
                    self.call_timeout,
                    "company profile",
                    self.market.company_profile(&ticker),
                )
                .await
                {
                    Ok(profile) => snapshot.apply_profile(profile),
                    Err(err) => {
                        tracing::debug!(%ticker, error = %err, "company profile unavailable; leaving metadata unknown")
                    }
                }
                record.snapshot = Some(snapshot);
                Ok(record)
            }
            Err(err) => {
                let err = DataUnavailableError {
                    ticker,
                    period: record.period,
                    detail: format!("{err:#}"),
                };
                tracing::warn!(error = %err, "market data unavailable; stopping analysis");
                Err(record.fail(err.to_string()))
            }
        }
    }

    async fn fetch_news(&self, mut record: AnalysisRecord, opts: &PipelineOptions) -> AnalysisRecord {
        let company = record.company_name().to_string();
        let res = call::bounded(self.call_timeout, "news search", async {
            Ok(self.news.search(&company, opts.max_news).await)
        })
        .await;

        record.news = match res {
            Ok(items) => items,
            Err(err) => vec![NewsItem::unavailable(err.to_string())],
        };
        if record.news.iter().any(|n| n.title().is_none()) {
            tracing::warn!(ticker = %record.ticker.canonical_id, "news feed degraded");
        }

        if opts.summarize_news {
            let summary = self.summarizer.summarize(&record.news).await;
            record.news_summary = summary.text;
            record.news_summary_source = Some(summary.source);
        }
        record
    }

    async fn generate_advice(&self, mut record: AnalysisRecord, opts: &PipelineOptions) -> AnalysisRecord {
        if opts.generate_advice {
            let advice = self.advisor.generate(&record, opts.profile).await;
            record.advice = advice.text;
            record.advice_source = Some(advice.source);
        }
        record
    }
}

fn score_sentiment(mut record: AnalysisRecord) -> AnalysisRecord {
    record.sentiment = Some(sentiment::score(&record.news));
    record
}

fn score_risk(mut record: AnalysisRecord) -> AnalysisRecord {
    if let Some(snapshot) = &record.snapshot {
        let neutral = SentimentResult::neutral_empty();
        let s = record.sentiment.as_ref().unwrap_or(&neutral);
        record.risk = Some(risk::assess(snapshot, s));
    }
    record
}
