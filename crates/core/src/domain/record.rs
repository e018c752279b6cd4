use crate::domain::market::{Period, StockSnapshot};
use crate::domain::news::NewsItem;
use crate::domain::profile::InvestmentProfile;
use crate::domain::scores::{RiskAssessment, SentimentResult};
use crate::domain::ticker::ResolvedTicker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a piece of narrative text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    Intelligence,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText {
    pub text: String,
    pub source: TextSource,
}

impl GeneratedText {
    pub fn intelligence(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: TextSource::Intelligence,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: TextSource::Fallback,
        }
    }
}

/// State threaded through the analysis pipeline; the finished value is the result record.
///
/// A non-empty `error` means the run failed; the remaining analysis fields are then empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub ticker: ResolvedTicker,
    pub period: Period,
    pub profile: InvestmentProfile,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<StockSnapshot>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub news_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_summary_source: Option<TextSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskAssessment>,
    #[serde(default)]
    pub advice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice_source: Option<TextSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisRecord {
    pub fn new(ticker: ResolvedTicker, period: Period, profile: InvestmentProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            ticker,
            period,
            profile,
            snapshot: None,
            news: Vec::new(),
            news_summary: String::new(),
            news_summary_source: None,
            sentiment: None,
            risk: None,
            advice: String::new(),
            advice_source: None,
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// Marks the run as failed and clears anything computed so far.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.snapshot = None;
        self.news.clear();
        self.news_summary.clear();
        self.news_summary_source = None;
        self.sentiment = None;
        self.risk = None;
        self.advice.clear();
        self.advice_source = None;
        self.error = Some(error.into());
        self
    }

    /// Name used for news search: the provider's company name when it has one.
    pub fn company_name(&self) -> &str {
        self.snapshot
            .as_ref()
            .map(|s| s.display_name.trim())
            .filter(|n| !n.is_empty())
            .unwrap_or(self.ticker.display_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticker::CanonicalTicker;

    fn samsung() -> ResolvedTicker {
        ResolvedTicker::new(
            "삼성전자",
            CanonicalTicker::parse("005930.KS").unwrap(),
            "삼성전자",
        )
    }

    #[test]
    fn serializes_identity_flat_and_omits_empty_error() {
        let record = AnalysisRecord::new(samsung(), Period::OneMonth, InvestmentProfile::Growth);
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["canonical_id"], "005930.KS");
        assert_eq!(v["raw_input"], "삼성전자");
        assert_eq!(v["period"], "1mo");
        assert_eq!(v["profile"], "growth");
        assert!(v.get("error").is_none());
        assert!(v.get("risk").is_none());
    }

    #[test]
    fn fail_clears_partial_results() {
        let mut record =
            AnalysisRecord::new(samsung(), Period::OneMonth, InvestmentProfile::Moderate);
        record.news_summary = "partial".to_string();
        record.advice = "partial".to_string();
        let record = record.fail("no price data");

        assert!(record.is_error());
        assert!(record.news_summary.is_empty());
        assert!(record.advice.is_empty());
        assert!(record.sentiment.is_none());
    }

    #[test]
    fn company_name_falls_back_to_resolved_name() {
        let record = AnalysisRecord::new(samsung(), Period::OneMonth, InvestmentProfile::Moderate);
        assert_eq!(record.company_name(), "삼성전자");
    }
}
