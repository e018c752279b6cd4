use crate::call;
use crate::domain::profile::InvestmentProfile;
use crate::domain::record::{AnalysisRecord, GeneratedText};
use crate::domain::scores::{RiskLevel, Sentiment};
use crate::llm::IntelligenceGateway;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are a professional investment advisor. Using the data provided, \
give concrete, practical advice suited to the investor's profile. Be clear and easy to follow, \
and ground every point in the figures given. This is decision support, not a guarantee.";

pub struct AdviceGenerator {
    intelligence: Arc<dyn IntelligenceGateway>,
    call_timeout: Duration,
}

impl AdviceGenerator {
    pub fn new(intelligence: Arc<dyn IntelligenceGateway>, call_timeout: Duration) -> Self {
        Self {
            intelligence,
            call_timeout,
        }
    }

    /// Narrative advice for a scored record. Never fails.
    pub async fn generate(&self, record: &AnalysisRecord, profile: InvestmentProfile) -> GeneratedText {
        if !self.intelligence.is_available() {
            return GeneratedText::fallback(fallback_advice(record, profile));
        }

        let context = advice_context(record, profile);
        let res = call::bounded(
            self.call_timeout,
            "advice",
            self.intelligence.complete(SYSTEM_PROMPT, &context),
        )
        .await;

        match res {
            Ok(text) if !text.trim().is_empty() => GeneratedText::intelligence(text.trim()),
            Ok(_) => {
                tracing::warn!(ticker = %record.ticker.canonical_id, "advice came back empty; using template");
                GeneratedText::fallback(fallback_advice(record, profile))
            }
            Err(err) => {
                tracing::warn!(ticker = %record.ticker.canonical_id, error = %err, "advice degraded to template");
                GeneratedText::fallback(fallback_advice(record, profile))
            }
        }
    }
}

fn advice_context(record: &AnalysisRecord, profile: InvestmentProfile) -> String {
    let mut ctx = String::new();
    let _ = writeln!(ctx, "Stock: {} ({})", record.company_name(), record.ticker.canonical_id);
    if let Some(s) = &record.snapshot {
        let _ = writeln!(ctx, "Current price: {}", s.current_price);
        let _ = writeln!(ctx, "Change over {}: {}%", s.period, s.price_change_percent);
    }
    if let Some(r) = &record.risk {
        let _ = writeln!(ctx, "Risk: {} (score {})", r.risk_level, r.risk_score);
        if !r.contributing_factors.is_empty() {
            let _ = writeln!(ctx, "Risk factors: {}", r.contributing_factors.join(", "));
        }
    }
    if let Some(s) = &record.sentiment {
        let _ = writeln!(ctx, "News sentiment: {} (score {})", s.classification, s.score);
    }
    let _ = writeln!(ctx, "\nNews summary:\n{}\n", record.news_summary.trim());
    let _ = writeln!(ctx, "Investor profile: {} - {}", profile.name(), profile.description());
    let _ = write!(ctx, "Risk tolerance: {}", profile.risk_tolerance());
    ctx
}

/// Templated advice keyed by risk level.
pub fn fallback_advice(record: &AnalysisRecord, profile: InvestmentProfile) -> String {
    let level = record.risk.as_ref().map(|r| r.risk_level);
    let sentiment = record
        .sentiment
        .as_ref()
        .map(|s| s.classification)
        .unwrap_or(Sentiment::Neutral);

    let mut out = String::from("### Investment advice\n\n");
    let _ = writeln!(
        out,
        "**Risk level**: {}",
        level.map(RiskLevel::as_str).unwrap_or("unknown")
    );
    let _ = writeln!(out, "**Market sentiment**: {sentiment}");
    let _ = writeln!(out, "**Investor profile**: {} - {}\n", profile.name(), profile.description());

    let line = match level {
        Some(RiskLevel::High) => "High risk detected. Approach with caution and size positions conservatively.",
        Some(RiskLevel::Medium) => "Moderate risk. Consider spreading exposure across several holdings.",
        Some(RiskLevel::Low) | None => "Relatively stable at the moment.",
    };
    out.push_str(line);
    out
}
