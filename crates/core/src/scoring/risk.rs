use crate::domain::market::StockSnapshot;
use crate::domain::scores::{RiskAssessment, RiskLevel, SentimentResult};

const BASE_SCORE: i32 = 50;

pub const HIGH_VOLATILITY: &str = "high price volatility";
pub const MODERATE_VOLATILITY: &str = "moderate price volatility";
pub const NEGATIVE_NEWS: &str = "negative news trend";
pub const WEAK_NEGATIVE_NEWS: &str = "weak negative news";

/// Additive heuristic over period price change and news sentiment.
///
/// Rules apply in a fixed order so `contributing_factors` is stable:
/// volatility first, then sentiment.
pub fn assess(snapshot: &StockSnapshot, sentiment: &SentimentResult) -> RiskAssessment {
    let mut score = BASE_SCORE;
    let mut factors = Vec::new();

    let swing = snapshot.price_change_percent.abs();
    if swing > 20.0 {
        score += 15;
        factors.push(HIGH_VOLATILITY.to_string());
    } else if swing > 10.0 {
        score += 8;
        factors.push(MODERATE_VOLATILITY.to_string());
    }

    if sentiment.score < 40.0 {
        score += 20;
        factors.push(NEGATIVE_NEWS.to_string());
    } else if sentiment.score < 50.0 {
        score += 10;
        factors.push(WEAK_NEGATIVE_NEWS.to_string());
    }

    let risk_score = score.clamp(0, 100) as u8;
    RiskAssessment {
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
        contributing_factors: factors,
    }
}
