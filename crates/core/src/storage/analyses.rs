use crate::domain::record::AnalysisRecord;
use anyhow::Context;
use sqlx::types::Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Error,
}

impl RunStatus {
    pub fn of(record: &AnalysisRecord) -> Self {
        if record.is_error() {
            RunStatus::Error
        } else {
            RunStatus::Success
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Error => "error",
        }
    }
}

/// Stores a finished run, successful or not. `intelligence` names the provider in use.
pub async fn persist_record(
    pool: &sqlx::PgPool,
    record: &AnalysisRecord,
    intelligence: &str,
) -> anyhow::Result<uuid::Uuid> {
    let status = RunStatus::of(record);

    let id: uuid::Uuid = sqlx::query_scalar(
        "INSERT INTO analysis_runs \
         (id, ticker, display_name, raw_input, period, profile, analyzed_at, intelligence, status, error, risk_score, record) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING id",
    )
    .bind(record.id)
    .bind(record.ticker.canonical_id.as_str())
    .bind(record.company_name())
    .bind(&record.ticker.raw_input)
    .bind(record.period.as_str())
    .bind(record.profile.key())
    .bind(record.analyzed_at)
    .bind(intelligence)
    .bind(status.as_str())
    .bind(record.error.as_deref())
    .bind(record.risk.as_ref().map(|r| i16::from(r.risk_score)))
    .bind(Json(record))
    .fetch_one(pool)
    .await
    .with_context(|| format!("insert analysis_runs failed for {}", record.ticker.canonical_id))?;

    tracing::debug!(%id, ticker = %record.ticker.canonical_id, status = status.as_str(), "analysis persisted");
    Ok(id)
}

/// Most recent successful run for `ticker`, if any.
pub async fn fetch_latest(
    pool: &sqlx::PgPool,
    ticker: &str,
) -> anyhow::Result<Option<AnalysisRecord>> {
    let row = sqlx::query_scalar::<_, Json<AnalysisRecord>>(
        "SELECT record \
         FROM analysis_runs \
         WHERE ticker = $1 AND status = 'success' \
         ORDER BY analyzed_at DESC \
         LIMIT 1",
    )
    .bind(ticker)
    .fetch_optional(pool)
    .await
    .context("select latest analysis_runs failed")?;

    Ok(row.map(|Json(record)| record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::Period;
    use crate::domain::profile::InvestmentProfile;
    use crate::domain::ticker::ResolvedTicker;

    #[test]
    fn status_follows_record_error() {
        let record = AnalysisRecord::new(
            ResolvedTicker::from_holding("AAPL").unwrap(),
            Period::OneMonth,
            InvestmentProfile::Moderate,
        );
        assert_eq!(RunStatus::of(&record), RunStatus::Success);
        assert_eq!(RunStatus::of(&record.fail("no market data")).as_str(), "error");
    }
}
