pub mod yahoo;

use crate::domain::market::{CompanyProfile, Period, StockSnapshot};

#[async_trait::async_trait]
pub trait MarketDataGateway: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Price history summary for `ticker` over `period`. Empty history is an error.
    async fn get_history(&self, ticker: &str, period: Period) -> anyhow::Result<StockSnapshot>;

    /// Market cap, sector and long name. Callers treat any error as "unknown".
    async fn company_profile(&self, _ticker: &str) -> anyhow::Result<CompanyProfile> {
        anyhow::bail!("{} has no company profile endpoint", self.provider_name())
    }

    /// Whether the provider knows `ticker`. Transport failures count as "no".
    async fn exists(&self, ticker: &str) -> bool {
        match self.get_history(ticker, Period::FiveDays).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(%ticker, error = %err, "existence check failed");
                false
            }
        }
    }
}
