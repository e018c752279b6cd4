use crate::config::Settings;
use crate::domain::market::{CompanyProfile, Period, PriceBar, StockSnapshot};
use crate::market::MarketDataGateway;
use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; fingenie/0.1)";

/// Chart API client. Company metadata (market cap, sector) comes from the quote
/// summary endpoint through [`MarketDataGateway::company_profile`].
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .market_data_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http = reqwest::Client::builder()
            .timeout(settings.call_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self { http, base_url })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: crate::testing::local_http(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str, ticker: &str) -> String {
        format!("{}{}/{}", self.base_url.trim_end_matches('/'), path, ticker)
    }

    async fn fetch_chart(&self, ticker: &str, period: Period) -> Result<ChartResult> {
        let res = self
            .http
            .get(self.url("/v8/finance/chart", ticker))
            .query(&[("range", period.as_str()), ("interval", "1d")])
            .send()
            .await
            .context("chart request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read chart response")?;
        let envelope = serde_json::from_str::<ChartEnvelope>(&text)
            .with_context(|| format!("chart response is not valid JSON (HTTP {status})"))?;

        if let Some(err) = envelope.chart.error {
            anyhow::bail!("chart API error {}: {}", err.code, err.description);
        }
        if !status.is_success() {
            anyhow::bail!("chart HTTP {status}");
        }

        envelope
            .chart
            .result
            .and_then(|mut r| (!r.is_empty()).then(|| r.swap_remove(0)))
            .context("chart response has no result")
    }

    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile> {
        let res = self
            .http
            .get(self.url("/v10/finance/quoteSummary", ticker))
            .query(&[("modules", "price,summaryProfile")])
            .send()
            .await
            .context("quote summary request failed")?;

        let status = res.status();
        anyhow::ensure!(status.is_success(), "quote summary HTTP {status}");

        let body = res
            .json::<QuoteSummaryEnvelope>()
            .await
            .context("failed to parse quote summary response")?;
        let result = body
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .context("quote summary has no result")?;

        Ok(CompanyProfile {
            market_cap: result
                .price
                .as_ref()
                .and_then(|p| p.market_cap.as_ref())
                .and_then(|v| v.raw),
            long_name: result.price.as_ref().and_then(|p| p.long_name.clone()),
            sector: result
                .summary_profile
                .and_then(|p| p.sector)
                .filter(|s| !s.trim().is_empty()),
        })
    }
}

#[async_trait::async_trait]
impl MarketDataGateway for YahooChartClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn get_history(&self, ticker: &str, period: Period) -> Result<StockSnapshot> {
        let chart = self.fetch_chart(ticker, period).await?;
        snapshot_from_chart(ticker, period, &chart)
    }

    async fn company_profile(&self, ticker: &str) -> Result<CompanyProfile> {
        self.fetch_profile(ticker).await
    }

    async fn exists(&self, ticker: &str) -> bool {
        match self.fetch_chart(ticker, Period::FiveDays).await {
            Ok(chart) => !bars_from_chart(&chart).is_empty(),
            Err(err) => {
                tracing::debug!(%ticker, error = %err, "existence check failed");
                false
            }
        }
    }
}

fn snapshot_from_chart(ticker: &str, period: Period, chart: &ChartResult) -> Result<StockSnapshot> {
    let bars = bars_from_chart(chart);
    let name = chart
        .meta
        .long_name
        .as_deref()
        .or(chart.meta.short_name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(ticker);

    let mut snapshot = StockSnapshot::from_bars(ticker, name, period, &bars)
        .with_context(|| format!("empty price history for {ticker}"))?;
    snapshot.currency = chart.meta.currency.clone();
    snapshot.fifty_two_week_high = chart.meta.fifty_two_week_high;
    snapshot.fifty_two_week_low = chart.meta.fifty_two_week_low;
    Ok(snapshot)
}

// Rows without a close (halts, partial sessions) are dropped.
fn bars_from_chart(chart: &ChartResult) -> Vec<PriceBar> {
    let Some(q) = chart.indicators.quote.first() else {
        return Vec::new();
    };

    let at = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();

    chart
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let close = at(&q.close, i).filter(|c| c.is_finite())?;
            Some(PriceBar {
                timestamp: DateTime::from_timestamp(*ts, 0)?,
                open: at(&q.open, i).unwrap_or(close),
                high: at(&q.high, i).unwrap_or(close),
                low: at(&q.low, i).unwrap_or(close),
                close,
                volume: at(&q.volume, i).unwrap_or(0.0),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    fifty_two_week_high: Option<f64>,
    #[serde(default)]
    fifty_two_week_low: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    summary_profile: Option<SummaryProfileModule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    market_cap: Option<RawValue>,
    #[serde(default)]
    long_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SummaryProfileModule {
    #[serde(default)]
    sector: Option<String>,
}
