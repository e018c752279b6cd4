use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookback window understood by the market data gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[default]
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown period {s:?} (expected one of 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)"
                )
            })
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub ticker: String,
    pub display_name: String,
    pub current_price: f64,
    pub period: Period,
    pub price_change_percent: f64,
    pub period_high: f64,
    pub period_low: f64,
    pub average_volume: u64,

    // Provider metadata. `None` means unknown, never a guessed value.
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub currency: Option<String>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

impl StockSnapshot {
    /// Builds a snapshot from chronologically ordered bars.
    ///
    /// Returns `None` when there is no usable history: no bars, or a zero/non-finite
    /// starting close that would make the period change undefined.
    pub fn from_bars(
        ticker: impl Into<String>,
        display_name: impl Into<String>,
        period: Period,
        bars: &[PriceBar],
    ) -> Option<Self> {
        let first = bars.first()?;
        let last = bars.last()?;

        let start_price = first.close;
        let current_price = last.close;
        if !start_price.is_finite() || start_price == 0.0 || !current_price.is_finite() {
            return None;
        }

        let price_change = (current_price - start_price) / start_price * 100.0;
        let period_high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let period_low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        let average_volume = bars.iter().map(|b| b.volume).sum::<f64>() / bars.len() as f64;

        Some(Self {
            ticker: ticker.into(),
            display_name: display_name.into(),
            current_price: round2(current_price),
            period,
            price_change_percent: round2(price_change),
            period_high: round2(period_high),
            period_low: round2(period_low),
            average_volume: average_volume.max(0.0) as u64,
            market_cap: None,
            sector: None,
            currency: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
        })
    }

    /// Value of `shares` at the current price.
    pub fn position_value(&self, shares: f64) -> f64 {
        self.current_price * shares
    }

    /// Merges best-effort company metadata. A provider long name only replaces a
    /// display name that is still the bare ticker.
    pub fn apply_profile(&mut self, profile: CompanyProfile) {
        self.market_cap = profile.market_cap;
        self.sector = profile.sector;
        if self.display_name == self.ticker {
            if let Some(name) = profile.long_name {
                self.display_name = name;
            }
        }
    }
}

/// Optional company metadata fetched separately from price history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyProfile {
    pub market_cap: Option<f64>,
    pub long_name: Option<String>,
    pub sector: Option<String>,
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
