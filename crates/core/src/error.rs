use crate::domain::market::Period;
use std::fmt;

/// The query could not be mapped to an existing ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionError {
    pub input: String,
    pub detail: String,
}

impl ResolutionError {
    pub fn not_found(input: &str) -> Self {
        Self {
            input: input.to_string(),
            detail: "no matching listed stock was found; try the exchange code (e.g. 005930.KS) or the US symbol (e.g. AAPL)".to_string(),
        }
    }

    pub fn empty_input(input: &str) -> Self {
        Self {
            input: input.to_string(),
            detail: "enter a company name or ticker".to_string(),
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not resolve '{}': {}", self.input, self.detail)
    }
}

impl std::error::Error for ResolutionError {}

/// Market data for a ticker came back empty or could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUnavailableError {
    pub ticker: String,
    pub period: Period,
    pub detail: String,
}

impl fmt::Display for DataUnavailableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no market data for {} (period={}): {}",
            self.ticker, self.period, self.detail
        )
    }
}

impl std::error::Error for DataUnavailableError {}
