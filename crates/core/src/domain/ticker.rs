use serde::{Deserialize, Serialize};
use std::fmt;

/// Exchange suffixes accepted on 6-digit KRX codes (KOSPI, KOSDAQ).
pub const KRX_SUFFIXES: [&str; 2] = ["KS", "KQ"];

/// A ticker that has the canonical shape: `NNNNNN.KS` / `NNNNNN.KQ`, or a 1-5 letter symbol.
///
/// Shape only. Existence is checked against the market data gateway by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalTicker(String);

impl CanonicalTicker {
    pub fn parse(input: &str) -> Option<Self> {
        let candidate = input.trim().to_ascii_uppercase();
        if is_krx_code(&candidate) || is_symbol(&candidate) {
            Some(Self(candidate))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_krx(&self) -> bool {
        is_krx_code(&self.0)
    }
}

impl fmt::Display for CanonicalTicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CanonicalTicker {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("not a canonical ticker: {value}"))
    }
}

impl From<CanonicalTicker> for String {
    fn from(value: CanonicalTicker) -> Self {
        value.0
    }
}

/// 6 ASCII digits with no exchange suffix, e.g. `005930`.
pub fn is_bare_krx_code(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_krx_code(s: &str) -> bool {
    let Some((code, suffix)) = s.split_once('.') else {
        return false;
    };
    is_bare_krx_code(code) && KRX_SUFFIXES.contains(&suffix)
}

fn is_symbol(s: &str) -> bool {
    (1..=5).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_uppercase())
}

/// Outcome of resolving one user query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTicker {
    pub raw_input: String,
    pub canonical_id: CanonicalTicker,
    pub display_name: String,
}

impl ResolvedTicker {
    pub fn new(
        raw_input: impl Into<String>,
        canonical_id: CanonicalTicker,
        display_name: impl Into<String>,
    ) -> Self {
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            canonical_id.to_string()
        } else {
            display_name.trim().to_string()
        };

        Self {
            raw_input: raw_input.into(),
            canonical_id,
            display_name,
        }
    }

    /// Identity for a stored holding whose ticker was resolved when it was added.
    /// The pipeline's market-data stage is the existence check.
    pub fn from_holding(ticker: &str) -> Option<Self> {
        let canonical = CanonicalTicker::parse(ticker)?;
        Some(Self::new(ticker, canonical.clone(), canonical.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_krx_codes_with_exchange_suffix() {
        assert_eq!(
            CanonicalTicker::parse(" 005930.ks ").unwrap().as_str(),
            "005930.KS"
        );
        assert!(CanonicalTicker::parse("035720.KQ").unwrap().is_krx());
        assert!(CanonicalTicker::parse("005930.KX").is_none());
        assert!(CanonicalTicker::parse("05930.KS").is_none());
        assert!(CanonicalTicker::parse("005930").is_none());
    }

    #[test]
    fn accepts_short_letter_symbols_only() {
        assert_eq!(CanonicalTicker::parse("aapl").unwrap().as_str(), "AAPL");
        assert!(CanonicalTicker::parse("A").is_some());
        assert!(CanonicalTicker::parse("GOOGLE").is_none());
        assert!(CanonicalTicker::parse("BRK.B").is_none());
        assert!(CanonicalTicker::parse("삼성전자").is_none());
        assert!(CanonicalTicker::parse("").is_none());
    }

    #[test]
    fn resolved_ticker_defaults_display_name_to_id() {
        let id = CanonicalTicker::parse("TSLA").unwrap();
        let resolved = ResolvedTicker::new("tsla", id, "  ");
        assert_eq!(resolved.display_name, "TSLA");
        assert_eq!(resolved.raw_input, "tsla");
    }

    #[test]
    fn serde_rejects_malformed_ids() {
        let ok: CanonicalTicker = serde_json::from_str("\"000660.KS\"").unwrap();
        assert_eq!(ok.as_str(), "000660.KS");
        assert!(serde_json::from_str::<CanonicalTicker>("\"not a ticker\"").is_err());
    }
}
