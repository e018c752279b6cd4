use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Risk-tolerance preset. Shapes advice wording only; scoring never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
    Growth,
}

impl InvestmentProfile {
    pub fn key(self) -> &'static str {
        match self {
            InvestmentProfile::Conservative => "conservative",
            InvestmentProfile::Moderate => "moderate",
            InvestmentProfile::Aggressive => "aggressive",
            InvestmentProfile::Growth => "growth",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InvestmentProfile::Conservative => "Conservative (안정형)",
            InvestmentProfile::Moderate => "Moderate (중립형)",
            InvestmentProfile::Aggressive => "Aggressive (공격형)",
            InvestmentProfile::Growth => "Growth (성장형)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            InvestmentProfile::Conservative => {
                "Capital preservation first; prefers low risk"
            }
            InvestmentProfile::Moderate => "Seeks a balance between return and risk",
            InvestmentProfile::Aggressive => "Accepts high risk in pursuit of high returns",
            InvestmentProfile::Growth => "Long-horizon investor favouring growth stocks",
        }
    }

    pub fn risk_tolerance(self) -> &'static str {
        match self {
            InvestmentProfile::Conservative => "low",
            InvestmentProfile::Moderate => "medium",
            InvestmentProfile::Aggressive => "high",
            InvestmentProfile::Growth => "medium-high",
        }
    }

    /// Unknown or empty names fall back to the default profile.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for InvestmentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for InvestmentProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(InvestmentProfile::Conservative),
            "moderate" => Ok(InvestmentProfile::Moderate),
            "aggressive" => Ok(InvestmentProfile::Aggressive),
            "growth" => Ok(InvestmentProfile::Growth),
            other => anyhow::bail!(
                "unknown investment profile {other:?} (expected conservative, moderate, aggressive or growth)"
            ),
        }
    }
}
