//! Instrument catalog
//!
//! This module handles:
//! - The instrument model consumed by the allocator
//! - Loading a catalog from a JSON file
//! - The built-in demo pool used when no catalog file is configured

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    #[serde(rename = "stocks", alias = "equity")]
    Equity,
    #[serde(rename = "bonds", alias = "fixed-income")]
    FixedIncome,
    #[serde(rename = "crypto", alias = "digital-asset")]
    DigitalAsset,
    #[serde(rename = "funds", alias = "fund")]
    Fund,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 4] = [
        InstrumentKind::Equity,
        InstrumentKind::FixedIncome,
        InstrumentKind::DigitalAsset,
        InstrumentKind::Fund,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InstrumentKind::Equity => "Stocks",
            InstrumentKind::FixedIncome => "Bonds",
            InstrumentKind::DigitalAsset => "Crypto",
            InstrumentKind::Fund => "Funds",
        }
    }
}

impl FromStr for InstrumentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stocks" | "stock" | "equity" => Ok(InstrumentKind::Equity),
            "bonds" | "bond" | "fixed-income" => Ok(InstrumentKind::FixedIncome),
            "crypto" | "digital-asset" => Ok(InstrumentKind::DigitalAsset),
            "funds" | "fund" => Ok(InstrumentKind::Fund),
            _ => Err(AppError::UnknownInstrumentType(s.to_string())),
        }
    }
}

/// Coarse volatility label carried by every instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    /// Numeric weight used by the aggregate risk score.
    pub fn value(&self) -> f64 {
        match self {
            RiskTier::Low => 1.0,
            RiskTier::Medium => 2.0,
            RiskTier::High => 3.0,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: InstrumentKind,
    /// Positive, in the instrument's native currency.
    pub current_price: f64,
    /// Absolute price delta over the last 24h.
    pub change_24h: f64,
    /// Percentage delta, used as a proxy for expected short-term return.
    pub change_percent: f64,
    #[serde(rename = "riskLevel", alias = "riskTier")]
    pub risk_tier: RiskTier,
    pub recommendation: Recommendation,
}

/// Which instrument kinds an analysis run may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentTypeFilter {
    #[default]
    All,
    #[serde(untagged)]
    Only(InstrumentKind),
}

impl InstrumentTypeFilter {
    pub fn matches(&self, instrument: &Instrument) -> bool {
        match self {
            InstrumentTypeFilter::All => true,
            InstrumentTypeFilter::Only(kind) => instrument.kind == *kind,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstrumentTypeFilter::All => "All types",
            InstrumentTypeFilter::Only(kind) => kind.label(),
        }
    }
}

impl FromStr for InstrumentTypeFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(InstrumentTypeFilter::All);
        }
        s.parse().map(InstrumentTypeFilter::Only)
    }
}

/// Load an ordered instrument pool from a JSON array on disk.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<Instrument>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let instruments: Vec<Instrument> = serde_json::from_str(&contents)?;

    log::info!(
        "Loaded {} instruments from catalog '{}'",
        instruments.len(),
        path.display()
    );

    Ok(instruments)
}

#[allow(clippy::too_many_arguments)]
fn demo(
    id: &str,
    name: &str,
    kind: InstrumentKind,
    current_price: f64,
    change_24h: f64,
    change_percent: f64,
    risk_tier: RiskTier,
    recommendation: Recommendation,
) -> Instrument {
    Instrument {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        current_price,
        change_24h,
        change_percent,
        risk_tier,
        recommendation,
    }
}

/// Built-in sample pool. Prices are illustrative, not market data.
pub fn demo_catalog() -> Vec<Instrument> {
    use InstrumentKind::*;
    use Recommendation::*;
    use RiskTier::*;

    vec![
        demo("tesouro-selic", "Tesouro Selic 2029", FixedIncome, 14250.00, 3.10, 0.02, Low, Buy),
        demo("itub4", "Itaú Unibanco PN", Equity, 33.20, 0.41, 1.25, Low, Buy),
        demo("petr4", "Petrobras PN", Equity, 38.45, 0.85, 2.26, Medium, Buy),
        demo("bova11", "iShares Ibovespa", Fund, 124.80, 0.95, 0.77, Medium, Hold),
        demo("btc", "Bitcoin", DigitalAsset, 342000.00, 8120.00, 2.43, High, Buy),
        demo("eth", "Ethereum", DigitalAsset, 17850.00, -410.00, -2.25, High, Hold),
        demo("tesouro-ipca", "Tesouro IPCA+ 2035", FixedIncome, 2180.50, 4.30, 0.20, Low, Hold),
        demo("hglg11", "CSHG Logística FII", Fund, 162.40, -0.30, -0.18, Low, Buy),
        demo("vale3", "Vale ON", Equity, 62.10, -0.74, -1.18, Medium, Hold),
        demo("sol", "Solana", DigitalAsset, 980.00, 61.50, 6.70, High, Buy),
        demo("mglu3", "Magazine Luiza ON", Equity, 1.95, -0.12, -5.80, High, Sell),
    ]
}
