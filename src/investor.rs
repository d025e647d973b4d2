use crate::currency::Currency;
use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative, // Safety first
    #[default]
    Moderate,     // Balance of safety and growth
    Aggressive,   // Maximum growth, high volatility accepted
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "Prioritises safety and stability",
            RiskProfile::Moderate => "Balance between risk and return",
            RiskProfile::Aggressive => "Seeks maximum return with higher risk",
        }
    }

    /// Detect an explicit risk appetite in free text ("I'm risk averse",
    /// "perfil arrojado", ...). Conservative language wins over aggressive,
    /// which wins over moderate.
    pub fn from_text(text: &str) -> Option<RiskProfile> {
        static CONSERVATIVE: Lazy<Option<Regex>> = Lazy::new(|| {
            Regex::new(r"(?i)\b(conservative|conservador[a]?|risk[- ]averse|low[- ]risk|safety)\b").ok()
        });
        static AGGRESSIVE: Lazy<Option<Regex>> = Lazy::new(|| {
            Regex::new(r"(?i)\b(aggressive|bold|arrojad[oa]|agressiv[oa]|high[- ]risk|risk[- ]seeking)\b").ok()
        });
        static MODERATE: Lazy<Option<Regex>> = Lazy::new(|| {
            Regex::new(r"(?i)\b(moderate|moderad[oa]|balanced|medium[- ]risk)\b").ok()
        });

        let mentions = |re: &Lazy<Option<Regex>>| re.as_ref().is_some_and(|r| r.is_match(text));

        if mentions(&CONSERVATIVE) {
            Some(RiskProfile::Conservative)
        } else if mentions(&AGGRESSIVE) {
            Some(RiskProfile::Aggressive)
        } else if mentions(&MODERATE) {
            Some(RiskProfile::Moderate)
        } else {
            None
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RiskProfile {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(RiskProfile::Conservative),
            "moderate" => Ok(RiskProfile::Moderate),
            "aggressive" => Ok(RiskProfile::Aggressive),
            _ => Err(AppError::UnknownRiskProfile(s.to_string())),
        }
    }
}

pub const DEFAULT_INVESTMENT_GOAL: f64 = 10_000.0;
pub const DEFAULT_RISK_TOLERANCE: u8 = 5;

/// Declared investor profile, created during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(rename = "profile")]
    pub risk_profile: RiskProfile,
    /// Held in the BRL base currency.
    pub investment_goal: f64,
    /// 1-10. Informational only; the allocator ignores it.
    pub risk_tolerance: u8,
    #[serde(rename = "currency")]
    pub preferred_currency: Currency,
}

impl UserProfile {
    pub fn new(
        name: &str,
        risk_profile: RiskProfile,
        investment_goal: f64,
        risk_tolerance: u8,
        preferred_currency: Currency,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidProfile("name is required".into()));
        }
        if !investment_goal.is_finite() || investment_goal <= 0.0 {
            return Err(AppError::InvalidProfile(format!(
                "investment goal must be positive, got {}",
                investment_goal
            )));
        }
        if !(1..=10).contains(&risk_tolerance) {
            return Err(AppError::InvalidProfile(format!(
                "risk tolerance must be between 1 and 10, got {}",
                risk_tolerance
            )));
        }

        Ok(UserProfile {
            name: name.to_string(),
            risk_profile,
            investment_goal,
            risk_tolerance,
            preferred_currency,
        })
    }

    /// Onboarding form defaults for a fresh user.
    pub fn with_defaults(name: &str) -> Result<Self> {
        Self::new(
            name,
            RiskProfile::default(),
            DEFAULT_INVESTMENT_GOAL,
            DEFAULT_RISK_TOLERANCE,
            Currency::default(),
        )
    }
}

/// The profile an analysis runs under: the stored one, or moderate if the
/// user never completed onboarding.
pub fn effective_profile(profile: Option<&UserProfile>) -> RiskProfile {
    profile
        .map(|p| p.risk_profile)
        .unwrap_or(RiskProfile::Moderate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_detects_explicit_language() {
        assert_eq!(
            RiskProfile::from_text("I am risk averse and want safety"),
            Some(RiskProfile::Conservative)
        );
        assert_eq!(
            RiskProfile::from_text("Arrojado - Busco altos retornos"),
            Some(RiskProfile::Aggressive)
        );
        assert_eq!(
            RiskProfile::from_text("a balanced portfolio please"),
            Some(RiskProfile::Moderate)
        );
        assert_eq!(RiskProfile::from_text("no preference"), None);
    }

    #[test]
    fn test_from_text_conservative_wins() {
        assert_eq!(
            RiskProfile::from_text("not aggressive, rather conservative"),
            Some(RiskProfile::Conservative)
        );
    }

    #[test]
    fn test_profile_validation() {
        assert!(UserProfile::new("Ana", RiskProfile::Aggressive, 5000.0, 8, Currency::Usd).is_ok());
        assert!(matches!(
            UserProfile::new("  ", RiskProfile::Moderate, 5000.0, 5, Currency::Brl),
            Err(AppError::InvalidProfile(_))
        ));
        assert!(matches!(
            UserProfile::new("Ana", RiskProfile::Moderate, 0.0, 5, Currency::Brl),
            Err(AppError::InvalidProfile(_))
        ));
        assert!(matches!(
            UserProfile::new("Ana", RiskProfile::Moderate, 5000.0, 11, Currency::Brl),
            Err(AppError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_effective_profile_falls_back_to_moderate() {
        assert_eq!(effective_profile(None), RiskProfile::Moderate);

        let ana = UserProfile::new("Ana", RiskProfile::Conservative, 5000.0, 2, Currency::Brl).unwrap();
        assert_eq!(effective_profile(Some(&ana)), RiskProfile::Conservative);
    }

    #[test]
    fn test_profile_storage_shape() {
        let ana = UserProfile::with_defaults("Ana").unwrap();
        let json = serde_json::to_value(&ana).unwrap();
        assert_eq!(json["profile"], "moderate");
        assert_eq!(json["investmentGoal"], 10000.0);
        assert_eq!(json["riskTolerance"], 5);
        assert_eq!(json["currency"], "BRL");
    }
}
