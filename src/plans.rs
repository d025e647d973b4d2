use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    #[default]
    Monthly,
    Annual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Basic,
    Pro,
    Premium,
}

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [PlanTier::Basic, PlanTier::Pro, PlanTier::Premium];

    pub fn plan(&self) -> &'static Plan {
        match self {
            PlanTier::Basic => &BASIC,
            PlanTier::Pro => &PRO,
            PlanTier::Premium => &PREMIUM,
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.plan().name)
    }
}

/// Subscription plan. Prices are whole BRL.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub tier: PlanTier,
    pub name: &'static str,
    pub monthly_price: u32,
    pub annual_price: u32,
    pub popular: bool,
    pub features: &'static [&'static str],
}

const BASIC: Plan = Plan {
    tier: PlanTier::Basic,
    name: "Basic Plan",
    monthly_price: 47,
    annual_price: 470,
    popular: false,
    features: &[
        "Personalised AI analysis",
        "Daily recommendations",
        "Email support",
        "Access to 50+ assets",
        "Full dashboard",
    ],
};

const PRO: Plan = Plan {
    tier: PlanTier::Pro,
    name: "Pro Plan",
    monthly_price: 97,
    annual_price: 970,
    popular: true,
    features: &[
        "Everything in Basic",
        "Real-time analysis",
        "Custom alerts",
        "Priority support",
        "Access to 200+ assets",
        "Advanced reports",
        "Integration API",
    ],
};

const PREMIUM: Plan = Plan {
    tier: PlanTier::Premium,
    name: "Premium Plan",
    monthly_price: 197,
    annual_price: 1970,
    popular: false,
    features: &[
        "Everything in Pro",
        "1-on-1 consulting",
        "Unlimited portfolio analysis",
        "24/7 support",
        "Access to every asset",
        "Exclusive strategies",
        "VIP investor group",
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanQuote {
    /// Price shown per month; the monthly equivalent when billed annually.
    pub per_month: u32,
    pub annual_total: Option<u32>,
    pub savings_percent: Option<u32>,
}

impl Plan {
    pub fn quote(&self, period: BillingPeriod) -> PlanQuote {
        match period {
            BillingPeriod::Monthly => PlanQuote {
                per_month: self.monthly_price,
                annual_total: None,
                savings_percent: None,
            },
            BillingPeriod::Annual => {
                let monthly_equivalent = (self.annual_price as f64 / 12.0).round();
                let savings = ((self.monthly_price as f64 - monthly_equivalent)
                    / self.monthly_price as f64
                    * 100.0)
                    .round();
                PlanQuote {
                    per_month: monthly_equivalent as u32,
                    annual_total: Some(self.annual_price),
                    savings_percent: Some(savings.max(0.0) as u32),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_quote_is_list_price() {
        let quote = PlanTier::Pro.plan().quote(BillingPeriod::Monthly);
        assert_eq!(quote.per_month, 97);
        assert_eq!(quote.annual_total, None);
    }

    #[test]
    fn test_annual_quotes() {
        // 470 / 12 = 39.17 -> 39, (47 - 39) / 47 = 17.0%
        let basic = PlanTier::Basic.plan().quote(BillingPeriod::Annual);
        assert_eq!(basic, PlanQuote { per_month: 39, annual_total: Some(470), savings_percent: Some(17) });

        // 970 / 12 = 80.83 -> 81, (97 - 81) / 97 = 16.5% -> 16
        let pro = PlanTier::Pro.plan().quote(BillingPeriod::Annual);
        assert_eq!(pro.per_month, 81);
        assert_eq!(pro.savings_percent, Some(16));

        // 1970 / 12 = 164.17 -> 164, (197 - 164) / 197 = 16.75% -> 17
        let premium = PlanTier::Premium.plan().quote(BillingPeriod::Annual);
        assert_eq!(premium.per_month, 164);
        assert_eq!(premium.savings_percent, Some(17));
    }

    #[test]
    fn test_only_pro_is_popular() {
        let popular: Vec<_> = PlanTier::ALL.iter().filter(|t| t.plan().popular).collect();
        assert_eq!(popular, vec![&PlanTier::Pro]);
    }
}
