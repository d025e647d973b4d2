use crate::error::{AppError, Result};
use crate::instruments::{Instrument, InstrumentTypeFilter, Recommendation, RiskTier};
use crate::investor::RiskProfile;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many of a tier's candidates receive weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Take {
    All,
    First(usize),
}

/// What a tier's mass is divided by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// Evenly across the instruments actually taken.
    Taken,
    /// Across every eligible candidate in the tier, including those not taken.
    Candidates,
}

/// One row of a profile's policy: how much mass a tier gets and who gets it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierRule {
    pub tier: RiskTier,
    /// Percentage points of the requested amount.
    pub mass: f64,
    pub take: Take,
    pub split: Split,
    /// The tier is skipped entirely when it has more candidates than this.
    pub max_candidates: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Policy {
    pub profile: RiskProfile,
    /// Tiers that survive the eligibility filter.
    pub eligible: &'static [RiskTier],
    pub rules: &'static [TierRule],
}

impl Policy {
    pub fn target_mass(&self) -> f64 {
        self.rules.iter().map(|r| r.mass).sum()
    }

    pub fn allows(&self, tier: RiskTier) -> bool {
        self.eligible.contains(&tier)
    }
}

const CONSERVATIVE: Policy = Policy {
    profile: RiskProfile::Conservative,
    eligible: &[RiskTier::Low, RiskTier::Medium],
    rules: &[
        TierRule { tier: RiskTier::Low, mass: 70.0, take: Take::All, split: Split::Taken, max_candidates: None },
        TierRule { tier: RiskTier::Medium, mass: 30.0, take: Take::First(1), split: Split::Candidates, max_candidates: Some(2) },
    ],
};

const MODERATE: Policy = Policy {
    profile: RiskProfile::Moderate,
    eligible: &[RiskTier::Low, RiskTier::Medium, RiskTier::High],
    rules: &[
        TierRule { tier: RiskTier::Low, mass: 40.0, take: Take::First(1), split: Split::Taken, max_candidates: None },
        TierRule { tier: RiskTier::Medium, mass: 40.0, take: Take::First(1), split: Split::Taken, max_candidates: None },
        TierRule { tier: RiskTier::High, mass: 20.0, take: Take::First(1), split: Split::Taken, max_candidates: None },
    ],
};

const AGGRESSIVE: Policy = Policy {
    profile: RiskProfile::Aggressive,
    eligible: &[RiskTier::Low, RiskTier::Medium, RiskTier::High],
    rules: &[
        TierRule { tier: RiskTier::Low, mass: 20.0, take: Take::First(1), split: Split::Taken, max_candidates: None },
        TierRule { tier: RiskTier::Medium, mass: 30.0, take: Take::First(1), split: Split::Taken, max_candidates: None },
        TierRule { tier: RiskTier::High, mass: 50.0, take: Take::First(2), split: Split::Taken, max_candidates: None },
    ],
};

pub fn policy_for(profile: RiskProfile) -> &'static Policy {
    match profile {
        RiskProfile::Conservative => &CONSERVATIVE,
        RiskProfile::Moderate => &MODERATE,
        RiskProfile::Aggressive => &AGGRESSIVE,
    }
}

/// Canned justification shown next to each allocation line.
pub fn reasoning_for(profile: RiskProfile, tier: RiskTier) -> &'static str {
    use RiskProfile::*;
    use RiskTier::*;

    match (profile, tier) {
        (Conservative, Low) => "Low-risk investment with stable, secure returns.",
        (Conservative, Medium) => "Diversification with moderate risk for growth potential.",
        (Conservative, High) => "High-risk exposure kept out of a conservative portfolio.",
        (Moderate, Low) => "Solid foundation with a low-risk investment.",
        (Moderate, Medium) => "Balance between safety and growth.",
        (Moderate, High) => "High return potential with controlled risk.",
        (Aggressive, Low) => "Safety reserve to protect capital.",
        (Aggressive, Medium) => "Consistent growth with moderate risk.",
        (Aggressive, High) => "Maximum return potential with elevated risk.",
    }
}

pub fn recommendation_text(profile: RiskProfile) -> &'static str {
    match profile {
        RiskProfile::Conservative => {
            "Portfolio focused on safety and capital preservation with stable returns."
        }
        RiskProfile::Moderate => {
            "Portfolio balanced between safety and growth, ideal for medium-term goals."
        }
        RiskProfile::Aggressive => {
            "Portfolio optimised for maximum growth, suited to investors with high risk tolerance."
        }
    }
}

/// Parse user-typed capital in pt-BR notation: `.` groups thousands and `,`
/// marks decimals, so "10.000,50" is ten thousand and a half. A leading `R$`
/// is accepted, which lets [`format_money`](crate::currency::format_money)
/// output read back unchanged. Without a comma, dot groups of exactly three
/// digits ("4.000") are thousands and any other single dot ("10.5") is a
/// decimal point. Anything else, including "10,000.50", is rejected.
pub fn parse_amount(input: &str) -> Result<f64> {
    static GROUPED: Lazy<Option<Regex>> =
        Lazy::new(|| Regex::new(r"^\d{1,3}(\.\d{3})+(,\d+)?$").ok());
    static DECIMAL_COMMA: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\d+(,\d+)?$").ok());
    static DECIMAL_DOT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\d+\.\d+$").ok());

    let text = input.trim();
    let text = text.strip_prefix("R$").unwrap_or(text).trim();
    let matches = |re: &Lazy<Option<Regex>>| re.as_ref().is_some_and(|r| r.is_match(text));

    let normalized = if matches(&GROUPED) {
        text.replace('.', "").replace(',', ".")
    } else if matches(&DECIMAL_COMMA) {
        text.replace(',', ".")
    } else if matches(&DECIMAL_DOT) {
        text.to_string()
    } else {
        return Err(AppError::InvalidAmount(input.trim().to_string()));
    };

    match normalized.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(AppError::InvalidAmount(input.trim().to_string())),
    }
}

/// One analysis run. Construction enforces the positive-amount contract so
/// the allocator never sees an invalid amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    amount: f64,
    pub risk_profile: RiskProfile,
    pub instrument_type_filter: InstrumentTypeFilter,
}

impl AllocationRequest {
    pub fn new(
        amount: f64,
        risk_profile: RiskProfile,
        instrument_type_filter: InstrumentTypeFilter,
    ) -> Result<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::InvalidAmount(amount.to_string()));
        }
        Ok(AllocationRequest {
            amount,
            risk_profile,
            instrument_type_filter,
        })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub instrument: Instrument,
    /// 0-100.
    pub percentage: f64,
    /// request amount × percentage / 100, in the base currency.
    pub amount: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub lines: Vec<AllocationLine>,
    /// Allocation-weighted sum of each instrument's change percent.
    pub total_return: f64,
    /// Allocation-weighted tier value; 1.0-3.0 when fully allocated.
    pub risk_score: f64,
    pub recommendation_text: String,
}

impl AllocationResult {
    /// Sum of line percentages. Below 100 when a funded tier had no candidates.
    pub fn total_mass(&self) -> f64 {
        self.lines.iter().map(|l| l.percentage).sum()
    }

    pub fn risk_label(&self) -> RiskLabel {
        RiskLabel::from_score(self.risk_score)
    }
}

/// Qualitative bucket for a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
    Low,
    Moderate,
    High,
}

impl RiskLabel {
    pub fn from_score(score: f64) -> RiskLabel {
        if score < 1.5 {
            RiskLabel::Low
        } else if score < 2.5 {
            RiskLabel::Moderate
        } else {
            RiskLabel::High
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLabel::Low => "low",
            RiskLabel::Moderate => "moderate",
            RiskLabel::High => "high",
        };
        f.pad(s)
    }
}

/// Instruments the request may draw from, in catalog order.
pub fn eligible_instruments<'a>(request: &AllocationRequest, pool: &'a [Instrument]) -> Vec<&'a Instrument> {
    let policy = policy_for(request.risk_profile);
    pool.iter()
        .filter(|i| i.recommendation != Recommendation::Sell)
        .filter(|i| policy.allows(i.risk_tier))
        .filter(|i| request.instrument_type_filter.matches(i))
        .collect()
}

/// Apply one policy row to its tier's candidates. Returns no lines when the
/// tier is empty or over its candidate cap; mass is never redistributed.
fn apply_rule(rule: &TierRule, candidates: &[&Instrument], profile: RiskProfile, amount: f64) -> Vec<AllocationLine> {
    if candidates.is_empty() {
        return Vec::new();
    }
    if rule.max_candidates.is_some_and(|max| candidates.len() > max) {
        log::debug!(
            "[ALLOC] Skipping {} tier: {} candidates exceed cap of {:?}",
            rule.tier,
            candidates.len(),
            rule.max_candidates
        );
        return Vec::new();
    }

    let taken = match rule.take {
        Take::All => candidates.len(),
        Take::First(n) => n.min(candidates.len()),
    };
    let divisor = match rule.split {
        Split::Taken => taken,
        Split::Candidates => candidates.len(),
    };
    let percentage = rule.mass / divisor as f64;

    candidates
        .iter()
        .take(taken)
        .map(|instrument| AllocationLine {
            instrument: (*instrument).clone(),
            percentage,
            amount: amount * percentage / 100.0,
            reasoning: reasoning_for(profile, rule.tier).to_string(),
        })
        .collect()
}

pub fn total_return(lines: &[AllocationLine]) -> f64 {
    lines
        .iter()
        .map(|l| l.percentage * l.instrument.change_percent / 100.0)
        .sum()
}

pub fn risk_score(lines: &[AllocationLine]) -> f64 {
    lines
        .iter()
        .map(|l| l.percentage * l.instrument.risk_tier.value() / 100.0)
        .sum()
}

/// Split `request.amount` across `pool` according to the profile's policy.
///
/// Pure and total: an empty pool or empty tiers yield fewer lines and a
/// total mass under 100, never an error.
pub fn allocate(request: &AllocationRequest, pool: &[Instrument]) -> AllocationResult {
    let policy = policy_for(request.risk_profile);
    let eligible = eligible_instruments(request, pool);

    if eligible.is_empty() {
        log::warn!(
            "[ALLOC] No eligible instruments for {} profile ({} in pool, filter: {})",
            request.risk_profile,
            pool.len(),
            request.instrument_type_filter.label()
        );
    }

    let mut lines = Vec::new();
    for rule in policy.rules {
        let candidates: Vec<&Instrument> = eligible
            .iter()
            .copied()
            .filter(|i| i.risk_tier == rule.tier)
            .collect();
        lines.extend(apply_rule(rule, &candidates, policy.profile, request.amount));
    }

    let result = AllocationResult {
        total_return: total_return(&lines),
        risk_score: risk_score(&lines),
        recommendation_text: recommendation_text(policy.profile).to_string(),
        lines,
    };

    log::debug!(
        "[ALLOC] {} profile: {} lines, mass {:.1}% of target {:.1}%, return {:.2}%, risk {:.2}",
        policy.profile,
        result.lines.len(),
        result.total_mass(),
        policy.target_mass(),
        result.total_return,
        result.risk_score
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{format_money, Currency};
    use crate::instruments::InstrumentKind;

    const EPS: f64 = 1e-9;

    fn instrument(id: &str, kind: InstrumentKind, tier: RiskTier, change_percent: f64, rec: Recommendation) -> Instrument {
        Instrument {
            id: id.to_string(),
            name: id.to_uppercase(),
            kind,
            current_price: 100.0,
            change_24h: change_percent,
            change_percent,
            risk_tier: tier,
            recommendation: rec,
        }
    }

    fn request(amount: f64, profile: RiskProfile) -> AllocationRequest {
        AllocationRequest::new(amount, profile, InstrumentTypeFilter::All).unwrap()
    }

    fn percentages(result: &AllocationResult) -> Vec<f64> {
        result.lines.iter().map(|l| l.percentage).collect()
    }

    #[test]
    fn test_policy_targets_sum_to_100() {
        for profile in RiskProfile::ALL {
            assert!((policy_for(profile).target_mass() - 100.0).abs() < EPS, "{}", profile);
        }
    }

    #[test]
    fn test_policy_eligibility_covers_funded_tiers() {
        for profile in RiskProfile::ALL {
            let policy = policy_for(profile);
            for rule in policy.rules {
                assert!(policy.allows(rule.tier), "{} funds {} but filters it out", profile, rule.tier);
            }
        }
        assert!(!policy_for(RiskProfile::Conservative).allows(RiskTier::High));
    }

    #[test]
    fn test_reasoning_is_distinct_per_profile_and_tier() {
        let mut seen = std::collections::HashSet::new();
        for profile in RiskProfile::ALL {
            for rule in policy_for(profile).rules {
                assert!(seen.insert(reasoning_for(profile, rule.tier)));
            }
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_conservative_two_medium_candidates_takes_first_at_half_mass() {
        let pool = vec![
            instrument("l1", InstrumentKind::FixedIncome, RiskTier::Low, 0.5, Recommendation::Buy),
            instrument("m1", InstrumentKind::Fund, RiskTier::Medium, 1.0, Recommendation::Hold),
            instrument("m2", InstrumentKind::Equity, RiskTier::Medium, 1.5, Recommendation::Buy),
        ];
        let result = allocate(&request(1000.0, RiskProfile::Conservative), &pool);

        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.lines[0].instrument.id, "l1");
        assert!((result.lines[0].percentage - 70.0).abs() < EPS);
        assert_eq!(result.lines[1].instrument.id, "m1");
        assert!((result.lines[1].percentage - 15.0).abs() < EPS);
        assert!((result.total_mass() - 85.0).abs() < EPS);
    }

    #[test]
    fn test_conservative_one_medium_candidate_gets_full_medium_mass() {
        let pool = vec![
            instrument("l1", InstrumentKind::FixedIncome, RiskTier::Low, 0.5, Recommendation::Buy),
            instrument("m1", InstrumentKind::Fund, RiskTier::Medium, 1.0, Recommendation::Hold),
        ];
        let result = allocate(&request(1000.0, RiskProfile::Conservative), &pool);

        assert_eq!(percentages(&result), vec![70.0, 30.0]);
        assert!((result.lines[1].amount - 300.0).abs() < EPS);
        assert_eq!(result.lines[1].reasoning, reasoning_for(RiskProfile::Conservative, RiskTier::Medium));
    }

    #[test]
    fn test_conservative_three_medium_candidates_omits_medium() {
        let pool = vec![
            instrument("l1", InstrumentKind::FixedIncome, RiskTier::Low, 0.5, Recommendation::Buy),
            instrument("m1", InstrumentKind::Fund, RiskTier::Medium, 1.0, Recommendation::Hold),
            instrument("m2", InstrumentKind::Fund, RiskTier::Medium, 1.0, Recommendation::Hold),
            instrument("m3", InstrumentKind::Fund, RiskTier::Medium, 1.0, Recommendation::Hold),
        ];
        let result = allocate(&request(1000.0, RiskProfile::Conservative), &pool);

        assert_eq!(result.lines.len(), 1);
        assert!((result.total_mass() - 70.0).abs() < EPS);
    }

    #[test]
    fn test_conservative_never_takes_high() {
        let pool = vec![
            instrument("h1", InstrumentKind::DigitalAsset, RiskTier::High, 9.0, Recommendation::Buy),
            instrument("l1", InstrumentKind::FixedIncome, RiskTier::Low, 0.5, Recommendation::Buy),
        ];
        let result = allocate(&request(1000.0, RiskProfile::Conservative), &pool);

        assert_eq!(result.lines.len(), 1);
        assert!(result.lines.iter().all(|l| l.instrument.risk_tier != RiskTier::High));
    }

    #[test]
    fn test_sell_flag_is_never_allocated() {
        let pool = vec![
            instrument("l-sell", InstrumentKind::Equity, RiskTier::Low, 3.0, Recommendation::Sell),
            instrument("l-hold", InstrumentKind::Equity, RiskTier::Low, 1.0, Recommendation::Hold),
        ];
        for profile in RiskProfile::ALL {
            let result = allocate(&request(1000.0, profile), &pool);
            assert_eq!(result.lines.len(), 1);
            assert_eq!(result.lines[0].instrument.id, "l-hold");
        }
    }

    #[test]
    fn test_type_filter_restricts_kind() {
        let pool = vec![
            instrument("bond", InstrumentKind::FixedIncome, RiskTier::Low, 0.2, Recommendation::Buy),
            instrument("stock", InstrumentKind::Equity, RiskTier::Low, 1.2, Recommendation::Buy),
        ];
        let req = AllocationRequest::new(
            500.0,
            RiskProfile::Moderate,
            InstrumentTypeFilter::Only(InstrumentKind::Equity),
        )
        .unwrap();
        let result = allocate(&req, &pool);

        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].instrument.id, "stock");
    }

    #[test]
    fn test_aggregate_scoring() {
        let pool = vec![
            instrument("l1", InstrumentKind::FixedIncome, RiskTier::Low, -1.0, Recommendation::Buy),
            instrument("h1", InstrumentKind::DigitalAsset, RiskTier::High, 4.0, Recommendation::Buy),
            instrument("h2", InstrumentKind::DigitalAsset, RiskTier::High, 2.0, Recommendation::Buy),
        ];
        let result = allocate(&request(2000.0, RiskProfile::Aggressive), &pool);

        // 20% low, 25% + 25% high; medium tier empty
        assert_eq!(percentages(&result), vec![20.0, 25.0, 25.0]);
        assert!((result.total_return - (-0.2 + 1.0 + 0.5)).abs() < EPS);
        assert!((result.risk_score - (0.2 + 0.75 + 0.75)).abs() < EPS);
        assert_eq!(result.risk_label(), RiskLabel::Moderate);
    }

    #[test]
    fn test_recommendation_text_ignores_allocation() {
        let result = allocate(&request(1000.0, RiskProfile::Aggressive), &[]);
        assert_eq!(result.recommendation_text, recommendation_text(RiskProfile::Aggressive));
    }

    #[test]
    fn test_risk_label_boundaries() {
        assert_eq!(RiskLabel::from_score(0.0), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(1.49), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(1.5), RiskLabel::Moderate);
        assert_eq!(RiskLabel::from_score(2.49), RiskLabel::Moderate);
        assert_eq!(RiskLabel::from_score(2.5), RiskLabel::High);
        assert_eq!(RiskLabel::from_score(-3.0), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(42.0), RiskLabel::High);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("10000").unwrap(), 10000.0);
        assert_eq!(parse_amount("10,50").unwrap(), 10.5);
        assert_eq!(parse_amount(" 10.000,50 ").unwrap(), 10000.5);
        assert_eq!(parse_amount("4.000").unwrap(), 4000.0);
        assert_eq!(parse_amount("1.234.567").unwrap(), 1234567.0);
        assert_eq!(parse_amount("10.5").unwrap(), 10.5);
        assert_eq!(parse_amount("R$ 250").unwrap(), 250.0);
        for bad in ["", "abc", "0", "0,00", "-5", "NaN", "inf", "1e3", "10,000.50", "1.00,5", "12.34.56", "R$"] {
            assert!(matches!(parse_amount(bad), Err(AppError::InvalidAmount(_))), "{:?}", bad);
        }
    }

    #[test]
    fn test_parse_amount_reads_back_displayed_money() {
        for value in [0.5, 10.5, 999.99, 4000.0, 10000.5, 1234567.25] {
            let shown = format_money(value, Currency::Brl);
            assert!((parse_amount(&shown).unwrap() - value).abs() < EPS, "{}", shown);
        }
    }

    #[test]
    fn test_policies_are_indexed_by_their_profile() {
        for profile in RiskProfile::ALL {
            assert_eq!(policy_for(profile).profile, profile);
        }
    }

    #[test]
    fn test_request_rejects_non_positive_amount() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(AllocationRequest::new(bad, RiskProfile::Moderate, InstrumentTypeFilter::All).is_err());
        }
    }
}
