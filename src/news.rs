use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

impl Impact {
    pub fn marker(&self) -> &'static str {
        match self {
            Impact::Positive => "+",
            Impact::Negative => "-",
            Impact::Neutral => "=",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Impact::Positive => "positive",
            Impact::Negative => "negative",
            Impact::Neutral => "neutral",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub impact: Impact,
}

impl NewsItem {
    pub fn age(&self, now: DateTime<Utc>) -> String {
        time_ago(now, self.timestamp)
    }
}

/// Coarse relative age: minutes under an hour, hours under a day, else days.
pub fn time_ago(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes();

    if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

fn demo(id: &str, title: &str, summary: &str, source: &str, age: Duration, impact: Impact, now: DateTime<Utc>) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        source: source.to_string(),
        timestamp: now - age,
        impact,
    }
}

/// Built-in market headlines, newest first, stamped relative to `now`.
pub fn demo_feed(now: DateTime<Utc>) -> Vec<NewsItem> {
    use Impact::*;

    vec![
        demo(
            "selic-hold",
            "Central bank holds Selic rate steady",
            "The monetary policy committee kept the benchmark rate unchanged, supporting fixed income yields.",
            "Valor Econômico",
            Duration::minutes(25),
            Neutral,
            now,
        ),
        demo(
            "btc-etf-inflows",
            "Bitcoin ETFs record a week of inflows",
            "Institutional demand pushed spot ETF holdings to a new high as prices climbed.",
            "CoinDesk",
            Duration::hours(3),
            Positive,
            now,
        ),
        demo(
            "retail-sales-drop",
            "Retail sales fall more than expected",
            "Weaker consumer spending weighs on retailers and e-commerce names.",
            "InfoMoney",
            Duration::hours(9),
            Negative,
            now,
        ),
        demo(
            "petrobras-dividends",
            "Petrobras announces extraordinary dividends",
            "The payout beat analyst estimates, lifting the preferred shares in early trading.",
            "Reuters",
            Duration::days(2),
            Positive,
            now,
        ),
    ]
}
