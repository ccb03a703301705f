//! Mapping a positive-class probability to a risk tier.
//!
//! The probability is first turned into a percentage rounded to two
//! decimals, then bucketed by a [`RiskPolicy`]. Bucketing works on the
//! rounded value, so `0.49996` is `50.0%` and therefore `high`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Discrete risk tier reported as `risk_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    High,
    Borderline,
    Moderate,
    Low,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::High => "high",
            RiskTier::Borderline => "borderline",
            RiskTier::Moderate => "moderate",
            RiskTier::Low => "low",
        }
    }

    /// Human-readable verdict returned as `prediction`.
    pub fn message(&self) -> &'static str {
        match self {
            RiskTier::High => "You have high chances of Diabetes!",
            RiskTier::Borderline => "Borderline risk of Diabetes",
            RiskTier::Moderate => "You have some risk of Diabetes",
            RiskTier::Low => "You have low chances of Diabetes",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How probabilities are bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskPolicy {
    /// Four tiers; the probability is hidden for `low`.
    ///
    /// The bands are checked in order and have gaps: a percentage such as
    /// `46.5` or `49.5` matches none of the upper bands and lands in `low`.
    #[default]
    Tiered,
    /// `high` at 50% and above, `low` otherwise; probability always shown.
    Binary,
}

impl RiskPolicy {
    pub fn tier(&self, percent: f64) -> RiskTier {
        match self {
            RiskPolicy::Tiered => {
                if percent >= 50.0 {
                    RiskTier::High
                } else if (47.0..=49.0).contains(&percent) {
                    RiskTier::Borderline
                } else if (21.0..=46.0).contains(&percent) {
                    RiskTier::Moderate
                } else {
                    RiskTier::Low
                }
            }
            RiskPolicy::Binary => {
                if percent >= 50.0 { RiskTier::High } else { RiskTier::Low }
            }
        }
    }

    fn shows_probability(&self, tier: RiskTier) -> bool {
        match self {
            RiskPolicy::Tiered => tier != RiskTier::Low,
            RiskPolicy::Binary => true,
        }
    }

    /// Bucket a positive-class probability in `[0, 1]`.
    pub fn assess(&self, probability: f64) -> Assessment {
        let percent = round_percent(probability);
        let tier = self.tier(percent);
        Assessment {
            prediction: tier.message().to_string(),
            probability: self.shows_probability(tier).then(|| format_percent(percent)),
            risk_level: tier,
        }
    }
}

/// Verdict for one patient, serialized as the `/predict` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub prediction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<String>,
    pub risk_level: RiskTier,
}

/// `probability * 100`, rounded to two decimals.
///
/// Rounding goes through decimal formatting so the result is correctly
/// rounded on the exact binary value rather than on `x * 100.0`.
pub fn round_percent(probability: f64) -> f64 {
    let raw = probability * 100.0;
    format!("{:.2}", raw).parse().unwrap_or(raw)
}

/// Shortest round-trip decimal with at least one fractional digit, plus `%`.
pub fn format_percent(percent: f64) -> String {
    let mut s = percent.to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    s.push('%');
    s
}

/// Service variant: which model artifact is served and how it is bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Random forest with tiered buckets.
    #[default]
    Forest,
    /// Logistic regression with a binary cut.
    Logistic,
}

impl Variant {
    pub fn policy(&self) -> RiskPolicy {
        match self {
            Variant::Forest => RiskPolicy::Tiered,
            Variant::Logistic => RiskPolicy::Binary,
        }
    }

    /// Model file used when none is given explicitly.
    pub fn default_model_path(&self) -> &'static str {
        match self {
            Variant::Forest => "models/forest.json",
            Variant::Logistic => "models/logistic.json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Forest => "forest",
            Variant::Logistic => "logistic",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forest" => Ok(Variant::Forest),
            "logistic" => Ok(Variant::Logistic),
            other => Err(format!("unknown variant '{}' (expected forest or logistic)", other)),
        }
    }
}
