//! Balance brackets and their identity for aggregation

use serde::{Deserialize, Serialize};

/// A balance bracket with its own annual rate and tax-exempt amount.
///
/// `min` is inclusive, `max` is inclusive or unbounded when `None`.
/// `rate` is an annual nominal fraction (`0.44` is 44%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
    pub rate: f64,
    pub exempt: f64,
}

impl Tier {
    pub fn contains(&self, balance: f64) -> bool {
        balance >= self.min && self.max.is_none_or(|max| balance <= max)
    }
}

/// Returns the first tier in table order whose bracket contains `balance`.
///
/// Tables are trusted as given: overlapping brackets resolve to the one
/// listed first, gaps resolve to `None`.
pub fn select_tier(tiers: &[Tier], balance: f64) -> Option<&Tier> {
    tiers.iter().find(|tier| tier.contains(balance))
}

/// Identity of an aggregation bucket.
///
/// Two tiers with the same `min`/`max`/`rate` triple share a bucket even if
/// their exemptions differ. Floats are keyed by bit pattern after folding
/// `-0.0` into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierKey {
    Bracket {
        min: u64,
        max: Option<u64>,
        rate: u64,
    },
    Fallback,
}

fn float_key(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

impl TierKey {
    pub fn of(tier: Option<&Tier>) -> Self {
        match tier {
            Some(tier) => TierKey::Bracket {
                min: float_key(tier.min),
                max: tier.max.map(float_key),
                rate: float_key(tier.rate),
            },
            None => TierKey::Fallback,
        }
    }
}

/// The bracket table offered by default for Turkish lira deposit accounts.
pub fn default_tiers() -> Vec<Tier> {
    let bracket = |min: f64, max: Option<f64>, rate: f64, exempt: f64| Tier {
        min,
        max,
        rate,
        exempt,
    };
    vec![
        bracket(20_000.0, Some(250_000.0), 0.44, 20_000.0),
        bracket(250_001.0, Some(500_000.0), 0.44, 40_000.0),
        bracket(500_001.0, Some(1_000_000.0), 0.44, 75_000.0),
        bracket(1_000_001.0, Some(1_500_000.0), 0.44, 150_000.0),
        bracket(1_500_001.0, Some(2_000_000.0), 0.44, 175_000.0),
        bracket(2_000_001.0, Some(3_000_000.0), 0.44, 250_000.0),
        bracket(3_000_001.0, Some(4_000_000.0), 0.44, 350_000.0),
        bracket(4_000_001.0, Some(5_000_000.0), 0.44, 450_000.0),
        bracket(5_000_001.0, Some(7_500_000.0), 0.43, 600_000.0),
        bracket(7_500_001.0, Some(10_000_000.0), 0.43, 900_000.0),
        bracket(10_000_001.0, Some(15_000_000.0), 0.43, 1_500_000.0),
        bracket(15_000_001.0, None, 0.41, 2_500_000.0),
    ]
}
