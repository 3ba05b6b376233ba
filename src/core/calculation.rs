//! Request and response types for a deposit projection

use super::tier::{Tier, default_tiers};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    pub principal: f64,
    pub days: u32,
    /// Applied as `1 - withholding_tax`, i.e. expected as a fraction even
    /// though validation admits values up to 100.
    pub withholding_tax: f64,
    /// Local currency per 1 USD when the deposit is opened
    pub usd_start_rate: f64,
    /// Local currency per 1 USD when the deposit matures
    pub usd_end_rate: f64,
    #[serde(default)]
    pub tiers: Vec<Tier>,
}

impl Default for CalculationRequest {
    fn default() -> Self {
        CalculationRequest {
            principal: 100_000.0,
            days: 32,
            withholding_tax: 0.175,
            usd_start_rate: 1.0,
            usd_end_rate: 1.0,
            tiers: default_tiers(),
        }
    }
}

/// One simulated day, using the balance as it stood at the start of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyResult {
    pub day: u32,
    pub month: u32,
    pub balance: f64,
    pub gross_interest: f64,
    pub net_interest: f64,
    pub exemption: f64,
    #[serde(skip)]
    pub tier: Option<Tier>,
}

/// Per-tier aggregate of the days spent in a bracket.
///
/// The fallback bucket collects days where no tier matched; its
/// `min`/`max`/`rate` are zero-filled and `fallback` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSummary {
    pub min: f64,
    pub max: Option<f64>,
    pub rate: f64,
    pub days_passed: u32,
    pub interest_earned: f64,
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    pub total_balance: f64,
    pub total_net_profit: f64,
    pub usd_initial: f64,
    pub usd_final_value: f64,
    pub usd_profit_loss: f64,
    pub tier_summary: Vec<TierSummary>,
}
