//! Day-by-day tiered compounding of a deposit balance.
//!
//! Each day the tier is re-selected from the balance at the start of the
//! day, so interest credited on day `d` can move the deposit into another
//! bracket for day `d + 1`.

use super::calculation::{CalculationRequest, CalculationResponse, DailyResult, TierSummary};
use super::rounding::round_to;
use super::tier::{Tier, TierKey, select_tier};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Fixed annualization basis, no leap-year adjustment.
pub const DAYS_PER_YEAR: f64 = 365.0;
const DAYS_PER_MONTH: u32 = 30;

/// Iterator over the simulated days of a request.
pub struct Simulation<'a> {
    request: &'a CalculationRequest,
    balance: f64,
    day: u32,
}

impl<'a> Simulation<'a> {
    pub fn new(request: &'a CalculationRequest) -> Self {
        Simulation {
            request,
            balance: request.principal,
            day: 0,
        }
    }

    /// Balance after the days simulated so far.
    pub fn balance(&self) -> f64 {
        self.balance
    }
}

impl Iterator for Simulation<'_> {
    type Item = DailyResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.day >= self.request.days {
            return None;
        }
        self.day += 1;

        let tier = select_tier(&self.request.tiers, self.balance).copied();
        let (exemption, rate) = tier.map_or((0.0, 0.0), |t| (t.exempt, t.rate));

        let taxable = (self.balance - exemption).max(0.0);
        let gross_interest = taxable * rate / DAYS_PER_YEAR;
        let net_interest = gross_interest * (1.0 - self.request.withholding_tax);

        let daily = DailyResult {
            day: self.day,
            month: (self.day - 1) / DAYS_PER_MONTH + 1,
            balance: self.balance,
            gross_interest,
            net_interest,
            exemption,
            tier,
        };
        self.balance += net_interest;
        Some(daily)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.request.days - self.day) as usize;
        (remaining, Some(remaining))
    }
}

/// Accumulates days and net interest per tier identity, in first-visit order.
#[derive(Default)]
struct TierAggregator {
    index: HashMap<TierKey, usize>,
    summaries: Vec<TierSummary>,
}

impl TierAggregator {
    fn record(&mut self, tier: Option<&Tier>, net_interest: f64) {
        let key = TierKey::of(tier);
        let slot = *self.index.entry(key).or_insert_with(|| {
            self.summaries.push(TierSummary {
                min: tier.map_or(0.0, |t| t.min),
                max: tier.and_then(|t| t.max),
                rate: tier.map_or(0.0, |t| t.rate),
                days_passed: 0,
                interest_earned: 0.0,
                fallback: tier.is_none(),
            });
            self.summaries.len() - 1
        });
        let summary = &mut self.summaries[slot];
        summary.days_passed += 1;
        summary.interest_earned += net_interest;
    }

    fn finish(self) -> Vec<TierSummary> {
        self.summaries
    }
}

/// Runs the projection for an already validated request.
///
/// Scalar outputs are rounded to 2 decimals, tier interest is left as
/// accumulated.
pub fn simulate(request: &CalculationRequest) -> CalculationResponse {
    if request.withholding_tax > 1.0 {
        warn!(
            withholding_tax = request.withholding_tax,
            "Withholding tax is applied as a fraction; values above 1 make net interest negative"
        );
    }

    let usd_initial = request.principal / request.usd_start_rate;
    let mut aggregator = TierAggregator::default();
    let mut simulation = Simulation::new(request);

    for daily in simulation.by_ref() {
        aggregator.record(daily.tier.as_ref(), daily.net_interest);
    }

    let total_balance = simulation.balance();
    let total_net_profit = total_balance - request.principal;
    let usd_final_value = total_balance / request.usd_end_rate;
    let usd_profit_loss = usd_final_value - usd_initial;
    debug!(
        days = request.days,
        total_balance, usd_final_value, "Simulation finished"
    );

    CalculationResponse {
        total_balance: round_to(total_balance, 2),
        total_net_profit: round_to(total_net_profit, 2),
        usd_initial: round_to(usd_initial, 2),
        usd_final_value: round_to(usd_final_value, 2),
        usd_profit_loss: round_to(usd_profit_loss, 2),
        tier_summary: aggregator.finish(),
    }
}

/// Collects every simulated day, for callers that display the schedule.
pub fn schedule(request: &CalculationRequest) -> Vec<DailyResult> {
    Simulation::new(request).collect()
}
