//! Exchange rate history and its derived trend

use super::error::Result;
use super::rounding::round_to;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Days ahead used for the suggested target price.
pub const PROJECTION_DAYS: f64 = 30.0;

/// One daily close as reported by a time-series provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSample {
    pub datetime: String,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateHistory {
    pub date: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResult {
    pub current_price: f64,
    pub avg_daily_change: f64,
    pub suggested_target_price: f64,
    pub last_update: String,
    /// Newest first, as received from the provider
    pub history: Vec<RateHistory>,
}

impl RateResult {
    /// Derives the linear trend from samples ordered newest first.
    ///
    /// Returns `None` for an empty window.
    pub fn from_samples(samples: &[RateSample]) -> Option<Self> {
        let latest = samples.first()?;
        let oldest = samples.last()?;

        let avg_daily_change = (latest.close - oldest.close) / samples.len() as f64;
        let target = latest.close + avg_daily_change * PROJECTION_DAYS;

        Some(RateResult {
            current_price: round_to(latest.close, 4),
            avg_daily_change,
            suggested_target_price: round_to(target, 4),
            last_update: latest.datetime.clone(),
            history: samples
                .iter()
                .map(|s| RateHistory {
                    date: s.datetime.clone(),
                    price: s.close,
                })
                .collect(),
        })
    }
}

/// A source of daily closing prices for one currency pair.
#[async_trait]
pub trait TimeSeriesProvider: Send + Sync {
    /// Base and quote currency, e.g. `("USD", "TRY")`
    fn pair(&self) -> (&str, &str);

    /// Latest daily closes, newest first.
    async fn fetch_daily_closes(&self) -> Result<Vec<RateSample>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(datetime: &str, close: f64) -> RateSample {
        RateSample {
            datetime: datetime.to_string(),
            close,
        }
    }

    #[test]
    fn test_trend_from_newest_first_samples() {
        let samples = vec![
            sample("2026-10-14", 41.23456),
            sample("2026-10-13", 41.0),
            sample("2026-10-12", 40.0),
            sample("2026-10-11", 39.23456),
        ];

        let result = RateResult::from_samples(&samples).unwrap();
        assert_eq!(result.current_price, 41.2346);
        assert_eq!(result.avg_daily_change, (41.23456 - 39.23456) / 4.0);
        assert_eq!(
            result.suggested_target_price,
            round_to(41.23456 + result.avg_daily_change * 30.0, 4)
        );
        assert_eq!(result.last_update, "2026-10-14");
        assert_eq!(result.history.len(), 4);
        assert_eq!(result.history[0].date, "2026-10-14");
        assert_eq!(result.history[3].price, 39.23456);
    }

    #[test]
    fn test_single_sample_has_no_trend() {
        let result = RateResult::from_samples(&[sample("2026-10-14", 40.5)]).unwrap();
        assert_eq!(result.avg_daily_change, 0.0);
        assert_eq!(result.suggested_target_price, 40.5);
    }

    #[test]
    fn test_empty_window_yields_nothing() {
        assert!(RateResult::from_samples(&[]).is_none());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = RateResult::from_samples(&[sample("2026-10-14", 40.5)]).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["currentPrice"], 40.5);
        assert_eq!(json["lastUpdate"], "2026-10-14");
        assert_eq!(json["history"][0]["date"], "2026-10-14");
    }
}
