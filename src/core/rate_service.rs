//! Day-scoped cached lookup of the USD exchange rate trend

use super::cache::Cache;
use super::error::{Error, Result};
use super::rate::{RateResult, TimeSeriesProvider};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Wraps a time-series provider with a cache keyed by calendar day.
///
/// A result computed once is served for the rest of the UTC day; the next
/// day's key misses and triggers a fresh fetch. Concurrent misses are not
/// deduplicated.
pub struct RateService<P: TimeSeriesProvider> {
    provider: P,
    cache: Arc<dyn Cache<String, RateResult>>,
}

impl<P: TimeSeriesProvider> RateService<P> {
    pub fn new(provider: P, cache: Arc<dyn Cache<String, RateResult>>) -> Self {
        RateService { provider, cache }
    }

    pub fn pair(&self) -> (&str, &str) {
        self.provider.pair()
    }

    pub fn cache_key(&self, day: NaiveDate) -> String {
        let (base, quote) = self.pair();
        format!(
            "{}_{}_rates_{}",
            base.to_lowercase(),
            quote.to_lowercase(),
            day.format("%Y-%m-%d")
        )
    }

    /// Today's rate summary, fetched at most once per UTC day.
    pub async fn get_usd_rate(&self) -> Result<RateResult> {
        self.rate_for_day(Utc::now().date_naive()).await
    }

    #[instrument(name = "RateLookup", skip(self))]
    pub async fn rate_for_day(&self, day: NaiveDate) -> Result<RateResult> {
        let key = self.cache_key(day);
        if let Some(cached) = self.cache.get(&key).await {
            debug!(key = %key, "Serving cached rate result");
            return Ok(cached);
        }

        let samples = self.provider.fetch_daily_closes().await?;
        let result = RateResult::from_samples(&samples)
            .ok_or_else(|| Error::DataUnavailable("No data found from API".to_string()))?;
        info!(
            samples = samples.len(),
            current_price = result.current_price,
            "Fetched rate history"
        );

        self.cache.set(key, result.clone()).await;
        Ok(result)
    }
}
