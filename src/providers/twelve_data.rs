use super::util::with_retry;
use crate::core::config::TwelveDataConfig;
use crate::core::error::{Error, Result};
use crate::core::rate::{RateSample, TimeSeriesProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct TwelveDataValue {
    datetime: String,
    close: String,
}

#[derive(Debug, Deserialize)]
struct TwelveDataResponse {
    status: Option<String>,
    message: Option<String>,
    values: Option<Vec<TwelveDataValue>>,
}

/// Daily closes of a cross rate from the Twelve Data `time_series/cross` API.
pub struct TwelveDataProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    base: String,
    quote: String,
    outputsize: u32,
}

impl TwelveDataProvider {
    /// Fails with a configuration error when no API key is available, before
    /// any request is made.
    pub fn from_config(config: &TwelveDataConfig) -> Result<Self> {
        Self::with_resolved_key(config, config.api_key())
    }

    /// Builds the provider from an already resolved key, `None` when no
    /// source supplied one.
    pub fn with_resolved_key(config: &TwelveDataConfig, api_key: Option<String>) -> Result<Self> {
        let api_key =
            api_key.ok_or_else(|| Error::Configuration("API Key is missing".to_string()))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &TwelveDataConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("tierfx/1.0")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(TwelveDataProvider {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            base: config.base.clone(),
            quote: config.quote.clone(),
            outputsize: config.outputsize,
        })
    }

    fn url(&self, api_key: &str) -> String {
        format!(
            "{}/time_series/cross?base={}&quote={}&interval=1day&outputsize={}&apikey={}",
            self.base_url, self.base, self.quote, self.outputsize, api_key
        )
    }

    fn parse_values(&self, values: Vec<TwelveDataValue>) -> Result<Vec<RateSample>> {
        values
            .into_iter()
            .map(|v| match v.close.trim().parse::<f64>() {
                Ok(close) if close.is_finite() => Ok(RateSample {
                    datetime: v.datetime,
                    close,
                }),
                _ => Err(Error::DataUnavailable(format!(
                    "Invalid close price '{}' on {} for {}/{}",
                    v.close, v.datetime, self.base, self.quote
                ))),
            })
            .collect()
    }
}

#[async_trait]
impl TimeSeriesProvider for TwelveDataProvider {
    fn pair(&self) -> (&str, &str) {
        (self.base.as_str(), self.quote.as_str())
    }

    #[instrument(name = "TwelveDataFetch", skip(self))]
    async fn fetch_daily_closes(&self) -> Result<Vec<RateSample>> {
        let url = self.url(&self.api_key);
        debug!(
            "Requesting {}/{} rate history from {}",
            self.base,
            self.quote,
            self.url("***")
        );

        let response = with_retry(|| self.client.get(&url).send(), 3, 500)
            .await
            .map_err(|e| Error::DataUnavailable(format!("Request error: {}", e.without_url())))?;

        if !response.status().is_success() {
            return Err(Error::DataUnavailable(format!(
                "HTTP error: {} for {}/{}",
                response.status(),
                self.base,
                self.quote
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| {
                Error::DataUnavailable(format!("Failed to read response: {}", e.without_url()))
            })?;
        let data: TwelveDataResponse = serde_json::from_str(&text).map_err(|e| {
            Error::DataUnavailable(format!(
                "Failed to parse JSON response for {}/{}: {}",
                self.base, self.quote, e
            ))
        })?;

        if data.status.as_deref() == Some("error") {
            return Err(Error::DataUnavailable(
                data.message
                    .unwrap_or_else(|| "TwelveData API Error".to_string()),
            ));
        }

        let values = data.values.unwrap_or_default();
        if values.is_empty() {
            return Err(Error::DataUnavailable("No data found from API".to_string()));
        }
        debug!(count = values.len(), "Received rate history");

        self.parse_values(values)
    }
}
