//! Error kinds surfaced by the calculator and the rate service

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range request; never retried.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A required setting such as the provider API key is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The upstream provider failed or returned unusable data; safe to retry later.
    #[error("Rate data unavailable: {0}")]
    DataUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field-level problems found in a request.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Invalid input data{}", describe(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }
}

fn describe(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let details: Vec<String> = errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect();
    format!(": {}", details.join("; "))
}
