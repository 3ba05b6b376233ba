//! Core business logic: the compounding engine and the rate service

pub mod cache;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod log;
pub mod rate;
pub mod rate_service;
pub mod rounding;
pub mod tier;
pub mod validation;

// Re-export main types for cleaner imports
pub use calculation::{CalculationRequest, CalculationResponse, DailyResult, TierSummary};
pub use error::{Error, FieldError, ValidationError};
pub use rate::{RateHistory, RateResult, TimeSeriesProvider};
pub use rate_service::RateService;
pub use tier::Tier;
