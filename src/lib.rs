pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::calculate::CalculateOptions;
use crate::core::RateService;
use crate::core::config::AppConfig;
use crate::providers::twelve_data::TwelveDataProvider;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Calculate(CalculateOptions),
    Rate { json: bool },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("tierfx starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(data_path = ?config.data_path, "Loaded config");

    match command {
        AppCommand::Calculate(options) => cli::calculate::run(&options, &config.defaults),
        AppCommand::Rate { json } => {
            let provider = TwelveDataProvider::from_config(&config.providers.twelve_data)?;
            let cache = store::open_rate_cache(config.default_data_path().ok().as_deref());
            let service = RateService::new(provider, cache);
            cli::rate::run(&service, json).await
        }
    }
}
