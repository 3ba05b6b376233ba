use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tierfx::cli::calculate::CalculateOptions;
use tierfx::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct CalculateArgs {
    /// JSON request file; config defaults are used when omitted
    #[arg(short, long)]
    request: Option<PathBuf>,

    #[arg(long)]
    principal: Option<f64>,

    #[arg(long)]
    days: Option<u32>,

    /// Applied as a fraction of gross interest (0.15 = 15%)
    #[arg(long)]
    withholding_tax: Option<f64>,

    #[arg(long)]
    usd_start_rate: Option<f64>,

    #[arg(long)]
    usd_end_rate: Option<f64>,

    /// Also print the day-by-day schedule
    #[arg(long)]
    daily: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

impl From<CalculateArgs> for CalculateOptions {
    fn from(args: CalculateArgs) -> Self {
        CalculateOptions {
            request_path: args.request,
            principal: args.principal,
            days: args.days,
            withholding_tax: args.withholding_tax,
            usd_start_rate: args.usd_start_rate,
            usd_end_rate: args.usd_end_rate,
            daily: args.daily,
            json: args.json,
        }
    }
}

impl From<Commands> for tierfx::AppCommand {
    fn from(cmd: Commands) -> tierfx::AppCommand {
        match cmd {
            Commands::Calculate(args) => tierfx::AppCommand::Calculate(args.into()),
            Commands::Rate { json } => tierfx::AppCommand::Rate { json },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Project a deposit through the tier table
    Calculate(CalculateArgs),
    /// Show today's USD rate and its 30 day trend
    Rate {
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => tierfx::cli::setup::setup(),
        Some(cmd) => tierfx::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
