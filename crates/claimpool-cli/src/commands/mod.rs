//! CLI command definitions and dispatch.

pub mod migrate;
pub mod pool;
pub mod reservation;
pub mod sweep;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use claimpool_core::config::AppConfig;
use claimpool_core::error::AppError;
use claimpool_core::traits::SystemClock;
use claimpool_database::StoreSet;
use claimpool_service::ReservationEngine;

use crate::output::OutputFormat;

/// ClaimPool: reservation and allocation over a finite pool of units
#[derive(Debug, Parser)]
#[command(name = "claimpool", version, about, long_about = None)]
pub struct Cli {
    /// Configuration directory
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Configuration environment overlay, e.g. `production`
    #[arg(short, long, default_value = "development", env = "CLAIMPOOL_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Unit pool management
    Pool(pool::PoolArgs),
    /// Reservation operations
    Reservation(reservation::ReservationArgs),
    /// Expire overdue reservations now
    Sweep(sweep::SweepArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = self.load_config()?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Pool(args) => pool::execute(args, &config, self.format).await,
            Commands::Reservation(args) => {
                reservation::execute(args, &config, self.format).await
            }
            Commands::Sweep(args) => sweep::execute(args, &config, self.format).await,
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        let config = AppConfig::load_from(&self.config, &self.env)?;
        config.validate()?;
        Ok(config)
    }
}

/// Helper: open the configured stores and build an engine over them
pub async fn open_engine(config: &AppConfig) -> Result<(StoreSet, ReservationEngine), AppError> {
    let stores = StoreSet::open(config).await?;
    let engine = ReservationEngine::from_stores(
        &stores,
        Arc::new(SystemClock),
        config.reservation.clone(),
    );
    Ok((stores, engine))
}
