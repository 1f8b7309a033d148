//! Manual expiry sweep.

use clap::Args;

use claimpool_core::config::AppConfig;
use claimpool_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the sweep command
#[derive(Debug, Args)]
pub struct SweepArgs {}

/// Run one sweep and print its report
pub async fn execute(
    _args: &SweepArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (stores, engine) = super::open_engine(config).await?;
    let report = engine.sweep_report(engine.now()).await?;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            output::print_kv("Examined", &report.examined.to_string());
            output::print_kv("Expired", &report.expired.to_string());
            output::print_kv("In payment window", &report.skipped_payment_window.to_string());
            output::print_kv("Raced", &report.raced.to_string());
            output::print_kv("Failed", &report.failed.to_string());
            if report.failed > 0 {
                output::print_warning("Some reservations could not be expired; see logs.");
            }
        }
    }

    stores.close().await;
    Ok(())
}
