//! Unit pool CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use claimpool_core::config::AppConfig;
use claimpool_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for pool commands
#[derive(Debug, Args)]
pub struct PoolArgs {
    /// Pool subcommand
    #[command(subcommand)]
    pub command: PoolCommand,
}

/// Pool subcommands
#[derive(Debug, Subcommand)]
pub enum PoolCommand {
    /// Add available units; existing ordinals are skipped
    Seed {
        /// Number of units to add
        #[arg(short = 'n', long)]
        count: u32,
        /// Ordinal of the first unit
        #[arg(long, default_value_t = 1)]
        first_ordinal: i64,
        /// Label prefix, producing labels like `Prefix #7`
        #[arg(long)]
        label_prefix: Option<String>,
    },
    /// Show per-status counts
    Stats,
    /// List units in allocation order
    Units,
}

/// Unit display row
#[derive(Debug, Serialize, Tabled)]
struct UnitRow {
    /// Ordinal
    ordinal: i64,
    /// Label
    label: String,
    /// Status
    status: String,
    /// Expires
    expires: String,
    /// Sold To
    sold_to: String,
    /// Attribution
    attribution: String,
}

/// Execute pool commands
pub async fn execute(
    args: &PoolArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (stores, engine) = super::open_engine(config).await?;

    match &args.command {
        PoolCommand::Seed {
            count,
            first_ordinal,
            label_prefix,
        } => {
            let inserted = engine
                .populate(*first_ordinal, *count, label_prefix.as_deref())
                .await?;
            if inserted < u64::from(*count) {
                output::print_warning(&format!(
                    "{} ordinal(s) already existed and were skipped",
                    u64::from(*count) - inserted
                ));
            }
            output::print_success(&format!("Added {inserted} unit(s) to the pool."));
        }
        PoolCommand::Stats => {
            let stats = engine.pool_stats().await?;
            match format {
                OutputFormat::Json => output::print_json(&stats),
                OutputFormat::Table => {
                    println!("Pool statistics:");
                    output::print_kv("Total", &stats.total.to_string());
                    output::print_kv("Available", &stats.available.to_string());
                    output::print_kv("Reserved", &stats.reserved.to_string());
                    output::print_kv("Sold", &stats.sold.to_string());
                    output::print_kv("Sold %", &format!("{:.1}", stats.sold_percent()));
                    if stats.is_sold_out() {
                        output::print_warning("The pool is sold out.");
                    }
                }
            }
        }
        PoolCommand::Units => {
            let units = engine.list_units().await?;
            let rows: Vec<UnitRow> = units
                .iter()
                .map(|u| UnitRow {
                    ordinal: u.ordinal,
                    label: u.label.clone().unwrap_or_default(),
                    status: u.status.to_string(),
                    expires: output::opt_time(u.expires_at),
                    sold_to: u.sold_to.as_ref().map(ToString::to_string).unwrap_or_default(),
                    attribution: u.attribution_snapshot.clone().unwrap_or_default(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    stores.close().await;
    Ok(())
}
