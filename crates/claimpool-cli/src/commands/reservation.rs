//! Reservation CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use claimpool_core::config::AppConfig;
use claimpool_core::error::AppError;
use claimpool_core::types::{HolderId, ReservationId};
use claimpool_entity::{ReleaseReason, Reservation, ReservationStatus};
use claimpool_service::ReservationTarget;

use crate::output::{self, OutputFormat};

/// Arguments for reservation commands
#[derive(Debug, Args)]
pub struct ReservationArgs {
    /// Reservation subcommand
    #[command(subcommand)]
    pub command: ReservationCommand,
}

/// Reservation subcommands
#[derive(Debug, Subcommand)]
pub enum ReservationCommand {
    /// Reserve the lowest available unit for a holder
    Allocate {
        /// Holder ID
        holder: String,
    },
    /// Record a confirmed payment
    Complete {
        /// Reservation ID
        #[arg(long, conflicts_with = "holder", required_unless_present = "holder")]
        id: Option<String>,
        /// Holder ID, completing the holder's active reservation
        #[arg(long)]
        holder: Option<String>,
        /// Payment reference
        #[arg(long)]
        external_ref: Option<String>,
    },
    /// Release a reservation back to the pool
    Release {
        /// Reservation ID
        id: String,
        /// Reason: cancelled or expired
        #[arg(long, default_value = "cancelled")]
        reason: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Show a holder's active reservation and countdown
    Status {
        /// Holder ID
        holder: String,
    },
    /// Show every reservation a holder made
    History {
        /// Holder ID
        holder: String,
    },
    /// List reservations
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
    },
}

/// Reservation display row
#[derive(Debug, Serialize, Tabled)]
struct ReservationRow {
    /// Reservation ID
    id: String,
    /// Holder
    holder: String,
    /// Unit
    unit: i64,
    /// Status
    status: String,
    /// Reserved
    reserved: String,
    /// Expires
    expires: String,
    /// Ended
    ended: String,
}

impl From<&Reservation> for ReservationRow {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id.to_string(),
            holder: r.holder_id.to_string(),
            unit: r.unit_ordinal,
            status: r.status.to_string(),
            reserved: output::opt_time(Some(r.reserved_at)),
            expires: output::opt_time(Some(r.expires_at)),
            ended: output::opt_time(r.ended_at),
        }
    }
}

fn parse_id(s: &str) -> Result<ReservationId, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid reservation id: {s}")))
}

fn print_reservations(reservations: &[Reservation], format: OutputFormat) {
    let rows: Vec<ReservationRow> = reservations.iter().map(ReservationRow::from).collect();
    output::print_list(&rows, format);
}

/// Execute reservation commands
pub async fn execute(
    args: &ReservationArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (stores, engine) = super::open_engine(config).await?;

    match &args.command {
        ReservationCommand::Allocate { holder } => {
            let holder = HolderId::parse(holder.as_str())?;
            let allocation = engine.allocate_with_retry(&holder).await?;
            match format {
                OutputFormat::Json => output::print_json(&allocation),
                OutputFormat::Table => {
                    if allocation.is_existing {
                        output::print_warning("Holder already had an active reservation.");
                    } else {
                        output::print_success("Unit reserved.");
                    }
                    output::print_kv("Reservation", &allocation.reservation.id.to_string());
                    output::print_kv("Unit", &allocation.unit.ordinal.to_string());
                    output::print_kv(
                        "Expires",
                        &output::opt_time(Some(allocation.reservation.expires_at)),
                    );
                }
            }
        }
        ReservationCommand::Complete {
            id,
            holder,
            external_ref,
        } => {
            let target = match (id, holder) {
                (Some(id), _) => ReservationTarget::Id(parse_id(id)?),
                (None, Some(holder)) => ReservationTarget::Holder(HolderId::parse(holder.as_str())?),
                (None, None) => {
                    return Err(AppError::validation("either --id or --holder is required"));
                }
            };
            let completion = engine.complete(target, external_ref.as_deref()).await?;
            match format {
                OutputFormat::Json => output::print_json(&completion),
                OutputFormat::Table => {
                    output::print_success(&format!(
                        "Unit #{} sold to {}.",
                        completion.unit.ordinal, completion.reservation.holder_id
                    ));
                }
            }
        }
        ReservationCommand::Release { id, reason, force } => {
            let id = parse_id(id)?;
            let reason: ReleaseReason = reason.parse().map_err(AppError::validation)?;

            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Release reservation {id} as {reason}?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    stores.close().await;
                    return Ok(());
                }
            }

            let reservation = engine.release(id, reason).await?;
            match format {
                OutputFormat::Json => output::print_json(&reservation),
                OutputFormat::Table => output::print_success(&format!(
                    "Reservation {} is now {}; unit #{} is back in the pool.",
                    reservation.id, reservation.status, reservation.unit_ordinal
                )),
            }
        }
        ReservationCommand::Status { holder } => {
            let holder = HolderId::parse(holder.as_str())?;
            let active = engine.get_active(&holder).await?;
            match (format, active) {
                (OutputFormat::Json, active) => output::print_json(&active),
                (OutputFormat::Table, None) => println!("No active reservation."),
                (OutputFormat::Table, Some(active)) => {
                    output::print_kv("Reservation", &active.reservation.id.to_string());
                    output::print_kv("Unit", &active.unit.ordinal.to_string());
                    output::print_kv("Remaining", &format!("{}s", active.remaining_ms / 1000));
                    output::print_kv("Expired", &active.is_expired.to_string());
                    output::print_kv(
                        "Payment window",
                        if active.is_payment_window_open {
                            "open"
                        } else {
                            "closed"
                        },
                    );
                }
            }
        }
        ReservationCommand::History { holder } => {
            let holder = HolderId::parse(holder.as_str())?;
            let reservations = engine.holder_history(&holder).await?;
            print_reservations(&reservations, format);
        }
        ReservationCommand::List { status } => {
            let status = status
                .as_deref()
                .map(|s| s.parse::<ReservationStatus>().map_err(AppError::validation))
                .transpose()?;
            let reservations = engine.list_reservations(status).await?;
            print_reservations(&reservations, format);
        }
    }

    stores.close().await;
    Ok(())
}
