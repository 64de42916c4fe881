//! Asset administration and legacy layout migration commands.

use chrono::Duration;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use assethub_core::config::AppConfig;
use assethub_core::error::AppError;
use assethub_entity::asset::{CategoryStat, FolderStat};
use assethub_entity::migration::{MigrationItem, MigrationReport};

use super::{Context, confirm};
use crate::output::{self, OutputFormat};

/// Arguments for the assets command
#[derive(Debug, Args)]
pub struct AssetsArgs {
    /// Assets subcommand
    #[command(subcommand)]
    pub command: AssetsCommand,
}

/// Assets subcommands
#[derive(Debug, Subcommand)]
pub enum AssetsCommand {
    /// Report which assets still use the legacy naming layout
    Preview {
        /// Acting administrator recorded in the audit trail
        #[arg(long)]
        actor_id: Option<i64>,
    },
    /// Move legacy-named assets to the identity-based layout
    Execute {
        /// Acting administrator recorded in the audit trail
        #[arg(long)]
        actor_id: Option<i64>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show registry totals by category and folder
    Stats,
    /// Hard-delete provisional rows left behind by interrupted uploads
    PurgePending {
        /// Only rows older than this many hours (defaults to the configured retention)
        #[arg(long)]
        older_than_hours: Option<i64>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ItemRow {
    #[tabled(rename = "File ID")]
    file_id: i64,
    #[tabled(rename = "Old path")]
    old_path: String,
    #[tabled(rename = "New path")]
    new_path: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&MigrationItem> for ItemRow {
    fn from(item: &MigrationItem) -> Self {
        Self {
            file_id: item.file_id,
            old_path: item.old_path.clone(),
            new_path: item.new_path.clone(),
            status: item.status.to_string(),
            error: item.error.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct GroupRow {
    #[tabled(rename = "Group")]
    name: String,
    #[tabled(rename = "Files")]
    file_count: i64,
    #[tabled(rename = "Size")]
    size: String,
}

impl From<&CategoryStat> for GroupRow {
    fn from(stat: &CategoryStat) -> Self {
        Self {
            name: stat.category.clone(),
            file_count: stat.file_count,
            size: output::format_bytes(stat.total_size_bytes),
        }
    }
}

impl From<&FolderStat> for GroupRow {
    fn from(stat: &FolderStat) -> Self {
        Self {
            name: stat.folder.clone(),
            file_count: stat.file_count,
            size: output::format_bytes(stat.total_size_bytes),
        }
    }
}

/// Execute assets commands
pub async fn execute(args: &AssetsArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let ctx = Context::connect(config).await?;

    match &args.command {
        AssetsCommand::Preview { actor_id } => {
            let report = ctx.migrator.preview(*actor_id).await?;
            print_report(&report, format);
        }
        AssetsCommand::Execute { actor_id, yes } => {
            if !confirm("Move every legacy-named asset to the new layout?", *yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            let report = ctx.migrator.execute(*actor_id).await?;
            print_report(&report, format);
        }
        AssetsCommand::Stats => {
            let stats = ctx.assets.stats().await?;
            match format {
                OutputFormat::Json => output::print_json(&stats),
                OutputFormat::Table => {
                    output::print_kv("Total assets", &stats.total_assets.to_string());
                    output::print_kv("Active assets", &stats.active_assets.to_string());
                    output::print_kv("Deleted assets", &stats.deleted_assets.to_string());
                    output::print_kv("Total size", &output::format_bytes(stats.total_size_bytes));
                    println!();
                    let by_category: Vec<GroupRow> = stats.by_category.iter().map(GroupRow::from).collect();
                    output::print_list(&by_category, format);
                    println!();
                    let by_folder: Vec<GroupRow> = stats.by_folder.iter().map(GroupRow::from).collect();
                    output::print_list(&by_folder, format);
                }
            }
        }
        AssetsCommand::PurgePending { older_than_hours, yes } => {
            let hours = older_than_hours.unwrap_or(config.assets.pending_retention_hours);
            let prompt = format!("Delete provisional rows older than {hours} hours?");
            if !confirm(&prompt, *yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            let purged = ctx.assets.purge_pending(Duration::hours(hours)).await?;
            output::print_success(&format!("Purged {purged} provisional rows."));
        }
    }

    ctx.db.close().await;
    Ok(())
}

fn print_report(report: &MigrationReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(report);
        return;
    }

    let rows: Vec<ItemRow> = report.items.iter().map(ItemRow::from).collect();
    output::print_list(&rows, format);
    println!();
    output::print_kv("Mode", if report.is_preview { "preview" } else { "execute" });
    output::print_kv("Assets examined", &report.total_assets.to_string());
    output::print_kv("Needs migration", &report.needs_migration.to_string());
    output::print_kv("Already migrated", &report.already_migrated.to_string());
    if !report.is_preview {
        output::print_kv("Migrated", &report.success_count.to_string());
        output::print_kv("Errors", &report.error_count.to_string());
        output::print_kv("Missing files", &report.file_not_found_count.to_string());
        if report.error_count + report.file_not_found_count > 0 {
            output::print_warning("Some assets were not migrated; rerun after fixing the listed items.");
        }
    }
}
