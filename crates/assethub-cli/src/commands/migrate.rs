//! Database schema migration commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use assethub_core::config::AppConfig;
use assethub_core::error::AppError;
use assethub_database::DatabasePool;
use assethub_database::migration::{self, SchemaMigration};

use crate::output::{self, OutputFormat};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending schema scripts
    Run,
    /// Show which schema scripts have been applied
    Status,
}

#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    #[tabled(rename = "Version")]
    version: i64,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Applied")]
    applied: String,
    #[tabled(rename = "Duration (ms)")]
    duration_ms: String,
}

impl From<SchemaMigration> for MigrationRow {
    fn from(m: SchemaMigration) -> Self {
        let applied = match (m.installed_on, m.success) {
            (Some(at), Some(true)) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
            (Some(_), _) => "failed".to_string(),
            (None, _) => "pending".to_string(),
        };
        Self {
            version: m.version,
            description: m.description,
            applied,
            duration_ms: m.duration_ms.map(|d| d.to_string()).unwrap_or_default(),
        }
    }
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            migration::run_migrations(db.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Status => {
            let rows: Vec<MigrationRow> = migration::migration_status(db.pool())
                .await?
                .into_iter()
                .map(MigrationRow::from)
                .collect();
            output::print_list(&rows, format);
        }
    }

    db.close().await;
    Ok(())
}
