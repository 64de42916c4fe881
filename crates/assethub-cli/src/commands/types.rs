//! Upload type-rule commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use assethub_core::config::AppConfig;
use assethub_core::error::AppError;
use assethub_entity::type_rule::TypeRule;

use super::Context;
use crate::output::{self, OutputFormat};

/// Arguments for the types command
#[derive(Debug, Args)]
pub struct TypesArgs {
    /// Types subcommand
    #[command(subcommand)]
    pub command: TypesCommand,
}

/// Types subcommands
#[derive(Debug, Subcommand)]
pub enum TypesCommand {
    /// List type rules
    List {
        /// Only rules in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only the rules uploads are currently validated against
        #[arg(long, conflicts_with = "category")]
        enabled: bool,
    },
    /// Enable or disable a rule
    Toggle {
        /// Rule id
        id: i64,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "MIME type")]
    mime_type: String,
    #[tabled(rename = "Extensions")]
    extensions: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Max MB")]
    max_size_mb: i32,
    #[tabled(rename = "Enabled")]
    is_enabled: bool,
    #[tabled(rename = "Name")]
    display_name: String,
}

impl From<TypeRule> for RuleRow {
    fn from(rule: TypeRule) -> Self {
        Self {
            id: rule.id,
            mime_type: rule.mime_type,
            extensions: rule.extensions,
            category: rule.category,
            max_size_mb: rule.max_size_mb,
            is_enabled: rule.is_enabled,
            display_name: rule.display_name,
        }
    }
}

/// Execute type-rule commands
pub async fn execute(args: &TypesArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let ctx = Context::connect(config).await?;

    match &args.command {
        TypesCommand::List { category, enabled } => {
            let rules = match (category, enabled) {
                (Some(category), _) => ctx.type_rules.list_by_category(category).await?,
                (None, true) => ctx.type_rules.list_enabled().await,
                (None, false) => ctx.type_rules.list_all().await?,
            };
            let rows: Vec<RuleRow> = rules.into_iter().map(RuleRow::from).collect();
            output::print_list(&rows, format);
        }
        TypesCommand::Toggle { id } => {
            let rule = ctx
                .type_rules
                .toggle(*id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("File type rule {id} not found")))?;
            let state = if rule.is_enabled { "enabled" } else { "disabled" };
            output::print_success(&format!("{} ({}) is now {state}.", rule.display_name, rule.mime_type));
        }
    }

    ctx.db.close().await;
    Ok(())
}
