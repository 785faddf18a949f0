//! `dstore query` command implementation
//!
//! Prints one page of matching items, or exports every match to a JSON Lines
//! file with `--to-file`.

use crate::api::{ApiClient, DatastoreApi, QueryRequest, QueryResult};
use crate::commands::expression;
use crate::config::{Config, ExportLimits};
use crate::error::{CliError, Result};
use crate::progress::StatusLine;
use crate::transfer::{run_export, ExportSummary};
use clap::ValueEnum;
use colored::Colorize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// How a single page of results is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Header plus one pretty-printed item per block
    #[default]
    Text,
    /// The whole query result as JSON
    Json,
}

/// Arguments of `dstore query`
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub expression: Option<String>,
    pub datastore: Option<String>,
    pub to_file: Option<PathBuf>,
    pub output: Option<OutputFormat>,
    pub show: bool,
}

/// Run the query command
pub async fn run(config: &Config, args: QueryArgs) -> Result<()> {
    if args.to_file.is_some() && args.output.is_some() {
        return Err(CliError::mismatched_flags(
            "--output cannot be used with --to-file; exports are always JSON Lines",
        ));
    }

    let mut request: QueryRequest = expression::parse(args.expression.as_deref())?;
    expression::merge_scope(
        &mut request.datastore,
        &mut request.app,
        args.datastore.as_deref(),
        config.app_id.as_deref(),
    )?;

    if args.show {
        return expression::show(&request);
    }

    let client = ApiClient::new(config.server_url.as_str(), config.token.clone())?;

    let Some(path) = args.to_file else {
        let result = client.query(&request).await?;
        return print_query_result(&result, args.output.unwrap_or_default());
    };

    println!(
        "{} Exporting datastore items to {}",
        "→".cyan(),
        path.display()
    );
    let limits = ExportLimits::default();
    let summary = export_to_file(&client, &request, limits, &path).await?;

    if summary.truncated {
        println!(
            "{} Export will be limited to the first {} items in the datastore",
            "⚠".yellow(),
            limits.max_total_items
        );
    }
    Ok(())
}

/// Export every match of `request` into a new file at `path`
pub async fn export_to_file<A>(
    api: &A,
    request: &QueryRequest,
    limits: ExportLimits,
    path: &Path,
) -> Result<ExportSummary>
where
    A: DatastoreApi + ?Sized,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let output = File::create(path)?;
    info!(file = %path.display(), datastore = %request.datastore, "Starting query export");

    let mut status = StatusLine::new();
    run_export(api, request, limits, output, &mut status).await
}

fn print_query_result(result: &QueryResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "{} Retrieved {} items from datastore: {}",
                "✓".green(),
                result.items.len(),
                result.datastore.bold()
            );
            println!();
            for item in &result.items {
                println!("{}", serde_json::to_string_pretty(item)?);
            }
            if let Some(cursor) = result.continuation() {
                println!();
                println!("More items available. Continue with \"cursor\": \"{}\"", cursor);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
    }
    Ok(())
}
