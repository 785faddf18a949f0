//! `dstore bulk-put` command implementation
//!
//! Stores the items given in the expression with one call, or imports a
//! JSON Lines file with `--from-file`.

use crate::api::{ApiClient, BulkPutRequest, BulkPutResult, DatastoreApi};
use crate::commands::expression;
use crate::config::{Config, ImportLimits};
use crate::error::{CliError, Result};
use crate::manifest::Manifest;
use crate::progress::StatusLine;
use crate::transfer::{run_import, ErrorLog, ImportOptions, ImportSummary};
use chrono::Utc;
use colored::Colorize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments of `dstore bulk-put`
#[derive(Debug, Clone, Default)]
pub struct BulkPutArgs {
    pub expression: Option<String>,
    pub datastore: Option<String>,
    pub from_file: Option<PathBuf>,
    pub primary_key: Option<String>,
    pub manifest: PathBuf,
    pub show: bool,
}

/// Run the bulk-put command
pub async fn run(config: &Config, args: BulkPutArgs) -> Result<()> {
    let mut request: BulkPutRequest = expression::parse(args.expression.as_deref())?;
    expression::merge_scope(
        &mut request.datastore,
        &mut request.app,
        args.datastore.as_deref(),
        config.app_id.as_deref(),
    )?;

    if args.from_file.is_some() && !request.items.is_empty() {
        return Err(CliError::mismatched_flags(
            "items cannot be given in the expression together with --from-file",
        ));
    }

    if args.show {
        return expression::show(&request);
    }

    let client = ApiClient::new(config.server_url.as_str(), config.token.clone())?;

    let Some(path) = args.from_file else {
        if request.items.is_empty() {
            return Err(CliError::invalid_expression(
                "no items to store; add \"items\" to the expression or pass --from-file",
            ));
        }
        let result = client.bulk_put(&request).await?;
        print_bulk_put_result(&result)?;
        return Ok(());
    };

    let primary_key = match args.primary_key {
        Some(key) => key,
        None => Manifest::load(&args.manifest)?
            .primary_key(&request.datastore)?
            .to_string(),
    };

    let options = ImportOptions {
        datastore: request.datastore,
        app: request.app,
        primary_key,
        limits: ImportLimits::default(),
    };

    println!(
        "{} Importing datastore items from {}",
        "→".cyan(),
        path.display()
    );
    let summary = import_file(&client, &options, &path, &config.logs_dir).await?;

    if summary.truncated {
        println!(
            "{} Import will be limited to the first {} items in the file.",
            "⚠".yellow(),
            options.limits.max_total_items
        );
    }
    if let Some(log) = &summary.error_log {
        println!(
            "{} Some items failed to be imported. Check {} for more details.",
            "⚠".yellow(),
            log.display()
        );
    }

    Ok(())
}

/// Import the JSON Lines file at `path`, logging failures under `logs_dir`
pub async fn import_file<A>(
    api: &A,
    options: &ImportOptions,
    path: &Path,
    logs_dir: &Path,
) -> Result<ImportSummary>
where
    A: DatastoreApi + ?Sized,
{
    let input = BufReader::new(File::open(path)?);
    let error_log = ErrorLog::create_in(logs_dir, Utc::now())?;
    info!(
        file = %path.display(),
        error_log = %error_log.path().display(),
        "Starting bulk put import"
    );

    let mut status = StatusLine::new();
    run_import(api, options, input, error_log, &mut status).await
}

fn print_bulk_put_result(result: &BulkPutResult) -> Result<()> {
    println!(
        "{} Stored items in the datastore: {}",
        "✓".green(),
        result.datastore.bold()
    );

    if !result.failed_items.is_empty() {
        println!();
        println!(
            "{} Some items failed to be inserted and should be retried:",
            "⚠".yellow()
        );
        println!("{}", serde_json::to_string_pretty(&result.failed_items)?);
    }
    Ok(())
}
