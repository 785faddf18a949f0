//! `dstore delete` and `dstore bulk-delete` command implementation

use crate::api::{ApiClient, BulkDeleteRequest, BulkDeleteResult, DatastoreApi, DeleteRequest, DeleteResult};
use crate::commands::expression;
use crate::config::Config;
use crate::error::{CliError, Result};
use colored::Colorize;
use tracing::info;

/// Arguments of `dstore delete` and `dstore bulk-delete`
#[derive(Debug, Clone, Default)]
pub struct DeleteArgs {
    pub expression: Option<String>,
    pub datastore: Option<String>,
    pub show: bool,
}

/// Run the delete command
pub async fn run(config: &Config, args: DeleteArgs) -> Result<()> {
    let request = build_delete_request(config, &args)?;
    if args.show {
        return expression::show(&request);
    }

    let client = ApiClient::new(config.server_url.as_str(), config.token.clone())?;
    let result = client.delete(&request).await?;
    info!(datastore = %result.datastore, id = %result.id, "Deleted item");

    println!("{}", format_delete_result(&result));
    print_follow_up();
    Ok(())
}

/// Run the bulk-delete command
pub async fn run_bulk(config: &Config, args: DeleteArgs) -> Result<()> {
    let request = build_bulk_delete_request(config, &args)?;
    if args.show {
        return expression::show(&request);
    }

    let client = ApiClient::new(config.server_url.as_str(), config.token.clone())?;
    let result = client.bulk_delete(&request).await?;
    info!(
        datastore = %result.datastore,
        requested = request.ids.len(),
        failed = result.failed_items.len(),
        "Deleted items"
    );

    println!("{}", format_bulk_delete_result(&result)?);
    print_follow_up();
    Ok(())
}

pub fn build_delete_request(config: &Config, args: &DeleteArgs) -> Result<DeleteRequest> {
    let mut request: DeleteRequest = expression::parse_required(args.expression.as_deref(), "delete")?;
    expression::merge_scope(
        &mut request.datastore,
        &mut request.app,
        args.datastore.as_deref(),
        config.app_id.as_deref(),
    )?;

    if request.id.is_empty() {
        return Err(CliError::invalid_expression(
            "no item to delete; add \"id\" to the expression",
        ));
    }
    Ok(request)
}

pub fn build_bulk_delete_request(config: &Config, args: &DeleteArgs) -> Result<BulkDeleteRequest> {
    let mut request: BulkDeleteRequest =
        expression::parse_required(args.expression.as_deref(), "bulk-delete")?;
    expression::merge_scope(
        &mut request.datastore,
        &mut request.app,
        args.datastore.as_deref(),
        config.app_id.as_deref(),
    )?;

    if request.ids.is_empty() {
        return Err(CliError::invalid_expression(
            "no items to delete; add \"ids\" to the expression",
        ));
    }
    Ok(request)
}

fn format_delete_result(result: &DeleteResult) -> String {
    format!(
        "{} Deleted from datastore: {}\n\nprimary_key: {}",
        "✓".green(),
        result.datastore.bold(),
        result.id
    )
}

fn format_bulk_delete_result(result: &BulkDeleteResult) -> Result<String> {
    let mut text = format!("{} Deleted from datastore: {}", "✓".green(), result.datastore.bold());
    if !result.failed_items.is_empty() {
        text.push_str(&format!(
            "\n\n{} Some items failed to be deleted and should be retried:\n\n{}",
            "⚠".yellow(),
            serde_json::to_string_pretty(&result.failed_items)?
        ));
    }
    Ok(text)
}

fn print_follow_up() {
    println!();
    println!(
        "To inspect the datastore after updates, run {}",
        "dstore query <expression>".cyan()
    );
}
