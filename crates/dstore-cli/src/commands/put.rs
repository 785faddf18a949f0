//! `dstore put` and `dstore update` command implementation
//!
//! Both send a single item. `put` replaces whatever is stored under the
//! item's primary key; `update` only changes the attributes it names.

use crate::api::{ApiClient, DatastoreApi, PutRequest, PutResult};
use crate::commands::expression;
use crate::config::Config;
use crate::error::{CliError, Result};
use colored::Colorize;
use tracing::info;

/// Which single-item write to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Put,
    Update,
}

impl WriteMode {
    fn command(self) -> &'static str {
        match self {
            WriteMode::Put => "put",
            WriteMode::Update => "update",
        }
    }
}

/// Arguments of `dstore put` and `dstore update`
#[derive(Debug, Clone, Default)]
pub struct PutArgs {
    pub expression: Option<String>,
    pub datastore: Option<String>,
    pub show: bool,
}

/// Run the put or update command
pub async fn run(config: &Config, args: PutArgs, mode: WriteMode) -> Result<()> {
    let request = build_request(config, &args, mode)?;

    if args.show {
        return expression::show(&request);
    }

    let client = ApiClient::new(config.server_url.as_str(), config.token.clone())?;
    let result = write_item(&client, &request, mode).await?;
    info!(datastore = %result.datastore, command = mode.command(), "Stored item");

    println!("{}", format_result(&result)?);
    println!();
    println!(
        "To inspect the datastore after updates, run {}",
        "dstore query <expression>".cyan()
    );
    Ok(())
}

/// Request described by the expression and flags
pub fn build_request(config: &Config, args: &PutArgs, mode: WriteMode) -> Result<PutRequest> {
    let mut request: PutRequest =
        expression::parse_required(args.expression.as_deref(), mode.command())?;
    expression::merge_scope(
        &mut request.datastore,
        &mut request.app,
        args.datastore.as_deref(),
        config.app_id.as_deref(),
    )?;

    if request.item.is_empty() {
        return Err(CliError::invalid_expression(format!(
            "no item to {}; add \"item\" to the expression",
            mode.command()
        )));
    }
    Ok(request)
}

/// Send the item with the call matching `mode`
pub async fn write_item<A>(api: &A, request: &PutRequest, mode: WriteMode) -> Result<PutResult>
where
    A: DatastoreApi + ?Sized,
{
    match mode {
        WriteMode::Put => api.put(request).await,
        WriteMode::Update => api.update(request).await,
    }
}

fn format_result(result: &PutResult) -> Result<String> {
    Ok(format!(
        "{} Stored below record in the datastore: {}\n\n{}",
        "✓".green(),
        result.datastore.bold(),
        serde_json::to_string_pretty(&result.item)?
    ))
}
