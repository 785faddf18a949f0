//! `dstore count` command implementation
//!
//! Counts every item in a datastore, or only those matching the expression.

use crate::api::{ApiClient, CountRequest, CountResult, DatastoreApi};
use crate::commands::expression;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;

/// Arguments of `dstore count`
#[derive(Debug, Clone, Default)]
pub struct CountArgs {
    pub expression: Option<String>,
    pub datastore: Option<String>,
    pub show: bool,
}

/// Run the count command
pub async fn run(config: &Config, args: CountArgs) -> Result<()> {
    let request = build_request(config, &args)?;
    if args.show {
        return expression::show(&request);
    }

    let client = ApiClient::new(config.server_url.as_str(), config.token.clone())?;
    let result = client.count(&request).await?;
    println!("{}", format_result(&result));
    Ok(())
}

pub fn build_request(config: &Config, args: &CountArgs) -> Result<CountRequest> {
    let mut request: CountRequest = expression::parse(args.expression.as_deref())?;
    expression::merge_scope(
        &mut request.datastore,
        &mut request.app,
        args.datastore.as_deref(),
        config.app_id.as_deref(),
    )?;
    Ok(request)
}

fn format_result(result: &CountResult) -> String {
    format!(
        "{} Counted {} matching items from datastore: {}",
        "✓".green(),
        result.count,
        result.datastore.bold()
    )
}
