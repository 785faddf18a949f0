//! `dstore get` and `dstore bulk-get` command implementation
//!
//! Reads items by primary-key value rather than by expression.

use crate::api::{ApiClient, BulkGetRequest, BulkGetResult, DatastoreApi, GetRequest, GetResult};
use crate::commands::expression;
use crate::commands::query::OutputFormat;
use crate::config::Config;
use crate::error::{CliError, Result};
use colored::Colorize;

/// Arguments of `dstore get` and `dstore bulk-get`
#[derive(Debug, Clone, Default)]
pub struct GetArgs {
    pub expression: Option<String>,
    pub datastore: Option<String>,
    pub output: OutputFormat,
    pub show: bool,
}

/// Run the get command
pub async fn run(config: &Config, args: GetArgs) -> Result<()> {
    let request = build_get_request(config, &args)?;
    if args.show {
        return expression::show(&request);
    }

    let client = ApiClient::new(config.server_url.as_str(), config.token.clone())?;
    let result = client.get(&request).await?;
    println!("{}", format_get_result(&result, args.output)?);
    Ok(())
}

/// Run the bulk-get command
pub async fn run_bulk(config: &Config, args: GetArgs) -> Result<()> {
    let request = build_bulk_get_request(config, &args)?;
    if args.show {
        return expression::show(&request);
    }

    let client = ApiClient::new(config.server_url.as_str(), config.token.clone())?;
    let result = client.bulk_get(&request).await?;
    println!(
        "{}",
        format_bulk_get_result(&result, request.ids.len(), args.output)?
    );
    Ok(())
}

pub fn build_get_request(config: &Config, args: &GetArgs) -> Result<GetRequest> {
    let mut request: GetRequest = expression::parse_required(args.expression.as_deref(), "get")?;
    expression::merge_scope(
        &mut request.datastore,
        &mut request.app,
        args.datastore.as_deref(),
        config.app_id.as_deref(),
    )?;

    if request.id.is_empty() {
        return Err(CliError::invalid_expression(
            "no item to get; add \"id\" to the expression",
        ));
    }
    Ok(request)
}

pub fn build_bulk_get_request(config: &Config, args: &GetArgs) -> Result<BulkGetRequest> {
    let mut request: BulkGetRequest =
        expression::parse_required(args.expression.as_deref(), "bulk-get")?;
    expression::merge_scope(
        &mut request.datastore,
        &mut request.app,
        args.datastore.as_deref(),
        config.app_id.as_deref(),
    )?;

    if request.ids.is_empty() {
        return Err(CliError::invalid_expression(
            "no items to get; add \"ids\" to the expression",
        ));
    }
    Ok(request)
}

fn format_get_result(result: &GetResult, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(result)?);
    }

    let item = if result.item.is_empty() {
        "Not found".to_string()
    } else {
        serde_json::to_string_pretty(&result.item)?
    };
    Ok(format!(
        "{} Get from datastore: {}\n\n{}",
        "✓".green(),
        result.datastore.bold(),
        item
    ))
}

fn format_bulk_get_result(
    result: &BulkGetResult,
    requested: usize,
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(result)?);
    }

    let missing = if result.is_missing_ids(requested) {
        " Not all IDs were found"
    } else {
        ""
    };
    let mut text = format!(
        "{} Get from datastore: {}.{}\n\n{}",
        "✓".green(),
        result.datastore.bold(),
        missing,
        serde_json::to_string_pretty(&result.items)?
    );

    if !result.failed_items.is_empty() {
        text.push_str(&format!(
            "\n\n{} Some items failed to be retrieved and should be retried:\n\n{}",
            "⚠".yellow(),
            serde_json::to_string_pretty(&result.failed_items)?
        ));
    }
    Ok(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::transfer::fake::FakeApi;

    fn args(expression: &str) -> GetArgs {
        GetArgs {
            expression: Some(expression.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_found_and_missing() {
        let api = FakeApi::with_dataset(5);
        let config = Config::default();

        let request = build_get_request(&config, &args(r#"{"datastore": "tasks", "id": "3"}"#)).unwrap();
        let text = format_get_result(&api.get(&request).await.unwrap(), OutputFormat::Text).unwrap();
        assert!(text.contains(r#""title": "task 3""#));

        let request = build_get_request(&config, &args(r#"{"datastore": "tasks", "id": "99"}"#)).unwrap();
        let text = format_get_result(&api.get(&request).await.unwrap(), OutputFormat::Text).unwrap();
        assert!(text.ends_with("Not found"));
    }

    #[test]
    fn test_get_requires_id() {
        let err = build_get_request(&Config::default(), &args(r#"{"datastore": "tasks"}"#)).unwrap_err();
        assert!(matches!(err, CliError::InvalidExpression(_)));
    }

    #[tokio::test]
    async fn test_bulk_get_reports_missing_ids() {
        let api = FakeApi::with_dataset(5);
        let mut args = args(r#"{"ids": ["1", "2", "77"]}"#);
        args.datastore = Some("tasks".to_string());

        let request = build_bulk_get_request(&Config::default(), &args).unwrap();
        let result = api.bulk_get(&request).await.unwrap();
        assert_eq!(result.items.len(), 2);

        let text = format_bulk_get_result(&result, request.ids.len(), OutputFormat::Text).unwrap();
        assert!(text.contains("Not all IDs were found"));
        assert!(!text.contains("should be retried"));
    }

    #[test]
    fn test_bulk_get_lists_failed_ids() {
        let result = BulkGetResult {
            datastore: "tasks".to_string(),
            items: Vec::new(),
            failed_items: vec!["42".to_string()],
        };
        let text = format_bulk_get_result(&result, 1, OutputFormat::Text).unwrap();
        assert!(text.contains("Some items failed to be retrieved and should be retried"));
        assert!(!text.contains("Not all IDs were found"));

        let json = format_bulk_get_result(&result, 1, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["failed_items"][0], "42");
    }
}
