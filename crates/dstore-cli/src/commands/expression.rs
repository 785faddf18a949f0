//! JSON expressions given on the command line
//!
//! Every command takes a JSON object describing the request. The
//! `--datastore` and `--app` flags fill in what the expression leaves out
//! and must agree with what it states.

use crate::error::{CliError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parse an optional expression into a request, defaulting when absent
pub fn parse<T>(expression: Option<&str>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match expression.map(str::trim).filter(|text| !text.is_empty()) {
        None => Ok(T::default()),
        Some(text) => serde_json::from_str(text).map_err(|e| CliError::invalid_expression(e.to_string())),
    }
}

/// Parse an expression that `command` cannot run without
pub fn parse_required<T>(expression: Option<&str>, command: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if expression.map(str::trim).filter(|text| !text.is_empty()).is_none() {
        return Err(CliError::invalid_expression(format!(
            "no expression was provided; `dstore {}` needs one",
            command
        )));
    }
    parse(expression)
}

/// Reconcile the expression's datastore and app with the flags
pub fn merge_scope(
    datastore: &mut String,
    app: &mut Option<String>,
    datastore_flag: Option<&str>,
    app_flag: Option<&str>,
) -> Result<()> {
    if let Some(flag) = datastore_flag.filter(|d| !d.is_empty()) {
        if !datastore.is_empty() && datastore != flag {
            return Err(CliError::mismatched_flags(format!(
                "--datastore '{}' does not match the expression's datastore '{}'",
                flag, datastore
            )));
        }
        *datastore = flag.to_string();
    }

    if let Some(flag) = app_flag.filter(|a| !a.is_empty()) {
        match app.as_deref() {
            Some(current) if !current.is_empty() && current != flag => {
                return Err(CliError::mismatched_flags(format!(
                    "--app '{}' does not match the expression's app '{}'",
                    flag, current
                )));
            }
            _ => *app = Some(flag.to_string()),
        }
    }

    if datastore.is_empty() {
        return Err(CliError::invalid_expression(
            "no datastore given; set \"datastore\" in the expression or pass --datastore",
        ));
    }
    Ok(())
}

/// Print the request that would be sent, for `--show`
pub fn show<T: Serialize>(request: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(request)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::api::{BulkPutRequest, QueryRequest};

    #[test]
    fn test_absent_expression_defaults() {
        let request: QueryRequest = parse(None).unwrap();
        assert_eq!(request, QueryRequest::default());
        let request: QueryRequest = parse(Some("   ")).unwrap();
        assert!(request.datastore.is_empty());
    }

    #[test]
    fn test_required_expression_is_missing() {
        let err = parse_required::<QueryRequest>(None, "get").unwrap_err();
        assert!(matches!(err, CliError::InvalidExpression(ref msg) if msg.contains("dstore get")));
        assert!(parse_required::<QueryRequest>(Some(" "), "get").is_err());
    }

    #[test]
    fn test_invalid_json_expression() {
        let err = parse::<QueryRequest>(Some("{datastore: tasks")).unwrap_err();
        assert!(matches!(err, CliError::InvalidExpression(_)));
    }

    #[test]
    fn test_flag_fills_missing_datastore() {
        let mut request: BulkPutRequest = parse(Some(r#"{"items": [{"id": "1"}]}"#)).unwrap();
        merge_scope(&mut request.datastore, &mut request.app, Some("tasks"), Some("A1")).unwrap();
        assert_eq!(request.datastore, "tasks");
        assert_eq!(request.app.as_deref(), Some("A1"));
        assert_eq!(request.items.len(), 1);
    }

    #[test]
    fn test_conflicting_datastore_flag() {
        let mut request: QueryRequest = parse(Some(r#"{"datastore": "tasks"}"#)).unwrap();
        let err = merge_scope(&mut request.datastore, &mut request.app, Some("notes"), None).unwrap_err();
        assert!(matches!(err, CliError::MismatchedFlags(_)));
    }

    #[test]
    fn test_matching_flags_are_accepted() {
        let mut request: QueryRequest =
            parse(Some(r#"{"datastore": "tasks", "app": "A1"}"#)).unwrap();
        merge_scope(&mut request.datastore, &mut request.app, Some("tasks"), Some("A1")).unwrap();
        assert_eq!(request.datastore, "tasks");
    }

    #[test]
    fn test_conflicting_app_flag() {
        let mut request: QueryRequest =
            parse(Some(r#"{"datastore": "tasks", "app": "A1"}"#)).unwrap();
        let err = merge_scope(&mut request.datastore, &mut request.app, None, Some("A2")).unwrap_err();
        assert!(matches!(err, CliError::MismatchedFlags(_)));
    }

    #[test]
    fn test_missing_datastore() {
        let mut request: QueryRequest = parse(Some(r##"{"expression": "#id = :id"}"##)).unwrap();
        let err = merge_scope(&mut request.datastore, &mut request.app, None, None).unwrap_err();
        assert!(matches!(err, CliError::InvalidExpression(_)));
    }
}
