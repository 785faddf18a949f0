//! Error types for the dstore CLI
//!
//! Errors are user-facing: each message says what went wrong and, where it
//! helps, what to try next.

use crate::api::types::ErrorDetail;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// The datastore service answered with `ok: false`
    ///
    /// `details` optionally names the submitted items that caused the failure.
    #[error("The datastore service rejected '{method}': {code}{}", describe(.description))]
    Api {
        method: String,
        code: String,
        description: Option<String>,
        details: Vec<ErrorDetail>,
    },

    /// Datastore name is not declared in the app manifest
    #[error("Datastore '{0}' was not found in the app manifest. Check the datastores section of the manifest.")]
    DatastoreNotFound(String),

    /// Datastore declared without a primary key
    #[error("Datastore '{0}' has no primary key in the app manifest. Add a primary_key or pass --primary-key.")]
    MissingPrimaryKey(String),

    /// The JSON expression passed on the command line is unusable
    #[error("Invalid datastore expression: {0}. Provide a JSON object surrounded by quotes, e.g. '{{\"datastore\": \"tasks\"}}'.")]
    InvalidExpression(String),

    /// Two flags (or a flag and the expression) disagree
    #[error("Mismatched flags: {0}")]
    MismatchedFlags(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your connection and the server URL.")]
    Http(#[from] reqwest::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables and flags.")]
    Config(String),

    /// YAML parsing failed
    #[error("Failed to parse the app manifest: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing or encoding failed
    #[error("Failed to process JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Errors bubbling up from dstore-common
    #[error(transparent)]
    Common(#[from] dstore_common::CommonError),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn describe(description: &Option<String>) -> String {
    match description {
        Some(text) if !text.is_empty() => format!(" ({})", text),
        _ => String::new(),
    }
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid expression error
    pub fn invalid_expression(msg: impl Into<String>) -> Self {
        Self::InvalidExpression(msg.into())
    }

    /// Create a mismatched flags error
    pub fn mismatched_flags(msg: impl Into<String>) -> Self {
        Self::MismatchedFlags(msg.into())
    }

    /// Per-item details attached to a service error
    ///
    /// Empty for every other kind of error, including service errors that
    /// did not say which items failed.
    pub fn item_details(&self) -> &[ErrorDetail] {
        match self {
            CliError::Api { details, .. } => details,
            _ => &[],
        }
    }
}
