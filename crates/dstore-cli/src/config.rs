//! Configuration management for the dstore CLI
//!
//! `Config` carries connection settings resolved from defaults, environment
//! variables and global flags. The transfer limits are separate structs so
//! each pipeline invocation receives its own copy.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Default datastore service URL when not specified via environment variable.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Items per bulk-put call accepted by the service.
pub const MAX_IMPORT_BULK_SIZE: usize = 25;

/// Items read from an import file in one invocation.
pub const MAX_IMPORT_ITEMS: usize = 5000;

/// Items per query call accepted by the service.
pub const MAX_EXPORT_QUERY_LIMIT: usize = 100;

/// Items written to an export file in one invocation.
pub const MAX_EXPORT_ITEMS: usize = 10_000;

/// Consecutive fruitless resubmissions before pending items are given up on.
pub const MAX_STALLED_ROUNDS: usize = 10;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Datastore service URL
    pub server_url: String,

    /// Bearer token for the service
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// App the datastores belong to
    pub app_id: Option<String>,

    /// Where bulk-put error logs are written
    pub logs_dir: PathBuf,
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Result<Self> {
        let logs_dir = dirs::home_dir()
            .ok_or_else(|| CliError::config("Could not determine home directory"))?
            .join(".dstore")
            .join("logs");

        Ok(Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            app_id: None,
            logs_dir,
        })
    }

    /// Load config from environment variables
    ///
    /// Reads `DSTORE_SERVER_URL`, `DSTORE_TOKEN`, `DSTORE_APP_ID` and
    /// `DSTORE_LOGS_DIR`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DSTORE_SERVER_URL") {
            config.server_url = url;
        }
        if let Ok(token) = std::env::var("DSTORE_TOKEN") {
            config.token = Some(token).filter(|t| !t.is_empty());
        }
        if let Ok(app) = std::env::var("DSTORE_APP_ID") {
            config.app_id = Some(app).filter(|a| !a.is_empty());
        }
        if let Ok(dir) = std::env::var("DSTORE_LOGS_DIR") {
            config.logs_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Apply values given explicitly on the command line
    pub fn with_overrides(
        mut self,
        server_url: Option<String>,
        token: Option<String>,
        app_id: Option<String>,
        logs_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(url) = server_url {
            self.server_url = url;
        }
        if token.is_some() {
            self.token = token;
        }
        if app_id.is_some() {
            self.app_id = app_id;
        }
        if let Some(dir) = logs_dir {
            self.logs_dir = dir;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            app_id: None,
            logs_dir: PathBuf::from(".dstore").join("logs"),
        })
    }
}

/// Bounds for one bulk-put import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLimits {
    pub max_batch_size: usize,
    pub max_total_items: usize,
    pub max_stalled_rounds: usize,
}

impl Default for ImportLimits {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_IMPORT_BULK_SIZE,
            max_total_items: MAX_IMPORT_ITEMS,
            max_stalled_rounds: MAX_STALLED_ROUNDS,
        }
    }
}

/// Bounds for one query export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportLimits {
    pub max_items_per_call: usize,
    pub max_total_items: usize,
}

impl Default for ExportLimits {
    fn default() -> Self {
        Self {
            max_items_per_call: MAX_EXPORT_QUERY_LIMIT,
            max_total_items: MAX_EXPORT_ITEMS,
        }
    }
}
