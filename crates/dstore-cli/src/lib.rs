//! dstore CLI Library
//!
//! Command-line client for a hosted datastore service.
//!
//! # Overview
//!
//! - **Bulk put**: store items from an expression, or import a JSON Lines
//!   file in batches (`dstore bulk-put --from-file`)
//! - **Query**: print a page of matching items, or export every match to a
//!   JSON Lines file (`dstore query --to-file`)
//! - **Single calls**: `put`, `update`, `get`, `delete`, `bulk-get`,
//!   `bulk-delete` and `count`
//!
//! The import and export loops live in [`transfer`] and talk to the service
//! through the [`api::DatastoreApi`] trait.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod progress;
pub mod transfer;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};
pub use manifest::Manifest;

use clap::{Parser, Subcommand};
use commands::query::OutputFormat;
use std::path::PathBuf;

/// dstore - bulk import and export for hosted datastores
#[derive(Parser, Debug)]
#[command(name = "dstore")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Datastore service URL
    #[arg(long, env = "DSTORE_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Bearer token for the service
    #[arg(long, env = "DSTORE_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// App the datastores belong to
    #[arg(long, env = "DSTORE_APP_ID", global = true)]
    pub app: Option<String>,

    /// Directory for bulk-put error logs
    #[arg(long, env = "DSTORE_LOGS_DIR", global = true)]
    pub logs_dir: Option<PathBuf>,
}

impl Cli {
    /// Resolve the effective configuration: defaults, then environment, then flags
    pub fn config(&self) -> Result<Config> {
        Ok(Config::from_env()?.with_overrides(
            self.server_url.clone(),
            self.token.clone(),
            self.app.clone(),
            self.logs_dir.clone(),
        ))
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or replace a list of items
    BulkPut {
        /// Request as JSON, e.g. '{"datastore": "tasks", "items": [...]}'
        expression: Option<String>,

        /// Datastore to write to
        #[arg(long)]
        datastore: Option<String>,

        /// Import items from a JSON Lines file, one item per line
        #[arg(long, value_name = "PATH")]
        from_file: Option<PathBuf>,

        /// Primary-key field, instead of reading it from the app manifest
        #[arg(long)]
        primary_key: Option<String>,

        /// App manifest declaring the datastores
        #[arg(long, default_value = manifest::DEFAULT_MANIFEST_PATH)]
        manifest: PathBuf,

        /// Print the request instead of sending it
        #[arg(long)]
        show: bool,
    },

    /// Query a datastore for items
    Query {
        /// Request as JSON, e.g. '{"datastore": "tasks", "expression": "#status = :s", ...}'
        expression: Option<String>,

        /// Datastore to read from
        #[arg(long)]
        datastore: Option<String>,

        /// Export every matching item to a JSON Lines file
        #[arg(long, value_name = "PATH")]
        to_file: Option<PathBuf>,

        /// Output format for a single page of results
        #[arg(long, value_enum)]
        output: Option<OutputFormat>,

        /// Print the request instead of sending it
        #[arg(long)]
        show: bool,
    },

    /// Create or replace an item
    Put {
        /// Request as JSON, e.g. '{"datastore": "tasks", "item": {"id": "42"}}'
        expression: Option<String>,

        /// Datastore to write to
        #[arg(long)]
        datastore: Option<String>,

        /// Print the request instead of sending it
        #[arg(long)]
        show: bool,
    },

    /// Create or update an item, changing only the given attributes
    Update {
        /// Request as JSON, e.g. '{"datastore": "tasks", "item": {"id": "42", "status": "Done"}}'
        expression: Option<String>,

        /// Datastore to write to
        #[arg(long)]
        datastore: Option<String>,

        /// Print the request instead of sending it
        #[arg(long)]
        show: bool,
    },

    /// Get an item by primary key
    Get {
        /// Request as JSON, e.g. '{"datastore": "tasks", "id": "42"}'
        expression: Option<String>,

        /// Datastore to read from
        #[arg(long)]
        datastore: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,

        /// Print the request instead of sending it
        #[arg(long)]
        show: bool,
    },

    /// Get several items by primary key
    BulkGet {
        /// Request as JSON, e.g. '{"datastore": "tasks", "ids": ["12", "42"]}'
        expression: Option<String>,

        /// Datastore to read from
        #[arg(long)]
        datastore: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,

        /// Print the request instead of sending it
        #[arg(long)]
        show: bool,
    },

    /// Delete an item by primary key
    Delete {
        /// Request as JSON, e.g. '{"datastore": "tasks", "id": "42"}'
        expression: Option<String>,

        /// Datastore to delete from
        #[arg(long)]
        datastore: Option<String>,

        /// Print the request instead of sending it
        #[arg(long)]
        show: bool,
    },

    /// Delete several items by primary key
    BulkDelete {
        /// Request as JSON, e.g. '{"datastore": "tasks", "ids": ["12", "42"]}'
        expression: Option<String>,

        /// Datastore to delete from
        #[arg(long)]
        datastore: Option<String>,

        /// Print the request instead of sending it
        #[arg(long)]
        show: bool,
    },

    /// Count the items in a datastore, optionally filtered by an expression
    Count {
        /// Request as JSON, e.g. '{"datastore": "tasks", "expression": "#status = :s", ...}'
        expression: Option<String>,

        /// Datastore to count
        #[arg(long)]
        datastore: Option<String>,

        /// Print the request instead of sending it
        #[arg(long)]
        show: bool,
    },
}
