//! App manifest handling (manifest.yml)
//!
//! The manifest declares the app's datastores. The bulk-put import reads it
//! to find which field identifies an item.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Default manifest location, relative to the working directory
pub const DEFAULT_MANIFEST_PATH: &str = "manifest.yml";

/// App manifest file (manifest.yml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Datastores keyed by name
    #[serde(default)]
    pub datastores: BTreeMap<String, DatastoreSchema>,
}

/// One datastore declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatastoreSchema {
    /// Attribute that uniquely identifies an item
    #[serde(default)]
    pub primary_key: String,

    /// Attribute definitions, passed through untouched
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl Manifest {
    /// Load manifest from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CliError::config(format!(
                "App manifest not found at '{}'. Pass --manifest or --primary-key",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Primary-key field of `datastore`
    pub fn primary_key(&self, datastore: &str) -> Result<&str> {
        let schema = self
            .datastores
            .get(datastore)
            .ok_or_else(|| CliError::DatastoreNotFound(datastore.to_string()))?;

        if schema.primary_key.trim().is_empty() {
            return Err(CliError::MissingPrimaryKey(datastore.to_string()));
        }
        Ok(&schema.primary_key)
    }
}
