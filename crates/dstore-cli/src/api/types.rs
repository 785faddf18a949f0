//! API request and response types
//!
//! Wire shapes for the `apps.datastore.*` methods.

use dstore_common::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope fields every datastore method returns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
    #[serde(default)]
    pub response_metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// A structured, per-item error reported by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// The submitted item this detail is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Record>,
}

/// Create or replace a list of items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkPutRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datastore: String,
    #[serde(default, rename = "app_id", alias = "app", skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Record>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkPutResult {
    #[serde(default)]
    pub datastore: String,
    /// Items the service did not store; safe to resubmit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_items: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BulkPutResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(flatten)]
    pub result: BulkPutResult,
}

/// Query a datastore, one page at a time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datastore: String,
    #[serde(default, rename = "app_id", alias = "app", skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_values: Option<Map<String, Value>>,
    /// Page size; absent lets the service choose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub datastore: String,
    #[serde(default)]
    pub items: Vec<Record>,
    /// Continuation token; `None` or empty means the result set is exhausted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl QueryResult {
    /// The cursor to continue from, if more data may exist
    pub fn continuation(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|cursor| !cursor.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(default)]
    pub datastore: String,
    #[serde(default)]
    pub items: Vec<Record>,
}

/// Any datastore method's response: the envelope plus that method's result
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(flatten)]
    pub result: T,
}

/// Create or replace one item (`put`), or change some of its fields (`update`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PutRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datastore: String,
    #[serde(default, rename = "app_id", alias = "app", skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub item: Record,
}

pub type UpdateRequest = PutRequest;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PutResult {
    #[serde(default)]
    pub datastore: String,
    /// The item as stored by the service
    #[serde(default)]
    pub item: Record,
}

pub type UpdateResult = PutResult;

/// Address one item by its primary-key value (`get`, `delete`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datastore: String,
    #[serde(default, rename = "app_id", alias = "app", skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

pub type DeleteRequest = GetRequest;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetResult {
    #[serde(default)]
    pub datastore: String,
    /// Empty when no item has the requested key
    #[serde(default)]
    pub item: Record,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteResult {
    #[serde(default)]
    pub datastore: String,
    #[serde(default)]
    pub id: String,
}

/// Address several items by primary-key value (`bulkGet`, `bulkDelete`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkGetRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datastore: String,
    #[serde(default, rename = "app_id", alias = "app", skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
}

pub type BulkDeleteRequest = BulkGetRequest;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkGetResult {
    #[serde(default)]
    pub datastore: String,
    #[serde(default)]
    pub items: Vec<Record>,
    /// Keys the service could not read; safe to retry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_items: Vec<String>,
}

impl BulkGetResult {
    /// Some requested keys were neither returned nor reported as failed
    pub fn is_missing_ids(&self, requested: usize) -> bool {
        requested != self.items.len() + self.failed_items.len()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkDeleteResult {
    #[serde(default)]
    pub datastore: String,
    /// Keys the service could not delete; safe to retry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_items: Vec<String>,
}

/// Count the items matching an optional expression
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datastore: String,
    #[serde(default, rename = "app_id", alias = "app", skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_values: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountResult {
    #[serde(default)]
    pub datastore: String,
    #[serde(default)]
    pub count: usize,
}
