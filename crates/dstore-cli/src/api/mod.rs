//! API client module
//!
//! HTTP client for the remote datastore service, plus the [`DatastoreApi`]
//! seam the transfer pipelines are written against.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use crate::error::Result;
use async_trait::async_trait;

/// Remote datastore operations
///
/// The import and export pipelines only need `bulk_put` and `query`; the
/// single-call commands use the rest.
#[async_trait]
pub trait DatastoreApi: Send + Sync {
    /// Store a batch of items
    ///
    /// A successful return may still list `failed_items` the service did not
    /// store. An `Err` may carry per-item details (see
    /// [`CliError::item_details`](crate::error::CliError::item_details)).
    async fn bulk_put(&self, request: &BulkPutRequest) -> Result<BulkPutResult>;

    /// Read one page of items matching the request
    async fn query(&self, request: &QueryRequest) -> Result<QueryResult>;

    /// Create or replace one item
    async fn put(&self, request: &PutRequest) -> Result<PutResult>;

    /// Change the given fields of one item, creating it if absent
    async fn update(&self, request: &UpdateRequest) -> Result<UpdateResult>;

    /// Read one item by primary-key value
    async fn get(&self, request: &GetRequest) -> Result<GetResult>;

    /// Delete one item by primary-key value
    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResult>;

    async fn bulk_get(&self, request: &BulkGetRequest) -> Result<BulkGetResult>;

    async fn bulk_delete(&self, request: &BulkDeleteRequest) -> Result<BulkDeleteResult>;

    /// Number of items matching the request's expression
    async fn count(&self, request: &CountRequest) -> Result<CountResult>;
}
