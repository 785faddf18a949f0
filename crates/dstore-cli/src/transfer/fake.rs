//! In-memory datastore service for pipeline tests

use crate::api::types::ErrorDetail;
use crate::api::{
    BulkDeleteRequest, BulkDeleteResult, BulkGetRequest, BulkGetResult, BulkPutRequest, BulkPutResult,
    CountRequest, CountResult, DatastoreApi, DeleteRequest, DeleteResult, GetRequest, GetResult,
    PutRequest, PutResult, QueryRequest, QueryResult, UpdateRequest, UpdateResult,
};
use crate::error::{CliError, Result};
use async_trait::async_trait;
use dstore_common::Record;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted answer to one bulk-put call
pub(crate) enum BulkPutOutcome {
    /// Store everything except these, which are handed back
    FailedItems(Vec<Record>),
    /// Reject the call, naming the offending items
    ErrorWithDetails(Vec<ErrorDetail>),
    /// Reject the call without saying why
    Fatal,
}

/// Fake service
///
/// Bulk puts follow the scripted outcomes in order, then accept everything.
/// Queries page through a generated dataset using the item offset as cursor.
/// Single-item calls read the same dataset by its `id` field and never fail.
#[derive(Default)]
pub(crate) struct FakeApi {
    outcomes: Mutex<VecDeque<BulkPutOutcome>>,
    reject_everything: bool,
    bulk_put_calls: Mutex<Vec<BulkPutRequest>>,
    dataset: Vec<Record>,
    ignore_limit: bool,
    fail_query_at: Option<usize>,
    query_calls: Mutex<Vec<QueryRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(size: usize) -> Self {
        let dataset = (0..size)
            .filter_map(|i| {
                json!({"id": i.to_string(), "title": format!("task {}", i)})
                    .as_object()
                    .cloned()
            })
            .collect();
        Self {
            dataset,
            ..Self::default()
        }
    }

    pub fn with_bulk_put_outcomes(mut self, outcomes: Vec<BulkPutOutcome>) -> Self {
        self.outcomes = Mutex::new(outcomes.into());
        self
    }

    /// Hand every submitted item back on every call
    pub fn rejecting_everything(mut self) -> Self {
        self.reject_everything = true;
        self
    }

    /// Return the whole remaining dataset regardless of the requested limit
    pub fn ignoring_limit(mut self) -> Self {
        self.ignore_limit = true;
        self
    }

    /// Fail the query call with this zero-based index
    pub fn failing_query_at(mut self, call: usize) -> Self {
        self.fail_query_at = Some(call);
        self
    }

    pub fn bulk_put_calls(&self) -> Vec<BulkPutRequest> {
        self.bulk_put_calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn query_calls(&self) -> Vec<QueryRequest> {
        self.query_calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn find(&self, id: &str) -> Option<&Record> {
        self.dataset
            .iter()
            .find(|record| record.get("id").and_then(|v| v.as_str()) == Some(id))
    }
}

fn rejection(method: &str, details: Vec<ErrorDetail>) -> CliError {
    CliError::Api {
        method: method.to_string(),
        code: "datastore_error".to_string(),
        description: None,
        details,
    }
}

#[async_trait]
impl DatastoreApi for FakeApi {
    async fn bulk_put(&self, request: &BulkPutRequest) -> Result<BulkPutResult> {
        if let Ok(mut calls) = self.bulk_put_calls.lock() {
            calls.push(request.clone());
        }

        if self.reject_everything {
            return Ok(BulkPutResult {
                datastore: request.datastore.clone(),
                failed_items: request.items.clone(),
            });
        }

        let outcome = self.outcomes.lock().ok().and_then(|mut queue| queue.pop_front());
        match outcome {
            None => Ok(BulkPutResult {
                datastore: request.datastore.clone(),
                failed_items: Vec::new(),
            }),
            Some(BulkPutOutcome::FailedItems(failed_items)) => Ok(BulkPutResult {
                datastore: request.datastore.clone(),
                failed_items,
            }),
            Some(BulkPutOutcome::ErrorWithDetails(details)) => {
                Err(rejection("apps.datastore.bulkPut", details))
            }
            Some(BulkPutOutcome::Fatal) => Err(rejection("apps.datastore.bulkPut", Vec::new())),
        }
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResult> {
        let call = match self.query_calls.lock() {
            Ok(mut calls) => {
                calls.push(request.clone());
                calls.len() - 1
            }
            Err(_) => 0,
        };
        if self.fail_query_at == Some(call) {
            return Err(rejection("apps.datastore.query", Vec::new()));
        }

        let start = request
            .cursor
            .as_deref()
            .and_then(|cursor| cursor.parse::<usize>().ok())
            .unwrap_or(0)
            .min(self.dataset.len());
        let end = if self.ignore_limit {
            self.dataset.len()
        } else {
            start
                .saturating_add(request.limit.unwrap_or(self.dataset.len()))
                .min(self.dataset.len())
        };

        Ok(QueryResult {
            datastore: request.datastore.clone(),
            items: self.dataset[start..end].to_vec(),
            next_cursor: (end < self.dataset.len()).then(|| end.to_string()),
        })
    }

    async fn put(&self, request: &PutRequest) -> Result<PutResult> {
        Ok(PutResult {
            datastore: request.datastore.clone(),
            item: request.item.clone(),
        })
    }

    async fn update(&self, request: &UpdateRequest) -> Result<UpdateResult> {
        let mut item = request
            .item
            .get("id")
            .and_then(|id| id.as_str())
            .and_then(|id| self.find(id))
            .cloned()
            .unwrap_or_default();
        item.extend(request.item.clone());
        Ok(UpdateResult {
            datastore: request.datastore.clone(),
            item,
        })
    }

    async fn get(&self, request: &GetRequest) -> Result<GetResult> {
        Ok(GetResult {
            datastore: request.datastore.clone(),
            item: self.find(&request.id).cloned().unwrap_or_default(),
        })
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResult> {
        Ok(DeleteResult {
            datastore: request.datastore.clone(),
            id: request.id.clone(),
        })
    }

    async fn bulk_get(&self, request: &BulkGetRequest) -> Result<BulkGetResult> {
        Ok(BulkGetResult {
            datastore: request.datastore.clone(),
            items: request.ids.iter().filter_map(|id| self.find(id).cloned()).collect(),
            failed_items: Vec::new(),
        })
    }

    async fn bulk_delete(&self, request: &BulkDeleteRequest) -> Result<BulkDeleteResult> {
        Ok(BulkDeleteResult {
            datastore: request.datastore.clone(),
            failed_items: Vec::new(),
        })
    }

    async fn count(&self, request: &CountRequest) -> Result<CountResult> {
        Ok(CountResult {
            datastore: request.datastore.clone(),
            count: self.dataset.len(),
        })
    }
}
