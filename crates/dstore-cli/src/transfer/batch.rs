//! Pending batches and failure reconciliation
//!
//! A [`PendingBatch`] holds the records waiting for the next bulk-put call.
//! No two records in a batch share a primary-key value. When the service
//! rejects a call and names the offending items, [`reconcile`] splits the
//! batch into what is still worth submitting and what has failed for good.

use crate::api::types::ErrorDetail;
use crate::error::Result;
use dstore_common::types::{parse_record, primary_key_of, record_to_line};
use dstore_common::{PrimaryKeyValue, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const REASON_INVALID_JSON: &str = "item couldn't be parsed as JSON";
pub const REASON_MISSING_PRIMARY_KEY: &str = "primary key not found";
pub const REASON_DUPLICATE_PRIMARY_KEY: &str = "item with the same primary key already exists";
pub const REASON_STALLED: &str = "item was rejected by the service after repeated attempts";

/// Fallback reason when the service names an item without a message.
const REASON_UNSPECIFIED: &str = "item was rejected by the service";

/// One line of the bulk-put error log
///
/// `item` is kept as text: the offending input may not be JSON at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub item: String,
    pub reason: String,
}

impl FailureRecord {
    pub fn new(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            reason: reason.into(),
        }
    }

    /// Failure for a parsed record, re-encoded as compact JSON
    pub fn for_record(record: &Record, reason: impl Into<String>) -> Result<Self> {
        Ok(Self::new(record_to_line(record)?, reason))
    }
}

/// Records awaiting submission, unique by primary key
#[derive(Debug, Clone)]
pub struct PendingBatch {
    primary_key: String,
    records: Vec<Record>,
    keys: HashSet<PrimaryKeyValue>,
}

impl PendingBatch {
    pub fn new(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: primary_key.into(),
            records: Vec::new(),
            keys: HashSet::new(),
        }
    }

    /// Batch made of records handed back by the service for another attempt
    pub fn from_records(primary_key: impl Into<String>, records: Vec<Record>) -> Self {
        let mut batch = Self::new(primary_key);
        for record in records {
            if let Some(key) = primary_key_of(&record, &batch.primary_key) {
                batch.keys.insert(key);
            }
            batch.records.push(record);
        }
        batch
    }

    /// Validate one input line and add it to the batch
    ///
    /// Rejections come back as the failure to log; the batch is unchanged.
    /// The first record with a given key wins.
    pub fn admit_line(&mut self, line: &str) -> std::result::Result<(), FailureRecord> {
        let record = parse_record(line).map_err(|_| FailureRecord::new(line, REASON_INVALID_JSON))?;

        let key = primary_key_of(&record, &self.primary_key)
            .ok_or_else(|| FailureRecord::new(line, REASON_MISSING_PRIMARY_KEY))?;

        if !self.keys.insert(key) {
            return Err(FailureRecord::new(line, REASON_DUPLICATE_PRIMARY_KEY));
        }

        self.records.push(record);
        Ok(())
    }

    /// Remove the record with `key`, if present
    pub fn remove_key(&mut self, key: &PrimaryKeyValue) -> Option<Record> {
        let field = &self.primary_key;
        let index = self
            .records
            .iter()
            .position(|record| primary_key_of(record, field).as_ref() == Some(key))?;
        self.keys.remove(key);
        Some(self.records.remove(index))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome of matching a rejected batch against the service's error details
#[derive(Debug)]
pub struct Reconciliation {
    /// Records not named by any detail; they go out again on the next call
    pub still_pending: PendingBatch,
    /// Records named by a detail, ready for the error log
    pub newly_failed: Vec<FailureRecord>,
    /// Key of the first detail that named nothing in the batch
    ///
    /// Matching stops there; `newly_failed` holds the details before it.
    pub unmatched: Option<String>,
}

/// Partition a submitted batch by the per-item details of a failed call
///
/// Details are matched to records by primary-key value, in order. A detail
/// that names an item not in the batch means the response cannot be trusted:
/// matching stops and the detail's key is reported in `unmatched`.
pub fn reconcile(mut batch: PendingBatch, details: &[ErrorDetail]) -> Result<Reconciliation> {
    let mut newly_failed = Vec::with_capacity(details.len());
    let mut unmatched = None;

    for detail in details {
        let key = detail
            .item
            .as_ref()
            .and_then(|item| primary_key_of(item, batch.primary_key()));

        let removed = key.as_ref().and_then(|key| batch.remove_key(key));
        let Some(record) = removed else {
            unmatched = Some(key.map_or_else(|| "<missing>".to_string(), |k| k.to_string()));
            break;
        };

        let reason = detail
            .message
            .clone()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| REASON_UNSPECIFIED.to_string());
        // Log what the service reported; fall back to what was sent.
        let item = detail.item.as_ref().unwrap_or(&record);
        newly_failed.push(FailureRecord::for_record(item, reason)?);
    }

    Ok(Reconciliation {
        still_pending: batch,
        newly_failed,
        unmatched,
    })
}
