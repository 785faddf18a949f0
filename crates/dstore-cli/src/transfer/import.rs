//! Bulk-put import from a JSON Lines source
//!
//! Lines are read one at a time into a [`PendingBatch`] until the batch is
//! full or the input runs out, then the batch is submitted. Items the service
//! hands back are resubmitted on the next round; items it names in an error
//! are logged and dropped. Everything that cannot be imported ends up in the
//! [`ErrorLog`].

use crate::api::{BulkPutRequest, DatastoreApi};
use crate::config::ImportLimits;
use crate::error::Result;
use crate::progress::{StatusLine, Symbol};
use crate::transfer::batch::{
    reconcile, FailureRecord, PendingBatch, Reconciliation, REASON_INVALID_JSON, REASON_STALLED,
};
use crate::transfer::error_log::ErrorLog;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What to import and where
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub datastore: String,
    pub app: Option<String>,
    /// Field that identifies an item in this datastore
    pub primary_key: String,
    pub limits: ImportLimits,
}

/// Running totals for an import
///
/// The processed total is derived, so it always equals
/// `successful + failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounters {
    pub successful: usize,
    pub failed: usize,
}

impl ImportCounters {
    pub fn processed(&self) -> usize {
        self.successful + self.failed
    }

    fn progress_message(&self) -> String {
        format!(
            "Imported ({}) items. So far ({}) items failed to be imported. Total processed items is ({}).",
            self.successful,
            self.failed,
            self.processed()
        )
    }

    fn final_message(&self) -> String {
        format!(
            "Successfully imported ({}) items! ({}) items failed to be imported. Total processed items is ({})",
            self.successful,
            self.failed,
            self.processed()
        )
    }
}

/// Result of a completed import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub counters: ImportCounters,
    /// The item cap was reached; later lines were never read
    pub truncated: bool,
    /// Kept error log, present only when something failed
    pub error_log: Option<PathBuf>,
}

/// Import every line of `input` into the datastore
///
/// Fails only on I/O errors, on service errors that do not name the failing
/// items, and on error details that match nothing that was sent. On failure
/// the error log is left on disk with whatever it already holds.
///
/// Only empty lines are skipped. Lines that are not UTF-8 are logged as
/// invalid JSON.
pub async fn run_import<A, R>(
    api: &A,
    options: &ImportOptions,
    mut input: R,
    mut error_log: ErrorLog,
    status: &mut StatusLine,
) -> Result<ImportSummary>
where
    A: DatastoreApi + ?Sized,
    R: BufRead,
{
    let limits = options.limits;
    let mut counters = ImportCounters::default();
    let mut batch = PendingBatch::new(options.primary_key.as_str());
    let mut line = Vec::new();
    let mut input_exhausted = false;
    let mut stalled_rounds = 0;
    let mut submissions = 0;

    status.start(counters.progress_message());

    loop {
        status.update(counters.progress_message(), None);

        let room = limits
            .max_batch_size
            .min(limits.max_total_items.saturating_sub(counters.processed()));

        if batch.len() < room && !input_exhausted {
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                input_exhausted = true;
            } else {
                trim_line_ending(&mut line);
                if line.is_empty() {
                    continue;
                }
                let admitted = match std::str::from_utf8(&line) {
                    Ok(text) => batch.admit_line(text),
                    Err(_) => Err(FailureRecord::new(
                        String::from_utf8_lossy(&line),
                        REASON_INVALID_JSON,
                    )),
                };
                if let Err(failure) = admitted {
                    debug!(reason = %failure.reason, "Rejected input line");
                    error_log.append(&failure)?;
                    counters.failed += 1;
                }
                continue;
            }
        }

        if batch.is_empty() {
            break;
        }

        let request = BulkPutRequest {
            datastore: options.datastore.clone(),
            app: options.app.clone(),
            items: batch.records().to_vec(),
        };
        let submitted = request.items.len();
        submissions += 1;

        match api.bulk_put(&request).await {
            Ok(result) => {
                let returned = result.failed_items.len();
                let accepted = submitted.saturating_sub(returned);
                counters.successful += accepted;
                debug!(submitted, accepted, returned, "Bulk put round finished");

                batch = PendingBatch::from_records(options.primary_key.as_str(), result.failed_items);

                stalled_rounds = if accepted == 0 && returned > 0 {
                    stalled_rounds + 1
                } else {
                    0
                };
                if limits.max_stalled_rounds > 0 && stalled_rounds >= limits.max_stalled_rounds {
                    warn!(
                        items = batch.len(),
                        rounds = stalled_rounds,
                        "Service keeps returning the same items, giving up on them"
                    );
                    for record in batch.into_records() {
                        error_log.append(&FailureRecord::for_record(&record, REASON_STALLED)?)?;
                        counters.failed += 1;
                    }
                    batch = PendingBatch::new(options.primary_key.as_str());
                    stalled_rounds = 0;
                }
            }
            Err(err) => {
                if err.item_details().is_empty() {
                    warn!(error = %err, "Bulk put failed without item details, aborting import");
                    return Err(err);
                }

                let Reconciliation {
                    still_pending,
                    newly_failed,
                    unmatched,
                } = reconcile(batch, err.item_details())?;
                debug!(
                    failed = newly_failed.len(),
                    pending = still_pending.len(),
                    "Bulk put rejected some items"
                );
                for failure in &newly_failed {
                    error_log.append(failure)?;
                    counters.failed += 1;
                }
                if let Some(key) = unmatched {
                    warn!(key = %key, error = %err, "Error detail names an item that was not submitted, aborting import");
                    return Err(err);
                }
                batch = still_pending;
            }
        }
    }

    status.stop(counters.final_message(), Some(Symbol::Tada));

    let truncated = counters.processed() >= limits.max_total_items;
    if truncated {
        warn!(limit = limits.max_total_items, "Import truncated at the item limit");
    }

    let error_log = error_log.finish()?;
    info!(
        datastore = %options.datastore,
        successful = counters.successful,
        failed = counters.failed,
        submissions,
        "Import finished"
    );

    Ok(ImportSummary {
        counters,
        truncated,
        error_log,
    })
}

/// Strip a trailing `\n` or `\r\n`
fn trim_line_ending(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}
