//! Query export to a JSON Lines sink
//!
//! Pages through `apps.datastore.query`, writing each returned record as one
//! line as soon as its page arrives. Only one page is held in memory.

use crate::api::{DatastoreApi, QueryRequest};
use crate::config::ExportLimits;
use crate::error::Result;
use crate::progress::{StatusLine, Symbol};
use dstore_common::types::record_to_line;
use std::io::Write;
use tracing::{debug, info, warn};

/// Result of a completed export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub total_exported: usize,
    /// The item cap was reached; more matching records may exist
    pub truncated: bool,
}

/// Write every record matching `query` to `output`
///
/// `query.limit` acts as the requested page size (zero means unset) and `query.cursor` as the
/// starting position. Any query error aborts the export and is returned as
/// is; lines already written stay written.
pub async fn run_export<A, W>(
    api: &A,
    query: &QueryRequest,
    limits: ExportLimits,
    output: W,
    status: &mut StatusLine,
) -> Result<ExportSummary>
where
    A: DatastoreApi + ?Sized,
    W: Write,
{
    let mut output = std::io::BufWriter::new(output);
    let mut request = query.clone();
    let mut total_exported = 0;
    let mut pages = 0;

    status.start(format!("Exported ({}) items.", total_exported));

    loop {
        let per_call = limits
            .max_items_per_call
            .min(
                query
                    .limit
                    .filter(|limit| *limit > 0)
                    .unwrap_or(limits.max_items_per_call),
            )
            .min(limits.max_total_items.saturating_sub(total_exported));
        if per_call == 0 {
            break;
        }

        request.limit = Some(per_call);
        let page = api.query(&request).await?;
        pages += 1;

        // Pages larger than requested are clipped.
        for record in page.items.iter().take(per_call) {
            writeln!(output, "{}", record_to_line(record)?)?;
        }
        output.flush()?;

        let written = page.items.len().min(per_call);
        total_exported += written;
        debug!(page = pages, written, total_exported, "Exported query page");
        status.update(format!("Exported ({}) items.", total_exported), None);

        match page.continuation() {
            Some(cursor) => request.cursor = Some(cursor.to_string()),
            None => break,
        }
    }

    status.stop(
        format!("Successfully exported ({}) items!", total_exported),
        Some(Symbol::Tada),
    );

    let truncated = total_exported >= limits.max_total_items;
    if truncated {
        warn!(limit = limits.max_total_items, "Export truncated at the item limit");
    }
    info!(datastore = %query.datastore, total_exported, pages, "Export finished");

    Ok(ExportSummary {
        total_exported,
        truncated,
    })
}
