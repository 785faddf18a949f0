//! Bulk transfer pipelines
//!
//! - [`import`]: JSON Lines file into a datastore via `bulkPut`
//! - [`export`]: datastore query into a JSON Lines file
//!
//! Both run as one sequential loop with a single request in flight.

pub mod batch;
pub mod error_log;
pub mod export;
pub mod import;

#[cfg(test)]
pub(crate) mod fake;

pub use error_log::ErrorLog;
pub use export::{run_export, ExportSummary};
pub use import::{run_import, ImportCounters, ImportOptions, ImportSummary};
