//! dstore Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the dstore workspace.
//!
//! # Overview
//!
//! - **Error Handling**: Common error and result types
//! - **Logging**: `tracing` subscriber setup shared by every binary
//! - **Types**: Datastore records and primary-key values
//!
//! # Example
//!
//! ```
//! use dstore_common::types::{parse_record, primary_key_of};
//!
//! let record = parse_record(r#"{"id": "42", "status": "Done"}"#).unwrap();
//! let key = primary_key_of(&record, "id").unwrap();
//! assert_eq!(key.as_str(), r#""42""#);
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use types::{PrimaryKeyValue, Record};
