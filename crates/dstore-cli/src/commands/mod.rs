//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. Commands that
//! differ only in the remote call they make share a module.

pub mod bulk_put;
pub mod count;
pub mod delete;
pub mod expression;
pub mod get;
pub mod put;
pub mod query;
