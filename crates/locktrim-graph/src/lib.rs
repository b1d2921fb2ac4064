#![forbid(unsafe_code)]
//! locktrim-graph library.
//!
//! # Conventions
//!
//! - **Errors**: Only graph construction can fail ([`graph::GraphError`]);
//!   queries are total.
//! - **Logging**: Use `tracing` macros (`debug!`, `warn!`) and
//!   `#[instrument]` on entry points.

pub mod graph;
pub mod query;

pub use graph::{DependencyGraph, GraphError, GraphStats, render_lockfile};

#[cfg(test)]
mod test_support;
