//! Dependency graph over parsed lockfile records.
//!
//! ## Pipeline
//!
//! ```text
//! Lockfile (header, [PackageRecord], trailer)
//!        ↓  build::DependencyGraph::from_lockfile()
//! DependencyGraph (forward edges + reverse index)
//!        ↓  crate::query::*
//! key sets (closure, safe removal, extraction, …)
//!        ↓  emit::render_lockfile()
//! lockfile text
//! ```
//!
//! [`stats::GraphStats`] projects the graph into `petgraph` for component
//! and cycle analysis.
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use locktrim_core::{CollisionPolicy, lockfile::read_lockfile};
//! use locktrim_graph::graph::{DependencyGraph, render_lockfile};
//! use locktrim_graph::query::prune;
//!
//! let lock = read_lockfile(Path::new("Cargo.lock"))?;
//! let graph = DependencyGraph::from_lockfile(&lock, CollisionPolicy::Qualify)?;
//! let outcome = prune(&graph, ["my-app"]);
//! let text = render_lockfile(&lock, &graph, &outcome.retained);
//! ```

pub mod build;
pub mod emit;
pub mod stats;

pub use build::{Collision, DependencyGraph, GraphError, PackageNode};
pub use emit::render_lockfile;
pub use stats::GraphStats;
