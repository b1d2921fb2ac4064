//! Read-only queries over a built [`DependencyGraph`](crate::graph::DependencyGraph).
//!
//! Every query is total: unknown names are tolerated and the result is a
//! plain value. Set results are `BTreeSet`s so iteration order is stable.

pub mod constraints;
pub mod prune;
pub mod rank;
pub mod reach;

pub use constraints::{ConstraintHit, ecosystem, version_constraints};
pub use prune::{PruneOutcome, prune, remove_with_orphans, safe_removal_set, select};
pub use rank::{FanIn, critical_nodes, expand_critical_path, force_include, leaf_nodes};
pub use reach::{closure, missing_roots};
