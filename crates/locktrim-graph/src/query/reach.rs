//! Transitive dependency closure.
//!
//! An explicit worklist with a visited set replaces recursion, so deep
//! chains cannot exhaust the stack and cycles terminate. Cost is
//! O(V + E) over the part of the graph reachable from the roots.

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, instrument};

use crate::graph::DependencyGraph;

/// Keys reachable from `roots` along forward edges, roots included.
///
/// Roots that are not nodes are still part of the result; dangling
/// dependency names are not followed and never appear.
#[instrument(skip_all)]
pub fn closure<I, S>(graph: &DependencyGraph, roots: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    for root in roots {
        let root = root.as_ref();
        if visited.insert(root.to_string()) {
            queue.push_back(root.to_string());
        }
    }
    let root_count = visited.len();

    while let Some(key) = queue.pop_front() {
        for dep in graph.direct_deps(&key) {
            if graph.contains(dep) && !visited.contains(dep) {
                visited.insert(dep.clone());
                queue.push_back(dep.clone());
            }
        }
    }

    debug!(roots = root_count, reachable = visited.len(), "closure computed");
    visited
}

/// Roots that do not name a node.
#[must_use]
pub fn missing_roots<S: AsRef<str>>(graph: &DependencyGraph, roots: &[S]) -> Vec<String> {
    roots
        .iter()
        .map(AsRef::as_ref)
        .filter(|r| !graph.contains(r))
        .map(str::to_string)
        .collect()
}
