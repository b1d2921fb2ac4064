//! Closure-safe removal.
//!
//! # Safe removal set
//!
//! Candidates are all keys outside `required`. A candidate may go only if
//! every package depending on it goes too. When `required` is itself a
//! closure this holds after one pass over the candidates; for an arbitrary
//! `required` a retained candidate pins its own dependencies, so the set is
//! shrunk with a worklist until no removed key has a retained dependent.
//! The result is the largest dependent-closed subset of the candidates.
//!
//! The retained set `all − removed` is then referentially closed: every
//! dependency of a retained package is retained or dangling.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::DependencyGraph;
use crate::query::reach::closure;

/// Outcome of pruning from a root set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneOutcome {
    /// `closure(roots)`.
    pub required: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub retained: BTreeSet<String>,
}

/// Keys outside `required` that can be dropped without leaving a retained
/// package pointing at a removed one.
#[instrument(skip_all, fields(required = required.len()))]
pub fn safe_removal_set(graph: &DependencyGraph, required: &BTreeSet<String>) -> BTreeSet<String> {
    let mut removed: BTreeSet<String> = graph
        .keys()
        .filter(|k| !required.contains(*k))
        .map(str::to_string)
        .collect();
    let candidates = removed.len();

    let mut queue: VecDeque<String> = removed
        .iter()
        .filter(|k| graph.dependents(k).any(|d| !removed.contains(d)))
        .cloned()
        .collect();

    while let Some(key) = queue.pop_front() {
        if !removed.remove(&key) {
            continue;
        }
        for dep in graph.direct_deps(&key) {
            if removed.contains(dep) {
                queue.push_back(dep.clone());
            }
        }
    }

    debug!(candidates, removable = removed.len(), "safe removal set computed");
    removed
}

/// `required = closure(roots)`, then [`safe_removal_set`].
pub fn prune<I, S>(graph: &DependencyGraph, roots: I) -> PruneOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let required = closure(graph, roots);
    let removed = safe_removal_set(graph, &required);
    let retained = graph
        .keys()
        .filter(|k| !removed.contains(*k))
        .map(str::to_string)
        .collect();
    PruneOutcome {
        required,
        removed,
        retained,
    }
}

/// Exactly the named keys that exist, with no closure applied.
#[must_use]
pub fn select<S: AsRef<str>>(graph: &DependencyGraph, keep: &[S]) -> BTreeSet<String> {
    keep.iter()
        .map(AsRef::as_ref)
        .filter(|k| graph.contains(k))
        .map(str::to_string)
        .collect()
}

/// Remove `names` (minus `protect`), optionally cascading.
///
/// With `cascade`, a dependency of a removed package is removed as well
/// once every one of its dependents is removed, repeated until stable.
/// Protected keys are never removed.
#[instrument(skip_all, fields(names = names.len(), cascade = cascade))]
pub fn remove_with_orphans(
    graph: &DependencyGraph,
    names: &BTreeSet<String>,
    protect: &BTreeSet<String>,
    cascade: bool,
) -> BTreeSet<String> {
    let mut removed: BTreeSet<String> = names
        .iter()
        .filter(|k| graph.contains(k) && !protect.contains(*k))
        .cloned()
        .collect();
    if !cascade {
        return removed;
    }

    let mut queue: VecDeque<String> = removed.iter().cloned().collect();
    while let Some(key) = queue.pop_front() {
        for dep in graph.direct_deps(&key) {
            if removed.contains(dep) || protect.contains(dep) || !graph.contains(dep) {
                continue;
            }
            if graph.dependents(dep).all(|d| removed.contains(d)) {
                debug!(orphan = %dep, via = %key, "cascading removal");
                removed.insert(dep.clone());
                queue.push_back(dep.clone());
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::graph_from_edges;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn linear_chain_drops_unreferenced_package() {
        let g = graph_from_edges(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C")]);
        let outcome = prune(&g, ["A"]);
        assert_eq!(outcome.required, set(&["A", "B", "C"]));
        assert_eq!(outcome.removed, set(&["D"]));
        assert_eq!(outcome.retained, set(&["A", "B", "C"]));
    }

    #[test]
    fn shared_dependency_partial_root() {
        let g = graph_from_edges(&["A", "B", "C"], &[("A", "C"), ("B", "C")]);
        let removed = safe_removal_set(&g, &set(&["A", "C"]));
        assert!(removed.contains("B"));
        assert_eq!(removed, set(&["B"]));
    }

    #[test]
    fn candidate_with_required_dependent_is_kept() {
        // R is required but X (a candidate) is one of its dependencies only
        // when `required` is not closed.
        let g = graph_from_edges(&["R", "X", "Y"], &[("R", "X"), ("X", "Y")]);
        let removed = safe_removal_set(&g, &set(&["R"]));
        assert!(removed.is_empty(), "X and Y are pinned by R: {removed:?}");
    }

    #[test]
    fn removed_package_may_depend_on_retained_one() {
        let g = graph_from_edges(&["A", "B", "D"], &[("A", "B"), ("D", "B")]);
        let outcome = prune(&g, ["A"]);
        assert_eq!(outcome.removed, set(&["D"]));
    }

    #[test]
    fn unreferenced_cycle_is_removed_whole() {
        let g = graph_from_edges(&["A", "X", "Y"], &[("X", "Y"), ("Y", "X")]);
        let outcome = prune(&g, ["A"]);
        assert_eq!(outcome.removed, set(&["X", "Y"]));
    }

    #[test]
    fn select_ignores_unknown_names() {
        let g = graph_from_edges(&["A", "B"], &[("A", "B")]);
        assert_eq!(select(&g, &["A", "ghost"]), set(&["A"]));
    }

    #[test]
    fn remove_without_cascade_is_exact() {
        let g = graph_from_edges(&["A", "W", "X"], &[("W", "X")]);
        let removed = remove_with_orphans(&g, &set(&["W"]), &BTreeSet::new(), false);
        assert_eq!(removed, set(&["W"]));
    }

    #[test]
    fn cascade_removes_sole_dependencies() {
        // W -> X -> Y, A -> Z, W -> Z
        let g = graph_from_edges(
            &["A", "W", "X", "Y", "Z"],
            &[("W", "X"), ("X", "Y"), ("A", "Z"), ("W", "Z")],
        );
        let removed = remove_with_orphans(&g, &set(&["W"]), &BTreeSet::new(), true);
        assert_eq!(removed, set(&["W", "X", "Y"]), "Z is still used by A");
    }

    #[test]
    fn cascade_respects_protected_keys() {
        let g = graph_from_edges(&["W", "X", "Y"], &[("W", "X"), ("X", "Y")]);
        let removed = remove_with_orphans(&g, &set(&["W"]), &set(&["X"]), true);
        assert_eq!(removed, set(&["W"]));
    }

    #[test]
    fn protected_names_are_never_removed_directly() {
        let g = graph_from_edges(&["W"], &[]);
        let removed = remove_with_orphans(&g, &set(&["W"]), &set(&["W"]), false);
        assert!(removed.is_empty());
    }
}
