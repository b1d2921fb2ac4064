//! Fan-in ranking and critical-path extraction.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::DependencyGraph;

/// A key and how many packages depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanIn {
    pub name: String,
    pub fan_in: usize,
}

/// Keys with more than `threshold` dependents, most depended-upon first,
/// ties broken by key.
#[must_use]
pub fn critical_nodes(graph: &DependencyGraph, threshold: usize) -> Vec<FanIn> {
    let mut ranked: Vec<FanIn> = graph
        .keys()
        .map(|key| FanIn {
            name: key.to_string(),
            fan_in: graph.fan_in(key),
        })
        .filter(|entry| entry.fan_in > threshold)
        .collect();
    ranked.sort_by(|a, b| b.fan_in.cmp(&a.fan_in).then_with(|| a.name.cmp(&b.name)));
    ranked
}

/// Keys nothing depends on.
#[must_use]
pub fn leaf_nodes(graph: &DependencyGraph) -> BTreeSet<String> {
    graph
        .keys()
        .filter(|key| graph.fan_in(key) == 0)
        .map(str::to_string)
        .collect()
}

/// Grow a set from `seeds`, following only dependencies whose fan-in
/// exceeds `fan_in_floor`.
///
/// Every visited key (seeds included, even unknown ones) is in the result.
/// Dependencies at or below the floor end that branch and are not added.
#[instrument(skip(graph, seeds), fields(seeds = seeds.len()))]
pub fn expand_critical_path<S: AsRef<str>>(
    graph: &DependencyGraph,
    seeds: &[S],
    fan_in_floor: usize,
) -> BTreeSet<String> {
    let mut queue: VecDeque<String> = seeds.iter().map(|s| s.as_ref().to_string()).collect();
    let mut visited: BTreeSet<String> = BTreeSet::new();

    while let Some(key) = queue.pop_front() {
        if !visited.insert(key.clone()) {
            continue;
        }
        for dep in graph.direct_deps(&key) {
            if graph.contains(dep) && graph.fan_in(dep) > fan_in_floor && !visited.contains(dep) {
                queue.push_back(dep.clone());
            }
        }
    }

    debug!(extracted = visited.len(), "critical path expanded");
    visited
}

/// Each existing key in `names` plus its direct dependencies that exist.
#[must_use]
pub fn force_include<S: AsRef<str>>(graph: &DependencyGraph, names: &[S]) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for name in names.iter().map(AsRef::as_ref) {
        if !graph.contains(name) {
            continue;
        }
        out.insert(name.to_string());
        out.extend(
            graph
                .direct_deps(name)
                .iter()
                .filter(|dep| graph.contains(dep))
                .cloned(),
        );
    }
    out
}
