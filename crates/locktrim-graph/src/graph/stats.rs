//! Summary statistics for a dependency graph.
//!
//! # Statistics Provided
//!
//! - **node_count**: Indexed packages.
//! - **edge_count**: Distinct resolved `dependent → dependency` edges.
//!   Repeated entries and dangling references are not counted.
//! - **dangling_count**: Distinct names referenced but never indexed.
//! - **density**: `edge_count / (node_count * (node_count - 1))`; zero for
//!   graphs with fewer than two nodes.
//! - **scc_count**: Strongly connected components. Equals `node_count` in
//!   an acyclic graph.
//! - **cycle_count**: Components with more than one member, or a single
//!   member depending on itself.
//! - **weakly_connected_component_count**: Disjoint subgraphs when edge
//!   direction is ignored.
//! - **isolated_node_count**: Packages with no dependencies and no
//!   dependents.
//! - **max_fan_in** / **max_fan_out**: Highest in- and out-degree.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::algo::{connected_components, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::graph::DependencyGraph;

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub dangling_count: usize,
    pub density: f64,
    pub scc_count: usize,
    pub cycle_count: usize,
    pub weakly_connected_component_count: usize,
    pub isolated_node_count: usize,
    pub max_fan_in: usize,
    pub max_fan_out: usize,
    /// Members of each cycle, sorted within and across cycles.
    pub cycles: Vec<Vec<String>>,
}

impl GraphStats {
    #[must_use]
    pub fn compute(graph: &DependencyGraph) -> Self {
        let di = to_digraph(graph);
        let node_count = di.node_count();
        let edge_count = di.edge_count();

        let sccs = tarjan_scc(&di);
        let scc_count = sccs.len();
        let mut cycles: Vec<Vec<String>> = sccs
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&idx| di.contains_edge(idx, idx))
            })
            .map(|component| {
                let mut keys: Vec<String> =
                    component.into_iter().map(|idx| di[idx].clone()).collect();
                keys.sort_unstable();
                keys
            })
            .collect();
        cycles.sort_unstable();

        let degree = |idx: NodeIndex, dir: Direction| di.neighbors_directed(idx, dir).count();

        let isolated_node_count = di
            .node_indices()
            .filter(|&idx| {
                degree(idx, Direction::Incoming) == 0 && degree(idx, Direction::Outgoing) == 0
            })
            .count();
        let max_fan_in = di
            .node_indices()
            .map(|idx| degree(idx, Direction::Incoming))
            .max()
            .unwrap_or(0);
        let max_fan_out = di
            .node_indices()
            .map(|idx| degree(idx, Direction::Outgoing))
            .max()
            .unwrap_or(0);

        Self {
            node_count,
            edge_count,
            dangling_count: graph.dangling().len(),
            density: compute_density(node_count, edge_count),
            scc_count,
            cycle_count: cycles.len(),
            weakly_connected_component_count: connected_components(&di),
            isolated_node_count,
            max_fan_in,
            max_fan_out,
            cycles,
        }
    }

    #[must_use]
    pub fn has_cycles(&self) -> bool {
        self.cycle_count > 0
    }
}

/// Distinct resolved edges as a petgraph digraph, one node per key.
fn to_digraph(graph: &DependencyGraph) -> DiGraph<String, ()> {
    let mut di = DiGraph::with_capacity(graph.len(), 0);
    let index: HashMap<&str, NodeIndex> = graph
        .keys()
        .map(|key| (key, di.add_node(key.to_string())))
        .collect();

    for node in graph.nodes() {
        let from = index[node.key.as_str()];
        let targets: BTreeSet<&str> = node
            .dependencies
            .iter()
            .map(String::as_str)
            .filter(|dep| graph.contains(dep))
            .collect();
        for dep in targets {
            di.add_edge(from, index[dep], ());
        }
    }
    di
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
}
