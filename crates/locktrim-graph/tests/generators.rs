#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fmt::Write as _;

use locktrim_core::config::CollisionPolicy;
use locktrim_core::lockfile::Lockfile;
use locktrim_graph::DependencyGraph;
use proptest::prelude::*;

/// A generated lockfile: `nodes` packages named `p0..pN`, and edges that
/// may point past the last node (rendered as dangling `ghostK` names).
#[derive(Debug, Clone)]
pub struct GraphCase {
    pub node_count: usize,
    pub edges: Vec<(usize, usize)>,
}

impl GraphCase {
    pub fn name(&self, i: usize) -> String {
        if i < self.node_count {
            format!("p{i}")
        } else {
            format!("ghost{}", i - self.node_count)
        }
    }

    pub fn names(&self) -> Vec<String> {
        (0..self.node_count).map(|i| self.name(i)).collect()
    }

    pub fn lockfile_text(&self) -> String {
        let mut text = String::from("version = 4\n\n");
        for i in 0..self.node_count {
            let _ = write!(text, "[[package]]\nname = \"{}\"\nversion = \"0.1.0\"\n", self.name(i));
            let deps: Vec<String> = self
                .edges
                .iter()
                .filter(|(from, _)| *from == i)
                .map(|(_, to)| self.name(*to))
                .collect();
            if !deps.is_empty() {
                text.push_str("dependencies = [\n");
                for dep in deps {
                    let _ = writeln!(text, " \"{dep}\",");
                }
                text.push_str("]\n");
            }
            text.push('\n');
        }
        text
    }

    pub fn lockfile(&self) -> Lockfile {
        Lockfile::parse(&self.lockfile_text())
    }

    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::from_lockfile(&self.lockfile(), CollisionPolicy::Qualify)
            .expect("unique names never collide")
    }

    /// Names for `picks`; indices past the node count become unknown names.
    pub fn pick(&self, picks: &[usize]) -> BTreeSet<String> {
        picks.iter().map(|&i| self.name(i)).collect()
    }
}

pub fn arb_graph_case() -> impl Strategy<Value = GraphCase> {
    (1usize..24).prop_flat_map(|node_count| {
        // Targets range a little past the node count to produce dangling refs.
        let edge = (0..node_count, 0..node_count + 3);
        prop::collection::vec(edge, 0..node_count * 3)
            .prop_map(move |edges| GraphCase { node_count, edges })
    })
}

/// A case with two root picks where the first is a subset of the second.
pub fn arb_nested_roots() -> impl Strategy<Value = (GraphCase, Vec<usize>, Vec<usize>)> {
    arb_graph_case().prop_flat_map(|case| {
        let n = case.node_count;
        let small = prop::collection::vec(0..n + 1, 0..4);
        let extra = prop::collection::vec(0..n + 1, 0..4);
        (Just(case), small, extra).prop_map(|(case, small, extra)| {
            let mut large = small.clone();
            large.extend(extra);
            (case, small, large)
        })
    })
}

pub fn arb_roots() -> impl Strategy<Value = (GraphCase, Vec<usize>)> {
    arb_graph_case().prop_flat_map(|case| {
        let n = case.node_count;
        (Just(case), prop::collection::vec(0..n + 1, 0..5))
    })
}
