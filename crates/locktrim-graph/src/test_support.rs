//! Fixture builders shared by unit tests.

use std::collections::HashMap;
use std::fmt::Write as _;

use locktrim_core::config::CollisionPolicy;
use locktrim_core::lockfile::Lockfile;

use crate::graph::DependencyGraph;

/// Render `nodes` as lockfile blocks at version 1.0.0 with `edges` as
/// dependency entries, then build the graph. Edges pointing at names
/// outside `nodes` become dangling references.
pub fn graph_from_edges(nodes: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
    let lock = Lockfile::parse(&lockfile_text(nodes, edges));
    DependencyGraph::from_lockfile(&lock, CollisionPolicy::Qualify).expect("fixture graph")
}

pub fn lockfile_text(nodes: &[&str], edges: &[(&str, &str)]) -> String {
    let mut deps: HashMap<&str, Vec<&str>> = HashMap::new();
    for &(from, to) in edges {
        deps.entry(from).or_default().push(to);
    }

    let mut text = String::from("# fixture\nversion = 4\n\n");
    for name in nodes {
        let _ = write!(text, "[[package]]\nname = \"{name}\"\nversion = \"1.0.0\"\n");
        if let Some(list) = deps.get(name) {
            text.push_str("dependencies = [\n");
            for dep in list {
                let _ = writeln!(text, " \"{dep}\",");
            }
            text.push_str("]\n");
        }
        text.push('\n');
    }
    text
}
