//! Known-topology regression tests over the public query API.

use std::collections::BTreeSet;

use locktrim_core::config::CollisionPolicy;
use locktrim_core::lockfile::Lockfile;
use locktrim_graph::graph::{DependencyGraph, GraphStats, render_lockfile};
use locktrim_graph::query::{
    FanIn, closure, critical_nodes, ecosystem, expand_critical_path, force_include, leaf_nodes,
    prune, remove_with_orphans, safe_removal_set, version_constraints,
};

fn lockfile_text(blocks: &[(&str, &[&str])]) -> String {
    let mut text = String::from(
        "# This file is automatically @generated by Cargo.\n# It is not intended for manual editing.\nversion = 4\n\n",
    );
    for (name, deps) in blocks {
        text.push_str(&format!(
            "[[package]]\nname = \"{name}\"\nversion = \"1.0.0\"\nsource = \"registry+https://github.com/rust-lang/crates.io-index\"\n"
        ));
        if !deps.is_empty() {
            text.push_str("dependencies = [\n");
            for dep in *deps {
                text.push_str(&format!(" \"{dep}\",\n"));
            }
            text.push_str("]\n");
        }
        text.push('\n');
    }
    text
}

fn graph(blocks: &[(&str, &[&str])]) -> DependencyGraph {
    DependencyGraph::from_lockfile(&Lockfile::parse(&lockfile_text(blocks)), CollisionPolicy::Qualify)
        .expect("build graph")
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn linear_chain_with_unreferenced_package() {
    let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &[]), ("D", &[])]);
    assert_eq!(closure(&g, ["A"]), set(&["A", "B", "C"]));
    let outcome = prune(&g, ["A"]);
    assert_eq!(outcome.removed, set(&["D"]));
    assert_eq!(outcome.retained, set(&["A", "B", "C"]));
}

#[test]
fn shared_dependency_with_partial_root() {
    let g = graph(&[("A", &["C"]), ("B", &["C"]), ("C", &[])]);
    assert_eq!(closure(&g, ["A"]), set(&["A", "C"]));
    let removed = safe_removal_set(&g, &set(&["A", "C"]));
    assert!(removed.contains("B"));
}

#[test]
fn cycle_closure_terminates() {
    let g = graph(&[("A", &["B"]), ("B", &["A"])]);
    assert_eq!(closure(&g, ["A"]), set(&["A", "B"]));
}

#[test]
fn fan_in_ranking_returns_single_hub() {
    let mut blocks: Vec<(String, Vec<String>)> = Vec::new();
    for i in 0..6 {
        let mut deps = vec!["six".to_string()];
        if i < 3 {
            deps.push("three".to_string());
        }
        if i == 0 {
            deps.push("one".to_string());
        }
        blocks.push((format!("user{i}"), deps));
    }
    for name in ["six", "three", "one"] {
        blocks.push((name.to_string(), Vec::new()));
    }
    let deps_refs: Vec<Vec<&str>> = blocks
        .iter()
        .map(|(_, deps)| deps.iter().map(String::as_str).collect())
        .collect();
    let borrowed: Vec<(&str, &[&str])> = blocks
        .iter()
        .zip(&deps_refs)
        .map(|((name, _), deps)| (name.as_str(), deps.as_slice()))
        .collect();
    let g = graph(&borrowed);

    assert_eq!(
        critical_nodes(&g, 5),
        [FanIn {
            name: "six".to_string(),
            fan_in: 6,
        }]
    );
    let leaves = leaf_nodes(&g);
    assert_eq!(leaves.len(), 6);
    assert!(leaves.iter().all(|name| name.starts_with("user")));
}

/// A small async web service lockfile.
fn service() -> (Lockfile, DependencyGraph) {
    let text = lockfile_text(&[
        ("app", &["axum", "serde", "tokio"]),
        ("axum", &["bytes", "hyper", "serde", "tokio", "tower"]),
        ("bytes", &[]),
        ("criterion", &["serde", "plotters"]),
        ("hyper", &["bytes", "tokio"]),
        ("plotters", &[]),
        ("serde", &["serde_derive"]),
        ("serde_derive", &["syn"]),
        ("syn", &[]),
        ("tokio", &["bytes", "mio"]),
        ("mio", &[]),
        ("tower", &["tokio"]),
    ]);
    let lock = Lockfile::parse(&text);
    let graph = DependencyGraph::from_lockfile(&lock, CollisionPolicy::Qualify).expect("build");
    (lock, graph)
}

#[test]
fn pruning_a_service_drops_dev_only_packages() {
    let (lock, g) = service();
    let outcome = prune(&g, ["app"]);
    assert_eq!(outcome.removed, set(&["criterion", "plotters"]));

    let text = render_lockfile(&lock, &g, &outcome.retained);
    assert!(text.starts_with("# This file is automatically @generated by Cargo."));
    assert!(!text.contains("name = \"criterion\""));
    assert!(text.contains("name = \"tower\""));
    assert_eq!(Lockfile::parse(&text).len(), 10);
}

#[test]
fn critical_path_follows_shared_packages() {
    let (_, g) = service();
    assert_eq!(g.fan_in("tokio"), 4);
    assert_eq!(g.fan_in("bytes"), 3);
    // Only dependencies with more than two dependents are followed.
    let extracted = expand_critical_path(&g, &["app"], 2);
    assert_eq!(extracted, set(&["app", "bytes", "serde", "tokio"]));

    let mut with_axum = extracted;
    with_axum.extend(force_include(&g, &["axum"]));
    assert!(with_axum.contains("hyper"));
    assert!(with_axum.contains("tower"));
}

#[test]
fn removing_a_package_cascades_to_private_dependencies() {
    let (_, g) = service();
    let removed = remove_with_orphans(&g, &set(&["criterion"]), &BTreeSet::new(), true);
    assert_eq!(removed, set(&["criterion", "plotters"]));

    let protected = closure(&g, ["app"]);
    let removed = remove_with_orphans(&g, &set(&["axum", "app"]), &protected, true);
    assert!(removed.is_empty());
}

#[test]
fn version_pins_feed_the_ecosystem() {
    let text = "\
[[package]]
name = \"glue\"
version = \"0.1.0\"
dependencies = [
 \"tokio 1.0.0\",
]

[[package]]
name = \"tokio\"
version = \"0.2.0\"

[[package]]
name = \"tokio\"
version = \"1.0.0\"
dependencies = [
 \"tokio-macros\",
]

[[package]]
name = \"tokio-macros\"
version = \"2.0.0\"
";
    let g = DependencyGraph::from_lockfile(&Lockfile::parse(text), CollisionPolicy::Qualify)
        .expect("build");
    assert_eq!(version_constraints(&g, "tokio").len(), 1);
    assert_eq!(
        ecosystem::<&str, &str>(&g, &["tokio"], &[]),
        set(&["glue", "tokio 0.2.0", "tokio 1.0.0", "tokio-macros"])
    );
    assert_eq!(g.direct_deps("glue"), ["tokio 1.0.0"]);
}

#[test]
fn service_graph_statistics() {
    let (_, g) = service();
    let stats = GraphStats::compute(&g);
    assert_eq!(stats.node_count, 12);
    assert_eq!(stats.edge_count, 17);
    assert_eq!(stats.cycle_count, 0);
    assert_eq!(stats.weakly_connected_component_count, 1);
    assert_eq!(stats.max_fan_in, 4);
}

const GIT_AND_REGISTRY: &str = "\
version = 4

[[package]]
name = \"app\"
version = \"0.1.0\"
dependencies = [
 \"foo 1.0.0 (git+https://example.com/foo#abc)\",
 \"foo 1.0.0 (registry+https://github.com/rust-lang/crates.io-index)\",
]

[[package]]
name = \"foo\"
version = \"1.0.0\"
source = \"git+https://example.com/foo#abc\"

[[package]]
name = \"foo\"
version = \"1.0.0\"
source = \"registry+https://github.com/rust-lang/crates.io-index\"
checksum = \"00\"
";

#[test]
fn same_version_from_git_and_registry_survives_pruning() {
    let lock = Lockfile::parse(GIT_AND_REGISTRY);
    let g = DependencyGraph::from_lockfile(&lock, CollisionPolicy::Qualify).expect("build");
    let outcome = prune(&g, ["app"]);
    assert!(outcome.removed.is_empty());
    assert_eq!(render_lockfile(&lock, &g, &outcome.retained), GIT_AND_REGISTRY);
}

const SHADOWED: &str = "\
version = 4

[[package]]
name = \"app\"
version = \"0.1.0\"
dependencies = [
 \"x\",
]

[[package]]
name = \"x\"
version = \"1.0.0\"
dependencies = [
 \"y\",
]

[[package]]
name = \"x\"
version = \"2.0.0\"

[[package]]
name = \"y\"
version = \"1.0.0\"
";

#[test]
fn shadowed_block_keeps_its_dependencies_when_written() {
    for policy in [CollisionPolicy::LastWins, CollisionPolicy::FirstWins] {
        let lock = Lockfile::parse(SHADOWED);
        let g = DependencyGraph::from_lockfile(&lock, policy).expect("build");
        let outcome = prune(&g, ["app"]);
        assert!(outcome.removed.is_empty(), "{policy}: {:?}", outcome.removed);

        let text = render_lockfile(&lock, &g, &outcome.retained);
        assert_eq!(text, SHADOWED);
        let reparsed = DependencyGraph::from_lockfile(&Lockfile::parse(&text), policy)
            .expect("rebuild");
        assert!(reparsed.dangling().is_empty(), "{policy}");
    }
}
