#![no_main]

use libfuzzer_sys::fuzz_target;
use locktrim_core::config::CollisionPolicy;
use locktrim_core::lockfile::Lockfile;
use locktrim_graph::DependencyGraph;
use locktrim_graph::query::prune;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let lock = Lockfile::parse(text);
    let Ok(graph) = DependencyGraph::from_lockfile(&lock, CollisionPolicy::Qualify) else {
        return;
    };
    let roots: Vec<&str> = graph.keys().take(2).collect();
    let outcome = prune(&graph, roots);
    for key in &outcome.retained {
        for dep in graph.direct_deps(key) {
            assert!(!outcome.removed.contains(dep));
        }
    }
});
