use std::collections::BTreeSet;
use std::fmt::Write as _;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use locktrim_core::config::CollisionPolicy;
use locktrim_core::lockfile::Lockfile;
use locktrim_graph::graph::DependencyGraph;
use locktrim_graph::query::{closure, critical_nodes, expand_critical_path, prune};

const TIERS: [(&str, usize); 3] = [("small", 200), ("medium", 1_000), ("large", 5_000)];

/// Layered synthetic lockfile: each package depends on up to four packages
/// from later layers, chosen by a fixed stride so runs are repeatable.
fn synthetic_lockfile(packages: usize) -> String {
    let mut text = String::from("version = 4\n\n");
    for i in 0..packages {
        let _ = write!(text, "[[package]]\nname = \"pkg{i}\"\nversion = \"1.0.0\"\n");
        let deps: BTreeSet<usize> = (1..=4)
            .map(|k| i + k * 7 + (i * 31 + k) % 13)
            .filter(|&d| d < packages)
            .collect();
        if !deps.is_empty() {
            text.push_str("dependencies = [\n");
            for d in deps {
                let _ = writeln!(text, " \"pkg{d}\",");
            }
            text.push_str("]\n");
        }
        text.push('\n');
    }
    text
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    for (tier, packages) in TIERS {
        let text = synthetic_lockfile(packages);
        group.throughput(Throughput::Elements(packages as u64));

        group.bench_with_input(BenchmarkId::new("parse_build", tier), &text, |b, text| {
            b.iter(|| {
                let lock = Lockfile::parse(black_box(text));
                DependencyGraph::from_lockfile(&lock, CollisionPolicy::Qualify)
            });
        });

        let Ok(graph) = DependencyGraph::from_lockfile(&Lockfile::parse(&text), CollisionPolicy::Qualify)
        else {
            continue;
        };
        let roots = ["pkg0", "pkg1", "pkg2"];

        group.bench_with_input(BenchmarkId::new("closure", tier), &graph, |b, g| {
            b.iter(|| black_box(closure(g, roots)));
        });
        group.bench_with_input(BenchmarkId::new("prune", tier), &graph, |b, g| {
            b.iter(|| black_box(prune(g, roots)));
        });
        group.bench_with_input(BenchmarkId::new("critical", tier), &graph, |b, g| {
            b.iter(|| black_box(critical_nodes(g, 3)));
        });
        group.bench_with_input(BenchmarkId::new("expand", tier), &graph, |b, g| {
            b.iter(|| black_box(expand_critical_path(g, &roots, 2)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
