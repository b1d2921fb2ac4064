//! Version-pinned references and ecosystem extraction.
//!
//! A dependency entry carrying a qualifier (`"actix-web 4.9.0"`) pins the
//! referenced package to one version among several. Packages holding such
//! pins are the ones that keep an ecosystem's versions in place, so
//! [`ecosystem`] pulls them in alongside the prefix matches.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::graph::DependencyGraph;

/// A package whose dependency list pins `target` to a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintHit {
    /// Key of the package holding the pin.
    pub dependent: String,
    /// Entry as written between the quotes.
    pub entry: String,
}

/// Every qualified dependency entry naming `target`, ordered by dependent.
#[must_use]
pub fn version_constraints(graph: &DependencyGraph, target: &str) -> Vec<ConstraintHit> {
    let mut hits: Vec<ConstraintHit> = graph
        .nodes()
        .flat_map(|node| {
            node.entries
                .iter()
                .filter(|entry| entry.name == target && entry.qualifier.is_some())
                .map(|entry| ConstraintHit {
                    dependent: node.key.clone(),
                    entry: entry.token(),
                })
        })
        .collect();
    hits.sort_by(|a, b| a.dependent.cmp(&b.dependent).then_with(|| a.entry.cmp(&b.entry)));
    hits.dedup();
    hits
}

/// Keys whose package name starts with any prefix, keys named in `names`,
/// and every package pinning a prefix-matched package's version.
#[must_use]
pub fn ecosystem<P, N>(graph: &DependencyGraph, prefixes: &[P], names: &[N]) -> BTreeSet<String>
where
    P: AsRef<str>,
    N: AsRef<str>,
{
    let mut out = BTreeSet::new();
    let mut matched_names = BTreeSet::new();

    for node in graph.nodes() {
        if prefixes.iter().any(|p| node.name.starts_with(p.as_ref())) {
            out.insert(node.key.clone());
            matched_names.insert(node.name.clone());
        }
    }

    for name in names.iter().map(AsRef::as_ref) {
        out.extend(graph.keys_named(name).map(str::to_string));
    }

    for name in &matched_names {
        out.extend(
            version_constraints(graph, name)
                .into_iter()
                .map(|hit| hit.dependent),
        );
    }

    out
}
