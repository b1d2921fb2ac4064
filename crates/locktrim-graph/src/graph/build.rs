//! Dependency graph construction from parsed package records.
//!
//! # Edge Direction
//!
//! `nodes[A].dependencies` lists what `A` depends on (forward edges, in
//! source order). The reverse index `dependents[B]` holds every `A` whose
//! dependency list contains `B`. Dependency names without a matching node
//! are dangling: they stay in the forward list but never enter the reverse
//! index.
//!
//! # Node Keys
//!
//! Keys depend on the [`CollisionPolicy`]:
//!
//! | Policy       | Unique name | Shared name (`syn` 1.x and 2.x) |
//! |--------------|-------------|---------------------------------|
//! | `qualify`    | `serde`     | `syn 1.0.109`, `syn 2.0.87`      |
//! | `last-wins`  | `serde`     | `syn` (later record)             |
//! | `first-wins` | `serde`     | `syn` (earlier record)           |
//! | `reject`     | `serde`     | build fails                      |
//!
//! The qualified form is the one Cargo itself writes in dependency lists
//! when a bare name would be ambiguous, so `"syn 2.0.87"` entries resolve
//! directly. When the same name and version come from two sources (a git
//! checkout next to the registry release) the key also carries the source,
//! `foo 1.0.0 (git+https://...)`, again matching Cargo's own entries. An
//! unqualified entry naming a shared package links to every version of it.
//!
//! # Shadowed Records
//!
//! Under `last-wins` and `first-wins` the losing record gets no node of its
//! own. It maps to the winner's key and its dependency entries are added to
//! the winner's edges, so keeping the node keeps everything either block
//! refers to.
//!
//! The graph is immutable once built; every query borrows it read-only.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use locktrim_core::config::CollisionPolicy;
use locktrim_core::lockfile::{DependencyRef, Lockfile, PackageRecord};
use serde::Serialize;
use tracing::{debug, instrument, warn};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Two records share a name under [`CollisionPolicy::Reject`].
    #[error("package name `{name}` appears {} times (versions: {})", versions.len(), versions.join(", "))]
    NameCollision { name: String, versions: Vec<String> },
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An indexed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    /// Graph key (bare or qualified name).
    pub key: String,
    pub name: String,
    pub version: String,
    /// Position of the source block in the lockfile.
    pub record_index: usize,
    /// Resolved dependency keys in source order, shadowed records'
    /// entries included. Dangling entries keep their bare name.
    pub dependencies: Vec<String>,
    /// Dependency entries exactly as parsed.
    pub entries: Vec<DependencyRef>,
}

/// Several records sharing one package name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub name: String,
    /// Versions in file order.
    pub versions: Vec<String>,
    pub resolution: String,
}

/// Name-indexed dependency graph with a reverse index.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, PackageNode>,
    dependents: HashMap<String, BTreeSet<String>>,
    record_keys: HashMap<usize, String>,
    collisions: Vec<Collision>,
    dangling: BTreeSet<String>,
}

impl DependencyGraph {
    /// Build the graph from records using `policy` for shared names.
    ///
    /// Records without a name or version are skipped (the codec has
    /// already reported them).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NameCollision`] only under
    /// [`CollisionPolicy::Reject`].
    #[instrument(skip(records), fields(records = records.len()))]
    pub fn build(records: &[PackageRecord], policy: CollisionPolicy) -> Result<Self, GraphError> {
        let indexable: Vec<(&PackageRecord, &str, &str)> = records
            .iter()
            .filter_map(|r| Some((r, r.name.as_deref()?, r.version.as_deref()?)))
            .collect();

        let mut versions_by_name: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for &(_, name, version) in &indexable {
            versions_by_name.entry(name).or_default().push(version);
        }

        let mut collisions = Vec::new();
        for (&name, versions) in &versions_by_name {
            if versions.len() < 2 {
                continue;
            }
            let versions: Vec<String> = versions.iter().map(|v| (*v).to_string()).collect();
            if policy == CollisionPolicy::Reject {
                return Err(GraphError::NameCollision {
                    name: name.to_string(),
                    versions,
                });
            }
            warn!(name, versions = ?versions, policy = %policy, "package name collision");
            collisions.push(Collision {
                name: name.to_string(),
                versions,
                resolution: policy.to_string(),
            });
        }

        let is_shared = |name: &str| versions_by_name.get(name).is_some_and(|v| v.len() > 1);
        let mut per_version: HashMap<(&str, &str), usize> = HashMap::new();
        for &(_, name, version) in &indexable {
            *per_version.entry((name, version)).or_default() += 1;
        }

        // Pass 1: group records by key. The first record of a group owns
        // the node; the rest fold into it.
        let mut groups: BTreeMap<String, Vec<(&PackageRecord, &str, &str)>> = BTreeMap::new();
        for &(record, name, version) in &indexable {
            let key = if policy == CollisionPolicy::Qualify && is_shared(name) {
                let source = record
                    .source
                    .as_deref()
                    .filter(|_| per_version.get(&(name, version)).is_some_and(|&n| n > 1));
                qualified_key(name, version, source)
            } else {
                name.to_string()
            };
            let group = groups.entry(key).or_default();
            if policy == CollisionPolicy::LastWins {
                group.insert(0, (record, name, version));
            } else {
                group.push((record, name, version));
            }
            if group.len() > 1 {
                debug!(name, shadowed_block = group[1].0.index, "record shadowed");
            }
        }

        // Every key a bare name may refer to, with its version.
        let mut keys_by_name: HashMap<&str, Vec<(usize, &str, &str)>> = HashMap::new();
        for (key, group) in &groups {
            let (record, name, version) = group[0];
            keys_by_name
                .entry(name)
                .or_default()
                .push((record.index, key.as_str(), version));
        }
        for keys in keys_by_name.values_mut() {
            keys.sort_unstable();
        }

        // Pass 2: resolve dependency entries of every record in a group.
        let mut nodes = BTreeMap::new();
        let mut record_keys = HashMap::with_capacity(indexable.len());
        let mut dangling = BTreeSet::new();

        for (key, group) in &groups {
            let mut dependencies = Vec::new();
            let mut entries = Vec::new();
            for &(record, ..) in group {
                for entry in &record.dependencies {
                    let resolved = resolve(entry, &groups, &keys_by_name);
                    if resolved.is_empty() {
                        dangling.insert(entry.name.clone());
                        dependencies.push(entry.name.clone());
                    } else {
                        dependencies.extend(resolved);
                    }
                }
                entries.extend(record.dependencies.iter().cloned());
                record_keys.insert(record.index, key.clone());
            }
            let (record, name, version) = group[0];
            nodes.insert(
                key.clone(),
                PackageNode {
                    key: key.clone(),
                    name: name.to_string(),
                    version: version.to_string(),
                    record_index: record.index,
                    dependencies,
                    entries,
                },
            );
        }

        let dependents = invert(&nodes);

        debug!(
            nodes = nodes.len(),
            collisions = collisions.len(),
            dangling = dangling.len(),
            "dependency graph built"
        );

        Ok(Self {
            nodes,
            dependents,
            record_keys,
            collisions,
            dangling,
        })
    }

    /// Build from a parsed lockfile.
    ///
    /// # Errors
    ///
    /// See [`DependencyGraph::build`].
    pub fn from_lockfile(lock: &Lockfile, policy: CollisionPolicy) -> Result<Self, GraphError> {
        Self::build(&lock.packages, policy)
    }

    /// Set of keys depending on `key`; empty if absent.
    pub fn dependents<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.dependents
            .get(key)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Number of distinct dependents of `key`.
    #[must_use]
    pub fn fan_in(&self, key: &str) -> usize {
        self.dependents.get(key).map_or(0, BTreeSet::len)
    }

    /// Forward dependency keys of `key` in source order; empty if absent.
    #[must_use]
    pub fn direct_deps(&self, key: &str) -> &[String] {
        self.nodes
            .get(key)
            .map(|node| node.dependencies.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    #[must_use]
    pub fn node(&self, key: &str) -> Option<&PackageNode> {
        self.nodes.get(key)
    }

    /// All nodes in key order.
    pub fn nodes(&self) -> impl Iterator<Item = &PackageNode> {
        self.nodes.values()
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Owned copy of every key.
    #[must_use]
    pub fn key_set(&self) -> BTreeSet<String> {
        self.nodes.keys().cloned().collect()
    }

    /// Keys indexed under a bare package name.
    pub fn keys_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.nodes
            .values()
            .filter(move |node| node.name == name)
            .map(|node| node.key.as_str())
    }

    /// Key assigned to the block at `record_index`, if it was indexed.
    #[must_use]
    pub fn key_for_record(&self, record_index: usize) -> Option<&str> {
        self.record_keys.get(&record_index).map(String::as_str)
    }

    #[must_use]
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Bare names referenced by some dependency list but never indexed.
    #[must_use]
    pub fn dangling(&self) -> &BTreeSet<String> {
        &self.dangling
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn qualified_key(name: &str, version: &str, source: Option<&str>) -> String {
    match source {
        Some(source) => format!("{name} {version} ({source})"),
        None => format!("{name} {version}"),
    }
}

/// Resolve one dependency entry to zero or more node keys.
///
/// Tried in order: the full token (`"name version (source)"`), then
/// `"name version"`, then the bare name, then every key of that name,
/// narrowed to the entry's version when any key carries it.
fn resolve<V>(
    entry: &DependencyRef,
    groups: &BTreeMap<String, V>,
    keys_by_name: &HashMap<&str, Vec<(usize, &str, &str)>>,
) -> Vec<String> {
    let token = entry.token();
    if groups.contains_key(&token) {
        return vec![token];
    }
    if let Some(version) = entry.version() {
        let qualified = qualified_key(&entry.name, version, None);
        if groups.contains_key(&qualified) {
            return vec![qualified];
        }
    }
    if groups.contains_key(&entry.name) {
        return vec![entry.name.clone()];
    }
    let Some(keys) = keys_by_name.get(entry.name.as_str()) else {
        return Vec::new();
    };
    let same_version: Vec<String> = keys
        .iter()
        .filter(|(_, _, v)| Some(*v) == entry.version())
        .map(|(_, k, _)| (*k).to_string())
        .collect();
    if same_version.is_empty() {
        keys.iter().map(|(_, k, _)| (*k).to_string()).collect()
    } else {
        same_version
    }
}

/// One pass over all forward edges; dangling names never appear as nodes
/// so they never reach the index.
fn invert(nodes: &BTreeMap<String, PackageNode>) -> HashMap<String, BTreeSet<String>> {
    let mut dependents: HashMap<String, BTreeSet<String>> = HashMap::new();
    for node in nodes.values() {
        for dep in &node.dependencies {
            if nodes.contains_key(dep) {
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .insert(node.key.clone());
            }
        }
    }
    dependents
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
