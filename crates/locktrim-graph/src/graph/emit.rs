//! Serialize a key selection back to lockfile text.

use std::collections::BTreeSet;

use locktrim_core::lockfile::Lockfile;
use tracing::{debug, instrument};

use crate::graph::DependencyGraph;

/// Lockfile text holding exactly the blocks whose key is in `keep`, in
/// their original order, between the original header and trailer.
///
/// A block shadowed under `last-wins` or `first-wins` maps to the winning
/// key, whose edges include its dependencies, so it is written with it.
/// Blocks that were never indexed (missing name or version) are dropped.
#[instrument(skip_all, fields(keep = keep.len()))]
pub fn render_lockfile(lock: &Lockfile, graph: &DependencyGraph, keep: &BTreeSet<String>) -> String {
    let mut written = 0usize;
    let text = lock.to_text_where(|record| {
        let kept = graph
            .key_for_record(record.index)
            .is_some_and(|key| keep.contains(key));
        written += usize::from(kept);
        kept
    });
    debug!(blocks = written, "lockfile rendered");
    text
}
