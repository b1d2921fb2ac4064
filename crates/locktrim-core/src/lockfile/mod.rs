//! Lockfile codec.
//!
//! Splits a `Cargo.lock`-style artifact into three verbatim pieces:
//!
//! ```text
//! header        everything before the first `[[package]]` line
//! blocks        one per `[[package]]`, running to the next marker
//! trailer       top-level tables after the last package (`[metadata]`, ...)
//! ```
//!
//! Nothing is reformatted. [`Lockfile::to_text`] reproduces the input byte
//! for byte, and [`serialize`] emits a caller-chosen subset of blocks in the
//! order given.
//!
//! Blocks that lack a `name = ` or `version = ` line are kept as
//! [`PackageRecord`]s (so the round trip stays exact) and reported as
//! [`ParseAnomaly`] values; the graph builder refuses to index them.

pub mod deps;
pub mod writer;

use serde::Serialize;
use tracing::{instrument, warn};

pub use deps::{DependencyListScanner, DependencyRef, ScanState, first_quoted};
pub use writer::{read_lockfile, write_atomic};

/// Line that introduces every package block.
pub const PACKAGE_MARKER: &str = "[[package]]";

const NAME_PREFIX: &str = "name = ";
const VERSION_PREFIX: &str = "version = ";
const SOURCE_PREFIX: &str = "source = ";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised at the codec's I/O boundary.
#[derive(Debug, thiserror::Error)]
pub enum LockfileError {
    /// The input artifact could not be read.
    #[error("failed to read lockfile {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The output artifact could not be written or moved into place.
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One `[[package]]` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    /// Zero-based position of the block in the source file.
    pub index: usize,
    /// 1-based line number of the block marker.
    pub line: usize,
    pub name: Option<String>,
    pub version: Option<String>,
    /// `source` line value (`registry+...`, `git+...`); absent for path
    /// and workspace packages.
    pub source: Option<String>,
    /// Dependency entries in source order, duplicates included.
    pub dependencies: Vec<DependencyRef>,
    /// Exact source text of the block, marker line included.
    pub raw_block: String,
}

impl PackageRecord {
    /// `true` when the block has both a name and a version.
    #[must_use]
    pub const fn is_indexable(&self) -> bool {
        self.name.is_some() && self.version.is_some()
    }

    /// Bare dependency names in source order.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(|d| d.name.as_str())
    }
}

/// What was wrong with a block that could not be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    MissingName,
    MissingVersion,
}

/// A non-fatal problem found while splitting the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseAnomaly {
    pub block_index: usize,
    pub line: usize,
    pub kind: AnomalyKind,
    /// Name of the block when only the version was missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A parsed lockfile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lockfile {
    pub header: String,
    pub packages: Vec<PackageRecord>,
    pub trailer: String,
    pub anomalies: Vec<ParseAnomaly>,
}

impl Lockfile {
    /// Parse lockfile text. Never fails; see [`ParseAnomaly`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        parse(text)
    }

    /// Reassemble the full file.
    #[must_use]
    pub fn to_text(&self) -> String {
        serialize(&self.header, &self.packages, &self.trailer)
    }

    /// Reassemble the file keeping only records accepted by `keep`, in
    /// original order.
    #[must_use]
    pub fn to_text_where(&self, mut keep: impl FnMut(&PackageRecord) -> bool) -> String {
        let selected: Vec<&PackageRecord> = self.packages.iter().filter(|&p| keep(p)).collect();
        serialize(&self.header, selected, &self.trailer)
    }

    /// Number of package blocks, indexable or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

/// Split `text` into header, package blocks and trailer.
#[instrument(skip(text), fields(bytes = text.len()))]
#[must_use]
pub fn parse(text: &str) -> Lockfile {
    // Byte offset and 1-based line of every marker line.
    let mut markers: Vec<(usize, usize)> = Vec::new();
    let mut offset = 0;
    for (line_no, line) in text.split_inclusive('\n').enumerate() {
        if is_marker(line) {
            markers.push((offset, line_no + 1));
        }
        offset += line.len();
    }

    let Some(&(first, _)) = markers.first() else {
        return Lockfile {
            header: text.to_string(),
            ..Lockfile::default()
        };
    };

    let header = text[..first].to_string();
    let mut packages = Vec::with_capacity(markers.len());
    let mut anomalies = Vec::new();
    let mut trailer = String::new();

    for (index, &(start, line)) in markers.iter().enumerate() {
        let end = markers.get(index + 1).map_or(text.len(), |&(next, _)| next);
        let mut segment = &text[start..end];

        if index + 1 == markers.len() {
            let split = trailer_offset(segment);
            trailer = segment[split..].to_string();
            segment = &segment[..split];
        }

        let record = parse_block(index, line, segment);
        if let Some(anomaly) = anomaly_for(&record) {
            warn!(
                block = anomaly.block_index,
                line = anomaly.line,
                kind = ?anomaly.kind,
                "package block cannot be indexed"
            );
            anomalies.push(anomaly);
        }
        packages.push(record);
    }

    Lockfile {
        header,
        packages,
        trailer,
        anomalies,
    }
}

fn is_marker(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == PACKAGE_MARKER
}

/// A top-level table header other than the package marker.
fn is_foreign_table(line: &str) -> bool {
    line.starts_with('[') && !is_marker(line)
}

/// Offset within the final segment where the trailer begins.
fn trailer_offset(segment: &str) -> usize {
    let mut offset = 0;
    for (i, line) in segment.split_inclusive('\n').enumerate() {
        if i > 0 && is_foreign_table(line) {
            return offset;
        }
        offset += line.len();
    }
    segment.len()
}

fn parse_block(index: usize, line: usize, raw: &str) -> PackageRecord {
    let mut name = None;
    let mut version = None;
    let mut source = None;
    let mut scanner = DependencyListScanner::new();

    for (i, text_line) in raw.split_inclusive('\n').enumerate() {
        if i == 0 {
            continue;
        }
        // Fields of a later table embedded in this block are not ours.
        if is_foreign_table(text_line) {
            break;
        }
        if name.is_none() && text_line.starts_with(NAME_PREFIX) {
            name = first_quoted(text_line).map(str::to_string);
        } else if version.is_none() && text_line.starts_with(VERSION_PREFIX) {
            version = first_quoted(text_line).map(str::to_string);
        } else if source.is_none() && text_line.starts_with(SOURCE_PREFIX) {
            source = first_quoted(text_line).map(str::to_string);
        }
        scanner.feed(text_line);
    }

    PackageRecord {
        index,
        line,
        name,
        version,
        source,
        dependencies: scanner.finish(),
        raw_block: raw.to_string(),
    }
}

fn anomaly_for(record: &PackageRecord) -> Option<ParseAnomaly> {
    let kind = match (&record.name, &record.version) {
        (None, _) => AnomalyKind::MissingName,
        (Some(_), None) => AnomalyKind::MissingVersion,
        (Some(_), Some(_)) => return None,
    };
    Some(ParseAnomaly {
        block_index: record.index,
        line: record.line,
        kind,
        name: record.name.clone(),
    })
}

// ---------------------------------------------------------------------------
// Serialize
// ---------------------------------------------------------------------------

/// Concatenate `header`, each record's raw block in the given order, and
/// `trailer`.
#[must_use]
pub fn serialize<'a>(
    header: &str,
    records: impl IntoIterator<Item = &'a PackageRecord>,
    trailer: &str,
) -> String {
    let mut out = String::from(header);
    for record in records {
        out.push_str(&record.raw_block);
    }
    out.push_str(trailer);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# This file is automatically @generated by Cargo.
# It is not intended for manual editing.
version = 4

[[package]]
name = \"app\"
version = \"0.1.0\"
dependencies = [
 \"serde\",
 \"syn 2.0.87\",
]

[[package]]
name = \"serde\"
version = \"1.0.210\"
source = \"registry+https://github.com/rust-lang/crates.io-index\"
checksum = \"deadbeef\"

[[package]]
name = \"syn\"
version = \"2.0.87\"
";

    #[test]
    fn splits_header_and_blocks() {
        let lock = parse(SAMPLE);
        assert!(lock.header.starts_with("# This file"));
        assert!(lock.header.ends_with("version = 4\n\n"));
        assert_eq!(lock.len(), 3);
        assert!(lock.anomalies.is_empty());
        assert!(lock.trailer.is_empty());
    }

    #[test]
    fn extracts_fields() {
        let lock = parse(SAMPLE);
        let app = &lock.packages[0];
        assert_eq!(app.name.as_deref(), Some("app"));
        assert_eq!(app.version.as_deref(), Some("0.1.0"));
        let deps: Vec<_> = app.dependency_names().collect();
        assert_eq!(deps, ["serde", "syn"]);
        assert_eq!(app.dependencies[1].qualifier.as_deref(), Some("2.0.87"));
        assert_eq!(app.line, 5);
        assert_eq!(app.source, None);
        assert_eq!(
            lock.packages[1].source.as_deref(),
            Some("registry+https://github.com/rust-lang/crates.io-index")
        );
        assert!(app.raw_block.starts_with(PACKAGE_MARKER));
    }

    #[test]
    fn round_trip_is_byte_exact() {
        let lock = parse(SAMPLE);
        assert_eq!(lock.to_text(), SAMPLE);
    }

    #[test]
    fn round_trip_preserves_crlf() {
        let text = SAMPLE.replace('\n', "\r\n");
        let lock = parse(&text);
        assert_eq!(lock.len(), 3);
        assert_eq!(lock.packages[0].name.as_deref(), Some("app"));
        assert_eq!(lock.to_text(), text);
    }

    #[test]
    fn text_without_packages_is_all_header() {
        let lock = parse("version = 4\n");
        assert!(lock.is_empty());
        assert_eq!(lock.header, "version = 4\n");
        assert_eq!(lock.to_text(), "version = 4\n");
    }

    #[test]
    fn empty_text_round_trips() {
        let lock = parse("");
        assert!(lock.is_empty());
        assert_eq!(lock.to_text(), "");
    }

    #[test]
    fn metadata_table_becomes_trailer() {
        let text = format!("{SAMPLE}\n[metadata]\n\"checksum a\" = \"1\"\n");
        let lock = parse(&text);
        assert_eq!(lock.len(), 3);
        assert!(lock.trailer.starts_with("[metadata]"));
        assert!(!lock.packages[2].raw_block.contains("metadata"));
        assert_eq!(lock.to_text(), text);

        let only_app = lock.to_text_where(|p| p.name.as_deref() == Some("app"));
        assert!(only_app.ends_with("\"checksum a\" = \"1\"\n"));
        assert!(!only_app.contains("name = \"syn\""));
    }

    #[test]
    fn missing_name_is_reported_not_fatal() {
        let text = "\
[[package]]
version = \"1.0.0\"

[[package]]
name = \"ok\"
version = \"1.0.0\"
";
        let lock = parse(text);
        assert_eq!(lock.len(), 2);
        assert_eq!(lock.anomalies.len(), 1);
        assert_eq!(lock.anomalies[0].kind, AnomalyKind::MissingName);
        assert_eq!(lock.anomalies[0].block_index, 0);
        assert!(!lock.packages[0].is_indexable());
        assert!(lock.packages[1].is_indexable());
        assert_eq!(lock.to_text(), text);
    }

    #[test]
    fn missing_version_is_reported_with_name() {
        let lock = parse("[[package]]\nname = \"nov\"\n");
        assert_eq!(lock.anomalies.len(), 1);
        assert_eq!(lock.anomalies[0].kind, AnomalyKind::MissingVersion);
        assert_eq!(lock.anomalies[0].name.as_deref(), Some("nov"));
    }

    #[test]
    fn first_name_line_wins() {
        let lock = parse("[[package]]\nname = \"a\"\nname = \"b\"\nversion = \"1\"\n");
        assert_eq!(lock.packages[0].name.as_deref(), Some("a"));
    }

    #[test]
    fn serialize_follows_caller_order() {
        let lock = parse(SAMPLE);
        let reversed: Vec<&PackageRecord> = lock.packages.iter().rev().collect();
        let text = serialize(&lock.header, reversed, &lock.trailer);
        let syn_at = text.find("name = \"syn\"").expect("syn block");
        let app_at = text.find("name = \"app\"").expect("app block");
        assert!(syn_at < app_at);
    }

    #[test]
    fn selection_keeps_original_order_and_bytes() {
        let lock = parse(SAMPLE);
        let text = lock.to_text_where(|p| p.name.as_deref() != Some("serde"));
        assert!(text.starts_with(&lock.header));
        assert!(text.contains(&lock.packages[0].raw_block));
        assert!(text.contains(&lock.packages[2].raw_block));
        assert!(!text.contains("checksum"));
    }
}
