//! Dependency-list scanning for a single package block.
//!
//! A package block carries at most one bracketed list:
//!
//! ```text
//! dependencies = [
//!  "bytes",
//!  "syn 2.0.87",
//! ]
//! ```
//!
//! [`DependencyListScanner`] is fed one line at a time and moves between
//! [`ScanState::OutsideDependencyList`] and [`ScanState::InsideDependencyList`].
//! Inside the list every line containing a quote contributes its first quoted
//! token. The token is split on the first space into a bare name and an
//! optional qualifier (Cargo writes `"name version"` or
//! `"name version (source)"` when a bare name would be ambiguous).

use serde::Serialize;

/// Line that opens the dependency list (compared after trimming).
pub const DEPENDENCIES_START: &str = "dependencies = [";

/// Line that closes the dependency list (compared after trimming).
pub const DEPENDENCIES_END: &str = "]";

/// One entry of a package's dependency list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyRef {
    /// Bare package name (text before the first space).
    pub name: String,
    /// Version (and possibly source) text after the name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl DependencyRef {
    /// Split a raw quoted token (`"syn 2.0.87"` without quotes) into parts.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token.split_once(' ') {
            Some((name, rest)) if !rest.trim().is_empty() => Self {
                name: name.to_string(),
                qualifier: Some(rest.trim().to_string()),
            },
            Some((name, _)) => Self {
                name: name.to_string(),
                qualifier: None,
            },
            None => Self {
                name: token.to_string(),
                qualifier: None,
            },
        }
    }

    /// Version part of the qualifier (first word), if present.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.qualifier
            .as_deref()
            .and_then(|q| q.split_whitespace().next())
    }

    /// The token as it appeared between the quotes.
    #[must_use]
    pub fn token(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{} {q}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Scanner position relative to the bracketed dependency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    OutsideDependencyList,
    InsideDependencyList,
}

/// Line-driven state machine that collects [`DependencyRef`]s.
#[derive(Debug, Default)]
pub struct DependencyListScanner {
    state: ScanState,
    deps: Vec<DependencyRef>,
}

impl DependencyListScanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    /// Feed one line (with or without its trailing newline).
    pub fn feed(&mut self, line: &str) {
        let trimmed = line.trim();
        match self.state {
            ScanState::OutsideDependencyList => {
                if trimmed == DEPENDENCIES_START {
                    self.state = ScanState::InsideDependencyList;
                }
            }
            ScanState::InsideDependencyList => {
                if trimmed == DEPENDENCIES_END {
                    self.state = ScanState::OutsideDependencyList;
                } else if let Some(token) = first_quoted(trimmed) {
                    self.deps.push(DependencyRef::from_token(token));
                }
            }
        }
    }

    /// Consume the scanner and return the entries in source order.
    ///
    /// An unterminated list keeps whatever was collected before the block
    /// ended.
    #[must_use]
    pub fn finish(self) -> Vec<DependencyRef> {
        self.deps
    }
}

/// Return the text between the first pair of double quotes on `line`.
///
/// Yields `None` when there is no closing quote or the token is empty.
#[must_use]
pub fn first_quoted(line: &str) -> Option<&str> {
    let start = line.find('"')? + 1;
    let len = line[start..].find('"')?;
    let token = &line[start..start + len];
    (!token.is_empty()).then_some(token)
}
