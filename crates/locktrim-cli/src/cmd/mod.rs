//! Command handlers. Each subcommand module exposes an `Args` struct and a
//! `run_*` function taking the loaded [`Context`].

pub mod closure;
pub mod completions;
pub mod constraints;
pub mod critical;
pub mod ecosystem;
pub mod extract;
pub mod leaves;
pub mod prune;
pub mod remove;
pub mod select;
pub mod stats;
pub mod summary;
pub mod variants;

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use locktrim_core::config::{CollisionPolicy, ProjectConfig, load_project_config};
use locktrim_core::lockfile::{Lockfile, read_lockfile, write_atomic};
use locktrim_core::{CategoryRules, ErrorCode};
use locktrim_graph::graph::{DependencyGraph, GraphError, render_lockfile};
use serde::Serialize;
use tracing::info;

use crate::output::{CodedError, OutputMode, pretty_kv};

/// Global options shared by every lockfile command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub lockfile: PathBuf,
    pub config: Option<PathBuf>,
    pub collision: Option<CollisionPolicy>,
    pub output: OutputMode,
}

/// Everything a command needs: the parsed lockfile, its graph and config.
pub struct Context {
    pub lockfile_path: PathBuf,
    pub lock: Lockfile,
    pub graph: DependencyGraph,
    pub config: ProjectConfig,
    pub rules: CategoryRules,
    pub output: OutputMode,
}

impl Context {
    /// Load config, read the lockfile and build the graph.
    ///
    /// # Errors
    ///
    /// Fails with a coded error when the config or lockfile cannot be read,
    /// a category pattern is invalid, or the `reject` policy meets a
    /// duplicate name.
    pub fn load(opts: &GlobalOptions, project_root: &Path) -> anyhow::Result<Self> {
        let config = load_project_config(opts.config.as_deref(), project_root)
            .map_err(|err| CodedError::new(ErrorCode::ConfigParseError, err.to_string()))?;
        let rules = config
            .category_rules()
            .map_err(|err| CodedError::new(ErrorCode::InvalidCategoryPattern, err.to_string()))?;

        let lockfile_path = if opts.lockfile.is_absolute() {
            opts.lockfile.clone()
        } else {
            project_root.join(&opts.lockfile)
        };
        let lock = read_lockfile(&lockfile_path)
            .map_err(|err| CodedError::new(ErrorCode::LockfileUnreadable, err.to_string()))?;

        let policy = opts.collision.unwrap_or(config.collision);
        let graph = DependencyGraph::from_lockfile(&lock, policy).map_err(|err| match err {
            GraphError::NameCollision { .. } => {
                CodedError::new(ErrorCode::NameCollision, err.to_string())
            }
        })?;

        info!(
            path = %lockfile_path.display(),
            packages = graph.len(),
            collisions = graph.collisions().len(),
            anomalies = lock.anomalies.len(),
            "lockfile loaded"
        );

        Ok(Self {
            lockfile_path,
            lock,
            graph,
            config,
            rules,
            output: opts.output,
        })
    }

    /// Roots from the command line, falling back to the config file.
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorCode::NoRoots`] error when both are empty.
    pub fn roots(&self, flag_roots: &[String]) -> anyhow::Result<Vec<String>> {
        let roots = if flag_roots.is_empty() {
            self.config.roots.clone()
        } else {
            flag_roots.to_vec()
        };
        if roots.is_empty() {
            return Err(CodedError::new(ErrorCode::NoRoots, "no root packages given").into());
        }
        Ok(roots)
    }

    /// Expand bare names to every graph key indexed under them; keys that
    /// already name a node pass through unchanged. Unknown names are kept.
    pub fn resolve_names(&self, names: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            if self.graph.contains(name) {
                out.push(name.clone());
                continue;
            }
            let keys: Vec<String> = self.graph.keys_named(name).map(str::to_string).collect();
            if keys.is_empty() {
                out.push(name.clone());
            } else {
                out.extend(keys);
            }
        }
        out
    }

    /// Graph keys whose package name falls under one of `labels`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::UnknownCategory`] for a label no rule defines.
    pub fn category_keys(&self, labels: &[String]) -> anyhow::Result<BTreeSet<String>> {
        if let Some(unknown) = labels.iter().find(|l| !self.rules.has_label(l)) {
            return Err(CodedError::new(
                ErrorCode::UnknownCategory,
                format!("unknown category `{unknown}`"),
            )
            .into());
        }
        let members: BTreeSet<String> = self
            .rules
            .members_of(labels, self.graph.nodes().map(|node| node.name.as_str()))
            .into_iter()
            .collect();
        Ok(self
            .graph
            .nodes()
            .filter(|node| members.contains(&node.name))
            .map(|node| node.key.clone())
            .collect())
    }

    /// `<lockfile>.<suffix>` next to the input.
    pub fn default_output(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .lockfile_path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| "Cargo.lock".into());
        name.push(".");
        name.push(suffix);
        self.lockfile_path.with_file_name(name)
    }

    /// Render `keep` as a lockfile and write it atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::OutputWriteFailed`] if the write fails.
    pub fn write_selection(&self, keep: &BTreeSet<String>, path: &Path) -> anyhow::Result<WriteReport> {
        let text = render_lockfile(&self.lock, &self.graph, keep);
        write_atomic(path, &text)
            .map_err(|err| CodedError::new(ErrorCode::OutputWriteFailed, err.to_string()))
            .with_context(|| format!("writing {}", path.display()))?;

        let kept = keep.iter().filter(|k| self.graph.contains(k)).count();
        info!(path = %path.display(), kept, "lockfile written");
        Ok(WriteReport {
            output: path.display().to_string(),
            packages_before: self.graph.len(),
            packages_kept: kept,
            packages_removed: self.graph.len() - kept,
        })
    }
}

/// Summary of a written lockfile.
#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    pub output: String,
    pub packages_before: usize,
    pub packages_kept: usize,
    pub packages_removed: usize,
}

impl WriteReport {
    pub fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "wrote {} ({} of {} packages kept, {} removed)",
            self.output, self.packages_kept, self.packages_before, self.packages_removed
        )
    }

    pub fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_kv(w, "Output", &self.output)?;
        pretty_kv(w, "Packages", format!("{} → {}", self.packages_before, self.packages_kept))?;
        pretty_kv(w, "Removed", self.packages_removed.to_string())
    }
}

/// One name per line.
pub fn write_lines<'a>(w: &mut dyn Write, items: impl IntoIterator<Item = &'a String>) -> io::Result<()> {
    for item in items {
        writeln!(w, "{item}")?;
    }
    Ok(())
}

/// Names wrapped into indented columns of at most `width` characters.
pub fn write_wrapped<'a>(
    w: &mut dyn Write,
    items: impl IntoIterator<Item = &'a String>,
    width: usize,
) -> io::Result<()> {
    let mut line = String::new();
    for item in items {
        if !line.is_empty() && line.len() + item.len() + 2 > width {
            writeln!(w, "  {line}")?;
            line.clear();
        }
        if !line.is_empty() {
            line.push_str(", ");
        }
        line.push_str(item);
    }
    if !line.is_empty() {
        writeln!(w, "  {line}")?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use super::{Context, GlobalOptions};
    use crate::output::OutputMode;

    pub const LOCK: &str = "\
version = 4

[[package]]
name = \"app\"
version = \"0.1.0\"
dependencies = [
 \"serde\",
 \"tokio\",
]

[[package]]
name = \"criterion\"
version = \"0.5.1\"
dependencies = [
 \"serde\",
]

[[package]]
name = \"serde\"
version = \"1.0.0\"

[[package]]
name = \"tokio\"
version = \"1.0.0\"
";

    pub fn context(dir: &Path) -> Context {
        std::fs::write(dir.join("Cargo.lock"), LOCK).expect("write lockfile");
        let opts = GlobalOptions {
            lockfile: "Cargo.lock".into(),
            config: None,
            collision: None,
            output: OutputMode::Json,
        };
        Context::load(&opts, dir).expect("load context")
    }
}
