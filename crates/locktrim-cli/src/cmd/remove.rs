//! `locktrim remove`: drop named packages or whole categories, optionally
//! cascading to dependencies nothing else needs.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use locktrim_graph::query::{closure, remove_with_orphans};
use serde::Serialize;

use super::{Context, WriteReport, write_lines, write_wrapped};
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct RemoveArgs {
    /// Package to remove (repeatable).
    #[arg(long = "name", value_name = "NAME")]
    pub names: Vec<String>,

    /// Remove every package in this category (repeatable).
    #[arg(long = "category", value_name = "LABEL")]
    pub categories: Vec<String>,

    /// Also remove dependencies whose every dependent was removed.
    #[arg(long)]
    pub cascade: bool,

    /// Protect the closure of this package (repeatable). Defaults to
    /// `roots` in locktrim.toml.
    #[arg(long = "root", value_name = "NAME")]
    pub roots: Vec<String>,

    /// Output path. Defaults to `<lockfile>.removed`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RemoveReport {
    pub requested: usize,
    pub protected: usize,
    pub removed: Vec<String>,
    pub written: WriteReport,
}

pub fn run_remove(args: &RemoveArgs, ctx: &Context) -> anyhow::Result<()> {
    if args.names.is_empty() && args.categories.is_empty() {
        anyhow::bail!("nothing to remove: pass --name or --category");
    }

    let mut requested: BTreeSet<String> = ctx.resolve_names(&args.names).into_iter().collect();
    requested.extend(ctx.category_keys(&args.categories)?);

    let roots = if args.roots.is_empty() {
        ctx.config.roots.clone()
    } else {
        args.roots.clone()
    };
    let protect = closure(&ctx.graph, ctx.resolve_names(&roots));

    let removed = remove_with_orphans(&ctx.graph, &requested, &protect, args.cascade);
    let keep: BTreeSet<String> = ctx
        .graph
        .keys()
        .filter(|k| !removed.contains(*k))
        .map(str::to_string)
        .collect();

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| ctx.default_output("removed"));
    let written = ctx.write_selection(&keep, &path)?;

    let report = RemoveReport {
        requested: requested.len(),
        protected: protect.len(),
        removed: removed.into_iter().collect(),
        written,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| {
            write_lines(w, &r.removed)?;
            r.written.write_text(w)
        },
        |r, w| {
            pretty_section(w, "Remove")?;
            pretty_kv(w, "Requested", r.requested.to_string())?;
            pretty_kv(w, "Protected", r.protected.to_string())?;
            pretty_kv(w, "Removed", r.removed.len().to_string())?;
            writeln!(w)?;
            write_wrapped(w, &r.removed, 68)?;
            writeln!(w)?;
            r.written.write_pretty(w)
        },
    )
}
