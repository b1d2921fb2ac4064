//! `locktrim prune`: drop everything outside the closure of the roots that
//! can go without breaking referential closure, and write the result.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use locktrim_graph::query::prune;
use serde::Serialize;

use super::{Context, WriteReport, write_lines, write_wrapped};
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct PruneArgs {
    /// Root package (repeatable). Defaults to `roots` in locktrim.toml.
    #[arg(long = "root", value_name = "NAME")]
    pub roots: Vec<String>,

    /// Output path. Defaults to `<lockfile>.pruned`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Report what would be removed without writing a file.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct PruneReport {
    pub roots: Vec<String>,
    pub required: usize,
    pub removed: Vec<String>,
    pub retained: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written: Option<WriteReport>,
}

pub fn run_prune(args: &PruneArgs, ctx: &Context) -> anyhow::Result<()> {
    let roots = ctx.resolve_names(&ctx.roots(&args.roots)?);
    let outcome = prune(&ctx.graph, &roots);

    let written = if args.dry_run {
        None
    } else {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| ctx.default_output("pruned"));
        Some(ctx.write_selection(&outcome.retained, &path)?)
    };

    let report = PruneReport {
        roots,
        required: outcome.required.len(),
        retained: outcome.retained.len(),
        removed: outcome.removed.into_iter().collect(),
        written,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| {
            write_lines(w, &r.removed)?;
            if let Some(written) = &r.written {
                written.write_text(w)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, "Prune")?;
            pretty_kv(w, "Roots", r.roots.join(", "))?;
            pretty_kv(w, "Required", r.required.to_string())?;
            pretty_kv(w, "Retained", r.retained.to_string())?;
            pretty_kv(w, "Removable", r.removed.len().to_string())?;
            if !r.removed.is_empty() {
                writeln!(w)?;
                write_wrapped(w, &r.removed, 68)?;
            }
            if let Some(written) = &r.written {
                writeln!(w)?;
                written.write_pretty(w)?;
            }
            Ok(())
        },
    )
}
