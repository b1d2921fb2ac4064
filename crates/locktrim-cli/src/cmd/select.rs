//! `locktrim select`: keep exactly the named packages.

use std::path::PathBuf;

use clap::Args;
use locktrim_graph::query::select;
use serde::Serialize;

use super::{Context, WriteReport};
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct SelectArgs {
    /// Package to keep (repeatable). No closure is applied.
    #[arg(long = "keep", value_name = "NAME", required = true)]
    pub keep: Vec<String>,

    /// Output path. Defaults to `<lockfile>.selected`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct SelectReport {
    pub selected: Vec<String>,
    /// Requested names that matched no package.
    pub unknown: Vec<String>,
    pub written: WriteReport,
}

pub fn run_select(args: &SelectArgs, ctx: &Context) -> anyhow::Result<()> {
    let requested = ctx.resolve_names(&args.keep);
    let keep = select(&ctx.graph, &requested);
    let unknown = requested
        .iter()
        .filter(|name| !keep.contains(*name))
        .cloned()
        .collect();

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| ctx.default_output("selected"));
    let written = ctx.write_selection(&keep, &path)?;

    let report = SelectReport {
        selected: keep.into_iter().collect(),
        unknown,
        written,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| r.written.write_text(w),
        |r, w| {
            pretty_section(w, "Selection")?;
            pretty_kv(w, "Selected", r.selected.join(", "))?;
            if !r.unknown.is_empty() {
                pretty_kv(w, "Not in lockfile", r.unknown.join(", "))?;
            }
            r.written.write_pretty(w)
        },
    )
}
