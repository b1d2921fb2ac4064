//! `locktrim closure`: every package reachable from the roots.

use std::io::Write;

use clap::Args;
use locktrim_graph::query::{closure, missing_roots};
use serde::Serialize;

use super::{Context, write_lines, write_wrapped};
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct ClosureArgs {
    /// Root package (repeatable). Defaults to `roots` in locktrim.toml.
    #[arg(long = "root", value_name = "NAME")]
    pub roots: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ClosureReport {
    pub roots: Vec<String>,
    /// Roots that name no package.
    pub missing_roots: Vec<String>,
    pub total: usize,
    pub closure: Vec<String>,
}

pub fn run_closure(args: &ClosureArgs, ctx: &Context) -> anyhow::Result<()> {
    let roots = ctx.resolve_names(&ctx.roots(&args.roots)?);
    let reach = closure(&ctx.graph, &roots);

    let report = ClosureReport {
        missing_roots: missing_roots(&ctx.graph, &roots),
        roots,
        total: reach.len(),
        closure: reach.into_iter().collect(),
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| write_lines(w, &r.closure),
        |r, w| {
            pretty_section(w, "Closure")?;
            pretty_kv(w, "Roots", r.roots.join(", "))?;
            if !r.missing_roots.is_empty() {
                pretty_kv(w, "Not in lockfile", r.missing_roots.join(", "))?;
            }
            pretty_kv(w, "Packages", r.total.to_string())?;
            writeln!(w)?;
            write_wrapped(w, &r.closure, 68)
        },
    )
}
