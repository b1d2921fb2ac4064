//! `locktrim extract`: grow a lockfile from seed packages along
//! heavily shared dependencies.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use locktrim_graph::query::{expand_critical_path, force_include};
use serde::Serialize;

use super::{Context, WriteReport, write_wrapped};
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct ExtractArgs {
    /// Seed package (repeatable). Defaults to `roots` in locktrim.toml.
    #[arg(long = "seed", value_name = "NAME")]
    pub seeds: Vec<String>,

    /// Follow dependencies with more than N dependents. Defaults to
    /// `ranking.expand_floor`.
    #[arg(long, value_name = "N")]
    pub floor: Option<usize>,

    /// Always include this package and its direct dependencies (repeatable).
    #[arg(long = "include-with-deps", value_name = "NAME")]
    pub include_with_deps: Vec<String>,

    /// Output path. Defaults to `<lockfile>.critical`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ExtractReport {
    pub seeds: Vec<String>,
    pub floor: usize,
    pub extracted: Vec<String>,
    pub written: WriteReport,
}

pub fn run_extract(args: &ExtractArgs, ctx: &Context) -> anyhow::Result<()> {
    let seeds = ctx.resolve_names(&ctx.roots(&args.seeds)?);
    let floor = args.floor.unwrap_or(ctx.config.ranking.expand_floor);

    let mut keep: BTreeSet<String> = expand_critical_path(&ctx.graph, &seeds, floor);
    keep.extend(force_include(&ctx.graph, &ctx.resolve_names(&args.include_with_deps)));

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| ctx.default_output("critical"));
    let written = ctx.write_selection(&keep, &path)?;

    let report = ExtractReport {
        seeds,
        floor,
        extracted: keep.into_iter().collect(),
        written,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| r.written.write_text(w),
        |r, w| {
            pretty_section(w, "Critical path extraction")?;
            pretty_kv(w, "Seeds", r.seeds.join(", "))?;
            pretty_kv(w, "Fan-in floor", r.floor.to_string())?;
            pretty_kv(w, "Extracted", r.extracted.len().to_string())?;
            writeln!(w)?;
            write_wrapped(w, &r.extracted, 68)?;
            writeln!(w)?;
            r.written.write_pretty(w)
        },
    )
}
