//! `locktrim ecosystem`: keep one crate family, its explicit companions and
//! the packages pinning its versions.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use locktrim_graph::query::ecosystem;
use serde::Serialize;

use super::{Context, WriteReport, write_lines, write_wrapped};
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct EcosystemArgs {
    /// Package name prefix (repeatable), e.g. `actix`.
    #[arg(long = "prefix", value_name = "PREFIX", required = true)]
    pub prefixes: Vec<String>,

    /// Extra package to keep (repeatable).
    #[arg(long = "name", value_name = "NAME")]
    pub names: Vec<String>,

    /// Output path. Defaults to `<lockfile>.ecosystem`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct EcosystemReport {
    pub prefixes: Vec<String>,
    pub packages: Vec<String>,
    pub written: WriteReport,
}

pub fn run_ecosystem(args: &EcosystemArgs, ctx: &Context) -> anyhow::Result<()> {
    let keep = ecosystem(&ctx.graph, &args.prefixes, &args.names);

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| ctx.default_output("ecosystem"));
    let written = ctx.write_selection(&keep, &path)?;

    let report = EcosystemReport {
        prefixes: args.prefixes.clone(),
        packages: keep.into_iter().collect(),
        written,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| {
            write_lines(w, &r.packages)?;
            r.written.write_text(w)
        },
        |r, w| {
            pretty_section(w, "Ecosystem")?;
            pretty_kv(w, "Prefixes", r.prefixes.join(", "))?;
            pretty_kv(w, "Packages", r.packages.len().to_string())?;
            writeln!(w)?;
            write_wrapped(w, &r.packages, 68)?;
            writeln!(w)?;
            r.written.write_pretty(w)
        },
    )
}
