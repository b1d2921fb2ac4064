//! `locktrim constraints`: packages pinning a specific version of a target.

use std::io::Write;

use clap::Args;
use locktrim_graph::query::{ConstraintHit, version_constraints};
use serde::Serialize;

use super::Context;
use crate::output::{pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct ConstraintsArgs {
    /// Package name whose version pins are listed.
    #[arg(long, value_name = "NAME")]
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct ConstraintsReport {
    pub target: String,
    /// Versions of the target present in the lockfile.
    pub versions: Vec<String>,
    pub constraints: Vec<ConstraintHit>,
}

pub fn run_constraints(args: &ConstraintsArgs, ctx: &Context) -> anyhow::Result<()> {
    let versions = ctx
        .graph
        .nodes()
        .filter(|n| n.name == args.target)
        .map(|n| n.version.clone())
        .collect();
    let report = ConstraintsReport {
        target: args.target.clone(),
        versions,
        constraints: version_constraints(&ctx.graph, &args.target),
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| {
            for hit in &r.constraints {
                writeln!(w, "{}\t{}", hit.dependent, hit.entry)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("Version pins on {}", r.target))?;
            if !r.versions.is_empty() {
                writeln!(w, "  present: {}", r.versions.join(", "))?;
            }
            if r.constraints.is_empty() {
                writeln!(w, "  (no pinned references)")?;
            }
            for hit in &r.constraints {
                writeln!(w, "  {:<32} → {}", hit.dependent, hit.entry)?;
            }
            Ok(())
        },
    )
}
