//! `locktrim critical`: packages with the most dependents.

use std::io::Write;

use clap::Args;
use locktrim_graph::query::{FanIn, critical_nodes, leaf_nodes};
use serde::Serialize;

use super::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct CriticalArgs {
    /// Report packages with more than N dependents. Defaults to
    /// `ranking.critical_threshold`.
    #[arg(long, value_name = "N")]
    pub threshold: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CriticalReport {
    pub threshold: usize,
    pub critical: Vec<FanIn>,
    pub leaf_count: usize,
    pub total: usize,
}

pub fn run_critical(args: &CriticalArgs, ctx: &Context) -> anyhow::Result<()> {
    let threshold = args.threshold.unwrap_or(ctx.config.ranking.critical_threshold);
    let report = CriticalReport {
        threshold,
        critical: critical_nodes(&ctx.graph, threshold),
        leaf_count: leaf_nodes(&ctx.graph).len(),
        total: ctx.graph.len(),
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| {
            for entry in &r.critical {
                writeln!(w, "{}\t{}", entry.fan_in, entry.name)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("Critical packages (fan-in > {})", r.threshold))?;
            for entry in &r.critical {
                writeln!(w, "  {:>4}  {}", entry.fan_in, entry.name)?;
            }
            if r.critical.is_empty() {
                writeln!(w, "  (none)")?;
            }
            writeln!(w)?;
            pretty_kv(w, "Leaf packages", r.leaf_count.to_string())?;
            pretty_kv(w, "Total", r.total.to_string())
        },
    )
}
