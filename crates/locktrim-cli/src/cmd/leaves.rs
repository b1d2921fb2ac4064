//! `locktrim leaves`: packages nothing depends on.

use clap::Args;
use locktrim_graph::query::leaf_nodes;
use serde::Serialize;

use super::{Context, write_lines, write_wrapped};
use crate::output::{pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct LeavesArgs {}

#[derive(Debug, Serialize)]
pub struct LeavesReport {
    pub count: usize,
    pub leaves: Vec<String>,
}

pub fn run_leaves(_args: &LeavesArgs, ctx: &Context) -> anyhow::Result<()> {
    let leaves: Vec<String> = leaf_nodes(&ctx.graph).into_iter().collect();
    let report = LeavesReport {
        count: leaves.len(),
        leaves,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| write_lines(w, &r.leaves),
        |r, w| {
            pretty_section(w, &format!("Leaf packages ({})", r.count))?;
            write_wrapped(w, &r.leaves, 68)
        },
    )
}
