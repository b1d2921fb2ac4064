//! `locktrim stats`: structural statistics of the dependency graph.

use std::io::Write;

use clap::Args;
use locktrim_graph::graph::GraphStats;

use super::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

pub fn run_stats(_args: &StatsArgs, ctx: &Context) -> anyhow::Result<()> {
    let stats = GraphStats::compute(&ctx.graph);
    render_mode(ctx.output, &stats, write_text, write_pretty)
}

fn write_text(s: &GraphStats, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "nodes {}", s.node_count)?;
    writeln!(w, "edges {}", s.edge_count)?;
    writeln!(w, "dangling {}", s.dangling_count)?;
    writeln!(w, "density {:.6}", s.density)?;
    writeln!(w, "sccs {}", s.scc_count)?;
    writeln!(w, "cycles {}", s.cycle_count)?;
    writeln!(w, "components {}", s.weakly_connected_component_count)?;
    writeln!(w, "isolated {}", s.isolated_node_count)?;
    writeln!(w, "max_fan_in {}", s.max_fan_in)?;
    writeln!(w, "max_fan_out {}", s.max_fan_out)
}

fn write_pretty(s: &GraphStats, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Dependency graph")?;
    pretty_kv(w, "Packages", s.node_count.to_string())?;
    pretty_kv(w, "Edges", s.edge_count.to_string())?;
    pretty_kv(w, "Dangling refs", s.dangling_count.to_string())?;
    pretty_kv(w, "Density", format!("{:.4}", s.density))?;
    pretty_kv(w, "Components", s.weakly_connected_component_count.to_string())?;
    pretty_kv(w, "Isolated", s.isolated_node_count.to_string())?;
    pretty_kv(w, "Max fan-in", s.max_fan_in.to_string())?;
    pretty_kv(w, "Max fan-out", s.max_fan_out.to_string())?;
    pretty_kv(w, "Cycles", s.cycle_count.to_string())?;
    for cycle in &s.cycles {
        writeln!(w, "  {}", cycle.join(" ↔ "))?;
    }
    Ok(())
}
