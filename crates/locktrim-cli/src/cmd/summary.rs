//! `locktrim summary`: package count, anomalies, collisions and category
//! breakdown.

use std::io::{self, Write};

use clap::Args;
use locktrim_core::Bucket;
use locktrim_core::lockfile::ParseAnomaly;
use locktrim_graph::graph::Collision;
use serde::Serialize;

use super::{Context, write_wrapped};
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct SummaryArgs {
    /// List every package under its category instead of counts only.
    #[arg(long)]
    pub names: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub lockfile: String,
    pub blocks: usize,
    pub packages: usize,
    pub dangling: Vec<String>,
    pub anomalies: Vec<ParseAnomaly>,
    pub collisions: Vec<Collision>,
    pub categories: Vec<CategoryCount>,
}

pub fn run_summary(args: &SummaryArgs, ctx: &Context) -> anyhow::Result<()> {
    let buckets: Vec<Bucket> = ctx.rules.bucket(ctx.graph.nodes().map(|n| n.name.as_str()));
    let categories = buckets
        .into_iter()
        .filter(|b| !b.is_empty())
        .map(|b| CategoryCount {
            label: b.label.clone(),
            count: b.len(),
            names: args.names.then_some(b.names),
        })
        .collect();

    let summary = Summary {
        lockfile: ctx.lockfile_path.display().to_string(),
        blocks: ctx.lock.len(),
        packages: ctx.graph.len(),
        dangling: ctx.graph.dangling().iter().cloned().collect(),
        anomalies: ctx.lock.anomalies.clone(),
        collisions: ctx.graph.collisions().to_vec(),
        categories,
    };

    render_mode(ctx.output, &summary, write_text, write_pretty)
}

fn write_text(s: &Summary, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "packages {}", s.packages)?;
    writeln!(w, "blocks {}", s.blocks)?;
    writeln!(w, "anomalies {}", s.anomalies.len())?;
    writeln!(w, "collisions {}", s.collisions.len())?;
    writeln!(w, "dangling {}", s.dangling.len())?;
    for c in &s.categories {
        match &c.names {
            Some(names) => writeln!(w, "category {} {} {}", c.label, c.count, names.join(","))?,
            None => writeln!(w, "category {} {}", c.label, c.count)?,
        }
    }
    Ok(())
}

fn write_pretty(s: &Summary, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Lockfile")?;
    pretty_kv(w, "Path", &s.lockfile)?;
    pretty_kv(w, "Packages", s.packages.to_string())?;
    pretty_kv(w, "Blocks", s.blocks.to_string())?;
    pretty_kv(w, "Dangling refs", s.dangling.len().to_string())?;

    if !s.anomalies.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Skipped blocks")?;
        for a in &s.anomalies {
            writeln!(w, "  block {} (line {}): {:?}", a.block_index, a.line, a.kind)?;
        }
    }

    if !s.collisions.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Name collisions")?;
        for c in &s.collisions {
            writeln!(w, "  {:<24} {} [{}]", c.name, c.versions.join(", "), c.resolution)?;
        }
    }

    writeln!(w)?;
    pretty_section(w, "Categories")?;
    for c in &s.categories {
        writeln!(w, "  {:<20} {:>5}", c.label, c.count)?;
        if let Some(names) = &c.names {
            write_wrapped(w, names, 68)?;
        }
    }
    Ok(())
}
