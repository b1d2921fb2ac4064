//! `locktrim variants`: write one lockfile per configured removal variant.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use locktrim_graph::query::{closure, remove_with_orphans};
use serde::Serialize;
use tracing::info;

use super::{Context, WriteReport};
use crate::output::{pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct VariantsArgs {
    /// Directory for the variant lockfiles. Defaults to the lockfile's
    /// directory.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only write these variants (repeatable).
    #[arg(long = "only", value_name = "LABEL")]
    pub only: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct VariantResult {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub removed: usize,
    pub written: WriteReport,
}

#[derive(Debug, Serialize)]
pub struct VariantsReport {
    pub variants: Vec<VariantResult>,
}

pub fn run_variants(args: &VariantsArgs, ctx: &Context) -> anyhow::Result<()> {
    let variants: Vec<_> = ctx
        .config
        .effective_variants()
        .into_iter()
        .filter(|v| args.only.is_empty() || args.only.contains(&v.label))
        .collect();
    if variants.is_empty() {
        anyhow::bail!("no variants selected");
    }

    let protect = closure(&ctx.graph, ctx.resolve_names(&ctx.config.roots));
    let stem = ctx
        .lockfile_path
        .file_name()
        .map_or_else(|| "Cargo.lock".to_string(), |n| n.to_string_lossy().into_owned());
    let dir = args.output_dir.clone().unwrap_or_else(|| {
        ctx.lockfile_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default()
    });

    // Compute every selection before writing anything.
    let mut plans = Vec::with_capacity(variants.len());
    for variant in variants {
        let mut requested: BTreeSet<String> =
            ctx.resolve_names(&variant.names).into_iter().collect();
        requested.extend(ctx.category_keys(&variant.categories)?);
        let removed = remove_with_orphans(&ctx.graph, &requested, &protect, variant.cascade);
        let keep: BTreeSet<String> = ctx
            .graph
            .keys()
            .filter(|k| !removed.contains(*k))
            .map(str::to_string)
            .collect();
        plans.push((variant, removed.len(), keep));
    }

    let mut results = Vec::with_capacity(plans.len());
    for (variant, removed, keep) in plans {
        let path = dir.join(format!("{stem}.{}", variant.label));
        let written = ctx.write_selection(&keep, &path)?;
        info!(variant = %variant.label, removed, "variant written");
        results.push(VariantResult {
            label: variant.label,
            description: variant.description,
            removed,
            written,
        });
    }

    let report = VariantsReport { variants: results };
    render_mode(
        ctx.output,
        &report,
        |r, w| {
            for v in &r.variants {
                writeln!(w, "{}\t{}\t{}", v.label, v.written.packages_kept, v.written.output)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, "Variants")?;
            for v in &r.variants {
                writeln!(
                    w,
                    "  {:<20} {:>5} kept {:>5} removed  {}",
                    v.label, v.written.packages_kept, v.removed, v.written.output
                )?;
                if let Some(description) = &v.description {
                    writeln!(w, "  {:<20} {description}", "")?;
                }
            }
            Ok(())
        },
    )
}
