#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::{Context, GlobalOptions};
use locktrim_core::config::{CollisionPolicy, load_user_config};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "locktrim: analyze and minimize Cargo lockfiles",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Lockfile to read.
    #[arg(long, global = true, value_name = "PATH", default_value = "Cargo.lock")]
    lockfile: PathBuf,

    /// Project config file. Defaults to `locktrim.toml` when present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// How records sharing a package name are indexed:
    /// qualify, last-wins, first-wins or reject.
    #[arg(long, global = true, value_name = "POLICY")]
    collision: Option<CollisionPolicy>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        let user_default = match load_user_config() {
            Ok(config) => config.output,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable user config");
                None
            }
        };
        resolve_output_mode(self.format, self.json, user_default.as_deref())
    }

    fn global_options(&self, output: OutputMode) -> GlobalOptions {
        GlobalOptions {
            lockfile: self.lockfile.clone(),
            config: self.config.clone(),
            collision: self.collision,
            output,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Inspect",
        about = "Summarize a lockfile",
        long_about = "Report package count, skipped blocks, name collisions and category breakdown.",
        after_help = "EXAMPLES:\n    # Summarize Cargo.lock in the current directory\n    locktrim summary\n\n    # List package names per category\n    locktrim summary --names"
    )]
    Summary(cmd::summary::SummaryArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Show the dependency closure of root packages",
        after_help = "EXAMPLES:\n    locktrim closure --root my-app --root my-lib"
    )]
    Closure(cmd::closure::ClosureArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Rank packages by number of dependents",
        after_help = "EXAMPLES:\n    locktrim critical --threshold 10"
    )]
    Critical(cmd::critical::CriticalArgs),

    #[command(next_help_heading = "Inspect", about = "List packages nothing depends on")]
    Leaves(cmd::leaves::LeavesArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "List packages pinning a version of a target",
        after_help = "EXAMPLES:\n    locktrim constraints --target syn"
    )]
    Constraints(cmd::constraints::ConstraintsArgs),

    #[command(next_help_heading = "Inspect", about = "Show dependency graph statistics")]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Write",
        about = "Remove everything the roots do not need",
        long_about = "Keep the closure of the roots and drop every package whose removal leaves no retained package referring to a removed one.",
        after_help = "EXAMPLES:\n    # Write Cargo.lock.pruned\n    locktrim prune --root my-app\n\n    # Preview only\n    locktrim prune --root my-app --dry-run"
    )]
    Prune(cmd::prune::PruneArgs),

    #[command(
        next_help_heading = "Write",
        about = "Extract the heavily shared core reachable from seeds",
        after_help = "EXAMPLES:\n    locktrim extract --seed my-app --floor 3 --include-with-deps tokio"
    )]
    Extract(cmd::extract::ExtractArgs),

    #[command(
        next_help_heading = "Write",
        about = "Keep exactly the named packages",
        after_help = "EXAMPLES:\n    locktrim select --keep serde --keep serde_derive"
    )]
    Select(cmd::select::SelectArgs),

    #[command(
        next_help_heading = "Write",
        about = "Remove packages by name or category",
        after_help = "EXAMPLES:\n    locktrim remove --category database --cascade\n    locktrim remove --name criterion --root my-app"
    )]
    Remove(cmd::remove::RemoveArgs),

    #[command(
        next_help_heading = "Write",
        about = "Write one lockfile per configured removal variant",
        after_help = "EXAMPLES:\n    locktrim variants --output-dir variants/"
    )]
    Variants(cmd::variants::VariantsArgs),

    #[command(
        next_help_heading = "Write",
        about = "Keep one crate family and the packages pinning it",
        after_help = "EXAMPLES:\n    locktrim ecosystem --prefix actix --name tokio"
    )]
    Ecosystem(cmd::ecosystem::EcosystemArgs),

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    locktrim completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("LOCKTRIM_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "locktrim=debug,info"
        } else {
            "locktrim=info,warn"
        })
    });

    let format = env::var("LOCKTRIM_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: Cli, output: OutputMode) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let ctx = Context::load(&cli.global_options(output), &project_root)?;

    match &cli.command {
        Commands::Summary(args) => cmd::summary::run_summary(args, &ctx),
        Commands::Closure(args) => cmd::closure::run_closure(args, &ctx),
        Commands::Critical(args) => cmd::critical::run_critical(args, &ctx),
        Commands::Leaves(args) => cmd::leaves::run_leaves(args, &ctx),
        Commands::Constraints(args) => cmd::constraints::run_constraints(args, &ctx),
        Commands::Stats(args) => cmd::stats::run_stats(args, &ctx),
        Commands::Prune(args) => cmd::prune::run_prune(args, &ctx),
        Commands::Extract(args) => cmd::extract::run_extract(args, &ctx),
        Commands::Select(args) => cmd::select::run_select(args, &ctx),
        Commands::Remove(args) => cmd::remove::run_remove(args, &ctx),
        Commands::Variants(args) => cmd::variants::run_variants(args, &ctx),
        Commands::Ecosystem(args) => cmd::ecosystem::run_ecosystem(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.verbose {
        info!("verbose mode enabled");
    }

    let output = cli.output_mode();
    debug!(?output, "output mode resolved");

    match run(cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let cli_error = CliError::from_anyhow(&err);
            if render_error(output, &cli_error).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["locktrim", "stats", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Stats(_)));
    }

    #[test]
    fn format_flag_parses_value_enum() {
        let cli = Cli::parse_from(["locktrim", "--format", "text", "leaves"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn lockfile_defaults_to_cargo_lock() {
        let cli = Cli::parse_from(["locktrim", "summary"]);
        assert_eq!(cli.lockfile, PathBuf::from("Cargo.lock"));
        assert!(cli.collision.is_none());
    }

    #[test]
    fn collision_policy_parses() {
        let cli = Cli::parse_from(["locktrim", "--collision", "last-wins", "summary"]);
        assert_eq!(cli.collision, Some(CollisionPolicy::LastWins));
        assert!(Cli::try_parse_from(["locktrim", "--collision", "newest", "summary"]).is_err());
    }

    #[test]
    fn prune_collects_repeated_roots() {
        let cli = Cli::parse_from(["locktrim", "prune", "--root", "a", "--root", "b", "-o", "out.lock"]);
        let Commands::Prune(args) = cli.command else {
            panic!("expected prune");
        };
        assert_eq!(args.roots, ["a", "b"]);
        assert_eq!(args.output, Some(PathBuf::from("out.lock")));
    }

    #[test]
    fn select_requires_keep() {
        assert!(Cli::try_parse_from(["locktrim", "select"]).is_err());
    }

    #[test]
    fn extract_flags_parse() {
        let cli = Cli::parse_from([
            "locktrim",
            "extract",
            "--seed",
            "app",
            "--floor",
            "3",
            "--include-with-deps",
            "tokio",
        ]);
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.floor, Some(3));
        assert_eq!(args.include_with_deps, ["tokio"]);
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["locktrim", "summary"],
            vec!["locktrim", "closure", "--root", "a"],
            vec!["locktrim", "critical"],
            vec!["locktrim", "leaves"],
            vec!["locktrim", "constraints", "--target", "syn"],
            vec!["locktrim", "stats"],
            vec!["locktrim", "prune"],
            vec!["locktrim", "extract"],
            vec!["locktrim", "select", "--keep", "a"],
            vec!["locktrim", "remove", "--name", "a", "--cascade"],
            vec!["locktrim", "variants", "--output-dir", "out"],
            vec!["locktrim", "ecosystem", "--prefix", "actix"],
            vec!["locktrim", "completions", "bash"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "failed to parse {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
