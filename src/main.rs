use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sln_merge::config::MergeConfig;
use sln_merge::merge::{merge_solutions, RandomGuids};
use sln_merge::{tree_render, Solution};

#[derive(Parser)]
#[command(name = "slnmerge", version)]
#[command(about = "Merge Visual Studio solution files into one")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge solutions into a new solution file
    Merge {
        /// Solution files to merge, in order
        #[arg(required = true, value_name = "SOLUTION")]
        inputs: Vec<PathBuf>,

        /// Path of the merged solution; its file stem names the solution
        #[arg(short, long)]
        output: PathBuf,

        /// Print the merged solution to stdout instead of writing it
        #[arg(long)]
        dry_run: bool,

        /// Print the folder tree of the merged solution
        #[arg(long)]
        tree: bool,

        /// Relocate a project imported twice instead of dropping the copy
        #[arg(long)]
        no_dedupe: bool,

        /// Config file (default: <config dir>/sln-merge/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the folder tree of a solution
    Tree {
        #[arg(value_name = "SOLUTION")]
        solution: PathBuf,
    },
}

/// Initialize tracing with output to stderr so stdout carries only results
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "sln_merge=info,slnmerge=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Merge {
            inputs,
            output,
            dry_run,
            tree,
            no_dedupe,
            config,
        } => {
            let mut config = match config {
                Some(path) => MergeConfig::from_file(&path)?,
                None => MergeConfig::load(),
            };
            if no_dedupe {
                config.dedupe_identical = false;
            }
            if tree {
                config.print_tree = true;
            }

            run_merge(&inputs, &output, dry_run, &config)?;
        }
        Commands::Tree { solution } => {
            let solution = Solution::load(&solution)
                .with_context(|| format!("Failed to load {}", solution.display()))?;
            print!("{}", tree_render::render_tree(&solution.tree()));
        }
    }

    Ok(())
}

fn run_merge(inputs: &[PathBuf], output: &Path, dry_run: bool, config: &MergeConfig) -> Result<()> {
    let name = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("Output path {} has no file name", output.display()))?;
    let base_dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // Every input must load before anything is merged
    let sources = inputs
        .iter()
        .map(|path| {
            Solution::load(path).with_context(|| format!("Failed to load {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let outcome = merge_solutions(
        &name,
        &base_dir,
        sources,
        &mut RandomGuids,
        &config.merge_options(),
    )?;

    if !outcome.report.is_empty() {
        tracing::warn!(
            "{} duplicate GUIDs, {} nesting repairs",
            outcome.report.collisions.len(),
            outcome.report.repairs.len()
        );
        eprint!("{}", outcome.report);
    }

    if dry_run {
        print!("{}", outcome.solution);
    } else {
        outcome
            .solution
            .save(output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        tracing::info!("Wrote {}", output.display());
    }

    if config.print_tree {
        print!("{}", tree_render::render_tree(&outcome.solution.tree()));
    }

    Ok(())
}
