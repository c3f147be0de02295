//! review-eval CLI - evaluation harness for generated code review comments
//!
//! This binary runs the generation and comparison phases and summarizes
//! result files.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use review_eval::{build_collaborators, load_dataset, select_requests, Config};
use review_eval_core::SkipReason;
use review_eval_pipeline::aggregator::{read_results, write_results};
use review_eval_pipeline::metrics::{compute_metrics, print_report};
use review_eval_pipeline::selector::latest_results_file;
use review_eval_pipeline::{EvaluationAccumulator, EvaluationPipeline, GenerationReport};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "review-eval")]
#[command(about = "Compare review comment filtering strategies against labeled ground truth")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate candidate comments and write the checkpoint
    Generate,
    /// Evaluate every filtering variant over the checkpoint
    Compare,
    /// Generate, then compare
    Run,
    /// Print metrics for a results file (defaults to the latest one)
    Summary {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.validate()?;

    match cli.command {
        Commands::Generate => generate(&config).await,
        Commands::Compare => compare(&config).await,
        Commands::Run => {
            generate(&config).await?;
            compare(&config).await
        }
        Commands::Summary { file } => summary(&config, file.as_deref()),
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    // Targets match by prefix, so this covers every review_eval_* crate
    tracing_subscriber::fmt()
        .with_env_filter(format!("review_eval={level}"))
        .init();

    Ok(())
}

fn build_pipeline(config: &Config) -> Result<EvaluationPipeline> {
    let dataset = load_dataset(config)?;
    let collaborators = build_collaborators(config, dataset)?;
    Ok(EvaluationPipeline::from_config(config, collaborators)?)
}

async fn generate(config: &Config) -> Result<()> {
    let dataset = load_dataset(config)?;
    let requests = select_requests(config, &dataset)?;
    if requests.is_empty() {
        anyhow::bail!("No review requests selected");
    }

    let collaborators = build_collaborators(config, dataset)?;
    let pipeline = EvaluationPipeline::from_config(config, collaborators)?;
    let report = pipeline
        .generate_checkpoints(&requests)
        .await
        .context("Candidate generation failed")?;

    print_generation_report(&report, pipeline.checkpoint().path());
    Ok(())
}

async fn compare(config: &Config) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    info!("Comparing variants: {}", pipeline.variant_names().join(", "));

    let accumulator = pipeline
        .compare_variants(EvaluationAccumulator::new())
        .await
        .context("Variant comparison failed")?;

    let path = write_results(&accumulator, &config.output.dir)
        .context("Failed to write evaluation results")?;
    println!("Results written to {}", path.display());
    println!();
    print_report(&compute_metrics(accumulator.rows()));
    Ok(())
}

fn summary(config: &Config, file: Option<&Path>) -> Result<()> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => latest_results_file(&config.output.dir)?,
    };
    let rows = read_results(&path)
        .with_context(|| format!("Failed to read results from {}", path.display()))?;
    if rows.is_empty() {
        warn!("{} contains no evaluation rows", path.display());
    }

    println!("Results: {}", path.display());
    println!();
    print_report(&compute_metrics(&rows));
    Ok(())
}

fn print_generation_report(report: &GenerationReport, checkpoint: &Path) {
    println!(
        "Checkpointed {} review requests to {}",
        report.records,
        checkpoint.display()
    );
    if report.skipped.is_empty() {
        return;
    }

    println!("Skipped {} review requests:", report.skipped.len());
    for reason in [
        SkipReason::FileNotInPatch,
        SkipReason::LargeDiff,
        SkipReason::ParseFailure,
        SkipReason::NoSuggestions,
    ] {
        let count = report.skipped_for(reason);
        if count > 0 {
            println!("  {reason}: {count}");
        }
    }
}
