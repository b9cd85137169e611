use anyhow::Context;
use bridge_core::{run_transformer, PipelineConfig};
use bridge_synth::{run_chaos, run_feed, DEFAULT_ERROR_RATE};
use chrono::Utc;
use clap::{Parser, Subcommand};
use quality_gate::{run_gate, GateConfig, GateSummary};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bridge")]
#[command(about = "Legacy message to FHIR bridge with a validation gate")]
struct Cli {
    /// Pipeline data root (overrides BRIDGE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Report directory (overrides BRIDGE_REPORT_DIR)
    #[arg(long, global = true)]
    report_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write synthetic messages into the inbound directory
    Generate {
        /// Number of messages (overrides BATCH_SIZE)
        #[arg(long)]
        count: Option<usize>,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Transform inbound messages into bundle artifacts
    Transform,
    /// Randomly corrupt bundle artifacts
    Corrupt {
        /// Directory to corrupt (overrides CHAOS_TARGET_DIR)
        #[arg(long)]
        target: Option<PathBuf>,
        /// Probability of corrupting each eligible entry
        #[arg(long, default_value_t = DEFAULT_ERROR_RATE)]
        rate: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate bundle artifacts and update the audit trail
    Validate,
    /// Generate, transform, optionally corrupt, then validate
    Run {
        #[arg(long)]
        count: Option<usize>,
        /// Corrupt bundles before validation
        #[arg(long)]
        chaos: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bridge=info".parse()?)
                .add_directive("bridge_core=info".parse()?)
                .add_directive("quality_gate=info".parse()?)
                .add_directive("bridge_synth=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Generate { count, seed } => {
            let config = with_count(config, count)?;
            let written = generate(&config, seed)?;
            println!("Generated {} messages", written);
        }
        Commands::Transform => {
            let summary = run_transformer(&config)?;
            println!(
                "Transformed {} messages, skipped {}",
                summary.transformed.len(),
                summary.skipped.len()
            );
            for skipped in &summary.skipped {
                println!("  skipped {}: {}", skipped.source, skipped.reason);
            }
        }
        Commands::Corrupt { target, rate, seed } => {
            let target = target.unwrap_or_else(|| config.chaos_target_dir());
            let summary = run_chaos(&target, &mut rng(seed), rate, Utc::now())?;
            println!(
                "Infected {} out of {} files",
                summary.infected.len(),
                summary.scanned
            );
        }
        Commands::Validate => {
            let summary = run_gate(&gate_config(&config))?;
            print_gate_summary(&summary);
        }
        Commands::Run { count, chaos, seed } => {
            let config = with_count(config, count)?;
            let mut rng = rng(seed);
            run_feed(
                &config.inbound_dir(),
                config.batch_size(),
                &mut rng,
                Utc::now().naive_utc(),
            )?;
            run_transformer(&config)?;
            if chaos {
                run_chaos(
                    &config.chaos_target_dir(),
                    &mut rng,
                    DEFAULT_ERROR_RATE,
                    Utc::now(),
                )?;
            }
            let summary = run_gate(&gate_config(&config))?;
            print_gate_summary(&summary);
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let data_dir = cli
        .data_dir
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .or_else(|| std::env::var("BRIDGE_DATA_DIR").ok());
    let report_dir = cli
        .report_dir
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .or_else(|| std::env::var("BRIDGE_REPORT_DIR").ok());

    PipelineConfig::from_env_values(
        data_dir,
        report_dir,
        std::env::var("BATCH_SIZE").ok(),
        std::env::var("CHAOS_TARGET_DIR").ok(),
    )
    .context("invalid pipeline configuration")
}

fn with_count(config: PipelineConfig, count: Option<usize>) -> anyhow::Result<PipelineConfig> {
    match count {
        Some(count) => Ok(config.with_batch_size(count)?),
        None => Ok(config),
    }
}

fn generate(config: &PipelineConfig, seed: Option<u64>) -> anyhow::Result<usize> {
    let written = run_feed(
        &config.inbound_dir(),
        config.batch_size(),
        &mut rng(seed),
        Utc::now().naive_utc(),
    )?;
    Ok(written.len())
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn gate_config(config: &PipelineConfig) -> GateConfig {
    GateConfig {
        bundle_dir: config.bundle_dir(),
        accepted_dir: config.accepted_dir(),
        rejected_dir: config.rejected_dir(),
        history_path: config.history_path(),
        report_dir: config.report_dir().to_path_buf(),
    }
}

fn print_gate_summary(summary: &GateSummary) {
    println!("Total scanned: {}", summary.scanned());
    if summary.scanned() == 0 {
        println!("No files found to scan.");
        return;
    }
    println!("Accepted:      {}", summary.accepted.len());
    println!("Rejected:      {}", summary.rejections.len());
    println!(
        "Data hygiene:  {}%",
        quality_gate::report::quality_score(summary.accepted.len(), summary.rejections.len())
    );
    if let Some(path) = &summary.report_path {
        println!("Report:        {}", path.display());
    }
}
