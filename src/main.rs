use bridge_core::{run_transformer, PipelineConfig};
use bridge_synth::{run_chaos, run_feed, DEFAULT_ERROR_RATE};
use chrono::Utc;
use quality_gate::{run_gate, GateConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for a full simulation run
///
/// Runs the pipeline stages in order, each communicating only through files:
/// 1. synthetic feed writes messages into the inbound directory
/// 2. transformer writes one bundle per message
/// 3. optional chaos pass corrupts bundles
/// 4. quality gate partitions bundles, updates the audit trail and writes the report
///
/// # Environment Variables
/// - `BRIDGE_DATA_DIR`: pipeline data root (default: "data")
/// - `BRIDGE_REPORT_DIR`: report directory (default: "reports")
/// - `BATCH_SIZE`: number of messages to generate (default: 10)
/// - `CHAOS`: corrupt bundles before validation when "1" or "true"
/// - `CHAOS_TARGET_DIR`: directory the chaos pass targets (default: the bundle directory)
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bridge_run=info".parse()?)
                .add_directive("bridge_core=info".parse()?)
                .add_directive("quality_gate=info".parse()?)
                .add_directive("bridge_synth=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PipelineConfig::from_env_values(
        std::env::var("BRIDGE_DATA_DIR").ok(),
        std::env::var("BRIDGE_REPORT_DIR").ok(),
        std::env::var("BATCH_SIZE").ok(),
        std::env::var("CHAOS_TARGET_DIR").ok(),
    )?;
    let chaos = chaos_enabled(std::env::var("CHAOS").ok());
    let mut rng = StdRng::from_entropy();

    tracing::info!("starting simulation in {}", config.data_dir().display());

    run_feed(
        &config.inbound_dir(),
        config.batch_size(),
        &mut rng,
        Utc::now().naive_utc(),
    )?;

    let transformed = run_transformer(&config)?;
    if !transformed.skipped.is_empty() {
        tracing::warn!("{} messages skipped", transformed.skipped.len());
    }

    if chaos {
        run_chaos(
            &config.chaos_target_dir(),
            &mut rng,
            DEFAULT_ERROR_RATE,
            Utc::now(),
        )?;
    }

    let summary = run_gate(&GateConfig {
        bundle_dir: config.bundle_dir(),
        accepted_dir: config.accepted_dir(),
        rejected_dir: config.rejected_dir(),
        history_path: config.history_path(),
        report_dir: config.report_dir().to_path_buf(),
    })?;

    tracing::info!(
        "simulation complete: {} accepted, {} rejected",
        summary.accepted.len(),
        summary.rejections.len()
    );
    Ok(())
}

fn chaos_enabled(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaos_flag_parsing() {
        assert!(chaos_enabled(Some("1".into())));
        assert!(chaos_enabled(Some(" TRUE ".into())));
        assert!(!chaos_enabled(Some("0".into())));
        assert!(!chaos_enabled(Some("yes".into())));
        assert!(!chaos_enabled(None));
    }
}
