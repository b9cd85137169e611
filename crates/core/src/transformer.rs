//! Batch transformation of an inbound message directory.

use crate::assembler::transform_message;
use crate::constants::MESSAGE_EXTENSION;
use crate::{BridgeError, BridgeResult, PipelineConfig};
use bridge_files::{artifact_name, ArtifactDir};

/// A source message that produced no bundle, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedMessage {
    pub source: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct TransformSummary {
    /// Names of bundle artifacts written, in source order.
    pub transformed: Vec<String>,
    pub skipped: Vec<SkippedMessage>,
}

/// Transform every inbound message into a bundle artifact.
///
/// Messages are processed independently in name order. A message that cannot be read, fails
/// to parse or has no patient is logged and skipped; the batch carries on.
///
/// # Errors
///
/// Returns `BridgeError` when a directory cannot be prepared, a bundle cannot be rendered or
/// written, or assembly fails for a reason outside the message itself.
pub fn run_transformer(config: &PipelineConfig) -> BridgeResult<TransformSummary> {
    let inbound = ArtifactDir::create(&config.inbound_dir())?;
    let bundles = ArtifactDir::create(&config.bundle_dir())?;

    let sources = inbound.list(MESSAGE_EXTENSION)?;
    if sources.is_empty() {
        tracing::warn!("no messages found in {}", inbound.path().display());
    }

    let mut summary = TransformSummary::default();
    for path in sources {
        let source = artifact_name(&path)?.into_inner();

        let outcome = inbound
            .read(&source)
            .map_err(BridgeError::UnreadableMessage)
            .and_then(|text| transform_message(&source, &text));

        let assembled = match outcome {
            Ok(assembled) => assembled,
            Err(err) if err.is_message_scoped() => {
                tracing::warn!("skipping {}: {}", source, err);
                summary.skipped.push(SkippedMessage {
                    source,
                    reason: err.to_string(),
                });
                continue;
            }
            Err(err) => return Err(err),
        };

        bundles.write(&assembled.output_name, &assembled.render()?)?;
        tracing::info!(
            "transformed {} -> {} ({}, {} resources)",
            source,
            assembled.output_name,
            assembled.family,
            assembled.resource_count()
        );
        summary.transformed.push(assembled.output_name);
    }

    tracing::info!(
        "transformer finished: {} transformed, {} skipped",
        summary.transformed.len(),
        summary.skipped.len()
    );
    Ok(summary)
}
