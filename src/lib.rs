//! callwarden - Real-time scam-call detection
//!
//! Analyzes a live or recorded voice call chunk by chunk, classifies how far
//! the caller has progressed along the canonical scam script, fuses semantic
//! and acoustic signals into a risk score, and hands the call to a deceptive
//! honeypot agent once risk crosses the escalation threshold.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod analysis;
pub mod asr;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod detect;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Core seams (source → recognize → analyze → score → escalate)
pub use analysis::{ParalinguisticAnalyzer, SemanticAnalyzer, SentenceEncoder};
pub use asr::{Language, MockRecognizer, Recognizer};
pub use audio::{AudioChunker, AudioSource};
pub use detect::{BehavioralSequencer, FraudRiskScorer, HoneypotAgent};

// Pipeline
pub use pipeline::{DetectionPipeline, PipelineOptions};

// Error handling
pub use error::{CallwardenError, Result};

// Config
pub use config::Config;

// Domain types
pub use types::{
    AudioChunk, CallPhase, CallState, IntentLabel, ParalinguisticFeatures, RiskLevel, RiskScore,
    SemanticIntent, TranscriptSegment,
};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.2+abc1234"` when git hash is available, `"0.1.2"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
