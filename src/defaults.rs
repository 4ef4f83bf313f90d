//! Default configuration constants for callwarden.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default analysis window duration in milliseconds.
///
/// One-second windows keep per-chunk recognition and prosody extraction well
/// under real time on small models while remaining long enough for a stable
/// pitch estimate.
pub const CHUNK_DURATION_MS: u32 = 1000;

/// Confidence assigned to finalized recognition results.
///
/// The offline decoder does not expose per-result confidence for full
/// utterances in this mode, so finals carry a fixed high value.
pub const FINAL_CONFIDENCE: f32 = 1.0;

/// Confidence assigned to partial (in-progress) recognition results.
pub const PARTIAL_CONFIDENCE: f32 = 0.5;

/// Confidence assigned by the keyword fallback of the semantic analyzer.
pub const KEYWORD_FALLBACK_CONFIDENCE: f32 = 0.8;

/// Minimum cosine similarity for an embedding match to count as a real
/// category hit. Below this the winning category is downgraded to neutral.
pub const RELEVANCE_THRESHOLD: f32 = 0.25;

/// Utterances shorter than this many words are too ambiguous to classify
/// (a bare "Right" would otherwise read as urgency).
pub const MIN_CLASSIFIABLE_WORDS: usize = 3;

/// Weight of scam-script progression in the fused risk score.
pub const SEQUENCE_WEIGHT: f32 = 0.4;

/// Script progress above which the "deep in script" trigger fires.
pub const DEEP_SCRIPT_PROGRESS: f32 = 0.6;

/// Flat score contribution of a payment demand.
pub const PAYMENT_INTENT_SCORE: f32 = 0.5;

/// Flat score contribution of other high-risk intents (threat, urgency,
/// fear, authority).
pub const HIGH_RISK_INTENT_SCORE: f32 = 0.2;

/// Per-indicator contribution of a vocal stress signal.
pub const STRESS_INCREMENT: f32 = 0.1;

/// Normalized pitch variance above which the voice reads as unstable.
pub const PITCH_VARIANCE_THRESHOLD: f32 = 0.5;

/// Relative jitter above which micro-tremor counts as a stress indicator.
pub const JITTER_THRESHOLD: f32 = 0.05;

/// Speaking rate (syllables/sec) above which speech counts as pressured.
pub const SPEAKING_RATE_THRESHOLD: f32 = 4.0;

/// Risk score thresholds for the discrete levels.
pub const RISK_THRESHOLD_MEDIUM: f32 = 0.4;
pub const RISK_THRESHOLD_HIGH: f32 = 0.7;
pub const RISK_THRESHOLD_CRITICAL: f32 = 0.9;

/// Default directory holding offline recognition models.
pub const MODEL_DIR: &str = "models";

/// Offline model directory names, relative to the model dir.
pub const ENGLISH_MODEL: &str = "vosk-model-small-en-us-0.15";
pub const HINDI_MODEL: &str = "vosk-model-small-hi-0.22";

/// Default honeypot persona announced on escalation.
pub const HONEYPOT_PERSONA: &str = "Vulnerable Elderly Person";

/// Returns the default analysis window duration.
pub fn chunk_duration() -> Duration {
    Duration::from_millis(CHUNK_DURATION_MS as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_thresholds_are_ascending() {
        assert!(RISK_THRESHOLD_MEDIUM < RISK_THRESHOLD_HIGH);
        assert!(RISK_THRESHOLD_HIGH < RISK_THRESHOLD_CRITICAL);
        assert!(RISK_THRESHOLD_CRITICAL <= 1.0);
    }

    #[test]
    fn chunk_duration_matches_ms_constant() {
        assert_eq!(chunk_duration().as_millis() as u32, CHUNK_DURATION_MS);
    }

    #[test]
    fn stress_increments_cannot_exceed_weighting() {
        // Three independent indicators at 0.1 each cap the stress share at 0.3.
        assert!((3.0 * STRESS_INCREMENT - 0.3).abs() < f32::EPSILON);
    }
}
