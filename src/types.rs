//! Data types flowing through the detection pipeline.

use std::fmt;
use std::time::{Duration, Instant};

use crate::defaults;

/// One window of raw audio captured from a call.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// PCM samples (16-bit signed integers, mono).
    pub samples: Vec<i16>,
    /// Timestamp when this chunk was captured.
    pub timestamp: Instant,
    /// Real audio duration of the chunk.
    pub duration: Duration,
    /// Sample rate of the audio (e.g., 16000 Hz).
    pub sample_rate: u32,
}

impl AudioChunk {
    /// Creates a chunk, deriving its duration from the actual sample count.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        let duration = if sample_rate > 0 {
            Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64)
        } else {
            Duration::ZERO
        };
        Self {
            samples,
            timestamp: Instant::now(),
            duration,
            sample_rate,
        }
    }

    /// Returns true if the chunk carries no audio.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A recognized segment of speech from the ASR engine.
#[derive(Debug, Clone)]
pub struct TranscriptSegment {
    /// The recognized text content.
    pub text: String,
    /// Relative start time of the segment in the stream, in seconds.
    pub start_time: f64,
    /// Relative end time of the segment in the stream, in seconds.
    pub end_time: f64,
    /// The engine's confidence in this recognition (0.0 to 1.0).
    pub confidence: f32,
    /// Whether this result is final or an in-progress partial.
    pub is_final: bool,
}

/// Vocal features extracted from one audio window.
///
/// All-zero defaults mean "no stress signal", which is the safe reading when
/// extraction is unavailable or fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParalinguisticFeatures {
    /// Average pitch (F0) over the window, in Hz.
    pub pitch_mean: f32,
    /// Normalized pitch deviation (stddev / mean).
    pub pitch_variance: f32,
    /// Average loudness (RMS, 0.0 to 1.0).
    pub intensity_mean: f32,
    /// Estimated syllables per second. Not reliably extractable at window
    /// granularity; stays 0.0.
    pub speaking_rate: f32,
    /// Relative period-to-period pitch perturbation.
    pub jitter: f32,
    /// Relative cycle-to-cycle amplitude perturbation.
    pub shimmer: f32,
}

/// Narrative category of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentLabel {
    Greeting,
    Authority,
    Fear,
    Urgency,
    Payment,
    Threat,
    Neutral,
    Silence,
    Unknown,
    Error,
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntentLabel::Greeting => "GREETING",
            IntentLabel::Authority => "AUTHORITY",
            IntentLabel::Fear => "FEAR",
            IntentLabel::Urgency => "URGENCY",
            IntentLabel::Payment => "PAYMENT",
            IntentLabel::Threat => "THREAT",
            IntentLabel::Neutral => "NEUTRAL",
            IntentLabel::Silence => "SILENCE",
            IntentLabel::Unknown => "UNKNOWN",
            IntentLabel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Classified meaning of a transcript segment.
#[derive(Debug, Clone)]
pub struct SemanticIntent {
    /// The primary intent label.
    pub label: IntentLabel,
    /// Confidence in the classification (0.0 to 1.0).
    pub confidence: f32,
    /// Phrases that triggered this intent, if any.
    pub keywords_detected: Vec<String>,
}

impl SemanticIntent {
    /// Creates an intent with no triggering keywords.
    pub fn new(label: IntentLabel, confidence: f32) -> Self {
        Self {
            label,
            confidence,
            keywords_detected: Vec::new(),
        }
    }
}

/// Discrete risk tier derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Maps a clamped score to its level using the fixed thresholds.
    pub fn from_score(score: f32) -> Self {
        if score >= defaults::RISK_THRESHOLD_CRITICAL {
            RiskLevel::Critical
        } else if score >= defaults::RISK_THRESHOLD_HIGH {
            RiskLevel::High
        } else if score >= defaults::RISK_THRESHOLD_MEDIUM {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Returns true for the tiers that trip the escalation gate.
    pub fn is_escalation_worthy(self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// Point-in-time fraud assessment.
#[derive(Debug, Clone)]
pub struct RiskScore {
    /// Normalized risk score (0.0 to 1.0).
    pub score: f32,
    /// Categorical risk level.
    pub level: RiskLevel,
    /// Reasons the risk is elevated.
    pub trigger_factors: Vec<String>,
    /// When this score was computed.
    pub timestamp: Instant,
}

impl RiskScore {
    /// Builds a score, clamping to [0, 1] and deriving the level.
    pub fn new(score: f32, trigger_factors: Vec<String>) -> Self {
        let clamped = score.clamp(0.0, 1.0);
        Self {
            score: clamped,
            level: RiskLevel::from_score(clamped),
            trigger_factors,
            timestamp: Instant::now(),
        }
    }
}

/// Position within the canonical scam-script progression.
///
/// Scam calls follow a rigid escalation: contact, false credibility, a
/// manufactured problem, time pressure, then the actual ask. The ordering of
/// these variants is load-bearing: the sequencer only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CallPhase {
    Start,
    Greeting,
    Authority,
    Fear,
    Urgency,
    ActionRequest,
    End,
}

impl CallPhase {
    /// All phases in canonical order.
    pub const ALL: [CallPhase; 7] = [
        CallPhase::Start,
        CallPhase::Greeting,
        CallPhase::Authority,
        CallPhase::Fear,
        CallPhase::Urgency,
        CallPhase::ActionRequest,
        CallPhase::End,
    ];

    /// Index of this phase in the canonical ordering.
    pub fn index(self) -> usize {
        match self {
            CallPhase::Start => 0,
            CallPhase::Greeting => 1,
            CallPhase::Authority => 2,
            CallPhase::Fear => 3,
            CallPhase::Urgency => 4,
            CallPhase::ActionRequest => 5,
            CallPhase::End => 6,
        }
    }

    /// How deep into the script the call is: 0.0 at Start, 1.0 at End.
    pub fn progress(self) -> f32 {
        self.index() as f32 / (Self::ALL.len() - 1) as f32
    }
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallPhase::Start => "START",
            CallPhase::Greeting => "GREETING",
            CallPhase::Authority => "AUTHORITY",
            CallPhase::Fear => "FEAR",
            CallPhase::Urgency => "URGENCY",
            CallPhase::ActionRequest => "ACTION_REQUEST",
            CallPhase::End => "END",
        };
        f.write_str(name)
    }
}

/// Aggregate state of one call.
///
/// Owned exclusively by the detection pipeline; the sequencer and scorer only
/// touch it through the pipeline's sequential per-chunk processing.
#[derive(Debug)]
pub struct CallState {
    /// Unique identifier for the call.
    pub call_id: String,
    /// Current position in the scam script.
    pub current_phase: CallPhase,
    /// Full conversation log (final segments only), append-only.
    pub transcript_history: Vec<TranscriptSegment>,
    /// History of risk assessments, append-only.
    pub risk_history: Vec<RiskScore>,
    /// Whether the call is still active.
    pub is_active: bool,
}

impl CallState {
    /// Creates fresh state for a new call.
    pub fn new(call_id: String) -> Self {
        Self {
            call_id,
            current_phase: CallPhase::Start,
            transcript_history: Vec::new(),
            risk_history: Vec::new(),
            is_active: true,
        }
    }
}
