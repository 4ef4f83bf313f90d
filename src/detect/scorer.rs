//! Fraud risk scoring.
//!
//! Fuses three signals into one normalized score: how deep the call is in
//! the scam script, what the latest utterance asked for, and whether the
//! voice carries stress markers. Weights are fixed, not learned.

use crate::defaults;
use crate::types::{
    CallState, IntentLabel, ParalinguisticFeatures, RiskScore, SemanticIntent,
};

/// Computes the probability that the current call is a scam.
///
/// Pure given its three inputs: call state is read-only here (only the
/// sequencer and the pipeline mutate it).
#[derive(Debug, Default)]
pub struct FraudRiskScorer;

impl FraudRiskScorer {
    pub fn new() -> Self {
        Self
    }

    /// Compute the real-time risk score for the latest chunk.
    pub fn calculate_score(
        &self,
        call_state: &CallState,
        features: &ParalinguisticFeatures,
        intent: &SemanticIntent,
    ) -> RiskScore {
        let mut score = 0.0f32;
        let mut triggers = Vec::new();

        // 1. Sequence progression: being deep in the funnel is inherently
        // risky even before the ask lands.
        let progress = call_state.current_phase.progress();
        score += progress * defaults::SEQUENCE_WEIGHT;
        if progress > defaults::DEEP_SCRIPT_PROGRESS {
            triggers.push(format!("Deep in Scam Script ({})", call_state.current_phase));
        }

        // 2. Intent: a payment demand is the scam itself.
        match intent.label {
            IntentLabel::Payment => {
                score += defaults::PAYMENT_INTENT_SCORE;
                triggers.push("Payment Demand".to_string());
            }
            IntentLabel::Threat
            | IntentLabel::Urgency
            | IntentLabel::Fear
            | IntentLabel::Authority => {
                score += defaults::HIGH_RISK_INTENT_SCORE;
                triggers.push(format!("High Risk Intent: {}", intent.label));
            }
            _ => {}
        }

        // 3. Vocal stress: pitch instability, micro-tremor, pressured pace.
        let mut stress_score = 0.0f32;
        if features.pitch_variance > defaults::PITCH_VARIANCE_THRESHOLD {
            stress_score += defaults::STRESS_INCREMENT;
        }
        if features.jitter > defaults::JITTER_THRESHOLD {
            stress_score += defaults::STRESS_INCREMENT;
        }
        if features.speaking_rate > defaults::SPEAKING_RATE_THRESHOLD {
            stress_score += defaults::STRESS_INCREMENT;
        }

        score += stress_score;
        if stress_score > 0.0 {
            triggers.push("Vocal Stress/Urgency Detected".to_string());
        }

        RiskScore::new(score, triggers)
    }
}
