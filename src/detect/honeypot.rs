//! Honeypot escalation gate.
//!
//! One-way latch that hands the call to the deceptive counter-agent once
//! risk crosses into HIGH/CRITICAL. Activation is the pipeline's decision
//! boundary; what the agent actually says comes from an external generation
//! service and is out of scope here.

use crate::defaults;
use crate::types::CallState;

/// Adversarial counter-agent: wastes scammer time, extracts intelligence,
/// and keeps the real user out of the loop.
#[derive(Debug)]
pub struct HoneypotAgent {
    is_active: bool,
    persona: String,
}

impl HoneypotAgent {
    /// Create an inactive agent with the default persona.
    pub fn new() -> Self {
        Self::with_persona(defaults::HONEYPOT_PERSONA)
    }

    /// Create an inactive agent with a specific persona.
    pub fn with_persona(persona: &str) -> Self {
        Self {
            is_active: false,
            persona: persona.to_string(),
        }
    }

    /// Whether the agent controls the call.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Persona the agent plays once active.
    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Trip the latch and take over the call.
    ///
    /// Idempotent and irreversible within a call: the first HIGH/CRITICAL
    /// score activates, later ones are no-ops. Returns true only on the
    /// activating call so the caller can emit the side effects (banner,
    /// telemetry) exactly once.
    pub fn activate(&mut self, _call_state: &CallState) -> bool {
        if self.is_active {
            return false;
        }
        self.is_active = true;
        true
    }

    /// Stalling reply placeholder.
    ///
    /// The full system swaps this for LLM generation; the detection core
    /// only owns the activation decision.
    pub fn generate_response(&self, _text_input: &str) -> Option<String> {
        if !self.is_active {
            return None;
        }
        Some(
            "Oh dear, I'm not very good with computers... can you say that again slower?"
                .to_string(),
        )
    }
}

impl Default for HoneypotAgent {
    fn default() -> Self {
        Self::new()
    }
}
