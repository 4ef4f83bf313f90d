//! Behavioral sequencing: tracking progression along the scam script.
//!
//! Scam calls follow a rigid funnel: contact, false credibility, a
//! manufactured problem, time pressure, the ask. The sequencer is a
//! monotonic ratchet over [`CallPhase`]: intents that represent narrative
//! progression promote the phase, nothing ever demotes it. Scammers do not
//! retreat to small talk after demanding gift cards.

use crate::types::{CallPhase, CallState, IntentLabel, SemanticIntent};

/// Finite state machine over the canonical scam-script phases.
#[derive(Debug, Default)]
pub struct BehavioralSequencer {
    /// Phase after each update, in order. Useful for post-call review.
    state_history: Vec<CallPhase>,
}

impl BehavioralSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an intent to the phase it would place the call in, if any.
    fn candidate_phase(label: IntentLabel) -> Option<CallPhase> {
        match label {
            IntentLabel::Greeting => Some(CallPhase::Greeting),
            IntentLabel::Authority => Some(CallPhase::Authority),
            IntentLabel::Fear => Some(CallPhase::Fear),
            IntentLabel::Urgency => Some(CallPhase::Urgency),
            IntentLabel::Payment => Some(CallPhase::ActionRequest),
            // A threat is fear pressure by another name.
            IntentLabel::Threat => Some(CallPhase::Fear),
            _ => None,
        }
    }

    /// Update the call phase from the latest intent.
    ///
    /// Promotes the phase only when the candidate sits strictly later in the
    /// script than the current phase; everything else leaves it unchanged.
    /// Returns the (possibly unchanged) phase.
    pub fn update_state(&mut self, call_state: &mut CallState, intent: &SemanticIntent) -> CallPhase {
        let current = call_state.current_phase;
        let next = match Self::candidate_phase(intent.label) {
            Some(candidate) if candidate.index() > current.index() => candidate,
            _ => current,
        };

        call_state.current_phase = next;
        self.state_history.push(next);
        next
    }

    /// Phase trace so far.
    pub fn state_history(&self) -> &[CallPhase] {
        &self.state_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(label: IntentLabel) -> SemanticIntent {
        SemanticIntent::new(label, 0.9)
    }

    fn state() -> CallState {
        CallState::new("test-call".to_string())
    }

    #[test]
    fn greeting_promotes_from_start() {
        let mut sequencer = BehavioralSequencer::new();
        let mut call = state();

        let phase = sequencer.update_state(&mut call, &intent(IntentLabel::Greeting));
        assert_eq!(phase, CallPhase::Greeting);
        assert_eq!(call.current_phase, CallPhase::Greeting);
    }

    #[test]
    fn phases_can_be_skipped_forward() {
        let mut sequencer = BehavioralSequencer::new();
        let mut call = state();

        // Straight to the ask, skipping everything between.
        let phase = sequencer.update_state(&mut call, &intent(IntentLabel::Payment));
        assert_eq!(phase, CallPhase::ActionRequest);
    }

    #[test]
    fn phase_never_regresses() {
        let mut sequencer = BehavioralSequencer::new();
        let mut call = state();

        sequencer.update_state(&mut call, &intent(IntentLabel::Urgency));
        assert_eq!(call.current_phase, CallPhase::Urgency);

        // A later greeting or authority claim does not demote.
        sequencer.update_state(&mut call, &intent(IntentLabel::Greeting));
        assert_eq!(call.current_phase, CallPhase::Urgency);
        sequencer.update_state(&mut call, &intent(IntentLabel::Authority));
        assert_eq!(call.current_phase, CallPhase::Urgency);
    }

    #[test]
    fn threat_maps_to_fear() {
        let mut sequencer = BehavioralSequencer::new();
        let mut call = state();

        let phase = sequencer.update_state(&mut call, &intent(IntentLabel::Threat));
        assert_eq!(phase, CallPhase::Fear);
    }

    #[test]
    fn unmapped_intents_leave_phase_unchanged() {
        let mut sequencer = BehavioralSequencer::new();
        let mut call = state();

        for label in [
            IntentLabel::Neutral,
            IntentLabel::Silence,
            IntentLabel::Unknown,
            IntentLabel::Error,
        ] {
            sequencer.update_state(&mut call, &intent(label));
            assert_eq!(call.current_phase, CallPhase::Start);
        }
    }

    #[test]
    fn phase_index_is_nondecreasing_over_any_intent_sequence() {
        // Exhaustive-ish monotonicity check over a fixed pseudo-random walk
        // of intents.
        let labels = [
            IntentLabel::Greeting,
            IntentLabel::Authority,
            IntentLabel::Fear,
            IntentLabel::Urgency,
            IntentLabel::Payment,
            IntentLabel::Threat,
            IntentLabel::Neutral,
            IntentLabel::Silence,
            IntentLabel::Unknown,
            IntentLabel::Error,
        ];

        let mut sequencer = BehavioralSequencer::new();
        let mut call = state();
        let mut last_index = call.current_phase.index();
        let mut x: u64 = 0x1234_5678;

        for _ in 0..500 {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            let label = labels[(x % labels.len() as u64) as usize];
            let phase = sequencer.update_state(&mut call, &intent(label));
            assert!(
                phase.index() >= last_index,
                "phase regressed from index {} to {:?}",
                last_index,
                phase
            );
            last_index = phase.index();
        }
    }

    #[test]
    fn history_records_every_update() {
        let mut sequencer = BehavioralSequencer::new();
        let mut call = state();

        sequencer.update_state(&mut call, &intent(IntentLabel::Greeting));
        sequencer.update_state(&mut call, &intent(IntentLabel::Neutral));
        sequencer.update_state(&mut call, &intent(IntentLabel::Fear));

        assert_eq!(
            sequencer.state_history(),
            &[CallPhase::Greeting, CallPhase::Greeting, CallPhase::Fear]
        );
    }
}
