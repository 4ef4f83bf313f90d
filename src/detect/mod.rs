//! Detection logic: behavioral sequencing, risk scoring, escalation.

pub mod honeypot;
pub mod scorer;
pub mod sequencer;

pub use honeypot::HoneypotAgent;
pub use scorer::FraudRiskScorer;
pub use sequencer::BehavioralSequencer;
