//! Shared event rendering for terminal output.
//! Used by the CLI simulation runs; quiet mode skips rendering entirely.

use crate::types::{IntentLabel, RiskLevel};

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Observable milestones of a detection run.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Pipeline constructed and ready.
    Initialized {
        engine: String,
        call_id: String,
    },
    /// A component was downgraded to a fallback at construction.
    Degraded {
        component: &'static str,
        reason: String,
    },
    /// The recognizer produced a transcript segment.
    Transcript {
        text: String,
        confidence: f32,
        is_final: bool,
    },
    /// The semantic analyzer classified the latest transcript.
    Intent {
        label: IntentLabel,
        confidence: f32,
    },
    /// The call advanced along the scam script.
    PhaseChange {
        from: String,
        to: String,
    },
    /// A risk score was computed for the latest chunk.
    Risk {
        score: f32,
        level: RiskLevel,
        triggers: Vec<String>,
    },
    /// The honeypot agent took over the call.
    HoneypotActivated {
        call_id: String,
        persona: String,
    },
    /// Per-chunk processing latency (verbose mode only).
    ChunkLatency {
        millis: u128,
    },
}

/// Return the ANSI color code for a risk level.
fn risk_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => GREEN,
        RiskLevel::Medium => YELLOW,
        RiskLevel::High | RiskLevel::Critical => RED,
    }
}

/// Render a pipeline event to stderr.
pub fn render_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::Initialized { engine, call_id } => {
            eprintln!("{DIM}callwarden: engine {engine}, call {call_id}{RESET}");
        }
        PipelineEvent::Degraded { component, reason } => {
            eprintln!("{YELLOW}callwarden: {component} degraded: {reason}{RESET}");
        }
        PipelineEvent::Transcript {
            text,
            confidence,
            is_final,
        } => {
            let marker = if *is_final { "»" } else { "…" };
            eprintln!(
                "  {marker} {text} {DIM}({:.0}%){RESET}",
                confidence * 100.0
            );
        }
        PipelineEvent::Intent { label, confidence } => {
            eprintln!(
                "  {DIM}intent{RESET} {label} {DIM}({:.2}){RESET}",
                confidence
            );
        }
        PipelineEvent::PhaseChange { from, to } => {
            eprintln!("  {DIM}phase{RESET} {from} → {to}");
        }
        PipelineEvent::Risk {
            score,
            level,
            triggers,
        } => {
            let color = risk_color(*level);
            eprintln!("  {DIM}risk{RESET} {color}{score:.2} [{level}]{RESET}");
            if !triggers.is_empty() {
                eprintln!("  {DIM}  ⚠ {}{RESET}", triggers.join(", "));
            }
        }
        PipelineEvent::HoneypotActivated { call_id, persona } => {
            eprintln!();
            eprintln!("{RED}{BOLD}══════════════════════════════════════════════════{RESET}");
            eprintln!("{RED}{BOLD} HONEYPOT AGENT ACTIVATED{RESET}");
            eprintln!("{RED} Persona: {persona}{RESET}");
            eprintln!("{RED} Taking control of call {call_id}{RESET}");
            eprintln!("{RED}{BOLD}══════════════════════════════════════════════════{RESET}");
            eprintln!();
        }
        PipelineEvent::ChunkLatency { millis } => {
            eprintln!("  {DIM}chunk processed in {millis}ms{RESET}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_colors_by_level() {
        assert_eq!(risk_color(RiskLevel::Low), GREEN);
        assert_eq!(risk_color(RiskLevel::Medium), YELLOW);
        assert_eq!(risk_color(RiskLevel::High), RED);
        assert_eq!(risk_color(RiskLevel::Critical), RED);
    }

    #[test]
    fn render_event_does_not_panic() {
        // Smoke test: render_event writes to stderr which can't be captured
        // here; validates all variants render without panicking.
        render_event(&PipelineEvent::Initialized {
            engine: "mock".to_string(),
            call_id: "abc".to_string(),
        });
        render_event(&PipelineEvent::Degraded {
            component: "recognizer",
            reason: "model missing".to_string(),
        });
        render_event(&PipelineEvent::Transcript {
            text: "hello".to_string(),
            confidence: 0.9,
            is_final: true,
        });
        render_event(&PipelineEvent::Intent {
            label: IntentLabel::Payment,
            confidence: 0.82,
        });
        render_event(&PipelineEvent::PhaseChange {
            from: "START".to_string(),
            to: "GREETING".to_string(),
        });
        render_event(&PipelineEvent::Risk {
            score: 0.83,
            level: RiskLevel::High,
            triggers: vec!["Payment Demand".to_string()],
        });
        render_event(&PipelineEvent::Risk {
            score: 0.1,
            level: RiskLevel::Low,
            triggers: vec![],
        });
        render_event(&PipelineEvent::HoneypotActivated {
            call_id: "abc".to_string(),
            persona: "Vulnerable Elderly Person".to_string(),
        });
        render_event(&PipelineEvent::ChunkLatency { millis: 12 });
    }
}
