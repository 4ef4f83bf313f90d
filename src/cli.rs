//! Command-line interface for callwarden
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Real-time scam-call detection with honeypot escalation
#[derive(Parser, Debug)]
#[command(name = "callwarden", version, about = "Real-time scam-call detection")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-chunk latency)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// WAV recording to analyze (16kHz mono recommended). Omit to generate
    /// a sine-tone demo file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Analyze live microphone input instead of a file
    #[arg(long)]
    pub live: bool,

    /// Use the mock recognizer (no model files needed)
    #[arg(long)]
    pub mock: bool,

    /// Recognition language: en, hi, or mix (dual-engine fusion)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Audio input device for live capture (see `callwarden devices`)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Analysis window duration. Examples: 1s, 500ms
    #[arg(long, value_name = "DURATION", default_value = "1s", value_parser = parse_chunk_ms)]
    pub chunk: u32,
}

/// Parse a window duration string into milliseconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (milliseconds), single-unit (`500ms`, `1s`), and compound (`1s500ms`).
fn parse_chunk_ms(s: &str) -> Result<u32, String> {
    let s = s.trim();
    // Bare number → milliseconds
    if let Ok(ms) = s.parse::<u32>() {
        return Ok(ms);
    }
    humantime::parse_duration(s)
        .map_err(|e| e.to_string())
        .and_then(|d| {
            let ms = d.as_millis();
            if ms == 0 || ms > u32::MAX as u128 {
                Err(format!("duration {s} out of range"))
            } else {
                Ok(ms as u32)
            }
        })
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
