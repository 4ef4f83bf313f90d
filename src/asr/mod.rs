//! Speech recognition: engine trait, offline engines, fusion, mock.

pub mod fusion;
#[cfg(feature = "vosk")]
pub mod vosk;

pub use fusion::DualRecognizer;
#[cfg(feature = "vosk")]
pub use vosk::VoskRecognizer;

use crate::defaults;
use crate::error::{CallwardenError, Result};
use crate::types::{AudioChunk, TranscriptSegment};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::str::FromStr;

/// Trait for speech recognition engines.
///
/// This trait allows swapping implementations (offline decoder, dual-language
/// fusion, mock). Engines are stateful across chunks: a decoder may hold
/// audio until it reaches a speech boundary, so a chunk can legitimately
/// produce no segment.
pub trait Recognizer: Send {
    /// Process one window of audio.
    ///
    /// # Returns
    /// A final or partial transcript segment, or `None` if no speech boundary
    /// was reached yet.
    fn process_chunk(&mut self, chunk: &AudioChunk) -> Result<Option<TranscriptSegment>>;

    /// Name of the engine, for logging.
    fn engine_name(&self) -> &str;
}

/// Recognition language selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Hindi,
    /// Run both language models and reconcile (code-mixed calls).
    Mixed,
}

impl Language {
    /// Model directory name for a single-language engine.
    pub fn model_name(self) -> &'static str {
        match self {
            Language::English => defaults::ENGLISH_MODEL,
            Language::Hindi => defaults::HINDI_MODEL,
            // Mixed has no single model; callers build both.
            Language::Mixed => defaults::ENGLISH_MODEL,
        }
    }
}

impl FromStr for Language {
    type Err = CallwardenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "en" => Ok(Language::English),
            "hi" => Ok(Language::Hindi),
            "mix" => Ok(Language::Mixed),
            other => Err(CallwardenError::ConfigInvalidValue {
                key: "language".to_string(),
                message: format!("unknown language '{}', expected en, hi or mix", other),
            }),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Mixed => "mix",
        };
        f.write_str(s)
    }
}

/// Configuration for recognizer construction.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Skip the offline engine entirely and use the mock.
    pub use_mock: bool,
    /// Language(s) to recognize.
    pub language: Language,
    /// Directory containing offline model directories.
    pub model_dir: PathBuf,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            use_mock: false,
            language: Language::English,
            model_dir: PathBuf::from(defaults::MODEL_DIR),
        }
    }
}

/// Build a recognizer from configuration.
///
/// Capability probing happens here, once: a missing model directory or a
/// build without the offline engine is a typed construction error. Callers
/// that can degrade (the pipeline) catch it and substitute the mock; this is
/// never retried per chunk.
pub fn build_recognizer(config: &RecognizerConfig) -> Result<Box<dyn Recognizer>> {
    if config.use_mock {
        return Ok(Box::new(MockRecognizer::new()));
    }

    #[cfg(feature = "vosk")]
    {
        match config.language {
            Language::Mixed => {
                let english = VoskRecognizer::new(&config.model_dir, Language::English)?;
                let hindi = VoskRecognizer::new(&config.model_dir, Language::Hindi)?;
                Ok(Box::new(DualRecognizer::new(
                    Box::new(english),
                    Box::new(hindi),
                )))
            }
            language => {
                let engine = VoskRecognizer::new(&config.model_dir, language)?;
                Ok(Box::new(engine))
            }
        }
    }

    #[cfg(not(feature = "vosk"))]
    {
        Err(CallwardenError::ModelLoadFailed {
            message: "offline recognition requires the `vosk` feature".to_string(),
        })
    }
}

/// Placeholder transcript emitted by the mock engine.
const MOCK_PLACEHOLDER: &str = "hello this is a test call";

enum MockMode {
    /// Pseudo-randomly emit the placeholder (~1 chunk in 5).
    Random { state: u64 },
    /// Emit scripted lines, one per chunk, then nothing.
    Scripted { lines: VecDeque<String> },
}

/// Mock recognizer for testing and demo runs without model files.
pub struct MockRecognizer {
    mode: MockMode,
    stream_secs: f64,
}

impl MockRecognizer {
    /// Create a mock that emits the placeholder pseudo-randomly.
    pub fn new() -> Self {
        Self::with_seed(0x9e37_79b9_7f4a_7c15)
    }

    /// Create a mock with a specific seed (deterministic test runs).
    pub fn with_seed(seed: u64) -> Self {
        Self {
            mode: MockMode::Random {
                state: seed.max(1),
            },
            stream_secs: 0.0,
        }
    }

    /// Create a mock that emits the given lines, one per chunk, in order.
    pub fn with_script<S: Into<String>>(lines: Vec<S>) -> Self {
        Self {
            mode: MockMode::Scripted {
                lines: lines.into_iter().map(Into::into).collect(),
            },
            stream_secs: 0.0,
        }
    }

    fn next_random(state: &mut u64) -> u64 {
        // xorshift64, deterministic and dependency-free
        let mut x = *state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        *state = x;
        x
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for MockRecognizer {
    fn process_chunk(&mut self, chunk: &AudioChunk) -> Result<Option<TranscriptSegment>> {
        let start = self.stream_secs;
        self.stream_secs += chunk.duration.as_secs_f64();
        let end = self.stream_secs;

        let text = match &mut self.mode {
            MockMode::Random { state } => {
                if Self::next_random(state) % 5 == 0 {
                    Some(MOCK_PLACEHOLDER.to_string())
                } else {
                    None
                }
            }
            MockMode::Scripted { lines } => lines.pop_front(),
        };

        Ok(text.map(|text| TranscriptSegment {
            text,
            start_time: start,
            end_time: end,
            confidence: 0.9,
            is_final: true,
        }))
    }

    fn engine_name(&self) -> &str {
        "mock"
    }
}
