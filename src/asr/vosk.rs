//! Offline speech recognition via the Vosk engine.
//!
//! # Feature Gate
//!
//! This module requires the `vosk` feature and `libvosk` available at link
//! time:
//!
//! ```bash
//! cargo build --features vosk
//! ```

use crate::asr::{Language, Recognizer};
use crate::defaults;
use crate::error::{CallwardenError, Result};
use crate::types::{AudioChunk, TranscriptSegment};
use std::path::Path;
use std::sync::Once;
use vosk::{DecodingState, Model};

static LOG_LEVEL_SET: Once = Once::new();

/// Offline single-language recognizer.
///
/// The model is loaded at construction (missing model files are a
/// construction-time failure, caught by the pipeline to substitute the mock).
/// The decoder itself is built lazily at the first chunk (it is bound to a
/// fixed sample rate, which is only known once audio arrives) and rebuilt if
/// the chunk sample rate changes.
pub struct VoskRecognizer {
    model: Model,
    decoder: Option<vosk::Recognizer>,
    sample_rate: u32,
    stream_secs: f64,
    name: String,
}

impl VoskRecognizer {
    /// Load the model for one language from the model directory.
    ///
    /// # Errors
    /// Returns `CallwardenError::ModelNotFound` if the model directory does
    /// not exist, `ModelLoadFailed` if Vosk rejects it.
    pub fn new(model_dir: &Path, language: Language) -> Result<Self> {
        // Quiet the Kaldi banner output (only once)
        LOG_LEVEL_SET.call_once(|| {
            vosk::set_log_level(vosk::LogLevel::Error);
        });

        let model_path = model_dir.join(language.model_name());
        if !model_path.exists() {
            return Err(CallwardenError::ModelNotFound {
                path: model_path.display().to_string(),
            });
        }

        let path_str = model_path
            .to_str()
            .ok_or_else(|| CallwardenError::ModelLoadFailed {
                message: "Invalid UTF-8 in model path".to_string(),
            })?;

        let model = Model::new(path_str).ok_or_else(|| CallwardenError::ModelLoadFailed {
            message: format!("Vosk could not load model at {}", model_path.display()),
        })?;

        Ok(Self {
            model,
            decoder: None,
            sample_rate: defaults::SAMPLE_RATE,
            stream_secs: 0.0,
            name: format!("vosk-{}", language),
        })
    }

    /// (Re)build the decoder for the given sample rate.
    fn ensure_decoder(&mut self, sample_rate: u32) -> Result<()> {
        if self.decoder.is_none() || self.sample_rate != sample_rate {
            self.sample_rate = sample_rate;
            let decoder = vosk::Recognizer::new(&self.model, sample_rate as f32).ok_or_else(
                || CallwardenError::Recognition {
                    message: format!("Failed to create decoder at {}Hz", sample_rate),
                },
            )?;
            self.decoder = Some(decoder);
        }
        Ok(())
    }
}

impl Recognizer for VoskRecognizer {
    fn process_chunk(&mut self, chunk: &AudioChunk) -> Result<Option<TranscriptSegment>> {
        self.ensure_decoder(chunk.sample_rate)?;
        let decoder = self
            .decoder
            .as_mut()
            .ok_or_else(|| CallwardenError::Recognition {
                message: "decoder unavailable".to_string(),
            })?;

        let start = self.stream_secs;
        self.stream_secs += chunk.duration.as_secs_f64();
        let end = self.stream_secs;

        let state = decoder.accept_waveform(&chunk.samples).map_err(|e| {
            CallwardenError::Recognition {
                message: format!("accept_waveform failed: {:?}", e),
            }
        })?;

        match state {
            DecodingState::Finalized => {
                // A silence boundary was reached: the decoder has a full
                // utterance. It does not expose per-result confidence in
                // this mode, so finals carry a fixed high value.
                let text = decoder
                    .result()
                    .single()
                    .map(|r| r.text.to_string())
                    .unwrap_or_default();
                if text.is_empty() {
                    return Ok(None);
                }
                Ok(Some(TranscriptSegment {
                    text,
                    start_time: start,
                    end_time: end,
                    confidence: defaults::FINAL_CONFIDENCE,
                    is_final: true,
                }))
            }
            DecodingState::Running => {
                let partial = decoder.partial_result().partial.to_string();
                if partial.is_empty() {
                    return Ok(None);
                }
                Ok(Some(TranscriptSegment {
                    text: partial,
                    start_time: start,
                    end_time: end,
                    confidence: defaults::PARTIAL_CONFIDENCE,
                    is_final: false,
                }))
            }
            DecodingState::Failed => Err(CallwardenError::Recognition {
                message: "decoder reported failure for chunk".to_string(),
            }),
        }
    }

    fn engine_name(&self) -> &str {
        &self.name
    }
}
