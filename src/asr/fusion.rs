//! Dual-language fusion recognizer.
//!
//! Feeds the same chunk to two single-language engines and reconciles their
//! outputs with a deterministic tie-break. Useful for code-mixed calls where
//! the caller switches languages mid-sentence.

use crate::asr::Recognizer;
use crate::error::Result;
use crate::types::{AudioChunk, TranscriptSegment};

/// Recognizer that runs two child engines against the same audio.
///
/// Tie-break: if exactly one engine produced non-empty text, use it; if both
/// did, prefer the longer string: the correctly-matched language model tends
/// to produce more coherent, longer output. Evaluation order does not affect
/// the result. The engines are independent, so this could fan out to threads,
/// but small offline models finish well inside a window's real-time budget.
pub struct DualRecognizer {
    primary: Box<dyn Recognizer>,
    secondary: Box<dyn Recognizer>,
    name: String,
}

impl DualRecognizer {
    /// Create a fusion recognizer from two child engines.
    pub fn new(primary: Box<dyn Recognizer>, secondary: Box<dyn Recognizer>) -> Self {
        let name = format!("{}+{}", primary.engine_name(), secondary.engine_name());
        Self {
            primary,
            secondary,
            name,
        }
    }

    fn pick(
        a: Option<TranscriptSegment>,
        b: Option<TranscriptSegment>,
    ) -> Option<TranscriptSegment> {
        let a = a.filter(|seg| !seg.text.is_empty());
        let b = b.filter(|seg| !seg.text.is_empty());

        match (a, b) {
            (None, None) => None,
            (Some(seg), None) | (None, Some(seg)) => Some(seg),
            (Some(first), Some(second)) => {
                if first.text.len() >= second.text.len() {
                    Some(first)
                } else {
                    Some(second)
                }
            }
        }
    }
}

impl Recognizer for DualRecognizer {
    fn process_chunk(&mut self, chunk: &AudioChunk) -> Result<Option<TranscriptSegment>> {
        // One engine erroring must not silence the other.
        let primary = match self.primary.process_chunk(chunk) {
            Ok(result) => result,
            Err(e) => {
                eprintln!(
                    "callwarden: engine {} failed on chunk: {e}",
                    self.primary.engine_name()
                );
                None
            }
        };
        let secondary = match self.secondary.process_chunk(chunk) {
            Ok(result) => result,
            Err(e) => {
                eprintln!(
                    "callwarden: engine {} failed on chunk: {e}",
                    self.secondary.engine_name()
                );
                None
            }
        };

        Ok(Self::pick(primary, secondary))
    }

    fn engine_name(&self) -> &str {
        &self.name
    }
}
