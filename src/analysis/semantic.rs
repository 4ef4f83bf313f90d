//! Semantic intent classification.
//!
//! Compares transcript text against prototype phrases for the known
//! scam-narrative categories, via sentence embeddings when an encoder is
//! available and case-insensitive keyword matching otherwise. Prototype
//! lists are bilingual (English + Hindi) to cover code-mixed calls.

use crate::defaults;
use crate::error::Result;
use crate::types::{IntentLabel, SemanticIntent};

/// Sentence-embedding capability consumed by the analyzer.
///
/// Implemented by the candle-backed encoder behind the `embeddings` feature;
/// tests provide cheap synthetic encoders.
pub trait SentenceEncoder: Send {
    /// Encode text into a dense vector.
    fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

/// Prototype phrases per category, English first, then Hindi.
pub const SCAM_PROTOTYPES: &[(IntentLabel, &[&str])] = &[
    (
        IntentLabel::Greeting,
        &[
            "Hello",
            "Good morning",
            "How are you today?",
            "Namaste",
            "Kya haal hai",
            "Kaise hain aap",
        ],
    ),
    (
        IntentLabel::Authority,
        &[
            "I am calling from the police",
            "This is the IRS",
            "Social Security Administration",
            "Microsoft Technical Support",
            "Bank Security Department",
            "Main police station se bol raha hoon",
            "Hum bank se bol rahe hain",
            "RBI se call kar rahe hain",
        ],
    ),
    (
        IntentLabel::Fear,
        &[
            "Your account has been compromised",
            "Suspicious activity detected",
            "Warrant for your arrest",
            "You will be taken into custody",
            "Legal action against you",
            "Aapka account band ho jayega",
            "Aap par case darj hua hai",
            "Police aapko arrest karegi",
        ],
    ),
    (
        IntentLabel::Urgency,
        &[
            "You must act immediately",
            "Right now",
            "Do not hang up",
            "Before it is too late",
            "Within the next hour",
            "Abhi kijiye",
            "Jaldi kariye",
            "Phone mat katiye",
        ],
    ),
    (
        IntentLabel::Payment,
        &[
            "Buy a gift card",
            "Target gift card",
            "Google Play card",
            "Bitcoin machine",
            "Wire transfer",
            "Verify your credit card number",
            "Paise transfer karein",
            "OTP batayein",
            "Gift card kharidiye",
        ],
    ),
];

/// Cosine similarity of two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Classifies transcript text into a scam-narrative intent.
pub struct SemanticAnalyzer {
    encoder: Option<Box<dyn SentenceEncoder>>,
    /// Prototype embeddings, precomputed at construction: one vector per
    /// phrase, grouped by category. Empty when running keyword-only.
    prototype_embeddings: Vec<(IntentLabel, Vec<Vec<f32>>)>,
}

impl SemanticAnalyzer {
    /// Create a keyword-only analyzer (no embedding backend).
    pub fn new() -> Self {
        Self {
            encoder: None,
            prototype_embeddings: Vec::new(),
        }
    }

    /// Create an analyzer backed by a sentence encoder.
    ///
    /// Prototype phrases are embedded once here so per-chunk classification
    /// is a handful of dot products.
    ///
    /// # Errors
    /// Fails if any prototype cannot be embedded; the caller degrades to
    /// [`SemanticAnalyzer::new`] in that case.
    pub fn with_encoder(encoder: Box<dyn SentenceEncoder>) -> Result<Self> {
        let mut prototype_embeddings = Vec::with_capacity(SCAM_PROTOTYPES.len());
        for (label, phrases) in SCAM_PROTOTYPES {
            let mut vectors = Vec::with_capacity(phrases.len());
            for phrase in *phrases {
                vectors.push(encoder.encode(phrase)?);
            }
            prototype_embeddings.push((*label, vectors));
        }
        Ok(Self {
            encoder: Some(encoder),
            prototype_embeddings,
        })
    }

    /// Whether the embedding path is active.
    pub fn has_encoder(&self) -> bool {
        self.encoder.is_some()
    }

    /// Classify the intent of the given text.
    ///
    /// Never fails: any backend error maps to an `Error`-labeled intent so
    /// one bad chunk cannot take down the call loop.
    pub fn analyze(&self, text: &str) -> SemanticIntent {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return SemanticIntent::new(IntentLabel::Silence, 0.0);
        }

        // Very short utterances are too ambiguous to classify: a bare
        // "Right" would read as urgency. Greetings are the exception.
        let word_count = trimmed.split_whitespace().count();
        let lower = trimmed.to_lowercase();
        if word_count < defaults::MIN_CLASSIFIABLE_WORDS
            && !lower.contains("hello")
            && !lower.contains("hi")
        {
            return SemanticIntent::new(IntentLabel::Neutral, 0.0);
        }

        match &self.encoder {
            None => self.keyword_fallback(&lower),
            Some(encoder) => match self.classify_embedded(encoder.as_ref(), trimmed) {
                Ok(intent) => intent,
                Err(e) => {
                    eprintln!("callwarden: semantic classification failed: {e}");
                    SemanticIntent::new(IntentLabel::Error, 0.0)
                }
            },
        }
    }

    fn classify_embedded(
        &self,
        encoder: &dyn SentenceEncoder,
        text: &str,
    ) -> Result<SemanticIntent> {
        let input = encoder.encode(text)?;

        let mut best_label = IntentLabel::Unknown;
        let mut best_score = 0.0f32;

        for (label, vectors) in &self.prototype_embeddings {
            for vector in vectors {
                let score = cosine_similarity(&input, vector);
                if score > best_score {
                    best_score = score;
                    best_label = *label;
                }
            }
        }

        // Below the relevance floor the "winner" is noise.
        if best_score < defaults::RELEVANCE_THRESHOLD {
            best_label = IntentLabel::Neutral;
        }

        Ok(SemanticIntent {
            label: best_label,
            confidence: best_score,
            keywords_detected: vec![text.to_string()],
        })
    }

    /// Substring matching over the prototype lists. First match wins.
    fn keyword_fallback(&self, lower_text: &str) -> SemanticIntent {
        for (label, phrases) in SCAM_PROTOTYPES {
            for phrase in *phrases {
                if lower_text.contains(&phrase.to_lowercase()) {
                    return SemanticIntent {
                        label: *label,
                        confidence: defaults::KEYWORD_FALLBACK_CONFIDENCE,
                        keywords_detected: vec![(*phrase).to_string()],
                    };
                }
            }
        }
        SemanticIntent::new(IntentLabel::Neutral, 0.0)
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallwardenError;

    /// Encoder that maps known phrases to fixed orthogonal-ish vectors.
    struct StubEncoder;

    impl SentenceEncoder for StubEncoder {
        fn encode(&self, text: &str) -> Result<Vec<f32>> {
            // Bucket by crude content so category prototypes cluster.
            let lower = text.to_lowercase();
            let mut v = vec![0.0f32; 8];
            if lower.contains("police") || lower.contains("bank") || lower.contains("irs") {
                v[0] = 1.0;
            }
            if lower.contains("arrest") || lower.contains("account") || lower.contains("case") {
                v[1] = 1.0;
            }
            if lower.contains("gift") || lower.contains("transfer") || lower.contains("card") {
                v[2] = 1.0;
            }
            if lower.contains("hello") || lower.contains("morning") || lower.contains("namaste") {
                v[3] = 1.0;
            }
            if lower.contains("now") || lower.contains("immediately") || lower.contains("jaldi") {
                v[4] = 1.0;
            }
            // Weak resemblance to the authority cluster, below the floor.
            if lower.contains("faintly") {
                v[0] = 0.2;
                v[5] = 1.0;
            }
            Ok(v)
        }
    }

    struct FailingEncoder;

    impl SentenceEncoder for FailingEncoder {
        fn encode(&self, _text: &str) -> Result<Vec<f32>> {
            Err(CallwardenError::Embedding {
                message: "backend gone".to_string(),
            })
        }
    }

    /// Encoder that succeeds at construction time but fails later.
    struct LateFailingEncoder {
        calls_before_failure: std::cell::Cell<usize>,
    }

    impl SentenceEncoder for LateFailingEncoder {
        fn encode(&self, _text: &str) -> Result<Vec<f32>> {
            let left = self.calls_before_failure.get();
            if left == 0 {
                return Err(CallwardenError::Embedding {
                    message: "transient".to_string(),
                });
            }
            self.calls_before_failure.set(left - 1);
            Ok(vec![1.0, 0.0])
        }
    }

    #[test]
    fn empty_text_is_silence() {
        let analyzer = SemanticAnalyzer::new();
        let intent = analyzer.analyze("   ");
        assert_eq!(intent.label, IntentLabel::Silence);
        assert_eq!(intent.confidence, 0.0);
    }

    #[test]
    fn short_utterance_is_neutral() {
        let analyzer = SemanticAnalyzer::new();
        // "Right now" matches an urgency prototype, but two words are too
        // ambiguous to act on.
        let intent = analyzer.analyze("Right now");
        assert_eq!(intent.label, IntentLabel::Neutral);
        assert_eq!(intent.confidence, 0.0);
    }

    #[test]
    fn short_greeting_is_still_classified() {
        let analyzer = SemanticAnalyzer::new();
        let intent = analyzer.analyze("Hello there");
        assert_eq!(intent.label, IntentLabel::Greeting);
    }

    #[test]
    fn keyword_fallback_matches_payment_phrase() {
        let analyzer = SemanticAnalyzer::new();
        let intent = analyzer.analyze("sir you need to buy a gift card for us");
        assert_eq!(intent.label, IntentLabel::Payment);
        assert_eq!(intent.confidence, defaults::KEYWORD_FALLBACK_CONFIDENCE);
        assert_eq!(intent.keywords_detected, vec!["Buy a gift card"]);
    }

    #[test]
    fn keyword_fallback_matches_hindi_phrase() {
        let analyzer = SemanticAnalyzer::new();
        let intent = analyzer.analyze("aap abhi paise transfer karein please");
        assert_eq!(intent.label, IntentLabel::Payment);
    }

    #[test]
    fn keyword_fallback_unmatched_is_neutral() {
        let analyzer = SemanticAnalyzer::new();
        let intent = analyzer.analyze("the weather is lovely this afternoon");
        assert_eq!(intent.label, IntentLabel::Neutral);
        assert_eq!(intent.confidence, 0.0);
    }

    #[test]
    fn embedded_classification_picks_best_category() {
        let analyzer = SemanticAnalyzer::with_encoder(Box::new(StubEncoder)).unwrap();
        assert!(analyzer.has_encoder());

        let intent = analyzer.analyze("this is the bank security police department");
        assert_eq!(intent.label, IntentLabel::Authority);
        assert!(intent.confidence > defaults::RELEVANCE_THRESHOLD);
    }

    #[test]
    fn relevance_floor_downgrades_weak_winner() {
        let analyzer = SemanticAnalyzer::with_encoder(Box::new(StubEncoder)).unwrap();

        // Best similarity lands around 0.2: the authority cluster "wins",
        // but below the floor the result is downgraded.
        let intent = analyzer.analyze("that reminds me faintly of officials");
        assert_eq!(intent.label, IntentLabel::Neutral);
        assert!(intent.confidence > 0.0);
        assert!(intent.confidence < defaults::RELEVANCE_THRESHOLD);
    }

    #[test]
    fn unrelated_text_with_encoder_is_neutral() {
        let analyzer = SemanticAnalyzer::with_encoder(Box::new(StubEncoder)).unwrap();
        let intent = analyzer.analyze("we talked about gardening for a while");
        assert_eq!(intent.label, IntentLabel::Neutral);
    }

    #[test]
    fn encoder_construction_failure_propagates() {
        assert!(SemanticAnalyzer::with_encoder(Box::new(FailingEncoder)).is_err());
    }

    #[test]
    fn per_chunk_encoder_failure_maps_to_error_intent() {
        let total_prototypes: usize = SCAM_PROTOTYPES.iter().map(|(_, p)| p.len()).sum();
        let encoder = LateFailingEncoder {
            calls_before_failure: std::cell::Cell::new(total_prototypes),
        };
        let analyzer = SemanticAnalyzer::with_encoder(Box::new(encoder)).unwrap();

        let intent = analyzer.analyze("please verify your account details today");
        assert_eq!(intent.label, IntentLabel::Error);
        assert_eq!(intent.confidence, 0.0);
    }

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn prototype_table_covers_all_five_categories() {
        let labels: Vec<IntentLabel> = SCAM_PROTOTYPES.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec![
                IntentLabel::Greeting,
                IntentLabel::Authority,
                IntentLabel::Fear,
                IntentLabel::Urgency,
                IntentLabel::Payment,
            ]
        );
        for (_, phrases) in SCAM_PROTOTYPES {
            assert!(!phrases.is_empty());
        }
    }
}
