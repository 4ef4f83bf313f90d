//! Detection pipeline that runs from call start until the source ends.
//!
//! Owns the per-call state and drives each audio window through the stages
//! in fixed order: recognition, prosody extraction, and, only when a
//! transcript was produced, intent classification, sequencing, scoring and
//! the escalation check. Single-threaded and pull-based: no stage overlaps
//! another within a call.

use crate::analysis::{ParalinguisticAnalyzer, SemanticAnalyzer};
use crate::asr::{Language, MockRecognizer, Recognizer, RecognizerConfig, build_recognizer};
use crate::audio::AudioChunker;
use crate::audio::wav::WavFileSource;
use crate::defaults;
use crate::detect::{BehavioralSequencer, FraudRiskScorer, HoneypotAgent};
use crate::error::Result;
use crate::output::{PipelineEvent, render_event};
use crate::types::{AudioChunk, CallPhase, CallState, RiskScore, TranscriptSegment};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Configuration for pipeline construction.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Skip the offline engine and use the mock recognizer.
    pub use_mock_recognizer: bool,
    /// Recognition language (en, hi, or dual-engine mix).
    pub language: Language,
    /// Directory holding offline model directories.
    pub model_dir: PathBuf,
    /// Analysis window duration in milliseconds.
    pub chunk_duration_ms: u32,
    /// Capture device name for live runs (None = default input).
    pub device: Option<String>,
    /// Persona the honeypot agent plays once escalated.
    pub persona: String,
    /// Extract prosody features (disable to benchmark recognition alone).
    pub prosody_enabled: bool,
    /// Substitute the mock when the offline engine cannot be constructed.
    /// When false, a missing model is a hard construction failure.
    pub allow_mock_fallback: bool,
    /// Suppress event rendering.
    pub quiet: bool,
    /// Verbosity level (1 = per-chunk latency).
    pub verbosity: u8,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            use_mock_recognizer: false,
            language: Language::English,
            model_dir: PathBuf::from(defaults::MODEL_DIR),
            chunk_duration_ms: defaults::CHUNK_DURATION_MS,
            device: None,
            persona: defaults::HONEYPOT_PERSONA.to_string(),
            prosody_enabled: true,
            allow_mock_fallback: true,
            quiet: false,
            verbosity: 0,
        }
    }
}

/// Orchestrates the real-time detection flow for one call.
///
/// Data flow per chunk:
/// audio → recognizer + prosody → intent → sequencer → scorer → escalation.
///
/// The pipeline is the sole owner of [`CallState`]; the sequencer and scorer
/// only touch it through the sequential per-chunk processing here.
pub struct DetectionPipeline {
    options: PipelineOptions,
    call_state: CallState,
    recognizer: Box<dyn Recognizer>,
    para_analyzer: ParalinguisticAnalyzer,
    sem_analyzer: SemanticAnalyzer,
    sequencer: BehavioralSequencer,
    scorer: FraudRiskScorer,
    honeypot: HoneypotAgent,
    chunks_processed: usize,
    escalation_chunk: Option<usize>,
}

impl DetectionPipeline {
    /// Construct a pipeline, probing capabilities once.
    ///
    /// An offline engine that fails to construct (missing model files,
    /// build without the `vosk` feature) is replaced by the mock recognizer
    /// when `allow_mock_fallback` is set; otherwise the error propagates.
    /// A failed embedding backend always degrades to keyword matching.
    pub fn new(options: PipelineOptions) -> Result<Self> {
        let call_state = CallState::new(Uuid::new_v4().to_string());

        let recognizer_config = RecognizerConfig {
            use_mock: options.use_mock_recognizer,
            language: options.language,
            model_dir: options.model_dir.clone(),
        };
        let recognizer: Box<dyn Recognizer> = match build_recognizer(&recognizer_config) {
            Ok(recognizer) => recognizer,
            Err(e) if options.allow_mock_fallback => {
                if !options.quiet {
                    render_event(&PipelineEvent::Degraded {
                        component: "recognizer",
                        reason: e.to_string(),
                    });
                }
                Box::new(MockRecognizer::new())
            }
            Err(e) => return Err(e),
        };

        let sem_analyzer = Self::build_semantic_analyzer(&options);

        let para_analyzer = if options.prosody_enabled {
            ParalinguisticAnalyzer::new()
        } else {
            ParalinguisticAnalyzer::disabled()
        };

        let honeypot = HoneypotAgent::with_persona(&options.persona);

        if !options.quiet {
            render_event(&PipelineEvent::Initialized {
                engine: recognizer.engine_name().to_string(),
                call_id: call_state.call_id.clone(),
            });
        }

        Ok(Self {
            options,
            call_state,
            recognizer,
            para_analyzer,
            sem_analyzer,
            sequencer: BehavioralSequencer::new(),
            scorer: FraudRiskScorer::new(),
            honeypot,
            chunks_processed: 0,
            escalation_chunk: None,
        })
    }

    #[cfg(feature = "embeddings")]
    fn build_semantic_analyzer(options: &PipelineOptions) -> SemanticAnalyzer {
        use crate::analysis::CandleSentenceEncoder;

        match CandleSentenceEncoder::load_default()
            .and_then(|encoder| SemanticAnalyzer::with_encoder(Box::new(encoder)))
        {
            Ok(analyzer) => analyzer,
            Err(e) => {
                if !options.quiet {
                    render_event(&PipelineEvent::Degraded {
                        component: "semantic analyzer",
                        reason: e.to_string(),
                    });
                }
                SemanticAnalyzer::new()
            }
        }
    }

    #[cfg(not(feature = "embeddings"))]
    fn build_semantic_analyzer(_options: &PipelineOptions) -> SemanticAnalyzer {
        SemanticAnalyzer::new()
    }

    /// Run the pipeline over a WAV file, paced to real time, to completion.
    pub fn process_file_simulation(&mut self, path: &Path) -> Result<()> {
        let source = WavFileSource::open(path, self.options.chunk_duration_ms)?;
        let chunker = AudioChunker::new(Box::new(source));
        self.run(chunker);
        Ok(())
    }

    /// Run the pipeline over a WAV file at full speed (tests, benchmarks).
    pub fn process_file_unpaced(&mut self, path: &Path) -> Result<()> {
        let source = WavFileSource::open(path, self.options.chunk_duration_ms)?;
        let chunker = AudioChunker::new(Box::new(source)).without_pacing();
        self.run(chunker);
        Ok(())
    }

    /// Run the pipeline over live microphone input until the stream ends.
    #[cfg(feature = "cpal-audio")]
    pub fn process_microphone_simulation(&mut self) -> Result<()> {
        use crate::audio::CpalAudioSource;

        let source = CpalAudioSource::new(
            self.options.device.as_deref(),
            self.options.chunk_duration_ms,
        )?;
        let chunker = AudioChunker::new(Box::new(source));
        self.run(chunker);
        Ok(())
    }

    fn run(&mut self, chunker: AudioChunker) {
        for chunk in chunker {
            self.process_chunk(&chunk);
        }
        self.call_state.is_active = false;
    }

    /// Drive one audio window through the detection stages.
    ///
    /// Recognition and prosody extraction always run; intent, sequencing,
    /// scoring and the escalation check run only when a transcript was
    /// produced. A chunk with no transcript contributes nothing to risk.
    pub fn process_chunk(&mut self, chunk: &AudioChunk) {
        let started = Instant::now();
        self.chunks_processed += 1;

        let transcript = match self.recognizer.process_chunk(chunk) {
            Ok(transcript) => transcript,
            Err(e) => {
                // Per-chunk recognition failures degrade to "no transcript";
                // the call loop must survive one bad window.
                eprintln!("callwarden: recognition failed for chunk: {e}");
                None
            }
        };

        let features = self.para_analyzer.analyze(chunk);

        if let Some(segment) = transcript {
            self.emit(PipelineEvent::Transcript {
                text: segment.text.clone(),
                confidence: segment.confidence,
                is_final: segment.is_final,
            });

            let intent = self.sem_analyzer.analyze(&segment.text);
            self.emit(PipelineEvent::Intent {
                label: intent.label,
                confidence: intent.confidence,
            });

            if segment.is_final {
                self.call_state.transcript_history.push(segment);
            }

            let previous_phase = self.call_state.current_phase;
            let new_phase = self.sequencer.update_state(&mut self.call_state, &intent);
            if new_phase != previous_phase {
                self.emit(PipelineEvent::PhaseChange {
                    from: previous_phase.to_string(),
                    to: new_phase.to_string(),
                });
            }

            let risk = self
                .scorer
                .calculate_score(&self.call_state, &features, &intent);
            self.emit(PipelineEvent::Risk {
                score: risk.score,
                level: risk.level,
                triggers: risk.trigger_factors.clone(),
            });

            let escalation_worthy = risk.level.is_escalation_worthy();
            self.call_state.risk_history.push(risk);

            if escalation_worthy && self.honeypot.activate(&self.call_state) {
                self.escalation_chunk = Some(self.chunks_processed);
                self.emit(PipelineEvent::HoneypotActivated {
                    call_id: self.call_state.call_id.clone(),
                    persona: self.honeypot.persona().to_string(),
                });
            }
        }

        if self.options.verbosity >= 1 {
            self.emit(PipelineEvent::ChunkLatency {
                millis: started.elapsed().as_millis(),
            });
        }
    }

    fn emit(&self, event: PipelineEvent) {
        if !self.options.quiet {
            render_event(&event);
        }
    }

    /// Unique identifier of this call.
    pub fn call_id(&self) -> &str {
        &self.call_state.call_id
    }

    /// Current position in the scam script.
    pub fn current_phase(&self) -> CallPhase {
        self.call_state.current_phase
    }

    /// All risk assessments so far, oldest first.
    pub fn risk_history(&self) -> &[RiskScore] {
        &self.call_state.risk_history
    }

    /// Final transcript segments so far, oldest first.
    pub fn transcript_history(&self) -> &[TranscriptSegment] {
        &self.call_state.transcript_history
    }

    /// Whether the honeypot agent controls the call.
    pub fn is_escalated(&self) -> bool {
        self.honeypot.is_active()
    }

    /// 1-based index of the chunk that tripped the escalation gate, if any.
    pub fn escalation_chunk(&self) -> Option<usize> {
        self.escalation_chunk
    }

    /// Number of audio windows processed.
    pub fn chunks_processed(&self) -> usize {
        self.chunks_processed
    }

    /// Name of the active recognition engine.
    pub fn engine_name(&self) -> &str {
        self.recognizer.engine_name()
    }

    /// Swap the recognizer (scripted runs in tests and benchmarks).
    #[doc(hidden)]
    pub fn set_recognizer(&mut self, recognizer: Box<dyn Recognizer>) {
        self.recognizer = recognizer;
    }

    /// Swap the semantic analyzer (stub encoders in tests).
    #[doc(hidden)]
    pub fn set_semantic_analyzer(&mut self, analyzer: SemanticAnalyzer) {
        self.sem_analyzer = analyzer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskLevel;

    fn quiet_options() -> PipelineOptions {
        PipelineOptions {
            use_mock_recognizer: true,
            quiet: true,
            ..PipelineOptions::default()
        }
    }

    fn silent_chunk() -> AudioChunk {
        AudioChunk::new(vec![0i16; 16000], 16000)
    }

    fn pipeline_with_script(lines: Vec<&str>) -> DetectionPipeline {
        let mut pipeline = DetectionPipeline::new(quiet_options()).unwrap();
        pipeline.set_recognizer(Box::new(MockRecognizer::with_script(lines)));
        pipeline
    }

    #[test]
    fn construction_with_mock_recognizer() {
        let pipeline = DetectionPipeline::new(quiet_options()).unwrap();
        assert_eq!(pipeline.engine_name(), "mock");
        assert_eq!(pipeline.current_phase(), CallPhase::Start);
        assert!(!pipeline.is_escalated());
        assert!(!pipeline.call_id().is_empty());
    }

    #[test]
    fn missing_model_falls_back_to_mock() {
        let options = PipelineOptions {
            use_mock_recognizer: false,
            model_dir: PathBuf::from("/nonexistent/models"),
            quiet: true,
            ..PipelineOptions::default()
        };
        let pipeline = DetectionPipeline::new(options).unwrap();
        assert_eq!(pipeline.engine_name(), "mock");
    }

    #[test]
    fn missing_model_without_fallback_is_error() {
        let options = PipelineOptions {
            use_mock_recognizer: false,
            model_dir: PathBuf::from("/nonexistent/models"),
            allow_mock_fallback: false,
            quiet: true,
            ..PipelineOptions::default()
        };
        assert!(DetectionPipeline::new(options).is_err());
    }

    #[test]
    fn transcriptless_chunk_contributes_nothing_to_risk() {
        let mut pipeline = pipeline_with_script(vec![]);
        pipeline.process_chunk(&silent_chunk());
        pipeline.process_chunk(&silent_chunk());

        assert_eq!(pipeline.chunks_processed(), 2);
        assert!(pipeline.risk_history().is_empty());
        assert_eq!(pipeline.current_phase(), CallPhase::Start);
    }

    #[test]
    fn scripted_call_escalates_exactly_once() {
        let mut pipeline = pipeline_with_script(vec![
            "Hello good morning sir",
            "This is the bank security department your account has been compromised",
            "You must buy a gift card right away",
            "Buy a gift card again I said",
        ]);

        for _ in 0..4 {
            pipeline.process_chunk(&silent_chunk());
        }

        assert!(pipeline.is_escalated());
        let escalated_at = pipeline.escalation_chunk().unwrap();
        // Later HIGH/CRITICAL scores must not move the latch.
        assert!(escalated_at <= 4);
        assert_eq!(pipeline.risk_history().len(), 4);
        assert_eq!(pipeline.escalation_chunk(), Some(escalated_at));
    }

    #[test]
    fn final_transcripts_accumulate_in_history() {
        let mut pipeline =
            pipeline_with_script(vec!["Hello there my friend", "How are you today"]);
        pipeline.process_chunk(&silent_chunk());
        pipeline.process_chunk(&silent_chunk());
        pipeline.process_chunk(&silent_chunk());

        let texts: Vec<&str> = pipeline
            .transcript_history()
            .iter()
            .map(|seg| seg.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Hello there my friend", "How are you today"]);
    }

    #[test]
    fn risk_history_is_append_only_and_ordered() {
        let mut pipeline = pipeline_with_script(vec![
            "Hello good morning sir",
            "This is the bank security department calling you",
        ]);
        pipeline.process_chunk(&silent_chunk());
        let after_first = pipeline.risk_history().len();
        pipeline.process_chunk(&silent_chunk());

        assert_eq!(after_first, 1);
        assert_eq!(pipeline.risk_history().len(), 2);
        // Authority after greeting scores strictly higher than the greeting.
        assert!(pipeline.risk_history()[1].score > pipeline.risk_history()[0].score);
    }

    #[test]
    fn phase_is_monotonic_across_chunks() {
        let mut pipeline = pipeline_with_script(vec![
            "You must act immediately do not hang up",
            "Hello good morning sir",
            "This is the bank security department calling",
        ]);

        let mut last_index = pipeline.current_phase().index();
        for _ in 0..3 {
            pipeline.process_chunk(&silent_chunk());
            let index = pipeline.current_phase().index();
            assert!(index >= last_index);
            last_index = index;
        }
        assert_eq!(pipeline.current_phase(), CallPhase::Urgency);
    }

    #[test]
    fn payment_demand_late_in_script_reaches_high() {
        let mut pipeline = pipeline_with_script(vec![
            "Hello good morning sir",
            "This is the bank security department your account is suspended",
            "Please pay immediately via wire transfer",
        ]);

        for _ in 0..3 {
            pipeline.process_chunk(&silent_chunk());
        }

        let last = pipeline.risk_history().last().unwrap();
        assert!(last.level >= RiskLevel::High, "got {:?}", last.level);
        assert!(pipeline.is_escalated());
    }
}
