//! Call-level orchestration of the detection stages.

pub mod orchestrator;

pub use orchestrator::{DetectionPipeline, PipelineOptions};
