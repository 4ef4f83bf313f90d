//! Audio ingestion: sources, windowing, live capture.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod chunker;
pub mod source;
pub mod wav;

#[cfg(feature = "cpal-audio")]
pub use capture::{CpalAudioSource, list_devices};
pub use chunker::AudioChunker;
pub use source::{AudioSource, MockAudioSource};
pub use wav::{WavFileSource, generate_dummy_wav};
