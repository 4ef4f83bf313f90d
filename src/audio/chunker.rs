//! Splits an audio source into fixed-duration windows for analysis.
//!
//! For pre-recorded sources the chunker sleeps for each window's real audio
//! duration after yielding it, so downstream stages observe data at the pace
//! a live call would deliver it. Live sources pace themselves by blocking on
//! hardware reads.

use crate::audio::source::AudioSource;
use crate::types::AudioChunk;
use std::time::Duration;

/// Lazy, ordered sequence of [`AudioChunk`]s over an audio source.
///
/// The sequence is finite for file sources (ends at EOF) and unbounded for
/// live capture (ends when the stream closes). Chunk duration is derived
/// from the actual sample count of each window, so a short final window
/// carries its true length.
pub struct AudioChunker {
    source: Box<dyn AudioSource>,
    pace_playback: bool,
    started: bool,
    finished: bool,
}

impl AudioChunker {
    /// Wraps a source, pacing playback if the source asks for it.
    pub fn new(source: Box<dyn AudioSource>) -> Self {
        let pace_playback = source.is_paced();
        Self {
            source,
            pace_playback,
            started: false,
            finished: false,
        }
    }

    /// Disable real-time pacing (tests and benchmarks want full speed).
    pub fn without_pacing(mut self) -> Self {
        self.pace_playback = false;
        self
    }

    fn sleep_for(duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl Iterator for AudioChunker {
    type Item = AudioChunk;

    fn next(&mut self) -> Option<AudioChunk> {
        if self.finished {
            return None;
        }

        if !self.started {
            if let Err(e) = self.source.start() {
                eprintln!("callwarden: audio source failed to start: {e}");
                self.finished = true;
                return None;
            }
            self.started = true;
        }

        let samples = match self.source.read_samples() {
            Ok(samples) => samples,
            Err(e) => {
                // Source exhaustion and hard read failures both end the
                // sequence cleanly; already-yielded chunks stay valid.
                eprintln!("callwarden: audio source read failed: {e}");
                self.finished = true;
                let _ = self.source.stop();
                return None;
            }
        };

        if samples.is_empty() {
            self.finished = true;
            let _ = self.source.stop();
            return None;
        }

        let chunk = AudioChunk::new(samples, self.source.sample_rate());

        if self.pace_playback {
            Self::sleep_for(chunk.duration);
        }

        Some(chunk)
    }
}
