use crate::defaults;
use crate::error::{CallwardenError, Result};

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (WAV file, live capture, mock).
/// Each `read_samples` call returns one analysis window's worth of samples;
/// an empty vector signals the source is exhausted.
pub trait AudioSource: Send {
    /// Start producing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop producing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read the next window of audio samples.
    ///
    /// # Returns
    /// 16-bit PCM mono samples; empty when the source is exhausted.
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// Sample rate of the produced audio in Hz.
    fn sample_rate(&self) -> u32;

    /// Whether playback should be paced to real time by the chunker.
    ///
    /// True for pre-recorded sources; live sources pace themselves by
    /// blocking on hardware.
    fn is_paced(&self) -> bool {
        false
    }
}

/// Mock audio source for testing.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    windows: Vec<Vec<i16>>,
    position: usize,
    sample_rate: u32,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a new mock audio source with a single short window.
    pub fn new() -> Self {
        Self {
            is_started: false,
            windows: vec![vec![0i16; 160]],
            position: 0,
            sample_rate: defaults::SAMPLE_RATE,
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the mock to return specific windows in order.
    pub fn with_windows(mut self, windows: Vec<Vec<i16>>) -> Self {
        self.windows = windows;
        self
    }

    /// Configure the mock's sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Check if the audio source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(CallwardenError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(CallwardenError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        if self.position >= self.windows.len() {
            return Ok(Vec::new());
        }
        let window = self.windows[self.position].clone();
        self.position += 1;
        Ok(window)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_yields_windows_in_order_then_empty() {
        let mut source =
            MockAudioSource::new().with_windows(vec![vec![1i16, 2], vec![3i16, 4, 5]]);

        assert_eq!(source.read_samples().unwrap(), vec![1, 2]);
        assert_eq!(source.read_samples().unwrap(), vec![3, 4, 5]);
        assert!(source.read_samples().unwrap().is_empty());
        assert!(source.read_samples().unwrap().is_empty());
    }

    #[test]
    fn mock_start_failure() {
        let mut source = MockAudioSource::new().with_start_failure();
        let result = source.start();
        assert!(result.is_err());
        assert!(!source.is_started());
    }

    #[test]
    fn mock_read_failure() {
        let mut source = MockAudioSource::new().with_read_failure();
        assert!(source.read_samples().is_err());
    }

    #[test]
    fn mock_start_stop_tracks_state() {
        let mut source = MockAudioSource::new();
        source.start().unwrap();
        assert!(source.is_started());
        source.stop().unwrap();
        assert!(!source.is_started());
    }

    #[test]
    fn mock_default_sample_rate() {
        let source = MockAudioSource::new();
        assert_eq!(source.sample_rate(), defaults::SAMPLE_RATE);
        assert!(!source.is_paced());
    }

    #[test]
    fn source_trait_is_object_safe() {
        let source: Box<dyn AudioSource> =
            Box::new(MockAudioSource::new().with_sample_rate(8000));
        assert_eq!(source.sample_rate(), 8000);
    }
}
