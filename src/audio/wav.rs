//! WAV file audio source for call simulation.

use crate::audio::source::AudioSource;
use crate::defaults;
use crate::error::{CallwardenError, Result};
use std::io::Read;
use std::path::Path;

/// Audio source that reads from WAV file data.
///
/// Stereo input is downmixed to mono; the file's sample rate is preserved
/// and carried on every chunk (resampling is the responsibility of whoever
/// recorded the call, not the detector).
pub struct WavFileSource {
    samples: Vec<i16>,
    position: usize,
    chunk_size: usize,
    sample_rate: u32,
}

impl WavFileSource {
    /// Create from any reader (for testing/flexibility).
    ///
    /// # Arguments
    /// * `reader` - WAV data stream
    /// * `chunk_duration_ms` - window size each `read_samples` call returns
    pub fn from_reader(reader: Box<dyn Read + Send>, chunk_duration_ms: u32) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| CallwardenError::AudioCapture {
                message: format!("Failed to parse WAV file: {}", e),
            })?;

        let spec = wav_reader.spec();
        let sample_rate = spec.sample_rate;
        let source_channels = spec.channels;

        let raw_samples: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CallwardenError::AudioCapture {
                message: format!("Failed to read WAV samples: {}", e),
            })?;

        // Convert to mono if stereo
        let samples = if source_channels == 2 {
            raw_samples
                .chunks_exact(2)
                .map(|pair| {
                    let left = pair[0] as i32;
                    let right = pair[1] as i32;
                    ((left + right) / 2) as i16
                })
                .collect()
        } else {
            raw_samples
        };

        let chunk_size = (sample_rate as u64 * chunk_duration_ms as u64 / 1000) as usize;
        if chunk_size == 0 {
            return Err(CallwardenError::AudioCapture {
                message: format!(
                    "Chunk duration {}ms is shorter than one sample at {}Hz",
                    chunk_duration_ms, sample_rate
                ),
            });
        }

        Ok(Self {
            samples,
            position: 0,
            chunk_size,
            sample_rate,
        })
    }

    /// Open a WAV file on disk.
    pub fn open(path: &Path, chunk_duration_ms: u32) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CallwardenError::AudioFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                CallwardenError::Io(e)
            }
        })?;
        Self::from_reader(Box::new(std::io::BufReader::new(file)), chunk_duration_ms)
    }

    /// Consume the source and return all samples as a single buffer.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    /// Total duration of the file in seconds.
    pub fn total_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

impl AudioSource for WavFileSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }

        let end = std::cmp::min(self.position + self.chunk_size, self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(chunk)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_paced(&self) -> bool {
        true
    }
}

/// Write a sine-tone WAV file for demo runs with no input recording.
///
/// 16kHz mono 16-bit, 440Hz at half amplitude.
pub fn generate_dummy_wav(path: &Path, duration_secs: f64) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: defaults::SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| CallwardenError::AudioCapture {
            message: format!("Failed to create WAV file: {}", e),
        })?;

    let n_samples = (defaults::SAMPLE_RATE as f64 * duration_secs) as usize;
    for i in 0..n_samples {
        let t = i as f64 / defaults::SAMPLE_RATE as f64;
        let value = (32767.0 * 0.5 * (2.0 * std::f64::consts::PI * 440.0 * t).sin()) as i16;
        writer
            .write_sample(value)
            .map_err(|e| CallwardenError::AudioCapture {
                message: format!("Failed to write WAV sample: {}", e),
            })?;
    }
    writer
        .finalize()
        .map_err(|e| CallwardenError::AudioCapture {
            message: format!("Failed to finalize WAV file: {}", e),
        })?;
    Ok(())
}
