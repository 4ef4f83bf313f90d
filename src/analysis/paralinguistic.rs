//! Acoustic stress-feature extraction.
//!
//! Pulls prosody indicators (pitch, loudness, jitter, shimmer) from a raw
//! audio window, independent of whether the recognizer produced any text.
//! Elevated pitch instability and micro-tremor correlate with vocal stress
//! and with synthesized voices.

use crate::types::{AudioChunk, ParalinguisticFeatures};

/// Voiced pitch search band in Hz. Covers low male through high female
/// speaking voices; anything outside is treated as unvoiced.
const PITCH_MIN_HZ: f32 = 55.0;
const PITCH_MAX_HZ: f32 = 400.0;

/// Analysis frame length / hop in milliseconds.
const FRAME_MS: u32 = 40;
const HOP_MS: u32 = 20;

/// Frames quieter than this RMS carry no usable pitch.
const VOICING_RMS_FLOOR: f32 = 0.01;

/// Minimum normalized autocorrelation peak for a frame to count as voiced.
const VOICING_CORR_FLOOR: f32 = 0.30;

/// Extraction strategy: full DSP path or a degraded stub.
///
/// Selected once at construction. The degraded variant exists so the
/// pipeline keeps its shape when prosody analysis is switched off, and so
/// tests can exercise the no-signal path.
enum Extractor {
    Enabled,
    Disabled,
}

/// Analyzes audio windows for non-verbal stress cues.
pub struct ParalinguisticAnalyzer {
    extractor: Extractor,
}

impl ParalinguisticAnalyzer {
    /// Create an analyzer with the full extraction path.
    pub fn new() -> Self {
        Self {
            extractor: Extractor::Enabled,
        }
    }

    /// Create a degraded analyzer that always reports no stress signal.
    pub fn disabled() -> Self {
        Self {
            extractor: Extractor::Disabled,
        }
    }

    /// Extract features from one audio window.
    ///
    /// Never fails: an empty chunk, a disabled extractor, or any extraction
    /// problem degrades to all-zero features, which downstream scoring reads
    /// as "no stress signal".
    pub fn analyze(&self, chunk: &AudioChunk) -> ParalinguisticFeatures {
        match self.extractor {
            Extractor::Disabled => ParalinguisticFeatures::default(),
            Extractor::Enabled => {
                if chunk.is_empty() || chunk.sample_rate == 0 {
                    return ParalinguisticFeatures::default();
                }
                extract(&chunk.samples, chunk.sample_rate)
                    .unwrap_or_default()
            }
        }
    }
}

impl Default for ParalinguisticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert i16 audio samples to f32 normalized to [-1.0, 1.0].
fn normalize(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&sample| sample as f32 / 32768.0)
        .collect()
}

/// Root mean square of normalized samples.
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    ((sum_squares / samples.len() as f64).sqrt()) as f32
}

/// Pitch period estimate for one frame via normalized autocorrelation.
///
/// Returns (period in samples, peak correlation) or None for unvoiced frames.
fn frame_period(frame: &[f32], sample_rate: u32) -> Option<(f32, f32)> {
    let min_lag = (sample_rate as f32 / PITCH_MAX_HZ).floor() as usize;
    let max_lag = (sample_rate as f32 / PITCH_MIN_HZ).ceil() as usize;
    if min_lag < 1 || max_lag >= frame.len() {
        return None;
    }

    let energy: f32 = frame.iter().map(|&s| s * s).sum();
    if energy <= f32::EPSILON {
        return None;
    }

    let mut best_lag = 0usize;
    let mut best_corr = 0.0f32;
    for lag in min_lag..=max_lag {
        let mut corr = 0.0f32;
        for i in 0..frame.len() - lag {
            corr += frame[i] * frame[i + lag];
        }
        let corr = corr / energy;
        if corr > best_corr {
            best_corr = corr;
            best_lag = lag;
        }
    }

    if best_corr < VOICING_CORR_FLOOR || best_lag == 0 {
        return None;
    }

    // Parabolic interpolation around the peak would refine this; period
    // deltas across frames dominate jitter anyway, so the integer lag is
    // accurate enough at 16kHz.
    Some((best_lag as f32, best_corr))
}

/// Full extraction over one window.
fn extract(samples: &[i16], sample_rate: u32) -> Option<ParalinguisticFeatures> {
    let audio = normalize(samples);

    let frame_len = (sample_rate * FRAME_MS / 1000) as usize;
    let hop = (sample_rate * HOP_MS / 1000) as usize;
    if frame_len == 0 || hop == 0 || audio.len() < frame_len {
        return None;
    }

    let intensity_mean = rms(&audio);

    let mut periods: Vec<f32> = Vec::new();
    let mut peaks: Vec<f32> = Vec::new();

    let mut start = 0usize;
    while start + frame_len <= audio.len() {
        let frame = &audio[start..start + frame_len];
        if rms(frame) >= VOICING_RMS_FLOOR
            && let Some((period, _)) = frame_period(frame, sample_rate)
        {
            periods.push(period);
            let peak = frame.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
            peaks.push(peak);
        }
        start += hop;
    }

    if periods.is_empty() {
        // No voiced frames: loudness is still meaningful, pitch is not.
        return Some(ParalinguisticFeatures {
            intensity_mean,
            ..ParalinguisticFeatures::default()
        });
    }

    let pitches: Vec<f32> = periods.iter().map(|&p| sample_rate as f32 / p).collect();
    let pitch_mean = mean(&pitches);
    let pitch_variance = if pitch_mean > 0.0 {
        stddev(&pitches, pitch_mean) / pitch_mean
    } else {
        0.0
    };

    let jitter = relative_perturbation(&periods);
    let shimmer = relative_perturbation(&peaks);

    Some(ParalinguisticFeatures {
        pitch_mean,
        pitch_variance,
        intensity_mean,
        // Syllable-rate estimation needs longer context than one window.
        speaking_rate: 0.0,
        jitter,
        shimmer,
    })
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn stddev(values: &[f32], mean: f32) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let var = values.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>()
        / (values.len() - 1) as f32;
    var.sqrt()
}

/// Mean absolute consecutive difference, relative to the mean value.
///
/// Applied to pitch periods this is relative jitter; applied to cycle peak
/// amplitudes it is relative shimmer.
fn relative_perturbation(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    if m <= f32::EPSILON {
        return 0.0;
    }
    let delta_sum: f32 = values.windows(2).map(|w| (w[0] - w[1]).abs()).sum();
    (delta_sum / (values.len() - 1) as f32) / m
}
