//! Live audio capture using CPAL (Cross-Platform Audio Library).

use crate::audio::source::AudioSource;
use crate::defaults;
use crate::error::{CallwardenError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Preferred device names for desktop PipeWire environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for voice input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

/// Capture channel capacity in callback blocks. A full channel means the
/// reader fell behind real time; new blocks are dropped with a warning.
const CHANNEL_CAPACITY: usize = 512;

fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List all available audio input devices with filtering and recommendations.
///
/// # Returns
/// A vector of device names, with preferred devices marked with "\[recommended\]".
/// Filters out obviously unusable devices (surround channels, HDMI, etc.).
///
/// # Errors
/// Returns `CallwardenError::AudioCapture` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| CallwardenError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }

            if is_preferred_device(&name) {
                device_names.push(format!("{} [recommended]", name));
            } else {
                device_names.push(name);
            }
        }
    }

    Ok(device_names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name()
                    && is_preferred_device(&name)
                {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| CallwardenError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is owned by CpalAudioSource and only touched from the
/// thread driving the chunker; stream methods are called synchronously and
/// never cross thread boundaries.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Live capture source producing fixed-size windows of 16kHz mono PCM.
///
/// The capture callback pushes blocks into a bounded channel; `read_samples`
/// drains it until one full window is assembled. A full channel (reader
/// slower than real time) drops the block and surfaces a warning; capture
/// never stops on overflow. Stream closure ends the sequence cleanly.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Option<SendableStream>,
    block_tx: Sender<Vec<i16>>,
    block_rx: Receiver<Vec<i16>>,
    pending: Vec<i16>,
    overflowed: Arc<AtomicBool>,
    stream_failed: Arc<AtomicBool>,
    sample_rate: u32,
    window_size: usize,
}

impl CpalAudioSource {
    /// Create a new CPAL audio source.
    ///
    /// # Arguments
    /// * `device_name` - Optional device name. If None, uses the default input device.
    /// * `chunk_duration_ms` - window size each `read_samples` call returns
    ///
    /// # Errors
    /// Returns errors if the device is not found or its configuration fails.
    pub fn new(device_name: Option<&str>, chunk_duration_ms: u32) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = device_name {
                let devices = host
                    .input_devices()
                    .map_err(|e| CallwardenError::AudioCapture {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                let mut found_device = None;
                for dev in devices {
                    if let Ok(dev_name) = dev.name()
                        && dev_name == name
                    {
                        found_device = Some(dev);
                        break;
                    }
                }

                found_device.ok_or_else(|| CallwardenError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })?;

        let sample_rate = defaults::SAMPLE_RATE;
        let window_size = (sample_rate as u64 * chunk_duration_ms as u64 / 1000) as usize;
        if window_size == 0 {
            return Err(CallwardenError::AudioCapture {
                message: format!(
                    "Chunk duration {}ms yields an empty window",
                    chunk_duration_ms
                ),
            });
        }

        let (block_tx, block_rx) = bounded(CHANNEL_CAPACITY);

        Ok(Self {
            device,
            stream: None,
            block_tx,
            block_rx,
            pending: Vec::new(),
            overflowed: Arc::new(AtomicBool::new(false)),
            stream_failed: Arc::new(AtomicBool::new(false)),
            sample_rate,
            window_size,
        })
    }

    /// Build the capture stream.
    ///
    /// Tries i16/16kHz/mono first (zero-copy with PipeWire/PulseAudio, which
    /// convert transparently), then f32/16kHz/mono for devices that only
    /// expose float formats.
    fn build_stream(&self) -> Result<cpal::Stream> {
        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let make_err_callback = |failed: Arc<AtomicBool>| {
            move |err: cpal::StreamError| {
                eprintln!("callwarden: audio stream error: {}", err);
                failed.store(true, Ordering::SeqCst);
            }
        };

        let tx = self.block_tx.clone();
        let overflowed = Arc::clone(&self.overflowed);
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Err(TrySendError::Full(_)) = tx.try_send(data.to_vec()) {
                    overflowed.store(true, Ordering::SeqCst);
                }
            },
            make_err_callback(Arc::clone(&self.stream_failed)),
            None,
        ) {
            return Ok(stream);
        }

        let tx = self.block_tx.clone();
        let overflowed = Arc::clone(&self.overflowed);
        self.device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    if let Err(TrySendError::Full(_)) = tx.try_send(converted) {
                        overflowed.store(true, Ordering::SeqCst);
                    }
                },
                make_err_callback(Arc::clone(&self.stream_failed)),
                None,
            )
            .map_err(|e| CallwardenError::AudioCapture {
                message: format!("Failed to build 16kHz mono input stream: {}", e),
            })
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        let stream = self.build_stream()?;
        stream.play().map_err(|e| CallwardenError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;
        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        // Dropping the stream stops capture and disconnects the callback's
        // sender half.
        self.stream = None;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        loop {
            if self.overflowed.swap(false, Ordering::SeqCst) {
                eprintln!("callwarden: audio buffer overflow, dropping samples");
            }

            if self.pending.len() >= self.window_size {
                let rest = self.pending.split_off(self.window_size);
                let window = std::mem::replace(&mut self.pending, rest);
                return Ok(window);
            }

            if self.stream.is_none() || self.stream_failed.load(Ordering::SeqCst) {
                // Stream gone: hand back whatever is buffered, then end.
                return Ok(std::mem::take(&mut self.pending));
            }

            match self.block_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(block) => self.pending.extend_from_slice(&block),
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    return Ok(std::mem::take(&mut self.pending));
                }
            }
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_surround_and_hdmi_devices() {
        assert!(should_filter_device("surround21:CARD=PCH"));
        assert!(should_filter_device("HDMI Output"));
        assert!(should_filter_device("front:CARD=PCH,DEV=0"));
        assert!(!should_filter_device("pipewire"));
        assert!(!should_filter_device("USB Microphone"));
    }

    #[test]
    fn prefers_pipewire_and_pulse() {
        assert!(is_preferred_device("pipewire"));
        assert!(is_preferred_device("pulse"));
        assert!(is_preferred_device("PulseAudio Sound Server"));
        assert!(!is_preferred_device("hw:CARD=PCH,DEV=0"));
    }

    #[test]
    fn suppressed_stderr_returns_closure_value() {
        let value = with_suppressed_stderr(|| 41 + 1);
        assert_eq!(value, 42);
    }
}
