//! Player bindings for audio artifacts.
//!
//! The session binds at most one player to the current artifact. The
//! [`PlayerBackend`] seam keeps the state machine independent of how the
//! platform delivers audio; [`CpalBackend`] is the production
//! implementation, decoding the artifact's WAV bytes with `hound` and
//! driving a cpal output stream.

use crate::config::PlaybackConfig;
use crate::error::{Result, TtsError};
use crate::session::artifact::AudioArtifact;
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Creates player bindings for artifacts.
pub trait PlayerBackend {
    /// The binding type produced by [`bind`](PlayerBackend::bind).
    type Player: ArtifactPlayer;

    /// Bind a player to the artifact without starting playback.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be decoded or the output
    /// device rejects the stream.
    fn bind(&self, artifact: &AudioArtifact) -> Result<Self::Player>;
}

/// One player bound to one artifact.
///
/// Pause retains the position; resume continues from it. Dropping the
/// player releases the underlying output stream.
pub trait ArtifactPlayer {
    /// Start playback from the beginning.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream cannot be started.
    fn start(&mut self) -> Result<()>;

    /// Pause playback, retaining the position.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream cannot be paused.
    fn pause(&mut self) -> Result<()>;

    /// Resume playback from the retained position.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream cannot be restarted.
    fn resume(&mut self) -> Result<()>;

    /// Stop playback and release the stream.
    fn stop(&mut self);

    /// Whether playback has consumed all samples.
    fn is_finished(&self) -> bool;
}

/// Player backend producing cpal output streams.
pub struct CpalBackend {
    device: cpal::Device,
}

impl CpalBackend {
    /// Select an output device per the playback config.
    ///
    /// # Errors
    ///
    /// Returns an error if no matching output device is available.
    pub fn new(config: &PlaybackConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = if let Some(ref name) = config.output_device {
            host.output_devices()
                .map_err(|e| TtsError::Audio(format!("cannot enumerate devices: {e}")))?
                .find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == name)
                        .unwrap_or(false)
                })
                .ok_or_else(|| TtsError::Audio(format!("output device '{name}' not found")))?
        } else {
            host.default_output_device()
                .ok_or_else(|| TtsError::Audio("no default output device".into()))?
        };

        let device_name = device
            .description()
            .map(|d| d.name().to_owned())
            .unwrap_or_else(|_| "<unknown>".into());
        info!("using output device: {device_name}");

        Ok(Self { device })
    }
}

impl PlayerBackend for CpalBackend {
    type Player = CpalPlayer;

    fn bind(&self, artifact: &AudioArtifact) -> Result<CpalPlayer> {
        let (samples, sample_rate) = decode_wav(artifact.bytes())?;

        let buffer = Arc::new(Mutex::new(PlaybackBuffer {
            samples,
            position: 0,
            finished: false,
        }));
        let buffer_clone = Arc::clone(&buffer);

        let stream_config = StreamConfig {
            channels: 1,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = self
            .device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    let mut buf = match buffer_clone.lock() {
                        Ok(b) => b,
                        Err(_) => return,
                    };

                    for sample in data.iter_mut() {
                        if buf.position < buf.samples.len() {
                            *sample = buf.samples[buf.position];
                            buf.position += 1;
                        } else {
                            *sample = 0.0;
                            buf.finished = true;
                        }
                    }
                },
                move |err| {
                    error!("audio output stream error: {err}");
                },
                None,
            )
            .map_err(|e| TtsError::Audio(format!("failed to build output stream: {e}")))?;

        // Some hosts start streams eagerly; the binding must stay silent
        // until the session starts it.
        stream
            .pause()
            .map_err(|e| TtsError::Audio(format!("failed to hold output stream: {e}")))?;

        Ok(CpalPlayer {
            stream: Some(stream),
            buffer,
        })
    }
}

/// A cpal output stream bound to one artifact's samples.
pub struct CpalPlayer {
    stream: Option<cpal::Stream>,
    buffer: Arc<Mutex<PlaybackBuffer>>,
}

impl CpalPlayer {
    fn stream(&self) -> Result<&cpal::Stream> {
        self.stream
            .as_ref()
            .ok_or_else(|| TtsError::Audio("player already stopped".into()))
    }
}

impl ArtifactPlayer for CpalPlayer {
    fn start(&mut self) -> Result<()> {
        self.stream()?
            .play()
            .map_err(|e| TtsError::Audio(format!("failed to start output stream: {e}")))
    }

    fn pause(&mut self) -> Result<()> {
        self.stream()?
            .pause()
            .map_err(|e| TtsError::Audio(format!("failed to pause output stream: {e}")))
    }

    fn resume(&mut self) -> Result<()> {
        self.stream()?
            .play()
            .map_err(|e| TtsError::Audio(format!("failed to resume output stream: {e}")))
    }

    fn stop(&mut self) {
        self.stream = None;
    }

    fn is_finished(&self) -> bool {
        self.buffer.lock().map(|b| b.finished).unwrap_or(true)
    }
}

/// Decode WAV bytes into mono f32 samples plus the source sample rate.
///
/// Multi-channel audio is averaged down to mono. Accepts 16-bit and
/// 32-bit integer PCM and 32-bit float.
fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| TtsError::Audio(format!("cannot decode WAV artifact: {e}")))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| TtsError::Audio(format!("cannot read WAV samples: {e}")))?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| f32::from(v) / 32768.0))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| TtsError::Audio(format!("cannot read WAV samples: {e}")))?,
        (hound::SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| TtsError::Audio(format!("cannot read WAV samples: {e}")))?,
        (format, bits) => {
            return Err(TtsError::Audio(format!(
                "unsupported WAV format: {format:?} {bits}-bit"
            )));
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok((samples, spec.sample_rate))
}

/// Internal buffer for tracking playback progress.
struct PlaybackBuffer {
    samples: Vec<f32>,
    position: usize,
    finished: bool,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_mono_int16() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 24_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[0, 16_384, -16_384]);

        let (samples, rate) = decode_wav(&bytes).unwrap();
        assert_eq!(rate, 24_000);
        assert_eq!(samples.len(), 3);
        assert!((samples[1] - 0.5).abs() < 1e-4);
        assert!((samples[2] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn averages_stereo_to_mono() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        // Two frames: (L, R) pairs.
        let bytes = wav_bytes(spec, &[16_384, -16_384, 16_384, 16_384]);

        let (samples, rate) = decode_wav(&bytes).unwrap();
        assert_eq!(rate, 44_100);
        assert_eq!(samples.len(), 2);
        assert!(samples[0].abs() < 1e-4);
        assert!((samples[1] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn rejects_non_wav_bytes() {
        assert!(decode_wav(b"not a wav file").is_err());
    }
}
