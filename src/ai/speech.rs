//! Speech playback for synthesized replies.
//!
//! The provider returns raw little-endian 16-bit mono PCM at 24 kHz. It is
//! converted to `f32` samples and handed to an [`AudioOutput`].

use super::error::AIError;
use thiserror::Error;

pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
pub const SPEECH_CHANNELS: u16 = 1;

/// Decoded audio ready for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("audio playback is not available in this build")]
    Unavailable,
    #[error("audio device error: {0}")]
    Device(String),
}

/// Host audio sink.
pub trait AudioOutput: Send + Sync {
    /// Start playing `clip`. Implementations return without waiting for the
    /// clip to finish.
    fn play(&self, clip: PcmClip) -> Result<(), PlaybackError>;
}

/// Why a speech request produced no sound.
#[derive(Debug, Error)]
pub(crate) enum SpeechError {
    #[error("speech request failed: {0}")]
    Provider(#[from] AIError),
    #[error("response carried no audio")]
    NoAudio,
    #[error("invalid base64 audio: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Pcm(#[from] PcmError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("PCM payload has odd length {0}")]
pub struct PcmError(pub usize);

/// Convert little-endian signed 16-bit PCM into samples in [-1, 1].
pub fn pcm16_to_f32(bytes: &[u8]) -> Result<Vec<f32>, PcmError> {
    if bytes.len() % 2 != 0 {
        return Err(PcmError(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect())
}

// ============================================
// Outputs
// ============================================

/// Output used when the crate is built without the `playback` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn play(&self, _clip: PcmClip) -> Result<(), PlaybackError> {
        Err(PlaybackError::Unavailable)
    }
}

#[cfg(feature = "playback")]
pub use rodio_output::RodioOutput;

#[cfg(feature = "playback")]
mod rodio_output {
    use super::{AudioOutput, PcmClip, PlaybackError};
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, Sink};

    /// Plays clips on the default output device.
    ///
    /// The device stream is not `Send`, so each clip gets its own thread that
    /// owns the stream until playback ends.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct RodioOutput;

    impl AudioOutput for RodioOutput {
        fn play(&self, clip: PcmClip) -> Result<(), PlaybackError> {
            std::thread::Builder::new()
                .name("speech-playback".to_string())
                .spawn(move || {
                    let (_stream, handle) = match OutputStream::try_default() {
                        Ok(pair) => pair,
                        Err(err) => {
                            tracing::warn!("no audio output device: {err}");
                            return;
                        }
                    };
                    let sink = match Sink::try_new(&handle) {
                        Ok(sink) => sink,
                        Err(err) => {
                            tracing::warn!("failed to open audio sink: {err}");
                            return;
                        }
                    };
                    sink.append(SamplesBuffer::new(
                        clip.channels,
                        clip.sample_rate,
                        clip.samples,
                    ));
                    sink.sleep_until_end();
                })
                .map(|_| ())
                .map_err(|err| PlaybackError::Device(err.to_string()))
        }
    }
}

pub fn default_output() -> Box<dyn AudioOutput> {
    #[cfg(feature = "playback")]
    {
        Box::new(RodioOutput)
    }
    #[cfg(not(feature = "playback"))]
    {
        Box::new(NullOutput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_extremes_and_zero() {
        let bytes = [
            0x00, 0x00, // 0
            0xFF, 0x7F, // i16::MAX
            0x00, 0x80, // i16::MIN
            0x00, 0x40, // 16384
        ];
        let samples = pcm16_to_f32(&bytes).unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0.0);
        assert!((samples[1] - 32767.0 / 32768.0).abs() < f32::EPSILON);
        assert_eq!(samples[2], -1.0);
        assert_eq!(samples[3], 0.5);
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn odd_length_is_rejected() {
        assert_eq!(pcm16_to_f32(&[0x01, 0x02, 0x03]), Err(PcmError(3)));
        assert_eq!(pcm16_to_f32(&[]), Ok(vec![]));
    }

    #[test]
    fn null_output_reports_unavailable() {
        let clip = PcmClip {
            samples: vec![0.0],
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: SPEECH_CHANNELS,
        };
        assert_eq!(NullOutput.play(clip), Err(PlaybackError::Unavailable));
    }
}
