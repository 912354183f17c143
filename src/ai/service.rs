use super::backend::{GeminiBackend, GenerativeBackend};
use super::error::{AIError, ServiceError};
use super::media::{MediaFile, image_data_uri};
use super::modes::SessionMode;
use super::session::ChatSession;
use super::speech::{
    AudioOutput, PcmClip, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE, SpeechError, default_output,
    pcm16_to_f32,
};
use super::wire::{Content, GenerateContentRequest, GenerationConfig, Part, SpeechConfig};
use crate::config::{ConfigError, ServiceConfig};
use crate::content::SYSTEM_PROMPT;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use once_cell::sync::OnceCell;

pub const MEDIA_MODEL: &str = "gemini-3-flash-preview";
pub const IMAGE_EDIT_MODEL: &str = "gemini-2.5-flash-image";
pub const SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const SPEECH_VOICE: &str = "Kore";

/// Returned by `analyze_media` when the model answers without any text.
pub const ANALYSIS_FALLBACK: &str =
    "I processed the media but couldn't generate a text analysis.";

const TRANSCRIBE_INSTRUCTION: &str = "Transcribe this audio file accurately. If it is in Hindi, Odia or English, transcribe it in its respective script. Do not add any conversational filler, just the transcribed text.";

static GLOBAL: OnceCell<HealthAI> = OnceCell::new();

/// Sole access point to the generative AI provider.
///
/// Build one per process (see [`HealthAI::global`]) and share it by
/// reference; every operation is an independent request.
pub struct HealthAI {
    backend: Box<dyn GenerativeBackend>,
    audio: Box<dyn AudioOutput>,
}

impl HealthAI {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            backend: Box::new(GeminiBackend::new(&config)),
            audio: default_output(),
        }
    }

    /// Use a custom transport and audio sink.
    pub fn with_backend(
        backend: impl GenerativeBackend + 'static,
        audio: impl AudioOutput + 'static,
    ) -> Self {
        Self {
            backend: Box::new(backend),
            audio: Box::new(audio),
        }
    }

    /// Process-wide instance configured from the environment on first use.
    pub fn global() -> Result<&'static HealthAI, ConfigError> {
        GLOBAL.get_or_try_init(|| ServiceConfig::from_env().map(HealthAI::new))
    }

    pub(crate) fn backend(&self) -> &dyn GenerativeBackend {
        self.backend.as_ref()
    }

    /// Start a conversation. Nothing is sent until the first message.
    pub fn create_session(&self, mode: SessionMode) -> ChatSession<'_> {
        ChatSession::new(self, mode)
    }

    /// Speak `text` aloud. Best effort: failures are logged, never returned.
    pub async fn synthesize_speech(&self, text: &str) {
        match self.speak(text).await {
            Ok(()) => tracing::debug!("speech playback started"),
            Err(err) => tracing::warn!("TTS error: {err}"),
        }
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let mut request = GenerateContentRequest::new(vec![Content::user(vec![Part::text(
            format!("Say clearly: {text}"),
        )])]);
        request.generation_config = Some(GenerationConfig {
            response_modalities: vec!["AUDIO".to_string()],
            speech_config: Some(SpeechConfig::prebuilt(SPEECH_VOICE)),
            ..GenerationConfig::default()
        });

        let response = self
            .backend
            .generate(SPEECH_MODEL, &request)
            .await
            .map_err(AIError::from)?;
        let audio = response.first_inline_data().ok_or(SpeechError::NoAudio)?;
        let bytes = BASE64.decode(audio.data.as_bytes())?;
        let samples = pcm16_to_f32(&bytes)?;

        self.audio.play(PcmClip {
            samples,
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: SPEECH_CHANNELS,
        })?;
        Ok(())
    }

    /// Ask the model about an uploaded image, recording or document.
    pub async fn analyze_media(&self, file: &MediaFile, prompt: &str) -> Result<String, AIError> {
        let mut request = GenerateContentRequest::new(vec![Content::user(vec![
            Part::inline(&file.mime_type, file.to_base64()),
            Part::text(prompt),
        ])]);
        request.system_instruction = Some(Content::instruction(SYSTEM_PROMPT));

        let response = self.backend.generate(MEDIA_MODEL, &request).await?;
        let text = response.text();
        if text.is_empty() {
            Ok(ANALYSIS_FALLBACK.to_string())
        } else {
            Ok(text)
        }
    }

    /// Edit a base64 image and return the result as a PNG data URI.
    pub async fn edit_image(
        &self,
        base64: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, ServiceError> {
        let request = GenerateContentRequest::new(vec![Content::user(vec![
            Part::inline(mime_type, base64),
            Part::text(prompt),
        ])]);

        let response = self
            .backend
            .generate(IMAGE_EDIT_MODEL, &request)
            .await
            .map_err(AIError::from)?;

        // TODO: decide whether a reply without an image should be classified
        // like provider failures; callers use ServiceError::into_classified for now.
        response
            .first_inline_data()
            .map(|image| image_data_uri(&image.data))
            .ok_or(ServiceError::NoImageReturned)
    }

    /// Verbatim transcription; empty when the model returns no text.
    pub async fn transcribe_audio(&self, file: &MediaFile) -> Result<String, AIError> {
        let request = GenerateContentRequest::new(vec![Content::user(vec![
            Part::inline(&file.mime_type, file.to_base64()),
            Part::text(TRANSCRIBE_INSTRUCTION),
        ])]);

        let response = self.backend.generate(MEDIA_MODEL, &request).await?;
        Ok(response.text())
    }
}
