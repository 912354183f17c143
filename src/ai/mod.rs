//! AI module for the health assistant
//!
//! Everything that talks to the generative AI provider lives here. The rest of
//! the application only sees [`HealthAI`], its results, and the classified
//! [`AIError`].
//!
//! # Architecture
//!
//! - `service` - `HealthAI`, the single entry point (chat, speech, media, images, transcription)
//! - `session` - multi-turn conversations bound to a `SessionMode`
//! - `modes` - mode table (model id, reasoning budget, grounding tools)
//! - `error` - error taxonomy and the priority-ordered classifier
//! - `backend` - transport trait and the Gemini REST implementation
//! - `wire` - request and response bodies
//! - `speech` - PCM decoding and audio output
//! - `media` - uploaded files and base64 helpers
//!
//! # Usage
//!
//! ```rust,no_run
//! use swasthya::ai::{HealthAI, SessionMode};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let ai = HealthAI::global()?;
//! let mut chat = ai.create_session(SessionMode::Search);
//! match chat.send_message("How can I prevent dengue?").await {
//!     Ok(reply) => println!("{}", reply.text),
//!     Err(err) if err.is_retryable => println!("{} (try again)", err.message),
//!     Err(err) => println!("{}", err.message),
//! }
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod media;
mod modes;
mod service;
mod session;
mod speech;
pub mod wire;

pub use backend::{GeminiBackend, GenerativeBackend, SseDecoder, SseEvent, parse_sse_data};
pub use error::{AIError, AIErrorKind, ProviderFailure, ServiceError, classify_error};
pub use media::{MediaFile, encode_base64, image_data_uri, mime_type_for_path};
pub use modes::{CHAT_TEMPERATURE, SessionConfig, SessionMode, THINKING_BUDGET, UnknownMode};
pub use service::{
    ANALYSIS_FALLBACK, HealthAI, IMAGE_EDIT_MODEL, MEDIA_MODEL, SPEECH_MODEL, SPEECH_VOICE,
};
pub use session::{ChatReply, ChatSession};
#[cfg(feature = "playback")]
pub use speech::RodioOutput;
pub use speech::{
    AudioOutput, NullOutput, PcmClip, PcmError, PlaybackError, SPEECH_CHANNELS,
    SPEECH_SAMPLE_RATE, pcm16_to_f32,
};
