use super::wire::Tool;
use crate::content::SYSTEM_PROMPT;
use std::fmt;
use std::str::FromStr;

/// Sampling temperature shared by every conversational mode.
pub const CHAT_TEMPERATURE: f32 = 0.7;

/// Reasoning budget, in tokens, for the thinking mode.
pub const THINKING_BUDGET: u32 = 32_768;

/// Preset chosen when a conversation starts; fixed for its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionMode {
    #[default]
    Standard,
    Fast,
    Thinking,
    Maps,
    Search,
}

/// Model and request settings a session sends with every turn.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub model: &'static str,
    pub system_instruction: &'static str,
    pub temperature: f32,
    pub thinking_budget: Option<u32>,
    pub tools: Vec<Tool>,
}

impl SessionMode {
    pub const ALL: [SessionMode; 5] = [
        SessionMode::Standard,
        SessionMode::Fast,
        SessionMode::Thinking,
        SessionMode::Maps,
        SessionMode::Search,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SessionMode::Standard => "standard",
            SessionMode::Fast => "fast",
            SessionMode::Thinking => "thinking",
            SessionMode::Maps => "maps",
            SessionMode::Search => "search",
        }
    }

    /// Mode table: model id, reasoning budget and grounding tool per mode.
    pub fn session_config(self) -> SessionConfig {
        let (model, thinking_budget, tool) = match self {
            SessionMode::Standard => ("gemini-3-flash-preview", None, None),
            SessionMode::Fast => ("gemini-flash-lite-latest", None, None),
            SessionMode::Thinking => ("gemini-3-pro-preview", Some(THINKING_BUDGET), None),
            SessionMode::Maps => ("gemini-2.5-flash", None, Some(Tool::GoogleMaps {})),
            SessionMode::Search => ("gemini-3-flash-preview", None, Some(Tool::GoogleSearch {})),
        };

        SessionConfig {
            model,
            system_instruction: SYSTEM_PROMPT,
            temperature: CHAT_TEMPERATURE,
            thinking_budget,
            tools: tool.into_iter().collect(),
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown session mode '{0}' (expected standard, fast, thinking, maps or search)")]
pub struct UnknownMode(pub String);

impl FromStr for SessionMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SessionMode::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}
