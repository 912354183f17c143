use super::error::{AIError, ProviderFailure};
use super::modes::{SessionConfig, SessionMode};
use super::service::HealthAI;
use super::wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, GroundingSource,
    Part, ThinkingConfig,
};

/// A model reply and the sources it was grounded on, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

impl ChatReply {
    fn absorb(&mut self, chunk: &GenerateContentResponse) -> String {
        let piece = chunk.text();
        self.text.push_str(&piece);
        for source in chunk.grounding_sources() {
            if !self.sources.iter().any(|known| known.uri == source.uri) {
                self.sources.push(source.clone());
            }
        }
        piece
    }
}

/// Multi-turn conversation with a fixed mode.
///
/// History is kept here and resent with each turn; a failed turn leaves it
/// untouched.
pub struct ChatSession<'a> {
    service: &'a HealthAI,
    mode: SessionMode,
    config: SessionConfig,
    history: Vec<Content>,
}

impl<'a> ChatSession<'a> {
    pub(crate) fn new(service: &'a HealthAI, mode: SessionMode) -> Self {
        Self {
            service,
            mode,
            config: mode.session_config(),
            history: Vec::new(),
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Completed exchanges so far.
    pub fn turns(&self) -> usize {
        self.history.len() / 2
    }

    pub async fn send_message(&mut self, text: &str) -> Result<ChatReply, AIError> {
        let user = Content::user(vec![Part::text(text)]);
        let request = self.build_request(&user);

        let response = self
            .service
            .backend()
            .generate(self.config.model, &request)
            .await?;
        check_blocked(&response)?;

        let mut reply = ChatReply::default();
        reply.absorb(&response);
        let model_turn = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.clone())
            .filter(|content| !content.parts.is_empty())
            .map(|content| Content::model(content.parts))
            .unwrap_or_else(|| Content::model(vec![Part::text(reply.text.clone())]));

        self.history.push(user);
        self.history.push(model_turn);
        Ok(reply)
    }

    /// Like [`send_message`](Self::send_message), calling `on_text` with each
    /// text delta as it arrives.
    pub async fn send_message_stream(
        &mut self,
        text: &str,
        mut on_text: impl FnMut(&str) + Send,
    ) -> Result<ChatReply, AIError> {
        let user = Content::user(vec![Part::text(text)]);
        let request = self.build_request(&user);

        let mut reply = ChatReply::default();
        let mut blocked: Option<ProviderFailure> = None;
        let mut collect = |chunk: GenerateContentResponse| {
            if blocked.is_some() {
                return;
            }
            if let Err(failure) = check_blocked(&chunk) {
                blocked = Some(failure);
                return;
            }
            let piece = reply.absorb(&chunk);
            if !piece.is_empty() {
                on_text(&piece);
            }
        };

        self.service
            .backend()
            .generate_stream(self.config.model, &request, &mut collect)
            .await?;
        if let Some(failure) = blocked {
            return Err(failure.into());
        }

        self.history.push(user);
        self.history
            .push(Content::model(vec![Part::text(reply.text.clone())]));
        Ok(reply)
    }

    fn build_request(&self, user: &Content) -> GenerateContentRequest {
        let mut contents = self.history.clone();
        contents.push(user.clone());

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content::instruction(self.config.system_instruction)),
            generation_config: Some(GenerationConfig {
                temperature: Some(self.config.temperature),
                thinking_config: self
                    .config
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
                ..GenerationConfig::default()
            }),
            tools: self.config.tools.clone(),
        }
    }
}

fn check_blocked(response: &GenerateContentResponse) -> Result<(), ProviderFailure> {
    match response.block_reason() {
        Some(reason) => Err(ProviderFailure::new(format!("prompt blocked: {reason}"))),
        None => Ok(()),
    }
}
