use super::error::ProviderFailure;
use super::wire::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::config::ServiceConfig;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

/// Transport to a generative model provider.
///
/// `HealthAI` only talks to the provider through this trait, so tests can
/// script responses without a network.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderFailure>;

    /// Deliver partial responses as they arrive.
    ///
    /// Backends without streaming hand over the complete response as a single
    /// chunk.
    async fn generate_stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        on_chunk: &mut (dyn FnMut(GenerateContentResponse) + Send),
    ) -> Result<(), ProviderFailure> {
        let response = self.generate(model, request).await?;
        on_chunk(response);
        Ok(())
    }
}

// ============================================
// Gemini REST backend
// ============================================

pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Use a preconfigured HTTP client (proxy, timeouts, TLS settings).
    pub fn with_client(config: &ServiceConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            api_key: config.api_key().to_string(),
        }
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }
}

/// Turn a non-2xx response body into a failure, preferring the provider's
/// own error envelope.
pub fn failure_from_body(status: u16, body: &str) -> ProviderFailure {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => {
            let error = envelope.error;
            let mut message = error.message;
            if let Some(provider_status) = error.status {
                message = format!("{message} [{provider_status}]");
            }
            ProviderFailure::with_status(error.code.unwrap_or(status), message)
        }
        Err(_) => ProviderFailure::with_status(status, format!("HTTP {status}: {body}")),
    }
}

/// Body of a non-2xx response. A body that cannot be read is described in
/// place; the status alone still drives classification.
async fn error_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(err) => format!("<unreadable body: {}>", err.without_url()),
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderFailure> {
        tracing::debug!(model, "generateContent");
        let response = self
            .client
            .post(self.endpoint(model, "generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure_from_body(status.as_u16(), &error_body(response).await));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn generate_stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        on_chunk: &mut (dyn FnMut(GenerateContentResponse) + Send),
    ) -> Result<(), ProviderFailure> {
        tracing::debug!(model, "streamGenerateContent");
        let response = self
            .client
            .post(self.endpoint(model, "streamGenerateContent"))
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", &self.api_key)
            .header("accept", "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure_from_body(status.as_u16(), &error_body(response).await));
        }

        let mut decoder = SseDecoder::default();
        let mut stream = response.bytes_stream();
        while let Some(item) = stream.next().await {
            let bytes = item?;
            for data in decoder.push(&bytes) {
                match parse_sse_data(&data) {
                    Some(SseEvent::Chunk(chunk)) => on_chunk(chunk),
                    Some(SseEvent::Error(failure)) => return Err(failure),
                    None => {}
                }
            }
        }
        if let Some(data) = decoder.finish()
            && let Some(event) = parse_sse_data(&data)
        {
            match event {
                SseEvent::Chunk(chunk) => on_chunk(chunk),
                SseEvent::Error(failure) => return Err(failure),
            }
        }

        Ok(())
    }
}

// ============================================
// Server-sent events
// ============================================

/// Splits an SSE byte stream into the joined `data:` payload of each event.
///
/// Bytes are buffered until a full line is available, so multi-byte
/// characters split across network chunks decode intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Option<String>,
}

impl SseDecoder {
    /// Feed the next chunk and collect every event it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(data) = self.data.take() {
                    events.push(data);
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix("data:") {
                self.append(rest.trim_start());
            }
        }
        events
    }

    /// Flush an event left open when the stream ended without a blank line.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&rest);
        if let Some(fragment) = line.trim_end().strip_prefix("data:") {
            self.append(fragment.trim_start());
        }
        self.data.take()
    }

    fn append(&mut self, fragment: &str) {
        match &mut self.data {
            Some(existing) => existing.push_str(fragment),
            None => self.data = Some(fragment.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum SseEvent {
    Chunk(GenerateContentResponse),
    Error(ProviderFailure),
}

pub fn parse_sse_data(data: &str) -> Option<SseEvent> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(trimmed) {
        let error = envelope.error;
        let message = match error.status {
            Some(status) => format!("{} [{}]", error.message, status),
            None => error.message,
        };
        return Some(SseEvent::Error(ProviderFailure {
            status: error.code,
            message,
            offline: false,
        }));
    }
    match serde_json::from_str::<GenerateContentResponse>(trimmed) {
        Ok(chunk) => Some(SseEvent::Chunk(chunk)),
        Err(err) => {
            tracing::debug!("skipping undecodable stream event: {err}");
            None
        }
    }
}
