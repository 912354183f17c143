use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================
// Raw provider failures
// ============================================

/// A failure as observed at the provider boundary, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderFailure {
    pub status: Option<u16>,
    pub message: String,
    /// The host could not reach the network at all.
    pub offline: bool,
}

impl ProviderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            offline: false,
        }
    }

    pub fn offline(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            offline: true,
        }
    }
}

impl From<reqwest::Error> for ProviderFailure {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let offline = err.is_connect();
        let timed_out = err.is_timeout();
        // Bodies are read as text and parsed separately, so a decode error
        // here means the transfer itself broke off.
        let dropped = err.is_request()
            || err.is_body()
            || (err.is_decode() && !caused_by::<serde_json::Error>(&err));
        let err = err.without_url();
        let message = if timed_out {
            format!("request timeout: {err}")
        } else if dropped && !offline {
            format!("network error: {err}")
        } else {
            err.to_string()
        };
        Self {
            status,
            message,
            offline,
        }
    }
}

fn caused_by<E: std::error::Error + 'static>(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = err.source();
    while let Some(source) = current {
        if source.is::<E>() {
            return true;
        }
        current = source.source();
    }
    false
}

impl From<serde_json::Error> for ProviderFailure {
    fn from(err: serde_json::Error) -> Self {
        ProviderFailure::new(format!("invalid provider response: {err}"))
    }
}

// ============================================
// Classified errors
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIErrorKind {
    Network,
    Safety,
    Quota,
    Key,
    Unauthorized,
    Unknown,
}

impl AIErrorKind {
    pub fn is_retryable(self) -> bool {
        match self {
            AIErrorKind::Unauthorized | AIErrorKind::Key | AIErrorKind::Safety => false,
            AIErrorKind::Quota | AIErrorKind::Network | AIErrorKind::Unknown => true,
        }
    }

    /// Explanation shown to the user for this kind of failure.
    pub fn user_message(self) -> &'static str {
        match self {
            AIErrorKind::Unauthorized => {
                "Access denied. Please check that a valid API key is configured for this project."
            }
            AIErrorKind::Key => {
                "The requested model or project could not be found. Please check the configured project key."
            }
            AIErrorKind::Safety => {
                "This question was filtered for safety. I cannot discuss some sensitive topics or suggest specific treatments. In a health emergency, please go to the nearest hospital right away."
            }
            AIErrorKind::Quota => {
                "The free message limit has been reached for now. Please wait a minute and try again, or link a billing account to the project for higher limits."
            }
            AIErrorKind::Network => {
                "Connection failed. Please check your internet connection and try again."
            }
            AIErrorKind::Unknown => {
                "Something went wrong while talking to the AI. Please try asking in a different way."
            }
        }
    }
}

impl std::fmt::Display for AIErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AIErrorKind::Network => "network",
            AIErrorKind::Safety => "safety",
            AIErrorKind::Quota => "quota",
            AIErrorKind::Key => "key",
            AIErrorKind::Unauthorized => "unauthorized",
            AIErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// The only error shape the application layer has to handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct AIError {
    pub kind: AIErrorKind,
    pub message: String,
    pub is_retryable: bool,
}

impl AIError {
    pub fn from_kind(kind: AIErrorKind) -> Self {
        Self {
            kind,
            message: kind.user_message().to_string(),
            is_retryable: kind.is_retryable(),
        }
    }
}

impl From<ProviderFailure> for AIError {
    fn from(failure: ProviderFailure) -> Self {
        classify_error(&failure)
    }
}

/// Failure of an image edit.
///
/// A response without any inline image is reported as `NoImageReturned`,
/// which sits outside the classified taxonomy. Callers that only render
/// classified errors reduce it with [`ServiceError::into_classified`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Classified(#[from] AIError),
    #[error("Failed to edit the image.")]
    NoImageReturned,
}

impl ServiceError {
    pub fn into_classified(self) -> AIError {
        match self {
            ServiceError::Classified(err) => err,
            ServiceError::NoImageReturned => {
                classify_error(&ProviderFailure::new(self.to_string()))
            }
        }
    }
}

// ============================================
// Classifier
// ============================================

/// Which signals map a failure to a kind.
struct Rule {
    kind: AIErrorKind,
    needles: &'static [&'static str],
    status: Option<u16>,
    matches_offline: bool,
}

/// Ordered; the first matching rule wins.
const RULES: &[Rule] = &[
    Rule {
        kind: AIErrorKind::Unauthorized,
        needles: &["api key", "unauthorized"],
        status: Some(401),
        matches_offline: false,
    },
    Rule {
        kind: AIErrorKind::Key,
        needles: &["entity was not found", "not found"],
        status: Some(404),
        matches_offline: false,
    },
    Rule {
        kind: AIErrorKind::Safety,
        needles: &["safety", "blocked"],
        status: Some(400),
        matches_offline: false,
    },
    Rule {
        kind: AIErrorKind::Quota,
        needles: &["429", "quota", "exhausted", "limit"],
        status: Some(429),
        matches_offline: false,
    },
    Rule {
        kind: AIErrorKind::Network,
        needles: &["fetch", "network", "timeout"],
        status: None,
        matches_offline: true,
    },
];

impl Rule {
    fn matches(&self, message: &str, status: Option<u16>, offline: bool) -> bool {
        self.needles.iter().any(|needle| message.contains(needle))
            || (self.status.is_some() && self.status == status)
            || (self.matches_offline && offline)
    }
}

/// Reduce any provider failure to exactly one [`AIErrorKind`].
pub fn classify_error(failure: &ProviderFailure) -> AIError {
    let message = failure.message.to_lowercase();
    let kind = RULES
        .iter()
        .find(|rule| rule.matches(&message, failure.status, failure.offline))
        .map(|rule| rule.kind)
        .unwrap_or(AIErrorKind::Unknown);

    tracing::warn!(
        kind = %kind,
        status = ?failure.status,
        offline = failure.offline,
        "AI service error: {}",
        failure.message
    );

    AIError::from_kind(kind)
}
