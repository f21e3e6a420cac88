use serde_json::Value;
use thiserror::Error;

/// Marker string the backend puts in the user-slots error body when the user
/// has no linked Steam account.
const NO_LINKED_IDENTITY_MARKER: &str = "SteamID not set";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 401. Recovered by a full login redirect, never surfaced as a toast.
    AuthRequired,
    /// 403. Message only, no redirect.
    Forbidden,
    /// The backend reports no linked Steam account for this user.
    NoLinkedIdentity,
    /// 429 on a slot switch. Carries the server-reported wait.
    Cooldown,
    /// 409. The backend's authoritative view already matches; informational.
    Conflict,
    /// 400/422 with the backend message surfaced verbatim when present.
    Validation,
    /// Handshake parameters failed the pre-network completeness check.
    IncompleteParameters,
    NotFound,
    /// 5xx.
    Server,
    /// Transport failure before any HTTP status was produced.
    Network,
    Unknown,
}

/// Mapped API failure. The original status and backend body stay attached;
/// mapping annotates, it does not discard.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<Value>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
        }
    }

    pub fn network(detail: impl std::fmt::Display) -> Self {
        Self::new(ApiErrorKind::Network, format!("Request failed: {}", detail))
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unknown, message)
    }

    /// Maps an HTTP failure status plus parsed body into the error taxonomy.
    pub fn from_response(status: u16, body: Option<Value>) -> Self {
        let backend_message = body.as_ref().and_then(extract_backend_message);
        let (kind, message) = match status {
            400 | 422 => (
                ApiErrorKind::Validation,
                backend_message.unwrap_or_else(|| "Invalid data submitted".to_string()),
            ),
            401 => (
                ApiErrorKind::AuthRequired,
                "Session expired, signing in again".to_string(),
            ),
            403 => (
                ApiErrorKind::Forbidden,
                "You do not have permission for this action".to_string(),
            ),
            404 => (
                ApiErrorKind::NotFound,
                backend_message.unwrap_or_else(|| "Resource not found".to_string()),
            ),
            409 => (
                ApiErrorKind::Conflict,
                backend_message.unwrap_or_else(|| "Conflicting state on the server".to_string()),
            ),
            429 => (
                ApiErrorKind::Cooldown,
                backend_message.unwrap_or_else(|| "Action is on cooldown".to_string()),
            ),
            500..=599 => (
                ApiErrorKind::Server,
                "Server error, please try again later".to_string(),
            ),
            _ => (
                ApiErrorKind::Unknown,
                backend_message.unwrap_or_else(|| "An unexpected error occurred".to_string()),
            ),
        };
        Self {
            kind,
            message,
            status: Some(status),
            body,
        }
    }

    /// Reinterprets a user-slots failure whose body carries the backend's
    /// "no linked identity" marker.
    pub fn with_no_linked_identity_check(self) -> Self {
        let marked = self
            .body
            .as_ref()
            .and_then(extract_backend_message)
            .map(|m| m.contains(NO_LINKED_IDENTITY_MARKER))
            .unwrap_or(false);
        if marked {
            Self {
                kind: ApiErrorKind::NoLinkedIdentity,
                message: "Link a Steam account before managing slots".to_string(),
                ..self
            }
        } else {
            self
        }
    }

    /// 401 recovers via redirect; showing a toast on top would be noise.
    pub fn should_toast(&self) -> bool {
        self.kind != ApiErrorKind::AuthRequired
    }

    pub fn should_force_login(&self) -> bool {
        self.kind == ApiErrorKind::AuthRequired
    }

    /// Exact server-reported wait for a cooldown failure.
    pub fn cooldown_seconds(&self) -> Option<u32> {
        if self.kind != ApiErrorKind::Cooldown {
            return None;
        }
        self.body
            .as_ref()
            .and_then(|body| body.get("remaining_time_seconds"))
            .and_then(|v| v.as_u64())
            .map(|v| v as u32)
    }
}

fn extract_backend_message(body: &Value) -> Option<String> {
    for key in ["message", "error"] {
        if let Some(text) = body.get(key).and_then(|v| v.as_str()) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}
