use reqwest::StatusCode;
use std::{fmt, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Failed to reach WeatherAPI.com: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("WeatherAPI current request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse WeatherAPI current JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("No response from WeatherAPI.com within {0:?}")]
    Timeout(Duration),

    #[error("Weather request was cancelled")]
    Cancelled,

    #[error("API key must not be empty")]
    MissingApiKey,
}

/// Coarse classification of a [`WeatherError`], used for logging and for
/// callers that only care whether the network was at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The request never reached the server or no response came back.
    Transport,
    /// Anything else: error status, malformed body, cancellation.
    Other,
}

impl WeatherError {
    pub fn kind(&self) -> FailureKind {
        match self {
            WeatherError::Transport(_) | WeatherError::Timeout(_) => FailureKind::Transport,
            WeatherError::Status { .. }
            | WeatherError::Decode(_)
            | WeatherError::Cancelled
            | WeatherError::MissingApiKey => FailureKind::Other,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == FailureKind::Transport
    }

    /// HTTP status for [`WeatherError::Status`] failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            WeatherError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Transport => "transport",
            FailureKind::Other => "other",
        })
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_decode_failures_are_not_transport() {
        let status = WeatherError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: "{}".into(),
        };
        assert_eq!(status.kind(), FailureKind::Other);
        assert_eq!(status.status(), Some(StatusCode::UNAUTHORIZED));

        let decode = WeatherError::Decode(serde_json::from_str::<u8>("nope").unwrap_err());
        assert_eq!(decode.kind(), FailureKind::Other);
        assert_eq!(decode.status(), None);
    }

    #[test]
    fn timeout_counts_as_transport() {
        let err = WeatherError::Timeout(Duration::from_secs(3));
        assert!(err.is_transport());
        assert!(err.to_string().contains("3s"));
    }

    #[test]
    fn cancellation_is_other() {
        assert_eq!(WeatherError::Cancelled.kind(), FailureKind::Other);
    }

    #[test]
    fn status_message_includes_body() {
        let err = WeatherError::Status {
            status: StatusCode::FORBIDDEN,
            body: "API key has been disabled.".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("API key has been disabled."));
    }

    #[test]
    fn truncate_body_limits_length() {
        assert_eq!(truncate_body("short"), "short");

        let long = "é".repeat(250);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }
}
