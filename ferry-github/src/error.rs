//! Error types for GitHub and Zenhub operations

use thiserror::Error;

/// Result type for API and migration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the APIs or migrating
#[derive(Error, Debug)]
pub enum Error {
    /// Transport kept failing after every allowed attempt
    #[error("Request to {url} failed after {attempts} attempt(s): {message}")]
    Transport {
        url: String,
        attempts: u32,
        message: String,
    },

    /// The API answered with a status that is not part of the success contract
    #[error("HTTP {status} from {url}{}", body_suffix(.body))]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// A header the protocol depends on was absent or unreadable
    #[error("Response from {url} is missing header {header}")]
    MissingHeader { url: String, header: &'static str },

    /// A payload did not have the expected shape
    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn decode(what: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Decode {
            what: what.into(),
            source,
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for failures scoped to one entity (a rejected payload, a bad
    /// reference, a validation error). Anything else means one of the
    /// systems is unusable and the run should stop.
    pub fn is_per_entity(&self) -> bool {
        matches!(self, Error::Status { .. } | Error::Decode { .. })
    }
}

impl From<ferry_core::Error> for Error {
    fn from(err: ferry_core::Error) -> Self {
        match err {
            ferry_core::Error::Io(e) => Error::Io(e),
            ferry_core::Error::Config(msg) => Error::Config(msg),
        }
    }
}

fn body_suffix(body: &str) -> String {
    const MAX: usize = 300;
    let body = body.trim();
    if body.is_empty() {
        return String::new();
    }
    match body.char_indices().nth(MAX) {
        Some((end, _)) => format!(": {}...", &body[..end]),
        None => format!(": {}", body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_truncates_body() {
        let err = Error::Status {
            status: 422,
            url: "https://api.github.com/repos/a/b/issues".to_string(),
            body: "x".repeat(1000),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("HTTP 422 from https://api.github.com/repos/a/b/issues: "));
        assert!(msg.ends_with("..."));
        assert!(msg.len() < 400);
    }

    #[test]
    fn test_status_display_without_body() {
        let err = Error::Status {
            status: 500,
            url: "u".to_string(),
            body: "  ".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500 from u");
    }

    #[test]
    fn test_per_entity_classification() {
        let status = Error::Status {
            status: 422,
            url: "u".to_string(),
            body: String::new(),
        };
        assert!(status.is_per_entity());
        assert_eq!(status.status(), Some(422));

        let transport = Error::Transport {
            url: "u".to_string(),
            attempts: 3,
            message: "connection reset".to_string(),
        };
        assert!(!transport.is_per_entity());
        assert_eq!(transport.status(), None);
    }
}
