//! The error taxonomy from spec.md §7, expressed as plain enums rather than
//! an exception hierarchy. Every kind is a distinct variant; callers match
//! on the kind they care about instead of downcasting.

use std::fmt;

/// Top-level error kind. `Halt` deliberately has no variant here: per §7 it
/// "is not an error for the benchmark" and is instead modeled as a distinct
/// outcome of round execution (see `xent-runtime::RoundOutcome`).
#[derive(Debug, Clone, PartialEq)]
pub enum XentError {
    /// Bad config shape, unknown player type, missing required option.
    /// Fatal, reported before any work starts.
    Configuration(String),
    /// DSL parse failure. Fatal for the affected game; other games continue.
    Syntax { message: String, line: usize },
    /// Runtime violation: write to an already-set static register, missing
    /// beacon, type mismatch in an expression. Fails the unit.
    Game(String),
    /// Invalid operand combination on scored types. Fails the unit.
    Type(String),
    /// Transport/authorization/rate-limit/invalid-request/server failure
    /// from an external model endpoint.
    Api(ApiError),
    /// Invariant violation. Logged with context; unit fails.
    Internal(String),
}

impl fmt::Display for XentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(m) => write!(f, "Xent Configuration Error: {m}"),
            Self::Syntax { message, line } => {
                write!(f, "Xent Syntax Error (line {line}): {message}")
            },
            Self::Game(m) => write!(f, "Xent Game Error: {m}"),
            Self::Type(m) => write!(f, "Xent Type Error: {m}"),
            Self::Api(e) => write!(f, "{e}"),
            Self::Internal(m) => write!(f, "Xent Internal Error: {m}"),
        }
    }
}

impl std::error::Error for XentError {}

impl From<ApiError> for XentError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

/// The provider-facing subset of the taxonomy (§7 Api/Provider).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub provider: String,
    pub kind: ApiErrorKind,
    pub status_code: Option<u16>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// HTTP 429. Retried with exponential backoff.
    RateLimit,
    /// HTTP 401/403. Not retried.
    Authentication,
    /// HTTP 400. Not retried.
    InvalidRequest,
    /// HTTP 5xx. Retried with exponential backoff.
    ServerError,
    /// Connection failure, timeout, or other transport-layer error.
    Transport,
}

impl ApiErrorKind {
    /// Whether the default player's retry loop should retry this kind.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimit | Self::ServerError | Self::Transport)
    }

    /// Classify an HTTP status code per §7's taxonomy.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            400 => Self::InvalidRequest,
            429 => Self::RateLimit,
            500..=599 => Self::ServerError,
            _ => Self::Transport,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Xent Api Error with provider '{}': {} (status={:?})",
            self.provider, self.message, self.status_code
        )
    }
}

impl std::error::Error for ApiError {}

/// Convenience constructors matching the original exception subclasses.
impl ApiError {
    pub fn rate_limit(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind: ApiErrorKind::RateLimit,
            status_code: Some(429),
            message: message.into(),
        }
    }

    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind: ApiErrorKind::Authentication,
            status_code: None,
            message: message.into(),
        }
    }

    pub fn invalid_request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind: ApiErrorKind::InvalidRequest,
            status_code: Some(400),
            message: message.into(),
        }
    }

    pub fn server_error(provider: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            provider: provider.into(),
            kind: ApiErrorKind::ServerError,
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind: ApiErrorKind::Transport,
            status_code: None,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(ApiErrorKind::from_status(429), ApiErrorKind::RateLimit);
        assert_eq!(ApiErrorKind::from_status(401), ApiErrorKind::Authentication);
        assert_eq!(ApiErrorKind::from_status(403), ApiErrorKind::Authentication);
        assert_eq!(ApiErrorKind::from_status(400), ApiErrorKind::InvalidRequest);
        assert_eq!(ApiErrorKind::from_status(503), ApiErrorKind::ServerError);
    }

    #[test]
    fn retryable_kinds() {
        assert!(ApiErrorKind::RateLimit.is_retryable());
        assert!(ApiErrorKind::ServerError.is_retryable());
        assert!(ApiErrorKind::Transport.is_retryable());
        assert!(!ApiErrorKind::Authentication.is_retryable());
        assert!(!ApiErrorKind::InvalidRequest.is_retryable());
    }

    #[test]
    fn display_includes_provider_and_status() {
        let e = ApiError::rate_limit("openai", "too many requests");
        let s = e.to_string();
        assert!(s.contains("openai"));
        assert!(s.contains("429"));
    }
}
