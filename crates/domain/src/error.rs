/// Infrastructure error shared by all Wayfinder crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Advisor failure taxonomy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Notice shown when the completion service could not be reached.
pub const API_ERROR_NOTICE: &str =
    "The advice service is unavailable right now. Please try again in a moment.";

/// Notice shown next to raw model text that did not match the advice schema.
pub const PARSE_FALLBACK_NOTICE: &str =
    "Could not parse structured output; showing the raw response instead.";

/// Coarse classification of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Network,
    Timeout,
    Auth,
    RateLimited,
    Provider,
}

impl TransportKind {
    /// Classify an infrastructure error.
    pub fn of(err: &Error) -> Self {
        match err {
            Error::Timeout(_) => Self::Timeout,
            Error::Auth(_) => Self::Auth,
            Error::RateLimited(_) => Self::RateLimited,
            Error::Http(_) | Error::Io(_) => Self::Network,
            _ => Self::Provider,
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Auth => "auth",
            Self::RateLimited => "rate_limited",
            Self::Provider => "provider",
        };
        f.write_str(s)
    }
}

/// Failures a conversation turn can run into.
///
/// Only [`AdvisorError::CompletionTransport`] and
/// [`AdvisorError::StreamInterrupted`] abort a turn; the others are absorbed
/// by a fallback and at most surface as a notice.
#[derive(thiserror::Error, Debug)]
pub enum AdvisorError {
    #[error("empty input")]
    EmptyInput,

    #[error("language detection failed: {0}")]
    LanguageDetection(String),

    #[error("completion request failed ({kind}): {message}")]
    CompletionTransport { kind: TransportKind, message: String },

    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("structured output did not match the advice schema: {0}")]
    StructuredParse(String),
}

impl AdvisorError {
    /// Wrap an infrastructure error from the completion call.
    pub fn transport(err: Error) -> Self {
        Self::CompletionTransport {
            kind: TransportKind::of(&err),
            message: err.to_string(),
        }
    }

    /// True for the failure classes that abort the current turn.
    pub fn is_hard_failure(&self) -> bool {
        matches!(
            self,
            Self::CompletionTransport { .. } | Self::StreamInterrupted(_)
        )
    }

    /// User-facing notice for this failure, or `None` when it is absorbed
    /// silently (language detection).
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::EmptyInput => Some("Please enter a career question."),
            Self::LanguageDetection(_) => None,
            Self::CompletionTransport { .. } => Some(API_ERROR_NOTICE),
            Self::StreamInterrupted(_) => {
                Some("The response was interrupted before it finished. Please ask again.")
            }
            Self::StructuredParse(_) => Some(PARSE_FALLBACK_NOTICE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_kind_classifies_infrastructure_errors() {
        assert_eq!(TransportKind::of(&Error::Timeout("t".into())), TransportKind::Timeout);
        assert_eq!(TransportKind::of(&Error::Auth("a".into())), TransportKind::Auth);
        assert_eq!(
            TransportKind::of(&Error::RateLimited("r".into())),
            TransportKind::RateLimited
        );
        assert_eq!(TransportKind::of(&Error::Http("h".into())), TransportKind::Network);
        assert_eq!(
            TransportKind::of(&Error::Provider {
                provider: "p".into(),
                message: "HTTP 500".into()
            }),
            TransportKind::Provider
        );
    }

    #[test]
    fn only_transport_and_stream_failures_are_hard() {
        assert!(AdvisorError::transport(Error::Http("down".into())).is_hard_failure());
        assert!(AdvisorError::StreamInterrupted("eof".into()).is_hard_failure());
        assert!(!AdvisorError::EmptyInput.is_hard_failure());
        assert!(!AdvisorError::LanguageDetection("blank".into()).is_hard_failure());
        assert!(!AdvisorError::StructuredParse("eof".into()).is_hard_failure());
    }

    #[test]
    fn api_and_parse_notices_are_distinct() {
        let api = AdvisorError::transport(Error::Auth("bad key".into()));
        let parse = AdvisorError::StructuredParse("missing brace".into());
        assert_eq!(api.notice(), Some(API_ERROR_NOTICE));
        assert_eq!(parse.notice(), Some(PARSE_FALLBACK_NOTICE));
        assert_ne!(api.notice(), parse.notice());
    }

    #[test]
    fn detection_failure_has_no_notice() {
        assert!(AdvisorError::LanguageDetection("blank".into()).notice().is_none());
    }
}
