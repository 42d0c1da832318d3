use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Client error: {0}")]
    ClientError(String),
    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),
    #[error("Authorization error: {0}")]
    AuthError(String),
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Empty result: {0}")]
    EmptyResult(String),
}

/// Coarse cause class used when a failed generation is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The call never produced a response (network, auth, timeout).
    Transport,
    /// The call completed but carried no image.
    EmptyResult,
    /// The call completed with a body we could not use.
    Malformed,
    /// The caller broke an input contract.
    Caller,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::EmptyResult => "empty-result",
            FailureKind::Malformed => "malformed",
            FailureKind::Caller => "caller",
        }
    }
}

impl GenerationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GenerationError::AuthError(_)
            | GenerationError::TransportError(_)
            | GenerationError::Timeout(_)
            | GenerationError::ClientError(_)
            | GenerationError::ConfigError(_) => FailureKind::Transport,
            GenerationError::EmptyResult(_) => FailureKind::EmptyResult,
            GenerationError::ResponseError(_) => FailureKind::Malformed,
            GenerationError::InvalidPrompt(_) => FailureKind::Caller,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            GenerationError::AuthError("401".into()).kind(),
            FailureKind::Transport
        );
        assert_eq!(
            GenerationError::Timeout("slow".into()).kind(),
            FailureKind::Transport
        );
        assert_eq!(
            GenerationError::EmptyResult("no parts".into()).kind(),
            FailureKind::EmptyResult
        );
        assert_eq!(
            GenerationError::ResponseError("bad json".into()).kind(),
            FailureKind::Malformed
        );
        assert_eq!(FailureKind::EmptyResult.as_str(), "empty-result");
    }

    #[test]
    fn test_every_variant_has_a_kind() {
        assert_eq!(
            GenerationError::ConfigError("no runtime".into()).kind(),
            FailureKind::Transport
        );
        assert_eq!(
            GenerationError::ClientError("builder".into()).kind(),
            FailureKind::Transport
        );
        assert_eq!(
            GenerationError::InvalidPrompt("empty".into()).kind(),
            FailureKind::Caller
        );
    }

    #[test]
    fn test_display() {
        let err = GenerationError::TransportError("connection refused".into());
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }
}
