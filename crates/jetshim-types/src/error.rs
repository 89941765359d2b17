// ─────────────────────────────────────────────────────────────────────
// Jetshim — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for everything that crosses the bridge boundary.
///
/// Area queries on an engine without area support are *not* errors;
/// they degrade to the `-1` sentinel instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JetError {
    /// Malformed conversion request (buffer shape, field count).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The clustering engine failed. Carries the engine message with
    /// trailing whitespace removed.
    #[error("{0}")]
    Clustering(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

impl JetError {
    /// The bare message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            JetError::InvalidInput(m) | JetError::Clustering(m) | JetError::Config(m) => m,
        }
    }
}

pub type JetResult<T> = Result<T, JetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clustering_display_is_bare_message() {
        let err = JetError::Clustering("R must be positive".into());
        assert_eq!(err.to_string(), "R must be positive");
    }

    #[test]
    fn test_invalid_input_display_prefixed() {
        let err = JetError::InvalidInput("short buffer".into());
        assert_eq!(err.to_string(), "invalid input: short buffer");
        assert_eq!(err.message(), "short buffer");
    }
}
