//! Error types for the bridge.
//!
//! Detection and normalization never fail; only the edges (HTTP fetch,
//! filesystem, archive writing, configuration) return these errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limit exceeded. Retry after {0} seconds.")]
    RateLimited(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Bridge registry is not initialized. Call `registry::init` at startup.")]
    NotInitialized,

    #[error("No project has been imported yet.")]
    NoProject,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl BridgeError {
    /// Stable error code, used by the CLI's JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E100",
            Self::RateLimited(_) => "E101",
            Self::Parse(_) => "E200",
            Self::Json(_) => "E201",
            Self::Config(_) => "E300",
            Self::Storage(_) => "E400",
            Self::Io(_) => "E401",
            Self::Zip(_) => "E402",
            Self::NotInitialized => "E500",
            Self::NoProject => "E501",
        }
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(BridgeError::Network("down".into()).code(), "E100");
        assert_eq!(BridgeError::RateLimited(30).code(), "E101");
        assert_eq!(BridgeError::NotInitialized.code(), "E500");
        assert_eq!(BridgeError::NoProject.code(), "E501");
    }

    #[test]
    fn test_messages_carry_context() {
        let err = BridgeError::RateLimited(42);
        assert!(err.to_string().contains("42"));

        let err = BridgeError::Config("bad timeout".into());
        assert!(err.to_string().contains("bad timeout"));
    }

    #[test]
    fn test_json_error_converts() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BridgeError = parse_err.into();
        assert_eq!(err.code(), "E201");
    }
}
