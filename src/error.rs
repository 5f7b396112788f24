//! Error taxonomy for a run.
//!
//! Configuration problems are fatal before any processing starts. Transport
//! and lock failures abort the current invocation only. Data-fetch failures
//! never appear here: the data source degrades them to an empty grid.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("invalid email address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Transport(String),

    #[error("another run is in progress: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AllocationError {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        AllocationError::InvalidConfig { key: key.to_string(), reason: reason.into() }
    }

    /// Check if this error must stop the process before scheduling starts
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, AllocationError::MissingConfig(_) | AllocationError::InvalidConfig { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_lists_every_key() {
        let err = AllocationError::MissingConfig(vec!["SHEET_URL".to_string(), "EMAIL_PASSWORD".to_string()]);
        assert_eq!(err.to_string(), "missing required configuration: SHEET_URL, EMAIL_PASSWORD");
        assert!(err.is_fatal_config());
    }

    #[test]
    fn test_transport_is_not_fatal_config() {
        let err = AllocationError::Transport("connection refused".to_string());
        assert!(!err.is_fatal_config());
        assert_eq!(err.to_string(), "SMTP error: connection refused");
    }
}
