//! Error types for the cache library
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache library.
///
/// Store operations are total and never fail; errors only arise from
/// fetchers and from sweep lifecycle misuse. `Clone` and `PartialEq` are
/// derived so binding state snapshots can carry and compare errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A fetcher failed; the message is surfaced verbatim to the binding
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The background sweep was started a second time
    #[error("sweep task already running")]
    SweepAlreadyRunning,
}

// == Result Type Alias ==
/// Convenience Result type for the cache library.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_message_is_verbatim() {
        let err = CacheError::Fetch("boom".to_string());
        assert_eq!(err.to_string(), "fetch failed: boom");
    }

    #[test]
    fn test_errors_are_comparable() {
        assert_eq!(
            CacheError::Fetch("x".to_string()),
            CacheError::Fetch("x".to_string())
        );
        assert_ne!(
            CacheError::Fetch("x".to_string()),
            CacheError::SweepAlreadyRunning
        );
    }
}
