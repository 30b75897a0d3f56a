//! Error types for JuicyURLs
//!
//! Only input-level and configuration-level failures are errors. A URL that
//! fails validation is a [`Verdict::Invalid`](crate::Verdict::Invalid), and a
//! run that stops on timeout or abort still returns `Ok`.

/// Result type alias using JuicyURLs' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for JuicyURLs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input could not be read or violates a size limit
    #[error("input error: {0}")]
    Input(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Result sink failed to write
    #[error("sink error: {0}")]
    Sink(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new sink error
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
