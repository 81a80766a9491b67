// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the interception relay
//!
//! Only the query path and configuration loading hand errors to a caller.
//! Everything on the interception path is logged and contained.

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the interception relay
#[derive(Error, Debug)]
pub enum Error {
    /// A filter pattern failed to compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    PatternCompile { pattern: String, reason: String },

    /// An outbound channel refused or failed an event
    #[error("Delivery on '{channel}' failed: {reason}")]
    Delivery { channel: String, reason: String },

    /// Unexpected fault while reading buffered URLs
    #[error("Buffer query failed: {0}")]
    BufferQuery(String),

    /// Host bridge does not implement an optional operation
    #[error("Bridge operation not supported: {0}")]
    Unsupported(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a pattern compile error
    pub fn pattern_compile(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::PatternCompile {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a delivery error
    pub fn delivery(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Delivery {
            channel: channel.into(),
            reason: reason.into(),
        }
    }

    /// Create a buffer query error
    pub fn buffer_query<S: Into<String>>(msg: S) -> Self {
        Error::BufferQuery(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a pattern compile error
    pub fn is_pattern_compile(&self) -> bool {
        matches!(self, Error::PatternCompile { .. })
    }

    /// Check if this is a delivery error
    pub fn is_delivery(&self) -> bool {
        matches!(self, Error::Delivery { .. } | Error::Unsupported(_))
    }

    /// Check if this error may surface to a host caller
    ///
    /// Pattern and delivery failures are always contained on the
    /// interception path.
    pub fn is_caller_visible(&self) -> bool {
        !matches!(
            self,
            Error::PatternCompile { .. } | Error::Delivery { .. } | Error::Unsupported(_)
        )
    }

    /// Get the offending pattern, if any
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Error::PatternCompile { pattern, .. } => Some(pattern),
            _ => None,
        }
    }

    /// Get the channel involved, if any
    pub fn channel(&self) -> Option<&str> {
        match self {
            Error::Delivery { channel, .. } => Some(channel),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}
