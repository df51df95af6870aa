//! Error handling for domain checking operations.
//!
//! A check can only fail in two ways at runtime: the input has no TLD, or the
//! WHOIS exchange did not produce a response. Configuration loading adds its
//! own variants. Every error pairs with the `Unknown` verdict.

use crate::types::Verdict;
use std::fmt;
use std::time::Duration;

/// Main error type for domain checking operations.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainCheckError {
    /// The domain has no `.` separating a TLD suffix
    InvalidDomainFormat { domain: String },

    /// The WHOIS query failed (connection, I/O, timeout)
    QueryFailed {
        domain: String,
        /// Server that was targeted, `None` for default discovery
        server: Option<String>,
        reason: String,
    },

    /// Configuration errors (invalid settings, unparsable TOML)
    ConfigError { message: String },

    /// File I/O errors when reading configuration files
    FileError { path: String, message: String },
}

impl DomainCheckError {
    /// Create a new invalid domain format error.
    pub fn invalid_domain_format<D: Into<String>>(domain: D) -> Self {
        Self::InvalidDomainFormat {
            domain: domain.into(),
        }
    }

    /// Create a new query failure.
    pub fn query_failed<D: Into<String>, R: Into<String>>(
        domain: D,
        server: Option<&str>,
        reason: R,
    ) -> Self {
        Self::QueryFailed {
            domain: domain.into(),
            server: server.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Create a query failure for a query that exceeded its time budget.
    pub fn query_timeout<D: Into<String>>(
        domain: D,
        server: Option<&str>,
        duration: Duration,
    ) -> Self {
        Self::query_failed(domain, server, format!("timed out after {:?}", duration))
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The verdict that accompanies this error. Always `Unknown`.
    pub fn verdict(&self) -> Verdict {
        Verdict::Unknown
    }

    /// Check if this error suggests the operation could be retried.
    ///
    /// The checker itself never retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::QueryFailed { .. })
    }
}

impl fmt::Display for DomainCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomainFormat { domain } => write!(
                f,
                "invalid domain format for '{}'. Please include TLD (e.g., domain.com)",
                domain
            ),
            Self::QueryFailed {
                domain,
                server,
                reason,
            } => match server {
                Some(server) => write!(
                    f,
                    "WHOIS query for '{}' via {} failed: {}",
                    domain, server, reason
                ),
                None => write!(f, "WHOIS query for '{}' failed: {}", domain, reason),
            },
            Self::ConfigError { message } => write!(f, "Configuration error: {}", message),
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for DomainCheckError {}

impl From<toml::de::Error> for DomainCheckError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("Failed to parse TOML configuration: {}", err))
    }
}
