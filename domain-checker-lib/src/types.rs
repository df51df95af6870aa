//! Core data types for domain availability checking.
//!
//! This module defines the verdict of a check, the diagnostics record a
//! successful check produces, and the options that tune the checker.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Availability verdict for a domain.
///
/// `Unknown` is the sentinel that accompanies every error. When a check
/// returns `Err`, the error is authoritative and callers should not try to
/// interpret the verdict further.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The domain is available for registration
    #[serde(rename = "DomainAvailable")]
    Available,

    /// The domain is already registered
    #[serde(rename = "DomainUnavailable")]
    Unavailable,

    /// The status could not be determined
    #[serde(rename = "DomainUnknown")]
    Unknown,
}

impl Verdict {
    /// Whether the verdict says the domain can be registered.
    pub fn is_available(&self) -> bool {
        matches!(self, Verdict::Available)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Available => write!(f, "DomainAvailable"),
            Verdict::Unavailable => write!(f, "DomainUnavailable"),
            Verdict::Unknown => write!(f, "DomainUnknown"),
        }
    }
}

/// Result of a successful domain availability check.
///
/// Carries the verdict plus the diagnostics entry points print in verbose
/// mode: which server answered, which pattern matched, how long it took.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainResult {
    /// The domain name that was checked (e.g., "example.com")
    pub domain: String,

    /// Routing suffix extracted from the domain (e.g., ".com", ".co.jp")
    pub tld: String,

    /// WHOIS server that was targeted.
    /// `None` when the TLD is not in the server table and default
    /// discovery was used instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Availability verdict
    pub verdict: Verdict,

    /// First availability pattern that matched the response, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,

    /// How long the check took to complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_duration: Option<Duration>,

    /// The raw WHOIS response, kept only when `CheckConfig::keep_raw_response` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Configuration options for domain checking operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckConfig {
    /// Timeout for each individual WHOIS query.
    /// Default: 5 seconds
    #[serde(skip)]
    pub timeout: Duration,

    /// Maximum number of concurrent checks in a batch
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// Whether to keep the raw WHOIS response in `DomainResult`
    /// Default: false
    pub keep_raw_response: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            concurrency: 10,
            keep_raw_response: false,
        }
    }
}

impl CheckConfig {
    /// Set custom timeout for WHOIS queries.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set batch concurrency, capped to 1-100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Keep the raw WHOIS response in each result.
    pub fn with_raw_response(mut self, enabled: bool) -> Self {
        self.keep_raw_response = enabled;
        self
    }
}
