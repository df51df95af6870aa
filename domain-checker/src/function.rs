//! Cloud function handler.
//!
//! An invocation carries a flat string map; the only key read is `domain`.

use domain_checker_lib::{DomainCheckError, DomainChecker};
use std::collections::HashMap;
use std::fmt;

/// Event key holding the domain to check.
pub const DOMAIN_FIELD: &str = "domain";

/// Why an invocation produced no result line.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerError {
    /// The event did not carry the named key
    MissingField(&'static str),
    /// The check itself failed
    Check(DomainCheckError),
}

impl HandlerError {
    /// Short type name reported to the function runtime.
    pub fn error_type(&self) -> &'static str {
        match self {
            HandlerError::MissingField(_) => "MissingInput",
            HandlerError::Check(DomainCheckError::InvalidDomainFormat { .. }) => {
                "InvalidDomainFormat"
            }
            HandlerError::Check(DomainCheckError::QueryFailed { .. }) => "QueryFailed",
            HandlerError::Check(_) => "CheckFailed",
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::MissingField(field) => write!(f, "default input missing: {}", field),
            HandlerError::Check(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<DomainCheckError> for HandlerError {
    fn from(err: DomainCheckError) -> Self {
        HandlerError::Check(err)
    }
}

/// Check the domain named in `event` and render `"<domain>: <verdict>"`.
pub async fn handle_request(
    checker: &DomainChecker,
    event: &HashMap<String, String>,
    verbose: bool,
) -> Result<String, HandlerError> {
    let domain = event
        .get(DOMAIN_FIELD)
        .ok_or(HandlerError::MissingField(DOMAIN_FIELD))?;

    tracing::debug!(domain = %domain, "Starting check");

    match checker.check_domain(domain).await {
        Ok(result) => {
            if verbose {
                tracing::info!(
                    domain = %result.domain,
                    server = result.server.as_deref().unwrap_or("default"),
                    matched_pattern = result.matched_pattern.as_deref().unwrap_or(""),
                    duration_ms = result.check_duration.map(|d| d.as_millis() as u64).unwrap_or(0),
                    "Check completed"
                );
            }
            Ok(format!("{}: {}", domain, result.verdict))
        }
        Err(err) => {
            tracing::error!(domain = %domain, error = %err, "Error checking domain");
            Err(err.into())
        }
    }
}
