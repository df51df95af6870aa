//! Deterministic WHOIS client for tests and offline runs.

use crate::error::DomainCheckError;
use crate::protocols::whois::WhoisQuery;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A recorded call to `MockWhoisClient::query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub domain: String,
    pub server: Option<String>,
}

/// WHOIS client that answers from canned responses.
///
/// Domains without a canned response fail with `QueryFailed`, as does every
/// query once `failing` is set. Each call is recorded so tests can check
/// which server the checker chose.
#[derive(Debug, Default)]
pub struct MockWhoisClient {
    responses: HashMap<String, String>,
    failure: Option<String>,
    calls: Mutex<Vec<RecordedQuery>>,
}

impl MockWhoisClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries for `domain` with `response`.
    pub fn with_response<D: Into<String>, R: Into<String>>(mut self, domain: D, response: R) -> Self {
        self.responses.insert(domain.into(), response.into());
        self
    }

    /// Fail every query with the given transport error message.
    pub fn failing<M: Into<String>>(mut self, message: M) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WhoisQuery for MockWhoisClient {
    async fn query(&self, domain: &str, server: Option<&str>) -> Result<String, DomainCheckError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedQuery {
                domain: domain.to_string(),
                server: server.map(str::to_string),
            });
        }

        if let Some(message) = &self.failure {
            return Err(DomainCheckError::query_failed(domain, server, message.clone()));
        }

        self.responses.get(domain).cloned().ok_or_else(|| {
            DomainCheckError::query_failed(domain, server, "error getting domain information")
        })
    }
}
