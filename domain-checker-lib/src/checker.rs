//! Main domain checker implementation.
//!
//! `DomainChecker` sequences one check: extract the TLD, pick a server, run
//! the WHOIS query, classify the response. It never retries and never caches;
//! every call performs a fresh query.

use crate::classifier::classify_with_match;
use crate::error::DomainCheckError;
use crate::protocols::{ServerTable, TcpWhoisClient, WhoisQuery};
use crate::types::{CheckConfig, DomainResult, Verdict};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;

/// Coordinates server resolution, the WHOIS query and classification.
///
/// # Example
///
/// ```rust,no_run
/// use domain_checker_lib::DomainChecker;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = DomainChecker::new();
///     let verdict = checker.check_availability("example.com").await?;
///     println!("example.com: {}", verdict);
///     Ok(())
/// }
/// ```
pub struct DomainChecker {
    /// Configuration settings for this checker instance
    config: CheckConfig,
    /// TLD -> server routing table
    servers: ServerTable,
    /// Performs the actual WHOIS exchange
    client: Arc<dyn WhoisQuery>,
}

impl DomainChecker {
    /// Create a new domain checker with default configuration and the
    /// built-in server table, querying over TCP.
    pub fn new() -> Self {
        Self::with_config(CheckConfig::default())
    }

    /// Create a new domain checker with custom configuration.
    ///
    /// ```rust
    /// use domain_checker_lib::{CheckConfig, DomainChecker};
    /// use std::time::Duration;
    ///
    /// let config = CheckConfig::default().with_timeout(Duration::from_secs(2));
    /// let checker = DomainChecker::with_config(config);
    /// assert_eq!(checker.config().timeout, Duration::from_secs(2));
    /// ```
    pub fn with_config(config: CheckConfig) -> Self {
        let client = Arc::new(TcpWhoisClient::with_timeout(config.timeout));
        Self::with_client(config, client)
    }

    /// Create a checker around an injected WHOIS client.
    pub fn with_client(config: CheckConfig, client: Arc<dyn WhoisQuery>) -> Self {
        Self {
            config,
            servers: ServerTable::builtin().clone(),
            client,
        }
    }

    /// Replace the routing table (e.g. one extended from configuration).
    pub fn with_server_table(mut self, servers: ServerTable) -> Self {
        self.servers = servers;
        self
    }

    /// Check a single domain and return its verdict.
    ///
    /// # Errors
    ///
    /// - `InvalidDomainFormat` when the domain has no TLD separator
    /// - `QueryFailed` when the WHOIS exchange fails or times out
    ///
    /// Either way the accompanying verdict is `Verdict::Unknown`
    /// (see `DomainCheckError::verdict`).
    pub async fn check_availability(&self, domain: &str) -> Result<Verdict, DomainCheckError> {
        self.check_domain(domain).await.map(|result| result.verdict)
    }

    /// Check a single domain and return the verdict with diagnostics.
    pub async fn check_domain(&self, domain: &str) -> Result<DomainResult, DomainCheckError> {
        let start_time = Instant::now();

        let resolution = self.servers.resolve(domain)?;
        let raw = self.query(domain, resolution.server).await?;
        let (verdict, matched_pattern) = classify_with_match(&raw);

        Ok(DomainResult {
            domain: domain.to_string(),
            tld: resolution.tld.to_string(),
            server: resolution.server.map(str::to_string),
            verdict,
            matched_pattern: matched_pattern.map(str::to_string),
            check_duration: Some(start_time.elapsed()),
            raw_response: self.config.keep_raw_response.then_some(raw),
        })
    }

    /// Check several domains concurrently.
    ///
    /// Checks are independent; one failure does not affect the others.
    /// At most `CheckConfig::concurrency` queries are in flight at once and
    /// results come back in input order.
    pub async fn check_domains(
        &self,
        domains: &[String],
    ) -> Vec<(String, Result<DomainResult, DomainCheckError>)> {
        stream::iter(domains.iter().cloned())
            .map(|domain| async move {
                let result = self.check_domain(&domain).await;
                (domain, result)
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    /// Run the query under the configured timeout, whatever the client does.
    async fn query(&self, domain: &str, server: Option<&str>) -> Result<String, DomainCheckError> {
        match tokio::time::timeout(self.config.timeout, self.client.query(domain, server)).await {
            Ok(result) => result,
            Err(_) => Err(DomainCheckError::query_timeout(
                domain,
                server,
                self.config.timeout,
            )),
        }
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Get the routing table this checker uses.
    pub fn servers(&self) -> &ServerTable {
        &self.servers
    }
}

impl Default for DomainChecker {
    fn default() -> Self {
        Self::new()
    }
}
