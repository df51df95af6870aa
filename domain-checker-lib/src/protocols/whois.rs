//! WHOIS query capability.
//!
//! The checker only decides which server to ask. Performing the exchange is
//! delegated to a `WhoisQuery` implementation, so tests can swap the network
//! client for canned responses.

use crate::error::DomainCheckError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Well-known WHOIS port
pub const WHOIS_PORT: u16 = 43;

/// Server asked for referrals when no authoritative server is known
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

/// Responses larger than this are truncated
const MAX_RESPONSE_BYTES: u64 = 1024 * 1024;

/// Something that can perform a WHOIS exchange.
#[async_trait]
pub trait WhoisQuery: Send + Sync {
    /// Query WHOIS for `domain` and return the raw text response.
    ///
    /// With `server = Some(host)` the given host is asked directly. With
    /// `None` the implementation discovers the server on its own.
    async fn query(&self, domain: &str, server: Option<&str>) -> Result<String, DomainCheckError>;
}

/// WHOIS client speaking the plain-text protocol over TCP port 43.
///
/// Default discovery asks IANA about the domain's last label and follows the
/// referral it returns. The timeout bounds the whole exchange, referral
/// included; on expiry the in-flight connection is dropped.
#[derive(Debug, Clone)]
pub struct TcpWhoisClient {
    /// Timeout for a complete query
    timeout: Duration,
    /// Port used for every connection
    port: u16,
    /// Host asked for referrals
    referral_server: String,
}

impl TcpWhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            port: WHOIS_PORT,
            referral_server: IANA_WHOIS_SERVER.to_string(),
        }
    }

    /// Create a new WHOIS client with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::new()
        }
    }

    /// Use a non-standard port for every connection.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Ask a different host for referrals.
    pub fn referral_server<S: Into<String>>(mut self, server: S) -> Self {
        self.referral_server = server.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one query to one server and read the reply until EOF.
    async fn exchange(&self, server: &str, query: &str) -> std::io::Result<String> {
        let mut stream = TcpStream::connect((server, self.port)).await?;
        stream.write_all(format!("{}\r\n", query).as_bytes()).await?;

        let mut response = Vec::new();
        (&mut stream)
            .take(MAX_RESPONSE_BYTES)
            .read_to_end(&mut response)
            .await?;

        Ok(String::from_utf8_lossy(&response).into_owned())
    }

    /// Ask the referral server who is authoritative, then ask them.
    ///
    /// The referral is asked about the last non-empty label, so a trailing
    /// dot (`example.com.`) still asks about `com`.
    async fn discover_and_query(&self, domain: &str) -> std::io::Result<String> {
        let tld = domain
            .rsplit('.')
            .find(|label| !label.is_empty())
            .unwrap_or(domain);
        let iana_response = self.exchange(&self.referral_server, tld).await?;

        match parse_iana_refer_response(&iana_response) {
            Some(server) => self.exchange(&server, domain).await,
            None => Ok(iana_response),
        }
    }
}

impl Default for TcpWhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WhoisQuery for TcpWhoisClient {
    async fn query(&self, domain: &str, server: Option<&str>) -> Result<String, DomainCheckError> {
        let exchange = async {
            match server {
                Some(server) => self.exchange(server, domain).await,
                None => self.discover_and_query(domain).await,
            }
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(DomainCheckError::query_failed(
                domain,
                server,
                e.to_string(),
            )),
            Err(_) => Err(DomainCheckError::query_timeout(domain, server, self.timeout)),
        }
    }
}

/// Parse an IANA WHOIS response for the authoritative WHOIS server.
///
/// IANA may use either `refer:` or `whois:`; `refer:` wins when both exist.
///
/// ```text
/// whois:        whois.verisign-grs.com
/// refer:        whois.verisign-grs.com
/// ```
pub(crate) fn parse_iana_refer_response(response: &str) -> Option<String> {
    let mut whois_server = None;

    for line in response.lines() {
        let line_trimmed = line.trim();
        if let Some(server) = line_trimmed.strip_prefix("refer:") {
            let server = server.trim();
            if !server.is_empty() {
                return Some(server.to_string());
            }
        } else if let Some(server) = line_trimmed.strip_prefix("whois:") {
            let server = server.trim();
            if !server.is_empty() {
                whois_server = Some(server.to_string());
            }
        }
    }

    whois_server
}
