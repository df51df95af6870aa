//! # Domain Checker Library
//!
//! Determine whether a domain name is registered by querying WHOIS and
//! classifying the text that comes back.
//!
//! Two pieces carry the decision logic:
//!
//! - a server table that routes a domain's TLD (everything from its first
//!   dot) to an authoritative WHOIS server, falling back to default
//!   discovery for unknown TLDs;
//! - a classifier that scans a raw response for a fixed set of
//!   "domain is free" phrases.
//!
//! `DomainChecker` sequences them around an injectable `WhoisQuery`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_checker_lib::DomainChecker;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = DomainChecker::new();
//!     let verdict = checker.check_availability("example.com").await?;
//!     println!("example.com: {}", verdict);
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without the network
//!
//! ```rust
//! use domain_checker_lib::{CheckConfig, DomainChecker, MockWhoisClient, Verdict};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let mock = MockWhoisClient::new().with_response("example.com", "No match for \"EXAMPLE.COM\".");
//! let checker = DomainChecker::with_client(CheckConfig::default(), Arc::new(mock));
//! assert_eq!(checker.check_availability("example.com").await.unwrap(), Verdict::Available);
//! # });
//! ```

pub use checker::DomainChecker;
pub use classifier::{classify, classify_with_match, AvailabilityClassifier, AVAILABILITY_PATTERNS};
pub use config::{
    load_env_config, parse_timeout_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
};
pub use error::DomainCheckError;
pub use protocols::{
    extract_tld, resolve_server, MockWhoisClient, RecordedQuery, ServerResolution, ServerTable,
    TcpWhoisClient, WhoisQuery, IANA_WHOIS_SERVER, WHOIS_PORT,
};
pub use types::{CheckConfig, DomainResult, Verdict};

mod checker;
mod classifier;
mod config;
mod error;
mod protocols;
mod types;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainCheckError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
