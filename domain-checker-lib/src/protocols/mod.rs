//! Protocol-level building blocks for domain checking.
//!
//! Server routing, the WHOIS query capability and its test double.

/// TLD to WHOIS server routing
pub mod registry;

/// WHOIS query trait and TCP client
pub mod whois;

/// Canned-response client
pub mod mock;

pub use mock::{MockWhoisClient, RecordedQuery};
pub use registry::{extract_tld, resolve_server, ServerResolution, ServerTable};
pub use whois::{TcpWhoisClient, WhoisQuery, IANA_WHOIS_SERVER, WHOIS_PORT};
