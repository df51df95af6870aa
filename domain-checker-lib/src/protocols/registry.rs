//! TLD to WHOIS server mappings.
//!
//! The routing key is everything from the first dot of the domain onwards, so
//! second-level registries such as `.co.jp` are keyed whole. Anything not in
//! the table is left to the query client's default server discovery.

use crate::error::DomainCheckError;
use std::collections::{BTreeMap, HashMap};

lazy_static::lazy_static! {
    static ref BUILTIN_TABLE: ServerTable = ServerTable::from_entries(builtin_servers());
}

/// Built-in TLD -> authoritative WHOIS server mappings.
fn builtin_servers() -> HashMap<String, String> {
    [
        (".com", "whois.verisign-grs.com"),
        (".net", "whois.verisign-grs.com"),
        (".org", "whois.pir.org"),
        (".info", "whois.afilias.net"),
        (".com.ar", "whois.nic.ar"),
        (".ar", "whois.nic.ar"),
        (".co.jp", "whois.jprs.jp"),
        (".jp", "whois.jprs.jp"),
    ]
    .into_iter()
    .map(|(tld, server)| (tld.to_string(), server.to_string()))
    .collect()
}

/// Outcome of resolving a domain against the server table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerResolution<'a> {
    /// Routing suffix, including the leading dot
    pub tld: &'a str,
    /// Authoritative server, `None` when the table has no entry
    pub server: Option<&'a str>,
}

impl ServerResolution<'_> {
    /// Whether the table had a server for this TLD.
    pub fn found(&self) -> bool {
        self.server.is_some()
    }
}

/// Read-only mapping from TLD to WHOIS server hostname.
///
/// Build it once (optionally with extra entries from configuration) before
/// sharing it; there is no way to mutate a table afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTable {
    servers: HashMap<String, String>,
}

impl ServerTable {
    fn from_entries(servers: HashMap<String, String>) -> Self {
        Self { servers }
    }

    /// The built-in table, shared process-wide.
    pub fn builtin() -> &'static ServerTable {
        &BUILTIN_TABLE
    }

    /// A copy of the built-in table extended with extra entries.
    ///
    /// Extra keys without a leading dot get one (`io` becomes `.io`), and
    /// extra entries replace built-in ones for the same key.
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut servers = builtin_servers();
        for (tld, server) in overrides {
            let key = if tld.starts_with('.') {
                tld.clone()
            } else {
                format!(".{}", tld)
            };
            servers.insert(key, server.clone());
        }
        Self::from_entries(servers)
    }

    /// Look up the server for an exact TLD key (e.g. ".com").
    pub fn get(&self, tld: &str) -> Option<&str> {
        self.servers.get(tld).map(String::as_str)
    }

    /// Resolve which server to query for a domain.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDomainFormat` when the domain contains no dot.
    pub fn resolve<'a>(&'a self, domain: &'a str) -> Result<ServerResolution<'a>, DomainCheckError> {
        let tld = extract_tld(domain)?;
        Ok(ServerResolution {
            tld,
            server: self.get(tld),
        })
    }

    /// All entries sorted by TLD.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        self.servers
            .iter()
            .map(|(tld, server)| (tld.as_str(), server.as_str()))
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

/// Extract the routing suffix of a domain: everything from the first dot.
///
/// No normalisation is applied. `www.example.com` yields `.example.com`;
/// callers are expected to pass a bare registrable domain.
///
/// # Errors
///
/// Returns `InvalidDomainFormat` when the domain contains no dot.
pub fn extract_tld(domain: &str) -> Result<&str, DomainCheckError> {
    domain
        .find('.')
        .map(|index| &domain[index..])
        .ok_or_else(|| DomainCheckError::invalid_domain_format(domain))
}

/// Resolve a domain against the built-in server table.
pub fn resolve_server(domain: &str) -> Result<ServerResolution<'_>, DomainCheckError> {
    ServerTable::builtin().resolve(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tld() {
        assert_eq!(extract_tld("test.com").unwrap(), ".com");
        assert_eq!(extract_tld("test.co.jp").unwrap(), ".co.jp");
        assert_eq!(extract_tld("www.example.com").unwrap(), ".example.com");
        assert_eq!(extract_tld("trailing.").unwrap(), ".");
    }

    #[test]
    fn test_extract_tld_without_dot() {
        for domain in ["test", "", "localhost"] {
            let err = extract_tld(domain).unwrap_err();
            assert_eq!(err, DomainCheckError::invalid_domain_format(domain));
        }
    }

    #[test]
    fn test_every_builtin_tld_resolves_to_its_server() {
        let table = ServerTable::builtin();
        for (tld, server) in table.entries() {
            let domain = format!("example{}", tld);
            let resolution = table.resolve(&domain).unwrap();
            assert!(resolution.found());
            assert_eq!(resolution.tld, tld);
            assert_eq!(resolution.server, Some(server));
        }
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let resolution = resolve_server("example.com").unwrap();
        assert_eq!(resolution.server, Some("whois.verisign-grs.com"));
        assert!(resolution.found());

        let resolution = resolve_server("example.zz").unwrap();
        assert_eq!(resolution.tld, ".zz");
        assert_eq!(resolution.server, None);
        assert!(!resolution.found());

        assert!(resolve_server("test").is_err());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(!resolve_server("EXAMPLE.COM").unwrap().found());
    }

    #[test]
    fn test_second_level_keys() {
        assert_eq!(
            resolve_server("example.co.jp").unwrap().server,
            Some("whois.jprs.jp")
        );
        assert_eq!(
            resolve_server("example.com.ar").unwrap().server,
            Some("whois.nic.ar")
        );
        // Only keyed suffixes match; .ne.jp is not in the table
        assert!(!resolve_server("example.ne.jp").unwrap().found());
    }

    #[test]
    fn test_with_overrides() {
        let extra = HashMap::from([
            ("io".to_string(), "whois.nic.io".to_string()),
            (".org".to_string(), "whois.example.org".to_string()),
        ]);
        let table = ServerTable::with_overrides(&extra);

        assert_eq!(table.get(".io"), Some("whois.nic.io"));
        assert_eq!(table.get(".org"), Some("whois.example.org"));
        assert_eq!(table.get(".com"), Some("whois.verisign-grs.com"));
        assert_eq!(table.len(), ServerTable::builtin().len() + 1);

        // The shared built-in table is untouched
        assert_eq!(ServerTable::builtin().get(".org"), Some("whois.pir.org"));
        assert_eq!(ServerTable::builtin().get(".io"), None);
    }

    #[test]
    fn test_entries_sorted() {
        let entries = ServerTable::builtin().entries();
        let mut sorted = entries.clone();
        sorted.sort();
        assert_eq!(entries, sorted);
        assert_eq!(entries.len(), 8);
        assert!(!ServerTable::builtin().is_empty());
    }
}
