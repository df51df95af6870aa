//! Configuration file parsing and environment overrides.
//!
//! Configuration is layered: built-in defaults, then TOML files, then `DC_*`
//! environment variables, then whatever the entry point applies from its own
//! flags. Everything here is resolved once at startup.

use crate::error::DomainCheckError;
use crate::protocols::ServerTable;
use crate::types::CheckConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// timeout = "2s"
/// verbose = false
/// concurrency = 10
///
/// [servers]
/// ".io" = "whois.nic.io"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for check options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Extra TLD -> WHOIS server entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<HashMap<String, String>>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Query timeout (as string, e.g., "5s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Print diagnostics for every check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Batch concurrency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

impl FileConfig {
    /// Apply file defaults on top of a check configuration.
    pub fn apply_to(&self, mut config: CheckConfig) -> CheckConfig {
        if let Some(defaults) = &self.defaults {
            if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
                config = config.with_timeout(timeout);
            }
            if let Some(concurrency) = defaults.concurrency {
                config = config.with_concurrency(concurrency);
            }
        }
        config
    }

    /// Whether the file asks for verbose output.
    pub fn verbose(&self) -> bool {
        self.defaults
            .as_ref()
            .and_then(|d| d.verbose)
            .unwrap_or(false)
    }

    /// The built-in server table extended with the `[servers]` section.
    pub fn server_table(&self) -> ServerTable {
        match &self.servers {
            Some(servers) if !servers.is_empty() => ServerTable::with_overrides(servers),
            _ => ServerTable::builtin().clone(),
        }
    }
}

/// Configuration discovery and loading.
///
/// Search roots are captured at construction so discovery can be pointed at
/// temporary directories in tests.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    home: Option<PathBuf>,
    xdg_config_home: Option<PathBuf>,
    working_dir: PathBuf,
}

impl ConfigManager {
    /// Create a manager using `HOME`, `XDG_CONFIG_HOME` and the current directory.
    pub fn new() -> Self {
        Self {
            home: env::var_os("HOME").map(PathBuf::from),
            xdg_config_home: env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            working_dir: PathBuf::from("."),
        }
    }

    /// Create a manager with explicit search roots.
    pub fn with_roots(
        home: Option<PathBuf>,
        xdg_config_home: Option<PathBuf>,
        working_dir: PathBuf,
    ) -> Self {
        Self {
            home,
            xdg_config_home,
            working_dir,
        }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        Ok(config)
    }

    /// Candidate configuration files, lowest precedence first.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        let xdg_dir = self
            .xdg_config_home
            .clone()
            .or_else(|| self.home.as_ref().map(|home| home.join(".config")));
        if let Some(dir) = xdg_dir {
            candidates.push(dir.join("domain-checker").join("config.toml"));
        }

        if let Some(home) = &self.home {
            candidates.push(home.join(".domain-checker.toml"));
        }

        candidates.push(self.working_dir.join("domain-checker.toml"));
        candidates
    }

    /// Discover and merge every existing configuration file.
    ///
    /// Returns the merged configuration and the files that contributed to it,
    /// lowest precedence first. A file that exists but does not parse is an
    /// error rather than being skipped.
    pub fn discover_and_load(&self) -> Result<(FileConfig, Vec<PathBuf>), DomainCheckError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        for path in self.candidate_paths() {
            if path.exists() {
                let config = self.load_file(&path)?;
                merged_config = self.merge_configs(merged_config, config);
                loaded_files.push(path);
            }
        }

        Ok((merged_config, loaded_files))
    }

    /// Merge two configurations; values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    if higher_defaults.timeout.is_some() {
                        lower_defaults.timeout = higher_defaults.timeout;
                    }
                    if higher_defaults.verbose.is_some() {
                        lower_defaults.verbose = higher_defaults.verbose;
                    }
                    if higher_defaults.concurrency.is_some() {
                        lower_defaults.concurrency = higher_defaults.concurrency;
                    }
                    Some(lower_defaults)
                }
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            servers: match (lower.servers, higher.servers) {
                (Some(mut lower_servers), Some(higher_servers)) => {
                    lower_servers.extend(higher_servers);
                    Some(lower_servers)
                }
                (lower_servers, higher_servers) => higher_servers.or(lower_servers),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainCheckError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(DomainCheckError::config(
                        "Concurrency must be between 1 and 100",
                    ));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(DomainCheckError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                        timeout_str
                    )));
                }
            }
        }

        if let Some(servers) = &config.servers {
            for (tld, server) in servers {
                if tld.trim_start_matches('.').is_empty() {
                    return Err(DomainCheckError::config("Server table keys cannot be empty"));
                }
                if server.is_empty() || server.contains(char::is_whitespace) {
                    return Err(DomainCheckError::config(format!(
                        "Invalid WHOIS server '{}' for '{}'",
                        server, tld
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings taken from environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    /// `DC_TIMEOUT`
    pub timeout: Option<Duration>,
    /// `DC_CONCURRENCY`
    pub concurrency: Option<usize>,
    /// `DC_CONFIG`
    pub config_path: Option<String>,
    /// `APP_VERBOSE`, any non-empty value
    pub verbose: bool,
    /// `LOG_LEVEL`
    pub log_level: Option<String>,
    /// Present and non-empty `AWS_LAMBDA_FUNCTION_NAME`
    pub function_name: Option<String>,
    /// Values that were set but could not be used
    pub warnings: Vec<String>,
}

impl EnvConfig {
    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = EnvConfig::default();

        if let Some(val) = non_empty("DC_TIMEOUT") {
            match parse_timeout_string(&val) {
                Some(timeout) => config.timeout = Some(timeout),
                None => config.warnings.push(format!(
                    "Invalid DC_TIMEOUT='{}', use format like '5s', '30s', '2m'",
                    val
                )),
            }
        }

        if let Some(val) = non_empty("DC_CONCURRENCY") {
            match val.trim().parse::<usize>() {
                Ok(n) if (1..=100).contains(&n) => config.concurrency = Some(n),
                _ => config
                    .warnings
                    .push(format!("Invalid DC_CONCURRENCY='{}', must be 1-100", val)),
            }
        }

        config.config_path = non_empty("DC_CONFIG");
        config.verbose = non_empty("APP_VERBOSE").is_some();
        config.log_level = non_empty("LOG_LEVEL");
        config.function_name = non_empty("AWS_LAMBDA_FUNCTION_NAME");

        config
    }

    /// Apply environment overrides on top of a check configuration.
    pub fn apply_to(&self, mut config: CheckConfig) -> CheckConfig {
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        config
    }
}

/// Load configuration from the process environment.
pub fn load_env_config() -> EnvConfig {
    EnvConfig::from_lookup(|key| env::var(key).ok())
}

/// Parse a timeout string like "5s", "30s", "2m" or a bare number of seconds.
///
/// Zero is rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    if let Some(ms) = timeout_str.strip_suffix("ms") {
        return ms
            .parse::<u64>()
            .ok()
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis);
    }

    let seconds = if let Some(s) = timeout_str.strip_suffix('s') {
        s.parse::<u64>().ok()
    } else if let Some(m) = timeout_str.strip_suffix('m') {
        m.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    };

    seconds.filter(|&s| s > 0).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("30S"), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout_string("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("750ms"), Some(Duration::from_millis(750)));
        assert_eq!(parse_timeout_string("0s"), None);
        assert_eq!(parse_timeout_string("invalid"), None);
        assert_eq!(parse_timeout_string(""), None);
    }

    #[test]
    fn test_parse_timeout_string_rejects_overflow() {
        assert_eq!(parse_timeout_string("307445734561825861m"), None);
        assert_eq!(parse_timeout_string("18446744073709551616s"), None);
        assert_eq!(
            parse_timeout_string("307445734561825860m"),
            Some(Duration::from_secs(307445734561825860 * 60))
        );
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
timeout = "2s"
verbose = true
concurrency = 25

[servers]
".io" = "whois.nic.io"
"dev" = "whois.nic.google"
"#,
        );

        let manager = ConfigManager::new();
        let config = manager.load_file(temp_file.path()).unwrap();

        assert!(config.verbose());
        let check = config.apply_to(CheckConfig::default());
        assert_eq!(check.timeout, Duration::from_secs(2));
        assert_eq!(check.concurrency, 25);

        let table = config.server_table();
        assert_eq!(table.get(".io"), Some("whois.nic.io"));
        assert_eq!(table.get(".dev"), Some("whois.nic.google"));
        assert_eq!(table.get(".com"), Some("whois.verisign-grs.com"));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let cases = [
            "[defaults]\nconcurrency = 0\n",
            "[defaults]\ntimeout = \"soon\"\n",
            "[servers]\n\".io\" = \"\"\n",
            "[servers]\n\".\" = \"whois.example\"\n",
            "[defaults\nbroken",
        ];

        let manager = ConfigManager::new();
        for content in cases {
            let temp_file = write_config(content);
            let err = manager.load_file(temp_file.path()).unwrap_err();
            assert!(
                matches!(err, DomainCheckError::ConfigError { .. }),
                "{content:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigManager::new()
            .load_file("/nonexistent/domain-checker.toml")
            .unwrap_err();
        assert!(matches!(err, DomainCheckError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new();

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("5s".to_string()),
                verbose: Some(true),
                ..Default::default()
            }),
            servers: Some(HashMap::from([
                (".io".to_string(), "whois.old.io".to_string()),
                (".dev".to_string(), "whois.nic.google".to_string()),
            ])),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("2s".to_string()),
                ..Default::default()
            }),
            servers: Some(HashMap::from([(
                ".io".to_string(),
                "whois.nic.io".to_string(),
            )])),
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();
        assert_eq!(defaults.timeout.as_deref(), Some("2s")); // Higher wins
        assert_eq!(defaults.verbose, Some(true)); // Lower preserved

        let servers = merged.servers.unwrap();
        assert_eq!(servers[".io"], "whois.nic.io");
        assert_eq!(servers[".dev"], "whois.nic.google");
    }

    #[test]
    fn test_discover_and_load_precedence() {
        let home = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();

        let xdg_dir = home.path().join(".config").join("domain-checker");
        fs::create_dir_all(&xdg_dir).unwrap();
        fs::write(
            xdg_dir.join("config.toml"),
            "[defaults]\ntimeout = \"9s\"\nconcurrency = 3\n",
        )
        .unwrap();
        fs::write(
            home.path().join(".domain-checker.toml"),
            "[defaults]\ntimeout = \"7s\"\n",
        )
        .unwrap();
        fs::write(
            cwd.path().join("domain-checker.toml"),
            "[defaults]\ntimeout = \"3s\"\n",
        )
        .unwrap();

        let manager =
            ConfigManager::with_roots(Some(home.path().to_path_buf()), None, cwd.path().to_path_buf());
        let (config, loaded) = manager.discover_and_load().unwrap();

        assert_eq!(loaded.len(), 3);
        let check = config.apply_to(CheckConfig::default());
        assert_eq!(check.timeout, Duration::from_secs(3));
        assert_eq!(check.concurrency, 3);
    }

    #[test]
    fn test_discover_nothing() {
        let empty = TempDir::new().unwrap();
        let manager = ConfigManager::with_roots(None, None, empty.path().to_path_buf());
        let (config, loaded) = manager.discover_and_load().unwrap();
        assert!(loaded.is_empty());
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.server_table(), *ServerTable::builtin());
    }

    #[test]
    fn test_env_config() {
        let vars = HashMap::from([
            ("DC_TIMEOUT", "2s"),
            ("DC_CONCURRENCY", "500"),
            ("APP_VERBOSE", "1"),
            ("LOG_LEVEL", "debug"),
            ("AWS_LAMBDA_FUNCTION_NAME", ""),
        ]);
        let env = EnvConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(env.timeout, Some(Duration::from_secs(2)));
        assert_eq!(env.concurrency, None);
        assert_eq!(env.warnings.len(), 1);
        assert!(env.verbose);
        assert_eq!(env.log_level.as_deref(), Some("debug"));
        assert_eq!(env.function_name, None);

        let check = env.apply_to(CheckConfig::default());
        assert_eq!(check.timeout, Duration::from_secs(2));
        assert_eq!(check.concurrency, 10);
    }

    #[test]
    fn test_env_config_empty() {
        let env = EnvConfig::from_lookup(|_| None);
        assert_eq!(env, EnvConfig::default());
        assert!(!env.verbose);
    }
}
