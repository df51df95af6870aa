//! Domain Checker
//!
//! Checks whether domains are registered by querying WHOIS. Runs as a
//! command-line tool, or as a cloud function when the function runtime
//! environment is present.

mod function;
mod logging;
mod runtime;
mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use domain_checker_lib::{
    load_env_config, parse_timeout_string, CheckConfig, ConfigManager, DomainCheckError,
    DomainChecker, DomainResult, EnvConfig, FileConfig,
};
use logging::LogConfig;
use std::process;
use std::time::Duration;
use tracing::instrument::WithSubscriber;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Query timeout used when serving function invocations.
const FUNCTION_TIMEOUT: Duration = Duration::from_secs(2);

/// CLI arguments for domain-checker
#[derive(Parser, Debug)]
#[command(name = "domain-checker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check whether domains are registered using WHOIS")]
#[command(
    long_about = "Check whether domains are registered using WHOIS.\n\nQueries the authoritative WHOIS server for the domain's TLD and reports DomainAvailable, DomainUnavailable or DomainUnknown."
)]
#[command(styles = STYLES)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Use specific config file instead of automatic discovery
    #[arg(
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Configuration"
    )]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check whois records for one or more domain names
    Check(CheckArgs),
    /// List the WHOIS servers used for each TLD
    Servers,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Domain name to check, including its TLD (repeat for several)
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN", required = true)]
    pub domains: Vec<String>,

    /// Show the server used, the matched pattern and the raw response
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Query timeout, e.g. "2s", "500ms", "1m"
    #[arg(short = 't', long = "timeout", value_name = "DURATION")]
    pub timeout: Option<String>,
}

impl Args {
    fn verbose(&self) -> bool {
        matches!(&self.command, Command::Check(check) if check.verbose)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Cli,
    Function,
}

/// Function mode iff the function name variable is set and non-empty.
pub fn determine_run_mode(function_name: Option<&str>) -> RunMode {
    match function_name {
        Some(name) if !name.trim().is_empty() => RunMode::Function,
        _ => RunMode::Cli,
    }
}

#[tokio::main]
async fn main() {
    let env_config = load_env_config();

    let code = match determine_run_mode(env_config.function_name.as_deref()) {
        RunMode::Function => run_function(env_config).await,
        RunMode::Cli => run_cli(Args::parse(), env_config).await,
    };

    process::exit(code);
}

async fn run_function(env_config: EnvConfig) -> i32 {
    let log_config =
        LogConfig::for_mode(RunMode::Function, env_config.log_level.as_deref(), false);
    let dispatch = logging::build_dispatch(&log_config);

    async move {
        for warning in &env_config.warnings {
            tracing::warn!("{}", warning);
        }

        let config = env_config.apply_to(CheckConfig::default().with_timeout(FUNCTION_TIMEOUT));
        let checker = DomainChecker::with_config(config);

        let outcome = match runtime::RuntimeClient::from_env() {
            Ok(client) => runtime::run(&client, &checker, env_config.verbose).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(()) => 0,
            Err(err) => {
                tracing::error!(error = %err, "Function runtime stopped");
                1
            }
        }
    }
    .with_subscriber(dispatch)
    .await
}

async fn run_cli(args: Args, env_config: EnvConfig) -> i32 {
    let log_config =
        LogConfig::for_mode(RunMode::Cli, env_config.log_level.as_deref(), args.verbose());
    let dispatch = logging::build_dispatch(&log_config);

    async move {
        match execute(args, &env_config).await {
            Ok(code) => code,
            Err(err) => {
                eprintln!("Error: {}", err);
                1
            }
        }
    }
    .with_subscriber(dispatch)
    .await
}

async fn execute(args: Args, env_config: &EnvConfig) -> Result<i32, Box<dyn std::error::Error>> {
    for warning in &env_config.warnings {
        tracing::warn!("{}", warning);
    }

    let file_config = load_file_config(args.config.as_deref(), env_config)?;

    match args.command {
        Command::Servers => {
            ui::print_servers(&file_config.server_table());
            Ok(0)
        }
        Command::Check(check) => run_check(check, &file_config, env_config).await,
    }
}

/// Load the explicit config file (`--config`, then `DC_CONFIG`), or discover one.
fn load_file_config(
    explicit_path: Option<&str>,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new();

    if let Some(path) = explicit_path.or(env_config.config_path.as_deref()) {
        tracing::debug!(path, "Using explicit config file");
        let file_config = config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?;
        return Ok(file_config);
    }

    let (file_config, loaded) = config_manager.discover_and_load()?;
    for path in &loaded {
        tracing::debug!(path = %path.display(), "Loaded config file");
    }
    Ok(file_config)
}

/// Layer file, environment and flags (lowest to highest precedence).
fn build_check_config(
    check: &CheckArgs,
    file_config: &FileConfig,
    env_config: &EnvConfig,
) -> Result<CheckConfig, String> {
    let mut config = file_config.apply_to(CheckConfig::default());
    config = env_config.apply_to(config);

    if let Some(timeout_str) = &check.timeout {
        let timeout = parse_timeout_string(timeout_str).ok_or_else(|| {
            format!(
                "Invalid timeout '{}', use format like '5s', '30s', '2m'",
                timeout_str
            )
        })?;
        config = config.with_timeout(timeout);
    }

    let verbose = check.verbose || env_config.verbose || file_config.verbose();
    Ok(config.with_raw_response(verbose))
}

async fn run_check(
    check: CheckArgs,
    file_config: &FileConfig,
    env_config: &EnvConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let config = build_check_config(&check, file_config, env_config)?;
    let verbose = config.keep_raw_response;
    let checker = DomainChecker::with_config(config).with_server_table(file_config.server_table());

    tracing::debug!(
        domains = check.domains.len(),
        timeout = ?checker.config().timeout,
        concurrency = checker.config().concurrency,
        "Starting checks"
    );

    let results = checker.check_domains(&check.domains).await;

    if check.json {
        println!("{}", json_report(&results)?);
    }

    let mut failures = 0;
    for (domain, outcome) in &results {
        match outcome {
            Ok(result) => {
                tracing::debug!(domain = %domain, verdict = %result.verdict, "Check completed");
                if !check.json {
                    ui::print_result(result);
                }
                if verbose {
                    ui::print_diagnostics(result);
                }
            }
            Err(err) => {
                failures += 1;
                tracing::debug!(domain = %domain, error = %err, "Check failed");
                ui::print_error(err);
            }
        }
    }

    Ok(if failures > 0 { 1 } else { 0 })
}

/// One JSON entry per domain, in input order. Failures carry an `error` field.
fn json_report(
    results: &[(String, Result<DomainResult, DomainCheckError>)],
) -> Result<String, serde_json::Error> {
    let entries = results
        .iter()
        .map(|(domain, outcome)| match outcome {
            Ok(result) => serde_json::to_value(result),
            Err(err) => Ok(serde_json::json!({
                "domain": domain,
                "verdict": err.verdict(),
                "error": err.to_string(),
            })),
        })
        .collect::<Result<Vec<_>, _>>()?;

    serde_json::to_string_pretty(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_checker_lib::{DefaultsConfig, Verdict};

    fn check_args(argv: &[&str]) -> CheckArgs {
        let mut full = vec!["domain-checker", "check"];
        full.extend_from_slice(argv);
        match Args::try_parse_from(full).unwrap().command {
            Command::Check(check) => check,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_determine_run_mode() {
        assert_eq!(determine_run_mode(None), RunMode::Cli);
        assert_eq!(determine_run_mode(Some("")), RunMode::Cli);
        assert_eq!(determine_run_mode(Some("  ")), RunMode::Cli);
        assert_eq!(determine_run_mode(Some("domain-checker")), RunMode::Function);
    }

    #[test]
    fn test_parse_check_args() {
        let check = check_args(&["-d", "example.com", "--domain", "example.org", "-v"]);
        assert_eq!(check.domains, vec!["example.com", "example.org"]);
        assert!(check.verbose);
        assert!(!check.json);
        assert!(check.timeout.is_none());
    }

    #[test]
    fn test_check_requires_domain() {
        assert!(Args::try_parse_from(["domain-checker", "check"]).is_err());
        assert!(Args::try_parse_from(["domain-checker"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let args = Args::try_parse_from(["domain-checker", "servers", "--config", "x.toml"]).unwrap();
        assert_eq!(args.config.as_deref(), Some("x.toml"));
        assert!(!args.verbose());
    }

    #[test]
    fn test_config_precedence() {
        let file_config = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("10s".to_string()),
                verbose: None,
                concurrency: Some(4),
            }),
            servers: None,
        };
        let env_config = EnvConfig {
            timeout: Some(Duration::from_secs(7)),
            ..Default::default()
        };

        let config = build_check_config(&check_args(&["-d", "a.com"]), &file_config, &env_config)
            .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.concurrency, 4);
        assert!(!config.keep_raw_response);

        let config = build_check_config(
            &check_args(&["-d", "a.com", "--timeout", "3s"]),
            &file_config,
            &env_config,
        )
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_verbose_from_any_layer_keeps_raw_response() {
        let env_config = EnvConfig {
            verbose: true,
            ..Default::default()
        };
        let config = build_check_config(
            &check_args(&["-d", "a.com"]),
            &FileConfig::default(),
            &env_config,
        )
        .unwrap();
        assert!(config.keep_raw_response);
    }

    #[test]
    fn test_invalid_timeout_flag() {
        let err = build_check_config(
            &check_args(&["-d", "a.com", "--timeout", "soon"]),
            &FileConfig::default(),
            &EnvConfig::default(),
        )
        .unwrap_err();
        assert!(err.contains("Invalid timeout 'soon'"));
    }

    #[test]
    fn test_json_report() {
        let ok = DomainResult {
            domain: "example.com".to_string(),
            tld: ".com".to_string(),
            server: Some("whois.verisign-grs.com".to_string()),
            verdict: Verdict::Available,
            matched_pattern: Some("No match".to_string()),
            check_duration: None,
            raw_response: None,
        };
        let results = vec![
            ("example.com".to_string(), Ok(ok)),
            (
                "test".to_string(),
                Err(DomainCheckError::invalid_domain_format("test")),
            ),
        ];

        let json: serde_json::Value = serde_json::from_str(&json_report(&results).unwrap()).unwrap();
        assert_eq!(json[0]["verdict"], "DomainAvailable");
        assert_eq!(json[1]["domain"], "test");
        assert_eq!(json[1]["verdict"], "DomainUnknown");
        assert!(json[1]["error"]
            .as_str()
            .unwrap()
            .contains("invalid domain format"));
    }
}
