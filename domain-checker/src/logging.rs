//! Log output setup.
//!
//! The binary never installs a process-global subscriber. `build_dispatch`
//! returns a `Dispatch` that the entry point attaches to its future with
//! `WithSubscriber`, so a test can run the same code under its own sink.

use crate::RunMode;
use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text on stderr, for terminals
    Text,
    /// JSON lines on stdout, for function log collectors
    Json,
}

/// Logger settings resolved at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub format: LogFormat,
}

impl LogConfig {
    /// Settings for a run mode. `verbose` forces debug level.
    pub fn for_mode(mode: RunMode, log_level: Option<&str>, verbose: bool) -> Self {
        let level = if verbose {
            LevelFilter::DEBUG
        } else {
            parse_log_level(log_level)
        };

        let format = match mode {
            RunMode::Cli => LogFormat::Text,
            RunMode::Function => LogFormat::Json,
        };

        Self { level, format }
    }
}

/// Parse a `LOG_LEVEL` value. Anything unrecognised means info.
pub fn parse_log_level(level: Option<&str>) -> LevelFilter {
    match level.map(|l| l.trim().to_lowercase()).as_deref() {
        Some("trace") => LevelFilter::TRACE,
        Some("debug") => LevelFilter::DEBUG,
        Some("warn") | Some("warning") => LevelFilter::WARN,
        Some("error") => LevelFilter::ERROR,
        Some("off") => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Build a dispatcher writing to the default sink for the format.
pub fn build_dispatch(config: &LogConfig) -> Dispatch {
    match config.format {
        LogFormat::Text => build_dispatch_with_writer(config, std::io::stderr),
        LogFormat::Json => build_dispatch_with_writer(config, std::io::stdout),
    }
}

/// Build a dispatcher writing to an arbitrary sink.
pub fn build_dispatch_with_writer<W>(config: &LogConfig, writer: W) -> Dispatch
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::new(config.level.to_string());

    match config.format {
        LogFormat::Text => Dispatch::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_target(false)
                .without_time()
                .compact()
                .finish(),
        ),
        LogFormat::Json => Dispatch::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .json()
                .with_current_span(false)
                .finish(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level(Some("debug")), LevelFilter::DEBUG);
        assert_eq!(parse_log_level(Some("DEBUG")), LevelFilter::DEBUG);
        assert_eq!(parse_log_level(Some("warn")), LevelFilter::WARN);
        assert_eq!(parse_log_level(Some("error")), LevelFilter::ERROR);
        assert_eq!(parse_log_level(Some("info")), LevelFilter::INFO);
        assert_eq!(parse_log_level(Some("chatty")), LevelFilter::INFO);
        assert_eq!(parse_log_level(None), LevelFilter::INFO);
    }

    #[test]
    fn test_config_for_mode() {
        let cli = LogConfig::for_mode(RunMode::Cli, Some("error"), false);
        assert_eq!(cli.format, LogFormat::Text);
        assert_eq!(cli.level, LevelFilter::ERROR);

        let function = LogConfig::for_mode(RunMode::Function, None, true);
        assert_eq!(function.format, LogFormat::Json);
        assert_eq!(function.level, LevelFilter::DEBUG);
    }

    #[test]
    fn test_json_dispatch_writes_structured_fields() {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let config = LogConfig::for_mode(RunMode::Function, Some("info"), false);
        let dispatch = build_dispatch_with_writer(&config, move || sink.clone());

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!(domain = "example.com", "Starting check");
            tracing::debug!("filtered out");
        });

        let output = buffer.contents();
        assert!(output.contains("\"domain\":\"example.com\""));
        assert!(output.contains("Starting check"));
        assert!(!output.contains("filtered out"));
    }

    #[test]
    fn test_text_dispatch_respects_level() {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let config = LogConfig::for_mode(RunMode::Cli, Some("warn"), false);
        let dispatch = build_dispatch_with_writer(&config, move || sink.clone());

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!("hidden");
            tracing::warn!("shown");
        });

        let output = buffer.contents();
        assert!(output.contains("shown"));
        assert!(!output.contains("hidden"));
    }
}
