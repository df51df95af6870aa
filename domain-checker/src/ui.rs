//! Terminal presentation for the CLI.
//!
//! Result lines go to stdout unstyled so they stay machine-readable.
//! Diagnostics go to stderr and are styled with `console`.

use console::{pad_str, style, Alignment};
use domain_checker_lib::{DomainCheckError, DomainResult, ServerTable, Verdict};

/// The `<domain>: <verdict>` line.
pub fn format_result_line(domain: &str, verdict: Verdict) -> String {
    format!("{}: {}", domain, verdict)
}

/// Print the result line for one successful check.
pub fn print_result(result: &DomainResult) {
    println!("{}", format_result_line(&result.domain, result.verdict));
}

/// Print a failed check to stderr.
pub fn print_error(err: &DomainCheckError) {
    eprintln!("{} {}", style("Error:").red().bold().for_stderr(), err);
}

/// Diagnostic lines shown with `--verbose`.
pub fn diagnostic_lines(result: &DomainResult) -> Vec<String> {
    let mut lines = Vec::new();

    match &result.server {
        Some(server) => lines.push(format!("Using server: {}", server)),
        None => lines.push(format!(
            "No server configured for {}, using default discovery",
            result.tld
        )),
    }

    match &result.matched_pattern {
        Some(pattern) => lines.push(format!("Found match for string: {}", pattern)),
        None => lines.push("No availability pattern matched".to_string()),
    }

    if let Some(duration) = result.check_duration {
        lines.push(format!("Checked in {}ms", duration.as_millis()));
    }

    lines
}

/// Print verbose diagnostics, including the raw response when kept.
pub fn print_diagnostics(result: &DomainResult) {
    for line in diagnostic_lines(result) {
        eprintln!("{} {}", style("›").cyan().for_stderr(), line);
    }

    if let Some(raw) = &result.raw_response {
        eprintln!("{}", style("--- WHOIS response ---").dim().for_stderr());
        eprintln!("{}", raw.trim_end());
        eprintln!("{}", style("--- end ---").dim().for_stderr());
    }
}

/// Render the server table as aligned rows.
pub fn format_server_rows(table: &ServerTable) -> Vec<String> {
    let entries = table.entries();
    let width = entries.iter().map(|(tld, _)| tld.len()).max().unwrap_or(0);

    entries
        .into_iter()
        .map(|(tld, server)| format!("{}  {}", pad_str(tld, width, Alignment::Left, None), server))
        .collect()
}

/// Print the `servers` subcommand output.
pub fn print_servers(table: &ServerTable) {
    println!(
        "{}",
        style(format!("WHOIS servers ({})", table.len())).yellow().bold()
    );
    for row in format_server_rows(table) {
        println!("  {}", row);
    }
}
