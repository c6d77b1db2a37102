//! error-log-or-return CLI tool.
//!
//! Usage:
//! ```bash
//! error-log-or-return [OPTIONS] [PATTERN]
//! error-log-or-return ./...
//! error-log-or-return --version
//! ```

use anyhow::Result;
use clap::Parser;
use errlog_core::{verbose_from_env, VERBOSE_ENV};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Checks that Go methods either log their captured error or return it, not both
#[derive(Parser)]
#[command(name = "error-log-or-return")]
#[command(author, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Package pattern or directory; a trailing `/...` includes subdirectories
    pattern: Option<String>,

    /// Print version and exit
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Enable verbose output (also ERROR_LOG_OR_RETURN_VERBOSE=1)
    #[arg(long)]
    verbose: bool,

    /// Path to the ignore configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Graphical diagnostics with source snippets.
    Pretty,
}

/// True if `-v` or `--version` appears anywhere in the arguments.
fn version_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .any(|arg| matches!(arg.as_ref().to_str(), Some("-v" | "--version")))
}

/// Version line printed by `--version`.
fn version_line() -> String {
    let version = option_env!("CARGO_PKG_VERSION")
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown");
    format!("Version: {version}")
}

fn main() -> Result<ExitCode> {
    if version_requested(std::env::args_os().skip(1)) {
        println!("{}", version_line());
        return Ok(ExitCode::SUCCESS);
    }

    let cli = Cli::parse();
    let verbose = cli.verbose || verbose_from_env(std::env::var(VERBOSE_ENV).ok().as_deref());

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let code = commands::check::run(cli.pattern.as_deref(), cli.config.as_deref(), cli.format)?;
    Ok(ExitCode::from(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_flag_anywhere_in_args() {
        assert!(version_requested(["-v"]));
        assert!(version_requested(["./...", "--version"]));
        assert!(version_requested(["--verbose", "-v", "./pkg"]));
        assert!(!version_requested(["./...", "--verbose"]));
        assert!(!version_requested(["-vv"]));
        assert!(!version_requested(Vec::<String>::new()));
    }

    #[test]
    fn version_line_has_prefix() {
        let line = version_line();
        assert!(line.starts_with("Version: "));
        assert_ne!(line, "Version: ");
    }

    #[test]
    fn cli_parses_pattern_and_options() {
        let cli = Cli::try_parse_from([
            "error-log-or-return",
            "--verbose",
            "-c",
            "ignore.toml",
            "-f",
            "compact",
            "./internal/...",
        ])
        .expect("valid arguments");
        assert_eq!(cli.pattern.as_deref(), Some("./internal/..."));
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("ignore.toml")));
        assert!(matches!(cli.format, OutputFormat::Compact));
    }

    #[test]
    fn cli_pattern_is_optional() {
        let cli = Cli::try_parse_from(["error-log-or-return"]).expect("valid arguments");
        assert!(cli.pattern.is_none());
        assert!(matches!(cli.format, OutputFormat::Text));
    }
}
