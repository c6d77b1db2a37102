//! Output formatting for lint results.

use anyhow::Result;
use errlog_core::{LintResult, ViolationDiagnostic};
use miette::GraphicalReportHandler;
use std::fmt::Write;
use std::path::Path;

use crate::OutputFormat;

/// Prints `result` in `format`. `base` locates source files for snippets.
pub fn print(result: &LintResult, format: OutputFormat, base: &Path) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => render_json(result)?,
        OutputFormat::Compact => render_compact(result),
        OutputFormat::Pretty => render_pretty(result, base),
    };
    print!("{rendered}");
    Ok(())
}

fn summary_line(result: &LintResult) -> String {
    let color = if result.has_violations() {
        "\x1b[31m"
    } else {
        "\x1b[32m"
    };
    format!("{color}{}\x1b[0m\n", result.summary())
}

fn render_text(result: &LintResult) -> String {
    let mut out = String::new();
    for violation in &result.violations {
        let _ = writeln!(out, "{}", violation.format());
    }
    out.push_str(&summary_line(result));
    out
}

fn render_json(result: &LintResult) -> Result<String> {
    let mut json = serde_json::to_string_pretty(result)?;
    json.push('\n');
    Ok(json)
}

fn render_compact(result: &LintResult) -> String {
    let mut out = String::new();
    for violation in &result.violations {
        let _ = writeln!(out, "{violation}");
    }
    out
}

fn render_pretty(result: &LintResult, base: &Path) -> String {
    let handler = GraphicalReportHandler::new();
    let mut out = String::new();

    for violation in &result.violations {
        let path = base.join(&violation.location.file);
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                let diagnostic = ViolationDiagnostic::new(violation, source);
                if handler.render_report(&mut out, &diagnostic).is_err() {
                    let _ = writeln!(out, "{}", violation.format());
                }
                if let Some(function) = &violation.function {
                    let _ = writeln!(out, "  = in: {function}");
                }
                out.push('\n');
            }
            Err(err) => {
                tracing::debug!("No source for {}: {err}", path.display());
                let _ = writeln!(out, "{}", violation.format());
            }
        }
    }

    out.push_str(&summary_line(result));
    out
}
