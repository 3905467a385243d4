//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with dedicated
//! rendering for validation reports.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use fieldrules_core::{FieldErrors, ValidationError, ValidationErrors};
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Outcome of one `validate` run, as written to the output
#[derive(Debug, Serialize)]
pub struct ValidationReport<'a> {
    pub valid: bool,
    pub error_count: usize,
    pub errors: &'a [ValidationError],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<&'a FieldErrors>,
    /// Declarations that were skipped for lack of an evaluator
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl<'a> ValidationReport<'a> {
    pub fn new(outcome: Option<&'a ValidationErrors>, skipped: Vec<String>) -> Self {
        match outcome {
            Some(errors) => Self {
                valid: false,
                error_count: errors.len(),
                errors: &errors.errors,
                fields: Some(&errors.fields),
                skipped,
            },
            None => Self {
                valid: true,
                error_count: 0,
                errors: &[],
                fields: None,
                skipped,
            },
        }
    }
}

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation report, grouping errors by field for humans
    fn format_validation_report(&self, report: &ValidationReport<'_>) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // For human format, use pretty JSON as fallback
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_validation_report(&self, report: &ValidationReport<'_>) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_report_human(report)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self::with_writer(format, use_color, quiet, verbose, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            verbose,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Check if verbose output should be shown
    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!("Outputting {} bytes of data", formatted.len());

        if self.format == OutputFormat::Human || self.format == OutputFormat::Yaml {
            self.write(&formatted)?;
            if !formatted.ends_with('\n') {
                self.writeln("")?;
            }
            Ok(())
        } else {
            self.writeln(&formatted)
        }
    }

    /// Write a validation report
    ///
    /// A failing report is written even in quiet mode.
    pub fn validation_report(&mut self, report: &ValidationReport<'_>) -> Result<()> {
        if report.valid && self.quiet && self.format == OutputFormat::Human {
            return Ok(());
        }

        let formatted = self.format.format_validation_report(report)?;
        let formatted = if self.use_color && self.format == OutputFormat::Human {
            colorize_report(&formatted, report.valid)
        } else {
            formatted
        };
        self.write(&formatted)?;
        if !formatted.ends_with('\n') {
            self.writeln("")?;
        }
        Ok(())
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        // Calculate column widths
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(header_row.trim_end().bold().to_string().as_str())?;
        } else {
            self.writeln(header_row.trim_end())?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i < widths.len() {
                        format!("{:width$}", cell, width = widths[i])
                    } else {
                        cell.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Format a validation report for human reading
fn format_validation_report_human(report: &ValidationReport<'_>) -> String {
    let mut output = String::new();

    for skipped in &report.skipped {
        output.push_str(&format!("⚠ Skipped: {}\n", skipped));
    }

    let Some(fields) = report.fields else {
        output.push_str("✓ All rules passed\n");
        return output;
    };

    output.push_str(&format!(
        "✗ Validation failed - {} error(s) in {} field(s)\n",
        report.error_count,
        fields.len()
    ));

    for (field, errors) in fields.iter() {
        output.push('\n');
        output.push_str(field);
        output.push('\n');
        for error in errors {
            output.push_str(&format!("  • {}\n", error.message));
        }
    }

    output
}

fn colorize_report(formatted: &str, valid: bool) -> String {
    formatted
        .lines()
        .map(|line| {
            if line.starts_with('✓') {
                line.green().to_string()
            } else if line.starts_with('✗') {
                line.red().bold().to_string()
            } else if line.starts_with('⚠') {
                line.yellow().to_string()
            } else if !valid && !line.is_empty() && !line.starts_with(' ') {
                line.bold().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
