//! Rendering of diagnostics for the terminal and for machines.

use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::diagnostics::{Diagnostic, Severity};

// ============================================================================
// PLAIN TEXT
// ============================================================================

/// `{file}:{line}:{column}: {code} {message}`.
///
/// A missing line or column renders as `0`; a missing file as `fallback_file`.
///
/// # Examples
///
/// ```rust
/// use mplcheck::cli::output::format_plain;
/// use mplcheck::diagnostics::{Diagnostic, DiagnosticKind};
///
/// let diagnostic = Diagnostic::detached(DiagnosticKind::MissingManifest);
/// assert_eq!(format_plain(&diagnostic, "pkg"), "pkg:0:0: E003 Missing manifest.yaml");
/// ```
pub fn format_plain(diagnostic: &Diagnostic, fallback_file: &str) -> String {
    format!(
        "{}: {} {}",
        location(diagnostic, fallback_file),
        diagnostic.code,
        diagnostic.message
    )
}

fn location(diagnostic: &Diagnostic, fallback_file: &str) -> String {
    format!(
        "{}:{}:{}",
        diagnostic.file.as_deref().unwrap_or(fallback_file),
        diagnostic.line.unwrap_or(0),
        diagnostic.column.unwrap_or(0)
    )
}

/// Writes one line per diagnostic, with the code coloured by severity.
pub fn write_plain<W: WriteColor>(
    out: &mut W,
    diagnostics: &[Diagnostic],
    fallback_file: &str,
) -> io::Result<()> {
    for diagnostic in diagnostics {
        write!(out, "{}: ", location(diagnostic, fallback_file))?;

        let color = match diagnostic.severity() {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(out, "{}", diagnostic.code)?;
        out.reset()?;

        writeln!(out, " {}", diagnostic.message)?;
    }
    Ok(())
}

// ============================================================================
// JSON
// ============================================================================

pub fn write_json<W: Write>(out: &mut W, diagnostics: &[Diagnostic]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, diagnostics)?;
    writeln!(out)
}

/// Counts of errors and warnings.
pub fn summarize(diagnostics: &[Diagnostic]) -> (usize, usize) {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    (errors, diagnostics.len() - errors)
}
