//! Diagnostic reporting.
//!
//! Grounded in `tsz-common::diagnostics` (`Diagnostic`, `DiagnosticCategory`)
//! for the data shape, and in the original `SemanticErrorHandler`
//! (`include/semantic_error_handler.hpp`) for the accumulate-then-flush
//! behavior and the error-count ceiling.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::limits::DEFAULT_MAX_ERROR_COUNT;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Error,
    Warning,
}

/// A single reported diagnostic: enough to render the three-line
/// `in <file>:<line>` / source line / caret message the lexer and checker
/// both produce.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub file: String,
    pub src_pos: u32,
    pub line: u32,
    pub message: String,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Render this diagnostic against the full source text of `self.file`.
    ///
    /// Finds the line containing `src_pos`, then prints the line itself
    /// with a caret underneath the offending byte. No color codes: terminal
    /// styling is an external collaborator's concern.
    #[must_use]
    pub fn render(&self, source: &str) -> String {
        let bytes = source.as_bytes();
        let pos = (self.src_pos as usize).min(bytes.len());

        let line_start = bytes[..pos].iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
        let line_end = bytes[pos..].iter().position(|&b| b == b'\n').map_or(bytes.len(), |i| pos + i);
        let line_text = &source[line_start..line_end];
        let column = pos - line_start;

        let kind = match self.category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
        };

        let mut out = String::new();
        let _ = writeln!(out, "in {}:{}", self.file, self.line);
        let _ = writeln!(out, "{line_text}");
        let _ = writeln!(out, "{}^", " ".repeat(column));
        let _ = write!(out, "{kind}: {}", self.message);
        out
    }
}

/// Accumulates diagnostics per file and enforces the error-count ceiling.
///
/// Mirrors `SemanticErrorHandler::errors_` (a map keyed by file name) and
/// its `_max_err_chk` / `failed` / `emit` trio. Reporting never panics;
/// the caller decides what "hit the ceiling" means (the checker stops
/// visiting further nodes, the CLI sets a nonzero exit code).
#[derive(Debug)]
pub struct DiagnosticSink {
    by_file: BTreeMap<String, Vec<Diagnostic>>,
    error_count: u32,
    warning_count: u32,
    max_errors: u32,
    warn_is_error: bool,
}

impl DiagnosticSink {
    #[must_use]
    pub fn new(max_errors: u32, warn_is_error: bool) -> Self {
        Self {
            by_file: BTreeMap::new(),
            error_count: 0,
            warning_count: 0,
            max_errors: if max_errors == 0 { DEFAULT_MAX_ERROR_COUNT } else { max_errors },
            warn_is_error,
        }
    }

    /// Record an error. Returns `true` once the error-count ceiling has
    /// just been reached (the caller should stop further checking).
    pub fn raise_error(&mut self, file: &str, src_pos: u32, line: u32, message: impl Into<String>) -> bool {
        self.error_count += 1;
        self.by_file.entry(file.to_string()).or_default().push(Diagnostic {
            file: file.to_string(),
            src_pos,
            line,
            message: message.into(),
            category: DiagnosticCategory::Error,
        });
        self.error_count >= self.max_errors
    }

    /// Record a warning. Demoted to an error when `warn_is_error` is set
    /// (the `WARN_IS_ERR` flag).
    pub fn raise_warning(&mut self, file: &str, src_pos: u32, line: u32, message: impl Into<String>) -> bool {
        if self.warn_is_error {
            return self.raise_error(file, src_pos, line, message);
        }
        self.warning_count += 1;
        self.by_file.entry(file.to_string()).or_default().push(Diagnostic {
            file: file.to_string(),
            src_pos,
            line,
            message: message.into(),
            category: DiagnosticCategory::Warning,
        });
        false
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        self.error_count > 0
    }

    #[must_use]
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    #[must_use]
    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    #[must_use]
    pub fn ceiling_reached(&self) -> bool {
        self.error_count >= self.max_errors
    }

    /// Render every accumulated diagnostic, file by file, against the
    /// supplied source text lookup. Sources not found in `sources` render
    /// with an empty source line rather than panicking.
    #[must_use]
    pub fn render_all(&self, sources: &BTreeMap<String, String>) -> Vec<String> {
        let mut rendered = Vec::new();
        for (file, diags) in &self.by_file {
            let empty = String::new();
            let source = sources.get(file).unwrap_or(&empty);
            for diag in diags {
                rendered.push(diag.render(source));
            }
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_points_caret_at_byte() {
        let diag = Diagnostic {
            file: "a.tak".to_string(),
            src_pos: 6,
            line: 1,
            message: "cannot dereference non-pointer type i32".to_string(),
            category: DiagnosticCategory::Error,
        };
        let rendered = diag.render("y := *x;\n");
        assert!(rendered.contains("in a.tak:1"));
        assert!(rendered.contains("y := *x;"));
        assert!(rendered.contains("error: cannot dereference"));
    }

    #[test]
    fn ceiling_trips_once_max_reached() {
        let mut sink = DiagnosticSink::new(2, false);
        assert!(!sink.raise_error("a.tak", 0, 1, "first"));
        assert!(sink.raise_error("a.tak", 1, 1, "second"));
        assert!(sink.failed());
        assert_eq!(sink.error_count(), 2);
    }

    #[test]
    fn warn_is_error_promotes_warnings() {
        let mut sink = DiagnosticSink::new(35, true);
        sink.raise_warning("a.tak", 0, 1, "unused");
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.warning_count(), 0);
    }
}
