//! Terminal output formatting for the mbf CLI.
//!
//! Provides Cargo-style status output with right-aligned coloured verbs.
//! All status output goes to stderr; stdout is reserved for JSON.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::validation::Severity;

/// ANSI escape codes.
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Width for right-aligned verb column.
const VERB_WIDTH: usize = 12;

/// Terminal-aware status printer.
///
/// Colour is enabled when stderr is a terminal.
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// Print a status line with a green bold verb.
    /// e.g. "     Parsed brain.asc (3 sections, 4 contours)"
    pub fn status(&self, verb: &str, message: &str) {
        self.print_line(GREEN, verb, message);
    }

    /// Print an informational line with a cyan bold verb.
    pub fn info(&self, verb: &str, message: &str) {
        self.print_line(CYAN, verb, message);
    }

    /// Print a warning line with a yellow bold verb.
    pub fn warning(&self, verb: &str, message: &str) {
        self.print_line(YELLOW, verb, message);
    }

    /// Print an error line with a red bold verb.
    pub fn error(&self, verb: &str, message: &str) {
        self.print_line(RED, verb, message);
    }

    /// Print one validation diagnostic, e.g.
    /// `warning[mbf::validate::open-contour]: S1 / Cortex #1: ...`
    pub fn diagnostic(&self, severity: Severity, code: &str, message: &str) {
        let label = self.severity(severity);
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "  {}[{}]: {}", label, code, message);
    }

    /// Print an indented help line under a diagnostic.
    pub fn help(&self, text: &str) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "    {} {}", self.dim("help:"), text);
    }

    /// Format a string as dim/grey.
    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    /// Format a string as cyan (for paths, info).
    pub fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    fn severity(&self, severity: Severity) -> String {
        let color = match severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
        };
        if self.color {
            format!("{BOLD}{color}{severity}{RESET}")
        } else {
            severity.to_string()
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn print_line(&self, color: &str, verb: &str, message: &str) {
        let mut stderr = io::stderr().lock();
        if self.color {
            let _ = writeln!(stderr, "{BOLD}{color}{verb:>VERB_WIDTH$}{RESET} {message}");
        } else {
            let _ = writeln!(stderr, "{verb:>VERB_WIDTH$} {message}");
        }
    }
}

/// Pluralize a count: `plural(1, "contour", "contours")` → "1 contour".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, pluralized)
    }
}

/// Return a relative display path when possible, absolute otherwise.
pub fn display_path(path: &Path) -> String {
    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(relative) = path.strip_prefix(&cwd) {
            let s = relative.display().to_string();
            if s.is_empty() {
                return ".".to_string();
            }
            return s;
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "contour", "contours"), "1 contour");
        assert_eq!(plural(0, "section", "sections"), "0 sections");
        assert_eq!(plural(5, "marker", "markers"), "5 markers");
    }

    #[test]
    fn test_display_path_absolute() {
        // An absolute path outside cwd should stay absolute
        let p = Path::new("/nonexistent/data/brain.asc");
        assert_eq!(display_path(p), "/nonexistent/data/brain.asc");
    }

    #[test]
    fn test_plain_severity_label() {
        let printer = Printer { color: false };
        assert_eq!(printer.severity(Severity::Error), "error");
        assert_eq!(printer.dim("help:"), "help:");
    }
}
