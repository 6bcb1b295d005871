//! Validation of parsed ASC documents.
//!
//! Runs a suite of checks against a parsed document and reports errors
//! and warnings. Used by `mbf validate` and before rasterization.

mod checks;
mod warning;

pub use checks::{DEGENERATE_CONTOUR, EMPTY_DOCUMENT, OPEN_CONTOUR, UNDECLARED_SECTION};
pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::output::Printer;
use crate::types::Document;

/// Run all validation checks against the document.
pub fn validate_document(doc: &Document) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_empty_document(doc));
    result.merge(checks::check_undeclared_sections(doc));
    result.merge(checks::check_open_contours(doc));
    result.merge(checks::check_degenerate_contours(doc));

    result
}

/// Print diagnostics to stderr.
pub fn print_diagnostics(printer: &Printer, result: &ValidationResult) {
    for d in result.iter() {
        match &d.location {
            Some(location) => {
                printer.diagnostic(d.severity, &d.code, &format!("{}: {}", location, d.message))
            }
            None => printer.diagnostic(d.severity, &d.code, &d.message),
        }
        if let Some(help) = &d.help {
            printer.help(help);
        }
    }
}

/// Print the closing summary line.
pub fn print_summary(printer: &Printer, result: &ValidationResult) {
    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors > 0 {
        printer.error(
            "Validation",
            &format!("failed: {} error(s), {} warning(s)", errors, warnings),
        );
    } else if warnings > 0 {
        printer.status("Validated", &format!("with {} warning(s)", warnings));
    } else {
        printer.status("Validated", "no problems found");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_asc_str, ParseOptions};

    #[test]
    fn test_validate_empty_document() {
        let result = validate_document(&Document::new());
        assert!(!result.has_errors());
        assert_eq!(result.with_code(EMPTY_DOCUMENT).count(), 1);
    }

    #[test]
    fn test_validate_fixture() {
        let doc = parse_asc_str(
            include_str!("../../tests/fixtures/sample.asc"),
            &ParseOptions::default(),
        )
        .unwrap();

        let result = validate_document(&doc);

        // The single-point TopRight site is neither open nor degenerate
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_catches_undeclared_and_degenerate() {
        let source = "(\"Cortex\"\n  (1 2 3 0.5 S9)\n  (4 5 3 0.5 S9)\n)\n";
        let doc = parse_asc_str(source, &ParseOptions::default()).unwrap();

        let result = validate_document(&doc);

        assert!(result.has_errors());
        assert_eq!(result.with_code(DEGENERATE_CONTOUR).count(), 1);
        assert_eq!(result.with_code(UNDECLARED_SECTION).count(), 1);
        assert_eq!(result.with_code(OPEN_CONTOUR).count(), 1);
    }
}
