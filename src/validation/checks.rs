//! Validation checks for parsed documents.
//!
//! Each check takes a `&Document` and returns a `ValidationResult`.
//! Counting sites are markers rather than regions, so the shape checks
//! ignore them.

use crate::types::{Contour, Document};

use super::warning::{Diagnostic, ValidationResult};

pub const OPEN_CONTOUR: &str = "mbf::validate::open-contour";
pub const DEGENERATE_CONTOUR: &str = "mbf::validate::degenerate-contour";
pub const UNDECLARED_SECTION: &str = "mbf::validate::undeclared-section";
pub const EMPTY_DOCUMENT: &str = "mbf::validate::empty-document";

/// Warn when the file yields no contours at all.
pub fn check_empty_document(doc: &Document) -> ValidationResult {
    let mut result = ValidationResult::new();

    if doc.contour_count() == 0 {
        result.push(
            Diagnostic::warning(EMPTY_DOCUMENT, "No contours found")
                .with_help("Check that the file is an ASC contour export"),
        );
    }

    result
}

/// Warn about region contours without a `(Closed)` marker.
pub fn check_open_contours(doc: &Document) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (section, index, contour) in regions(doc) {
        if !contour.closed {
            result.push(
                Diagnostic::warning(
                    OPEN_CONTOUR,
                    format!("Contour '{}' is not marked closed", contour.name),
                )
                .at(location(section, &contour.name, index))
                .with_help("Rasterization closes it from the last point back to the first"),
            );
        }
    }

    result
}

/// Error on region contours that cannot enclose an area.
pub fn check_degenerate_contours(doc: &Document) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (section, index, contour) in regions(doc) {
        if contour.len() < 3 {
            result.push(
                Diagnostic::error(
                    DEGENERATE_CONTOUR,
                    format!(
                        "Contour '{}' has {} point(s), at least 3 are needed",
                        contour.name,
                        contour.len()
                    ),
                )
                .at(location(section, &contour.name, index))
                .with_help("It is skipped when rasterizing"),
            );
        }
    }

    result
}

/// Warn about sections referenced by points but missing from `(Sections ...)`.
pub fn check_undeclared_sections(doc: &Document) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (id, section) in &doc.sections {
        if !section.declared {
            let shown = if id.is_empty() { "<none>" } else { id.as_str() };
            result.push(
                Diagnostic::warning(
                    UNDECLARED_SECTION,
                    format!("Section '{}' is used by contours but never declared", shown),
                )
                .with_help("Its top and thickness are reported as 0"),
            );
        }
    }

    result
}

/// Region contours with their section id and 1-based index among
/// contours of the same name in that section.
fn regions(doc: &Document) -> impl Iterator<Item = (&str, usize, &Contour)> {
    doc.sections.iter().flat_map(|(id, section)| {
        section
            .contours
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_site())
            .map(move |(i, contour)| {
                let index = section.contours[..=i]
                    .iter()
                    .filter(|c| c.name == contour.name)
                    .count();
                (id.as_str(), index, contour)
            })
    })
}

fn location(section: &str, name: &str, index: usize) -> String {
    format!("{} / {} #{}", section, name, index)
}
