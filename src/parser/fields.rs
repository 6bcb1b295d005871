//! Field decoders for bracket-free record fragments.
//!
//! A fragment that does not match its grammar is not an error: the legacy
//! format is unversioned and the assembler simply skips what it cannot read.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Section;

/// Floating-point literal as written by the instrument.
const FLOAT: &str = r"[+-]?\d+\.?\d*(?:[eE][+-]?\d+)?";

static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"^(?P<key>\w+)\s+"(?P<name>[^"]*)"\s+(?P<z>{FLOAT})\s+(?P<y>{FLOAT})\s+(?P<x>{FLOAT})\s*"#
    ))
    .expect("section pattern is valid")
});

static POINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<x>{FLOAT})\s+(?P<y>{FLOAT})\s+(?P<z>{FLOAT})\s+(?P<d>{FLOAT})\s+(?P<section>\w+)\s*"
    ))
    .expect("point pattern is valid")
});

/// One entry of a `(Sections ...)` block.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionFact {
    pub id: String,
    pub name: String,
    pub top: f64,
    pub cutthickness: f64,
    pub mountedthickness: f64,
}

impl SectionFact {
    pub fn into_section(self) -> (String, Section) {
        let section = Section::declared(self.name, self.top, self.cutthickness, self.mountedthickness);
        (self.id, section)
    }
}

/// One coordinate record of a contour body, as written in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub diameter: f64,
    pub section: String,
}

/// Decode `key "name" z y x` at the start of `fragment`.
///
/// The triple maps to `top = x`, `cutthickness = y` and
/// `mountedthickness = -z`. Returns the fact and the unmatched tail, so
/// several facts sharing a line can be decoded in turn.
pub fn decode_section(fragment: &str) -> Option<(SectionFact, &str)> {
    let caps = SECTION_RE.captures(fragment)?;
    let float = |name: &str| caps.name(name)?.as_str().parse::<f64>().ok();

    let fact = SectionFact {
        id: caps.name("key")?.as_str().to_string(),
        name: caps.name("name")?.as_str().to_string(),
        top: float("x")?,
        cutthickness: float("y")?,
        mountedthickness: -float("z")?,
    };
    let end = caps.get(0)?.end();
    Some((fact, &fragment[end..]))
}

/// Decode `x y z d section` from the inner text of a point record.
pub fn decode_point(fragment: &str) -> Option<PointRecord> {
    let caps = POINT_RE.captures(fragment)?;
    let float = |name: &str| caps.name(name)?.as_str().parse::<f64>().ok();

    Some(PointRecord {
        x: float("x")?,
        y: float("y")?,
        z: float("z")?,
        diameter: float("d")?,
        section: caps.name("section")?.as_str().to_string(),
    })
}

/// Whether a fragment starts like a coordinate record.
pub fn is_numeric_start(fragment: &str) -> bool {
    matches!(
        fragment.chars().next(),
        Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.'
    )
}
