//! ASC document assembler.
//!
//! Drives an explicit state machine over a [`Cursor`]. Each state consumes
//! one record (or one item of a contour body) and names the next state, so
//! no text position is shared between nested readers.
//!
//! ```text
//! ;	V3 text file written for MicroBrightField products.
//! (Description
//! )  ;  End of description
//! (Sections S1 "Section 1" -132 49.5 49.5
//!  S2 "Section 2" -181.5 49.5 49.5
//! ) ; End of Sections
//! ("Hippocampus"
//!   (Color RGB (255, 0, 0))
//!   (Closed)
//!   (  1234.56  -789.01  -132.00  0.53  S1)  ;  1, 1
//! )  ;  End of contour
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::{MbfError, Result};
use crate::types::{Contour, CoordinateSpace, Document, Point, Section};

use super::closer::Cursor;
use super::fields::{decode_point, decode_section, is_numeric_start, PointRecord};

const DESCRIPTION: &str = "(Description";
const SECTIONS: &str = "(Sections";
const COLOR: &str = "Color";
const CLOSED: &str = "Closed";

/// Assembler states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    TopLevel,
    Description,
    Sections,
    ContourHeader,
    ContourBody,
    SkipBlock,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::TopLevel => "TopLevel",
            State::Description => "Description",
            State::Sections => "Sections",
            State::ContourHeader => "ContourHeader",
            State::ContourBody => "ContourBody",
            State::SkipBlock => "SkipBlock",
        };
        f.write_str(name)
    }
}

/// How coordinates are reported.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParseOptions {
    /// Output coordinate convention.
    pub space: CoordinateSpace,
    /// Keep the per-point diameter as a fourth coordinate.
    pub keep_diameter: bool,
}

impl ParseOptions {
    pub fn with_space(mut self, space: CoordinateSpace) -> Self {
        self.space = space;
        self
    }

    pub fn with_diameter(mut self, keep: bool) -> Self {
        self.keep_diameter = keep;
        self
    }
}

/// Parse an ASC file from disk.
pub fn parse_asc_file(path: &Path, options: &ParseOptions) -> Result<Document> {
    let file = File::open(path).map_err(|e| MbfError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to open file: {}", e),
    })?;
    debug!(path = %path.display(), "parsing ASC file");
    parse_asc(BufReader::new(file), options)
}

/// Parse ASC text held in memory.
pub fn parse_asc_str(source: &str, options: &ParseOptions) -> Result<Document> {
    parse_asc(source.as_bytes(), options)
}

/// Parse an ASC stream.
pub fn parse_asc<R: BufRead>(reader: R, options: &ParseOptions) -> Result<Document> {
    Assembler::new(reader, *options).run()
}

/// Single-use parser state: one per parse call.
struct Assembler<R> {
    cursor: Cursor<R>,
    options: ParseOptions,
    doc: Document,
    contour: Option<Contour>,
}

impl<R: BufRead> Assembler<R> {
    fn new(reader: R, options: ParseOptions) -> Self {
        Self {
            cursor: Cursor::new(reader),
            options,
            doc: Document::new(),
            contour: None,
        }
    }

    fn run(mut self) -> Result<Document> {
        let mut state = State::TopLevel;
        loop {
            state = match state {
                State::TopLevel => {
                    if !self.cursor.fill()? {
                        break;
                    }
                    self.dispatch()
                }
                State::Description => self.read_description()?,
                State::Sections => self.read_sections()?,
                State::ContourHeader => self.read_contour_header()?,
                State::ContourBody => self.read_contour_body()?,
                State::SkipBlock => self.skip_block()?,
            };
        }

        debug!(
            sections = self.doc.sections.len(),
            regions = self.doc.regions.len(),
            contours = self.doc.contour_count(),
            lines = self.cursor.line(),
            "parsed ASC document"
        );
        Ok(self.doc)
    }

    /// Pick the reader for the record starting the current buffer.
    fn dispatch(&mut self) -> State {
        let rest = self.cursor.rest();

        if rest.starts_with(DESCRIPTION) {
            self.cursor.advance(DESCRIPTION.len());
            State::Description
        } else if rest.starts_with(SECTIONS) {
            self.cursor.advance(SECTIONS.len());
            State::Sections
        } else if rest.starts_with("(\"") {
            self.cursor.advance(1);
            State::ContourHeader
        } else if rest.starts_with('(') {
            self.cursor.advance(1);
            State::SkipBlock
        } else {
            self.drop_until_bracket(State::TopLevel);
            State::TopLevel
        }
    }

    fn read_description(&mut self) -> Result<State> {
        let description = self.cursor.close_record(State::Description)?;
        self.doc.description = description.trim().to_string();
        Ok(State::TopLevel)
    }

    fn read_sections(&mut self) -> Result<State> {
        let mut sections: IndexMap<String, Section> = IndexMap::new();

        loop {
            let line = self.cursor.line();
            let (chunk, closed) = self.cursor.close_step(State::Sections)?;

            let mut fragment = chunk.trim();
            while !fragment.is_empty() {
                match decode_section(fragment) {
                    Some((fact, tail)) => {
                        let (id, section) = fact.into_section();
                        sections.insert(id, section);
                        fragment = tail;
                    }
                    None => {
                        trace!(line, fragment, "skipping malformed section record");
                        break;
                    }
                }
            }

            if closed {
                break;
            }
        }

        for (id, section) in sections {
            match self.doc.sections.get_mut(&id) {
                Some(existing) => existing.merge_declaration(section),
                None => {
                    self.doc.sections.insert(id, section);
                }
            }
        }
        Ok(State::TopLevel)
    }

    /// The buffer starts at the opening quote of the contour name.
    fn read_contour_header(&mut self) -> Result<State> {
        let rest = &self.cursor.rest()[1..];
        let (name, consumed) = match rest.find('"') {
            Some(end) => (rest[..end].to_string(), end + 2),
            None => (rest.to_string(), rest.len() + 1),
        };

        trace!(line = self.cursor.line(), name = %name, "contour");
        self.cursor.advance(consumed);
        self.contour = Some(Contour::new(name));
        Ok(State::ContourBody)
    }

    /// Consume one item of a contour body.
    fn read_contour_body(&mut self) -> Result<State> {
        self.cursor.require(State::ContourBody)?;

        let rest = self.cursor.rest();
        if rest.starts_with(')') {
            self.cursor.advance(1);
            self.finish_contour();
            return Ok(State::TopLevel);
        }
        if !rest.starts_with('(') {
            self.drop_until_bracket(State::ContourBody);
            return Ok(State::ContourBody);
        }

        self.cursor.advance(1);
        self.cursor.require(State::ContourBody)?;
        let inner = self.cursor.rest();

        if is_numeric_start(inner) {
            let line = self.cursor.line();
            let content = self.cursor.close_record(State::ContourBody)?;
            match decode_point(&content) {
                Some(record) => self.push_point(record),
                None => trace!(line, content = %content, "skipping malformed point record"),
            }
        } else if inner.starts_with(|c: char| c.is_alphabetic()) {
            let tag_len = inner
                .find(|c: char| !c.is_alphanumeric() && c != '_')
                .unwrap_or(inner.len());
            let tag = inner[..tag_len].to_string();
            self.cursor.advance(tag_len);
            let value = self.cursor.read_balanced(State::ContourBody)?;

            if let Some(contour) = self.contour.as_mut() {
                match tag.as_str() {
                    COLOR => contour.color = Some(value.trim().to_string()),
                    CLOSED => contour.closed = true,
                    _ => trace!(tag = %tag, "skipping contour property"),
                }
            }
        } else {
            self.cursor.read_balanced(State::ContourBody)?;
        }
        Ok(State::ContourBody)
    }

    fn push_point(&mut self, record: PointRecord) {
        let Some(contour) = self.contour.as_mut() else {
            return;
        };
        let [x, y, z] = self.options.space.map(record.x, record.y, record.z);
        let mut point = Point::new(x, y, z);
        if self.options.keep_diameter {
            point = point.with_diameter(record.diameter);
        }
        contour.points.push(point);
        contour.section = record.section;
    }

    /// Register the finished contour's region and file it under its section.
    fn finish_contour(&mut self) {
        let Some(contour) = self.contour.take() else {
            return;
        };

        let next_id = self.doc.regions.len() as u32 + 1;
        self.doc
            .regions
            .entry(contour.name.clone())
            .or_insert(next_id);

        let section = self
            .doc
            .sections
            .entry(contour.section.clone())
            .or_insert_with(|| {
                debug!(section = %contour.section, "section referenced before declaration");
                Section::default()
            });
        section.contours.push(contour);
    }

    /// Unknown block: discard it once its brackets balance.
    fn skip_block(&mut self) -> Result<State> {
        let line = self.cursor.line();
        let skipped = self.cursor.read_balanced(State::SkipBlock)?;
        trace!(line, block = %skipped, "skipped block");
        Ok(State::TopLevel)
    }

    /// Discard stray text up to the next bracket on the current line.
    ///
    /// At least one character is consumed, so a lone `)` at top level is
    /// dropped as well.
    fn drop_until_bracket(&mut self, state: State) {
        let rest = self.cursor.rest();
        trace!(line = self.cursor.line(), state = %state, text = %rest, "dropping stray text");
        let first = rest.chars().next().map_or(0, char::len_utf8);
        match rest[first..].find(&['(', ')'][..]) {
            Some(i) => self.cursor.advance(first + i),
            None => self.cursor.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoxelSize;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = include_str!("../../tests/fixtures/sample.asc");

    fn parse(source: &str) -> Document {
        parse_asc_str(source, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_parse_sample_fixture() {
        let doc = parse(SAMPLE);

        assert_eq!(doc.description, "Mouse 12, left hemisphere");
        assert_eq!(doc.sections.len(), 3);
        assert_eq!(doc.region_names().collect::<Vec<_>>(), vec!["Hippocampus", "Cortex", "TopRight"]);

        let s1 = &doc.sections["S1"];
        assert_eq!(s1.name, "Section 1");
        assert_eq!(s1.top, 49.5);
        assert_eq!(s1.cutthickness, 49.5);
        assert_eq!(s1.mountedthickness, 132.0);
        assert_eq!(s1.contours.len(), 2);

        let hippocampus = &s1.contours[0];
        assert_eq!(hippocampus.name, "Hippocampus");
        assert!(hippocampus.closed);
        assert_eq!(hippocampus.color.as_deref(), Some("RGB (255, 0, 0)"));
        assert_eq!(hippocampus.len(), 4);
        assert_eq!(hippocampus.points[0].xyz(), [100.0, -200.0, 132.0]);
        assert_eq!(hippocampus.section, "S1");
    }

    #[test]
    fn test_points_in_order() {
        let source = "(\"A\"\n(1 2 3 0.5 S1)\n(4 5 6 0.5 S1)\n(7 8 9 0.5 S1)\n)\n";
        let doc = parse(source);

        let contour = &doc.sections["S1"].contours[0];
        let xs: Vec<f64> = contour.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 4.0, 7.0]);
    }

    #[test]
    fn test_points_on_one_line() {
        let source = "(\"A\" (1 2 3 0.5 S1) (4 5 6 0.5 S1) (7 8 9 0.5 S1))";
        let doc = parse(source);

        assert_eq!(doc.sections["S1"].contours[0].len(), 3);
    }

    #[test]
    fn test_region_ids_first_seen() {
        let source = "(\"B\"\n(1 2 3 0 S1)\n)\n(\"A\"\n(1 2 3 0 S1)\n)\n(\"B\"\n(1 2 3 0 S2)\n)\n(\"C\"\n(1 2 3 0 S2)\n)\n";
        let doc = parse(source);

        assert_eq!(doc.region_id("B"), Some(1));
        assert_eq!(doc.region_id("A"), Some(2));
        assert_eq!(doc.region_id("C"), Some(3));
        assert_eq!(doc.regions.len(), 3);
        assert_eq!(doc.contour_count(), 4);
    }

    #[test]
    fn test_contour_followed_on_same_line() {
        let source = "(\"First\"\n(1 2 3 0 S1)\n(4 5 6 0 S1)\n)(\"Second\"\n(7 8 9 0 S1)\n)\n";
        let doc = parse(source);

        let contours = &doc.sections["S1"].contours;
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].name, "First");
        assert_eq!(contours[0].len(), 2);
        assert_eq!(contours[1].name, "Second");
        assert_eq!(contours[1].len(), 1);
        assert_eq!(contours[1].points[0].x, 7.0);
    }

    #[test]
    fn test_stray_close_bracket_dropped() {
        let source = "(\"A\"\n(1 2 3 0 S1)\n)\n)\n(\"B\"\n(4 5 6 0 S1)\n)\n";
        let doc = parse(source);

        let names: Vec<&str> = doc.sections["S1"].contours.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_stray_text_before_record_dropped() {
        let doc = parse("junk ) more (\"A\"\n(1 2 3 0 S1)\n)\n");
        assert_eq!(doc.contour_count(), 1);
    }

    #[test]
    fn test_unbalanced_quote_in_description() {
        let doc = parse("(Description Slide 5\" wide)\n(Sections S1 \"Section 1\" -132 49.5 49.5)\n");

        assert_eq!(doc.description, "Slide 5\" wide");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections["S1"].name, "Section 1");
    }

    #[test]
    fn test_multiline_description_matches_single_line() {
        let multi = parse("(Description first line\n  second line ; note\n third line\n)\n");
        let single = parse("(Description first line second line third line)\n");

        assert_eq!(multi.description, "first line second line third line");
        assert_eq!(multi.description, single.description);
    }

    #[test]
    fn test_empty_description() {
        let doc = parse("(Description\n)  ;  End of description\n");
        assert_eq!(doc.description, "");
    }

    #[test]
    fn test_sections_first_record_on_header_line() {
        let source = "(Sections S1 \"Section 1\" -132 49.5 49.5\n S2 \"Section 2\" -181.5 49.5 49.5\n) ; End of Sections\n";
        let doc = parse(source);

        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections["S2"].mountedthickness, 181.5);
        assert!(doc.sections["S1"].declared);
    }

    #[test]
    fn test_sections_closed_on_last_record_line() {
        let doc = parse("(Sections S1 \"Section 1\" -132 49.5 49.5)\n");
        assert_eq!(doc.sections["S1"].name, "Section 1");
    }

    #[test]
    fn test_malformed_section_skipped() {
        let source = "(Sections\n S1 \"Section 1\" -132 49.5 49.5\n garbage here\n S2 \"Section 2\" -181.5 49.5 49.5\n)\n";
        let doc = parse(source);

        assert_eq!(doc.sections.len(), 2);
    }

    #[test]
    fn test_undeclared_section_created_lazily() {
        let doc = parse("(\"A\"\n(1 2 3 0 S7)\n)\n");

        let section = &doc.sections["S7"];
        assert!(!section.declared);
        assert_eq!(section.name, "");
        assert_eq!(section.contours.len(), 1);
    }

    #[test]
    fn test_late_declaration_keeps_contours() {
        let source = "(\"A\"\n(1 2 3 0 S1)\n)\n(Sections S1 \"Section 1\" -132 49.5 49.5\n)\n";
        let doc = parse(source);

        let section = &doc.sections["S1"];
        assert!(section.declared);
        assert_eq!(section.name, "Section 1");
        assert_eq!(section.contours.len(), 1);
    }

    #[test]
    fn test_unknown_blocks_skipped() {
        let source = "(ImageCoords Filename \"slide.jpx\" Merge 65535 65535 65535 0\n Coords 0.5 0.5 0 0 -132\n (Channel 1)\n) ; End of ImageCoords\n(\"A\"\n(1 2 3 0 S1)\n)\n";
        let doc = parse(source);

        assert_eq!(doc.contour_count(), 1);
        assert_eq!(doc.regions.len(), 1);
    }

    #[test]
    fn test_unknown_contour_properties_skipped() {
        let source = "(\"A\"\n(Color Blue)\n(GUID \"1234\")\n(FillDensity 0)\n(MBFObjectType 5)\n(Resolution\n 1.0)\n(1 2 3 0 S1)\n)\n";
        let doc = parse(source);

        let contour = &doc.sections["S1"].contours[0];
        assert_eq!(contour.color.as_deref(), Some("Blue"));
        assert!(!contour.closed);
        assert_eq!(contour.len(), 1);
    }

    #[test]
    fn test_malformed_point_skipped() {
        let source = "(\"A\"\n(1 2 3 0 S1)\n(1 2 3)\n(4 5 6 0 S1)\n)\n";
        let doc = parse(source);

        assert_eq!(doc.sections["S1"].contours[0].len(), 2);
    }

    #[test]
    fn test_closed_is_not_inferred() {
        let source = "(\"A\"\n(0 0 0 0 S1)\n(1 0 0 0 S1)\n(0 0 0 0 S1)\n)\n";
        let doc = parse(source);

        assert!(!doc.sections["S1"].contours[0].closed);
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let source = ";\tV3 text file written for MicroBrightField products.\n\n(\"A\" ; name\n\n; comment only\n(1 2 3 0 S1)  ;  1, 1\n\n)  ;  End of contour\n";
        let doc = parse(source);

        assert_eq!(doc.sections["S1"].contours[0].len(), 1);
    }

    #[test]
    fn test_truncated_contour_fails() {
        let err = parse_asc_str("(\"A\"\n(1 2 3 0 S1)\n", &ParseOptions::default()).unwrap_err();

        match err {
            MbfError::UnexpectedEndOfInput { state, line } => {
                assert_eq!(state, "ContourBody");
                assert_eq!(line, 2);
            }
            other => panic!("Expected UnexpectedEndOfInput, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_sections_fails() {
        let result = parse_asc_str("(Sections S1 \"Section 1\" -132 49.5 49.5\n", &ParseOptions::default());
        assert!(matches!(result, Err(MbfError::UnexpectedEndOfInput { .. })));
    }

    #[test]
    fn test_empty_input() {
        let doc = parse("");
        assert_eq!(doc, Document::new());
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(parse(SAMPLE), parse(SAMPLE));
    }

    #[test]
    fn test_voxel_space_and_diameter() {
        let options = ParseOptions::default()
            .with_space(CoordinateSpace::Voxel(VoxelSize::from_slice(&[0.002])))
            .with_diameter(true);
        let doc = parse_asc_str("(\"A\"\n(10 20 -30 0.5 S1)\n)\n", &options).unwrap();

        let point = doc.sections["S1"].contours[0].points[0];
        assert_eq!(point.xyz(), [5.0, -10.0, 15.0]);
        assert_eq!(point.diameter, Some(0.5));
    }

    #[test]
    fn test_parse_asc_file_missing() {
        let result = parse_asc_file(Path::new("/nonexistent/file.asc"), &ParseOptions::default());
        assert!(matches!(result, Err(MbfError::Io { .. })));
    }
}
