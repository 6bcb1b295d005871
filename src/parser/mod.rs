//! Parsers for MicroBrightField text exports.
//!
//! # ASC structure
//!
//! An ASC file is a sequence of parenthesised records:
//! - `(Description ...)` - free text
//! - `(Sections ...)` - one `key "name" z y x` entry per tissue section
//! - `("Name" ...)` - a contour: property blocks followed by point records
//! - any other `(...)` block is instrument metadata and is skipped
//!
//! Comments run from `;` to the end of the line. Records may span lines and
//! several records may share one.
//!
//! # Usage
//!
//! ```ignore
//! use mbf::parser::{parse_asc_file, ParseOptions};
//!
//! let doc = parse_asc_file(Path::new("brain.asc"), &ParseOptions::default())?;
//!
//! for (section, contour) in doc.contours() {
//!     println!("{section}: {} ({} points)", contour.name, contour.len());
//! }
//! ```

mod asc;
mod closer;
mod fields;
mod markers;
pub mod source;

pub use asc::{parse_asc, parse_asc_file, parse_asc_str, ParseOptions, State};
pub use closer::{close, Close, Cursor};
pub use fields::{decode_point, decode_section, PointRecord, SectionFact};
pub use markers::{parse_markers, parse_markers_file, DEFAULT_MARKER_VOXEL};
pub use source::{strip_line, LineSource};
