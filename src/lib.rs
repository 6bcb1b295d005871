//! mbf - MicroBrightField stereology reader
//!
//! A library for reading Neurolucida / Stereo Investigator ASC contour
//! exports and marker lists, and for rasterizing the traced regions with a
//! ray-casting point-in-polygon engine.

pub mod cli;
pub mod discovery;
pub mod error;
pub mod geometry;
pub mod output;
pub mod parser;
pub mod render;
pub mod types;
pub mod units;
pub mod validation;

pub use discovery::{discover, discover_paths, DiscoveryResult, Manifest, ScanResult};
pub use error::{GeometryError, MbfError, Result};
pub use geometry::{
    is_inside, is_inside_batch, rasterize, ClassifierKind, PointClassifier, RayCaster, Scanline,
};
pub use parser::{parse_asc, parse_asc_file, parse_asc_str, parse_markers, ParseOptions};
pub use render::{write_label_png, write_mask_png, LabelMap};
pub use types::{
    Contour, ContourFilter, CoordinateSpace, Document, Marker, Point, PointSet, Section,
    VoxelSize,
};
pub use units::{convert_unit, get_unit_scale, make_vox2mbf};
pub use validation::{validate_document, Diagnostic, Severity, ValidationResult};
