//! Core domain types for mbf.
//!
//! This module contains the data recovered from stereology files:
//! - `Document` / `Section` - the parsed ASC tree
//! - `Contour` / `Point` - region boundaries and their vertices
//! - `CoordinateSpace` / `VoxelSize` - output coordinate conventions
//! - `PointSet` - marker coordinates in FreeSurfer point-set form

mod contour;
mod document;
mod pointset;
mod space;

pub use contour::{Contour, ContourFilter, Point, SITE_KEYS};
pub use document::{Document, Section};
pub use pointset::{Coordinates, Marker, MarkerStatistics, PointSet};
pub use space::{CoordinateSpace, VoxelSize};
