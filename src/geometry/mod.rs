//! Point-in-region classification for 2D polygons and 3D triangle surfaces.
//!
//! A boundary is a vertex array `(V, D)` plus an optional face array
//! `(F, D)` of vertex indices. In 2D the faces are edges and may be left
//! out, in which case the vertices are taken as an ordered closed ring.
//!
//! ```ignore
//! use mbf::geometry::rasterize;
//! use ndarray::array;
//!
//! let square = array![[1.0, 1.0], [3.0, 1.0], [3.0, 3.0], [1.0, 3.0]];
//! let mask = rasterize(&[4, 4], square.view(), None)?;
//! assert!(mask[[2, 2]]);
//! ```

mod boundary;
mod classifier;
mod raster;
mod raycast;
mod scanline;

pub use boundary::{ring_edges, Boundary};
pub use classifier::{ClassifierKind, PointClassifier};
pub use raster::{
    grid_points, is_inside, is_inside_batch, is_inside_batch_with, rasterize, rasterize_with,
};
pub use raycast::{RayCaster, DEFAULT_SEED, PARALLEL_EPSILON};
pub use scanline::Scanline;
