//! Even-odd scanline classifier for 2D polygons.
//!
//! Casts a horizontal half-line towards +x and toggles on every edge that
//! straddles the point's row. Cheaper than the general ray caster, but
//! planar only.

use ndarray::{Array1, ArrayView2};
use rayon::prelude::*;

use crate::error::GeometryError;

use super::boundary::Boundary;
use super::classifier::PointClassifier;

#[derive(Debug, Clone, Copy, Default)]
pub struct Scanline;

impl PointClassifier for Scanline {
    fn name(&self) -> &'static str {
        "scanline"
    }

    fn classify_boundary(
        &self,
        points: ArrayView2<'_, f64>,
        boundary: &Boundary<'_>,
    ) -> Result<Array1<bool>, GeometryError> {
        if boundary.dim() != 2 {
            return Err(GeometryError::UnsupportedDimension(boundary.dim()));
        }
        boundary.check_points(&points)?;

        let edges: Vec<([f64; 2], [f64; 2])> = boundary
            .faces()
            .map(|face| {
                let a = boundary.vertex(face[0]);
                let b = boundary.vertex(face[1]);
                ([a[0], a[1]], [b[0], b[1]])
            })
            .collect();

        let inside: Vec<bool> = (0..points.nrows())
            .into_par_iter()
            .map(|i| {
                let (px, py) = (points[[i, 0]], points[[i, 1]]);
                let mut inside = false;
                for ([ax, ay], [bx, by]) in &edges {
                    if (*ay > py) != (*by > py) && px < (bx - ax) * (py - ay) / (by - ay) + ax {
                        inside = !inside;
                    }
                }
                inside
            })
            .collect();

        Ok(Array1::from(inside))
    }
}
