//! Closed boundaries: a vertex list plus the faces joining them.

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::GeometryError;

/// A validated closed polygon (2D) or surface (3D).
///
/// Each face lists `dim` vertex indices: segments in 2D, triangles in 3D.
#[derive(Debug, Clone)]
pub struct Boundary<'a> {
    vertices: ArrayView2<'a, f64>,
    faces: Array2<usize>,
}

impl<'a> Boundary<'a> {
    /// Validate vertices and faces.
    ///
    /// Without faces, a 2D vertex list is read as an ordered ring and its
    /// edges are synthesized, including the closing edge from the last
    /// vertex back to the first.
    pub fn new(
        vertices: ArrayView2<'a, f64>,
        faces: Option<ArrayView2<'_, usize>>,
    ) -> Result<Self, GeometryError> {
        let dim = vertices.ncols();
        if dim != 2 && dim != 3 {
            return Err(GeometryError::UnsupportedDimension(dim));
        }

        let faces = match faces {
            Some(faces) => {
                if faces.ncols() != dim {
                    return Err(GeometryError::DimensionMismatch {
                        expected: dim,
                        found: faces.ncols(),
                    });
                }
                faces.to_owned()
            }
            None if dim == 2 => ring_edges(vertices.nrows()),
            None => return Err(GeometryError::MissingFaces),
        };

        let count = vertices.nrows();
        for (face, row) in faces.rows().into_iter().enumerate() {
            if let Some(&index) = row.iter().find(|&&i| i >= count) {
                return Err(GeometryError::InvalidFaceIndex {
                    face,
                    index,
                    vertices: count,
                });
            }
        }

        Ok(Self { vertices, faces })
    }

    pub fn dim(&self) -> usize {
        self.vertices.ncols()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.nrows()
    }

    pub fn face_count(&self) -> usize {
        self.faces.nrows()
    }

    pub fn vertex(&self, index: usize) -> ArrayView1<'_, f64> {
        self.vertices.row(index)
    }

    /// Iterate over faces as vertex index rows.
    pub fn faces(&self) -> impl Iterator<Item = ArrayView1<'_, usize>> {
        self.faces.rows().into_iter()
    }

    /// Check that query points live in the boundary's dimension.
    pub fn check_points(&self, points: &ArrayView2<'_, f64>) -> Result<(), GeometryError> {
        if points.ncols() != self.dim() {
            return Err(GeometryError::DimensionMismatch {
                expected: self.dim(),
                found: points.ncols(),
            });
        }
        Ok(())
    }
}

/// Consecutive edges of an `n`-vertex ring, closing edge last.
pub fn ring_edges(n: usize) -> Array2<usize> {
    let mut edges = Array2::zeros((n, 2));
    for i in 0..n {
        edges[[i, 0]] = i;
        edges[[i, 1]] = (i + 1) % n;
    }
    edges
}
