//! Grid and batch entry points built on a [`PointClassifier`].

use ndarray::{indices, Array1, Array2, ArrayD, ArrayView2, ArrayViewD, Dimension, IxDyn};

use crate::error::GeometryError;

use super::classifier::PointClassifier;
use super::raycast::RayCaster;

/// Classify `(N, D)` points with the default ray caster.
pub fn is_inside(
    points: ArrayView2<'_, f64>,
    vertices: ArrayView2<'_, f64>,
    faces: Option<ArrayView2<'_, usize>>,
) -> Result<Array1<bool>, GeometryError> {
    RayCaster::default().classify(points, vertices, faces)
}

/// Classify an `(..., D)` batch of points; the result has the batch shape.
pub fn is_inside_batch(
    points: ArrayViewD<'_, f64>,
    vertices: ArrayView2<'_, f64>,
    faces: Option<ArrayView2<'_, usize>>,
) -> Result<ArrayD<bool>, GeometryError> {
    is_inside_batch_with(&RayCaster::default(), points, vertices, faces)
}

/// [`is_inside_batch`] with an explicit classifier.
pub fn is_inside_batch_with(
    classifier: &dyn PointClassifier,
    points: ArrayViewD<'_, f64>,
    vertices: ArrayView2<'_, f64>,
    faces: Option<ArrayView2<'_, usize>>,
) -> Result<ArrayD<bool>, GeometryError> {
    let shape = points.shape();
    let Some((&dim, batch)) = shape.split_last() else {
        return Err(GeometryError::DimensionMismatch {
            expected: vertices.ncols(),
            found: 0,
        });
    };

    let flat: Vec<f64> = points.iter().copied().collect();
    let count: usize = batch.iter().product();
    let rows = Array2::from_shape_fn((count, dim), |(i, j)| flat[i * dim + j]);

    let inside = classifier.classify(rows.view(), vertices, faces)?;
    Ok(reshape(batch, inside))
}

/// Classify every integer grid point of `shape` with the default ray caster.
///
/// The point at index `(i, j, ...)` has coordinates `(i, j, ...)`, so the
/// vertex dimension must equal `shape.len()`.
pub fn rasterize(
    shape: &[usize],
    vertices: ArrayView2<'_, f64>,
    faces: Option<ArrayView2<'_, usize>>,
) -> Result<ArrayD<bool>, GeometryError> {
    rasterize_with(&RayCaster::default(), shape, vertices, faces)
}

/// [`rasterize`] with an explicit classifier.
pub fn rasterize_with(
    classifier: &dyn PointClassifier,
    shape: &[usize],
    vertices: ArrayView2<'_, f64>,
    faces: Option<ArrayView2<'_, usize>>,
) -> Result<ArrayD<bool>, GeometryError> {
    let grid = grid_points(shape);
    let inside = classifier.classify(grid.view(), vertices, faces)?;
    Ok(reshape(shape, inside))
}

/// Row-major integer coordinates of every cell in `shape`.
pub fn grid_points(shape: &[usize]) -> Array2<f64> {
    let dim = shape.len();
    let coords: Vec<f64> = indices(IxDyn(shape))
        .into_iter()
        .flat_map(|index| index.slice().iter().map(|&c| c as f64).collect::<Vec<_>>())
        .collect();
    let count = if dim == 0 { 0 } else { coords.len() / dim };
    Array2::from_shape_fn((count, dim), |(i, j)| coords[i * dim + j])
}

fn reshape(shape: &[usize], values: Array1<bool>) -> ArrayD<bool> {
    let mut out = ArrayD::from_elem(IxDyn(shape), false);
    for (cell, value) in out.iter_mut().zip(values.iter()) {
        *cell = *value;
    }
    out
}
