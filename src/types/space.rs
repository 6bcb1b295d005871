//! Coordinate conventions for parsed points.
//!
//! Files store coordinates in MBF space (micrometres, +y up, +z toward the
//! top of the stack). Image voxel space flips y and z and measures in voxels.

use serde::{Deserialize, Serialize};

/// Voxel size along (x, y, z), in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct VoxelSize([f64; 3]);

impl VoxelSize {
    /// Isotropic voxel size.
    pub const fn isotropic(size: f64) -> Self {
        Self([size; 3])
    }

    /// Build from 1..=3 values.
    ///
    /// A scalar broadcasts to all axes, a shorter list repeats its last
    /// element, extra elements are ignored. An empty slice gives 1 mm.
    pub fn from_slice(values: &[f64]) -> Self {
        let Some(&last) = values.last() else {
            return Self::isotropic(1.0);
        };
        let mut size = [last; 3];
        for (axis, value) in values.iter().take(3).enumerate() {
            size[axis] = *value;
        }
        Self(size)
    }

    /// Voxel size in millimetres.
    pub fn as_mm(&self) -> [f64; 3] {
        self.0
    }

    /// Voxel size in micrometres (the unit of file coordinates).
    pub fn as_um(&self) -> [f64; 3] {
        self.0.map(|v| v * 1e3)
    }
}

impl Default for VoxelSize {
    fn default() -> Self {
        Self::isotropic(1.0)
    }
}

impl From<Vec<f64>> for VoxelSize {
    fn from(values: Vec<f64>) -> Self {
        Self::from_slice(&values)
    }
}

impl From<VoxelSize> for Vec<f64> {
    fn from(size: VoxelSize) -> Self {
        size.0.to_vec()
    }
}

/// Output convention for contour coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CoordinateSpace {
    /// Instrument space: `(x, y, -z)` in micrometres.
    #[default]
    Mbf,
    /// Image voxel space: `(x / vx, -y / vy, -z / vz)`.
    ///
    /// Only point coordinates are mapped. Section `top` and thicknesses
    /// stay in micrometres.
    Voxel(VoxelSize),
}

impl CoordinateSpace {
    /// Map a raw file triple into this space.
    pub fn map(&self, x: f64, y: f64, z: f64) -> [f64; 3] {
        match self {
            CoordinateSpace::Mbf => [x, y, -z],
            CoordinateSpace::Voxel(size) => {
                let [vx, vy, vz] = size.as_um();
                [x / vx, -y / vy, -z / vz]
            }
        }
    }

    /// Voxel space when a size is given, MBF space otherwise.
    pub fn from_voxel_size(size: Option<&[f64]>) -> Self {
        match size {
            Some(values) if !values.is_empty() => {
                CoordinateSpace::Voxel(VoxelSize::from_slice(values))
            }
            _ => CoordinateSpace::Mbf,
        }
    }
}
