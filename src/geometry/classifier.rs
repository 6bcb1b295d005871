//! Pluggable point-in-region classification.
//!
//! The ray caster is the default provider. Alternates are chosen through
//! configuration ([`ClassifierKind`]), never by probing the environment.

use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

use super::boundary::Boundary;
use super::raycast::RayCaster;
use super::scanline::Scanline;

/// Something that decides which points lie inside a closed boundary.
pub trait PointClassifier: Send + Sync {
    /// Short name used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Classify `(N, D)` points against a validated boundary.
    fn classify_boundary(
        &self,
        points: ArrayView2<'_, f64>,
        boundary: &Boundary<'_>,
    ) -> Result<Array1<bool>, GeometryError>;

    /// Classify `(N, D)` points against `vertices` and optional `faces`.
    fn classify(
        &self,
        points: ArrayView2<'_, f64>,
        vertices: ArrayView2<'_, f64>,
        faces: Option<ArrayView2<'_, usize>>,
    ) -> Result<Array1<bool>, GeometryError> {
        let boundary = Boundary::new(vertices, faces)?;
        self.classify_boundary(points, &boundary)
    }
}

/// Available classifier providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierKind {
    /// Ray casting in 2D and 3D.
    #[default]
    RayCast,
    /// Even-odd scanline crossings, 2D only.
    Scanline,
}

impl ClassifierKind {
    /// Instantiate the provider. `seed` only affects the ray caster.
    pub fn build(self, seed: Option<u64>) -> Box<dyn PointClassifier> {
        match self {
            ClassifierKind::RayCast => Box::new(match seed {
                Some(seed) => RayCaster::with_seed(seed),
                None => RayCaster::new(),
            }),
            ClassifierKind::Scanline => Box::new(Scanline),
        }
    }
}
