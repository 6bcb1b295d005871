//! Ray-casting point classification.
//!
//! A half-line is shot from every query point in one shared direction and
//! the faces it crosses are counted; an odd count means the point is
//! inside. Faces are few compared to query points (a contour against a
//! whole raster), so each face is reduced once to a small set of dot
//! products and every point is then tested against all of them.

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::GeometryError;

use super::boundary::Boundary;
use super::classifier::PointClassifier;

/// Below this, a face normal counts as perpendicular to the ray.
pub const PARALLEL_EPSILON: f64 = 1e-15;

/// Seed used when none is configured, so repeated runs agree on points
/// lying exactly on the boundary.
pub const DEFAULT_SEED: u64 = 0x6d62_665f_7261_7973;

/// Ray direction policy.
#[derive(Debug, Clone, PartialEq)]
enum Ray {
    Seeded(u64),
    Fixed(Vec<f64>),
}

/// Ray-casting classifier for closed polygons and triangle surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct RayCaster {
    ray: Ray,
}

impl RayCaster {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Draw the ray direction from a seeded generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            ray: Ray::Seeded(seed),
        }
    }

    /// Use a fixed ray direction (need not be normalized).
    pub fn with_direction(direction: &[f64]) -> Self {
        Self {
            ray: Ray::Fixed(direction.to_vec()),
        }
    }

    /// The ray direction used for a `dim`-dimensional batch.
    pub fn direction(&self, dim: usize) -> Result<Array1<f64>, GeometryError> {
        match &self.ray {
            Ray::Seeded(seed) => {
                let mut rng = StdRng::seed_from_u64(*seed);
                loop {
                    let ray: Array1<f64> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
                    if ray.dot(&ray) > 1e-6 {
                        return Ok(ray);
                    }
                }
            }
            Ray::Fixed(direction) => {
                if direction.len() != dim {
                    return Err(GeometryError::DimensionMismatch {
                        expected: dim,
                        found: direction.len(),
                    });
                }
                Ok(Array1::from(direction.clone()))
            }
        }
    }
}

impl Default for RayCaster {
    fn default() -> Self {
        Self::new()
    }
}

impl PointClassifier for RayCaster {
    fn name(&self) -> &'static str {
        "ray-cast"
    }

    fn classify_boundary(
        &self,
        points: ArrayView2<'_, f64>,
        boundary: &Boundary<'_>,
    ) -> Result<Array1<bool>, GeometryError> {
        boundary.check_points(&points)?;
        let ray = self.direction(boundary.dim())?;

        let faces: Vec<FaceFrame> = boundary
            .faces()
            .enumerate()
            .filter_map(|(i, face)| {
                let frame = FaceFrame::new(boundary, face, &ray.view());
                if frame.is_none() {
                    trace!(face = i, "face skipped: degenerate or parallel to ray");
                }
                frame
            })
            .collect();
        debug!(
            points = points.nrows(),
            faces = boundary.face_count(),
            usable = faces.len(),
            "ray casting"
        );

        let inside: Vec<bool> = (0..points.nrows())
            .into_par_iter()
            .map(|i| {
                let point = points.row(i);
                let crossings = faces.iter().filter(|f| f.crossed_by(&point)).count();
                crossings % 2 == 1
            })
            .collect();

        Ok(Array1::from(inside))
    }
}

/// Per-face quantities shared by every query point.
///
/// For a point `p`, the hit parameter is `t = (n·p - n·o) / n·r` and the
/// hit lies at `q = p - t r`. Its offset `w = q - o` is expressed in the
/// face frame through `w·u` and `w·v`.
#[derive(Debug, Clone)]
struct FaceFrame {
    normal: Array1<f64>,
    u: Array1<f64>,
    v: Option<Array1<f64>>,
    n_dot_o: f64,
    n_dot_r: f64,
    o_dot_u: f64,
    r_dot_u: f64,
    o_dot_v: f64,
    r_dot_v: f64,
    uu: f64,
    uv: f64,
    vv: f64,
    det: f64,
}

impl FaceFrame {
    /// `None` for faces the ray cannot cross transversally.
    fn new(
        boundary: &Boundary<'_>,
        face: ArrayView1<'_, usize>,
        ray: &ArrayView1<'_, f64>,
    ) -> Option<Self> {
        let origin = boundary.vertex(face[0]).to_owned();
        let u = &boundary.vertex(face[1]) - &origin;

        let (normal, v) = if boundary.dim() == 3 {
            let v = &boundary.vertex(face[2]) - &origin;
            let normal = Array1::from(vec![
                u[1] * v[2] - u[2] * v[1],
                u[2] * v[0] - u[0] * v[2],
                u[0] * v[1] - u[1] * v[0],
            ]);
            (normal, Some(v))
        } else {
            (Array1::from(vec![-u[1], u[0]]), None)
        };

        let normal_norm = normal.dot(&normal).sqrt();
        let ray_norm = ray.dot(ray).sqrt();
        if normal_norm == 0.0 || !normal_norm.is_finite() {
            return None;
        }
        let n_dot_r = normal.dot(ray);
        if (n_dot_r / (normal_norm * ray_norm)).abs() < PARALLEL_EPSILON {
            return None;
        }

        let uu = u.dot(&u);
        let (o_dot_v, r_dot_v, uv, vv) = match &v {
            Some(v) => (origin.dot(v), ray.dot(v), u.dot(v), v.dot(v)),
            None => (0.0, 0.0, 0.0, 0.0),
        };
        let det = uu * vv - uv * uv;
        if v.is_some() && det == 0.0 {
            return None;
        }

        Some(Self {
            n_dot_o: normal.dot(&origin),
            o_dot_u: origin.dot(&u),
            r_dot_u: ray.dot(&u),
            normal,
            n_dot_r,
            o_dot_v,
            r_dot_v,
            uu,
            uv,
            vv,
            det,
            u,
            v,
        })
    }

    fn crossed_by(&self, point: &ArrayView1<'_, f64>) -> bool {
        let t = (self.normal.dot(point) - self.n_dot_o) / self.n_dot_r;
        if t.is_nan() || t < 0.0 {
            return false;
        }

        let wu = self.u.dot(point) - self.o_dot_u - t * self.r_dot_u;
        match &self.v {
            None => {
                let s = wu / self.uu;
                (0.0..1.0).contains(&s)
            }
            Some(v) => {
                let wv = v.dot(point) - self.o_dot_v - t * self.r_dot_v;
                let a = (self.vv * wu - self.uv * wv) / self.det;
                let b = (self.uu * wv - self.uv * wu) / self.det;
                a >= 0.0 && b > 0.0 && a + b < 1.0
            }
        }
    }
}
