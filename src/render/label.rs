//! Region label maps for one tissue section.

use indexmap::IndexMap;
use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::error::{MbfError, Result};
use crate::geometry::PointClassifier;
use crate::types::{Contour, Section};

/// A `(height, width)` grid of region ids, 0 for background.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    labels: Array2<u16>,
}

impl LabelMap {
    /// An all-background map.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            labels: Array2::zeros((height, width)),
        }
    }

    /// Rasterize every contour of `section` into a label map.
    ///
    /// Contour points must already be in voxel space: pixel `(row, col)`
    /// is tested at `x = col, y = row`. Contours drawn later overwrite
    /// earlier ones. Contours with fewer than three points are skipped.
    pub fn from_section(
        section: &Section,
        regions: &IndexMap<String, u32>,
        (width, height): (usize, usize),
        classifier: &dyn PointClassifier,
    ) -> Result<Self> {
        let mut map = Self::new(width, height);
        let pixels = pixel_centres(width, height);

        for contour in &section.contours {
            if contour.len() < 3 {
                debug!(
                    contour = %contour.name,
                    points = contour.len(),
                    "contour skipped: too few points to enclose an area"
                );
                continue;
            }
            let label = region_label(regions, contour)?;
            map.paint(pixels.view(), contour, label, classifier)?;
        }

        Ok(map)
    }

    fn paint(
        &mut self,
        pixels: ArrayView2<'_, f64>,
        contour: &Contour,
        label: u16,
        classifier: &dyn PointClassifier,
    ) -> Result<()> {
        let ring = contour.xy();
        let vertices = Array2::from_shape_fn((ring.len(), 2), |(i, k)| ring[i][k]);
        let inside = classifier.classify(pixels, vertices.view(), None)?;

        for (cell, hit) in self.labels.iter_mut().zip(inside.iter()) {
            if *hit {
                *cell = label;
            }
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.labels.ncols()
    }

    pub fn height(&self) -> usize {
        self.labels.nrows()
    }

    /// Label at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<u16> {
        self.labels.get((y, x)).copied()
    }

    pub fn labels(&self) -> &Array2<u16> {
        &self.labels
    }

    /// Highest label present.
    pub fn max_label(&self) -> u16 {
        self.labels.iter().copied().max().unwrap_or(0)
    }

    /// Pixel count per non-zero label, in ascending label order.
    pub fn areas(&self) -> IndexMap<u16, usize> {
        let mut areas = IndexMap::new();
        for &label in self.labels.iter().filter(|&&l| l != 0) {
            *areas.entry(label).or_insert(0) += 1;
        }
        areas.sort_keys();
        areas
    }

    /// Boolean mask of one label.
    pub fn mask(&self, label: u16) -> Array2<bool> {
        self.labels.mapv(|l| l == label)
    }
}

fn region_label(regions: &IndexMap<String, u32>, contour: &Contour) -> Result<u16> {
    let id = regions.get(&contour.name).copied().ok_or_else(|| MbfError::Build {
        message: format!("contour '{}' has no region id", contour.name),
        help: Some("Regions are assigned while parsing; rasterize a parsed document".to_string()),
    })?;
    u16::try_from(id).map_err(|_| MbfError::Build {
        message: format!("region id {id} does not fit a 16-bit label map"),
        help: None,
    })
}

/// `(x, y)` coordinates of every pixel, row-major.
fn pixel_centres(width: usize, height: usize) -> Array2<f64> {
    Array2::from_shape_fn((width * height, 2), |(i, k)| {
        if k == 0 {
            (i % width) as f64
        } else {
            (i / width) as f64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ClassifierKind, RayCaster};
    use crate::types::Point;

    fn rectangle(name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Contour {
        let mut contour = Contour::new(name);
        contour.closed = true;
        contour.points = vec![
            Point::new(x0, y0, 0.0),
            Point::new(x1, y0, 0.0),
            Point::new(x1, y1, 0.0),
            Point::new(x0, y1, 0.0),
        ];
        contour
    }

    fn regions(names: &[&str]) -> IndexMap<String, u32> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_string(), i as u32 + 1))
            .collect()
    }

    #[test]
    fn test_from_section_paints_regions() {
        let mut section = Section::default();
        section.contours.push(rectangle("Cortex", -0.5, -0.5, 5.5, 3.5));
        section.contours.push(rectangle("Hippocampus", 0.5, 0.5, 2.5, 2.5));

        let map = LabelMap::from_section(
            &section,
            &regions(&["Hippocampus", "Cortex"]),
            (8, 4),
            &RayCaster::new(),
        )
        .unwrap();

        assert_eq!(map.width(), 8);
        assert_eq!(map.height(), 4);
        assert_eq!(map.get(1, 1), Some(1));
        assert_eq!(map.get(4, 0), Some(2));
        assert_eq!(map.get(7, 3), Some(0));
        assert_eq!(map.get(8, 0), None);

        let areas = map.areas();
        assert_eq!(areas.get(&1), Some(&4));
        assert_eq!(areas.get(&2), Some(&20));
        assert_eq!(map.max_label(), 2);
    }

    #[test]
    fn test_short_contours_skipped() {
        let mut section = Section::default();
        let mut line = Contour::new("Marker");
        line.points = vec![Point::new(0.0, 0.0, 0.0), Point::new(3.0, 3.0, 0.0)];
        section.contours.push(line);

        let classifier = ClassifierKind::Scanline.build(None);
        let map =
            LabelMap::from_section(&section, &regions(&["Marker"]), (4, 4), classifier.as_ref())
                .unwrap();

        assert_eq!(map.max_label(), 0);
    }

    #[test]
    fn test_unknown_region_is_error() {
        let mut section = Section::default();
        section.contours.push(rectangle("Cortex", 0.5, 0.5, 2.5, 2.5));

        let err = LabelMap::from_section(&section, &IndexMap::new(), (4, 4), &RayCaster::new())
            .unwrap_err();

        assert!(matches!(err, MbfError::Build { .. }));
    }

    #[test]
    fn test_mask() {
        let mut section = Section::default();
        section.contours.push(rectangle("Cortex", 0.5, 0.5, 1.5, 1.5));

        let map =
            LabelMap::from_section(&section, &regions(&["Cortex"]), (3, 3), &RayCaster::new())
                .unwrap();
        let mask = map.mask(1);

        assert_eq!(mask.iter().filter(|&&v| v).count(), 1);
        assert!(mask[[1, 1]]);
    }
}
