//! PNG output for label maps and masks.
//!
//! Label maps are written as 16-bit grayscale so region ids survive
//! unchanged; masks as 8-bit black and white. Both accept an integer
//! nearest-neighbour scale factor.

use std::path::Path;

use image::{ImageBuffer, Luma};
use ndarray::ArrayView2;

use crate::error::{MbfError, Result};

use super::LabelMap;

/// Write a label map to a 16-bit grayscale PNG.
///
/// # Arguments
///
/// * `map` - The label map to write
/// * `path` - Output file path
/// * `scale` - Integer scale factor (1 = no scaling)
pub fn write_label_png(map: &LabelMap, path: &Path, scale: u32) -> Result<()> {
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        scaled_buffer(map.labels().view(), scale, |&label| Luma([label]));
    save(&img, path)
}

/// Write a boolean mask to an 8-bit PNG: 255 inside, 0 outside.
pub fn write_mask_png(mask: ArrayView2<'_, bool>, path: &Path, scale: u32) -> Result<()> {
    let img: ImageBuffer<Luma<u8>, Vec<u8>> =
        scaled_buffer(mask, scale, |&inside| Luma([if inside { 255 } else { 0 }]));
    save(&img, path)
}

fn scaled_buffer<T, P, F>(
    grid: ArrayView2<'_, T>,
    scale: u32,
    pixel: F,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: image::Pixel,
    F: Fn(&T) -> P,
{
    let scale = scale.max(1); // Minimum scale of 1

    let width = grid.ncols() as u32 * scale;
    let height = grid.nrows() as u32 * scale;

    let mut img = ImageBuffer::new(width, height);

    for ((y, x), value) in grid.indexed_iter() {
        let p = pixel(value);

        // Fill scaled pixels
        for sy in 0..scale {
            for sx in 0..scale {
                img.put_pixel(x as u32 * scale + sx, y as u32 * scale + sy, p);
            }
        }
    }

    img
}

fn save<P>(img: &ImageBuffer<P, Vec<P::Subpixel>>, path: &Path) -> Result<()>
where
    P: image::PixelWithColorType,
    [P::Subpixel]: image::EncodableLayout,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MbfError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    img.save(path).map_err(|e| MbfError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write PNG: {}", e),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RayCaster;
    use crate::types::{Contour, Point, Section};
    use indexmap::IndexMap;
    use ndarray::array;
    use tempfile::tempdir;

    fn sample_map() -> LabelMap {
        let mut contour = Contour::new("Cortex");
        contour.points = vec![
            Point::new(0.5, -0.5, 0.0),
            Point::new(1.5, -0.5, 0.0),
            Point::new(1.5, 0.5, 0.0),
            Point::new(0.5, 0.5, 0.0),
        ];
        let mut section = Section::default();
        section.contours.push(contour);

        let mut regions = IndexMap::new();
        regions.insert("Hippocampus".to_string(), 1);
        regions.insert("Cortex".to_string(), 300);

        LabelMap::from_section(&section, &regions, (2, 2), &RayCaster::new()).unwrap()
    }

    #[test]
    fn test_write_label_png_keeps_ids() {
        let map = sample_map();

        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.png");

        write_label_png(&map, &path, 1).unwrap();

        assert!(path.exists());

        // Read back and verify
        let img = image::open(&path).unwrap().to_luma16();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 2);
        assert_eq!(img.get_pixel(0, 0).0, [0]);
        assert_eq!(img.get_pixel(1, 0).0, [300]);
        assert_eq!(img.get_pixel(1, 1).0, [0]);
    }

    #[test]
    fn test_write_mask_png_scaled() {
        let mask = array![[true, false]];

        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("mask.png");

        write_mask_png(mask.view(), &path, 2).unwrap();

        let img = image::open(&path).unwrap().to_luma8();
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 2);
        assert_eq!(img.get_pixel(0, 0).0, [255]);
        assert_eq!(img.get_pixel(1, 1).0, [255]);
        assert_eq!(img.get_pixel(2, 0).0, [0]);
        assert_eq!(img.get_pixel(3, 1).0, [0]);
    }

    #[test]
    fn test_scale_zero_treated_as_one() {
        let mask = array![[true]];

        let dir = tempdir().unwrap();
        let path = dir.path().join("zero.png");

        write_mask_png(mask.view(), &path, 0).unwrap();

        let img = image::open(&path).unwrap().to_luma8();
        assert_eq!(img.width(), 1);
        assert_eq!(img.height(), 1);
    }
}
