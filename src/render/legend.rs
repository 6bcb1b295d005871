//! JSON sidecar naming the regions of a label PNG.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{MbfError, Result};

use super::LabelMap;

/// Metadata written next to a label image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLegend {
    pub image: String,
    pub width: usize,
    pub height: usize,
    pub section: String,
    pub regions: Vec<LegendRegion>,
}

/// One region drawn in the image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendRegion {
    pub id: u32,
    pub name: String,
    /// Pixel count.
    pub area: usize,
}

impl LabelLegend {
    /// Describe `map`, listing every region that covers at least one pixel.
    pub fn new(
        image: impl Into<String>,
        section: impl Into<String>,
        map: &LabelMap,
        regions: &IndexMap<String, u32>,
    ) -> Self {
        let areas = map.areas();
        let regions = regions
            .iter()
            .filter_map(|(name, &id)| {
                let area = u16::try_from(id).ok().and_then(|l| areas.get(&l).copied())?;
                Some(LegendRegion {
                    id,
                    name: name.clone(),
                    area,
                })
            })
            .collect();

        Self {
            image: image.into(),
            width: map.width(),
            height: map.height(),
            section: section.into(),
            regions,
        }
    }
}

/// Write the legend as pretty JSON.
pub fn write_legend_json(legend: &LabelLegend, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(legend).map_err(|e| MbfError::Build {
        message: format!("Failed to serialize label legend: {}", e),
        help: None,
    })?;
    fs::write(path, json).map_err(|e| MbfError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write label legend: {}", e),
    })?;
    Ok(())
}
