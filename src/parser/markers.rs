//! Marker coordinate file reader.
//!
//! ```text
//! ;Marker Coordinate File
//! X(um)    Y(um)     Z(um)  Marker Diameter
//! 1 12108.17 -8056.31  -118.80     1.65
//! 1 12845.47 -8010.11  -118.80     1.65
//! ```
//!
//! The first line is a title and is skipped. Each remaining line holds a
//! marker group, x, y, z (um) and a diameter; anything else is ignored.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{MbfError, Result};
use crate::types::{Marker, PointSet, VoxelSize};

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    const FLOAT: &str = r"[+-]?\d+\.?\d*(?:[eE][+-]?\d+)?";
    Regex::new(&format!(
        r"(?P<group>\d+)\s+(?P<x>{FLOAT})\s+(?P<y>{FLOAT})\s+(?P<z>{FLOAT})\s+(?P<d>{FLOAT})\s*"
    ))
    .expect("marker pattern is valid")
});

/// Default marker voxel size: 1 um, expressed in mm.
pub const DEFAULT_MARKER_VOXEL: f64 = 1e-3;

/// Read a marker file from disk.
pub fn parse_markers_file(path: &Path, voxel: &VoxelSize) -> Result<PointSet> {
    let source = fs::read_to_string(path).map_err(|e| MbfError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read marker file: {}", e),
    })?;
    debug!(path = %path.display(), "parsing marker file");
    Ok(parse_markers(&source, voxel))
}

/// Parse marker text into a point set in voxel space.
///
/// Coordinates are converted from um to mm and divided by the voxel size,
/// with y and z flipped.
pub fn parse_markers(source: &str, voxel: &VoxelSize) -> PointSet {
    let [vx, vy, vz] = voxel.as_mm();

    let markers = source
        .lines()
        .enumerate()
        .skip(1)
        .filter_map(|(i, line)| {
            let marker = decode_marker(line);
            if marker.is_none() {
                trace!(line = i + 1, "skipping non-marker line");
            }
            marker
        })
        .map(|(group, x, y, z)| {
            Marker::new(group, x * 1e-3 / vx, -y * 1e-3 / vy, -z * 1e-3 / vz)
        })
        .collect();

    PointSet::new(markers)
}

/// Decode `group x y z diameter` anywhere in a line.
fn decode_marker(line: &str) -> Option<(u32, f64, f64, f64)> {
    let caps = MARKER_RE.captures(line)?;
    let float = |name: &str| caps.name(name)?.as_str().parse::<f64>().ok();

    let group = caps.name("group")?.as_str();
    let Ok(group) = group.parse::<u32>() else {
        trace!(group, "marker group out of range");
        return None;
    };

    Some((
        group,
        float("x")?,
        float("y")?,
        float("z")?,
    ))
}
