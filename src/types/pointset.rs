//! FreeSurfer-compatible point sets built from marker files.

use serde::Serialize;

/// A JSON point set (`fs_pointset`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSet {
    pub data_type: String,
    pub points: Vec<Marker>,
    pub vox2ras: String,
}

/// One marker in voxel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub coordinates: Coordinates,
    pub legacy_stat: u32,
    pub statistics: MarkerStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerStatistics {
    pub group: u32,
}

impl Marker {
    pub fn new(group: u32, x: f64, y: f64, z: f64) -> Self {
        Self {
            coordinates: Coordinates { x, y, z },
            legacy_stat: 1,
            statistics: MarkerStatistics { group },
        }
    }

    pub fn group(&self) -> u32 {
        self.statistics.group
    }
}

impl PointSet {
    pub fn new(points: Vec<Marker>) -> Self {
        Self {
            data_type: "fs_pointset".to_string(),
            points,
            vox2ras: "scanner_ras".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// One point set per marker group, groups in ascending order.
    pub fn split_groups(&self) -> Vec<PointSet> {
        let mut groups: Vec<u32> = self.points.iter().map(Marker::group).collect();
        groups.sort_unstable();
        groups.dedup();

        groups
            .into_iter()
            .map(|g| {
                PointSet::new(
                    self.points
                        .iter()
                        .filter(|m| m.group() == g)
                        .cloned()
                        .collect(),
                )
            })
            .collect()
    }
}
