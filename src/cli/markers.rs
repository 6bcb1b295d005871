//! Markers command implementation.
//!
//! Converts a marker export into FreeSurfer `fs_pointset` JSON, optionally
//! one file per marker group.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::discovery::Manifest;
use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::parser::parse_markers_file;
use crate::types::{PointSet, VoxelSize};

/// Convert a marker export to a FreeSurfer point set
#[derive(Args, Debug, Default)]
pub struct MarkersArgs {
    /// Marker text file to read
    pub file: PathBuf,

    /// Voxel size in mm (1 or 3 values, default 0.001)
    #[arg(long, num_args = 1..=3, value_name = "MM")]
    pub voxel_size: Option<Vec<f64>>,

    /// Write one point set per marker group
    #[arg(long)]
    pub split_groups: bool,

    /// Output file (default: stdout). With --split-groups, each group is
    /// written next to it as <stem>-group<N>.json
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

impl MarkersArgs {
    pub fn voxel(&self, manifest: &Manifest) -> VoxelSize {
        match &self.voxel_size {
            Some(size) => VoxelSize::from_slice(size),
            None => manifest.marker_voxel_size(),
        }
    }
}

/// Path of the point set for `group` next to `output`.
pub fn group_path(output: &Path, group: u32) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "markers".to_string());
    output.with_file_name(format!("{}-group{}.json", stem, group))
}

pub fn run(args: MarkersArgs, config: Option<&Path>) -> Result<()> {
    let printer = Printer::new();
    let manifest = super::current_manifest(config)?;

    let points = parse_markers_file(&args.file, &args.voxel(&manifest))?;
    printer.status(
        "Read",
        &format!(
            "{} ({})",
            display_path(&args.file),
            plural(points.len(), "marker", "markers")
        ),
    );

    if !args.split_groups {
        return super::write_json(&points, args.output.as_deref(), args.compact);
    }

    let groups: Vec<PointSet> = points.split_groups();
    match &args.output {
        Some(output) => {
            for set in &groups {
                let group = set.points.first().map(|m| m.group()).unwrap_or_default();
                let path = group_path(output, group);
                super::write_json(set, Some(&path), args.compact)?;
                printer.info(
                    "Wrote",
                    &format!(
                        "{} ({})",
                        printer.cyan(&display_path(&path)),
                        plural(set.len(), "marker", "markers")
                    ),
                );
            }
            Ok(())
        }
        None => super::write_json(&groups, None, args.compact),
    }
}
