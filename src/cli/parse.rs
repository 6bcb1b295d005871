//! Parse command implementation.
//!
//! Converts one ASC file into the JSON document form.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::discovery::Manifest;
use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::parser::{parse_asc_file, ParseOptions};
use crate::types::{ContourFilter, CoordinateSpace, Document};

/// Convert an ASC contour file to JSON
#[derive(Args, Debug, Default)]
pub struct ParseArgs {
    /// ASC file to read
    pub file: PathBuf,

    /// Voxel size in mm (1 or 3 values); outputs voxel coordinates
    #[arg(long, num_args = 1..=3, value_name = "MM")]
    pub voxel_size: Option<Vec<f64>>,

    /// Keep point diameters as a fourth coordinate
    #[arg(long)]
    pub diameter: bool,

    /// Drop counting-site contours (TopRight, LeftBottom). Remaining region
    /// ids are kept as parsed, so they may have gaps
    #[arg(long)]
    pub exclude_sites: bool,

    /// Only keep contours with these names
    #[arg(long, value_delimiter = ',', value_name = "NAME")]
    pub only: Vec<String>,

    /// Output file (default: stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

impl ParseArgs {
    /// Parser options: flags first, manifest defaults otherwise.
    pub fn options(&self, manifest: &Manifest) -> ParseOptions {
        let space = match &self.voxel_size {
            Some(size) => CoordinateSpace::from_voxel_size(Some(size.as_slice())),
            None => manifest.space(),
        };
        ParseOptions::default()
            .with_space(space)
            .with_diameter(self.diameter || manifest.keep_diameter)
    }

    /// Contour filter: flags first, manifest defaults otherwise.
    pub fn filter(&self, manifest: &Manifest) -> ContourFilter {
        let mut filter = if self.exclude_sites {
            ContourFilter::default()
        } else {
            manifest.contour_filter()
        };
        filter.include = self.only.clone();
        filter
    }
}

/// Parse and filter one file with the effective settings.
pub fn convert(args: &ParseArgs, manifest: &Manifest) -> Result<Document> {
    let doc = parse_asc_file(&args.file, &args.options(manifest))?;
    Ok(doc.filtered(&args.filter(manifest)))
}

pub fn run(args: ParseArgs, config: Option<&Path>) -> Result<()> {
    let printer = Printer::new();
    let manifest = super::current_manifest(config)?;

    let doc = convert(&args, &manifest)?;
    super::write_json(&doc, args.output.as_deref(), args.compact)?;

    printer.status(
        "Parsed",
        &format!(
            "{} ({}, {}, {})",
            display_path(&args.file),
            plural(doc.sections.len(), "section", "sections"),
            plural(doc.contour_count(), "contour", "contours"),
            plural(doc.point_count(), "point", "points"),
        ),
    );
    if let Some(output) = &args.output {
        printer.info("Wrote", &printer.cyan(&display_path(output)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoxelSize;
    use std::fs;
    use tempfile::tempdir;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.asc")
    }

    #[test]
    fn test_flags_override_manifest() {
        let manifest = Manifest {
            voxel_size: Some(vec![0.01]),
            ..Default::default()
        };
        let args = ParseArgs {
            voxel_size: Some(vec![0.002, 0.002, 0.05]),
            diameter: true,
            ..Default::default()
        };

        let options = args.options(&manifest);

        assert_eq!(
            options.space,
            CoordinateSpace::Voxel(VoxelSize::from_slice(&[0.002, 0.002, 0.05]))
        );
        assert!(options.keep_diameter);
    }

    #[test]
    fn test_manifest_defaults_apply() {
        let manifest = Manifest {
            voxel_size: Some(vec![0.01]),
            exclude_sites: true,
            ..Default::default()
        };
        let args = ParseArgs::default();

        assert_eq!(
            args.options(&manifest).space,
            CoordinateSpace::Voxel(VoxelSize::isotropic(0.01))
        );
        assert!(!args.filter(&manifest).accepts("TopRight"));
    }

    #[test]
    fn test_convert_excluding_sites() {
        let args = ParseArgs {
            file: fixture(),
            exclude_sites: true,
            ..Default::default()
        };

        let doc = convert(&args, &Manifest::default()).unwrap();

        assert_eq!(doc.contour_count(), 3);
        assert!(doc.region_id("TopRight").is_none());
        assert_eq!(doc.region_id("Cortex"), Some(2));
    }

    #[test]
    fn test_convert_only() {
        let args = ParseArgs {
            file: fixture(),
            only: vec!["Cortex".to_string()],
            ..Default::default()
        };

        let doc = convert(&args, &Manifest::default()).unwrap();

        assert_eq!(doc.contour_count(), 1);
    }

    #[test]
    fn test_run_writes_json() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("brain.json");
        let args = ParseArgs {
            file: fixture(),
            output: Some(output.clone()),
            ..Default::default()
        };
        let config = dir.path().join("mbf.yaml");
        fs::write(&config, "keep_diameter: true\n").unwrap();

        run(args, Some(&config)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["description"], "Mouse 12, left hemisphere");
        assert_eq!(value["regions"]["Hippocampus"], 1);
        let first = &value["sections"]["S1"]["contours"][0];
        assert_eq!(first["name"], "Hippocampus");
        assert_eq!(first["points"][0].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let args = ParseArgs {
            file: PathBuf::from("/nonexistent/brain.asc"),
            ..Default::default()
        };

        assert!(convert(&args, &Manifest::default()).is_err());
    }
}
