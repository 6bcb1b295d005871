//! Batch command implementation.
//!
//! Discovers every export under a project directory and converts it to
//! JSON in the output directory, mirroring the source layout.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::warn;

use crate::discovery::{discover_with, DiscoveryResult, Manifest};
use crate::error::{MbfError, Result};
use crate::output::{display_path, plural, Printer};
use crate::parser::{parse_asc_file, parse_markers_file};

/// Convert every export found under a project directory
#[derive(Args, Debug, Default)]
pub struct BatchArgs {
    /// Project directory (default: current directory)
    pub dir: Option<PathBuf>,

    /// Output directory (default: manifest output, or "out")
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Written JSON files.
    pub written: Vec<PathBuf>,
    /// Inputs that failed, with the error text.
    pub failed: Vec<(PathBuf, String)>,
}

/// Where the JSON for `source` goes: its path below `root`, re-rooted
/// under `output`, with a `.json` extension.
pub fn output_path(root: &Path, output: &Path, source: &Path) -> PathBuf {
    let relative = source
        .strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| source.file_name().map(PathBuf::from).unwrap_or_default());
    output.join(relative).with_extension("json")
}

/// Convert everything `discovery` found. Files are processed one at a time;
/// a failing file is recorded and the rest continue.
pub fn convert_all(
    discovery: &DiscoveryResult,
    output: &Path,
    compact: bool,
    printer: &Printer,
) -> BatchReport {
    let manifest: &Manifest = &discovery.manifest;
    let options = manifest.parse_options();
    let filter = manifest.contour_filter();
    let voxel = manifest.marker_voxel_size();
    let mut report = BatchReport::default();

    for source in &discovery.scan.asc {
        let target = output_path(&discovery.root, output, source);
        let result = parse_asc_file(source, &options).and_then(|doc| {
            let doc = doc.filtered(&filter);
            super::write_json(&doc, Some(&target), compact)?;
            Ok(doc.contour_count())
        });
        match result {
            Ok(contours) => {
                printer.status(
                    "Converted",
                    &format!(
                        "{} ({})",
                        display_path(source),
                        plural(contours, "contour", "contours")
                    ),
                );
                report.written.push(target);
            }
            Err(e) => record_failure(printer, &mut report, source, e),
        }
    }

    for source in &discovery.scan.markers {
        let target = output_path(&discovery.root, output, source);
        let result = parse_markers_file(source, &voxel).and_then(|points| {
            super::write_json(&points, Some(&target), compact)?;
            Ok(points.len())
        });
        match result {
            Ok(markers) => {
                printer.status(
                    "Converted",
                    &format!(
                        "{} ({})",
                        display_path(source),
                        plural(markers, "marker", "markers")
                    ),
                );
                report.written.push(target);
            }
            Err(e) => record_failure(printer, &mut report, source, e),
        }
    }

    report
}

fn record_failure(printer: &Printer, report: &mut BatchReport, source: &Path, error: MbfError) {
    warn!(path = %source.display(), error = %error, "conversion failed");
    printer.error("Failed", &format!("{}: {}", display_path(source), error));
    report.failed.push((source.to_path_buf(), error.to_string()));
}

pub fn run(args: BatchArgs, config: Option<&Path>) -> Result<()> {
    let printer = Printer::new();
    let root = args.dir.clone().unwrap_or_else(|| PathBuf::from("."));

    let discovery = discover_with(&root, config)?;
    if let Some(path) = &discovery.manifest_path {
        printer.info("Using", &display_path(path));
    }
    if discovery.scan.is_empty() {
        printer.warning("Found", &format!("no exports under {}", display_path(&root)));
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| discovery.root.join(&discovery.manifest.output));
    let report = convert_all(&discovery, &output, args.compact, &printer);

    printer.status(
        "Finished",
        &format!(
            "{} into {}",
            plural(report.written.len(), "file", "files"),
            display_path(&output)
        ),
    );

    if !report.failed.is_empty() {
        return Err(MbfError::Build {
            message: format!("{} export(s) failed to convert", report.failed.len()),
            help: Some("Run `mbf validate` on the failing files for details".to_string()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = include_str!("../../tests/fixtures/sample.asc");
    const MARKERS: &str = include_str!("../../tests/fixtures/markers.txt");

    #[test]
    fn test_output_path_mirrors_layout() {
        assert_eq!(
            output_path(Path::new("/data"), Path::new("/out"), Path::new("/data/m12/left.asc")),
            PathBuf::from("/out/m12/left.json")
        );
        assert_eq!(
            output_path(Path::new("/data"), Path::new("/out"), Path::new("/elsewhere/x.txt")),
            PathBuf::from("/out/x.json")
        );
    }

    #[test]
    fn test_batch_converts_project() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("exports/m12")).unwrap();
        fs::write(dir.path().join("exports/m12/brain.asc"), SAMPLE).unwrap();
        fs::write(dir.path().join("exports/cells.txt"), MARKERS).unwrap();
        fs::write(
            dir.path().join("mbf.yaml"),
            "sources: [exports]\noutput: converted\nexclude_sites: true\n",
        )
        .unwrap();

        run(
            BatchArgs {
                dir: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
            None,
        )
        .unwrap();

        let brain = dir.path().join("converted/exports/m12/brain.json");
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&brain).unwrap()).unwrap();
        assert!(value["regions"].get("TopRight").is_none());
        assert!(dir.path().join("converted/exports/cells.json").exists());
    }

    #[test]
    fn test_batch_reports_failures() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.asc"), SAMPLE).unwrap();
        fs::write(dir.path().join("cut.asc"), "(\"Cortex\"\n  (1 2 3 0.5 S1)\n").unwrap();

        let discovery = discover_with(dir.path(), None).unwrap();
        let output = dir.path().join("out");
        let report = convert_all(&discovery, &output, true, &Printer::new());

        assert_eq!(report.written, vec![output.join("good.json")]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].0.ends_with("cut.asc"));
    }
}
