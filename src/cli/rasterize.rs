//! Rasterize command implementation.
//!
//! Parses an ASC file in voxel space, paints the contours of one section
//! into a 16-bit label image and writes a JSON legend beside it.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use crate::discovery::Manifest;
use crate::error::{MbfError, Result};
use crate::geometry::ClassifierKind;
use crate::output::{display_path, plural, Printer};
use crate::parser::{parse_asc_file, ParseOptions};
use crate::render::{write_label_png, write_legend_json, LabelLegend, LabelMap};
use crate::types::{CoordinateSpace, Document};
use crate::validation::{validate_document, DEGENERATE_CONTOUR};

/// Rasterize the regions of one section into a label PNG
#[derive(Args, Debug, Default)]
pub struct RasterizeArgs {
    /// ASC file to read
    pub file: PathBuf,

    /// Section id to rasterize (e.g. S1)
    #[arg(long)]
    pub section: String,

    /// Image width in pixels
    #[arg(long)]
    pub width: usize,

    /// Image height in pixels
    #[arg(long)]
    pub height: usize,

    /// Voxel size in mm (1 or 3 values)
    #[arg(long, num_args = 1..=3, value_name = "MM")]
    pub voxel_size: Option<Vec<f64>>,

    /// Point-in-region classifier
    #[arg(long, value_enum)]
    pub classifier: Option<ClassifierKind>,

    /// Seed for the ray direction
    #[arg(long)]
    pub seed: Option<u64>,

    /// Integer upscaling of the written image
    #[arg(long, default_value = "1")]
    pub scale: u32,

    /// Skip the JSON legend
    #[arg(long)]
    pub no_legend: bool,

    /// Output PNG path
    #[arg(long, short)]
    pub output: PathBuf,
}

impl RasterizeArgs {
    fn space(&self, manifest: &Manifest) -> Result<CoordinateSpace> {
        let space = match &self.voxel_size {
            Some(size) => CoordinateSpace::from_voxel_size(Some(size.as_slice())),
            None => manifest.space(),
        };
        match space {
            CoordinateSpace::Voxel(_) => Ok(space),
            CoordinateSpace::Mbf => Err(MbfError::Parse {
                message: "rasterize needs a voxel size".to_string(),
                help: Some("Pass --voxel-size or set voxel_size in mbf.yaml".to_string()),
            }),
        }
    }
}

/// Parse `args.file` and paint its section.
pub fn rasterize(args: &RasterizeArgs, manifest: &Manifest) -> Result<(Document, LabelMap)> {
    let options = ParseOptions::default().with_space(args.space(manifest)?);
    let doc = parse_asc_file(&args.file, &options)?;

    let section = doc.sections.get(&args.section).ok_or_else(|| MbfError::Parse {
        message: format!("section '{}' not found", args.section),
        help: Some(format!(
            "Available sections: {}",
            doc.sections.keys().cloned().collect::<Vec<_>>().join(", ")
        )),
    })?;

    let classifier = args
        .classifier
        .unwrap_or(manifest.classifier)
        .build(args.seed.or(manifest.ray_seed));
    info!(classifier = classifier.name(), section = %args.section, "rasterizing");

    let map = LabelMap::from_section(
        section,
        &doc.regions,
        (args.width, args.height),
        classifier.as_ref(),
    )?;
    Ok((doc, map))
}

pub fn run(args: RasterizeArgs, config: Option<&Path>) -> Result<()> {
    let printer = Printer::new();
    let manifest = super::current_manifest(config)?;

    let (doc, map) = rasterize(&args, &manifest)?;

    let prefix = format!("{} /", args.section);
    for d in validate_document(&doc).with_code(DEGENERATE_CONTOUR) {
        if d.location.as_deref().is_some_and(|l| l.starts_with(&prefix)) {
            printer.warning("Skipped", &d.message);
        }
    }

    write_label_png(&map, &args.output, args.scale)?;
    printer.status(
        "Rasterized",
        &format!(
            "{} {} ({}x{}, {})",
            display_path(&args.file),
            args.section,
            map.width(),
            map.height(),
            plural(map.areas().len(), "region", "regions"),
        ),
    );
    printer.info("Wrote", &printer.cyan(&display_path(&args.output)));

    if !args.no_legend {
        let legend_path = args.output.with_extension("json");
        let image = args
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let legend = LabelLegend::new(image, &args.section, &map, &doc.regions);
        write_legend_json(&legend, &legend_path)?;
        printer.info("Wrote", &printer.cyan(&display_path(&legend_path)));
    }

    Ok(())
}
