pub mod batch;
pub mod completions;
pub mod markers;
pub mod parse;
pub mod rasterize;
pub mod validate;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use crate::discovery::{load_manifest, Manifest};
use crate::error::{MbfError, Result};

/// mbf - MicroBrightField stereology reader and region rasterizer
#[derive(Parser, Debug)]
#[command(name = "mbf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Manifest to read defaults from (default: ./mbf.yaml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert an ASC contour file to JSON
    Parse(parse::ParseArgs),

    /// Convert a marker export to a FreeSurfer point set
    Markers(markers::MarkersArgs),

    /// Rasterize the regions of one section into a label PNG
    Rasterize(rasterize::RasterizeArgs),

    /// Check ASC files for open, degenerate or unassigned contours
    Validate(validate::ValidateArgs),

    /// Convert every export found under a project directory
    Batch(batch::BatchArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Manifest for commands that work relative to the current directory.
pub(crate) fn current_manifest(config: Option<&Path>) -> Result<Manifest> {
    let (manifest, _) = load_manifest(config, Path::new("."))?;
    Ok(manifest)
}

/// Serialize `value` as JSON to `output`, or stdout when absent.
pub(crate) fn write_json<T: Serialize>(
    value: &T,
    output: Option<&Path>,
    compact: bool,
) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .map_err(|e| MbfError::Build {
        message: format!("Failed to serialize JSON: {}", e),
        help: None,
    })?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| MbfError::Io {
                    path: parent.to_path_buf(),
                    message: format!("Failed to create output directory: {}", e),
                })?;
            }
            fs::write(path, json + "\n").map_err(|e| MbfError::Io {
                path: path.to_path_buf(),
                message: format!("Failed to write JSON: {}", e),
            })
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["mbf", "validate", "a.asc", "-vv", "--config", "x.yaml"]);

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
        assert!(matches!(cli.command, Commands::Validate(_)));
    }

    #[test]
    fn test_write_json_creates_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out.json");

        write_json(&vec![1, 2], Some(&path), true).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[1,2]\n");
    }
}
