//! File discovery and configuration for mbf projects.
//!
//! This module finds the ASC and marker exports of a project directory,
//! either by scanning everything below the root or by following the source
//! list of an `mbf.yaml` manifest.
//!
//! # Example
//!
//! ```ignore
//! use mbf::discovery::discover;
//!
//! let result = discover("./mouse-12")?;
//! println!("Found {} exports", result.scan.total());
//! ```

mod manifest;
mod scanner;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

pub use manifest::{ExcludeSet, Manifest};
pub use scanner::{detect_source_kind, scan_directory, scan_sources, ScanResult, SourceKind};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "mbf.yaml";

/// Result of discovering exports in a project.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// The project root directory.
    pub root: PathBuf,

    /// The loaded manifest (may be default if no mbf.yaml found).
    pub manifest: Manifest,

    /// Where the manifest was read from, if anywhere.
    pub manifest_path: Option<PathBuf>,

    /// Scan results with discovered files.
    pub scan: ScanResult,
}

impl DiscoveryResult {
    /// Whether a manifest was found.
    pub fn has_manifest(&self) -> bool {
        self.manifest_path.is_some()
    }
}

/// Load the manifest for a command.
///
/// An explicit `config` path must exist. Otherwise `root/mbf.yaml` is used
/// when present, and defaults when not.
pub fn load_manifest(config: Option<&Path>, root: &Path) -> Result<(Manifest, Option<PathBuf>)> {
    if let Some(path) = config {
        return Ok((Manifest::load(path)?, Some(path.to_path_buf())));
    }

    let path = root.join(MANIFEST_FILENAME);
    if path.is_file() {
        debug!(path = %path.display(), "using manifest");
        Ok((Manifest::load(&path)?, Some(path)))
    } else {
        Ok((Manifest::default(), None))
    }
}

/// Discover exports in a project directory.
///
/// Looks for an `mbf.yaml` manifest in the root directory. If found, uses
/// the manifest's source paths. Otherwise, scans the entire directory.
pub fn discover(root: impl AsRef<Path>) -> Result<DiscoveryResult> {
    discover_with(root, None)
}

/// [`discover`] with an explicit manifest path.
pub fn discover_with(root: impl AsRef<Path>, config: Option<&Path>) -> Result<DiscoveryResult> {
    let root = root.as_ref().to_path_buf();
    let (manifest, manifest_path) = load_manifest(config, &root)?;

    let sources = manifest.effective_sources();
    let scan = scan_sources(&sources, &root, &manifest);
    debug!(
        root = %root.display(),
        asc = scan.asc.len(),
        markers = scan.markers.len(),
        "discovery finished"
    );

    Ok(DiscoveryResult {
        root,
        manifest,
        manifest_path,
        scan,
    })
}

/// Discover exports from specific paths (no manifest lookup).
///
/// Directories are scanned; files are taken as given when their extension
/// is recognised.
pub fn discover_paths(paths: &[PathBuf]) -> Result<DiscoveryResult> {
    let manifest = Manifest::default();
    let mut scan = ScanResult::new();

    for path in paths {
        if path.is_dir() {
            scan.merge(scan_directory(path, &manifest));
        } else if path.is_file() {
            if let Some(kind) = detect_source_kind(path) {
                scan.push(kind, path.clone());
            }
        }
    }

    let root = paths
        .first()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(DiscoveryResult {
        root,
        manifest,
        manifest_path: None,
        scan,
    })
}
