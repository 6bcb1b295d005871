//! File system scanner for discovering MBF exports.
//!
//! Recursively scans directories to find ASC contour files (`.asc`) and
//! marker exports (`.txt`).

use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use super::manifest::{ExcludeSet, Manifest};

/// Kind of export recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Contour tracing (`.asc`).
    Asc,
    /// Marker list (`.txt`).
    Markers,
}

/// Result of scanning a directory for exports.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered ASC files.
    pub asc: Vec<PathBuf>,
    /// Discovered marker files.
    pub markers: Vec<PathBuf>,
}

impl ScanResult {
    /// Create a new empty scan result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of discovered files.
    pub fn total(&self) -> usize {
        self.asc.len() + self.markers.len()
    }

    /// Check if no files were discovered.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get files of a specific kind.
    pub fn files_of_kind(&self, kind: SourceKind) -> &[PathBuf] {
        match kind {
            SourceKind::Asc => &self.asc,
            SourceKind::Markers => &self.markers,
        }
    }

    /// Record one file under its kind.
    pub fn push(&mut self, kind: SourceKind, path: PathBuf) {
        match kind {
            SourceKind::Asc => self.asc.push(path),
            SourceKind::Markers => self.markers.push(path),
        }
    }

    /// Merge another scan result into this one.
    pub fn merge(&mut self, other: ScanResult) {
        self.asc.extend(other.asc);
        self.markers.extend(other.markers);
    }

    fn sort(&mut self) {
        self.asc.sort();
        self.markers.sort();
    }
}

/// Scan a directory for exports.
///
/// Files are returned sorted so batch output is reproducible.
pub fn scan_directory(root: &Path, manifest: &Manifest) -> ScanResult {
    scan_with(root, &manifest.exclude_set())
}

fn scan_with(root: &Path, excludes: &ExcludeSet) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        // Skip directories
        if path.is_dir() {
            continue;
        }

        if excludes.matches(path) {
            trace!(path = %path.display(), "excluded");
            continue;
        }

        if let Some(kind) = detect_source_kind(path) {
            result.push(kind, path.to_path_buf());
        }
    }

    result.sort();
    result
}

/// Scan multiple source paths.
pub fn scan_sources(sources: &[String], base_path: &Path, manifest: &Manifest) -> ScanResult {
    let excludes = manifest.exclude_set();
    let mut result = ScanResult::new();

    for source in sources {
        let source_path = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            base_path.join(source)
        };

        result.merge(scan_with(&source_path, &excludes));
    }

    result
}

/// Detect the export kind from a file path based on its extension.
pub fn detect_source_kind(path: &Path) -> Option<SourceKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "asc" => Some(SourceKind::Asc),
        "txt" => Some(SourceKind::Markers),
        _ => None,
    }
}
