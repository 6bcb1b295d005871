//! Project manifest (mbf.yaml) parsing.
//!
//! The manifest defines where ASC and marker exports live, where converted
//! output goes, and the conversion defaults used by every command.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MbfError, Result};
use crate::geometry::{ClassifierKind, PointClassifier};
use crate::parser::ParseOptions;
use crate::types::{ContourFilter, CoordinateSpace, VoxelSize};

/// Project manifest loaded from mbf.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Source directories to scan for exports.
    /// Defaults to current directory if empty.
    pub sources: Vec<String>,

    /// Output directory for converted files.
    pub output: PathBuf,

    /// Voxel size in mm. Absent means MBF coordinates are kept.
    pub voxel_size: Option<Vec<f64>>,

    /// Keep point diameters in the output.
    pub keep_diameter: bool,

    /// Drop counting-site contours (`TopRight`, `LeftBottom`).
    pub exclude_sites: bool,

    /// Point-in-region classifier used for rasterization.
    pub classifier: ClassifierKind,

    /// Seed for the ray direction of the ray-cast classifier.
    pub ray_seed: Option<u64>,

    /// Patterns to exclude from discovery.
    pub excludes: Vec<String>,
}

fn default_output() -> PathBuf {
    PathBuf::from("out")
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            sources: vec![],
            output: default_output(),
            voxel_size: None,
            keep_diameter: false,
            exclude_sites: false,
            classifier: ClassifierKind::default(),
            ray_seed: None,
            excludes: vec![],
        }
    }
}

impl Manifest {
    /// Load manifest from an mbf.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MbfError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| MbfError::Parse {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check mbf.yaml syntax".to_string()),
        })
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude_set().matches(path)
    }

    /// Compile the exclude patterns once for a whole scan.
    pub fn exclude_set(&self) -> ExcludeSet {
        ExcludeSet::new(&self.excludes)
    }

    /// Get effective source paths, defaulting to current directory.
    pub fn effective_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![".".to_string()]
        } else {
            self.sources.clone()
        }
    }

    /// Coordinate space implied by `voxel_size`.
    pub fn space(&self) -> CoordinateSpace {
        CoordinateSpace::from_voxel_size(self.voxel_size.as_deref())
    }

    /// Voxel size for marker conversion, which always works in voxels.
    pub fn marker_voxel_size(&self) -> VoxelSize {
        match self.voxel_size.as_deref() {
            Some(size) => VoxelSize::from_slice(size),
            None => VoxelSize::isotropic(crate::parser::DEFAULT_MARKER_VOXEL),
        }
    }

    /// Parser options carrying the manifest defaults.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::default()
            .with_space(self.space())
            .with_diameter(self.keep_diameter)
    }

    /// Contour filter carrying the manifest defaults.
    pub fn contour_filter(&self) -> ContourFilter {
        if self.exclude_sites {
            ContourFilter::default()
        } else {
            ContourFilter::all()
        }
    }

    /// Instantiate the configured classifier.
    pub fn build_classifier(&self) -> Box<dyn PointClassifier> {
        self.classifier.build(self.ray_seed)
    }
}

/// Compiled exclude patterns.
///
/// `*` matches within one path component, `**/` any run of leading
/// directories, `?` one character. A pattern matches whole components
/// anywhere in the path, so `temp` excludes `a/temp/b` but not `a/attempt`.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<Regex>,
}

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern| match Regex::new(&glob_to_regex(pattern)) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "ignoring invalid exclude pattern");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().replace('\\', "/");
        self.patterns.iter().any(|re| re.is_match(&path))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut body = String::new();
    let mut rest = pattern.trim_end_matches('/');
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("**/") {
            body.push_str("(?:.*/)?");
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("**") {
            body.push_str(".*");
            rest = tail;
        } else {
            let mut chars = rest.chars();
            match chars.next() {
                Some('*') => body.push_str("[^/]*"),
                Some('?') => body.push_str("[^/]"),
                Some(c) => body.push_str(&regex::escape(&c.to_string())),
                None => {}
            }
            rest = chars.as_str();
        }
    }
    format!("(?:^|/){body}(?:$|/)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_manifest() {
        let yaml = "output: build";
        let manifest = Manifest::parse(yaml).unwrap();

        assert_eq!(manifest.output, PathBuf::from("build"));
        assert!(manifest.sources.is_empty());
        assert!(manifest.voxel_size.is_none());
        assert_eq!(manifest.classifier, ClassifierKind::RayCast);
    }

    #[test]
    fn test_parse_full_manifest() {
        let yaml = r#"
sources:
  - exports/
  - markers/
output: converted
voxel_size: [0.01, 0.01, 0.05]
keep_diameter: true
exclude_sites: true
classifier: scanline
ray_seed: 42
excludes:
  - "*.bak"
  - "**/scratch/*"
"#;
        let manifest = Manifest::parse(yaml).unwrap();

        assert_eq!(manifest.sources, vec!["exports/", "markers/"]);
        assert_eq!(manifest.output, PathBuf::from("converted"));
        assert_eq!(manifest.voxel_size, Some(vec![0.01, 0.01, 0.05]));
        assert!(manifest.keep_diameter);
        assert!(manifest.exclude_sites);
        assert_eq!(manifest.classifier, ClassifierKind::Scanline);
        assert_eq!(manifest.ray_seed, Some(42));
        assert_eq!(manifest.excludes, vec!["*.bak", "**/scratch/*"]);
    }

    #[test]
    fn test_invalid_manifest() {
        let err = Manifest::parse("classifier: magic").unwrap_err();
        assert!(matches!(err, MbfError::Parse { .. }));
    }

    #[test]
    fn test_default_manifest() {
        let manifest = Manifest::default();

        assert!(manifest.sources.is_empty());
        assert_eq!(manifest.output, PathBuf::from("out"));
        assert!(!manifest.keep_diameter);
        assert!(!manifest.exclude_sites);
        assert!(manifest.ray_seed.is_none());
        assert!(manifest.excludes.is_empty());
        assert_eq!(manifest.space(), CoordinateSpace::Mbf);
    }

    #[test]
    fn test_effective_sources() {
        let mut manifest = Manifest::default();
        assert_eq!(manifest.effective_sources(), vec!["."]);

        manifest.sources = vec!["exports/".to_string()];
        assert_eq!(manifest.effective_sources(), vec!["exports/"]);
    }

    #[test]
    fn test_voxel_space_and_options() {
        let manifest = Manifest {
            voxel_size: Some(vec![0.002]),
            keep_diameter: true,
            ..Default::default()
        };

        let options = manifest.parse_options();
        assert_eq!(options.space, CoordinateSpace::Voxel(VoxelSize::isotropic(0.002)));
        assert!(options.keep_diameter);
        assert_eq!(manifest.marker_voxel_size(), VoxelSize::isotropic(0.002));
    }

    #[test]
    fn test_contour_filter_follows_exclude_sites() {
        let manifest = Manifest {
            exclude_sites: true,
            ..Default::default()
        };
        assert!(!manifest.contour_filter().accepts("TopRight"));
        assert!(Manifest::default().contour_filter().accepts("TopRight"));
    }

    #[test]
    fn test_is_excluded_extension() {
        let manifest = Manifest {
            excludes: vec!["*.bak".to_string()],
            ..Default::default()
        };

        assert!(manifest.is_excluded(Path::new("file.bak")));
        assert!(manifest.is_excluded(Path::new("path/to/file.bak")));
        assert!(!manifest.is_excluded(Path::new("file.asc")));
    }

    #[test]
    fn test_is_excluded_directory() {
        let manifest = Manifest {
            excludes: vec!["**/scratch/*".to_string()],
            ..Default::default()
        };

        assert!(manifest.is_excluded(Path::new("scratch/foo.asc")));
        assert!(manifest.is_excluded(Path::new("/data/mouse/scratch/bar.asc")));
        assert!(!manifest.is_excluded(Path::new("exports/brain.asc")));
    }

    #[test]
    fn test_is_excluded_component() {
        let manifest = Manifest {
            excludes: vec!["temp".to_string()],
            ..Default::default()
        };

        assert!(manifest.is_excluded(Path::new("temp")));
        assert!(manifest.is_excluded(Path::new("path/temp/file")));
        assert!(!manifest.is_excluded(Path::new("path/attempt.asc")));
    }

    #[test]
    fn test_parse_empty_manifest() {
        let manifest = Manifest::parse("").unwrap();

        // Should use defaults
        assert_eq!(manifest, Manifest::default());
    }
}
