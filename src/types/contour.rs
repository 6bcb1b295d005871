//! Contour and point types.

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Contour names that encode stereological counting sites rather than
/// anatomical regions.
pub const SITE_KEYS: [&str; 2] = ["TopRight", "LeftBottom"];

/// One contour vertex.
///
/// Serialized as `[x, y, z]`, or `[x, y, z, d]` when the diameter was kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub diameter: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            diameter: None,
        }
    }

    pub fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = Some(diameter);
        self
    }

    pub fn xyz(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.diameter.is_some() { 4 } else { 3 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.x)?;
        seq.serialize_element(&self.y)?;
        seq.serialize_element(&self.z)?;
        if let Some(d) = self.diameter {
            seq.serialize_element(&d)?;
        }
        seq.end()
    }
}

/// A named region boundary traced in one tissue section.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct Contour {
    /// Region name (e.g. an anatomical structure).
    pub name: String,

    /// Set only by an explicit `(Closed)` marker in the file.
    pub closed: bool,

    /// Display colour as written in the file, e.g. `RGB (255, 0, 0)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    pub points: Vec<Point>,

    /// Id of the owning section, taken from the point records.
    pub section: String,
}

impl Contour {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether this contour marks a counting site.
    pub fn is_site(&self) -> bool {
        SITE_KEYS.contains(&self.name.as_str())
    }

    /// The (x, y) vertex ring, as consumed by the 2D geometry engine.
    pub fn xy(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| [p.x, p.y]).collect()
    }
}

/// Name-based contour selection.
///
/// An empty `include` list accepts every name not in `exclude`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ContourFilter {
    /// Accept every contour.
    pub fn all() -> Self {
        Self {
            include: vec![],
            exclude: vec![],
        }
    }

    /// Only accept the given names.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: names.into_iter().map(Into::into).collect(),
            exclude: vec![],
        }
    }

    pub fn accepts(&self, name: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|n| n == name) {
            return false;
        }
        !self.exclude.iter().any(|n| n == name)
    }
}

impl Default for ContourFilter {
    /// Excludes the counting-site contours.
    fn default() -> Self {
        Self {
            include: vec![],
            exclude: SITE_KEYS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_serializes_as_array() {
        let json = serde_json::to_string(&Point::new(1.0, 2.0, -3.0)).unwrap();
        assert_eq!(json, "[1.0,2.0,-3.0]");
    }

    #[test]
    fn test_point_with_diameter_serializes_four() {
        let json = serde_json::to_string(&Point::new(1.0, 2.0, 3.0).with_diameter(0.5)).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,0.5]");
    }

    #[test]
    fn test_contour_omits_missing_color() {
        let contour = Contour::new("CA1");
        let value = serde_json::to_value(&contour).unwrap();

        assert!(value.get("color").is_none());
        assert_eq!(value["name"], "CA1");
        assert_eq!(value["closed"], false);
    }

    #[test]
    fn test_contour_is_site() {
        assert!(Contour::new("TopRight").is_site());
        assert!(!Contour::new("Hippocampus").is_site());
    }

    #[test]
    fn test_default_filter_excludes_sites() {
        let filter = ContourFilter::default();
        assert!(!filter.accepts("LeftBottom"));
        assert!(filter.accepts("Cortex"));
    }

    #[test]
    fn test_filter_only() {
        let filter = ContourFilter::only(["Cortex"]);
        assert!(filter.accepts("Cortex"));
        assert!(!filter.accepts("Striatum"));
    }

    #[test]
    fn test_filter_all() {
        assert!(ContourFilter::all().accepts("TopRight"));
    }
}
