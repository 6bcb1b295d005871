//! Parsed stereology document.
//!
//! # Example
//!
//! ```text
//! (Description "Mouse 12, left hemisphere")
//! (Sections S1 "Section 1" -132 49.5 49.5
//!  S2 "Section 2" -181.5 49.5 49.5
//! )
//! ("Hippocampus"
//!   (Color RGB (255, 0, 0))
//!   (Closed)
//!   (  10.0  20.0  -132.0  0.5  S1)
//!   ...
//! )
//! ```

use indexmap::IndexMap;
use serde::Serialize;

use super::contour::{Contour, ContourFilter};

/// Everything recovered from one ASC file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    pub description: String,

    /// Region name -> 1-based id, in first-seen order.
    pub regions: IndexMap<String, u32>,

    /// Section id (`S1`, `S2`, ...) -> section, in declaration order.
    pub sections: IndexMap<String, Section>,
}

/// One physical tissue slice.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Section {
    pub name: String,

    /// z-coordinate of the section top (um).
    pub top: f64,

    /// Section thickness when cut (um).
    pub cutthickness: f64,

    /// Section thickness when mounted (um).
    pub mountedthickness: f64,

    pub contours: Vec<Contour>,

    /// False for sections only known from point records.
    #[serde(skip)]
    pub declared: bool,
}

impl Section {
    /// A section declared by a `(Sections ...)` record.
    pub fn declared(
        name: impl Into<String>,
        top: f64,
        cutthickness: f64,
        mountedthickness: f64,
    ) -> Self {
        Self {
            name: name.into(),
            top,
            cutthickness,
            mountedthickness,
            contours: Vec::new(),
            declared: true,
        }
    }

    /// Copy metadata from a declaration, keeping existing contours.
    pub fn merge_declaration(&mut self, declaration: Section) {
        self.name = declaration.name;
        self.top = declaration.top;
        self.cutthickness = declaration.cutthickness;
        self.mountedthickness = declaration.mountedthickness;
        self.declared = true;
        self.contours.extend(declaration.contours);
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the id of a region.
    pub fn region_id(&self, name: &str) -> Option<u32> {
        self.regions.get(name).copied()
    }

    /// Region names ordered by id.
    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// Iterate over all contours with their section ids, in file order
    /// within each section.
    pub fn contours(&self) -> impl Iterator<Item = (&str, &Contour)> {
        self.sections
            .iter()
            .flat_map(|(id, section)| section.contours.iter().map(move |c| (id.as_str(), c)))
    }

    /// Total number of contours across sections.
    pub fn contour_count(&self) -> usize {
        self.sections.values().map(|s| s.contours.len()).sum()
    }

    /// Total number of points across contours.
    pub fn point_count(&self) -> usize {
        self.contours().map(|(_, c)| c.len()).sum()
    }

    /// Copy of the document keeping only contours accepted by `filter`.
    ///
    /// Sections are all kept. Regions that lose every contour are dropped,
    /// the surviving ones keep their ids.
    pub fn filtered(&self, filter: &ContourFilter) -> Document {
        let sections: IndexMap<String, Section> = self
            .sections
            .iter()
            .map(|(id, section)| {
                let mut section = section.clone();
                section.contours.retain(|c| filter.accepts(&c.name));
                (id.clone(), section)
            })
            .collect();

        let regions = self
            .regions
            .iter()
            .filter(|(name, _)| {
                sections
                    .values()
                    .any(|s| s.contours.iter().any(|c| &c.name == *name))
            })
            .map(|(name, id)| (name.clone(), *id))
            .collect();

        Document {
            description: self.description.clone(),
            regions,
            sections,
        }
    }
}
