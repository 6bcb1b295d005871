//! Rendering module for mbf.
//!
//! This module turns the contours of one section into a region label
//! image, plus a JSON legend naming each label.

mod label;
mod legend;
mod png;

pub use label::LabelMap;
pub use legend::{write_legend_json, LabelLegend, LegendRegion};
pub use png::{write_label_png, write_mask_png};
