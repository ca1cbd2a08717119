//! Rendering options for a linked view
//!
//! All fields default to the classic 400 px scatter + 400x325 histogram
//! layout, so partial option objects deserialize cleanly.

use serde::{Deserialize, Serialize};

/// Plot margins, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 20.0,
            left: 20.0,
        }
    }
}

/// Options controlling layout, marker sizes and animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedViewOptions {
    pub margin: Margin,

    /// Side of the square scatter plot
    pub scatter_size: f64,

    /// Top-left corner of the histogram, relative to the margin origin
    pub histogram_origin: [f64; 2],

    /// Width and height of the histogram bars area
    pub histogram_size: [f64; 2],

    /// Anchor of the hover label
    pub label_origin: [f64; 2],

    /// Prefix written before the hovered identifier
    pub label_prefix: String,

    /// Marker radius at rest
    pub point_radius: f32,

    /// Marker radius of the highlighted point
    pub highlight_radius: f32,

    /// Inner/outer padding of the histogram bands
    pub bar_padding: f64,

    /// Opacity of bars with a negative value
    pub negative_opacity: f32,

    pub histogram_transition_ms: u64,
    pub highlight_on_ms: u64,
    pub highlight_off_ms: u64,

    /// Draw the hit-region outlines
    pub show_cells: bool,

    /// Re-layout on resize instead of keeping the fixed layout
    pub fit_to_surface: bool,
}

impl Default for LinkedViewOptions {
    fn default() -> Self {
        Self {
            margin: Margin::default(),
            scatter_size: 400.0,
            histogram_origin: [500.0, 50.0],
            histogram_size: [400.0, 325.0],
            label_origin: [500.0, 20.0],
            label_prefix: "ID: ".to_string(),
            point_radius: 2.0,
            highlight_radius: 4.0,
            bar_padding: 0.1,
            negative_opacity: 0.5,
            histogram_transition_ms: 400,
            highlight_on_ms: 200,
            highlight_off_ms: 400,
            show_cells: false,
            fit_to_surface: false,
        }
    }
}

impl LinkedViewOptions {
    /// Surface size the fixed layout needs, margins included
    pub fn preferred_size(&self) -> [f64; 2] {
        let right = (self.histogram_origin[0] + self.histogram_size[0]).max(self.scatter_size);
        let bottom = (self.histogram_origin[1] + self.histogram_size[1]).max(self.scatter_size);
        [
            right + self.margin.left + self.margin.right,
            bottom + self.margin.top + self.margin.bottom,
        ]
    }
}
