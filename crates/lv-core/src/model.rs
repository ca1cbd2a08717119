//! Records shared by every view: scatter points and histogram rows

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier that links a scatter point to its histogram bucket.
///
/// Numeric identifiers are kept in their display form (`2`, not `2.0`) so
/// that the label reads the same whichever table format they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkKey(Arc<str>);

impl LinkKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// Build a key from a numeric cell
    pub fn from_number(value: f64) -> Self {
        Self::new(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LinkKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LinkKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A single scatter point
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Identifier, also the key of the histogram bucket
    pub key: LinkKey,

    /// Embedding coordinates
    pub x: f64,
    pub y: f64,

    /// Numeric group used for colouring
    pub group: f64,
}

impl Point {
    pub fn new(key: impl Into<LinkKey>, x: f64, y: f64, group: f64) -> Self {
        Self {
            key: key.into(),
            x,
            y,
            group,
        }
    }
}

/// One bar of a point's histogram
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramEntry {
    pub key: LinkKey,
    pub coord_name: String,
    pub coord_value: f64,
}

impl HistogramEntry {
    pub fn new(key: impl Into<LinkKey>, coord_name: impl Into<String>, coord_value: f64) -> Self {
        Self {
            key: key.into(),
            coord_name: coord_name.into(),
            coord_value,
        }
    }
}

/// Both tables of a linked view, as handed over by a data source
#[derive(Debug, Clone, Default)]
pub struct LinkedData {
    pub points: Vec<Point>,
    pub histogram: Vec<HistogramEntry>,
}

impl LinkedData {
    pub fn new(points: Vec<Point>, histogram: Vec<HistogramEntry>) -> Self {
        Self { points, histogram }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.histogram.is_empty()
    }
}
