//! Linked view state

use crate::model::LinkKey;

/// The one piece of mutable state: which key is highlighted.
///
/// `point` is the marker currently enlarged; it stays `None` until the
/// first hover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub key: LinkKey,
    pub point: Option<usize>,
}

impl ViewState {
    pub fn new(key: LinkKey) -> Self {
        Self { key, point: None }
    }
}

/// Result of feeding a hover to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverOutcome {
    /// Same key as the current state, nothing to do
    Unchanged,

    /// The highlight moved
    Changed {
        previous: Option<usize>,
        current: usize,
    },

    /// No point under the pointer, or the point has no histogram
    Ignored,
}

impl HoverOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, HoverOutcome::Changed { .. })
    }
}

/// Pointer information exposed to status displays
#[derive(Default, Clone, Debug)]
pub struct HoveredData {
    pub x: f64,
    pub y: f64,
    pub point_index: Option<usize>,
    pub key: Option<LinkKey>,
}
