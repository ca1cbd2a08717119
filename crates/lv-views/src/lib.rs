//! egui rendering of the linked views

mod linked_view;
pub mod plots;
mod space_view;

pub use linked_view::{LinkedView, LinkedViewConfig};
pub use space_view::{SpaceView, SpaceViewId};

use std::sync::Arc;

use lv_core::{HoveredData, LinkedViewController};
use parking_lot::RwLock;

/// Context passed to views during rendering
#[derive(Clone, Default)]
pub struct ViewerContext {
    /// Controller of the loaded data, if any
    pub controller: Arc<RwLock<Option<LinkedViewController>>>,

    /// Currently hovered data
    pub hovered_data: Arc<RwLock<HoveredData>>,
}

impl ViewerContext {
    /// Swap in a new controller, dropping the previous one
    pub fn set_controller(&self, controller: Option<LinkedViewController>) {
        *self.controller.write() = controller;
        *self.hovered_data.write() = HoveredData::default();
    }
}
