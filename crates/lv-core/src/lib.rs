//! Core of the linked views: data model, hover linking and view geometry
//!
//! This crate knows nothing about windows or painters. It turns a point table
//! and a histogram table into scatter markers, hit regions and bars, and keeps
//! them in sync as hover events arrive.

pub mod colors;
pub mod controller;
pub mod error;
pub mod events;
pub mod index;
pub mod layout;
pub mod model;
pub mod options;
pub mod scale;
pub mod state;
pub mod transition;
pub mod voronoi;

// Re-export commonly used types
pub use controller::{LinkedViewController, LinkedViewHandler, Marker, Scales, HistogramScales};
pub use error::LinkError;
pub use events::EventBus;
pub use index::GroupIndex;
pub use layout::Layout;
pub use model::{HistogramEntry, LinkKey, LinkedData, Point};
pub use options::{LinkedViewOptions, Margin};
pub use state::{HoverOutcome, HoveredData, ViewState};
pub use transition::BarGeometry;
pub use voronoi::{Extent, VoronoiDiagram};
