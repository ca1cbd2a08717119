//! Painters for the panels of a linked view

pub mod axes;
pub mod histogram;
pub mod scatter;

pub use axes::{band_ticks, linear_ticks, AxisTick};
pub use histogram::{bar_rect, histogram_shapes, paint_histogram};
pub use scatter::{cell_shapes, marker_shapes, paint_scatter, to_local, to_screen};
