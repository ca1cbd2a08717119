//! Histogram panel of the hovered point

use egui::{vec2, Color32, Painter, Pos2, Rect, Shape};
use lv_core::colors::with_opacity;
use lv_core::{BarGeometry, LinkedViewController};

use super::axes::{band_ticks, linear_ticks, paint_bottom_axis, paint_left_axis};

/// Tick count hint for the value axis
const VALUE_TICKS: usize = 10;

/// Screen rectangle of a bar; bars stand on the bottom edge of the panel
pub fn bar_rect(bar: &BarGeometry, origin: Pos2, panel_height: f64) -> Rect {
    let height = bar.height.max(0.0);
    Rect::from_min_size(
        origin + vec2(bar.x as f32, (panel_height - height) as f32),
        vec2(bar.width.max(0.0) as f32, height as f32),
    )
}

/// Filled rectangles for `bars`, opacity applied
pub fn histogram_shapes(bars: &[BarGeometry], origin: Pos2, panel_height: f64) -> Vec<Shape> {
    bars.iter()
        .filter(|bar| bar.opacity > 0.0)
        .map(|bar| {
            Shape::rect_filled(
                bar_rect(bar, origin, panel_height),
                0.0,
                with_opacity(bar.color, bar.opacity),
            )
        })
        .collect()
}

/// Draw the histogram panel as of `now`, axes included
pub fn paint_histogram(painter: &Painter, controller: &LinkedViewController, origin: Pos2, now: f64, axis_color: Color32) {
    let layout = controller.layout();
    let [width, height] = layout.histogram_size;
    let panel_origin = origin + vec2(layout.histogram_origin[0] as f32, layout.histogram_origin[1] as f32);

    painter.extend(histogram_shapes(&controller.bars_at(now), panel_origin, height));

    let scales = controller.histogram_scales();
    paint_left_axis(
        painter,
        panel_origin,
        height as f32,
        &linear_ticks(&scales.y, VALUE_TICKS),
        "coord. value",
        axis_color,
    );
    paint_bottom_axis(
        painter,
        panel_origin + vec2(0.0, height as f32),
        width as f32,
        &band_ticks(&scales.band),
        "coord. name",
        axis_color,
    );
}
