//! Scatter layer: markers, hit-region outlines and axes

use egui::{pos2, vec2, Color32, Painter, Pos2, Shape, Stroke, Vec2};
use lv_core::voronoi::Site;
use lv_core::{LinkedViewController, Marker, VoronoiDiagram};

use super::axes::{linear_ticks, paint_bottom_axis, paint_left_axis};

/// Tick count hint for both scatter axes
const SCATTER_TICKS: usize = 10;

/// Scatter-local pixel position to screen space
pub fn to_screen(origin: Pos2, site: Site) -> Pos2 {
    origin + vec2(site[0] as f32, site[1] as f32)
}

/// Screen position to scatter-local pixels
pub fn to_local(origin: Pos2, pos: Pos2) -> Site {
    let offset: Vec2 = pos - origin;
    [offset.x as f64, offset.y as f64]
}

pub fn marker_shapes(markers: &[Marker], origin: Pos2) -> Vec<Shape> {
    markers
        .iter()
        .map(|m| Shape::circle_filled(to_screen(origin, m.position), m.radius, m.color))
        .collect()
}

/// Outlines of the hit regions
pub fn cell_shapes(voronoi: &VoronoiDiagram, origin: Pos2, stroke: Stroke) -> Vec<Shape> {
    voronoi
        .cells()
        .filter(|(_, cell)| cell.len() >= 3)
        .map(|(_, cell)| Shape::closed_line(cell.iter().map(|&p| to_screen(origin, p)).collect(), stroke))
        .collect()
}

/// Draw the scatter layer as of `now`
pub fn paint_scatter(
    painter: &Painter,
    controller: &LinkedViewController,
    origin: Pos2,
    now: f64,
    show_cells: bool,
    axis_color: Color32,
) {
    let size = controller.layout().scatter_size as f32;
    let scales = controller.scales();

    if show_cells {
        let stroke = Stroke::new(0.5, axis_color.gamma_multiply(0.3));
        painter.extend(cell_shapes(controller.voronoi(), origin, stroke));
    }

    paint_left_axis(painter, origin, size, &linear_ticks(&scales.y, SCATTER_TICKS), "V2", axis_color);
    paint_bottom_axis(
        painter,
        pos2(origin.x, origin.y + size),
        size,
        &linear_ticks(&scales.x, SCATTER_TICKS),
        "v1",
        axis_color,
    );

    painter.extend(marker_shapes(&controller.markers(now), origin));
}
