//! Left and bottom axes in the d3 manner: a domain line, outward ticks and a title

use std::f32::consts::FRAC_PI_2;

use egui::epaint::TextShape;
use egui::{pos2, vec2, Align2, Color32, FontId, Painter, Pos2, Shape, Stroke};
use lv_core::scale::{BandScale, LinearScale};

/// Length of the tick marks
pub const TICK_SIZE: f32 = 6.0;

/// Gap between tick mark and label
const TICK_PADDING: f32 = 3.0;

/// Font size of tick labels and axis titles
pub const AXIS_FONT_SIZE: f32 = 10.0;

/// A tick along an axis, `offset` measured from the axis origin in pixels
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub offset: f32,
    pub label: String,
}

/// Ticks of a linear scale, labelled with just enough decimals
pub fn linear_ticks(scale: &LinearScale, count: usize) -> Vec<AxisTick> {
    let values = scale.ticks(count);
    let decimals = tick_decimals(&values);
    values
        .into_iter()
        .map(|v| AxisTick {
            offset: scale.apply(v) as f32,
            label: format_tick(v, decimals),
        })
        .collect()
}

/// One tick in the middle of every band
pub fn band_ticks(scale: &BandScale) -> Vec<AxisTick> {
    let half = scale.bandwidth() / 2.0;
    scale
        .domain()
        .iter()
        .filter_map(|name| {
            scale.position(name).map(|x| AxisTick {
                offset: (x + half) as f32,
                label: name.clone(),
            })
        })
        .collect()
}

fn tick_decimals(values: &[f64]) -> usize {
    let step = match values {
        [a, b, ..] => (b - a).abs(),
        _ => return 0,
    };
    if step <= 0.0 || step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    }
}

fn format_tick(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    // avoid "-0"
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        text.trim_start_matches('-').to_string()
    } else {
        text
    }
}

/// Domain line and tick marks of a vertical axis at `origin`, ticks pointing left
pub fn left_axis_shapes(origin: Pos2, length: f32, ticks: &[AxisTick], stroke: Stroke) -> Vec<Shape> {
    let mut shapes = vec![Shape::line_segment([origin, origin + vec2(0.0, length)], stroke)];
    shapes.extend(ticks.iter().map(|tick| {
        let at = origin + vec2(0.0, tick.offset);
        Shape::line_segment([at, at - vec2(TICK_SIZE, 0.0)], stroke)
    }));
    shapes
}

/// Domain line and tick marks of a horizontal axis at `origin`, ticks pointing down
pub fn bottom_axis_shapes(origin: Pos2, length: f32, ticks: &[AxisTick], stroke: Stroke) -> Vec<Shape> {
    let mut shapes = vec![Shape::line_segment([origin, origin + vec2(length, 0.0)], stroke)];
    shapes.extend(ticks.iter().map(|tick| {
        let at = origin + vec2(tick.offset, 0.0);
        Shape::line_segment([at, at + vec2(0.0, TICK_SIZE)], stroke)
    }));
    shapes
}

/// Draw a vertical axis with its rotated title
pub fn paint_left_axis(painter: &Painter, origin: Pos2, length: f32, ticks: &[AxisTick], title: &str, color: Color32) {
    let stroke = Stroke::new(1.0, color);
    painter.extend(left_axis_shapes(origin, length, ticks, stroke));

    let font = FontId::proportional(AXIS_FONT_SIZE);
    for tick in ticks {
        painter.text(
            origin + vec2(-(TICK_SIZE + TICK_PADDING), tick.offset),
            Align2::RIGHT_CENTER,
            &tick.label,
            font.clone(),
            color,
        );
    }

    let galley = painter.layout_no_wrap(title.to_string(), font, color);
    let mut title_shape = TextShape::new(pos2(origin.x + 6.0, origin.y + galley.size().x), galley);
    title_shape.angle = -FRAC_PI_2;
    painter.add(title_shape);
}

/// Draw a horizontal axis with its title centred below it
pub fn paint_bottom_axis(painter: &Painter, origin: Pos2, length: f32, ticks: &[AxisTick], title: &str, color: Color32) {
    let stroke = Stroke::new(1.0, color);
    painter.extend(bottom_axis_shapes(origin, length, ticks, stroke));

    let font = FontId::proportional(AXIS_FONT_SIZE);
    for tick in ticks {
        painter.text(
            origin + vec2(tick.offset, TICK_SIZE + TICK_PADDING),
            Align2::CENTER_TOP,
            &tick.label,
            font.clone(),
            color,
        );
    }
    painter.text(
        origin + vec2(length / 2.0, 30.0),
        Align2::CENTER_BOTTOM,
        title,
        font,
        color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_ticks_positions_and_labels() {
        let scale = LinearScale::new((0.0, 10.0), (400.0, 0.0));
        let ticks = linear_ticks(&scale, 2);
        assert_eq!(
            ticks,
            vec![
                AxisTick { offset: 400.0, label: "0".to_string() },
                AxisTick { offset: 200.0, label: "5".to_string() },
                AxisTick { offset: 0.0, label: "10".to_string() },
            ]
        );
    }

    #[test]
    fn test_fractional_ticks_get_decimals() {
        assert_eq!(tick_decimals(&[0.0, 0.2, 0.4]), 1);
        assert_eq!(tick_decimals(&[0.0, 0.05]), 2);
        assert_eq!(tick_decimals(&[0.0, 5.0]), 0);
        assert_eq!(format_tick(-0.0, 1), "0.0");
        assert_eq!(format_tick(-0.5, 1), "-0.5");
    }

    #[test]
    fn test_band_ticks_sit_mid_band() {
        let scale = BandScale::new(vec!["a".to_string(), "b".to_string()], (0.0, 400.0), 0.1);
        let ticks = band_ticks(&scale);
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].label, "a");
        let expected = scale.position("a").unwrap() + scale.bandwidth() / 2.0;
        assert_eq!(ticks[0].offset, expected as f32);
    }

    #[test]
    fn test_axis_shapes_have_one_segment_per_tick() {
        let ticks = vec![
            AxisTick { offset: 0.0, label: "0".to_string() },
            AxisTick { offset: 50.0, label: "1".to_string() },
        ];
        let shapes = bottom_axis_shapes(Pos2::ZERO, 100.0, &ticks, Stroke::new(1.0, Color32::BLACK));
        assert_eq!(shapes.len(), 3);
    }
}
