//! Color utilities for the linked views

use std::collections::BTreeMap;

use egui::Color32;
use ordered_float::OrderedFloat;

/// Ten-colour categorical scheme
pub const CATEGORY10: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),  // Blue
    Color32::from_rgb(255, 127, 14),  // Orange
    Color32::from_rgb(44, 160, 44),   // Green
    Color32::from_rgb(214, 39, 40),   // Red
    Color32::from_rgb(148, 103, 189), // Purple
    Color32::from_rgb(140, 86, 75),   // Brown
    Color32::from_rgb(227, 119, 194), // Pink
    Color32::from_rgb(127, 127, 127), // Gray
    Color32::from_rgb(188, 189, 34),  // Olive
    Color32::from_rgb(23, 190, 207),  // Cyan
];

/// Fallback fill for values outside the palette domain
pub const STEEL_BLUE: Color32 = Color32::from_rgb(70, 130, 180);

/// Get a categorical color from the palette
pub fn categorical_color(index: usize) -> Color32 {
    CATEGORY10[index % CATEGORY10.len()]
}

/// Stable mapping from numeric group values to palette colours.
///
/// Colours are assigned by ascending rank of the distinct values, so the
/// mapping does not depend on the order the values were seen in.
#[derive(Debug, Clone, Default)]
pub struct CategoricalPalette {
    colors: BTreeMap<OrderedFloat<f64>, Color32>,
}

impl CategoricalPalette {
    pub fn new(groups: impl IntoIterator<Item = f64>) -> Self {
        let distinct: std::collections::BTreeSet<OrderedFloat<f64>> =
            groups.into_iter().map(OrderedFloat).collect();
        let colors = distinct
            .into_iter()
            .enumerate()
            .map(|(rank, group)| (group, categorical_color(rank)))
            .collect();
        Self { colors }
    }

    pub fn color(&self, group: f64) -> Color32 {
        self.colors
            .get(&OrderedFloat(group))
            .copied()
            .unwrap_or(STEEL_BLUE)
    }

    /// Groups with their colours, ascending
    pub fn entries(&self) -> impl Iterator<Item = (f64, Color32)> + '_ {
        self.colors.iter().map(|(g, c)| (g.0, *c))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Apply an opacity factor to a colour
pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.linear_multiply(opacity.clamp(0.0, 1.0))
}

/// Linear blend between two colours, channel by channel
pub fn lerp_color(from: Color32, to: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color32::from_rgba_premultiplied(
        mix(from.r(), to.r()),
        mix(from.g(), to.g()),
        mix(from.b(), to.b()),
        mix(from.a(), to.a()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_ignores_arrival_order() {
        let a = CategoricalPalette::new(vec![3.0, 1.0, 2.0, 1.0]);
        let b = CategoricalPalette::new(vec![1.0, 2.0, 3.0]);
        for group in [1.0, 2.0, 3.0] {
            assert_eq!(a.color(group), b.color(group));
        }
        assert_eq!(a.color(1.0), CATEGORY10[0]);
        assert_eq!(a.color(3.0), CATEGORY10[2]);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_palette_wraps_after_ten_groups() {
        let palette = CategoricalPalette::new((0..12).map(f64::from));
        assert_eq!(palette.color(10.0), palette.color(0.0));
        assert_eq!(palette.color(99.0), STEEL_BLUE);
    }

    #[test]
    fn test_lerp_color_endpoints() {
        let from = Color32::from_rgb(0, 0, 0);
        let to = Color32::from_rgb(200, 100, 50);
        assert_eq!(lerp_color(from, to, 0.0), from);
        assert_eq!(lerp_color(from, to, 1.0), to);
        assert_eq!(lerp_color(from, to, 0.5), Color32::from_rgb(100, 50, 25));
    }
}
