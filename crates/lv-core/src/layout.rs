//! Pixel layout of the scatter, label and histogram panels

use crate::options::{LinkedViewOptions, Margin};
use crate::voronoi::Extent;

/// Smallest scale factor a fitted layout may shrink to
const MIN_FIT_FACTOR: f64 = 0.05;

/// Effective pixel layout.
///
/// Panel positions are relative to the margin origin; the margin itself is
/// applied by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub margin: Margin,
    pub scatter_size: f64,
    pub histogram_origin: [f64; 2],
    pub histogram_size: [f64; 2],
    pub label_origin: [f64; 2],
}

impl Layout {
    /// The layout exactly as configured
    pub fn fixed(options: &LinkedViewOptions) -> Self {
        Self {
            margin: options.margin,
            scatter_size: options.scatter_size,
            histogram_origin: options.histogram_origin,
            histogram_size: options.histogram_size,
            label_origin: options.label_origin,
        }
    }

    /// The configured layout scaled uniformly to fit `surface`
    pub fn fitted(options: &LinkedViewOptions, surface: [f64; 2]) -> Self {
        let preferred = options.preferred_size();
        let m = options.margin;
        let content_w = preferred[0] - m.left - m.right;
        let content_h = preferred[1] - m.top - m.bottom;
        let avail_w = surface[0] - m.left - m.right;
        let avail_h = surface[1] - m.top - m.bottom;

        let factor = if content_w > 0.0 && content_h > 0.0 {
            (avail_w / content_w).min(avail_h / content_h).max(MIN_FIT_FACTOR)
        } else {
            1.0
        };
        Self::fixed(options).scaled(factor)
    }

    fn scaled(self, factor: f64) -> Self {
        let s = |v: [f64; 2]| [v[0] * factor, v[1] * factor];
        Self {
            margin: self.margin,
            scatter_size: self.scatter_size * factor,
            histogram_origin: s(self.histogram_origin),
            histogram_size: s(self.histogram_size),
            label_origin: s(self.label_origin),
        }
    }

    /// Clip rectangle of the hit regions: the scatter square grown by the margin
    pub fn hit_extent(&self) -> Extent {
        Extent::new(
            [-self.margin.left, -self.margin.top],
            [
                self.scatter_size + self.margin.right,
                self.scatter_size + self.margin.bottom,
            ],
        )
    }
}
