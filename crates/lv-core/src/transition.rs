//! Animated interpolation between successive visual states
//!
//! Times are seconds on whatever clock the UI layer runs on; the controller
//! never reads a clock itself.

use egui::Color32;

use crate::colors::lerp_color;

/// Cubic ease-in-out
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// A single animated scalar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start: f64,
    pub duration: f64,
}

impl Tween {
    pub fn new(from: f64, to: f64, start: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            start,
            duration,
        }
    }

    /// A tween that already sits at `value`
    pub fn settled(value: f64) -> Self {
        Self::new(value, value, 0.0, 0.0)
    }

    /// Eased progress in `[0, 1]`
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ease_cubic_in_out((now - self.start) / self.duration)
    }

    pub fn value_at(&self, now: f64) -> f64 {
        self.from + (self.to - self.from) * self.progress(now)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.duration <= 0.0 || now >= self.start + self.duration
    }
}

/// Geometry of one histogram bar, in histogram-local pixels
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    /// Coordinate name, used to match bars across transitions
    pub name: String,
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color32,
    pub opacity: f32,
    /// Source value, kept for tooltips
    pub value: f64,
}

impl BarGeometry {
    fn collapsed(&self) -> Self {
        Self {
            height: 0.0,
            ..self.clone()
        }
    }

    fn lerp(&self, to: &Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            name: to.name.clone(),
            x: mix(self.x, to.x),
            width: mix(self.width, to.width),
            height: mix(self.height, to.height),
            color: lerp_color(self.color, to.color, t as f32),
            opacity: mix(self.opacity as f64, to.opacity as f64) as f32,
            value: to.value,
        }
    }
}

/// Interpolation from one bar set to another, matched by coordinate name.
///
/// Bars new to the target grow from zero height; bars missing from it shrink
/// to zero and are dropped once the transition ends.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTransition {
    pairs: Vec<(BarGeometry, BarGeometry)>,
    exiting: Vec<BarGeometry>,
    target: Vec<BarGeometry>,
    start: f64,
    duration: f64,
}

impl BarTransition {
    pub fn new(from: &[BarGeometry], to: Vec<BarGeometry>, start: f64, duration: f64) -> Self {
        let pairs = to
            .iter()
            .map(|bar| {
                let origin = from
                    .iter()
                    .find(|old| old.name == bar.name)
                    .cloned()
                    .unwrap_or_else(|| bar.collapsed());
                (origin, bar.clone())
            })
            .collect();
        let exiting = from
            .iter()
            .filter(|old| !to.iter().any(|bar| bar.name == old.name))
            .cloned()
            .collect();

        Self {
            pairs,
            exiting,
            target: to,
            start,
            duration,
        }
    }

    /// A bar set shown without animation
    pub fn settled(bars: Vec<BarGeometry>) -> Self {
        Self::new(&[], bars, 0.0, 0.0)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.duration <= 0.0 || now >= self.start + self.duration
    }

    /// Bars as displayed at `now`
    pub fn sample(&self, now: f64) -> Vec<BarGeometry> {
        if self.is_finished(now) {
            return self.target.clone();
        }
        let t = Tween::new(0.0, 1.0, self.start, self.duration).value_at(now);
        self.pairs
            .iter()
            .map(|(from, to)| from.lerp(to, t))
            .chain(self.exiting.iter().map(|old| old.lerp(&old.collapsed(), t)))
            .collect()
    }

    /// Bars once the transition has run
    pub fn target(&self) -> &[BarGeometry] {
        &self.target
    }
}

impl Default for BarTransition {
    fn default() -> Self {
        Self::settled(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(name: &str, height: f64) -> BarGeometry {
        BarGeometry {
            name: name.to_string(),
            x: 0.0,
            width: 10.0,
            height,
            color: Color32::from_rgb(0, 0, 0),
            opacity: 1.0,
            value: height,
        }
    }

    #[test]
    fn test_easing_endpoints_and_midpoint() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert_eq!(ease_cubic_in_out(2.0), 1.0);
    }

    #[test]
    fn test_tween_value_at() {
        let tween = Tween::new(2.0, 4.0, 10.0, 0.5);
        assert_eq!(tween.value_at(9.0), 2.0);
        assert_eq!(tween.value_at(10.25), 3.0);
        assert_eq!(tween.value_at(11.0), 4.0);
        assert!(!tween.is_finished(10.25));
        assert!(tween.is_finished(10.5));
    }

    #[test]
    fn test_bars_matched_by_name() {
        let from = vec![bar("a", 10.0), bar("b", 20.0)];
        let to = vec![bar("b", 40.0), bar("a", 30.0)];
        let transition = BarTransition::new(&from, to, 0.0, 1.0);

        let mid = transition.sample(0.5);
        let b = mid.iter().find(|bar| bar.name == "b").unwrap();
        let a = mid.iter().find(|bar| bar.name == "a").unwrap();
        assert_eq!(b.height, 30.0);
        assert_eq!(a.height, 20.0);
    }

    #[test]
    fn test_entering_and_exiting_bars() {
        let from = vec![bar("old", 10.0)];
        let to = vec![bar("new", 10.0)];
        let transition = BarTransition::new(&from, to, 0.0, 1.0);

        let mid = transition.sample(0.5);
        assert_eq!(mid.len(), 2);
        assert!(mid.iter().all(|bar| bar.height == 5.0));

        let done = transition.sample(1.0);
        assert_eq!(done, vec![bar("new", 10.0)]);
    }

    #[test]
    fn test_settled_has_no_animation() {
        let transition = BarTransition::settled(vec![bar("a", 3.0)]);
        assert!(transition.is_finished(0.0));
        assert_eq!(transition.sample(-1.0), vec![bar("a", 3.0)]);
    }
}
