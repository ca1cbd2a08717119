//! Linked view controller
//!
//! Owns the view state and keeps the scatter markers, the hover label and the
//! histogram consistent with it. Rendering layers feed pointer events in
//! through [`LinkedViewHandler`] and read back geometry to draw.

use std::sync::Arc;

use ahash::AHashMap;
use egui::Color32;

use crate::colors::{CategoricalPalette, STEEL_BLUE};
use crate::error::{LinkError, Result};
use crate::events::events::{HighlightChanged, HistogramChanged, LabelChanged, ViewResized};
use crate::events::EventBus;
use crate::index::GroupIndex;
use crate::layout::Layout;
use crate::model::{LinkKey, LinkedData, Point};
use crate::options::LinkedViewOptions;
use crate::scale::{clamp, BandScale, LinearScale};
use crate::state::{HoverOutcome, ViewState};
use crate::transition::{BarGeometry, BarTransition, Tween};
use crate::voronoi::{Site, VoronoiDiagram};

/// Interaction entry points, one per interaction type
pub trait LinkedViewHandler {
    /// Pointer entered the hit region of `point`
    fn on_point_hover(&mut self, point: usize, now: f64) -> HoverOutcome;

    /// Pointer moved to `position`, in scatter-local pixels
    fn on_pointer_move(&mut self, position: Site, now: f64) -> HoverOutcome;

    /// Host surface changed size
    fn resize(&mut self, width: f64, height: f64);
}

/// Scatter axis scales, fixed per layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub x: LinearScale,
    pub y: LinearScale,
    /// Smallest and largest group value
    pub group_range: Option<(f64, f64)>,
}

impl Scales {
    /// Domains are the unpadded extents of the point coordinates
    pub fn compute(points: &[Point], size: f64) -> Self {
        let x = min_max(points.iter().map(|p| p.x)).unwrap_or((0.0, 0.0));
        let y = min_max(points.iter().map(|p| p.y)).unwrap_or((0.0, 0.0));
        Self {
            x: LinearScale::new(x, (0.0, size)),
            y: LinearScale::new(y, (size, 0.0)),
            group_range: min_max(points.iter().map(|p| p.group)),
        }
    }

    pub fn to_pixels(&self, point: &Point) -> Site {
        [self.x.apply(point.x), self.y.apply(point.y)]
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Histogram scales: bands over coordinate names, heights over `|value|`
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramScales {
    pub band: BandScale,
    pub y: LinearScale,
    pub max_abs: f64,
}

impl HistogramScales {
    pub fn new(index: &GroupIndex, size: [f64; 2], padding: f64) -> Self {
        Self {
            band: BandScale::new(index.coord_names().to_vec(), (0.0, size[0]), padding),
            y: LinearScale::new((0.0, index.max_abs()), (size[1], 0.0)),
            max_abs: index.max_abs(),
        }
    }

    /// `scale(clamp(|v|, 0, max_abs))` as a bar height
    pub fn bar_height(&self, value: f64) -> f64 {
        if self.max_abs <= 0.0 {
            return 0.0;
        }
        let capped = clamp(0.0, self.max_abs)(value.abs());
        self.y.range.0 - self.y.apply(capped)
    }
}

/// Bar opacity encodes the sign of the value
pub fn bar_opacity(value: f64, negative_opacity: f32) -> f32 {
    if value >= 0.0 {
        1.0
    } else {
        negative_opacity
    }
}

/// A scatter marker ready to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub index: usize,
    pub position: Site,
    pub color: Color32,
    pub radius: f32,
}

/// Controller of one linked view instance
#[derive(Debug)]
pub struct LinkedViewController {
    options: LinkedViewOptions,
    layout: Layout,
    surface: [f64; 2],

    points: Vec<Point>,
    index: GroupIndex,
    palette: CategoricalPalette,

    scales: Scales,
    histogram_scales: HistogramScales,
    pixels: Vec<Site>,
    voronoi: VoronoiDiagram,

    state: Option<ViewState>,
    label: String,
    bars: BarTransition,
    radii: AHashMap<usize, Tween>,

    events: Arc<EventBus>,
}

impl LinkedViewController {
    /// Build indices, scales and hit regions for `data`.
    ///
    /// Empty tables give an empty view; non-finite numbers are rejected.
    pub fn new(data: LinkedData, options: LinkedViewOptions) -> Result<Self> {
        validate(&data)?;

        let LinkedData { points, histogram } = data;
        let index = GroupIndex::build(histogram);
        let palette = CategoricalPalette::new(points.iter().map(|p| p.group));
        let layout = Layout::fixed(&options);
        let surface = options.preferred_size();

        let state = index.first_key().cloned().map(ViewState::new);
        let scales = Scales::compute(&points, layout.scatter_size);
        let histogram_scales = HistogramScales::new(&index, layout.histogram_size, options.bar_padding);

        let mut controller = Self {
            options,
            layout,
            surface,
            points,
            index,
            palette,
            scales,
            histogram_scales,
            pixels: Vec::new(),
            voronoi: VoronoiDiagram::build(&[], layout.hit_extent()),
            state,
            label: String::new(),
            bars: BarTransition::default(),
            radii: AHashMap::new(),
            events: Arc::new(EventBus::new()),
        };
        controller.rebuild_geometry();
        controller.bars = BarTransition::settled(controller.current_bars());

        tracing::info!(
            "Linked view ready: {} points, {} histogram buckets, initial key {:?}",
            controller.points.len(),
            controller.index.len(),
            controller.state.as_ref().map(|s| s.key.as_str())
        );

        Ok(controller)
    }

    /// Scales, pixel positions and hit regions for the current layout
    fn rebuild_geometry(&mut self) {
        self.scales = Scales::compute(&self.points, self.layout.scatter_size);
        self.histogram_scales = HistogramScales::new(
            &self.index,
            self.layout.histogram_size,
            self.options.bar_padding,
        );
        self.pixels = self.points.iter().map(|p| self.scales.to_pixels(p)).collect();
        self.voronoi = VoronoiDiagram::build(&self.pixels, self.layout.hit_extent());
    }

    /// Fill colour for the bucket of `key`: the group colour of its point
    fn key_color(&self, key: &LinkKey) -> Color32 {
        self.points
            .iter()
            .find(|p| &p.key == key)
            .map(|p| self.palette.color(p.group))
            .unwrap_or(STEEL_BLUE)
    }

    /// Target bars of `key`
    fn bars_for(&self, key: &LinkKey, color: Color32) -> Vec<BarGeometry> {
        let Some(bucket) = self.index.get(key) else {
            return Vec::new();
        };
        let scales = &self.histogram_scales;
        bucket
            .iter()
            .filter_map(|entry| {
                let x = scales.band.position(&entry.coord_name)?;
                Some(BarGeometry {
                    name: entry.coord_name.clone(),
                    x,
                    width: scales.band.bandwidth(),
                    height: scales.bar_height(entry.coord_value),
                    color,
                    opacity: bar_opacity(entry.coord_value, self.options.negative_opacity),
                    value: entry.coord_value,
                })
            })
            .collect()
    }

    fn current_bars(&self) -> Vec<BarGeometry> {
        match &self.state {
            Some(state) => {
                let color = match state.point {
                    Some(i) => self.palette.color(self.points[i].group),
                    None => self.key_color(&state.key),
                };
                self.bars_for(&state.key, color)
            }
            None => Vec::new(),
        }
    }

    fn animate_radius(&mut self, point: usize, to: f32, now: f64, duration_ms: u64) {
        let from = self.marker_radius(point, now) as f64;
        self.radii
            .insert(point, Tween::new(from, to as f64, now, duration_ms as f64 / 1000.0));
    }

    /// Label text for `key`
    fn label_for(&self, key: &LinkKey) -> String {
        format!("{}{}", self.options.label_prefix, key)
    }

    // --- read access for renderers ---

    pub fn options(&self) -> &LinkedViewOptions {
        &self.options
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn surface(&self) -> [f64; 2] {
        self.surface
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn index(&self) -> &GroupIndex {
        &self.index
    }

    pub fn palette(&self) -> &CategoricalPalette {
        &self.palette
    }

    pub fn scales(&self) -> &Scales {
        &self.scales
    }

    pub fn histogram_scales(&self) -> &HistogramScales {
        &self.histogram_scales
    }

    pub fn voronoi(&self) -> &VoronoiDiagram {
        &self.voronoi
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn state(&self) -> Option<&ViewState> {
        self.state.as_ref()
    }

    pub fn current_key(&self) -> Option<&LinkKey> {
        self.state.as_ref().map(|s| &s.key)
    }

    /// Index of the enlarged marker
    pub fn highlighted_point(&self) -> Option<usize> {
        self.state.as_ref().and_then(|s| s.point)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.index.is_empty()
    }

    /// Radius a marker is heading to
    pub fn marker_target_radius(&self, point: usize) -> f32 {
        if self.highlighted_point() == Some(point) {
            self.options.highlight_radius
        } else {
            self.options.point_radius
        }
    }

    /// Radius a marker is displayed with at `now`
    pub fn marker_radius(&self, point: usize, now: f64) -> f32 {
        match self.radii.get(&point) {
            Some(tween) => tween.value_at(now) as f32,
            None => self.options.point_radius,
        }
    }

    /// Markers at `now`, the highlighted one last so it draws on top
    pub fn markers(&self, now: f64) -> Vec<Marker> {
        let highlighted = self.highlighted_point();
        let mut markers: Vec<Marker> = self
            .points
            .iter()
            .zip(&self.pixels)
            .enumerate()
            .filter(|(i, _)| Some(*i) != highlighted)
            .map(|(i, (point, position))| Marker {
                index: i,
                position: *position,
                color: self.palette.color(point.group),
                radius: self.marker_radius(i, now),
            })
            .collect();
        if let Some(i) = highlighted {
            markers.push(Marker {
                index: i,
                position: self.pixels[i],
                color: self.palette.color(self.points[i].group),
                radius: self.marker_radius(i, now),
            });
        }
        markers
    }

    /// Histogram bars as displayed at `now`
    pub fn bars_at(&self, now: f64) -> Vec<BarGeometry> {
        self.bars.sample(now)
    }

    /// Histogram bars once the running transition has finished
    pub fn target_bars(&self) -> &[BarGeometry] {
        self.bars.target()
    }

    /// Whether any transition is still running at `now`
    pub fn is_animating(&self, now: f64) -> bool {
        !self.bars.is_finished(now) || self.radii.values().any(|t| !t.is_finished(now))
    }

    /// Pixel position of a point in scatter-local coordinates
    pub fn point_position(&self, point: usize) -> Option<Site> {
        self.pixels.get(point).copied()
    }
}

impl LinkedViewHandler for LinkedViewController {
    fn on_point_hover(&mut self, point: usize, now: f64) -> HoverOutcome {
        let Some(hovered) = self.points.get(point) else {
            tracing::warn!("Hover on unknown point {}", point);
            return HoverOutcome::Ignored;
        };
        let Some(state) = &self.state else {
            return HoverOutcome::Ignored;
        };
        if hovered.key == state.key {
            return HoverOutcome::Unchanged;
        }
        if !self.index.contains(&hovered.key) {
            tracing::debug!("Point {} ({}) has no histogram, ignoring hover", point, hovered.key);
            return HoverOutcome::Ignored;
        }

        let key = hovered.key.clone();
        let color = self.palette.color(hovered.group);
        let previous = state.point;

        if let Some(previous) = previous {
            self.animate_radius(previous, self.options.point_radius, now, self.options.highlight_off_ms);
        }
        self.state = Some(ViewState {
            key: key.clone(),
            point: Some(point),
        });
        self.animate_radius(point, self.options.highlight_radius, now, self.options.highlight_on_ms);

        let point_radius = self.options.point_radius as f64;
        self.radii
            .retain(|_, tween| !(tween.is_finished(now) && tween.to == point_radius));

        self.label = self.label_for(&key);

        let shown = self.bars.sample(now);
        let target = self.bars_for(&key, color);
        let bar_count = target.len();
        let duration = self.options.histogram_transition_ms as f64 / 1000.0;
        self.bars = BarTransition::new(&shown, target, now, duration);

        tracing::debug!("Highlight moved from {:?} to point {} ({})", previous, point, key);

        self.events.publish(LabelChanged {
            text: self.label.clone(),
        });
        self.events.publish(HistogramChanged {
            key: key.clone(),
            bar_count,
        });
        self.events.publish(HighlightChanged {
            previous,
            point,
            key,
        });

        HoverOutcome::Changed {
            previous,
            current: point,
        }
    }

    fn on_pointer_move(&mut self, position: Site, now: f64) -> HoverOutcome {
        match self.voronoi.find(position) {
            Some(point) => self.on_point_hover(point, now),
            None => HoverOutcome::Ignored,
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.surface = [width, height];
        let relaid_out = self.options.fit_to_surface;

        if relaid_out {
            self.layout = Layout::fitted(&self.options, self.surface);
            self.rebuild_geometry();
            self.bars = BarTransition::settled(self.current_bars());
            tracing::info!(
                "Re-laid out linked view for {}x{}: scatter {:.0}px",
                width,
                height,
                self.layout.scatter_size
            );
        } else {
            tracing::debug!("Surface resized to {}x{}, keeping fixed layout", width, height);
        }

        self.events.publish(ViewResized {
            width,
            height,
            relaid_out,
        });
    }
}

fn validate(data: &LinkedData) -> Result<()> {
    if let Some((i, _)) = data
        .points
        .iter()
        .enumerate()
        .find(|(_, p)| !(p.x.is_finite() && p.y.is_finite() && p.group.is_finite()))
    {
        return Err(LinkError::malformed(format!("point {i} has a non-finite coordinate or group")));
    }
    if let Some((i, _)) = data
        .histogram
        .iter()
        .enumerate()
        .find(|(_, e)| !e.coord_value.is_finite())
    {
        return Err(LinkError::malformed(format!("histogram row {i} has a non-finite value")));
    }
    Ok(())
}
