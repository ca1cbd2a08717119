//! The linked view: scatter, label and histogram drawn from one controller

use egui::{vec2, Align2, FontId, Sense, Ui};
use lv_core::{HoveredData, LinkedViewHandler};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::plots::{paint_histogram, paint_scatter, to_local};
use crate::{SpaceView, SpaceViewId, ViewerContext};

/// Font size of the hover label
const LABEL_FONT_SIZE: f32 = 16.0;

/// Per-view display settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedViewConfig {
    /// Overrides the controller's `show_cells` option when set
    pub show_cells: Option<bool>,
}

/// Linked scatter + histogram view
pub struct LinkedView {
    id: SpaceViewId,
    title: String,
    pub config: LinkedViewConfig,

    /// Last surface size handed to the controller
    last_surface: Option<[f64; 2]>,
}

impl LinkedView {
    pub fn new(id: SpaceViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: LinkedViewConfig::default(),
            last_surface: None,
        }
    }

    pub fn last_surface(&self) -> Option<[f64; 2]> {
        self.last_surface
    }

    /// Forget the last surface so the next frame resizes the controller again
    pub fn reset(&mut self) {
        self.last_surface = None;
    }
}

impl SpaceView for LinkedView {
    fn id(&self) -> SpaceViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "LinkedView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        let mut guard = ctx.controller.write();
        let Some(controller) = guard.as_mut() else {
            ui.centered_and_justified(|ui| {
                ui.label("No data loaded");
            });
            return;
        };

        if controller.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("The loaded tables are empty");
            });
            return;
        }

        let available = ui.available_size();
        let surface = [available.x as f64, available.y as f64];
        if self.last_surface != Some(surface) {
            controller.resize(surface[0], surface[1]);
            self.last_surface = Some(surface);
        }

        let desired = if controller.options().fit_to_surface {
            available
        } else {
            let preferred = controller.options().preferred_size();
            vec2(preferred[0] as f32, preferred[1] as f32)
        };
        let (response, painter) = ui.allocate_painter(desired, Sense::hover());

        let margin = controller.layout().margin;
        let origin = response.rect.min + vec2(margin.left as f32, margin.top as f32);
        let now = ui.input(|i| i.time);

        if let Some(pointer) = response.hover_pos() {
            let local = to_local(origin, pointer);
            let outcome = controller.on_pointer_move(local, now);
            if outcome.is_changed() {
                tracing::debug!("Hover outcome: {:?}", outcome);
            }

            let scales = controller.scales();
            *ctx.hovered_data.write() = HoveredData {
                x: scales.x.invert(local[0]),
                y: scales.y.invert(local[1]),
                point_index: controller.highlighted_point(),
                key: controller.current_key().cloned(),
            };
        } else {
            *ctx.hovered_data.write() = HoveredData::default();
        }

        let axis_color = ui.visuals().text_color();
        let show_cells = self.config.show_cells.unwrap_or(controller.options().show_cells);

        paint_scatter(&painter, controller, origin, now, show_cells, axis_color);
        paint_histogram(&painter, controller, origin, now, axis_color);

        let label_origin = controller.layout().label_origin;
        painter.text(
            origin + vec2(label_origin[0] as f32, label_origin[1] as f32),
            Align2::LEFT_BOTTOM,
            controller.label(),
            FontId::proportional(LABEL_FONT_SIZE),
            ui.visuals().strong_text_color(),
        );

        if controller.is_animating(now) {
            ui.ctx().request_repaint();
        }
    }

    fn save_config(&self) -> Value {
        serde_json::to_value(&self.config).unwrap_or(Value::Null)
    }

    fn load_config(&mut self, config: Value) {
        match serde_json::from_value(config) {
            Ok(config) => self.config = config,
            Err(e) => tracing::warn!("Ignoring invalid linked view config: {}", e),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
