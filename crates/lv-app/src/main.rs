//! Main application entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use eframe::egui::{self, Context, Ui};
use parking_lot::RwLock;
use tracing::{error, info, warn};

use lv_core::events::events::HighlightChanged;
use lv_core::events::typed_handler;
use lv_core::LinkedViewController;
use lv_data::sources::{CsvPairSource, LinkedDataSource, WidgetPayloadSource};
use lv_data::{DataError, LoadedData};
use lv_views::{LinkedView, SpaceView, SpaceViewId, ViewerContext};

mod config;
mod demo;
mod theme;

use config::AppConfig;
use demo::DemoDataSource;

/// Linked t-SNE scatter and per-point histogram viewer
#[derive(Parser, Debug)]
#[command(name = "tsne-linked", version, about)]
struct Args {
    /// Point table (CSV with V1, V2, group_var, label_var)
    #[arg(long, requires = "histogram")]
    points: Option<PathBuf>,

    /// Histogram table (CSV with label_var, coord_name, coord_value)
    #[arg(long, requires = "points")]
    histogram: Option<PathBuf>,

    /// Widget payload (JSON with point_data, histogram_data, options)
    #[arg(long, conflicts_with_all = ["points", "histogram", "demo"])]
    payload: Option<PathBuf>,

    /// Start with generated demo data
    #[arg(long, conflicts_with_all = ["points", "histogram"])]
    demo: bool,

    /// JSON config file with view options and column names
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Source requested on the command line, if any
    fn source(&self, config: &AppConfig) -> Result<Option<Box<dyn LinkedDataSource>>> {
        if self.demo {
            return Ok(Some(Box::new(DemoDataSource::new())));
        }
        if let Some(path) = &self.payload {
            let source = WidgetPayloadSource::new(path).with_columns(config.columns.clone());
            return Ok(Some(Box::new(source)));
        }
        match (&self.points, &self.histogram) {
            (Some(points), Some(histogram)) => {
                let source = CsvPairSource::new(points, histogram).with_columns(config.columns.clone());
                Ok(Some(Box::new(source)))
            }
            (None, None) => Ok(None),
            _ => bail!("--points and --histogram must be given together"),
        }
    }
}

/// What the status bar shows about loading
#[derive(Debug, Clone)]
enum LoadStatus {
    Idle,
    Loading(String),
    Loaded {
        source: String,
        points: usize,
        buckets: usize,
    },
    Failed(String),
}

/// Result of a background load, waiting to be picked up by the UI thread
type PendingLoad = Arc<RwLock<Option<(String, Result<LoadedData, DataError>)>>>;

/// Main application state
struct LinkedViewsApp {
    /// Viewer context shared with the view
    viewer_context: ViewerContext,

    /// The linked view
    view: LinkedView,

    config: AppConfig,
    status: LoadStatus,
    pending: PendingLoad,

    /// Text of the most recent highlight change
    last_highlight: Arc<RwLock<Option<String>>>,

    /// Tokio runtime
    runtime: tokio::runtime::Runtime,

    /// Egui context
    egui_ctx: egui::Context,
}

impl LinkedViewsApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: tokio::runtime::Runtime,
        config: AppConfig,
        initial_source: Option<Box<dyn LinkedDataSource>>,
    ) -> Self {
        theme::apply_theme(&cc.egui_ctx, config.light_theme);

        let mut app = Self {
            viewer_context: ViewerContext::default(),
            view: LinkedView::new(SpaceViewId::new_v4(), "Linked views".to_string()),
            config,
            status: LoadStatus::Idle,
            pending: Arc::new(RwLock::new(None)),
            last_highlight: Arc::new(RwLock::new(None)),
            runtime,
            egui_ctx: cc.egui_ctx.clone(),
        };

        if let Some(source) = initial_source {
            app.start_load(source);
        }
        app
    }

    /// Load `source` in the background
    fn start_load(&mut self, source: Box<dyn LinkedDataSource>) {
        let name = source.source_name().to_string();
        info!("Loading linked data from {}", name);
        self.status = LoadStatus::Loading(name.clone());

        let ctx = self.egui_ctx.clone();
        let pending = self.pending.clone();
        self.runtime.spawn(async move {
            let result = source.load().await;
            if let Err(e) = &result {
                error!("Failed to load {}: {}", name, e);
            }
            *pending.write() = Some((name, result));
            ctx.request_repaint();
        });
    }

    /// Pick up a finished load and build a controller from it
    fn poll_pending(&mut self) {
        let Some((name, result)) = self.pending.write().take() else {
            return;
        };

        let loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                self.status = LoadStatus::Failed(format!("{}: {}", name, e));
                return;
            }
        };

        // Options carried by a payload win over the config file
        let options = loaded.options.unwrap_or_else(|| self.config.view.clone());
        match LinkedViewController::new(loaded.data, options) {
            Ok(controller) => {
                let sink = self.last_highlight.clone();
                controller.events().subscribe::<HighlightChanged>(typed_handler::<HighlightChanged, _>(
                    move |e| {
                        *sink.write() = Some(format!("point {} ({})", e.point, e.key));
                    },
                ));

                self.status = LoadStatus::Loaded {
                    source: name,
                    points: controller.points().len(),
                    buckets: controller.index().len(),
                };
                *self.last_highlight.write() = None;
                self.viewer_context.set_controller(Some(controller));
                self.view.reset();
            }
            Err(e) => {
                warn!("Rejected data from {}: {}", name, e);
                self.status = LoadStatus::Failed(format!("{}: {}", name, e));
            }
        }
    }

    fn open_csv_pair(&mut self) {
        let Some(points) = rfd::FileDialog::new()
            .set_title("Point table")
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };
        let Some(histogram) = rfd::FileDialog::new()
            .set_title("Histogram table")
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };
        let source = CsvPairSource::new(points, histogram).with_columns(self.config.columns.clone());
        self.start_load(Box::new(source));
    }

    fn open_payload(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON Files", &["json"])
            .pick_file()
        {
            let source = WidgetPayloadSource::new(path).with_columns(self.config.columns.clone());
            self.start_load(Box::new(source));
        }
    }

    /// Handle menu actions
    fn handle_menu(&mut self) {
        let ctx = self.egui_ctx.clone();
        egui::TopBottomPanel::top("menu_bar").show(&ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open CSV pair...").clicked() {
                        ui.close_menu();
                        self.open_csv_pair();
                    }
                    if ui.button("Open widget payload...").clicked() {
                        ui.close_menu();
                        self.open_payload();
                    }
                    if ui.button("Demo data").clicked() {
                        ui.close_menu();
                        self.start_load(Box::new(DemoDataSource::new()));
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    let default_cells = self.config.view.show_cells;
                    let mut show_cells = self.view.config.show_cells.unwrap_or(default_cells);
                    if ui.checkbox(&mut show_cells, "Show hit regions").changed() {
                        self.view.config.show_cells = Some(show_cells);
                    }
                });
            });
        });
    }

    fn show_status_bar(&self, ctx: &Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.status {
                    LoadStatus::Idle => {
                        ui.label("No data");
                    }
                    LoadStatus::Loading(name) => {
                        ui.spinner();
                        ui.label(format!("Loading {}...", name));
                    }
                    LoadStatus::Loaded { source, points, buckets } => {
                        ui.label(format!("{}: {} points, {} histograms", source, points, buckets));
                    }
                    LoadStatus::Failed(message) => {
                        ui.colored_label(theme::error_color(), message);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let hovered = self.viewer_context.hovered_data.read();
                    if let Some(key) = &hovered.key {
                        ui.label(format!("x {:.2}, y {:.2} | {}", hovered.x, hovered.y, key));
                    }
                    if let Some(text) = self.last_highlight.read().as_ref() {
                        ui.colored_label(theme::accent_color(), text);
                    }
                });
            });
        });
    }

    fn show_welcome_screen(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.heading("Linked views");
            ui.label("Open a point table and a histogram table, or a widget payload.");
            ui.add_space(12.0);
            if ui.button("Open CSV pair...").clicked() {
                self.open_csv_pair();
            }
            if ui.button("Open widget payload...").clicked() {
                self.open_payload();
            }
            if ui.button("Demo data").clicked() {
                self.start_load(Box::new(DemoDataSource::new()));
            }
        });
    }
}

impl eframe::App for LinkedViewsApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_pending();

        // Menu bar
        self.handle_menu();
        self.show_status_bar(ctx);

        // Main content area
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.viewer_context.controller.read().is_none() {
                self.show_welcome_screen(ui);
            } else {
                egui::ScrollArea::both().show(ui, |ui| {
                    self.view.ui(&self.viewer_context, ui);
                });
            }
        });
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let source = args.source(&config)?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the tokio runtime")?;

    info!("Starting linked views viewer");

    let size = config.view.preferred_size();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([size[0] as f32 + 40.0, size[1] as f32 + 80.0])
            .with_min_inner_size([400.0, 300.0]),
        default_theme: if config.light_theme {
            eframe::Theme::Light
        } else {
            eframe::Theme::Dark
        },
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "Linked views",
        options,
        Box::new(move |cc| Box::new(LinkedViewsApp::new(cc, runtime, config, source))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_pick_csv_pair() {
        let args = Args::parse_from(["tsne-linked", "--points", "p.csv", "--histogram", "h.csv"]);
        let source = args.source(&AppConfig::default()).unwrap().unwrap();
        assert_eq!(source.source_name(), "p.csv");
    }

    #[test]
    fn test_points_require_histogram() {
        assert!(Args::try_parse_from(["tsne-linked", "--points", "p.csv"]).is_err());
    }

    #[test]
    fn test_payload_conflicts_with_demo() {
        assert!(Args::try_parse_from(["tsne-linked", "--payload", "w.json", "--demo"]).is_err());
    }

    #[test]
    fn test_no_source_without_flags() {
        let args = Args::parse_from(["tsne-linked", "--verbose"]);
        assert!(args.verbose);
        assert!(args.source(&AppConfig::default()).unwrap().is_none());
    }
}
