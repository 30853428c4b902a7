//! Application core module

pub mod events;
pub mod state;

use crate::config::AppConfig;
use crate::constants::ui;
use crate::system::{MetricsPoller, NvidiaSmi, PollWorker, SysinfoCpu, SysinfoNetwork};
use crate::ui::components::draw_segments;
use crate::utils::{AppError, Result};
use eframe::egui;
use egui::{FontFamily, FontId, PointerButton, Sense, TextStyle, ViewportCommand};
use events::{AppEvent, EventBus};
use log::{debug, info, warn};
use state::AppState;
use std::collections::BTreeMap;

pub use state::UiState;

/// Main egui application
pub struct GpuStatusBarApp {
    /// Application state
    state: AppState,

    /// Event bus
    event_bus: EventBus,

    /// Background poll timer
    worker: PollWorker,
}

impl GpuStatusBarApp {
    /// Create the application with the `nvidia-smi` and `sysinfo` sensors
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Result<Self> {
        let smi = NvidiaSmi::new().with_timeout(config.polling.query_timeout());
        if !smi.is_installed() {
            warn!("nvidia-smi not found in PATH; GPU segments will show N/A");
        }
        let poller = MetricsPoller::new(
            Box::new(smi),
            Box::new(SysinfoCpu::new()),
            Box::new(SysinfoNetwork::new(config.polling.interface.clone())),
        );
        Self::with_poller(cc, config, poller)
    }

    /// Create the application around an existing poller
    fn with_poller(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        poller: MetricsPoller,
    ) -> Result<Self> {
        let state = AppState::new(config);

        // Setup fonts
        Self::setup_custom_fonts(&cc.egui_ctx);

        // Apply colors
        state.color_scheme.apply_to_context(&cc.egui_ctx);

        // Configure text styles
        Self::configure_text_styles(&cc.egui_ctx, Self::font_size(&state.config));

        // 后台线程每次采样后请求重绘
        let repaint_ctx = cc.egui_ctx.clone();
        let worker = PollWorker::spawn(
            poller,
            state.config.polling.interval(),
            Box::new(move || repaint_ctx.request_repaint()),
        )?;

        info!(
            "Polling every {} ms",
            state.config.polling.interval_ms
        );

        Ok(Self {
            state,
            event_bus: EventBus::new(),
            worker,
        })
    }

    fn font_size(config: &AppConfig) -> f32 {
        config.ui.font_size * config.ui.scale_factor
    }

    fn setup_custom_fonts(ctx: &egui::Context) {
        info!("Loading system fonts...");
        let mut fonts = egui::FontDefinitions::default();
        let system_source = font_kit::source::SystemSource::new();

        let original_monospace = fonts
            .families
            .get(&FontFamily::Monospace)
            .cloned()
            .unwrap_or_default();
        let mut loaded_fonts = Vec::new();
        for &font_name in crate::constants::FONT_FAMILIES {
            match Self::load_system_font(&system_source, font_name) {
                Ok(font_data) => {
                    let font_key = font_name.to_string();
                    fonts.font_data.insert(
                        font_key.clone(),
                        egui::FontData::from_owned(font_data).into(),
                    );
                    loaded_fonts.push(font_key);
                    info!("Successfully loaded font: {}", font_name);
                    // 只需要一个等宽字体
                    break;
                }
                Err(e) => {
                    info!("Failed to load font {}: {}", font_name, e);
                }
            }
        }

        if loaded_fonts.is_empty() {
            info!("No custom fonts loaded, using default configuration");
        } else {
            let monospace = [loaded_fonts, original_monospace].concat();
            fonts.families.insert(FontFamily::Monospace, monospace);
        }

        ctx.set_fonts(fonts);
    }

    /// Raw font bytes of the best match for `family`.
    fn load_system_font(
        source: &font_kit::source::SystemSource,
        family: &str,
    ) -> Result<Vec<u8>> {
        use font_kit::family_name::FamilyName;
        use font_kit::properties::Properties;

        let handle =
            source.select_best_match(&[FamilyName::Title(family.to_string())], &Properties::new())?;
        let font = handle.load()?;
        let data = font
            .copy_font_data()
            .ok_or_else(|| AppError::font(format!("{} has no font data", family)))?;
        Ok(data.to_vec())
    }

    /// Configure text styles
    pub fn configure_text_styles(ctx: &egui::Context, font_size: f32) {
        ctx.all_styles_mut(|style| {
            let text_styles: BTreeMap<TextStyle, FontId> = [
                (
                    TextStyle::Body,
                    FontId::new(font_size, FontFamily::Monospace),
                ),
                (
                    TextStyle::Monospace,
                    FontId::new(font_size, FontFamily::Monospace),
                ),
                (
                    TextStyle::Button,
                    FontId::new(font_size, FontFamily::Monospace),
                ),
                (
                    TextStyle::Small,
                    FontId::new(font_size * 0.8, FontFamily::Monospace),
                ),
                (
                    TextStyle::Heading,
                    FontId::new(font_size * 1.2, FontFamily::Monospace),
                ),
            ]
            .into();

            style.text_styles = text_styles;
        });
    }

    /// Handle application events
    fn handle_events(&mut self, ctx: &egui::Context) {
        let mut shutdown = false;
        self.event_bus.process_events(|event| match event {
            AppEvent::ToggleBorder => {
                let borderless = self.state.ui_state.toggle_border();
                debug!("Window decorations {}", if borderless { "off" } else { "on" });
                ctx.send_viewport_cmd(ViewportCommand::Decorations(!borderless));
            }

            AppEvent::StartDrag => {
                ctx.send_viewport_cmd(ViewportCommand::StartDrag);
            }

            AppEvent::Shutdown => {
                shutdown = true;
            }
        });

        if shutdown {
            info!("Quit requested");
            self.shutdown();
            ctx.send_viewport_cmd(ViewportCommand::Close);
        }
    }

    /// Running → Stopped: cancel the timer and freeze the display.
    fn shutdown(&mut self) {
        if self.state.ui_state.closing {
            return;
        }
        self.state.ui_state.closing = true;
        self.worker.stop();
    }

    /// Place the window at the top edge, right aligned. Runs once.
    fn place_top_right(&mut self, ctx: &egui::Context) {
        if self.state.ui_state.placed {
            return;
        }
        let (monitor_size, outer_rect) =
            ctx.input(|i| (i.viewport().monitor_size, i.viewport().outer_rect));
        let (Some(monitor_size), Some(outer_rect)) = (monitor_size, outer_rect) else {
            return;
        };

        // 尺寸调整可能还未生效，取较大的宽度
        let window_width = outer_rect.width().max(self.state.ui_state.width);
        let ui_config = &self.state.config.ui;
        let x = (monitor_size.x - window_width - ui_config.x_margin - ui_config.right_offset)
            .max(0.0);
        let pos = egui::pos2(x, 0.0);
        ctx.send_viewport_cmd(ViewportCommand::OuterPosition(pos));
        self.state.ui_state.placed = true;
        info!("Window placed at {:?} on a {:?} monitor", pos, monitor_size);
    }

    /// Grow the window so the line never wraps, but not below `min_width`.
    fn fit_to_content(&mut self, ctx: &egui::Context, content_width: f32) {
        let ui_config = &self.state.config.ui;
        let padding = 2.0 * (ui::PADDING_X * ui_config.scale_factor).round();
        let desired = (content_width + padding).ceil().max(ui_config.min_width);
        if (desired - self.state.ui_state.width).abs() < 1.0 {
            return;
        }

        let height = ui_config.height * ui_config.scale_factor;
        debug!("Resizing window to {}x{}", desired, height);
        ctx.send_viewport_cmd(ViewportCommand::InnerSize(egui::vec2(desired, height)));
        self.state.ui_state.width = desired;
    }

    /// Draw the status line and attach drag, menu and tooltip handling
    fn draw_main_ui(&mut self, ui: &mut egui::Ui) {
        let segments = self.state.segments();
        let font = FontId::new(Self::font_size(&self.state.config), FontFamily::Monospace);

        let content_width = ui
            .horizontal_centered(|ui| {
                draw_segments(ui, &segments, &font);
            })
            .response
            .rect
            .width();
        self.fit_to_content(ui.ctx(), content_width);

        let response = ui.interact(
            ui.max_rect(),
            ui.id().with("status_bar_background"),
            Sense::click_and_drag(),
        );

        if response.drag_started_by(PointerButton::Primary) {
            self.event_bus.send(AppEvent::StartDrag).ok();
        }

        let sender = self.event_bus.sender();
        response.context_menu(|ui| {
            if ui.button("Toggle border").clicked() {
                sender.send(AppEvent::ToggleBorder).ok();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                sender.send(AppEvent::Shutdown).ok();
                ui.close_menu();
            }
        });

        response.on_hover_text(self.state.tooltip_text());
    }
}

impl eframe::App for GpuStatusBarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            info!("Window close requested");
            self.shutdown();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Q)) {
            self.event_bus.send(AppEvent::Shutdown).ok();
        }

        // Handle events
        self.handle_events(ctx);

        // Take the newest snapshot from the poll worker
        if let Some(snapshot) = self.worker.latest() {
            self.state.apply_snapshot(snapshot);
        }

        let scale = self.state.config.ui.scale_factor;
        let frame = egui::Frame::new()
            .fill(self.state.color_scheme.background)
            .inner_margin(egui::Margin::symmetric(
                (ui::PADDING_X * scale).round() as i8,
                (ui::PADDING_Y * scale).round() as i8,
            ));

        egui::CentralPanel::default()
            .frame(frame)
            .show(ctx, |ui| self.draw_main_ui(ui));

        self.place_top_right(ctx);
    }
}
