//! gpu_statusbar - An always-on-top GPU/CPU/NET mini bar

use chrono::Local;
use clap::Parser;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};
use gpu_statusbar::cli::Args;
use gpu_statusbar::config::LoggingConfig;
use gpu_statusbar::constants::app;
use gpu_statusbar::{AppConfig, AppError, GpuStatusBarApp};
use log::{error, info, warn};

/// Application entry point
fn main() -> eframe::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let (mut config, load_error) = match load_config(&args) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    args.apply_to(&mut config);
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // Initialize logging
    // 句柄需要存活到退出，否则文件日志会停止
    let _logger = match initialize_logging(&config.logging) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting {} v{}", app::NAME, env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        warn!("Using default configuration: {}", e);
    }

    let ui_config = &config.ui;
    let size = [ui_config.min_width, ui_config.height * ui_config.scale_factor];
    let mut viewport = egui::ViewportBuilder::default()
        .with_title(app::WINDOW_TITLE)
        .with_inner_size(size)
        .with_min_inner_size(size)
        .with_decorations(!ui_config.borderless)
        .with_resizable(false)
        .with_transparent(false);
    if ui_config.always_on_top {
        viewport = viewport.with_window_level(egui::WindowLevel::AlwaysOnTop);
    }

    // Configure eframe options
    let native_options = eframe::NativeOptions {
        viewport,
        vsync: true,
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        app::NAME,
        native_options,
        Box::new(move |cc| match GpuStatusBarApp::new(cc, config) {
            Ok(app) => {
                info!("Application created successfully");
                Ok(Box::new(app))
            }
            Err(e) => {
                error!("Failed to create application: {}", e);
                Err(Box::new(e))
            }
        }),
    )
}

fn load_config(args: &Args) -> Result<AppConfig, AppError> {
    match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
}

/// Initialize logging system
fn initialize_logging(config: &LoggingConfig) -> Result<LoggerHandle, AppError> {
    let logger = Logger::try_with_str(&config.level)
        .map_err(|e| AppError::config(format!("Failed to create logger: {}", e)))?
        .format(flexi_logger::colored_opt_format);

    if !config.log_to_file {
        return logger
            .start()
            .map_err(|e| AppError::config(format!("Failed to start logger: {}", e)));
    }

    let timestamp = Local::now().format("%Y-%m-%d_%H_%M_%S").to_string();
    let log_filename = format!("{}_{}", app::NAME, timestamp);

    logger
        .log_to_file(
            FileSpec::default()
                .directory(config.directory())
                .basename(log_filename)
                .suffix("log"),
        )
        .duplicate_to_stdout(Duplicate::Debug)
        .rotate(
            Criterion::Size(config.max_file_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.max_files),
        )
        .start()
        .map_err(|e| AppError::config(format!("Failed to start logger: {}", e)))
}
