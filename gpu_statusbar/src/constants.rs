//! Application constants and configuration values

pub use egui::Color32;

/// UI constants
pub mod ui {
    pub const DEFAULT_FONT_SIZE: f32 = 11.0;
    pub const DEFAULT_SCALE_FACTOR: f32 = 1.0;
    pub const MAX_SCALE_FACTOR: f32 = 4.0;
    pub const MIN_SCALE_FACTOR: f32 = 0.5;
    pub const MIN_WINDOW_WIDTH: f32 = 800.0;
    pub const DEFAULT_WINDOW_HEIGHT: f32 = 22.0;
    pub const DEFAULT_X_MARGIN: f32 = 8.0;
    /// Extra shift to the left of the top-right corner on first placement.
    pub const DEFAULT_RIGHT_OFFSET: f32 = 200.0;
    pub const PADDING_X: f32 = 6.0;
    pub const PADDING_Y: f32 = 1.0;
}

/// Update intervals in milliseconds
pub mod intervals {
    pub const POLL_DEFAULT: u64 = 1000;
    pub const POLL_MIN: u64 = 250;
    /// Floor for the `nvidia-smi` deadline, which otherwise follows the interval.
    pub const QUERY_TIMEOUT_MIN: u64 = 500;
}

/// Color scheme
pub mod colors {
    use super::Color32;

    pub const GREEN: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e);
    pub const AMBER: Color32 = Color32::from_rgb(0xf5, 0x9e, 0x0b);
    pub const RED: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);

    pub const BACKGROUND: Color32 = Color32::from_rgb(0x11, 0x18, 0x27);
    pub const TEXT: Color32 = Color32::from_rgb(0xe5, 0xe7, 0xeb);
    pub const MUTED: Color32 = Color32::from_rgb(0x9c, 0xa3, 0xaf);
    pub const SEPARATOR: Color32 = Color32::from_rgb(0x6b, 0x72, 0x80);

    // Band colors
    pub const BAND_LOW: Color32 = GREEN;
    pub const BAND_MEDIUM: Color32 = AMBER;
    pub const BAND_HIGH: Color32 = RED;
}

/// Segment labels and placeholders
pub mod labels {
    pub const GPU_PREFIX: &str = "GPU";
    pub const CPU_TAG: &str = "CPU ";
    pub const NET_TAG: &str = "NET↓ ";
    pub const SEPARATOR: &str = " | ";
    /// Shown when a sensor failed this tick.
    pub const UNAVAILABLE: &str = "N/A";
    /// Shown before the first tick completes.
    pub const PENDING: &str = "--";
}

/// Monospace font families to try loading
pub const FONT_FAMILIES: &[&str] = &["Noto Sans Mono", "DejaVu Sans Mono"];

/// Application metadata
pub mod app {
    pub const NAME: &str = "gpu_statusbar";
    pub const WINDOW_TITLE: &str = "GPU/CPU/NET";
    pub const DEFAULT_LOG_LEVEL: &str = "info";
    pub const DEFAULT_LOG_DIR: &str = "/tmp";
    pub const LOG_FILE_MAX_SIZE: u64 = 10_000_000; // 10MB
    pub const LOG_FILE_MAX_COUNT: usize = 5;
    pub const TICK_HISTORY_LENGTH: usize = 60;
}
