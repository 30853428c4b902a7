//! Configuration management

use crate::constants::{app, intervals, ui};
use crate::ui::theme::BandPolicy;
use crate::utils::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ui: UiConfig,
    pub polling: PollingConfig,
    pub thresholds: BandPolicy,
    pub logging: LoggingConfig,
}

/// Window and text configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub font_size: f32,
    pub scale_factor: f32,
    /// Gap to the right screen edge on first placement, in points.
    pub x_margin: f32,
    pub right_offset: f32,
    pub min_width: f32,
    pub height: f32,
    pub borderless: bool,
    pub always_on_top: bool,
}

/// Sensor polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    /// Network interface for the download rate; `None` or "auto" picks one.
    pub interface: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_to_file: bool,
    pub log_dir: Option<PathBuf>,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font_size: ui::DEFAULT_FONT_SIZE,
            scale_factor: ui::DEFAULT_SCALE_FACTOR,
            x_margin: ui::DEFAULT_X_MARGIN,
            right_offset: ui::DEFAULT_RIGHT_OFFSET,
            min_width: ui::MIN_WINDOW_WIDTH,
            height: ui::DEFAULT_WINDOW_HEIGHT,
            borderless: true,
            always_on_top: true,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: intervals::POLL_DEFAULT,
            interface: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: app::DEFAULT_LOG_LEVEL.to_string(),
            log_to_file: true,
            log_dir: None,
            max_file_size: app::LOG_FILE_MAX_SIZE,
            max_files: app::LOG_FILE_MAX_COUNT,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Deadline for one `nvidia-smi` invocation.
    pub fn query_timeout(&self) -> Duration {
        self.interval()
            .max(Duration::from_millis(intervals::QUERY_TIMEOUT_MIN))
    }
}

impl LoggingConfig {
    pub fn directory(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(app::DEFAULT_LOG_DIR))
    }
}

impl AppConfig {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from `path`, writing defaults there if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&content)?;

            log::info!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            log::info!("Created default configuration at {:?}", path);
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the config file path
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::config("Cannot determine config directory"))?;

        Ok(config_dir.join(app::NAME).join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&mut self) -> Result<()> {
        // Clamp UI values
        if self.ui.scale_factor.is_nan() || self.ui.scale_factor <= 0.0 {
            self.ui.scale_factor = ui::DEFAULT_SCALE_FACTOR;
        }
        self.ui.scale_factor = self
            .ui
            .scale_factor
            .clamp(ui::MIN_SCALE_FACTOR, ui::MAX_SCALE_FACTOR);
        self.ui.font_size = self.ui.font_size.clamp(6.0, 48.0);
        self.ui.min_width = self.ui.min_width.max(100.0);
        self.ui.height = self.ui.height.max(10.0);
        self.ui.x_margin = self.ui.x_margin.max(0.0);

        // Validate intervals
        self.polling.interval_ms = self.polling.interval_ms.max(intervals::POLL_MIN);
        if self
            .polling
            .interface
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            self.polling.interface = None;
        }

        // Keep band breakpoints ordered
        self.thresholds.normalize();

        // Validate logging settings
        if self.logging.level.trim().is_empty() {
            self.logging.level = app::DEFAULT_LOG_LEVEL.to_string();
        }
        self.logging.max_file_size = self.logging.max_file_size.max(1_000_000); // At least 1MB
        self.logging.max_files = self.logging.max_files.clamp(1, 20);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::BandThresholds;

    #[test]
    fn validate_clamps_interval_and_scale() {
        let mut config = AppConfig::default();
        config.polling.interval_ms = 10;
        config.ui.scale_factor = -2.0;
        config.validate().unwrap();

        assert_eq!(config.polling.interval_ms, intervals::POLL_MIN);
        assert_eq!(config.ui.scale_factor, ui::DEFAULT_SCALE_FACTOR);
    }

    #[test]
    fn validate_orders_thresholds() {
        let mut config = AppConfig::default();
        config.thresholds.cpu = BandThresholds::new(90.0, 10.0);
        config.thresholds.network = Some(BandThresholds::new(50.0, 5.0));
        config.validate().unwrap();

        assert_eq!(config.thresholds.cpu, BandThresholds::new(10.0, 90.0));
        assert_eq!(
            config.thresholds.network,
            Some(BandThresholds::new(5.0, 50.0))
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [polling]
            interval_ms = 500

            [thresholds.gpu_temperature]
            medium = 60.0
            high = 80.0
            "#,
        )
        .unwrap();

        assert_eq!(config.polling.interval_ms, 500);
        assert_eq!(config.polling.interface, None);
        assert_eq!(
            config.thresholds.gpu_temperature,
            BandThresholds::new(60.0, 80.0)
        );
        assert_eq!(config.thresholds.cpu, BandThresholds::new(40.0, 75.0));
        assert!(config.ui.borderless);
    }

    #[test]
    fn query_timeout_follows_interval_with_a_floor() {
        let mut polling = PollingConfig::default();
        assert_eq!(polling.query_timeout(), Duration::from_millis(1000));
        polling.interval_ms = 250;
        assert_eq!(polling.query_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn blank_interface_means_auto() {
        let mut config = AppConfig::default();
        config.polling.interface = Some("  ".to_string());
        config.validate().unwrap();
        assert_eq!(config.polling.interface, None);
    }
}
