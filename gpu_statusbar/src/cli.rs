//! Command line arguments

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// Always-on-top GPU/CPU/NET mini bar for all NVIDIA GPUs
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "gpu_statusbar", version, about)]
pub struct Args {
    /// Update interval in ms (minimum 250) [config default: 1000]
    #[arg(long)]
    pub interval: Option<u64>,

    /// UI scale factor [config default: 1.0]
    #[arg(long)]
    pub scale: Option<f32>,

    /// Network interface for download MB/s, or "auto"
    #[arg(long)]
    pub iface: Option<String>,

    /// Right margin from the screen edge in px [config default: 8]
    #[arg(long)]
    pub xmargin: Option<f32>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level, e.g. "debug" or "gpu_statusbar=trace"
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    /// Let command line flags override values from the config file.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(interval) = self.interval {
            config.polling.interval_ms = interval;
        }
        if let Some(scale) = self.scale {
            config.ui.scale_factor = scale;
        }
        if let Some(iface) = &self.iface {
            config.polling.interface = Some(iface.clone());
        }
        if let Some(xmargin) = self.xmargin {
            config.ui.x_margin = xmargin;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
