//! gpu_statusbar - A single-line GPU/CPU/NET status bar
//!
//! This crate provides an always-on-top egui window that shows per-GPU
//! utilization, power and temperature from `nvidia-smi`, together with
//! host CPU usage and network download rate.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod system;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use app::GpuStatusBarApp;
pub use config::AppConfig;
pub use utils::{AppError, Result};
