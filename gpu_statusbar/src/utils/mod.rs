//! Utility modules

pub mod error;
pub mod metrics;

pub use error::{AppError, Result, SensorError};
pub use metrics::{RollingAverage, TickMetrics};
