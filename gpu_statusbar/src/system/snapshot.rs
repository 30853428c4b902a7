//! Per-tick metric values

use crate::utils::SensorError;
use std::time::Duration;

/// One GPU's telemetry at one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuSample {
    pub index: u32,
    pub utilization_pct: f32,
    pub power_watts: f32,
    pub temperature_celsius: f32,
}

/// A GPU slot in the snapshot. A failed read keeps its index.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuReading {
    pub index: u32,
    pub sample: Result<GpuSample, SensorError>,
}

/// CPU and network values. Each field fails on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSample {
    pub cpu_pct: Result<f32, SensorError>,
    pub net_download_mbps: Result<f64, SensorError>,
}

/// Everything rendered at one tick. Replaces the previous snapshot whole.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
    /// 1-based tick counter
    pub tick: u64,
    /// `Ok(vec![])` when no GPU was detected, `Err` when enumeration failed.
    pub gpus: Result<Vec<GpuReading>, SensorError>,
    pub system: SystemSample,
    pub poll_duration: Duration,
}

impl DisplaySnapshot {
    /// Number of GPU readings that produced live values.
    pub fn live_gpu_count(&self) -> usize {
        match &self.gpus {
            Ok(readings) => readings.iter().filter(|r| r.sample.is_ok()).count(),
            Err(_) => 0,
        }
    }

    /// True when every segment holds a live value.
    pub fn is_fully_live(&self) -> bool {
        let gpus_live = match &self.gpus {
            Ok(readings) => !readings.is_empty() && readings.iter().all(|r| r.sample.is_ok()),
            Err(_) => false,
        };
        gpus_live && self.system.cpu_pct.is_ok() && self.system.net_download_mbps.is_ok()
    }
}
