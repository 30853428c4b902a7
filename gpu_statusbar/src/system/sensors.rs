//! Sensor capability traits
//!
//! The poller only talks to these traits, so other GPU vendors or test fakes
//! can stand in for `nvidia-smi` and `sysinfo`.

use super::snapshot::GpuSample;
use crate::utils::SensorError;

pub type SensorResult<T> = std::result::Result<T, SensorError>;

/// Per-GPU telemetry provider.
pub trait GpuSensor: Send {
    /// Number of installed GPUs.
    fn device_count(&mut self) -> SensorResult<u32>;

    fn read_utilization(&mut self, index: u32) -> SensorResult<f32>;

    fn read_power(&mut self, index: u32) -> SensorResult<f32>;

    fn read_temperature(&mut self, index: u32) -> SensorResult<f32>;

    /// Read all three values for one GPU. Providers that can fetch them in
    /// one query should override this.
    fn read_sample(&mut self, index: u32) -> SensorResult<GpuSample> {
        Ok(GpuSample {
            index,
            utilization_pct: self.read_utilization(index)?,
            power_watts: self.read_power(index)?,
            temperature_celsius: self.read_temperature(index)?,
        })
    }
}

/// Instantaneous CPU usage provider.
pub trait CpuSensor: Send {
    /// Overall CPU usage in percent, 0–100.
    fn read_usage(&mut self) -> SensorResult<f32>;
}

/// Recent download throughput provider.
pub trait NetworkSensor: Send {
    /// Download rate in MB/s since the previous call.
    fn read_download_mbps(&mut self) -> SensorResult<f64>;
}

/// Reject NaN and infinities coming out of a sensor.
pub(crate) fn finite(value: f32, what: &str) -> SensorResult<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SensorError::read_failure(format!(
            "{} is not a finite number: {}",
            what, value
        )))
    }
}
