//! System monitoring module

pub mod host;
pub mod monitor;
pub mod nvidia;
pub mod sensors;
pub mod snapshot;
pub mod worker;

pub use host::{SysinfoCpu, SysinfoNetwork};
pub use monitor::MetricsPoller;
pub use nvidia::NvidiaSmi;
pub use sensors::{CpuSensor, GpuSensor, NetworkSensor, SensorResult};
pub use snapshot::{DisplaySnapshot, GpuReading, GpuSample, SystemSample};
pub use worker::{Notifier, PollWorker, PollerState};
