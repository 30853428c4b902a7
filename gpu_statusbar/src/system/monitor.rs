//! The poll-and-snapshot step

use super::sensors::{CpuSensor, GpuSensor, NetworkSensor};
use super::snapshot::{DisplaySnapshot, GpuReading, SystemSample};
use crate::utils::SensorError;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::time::Instant;

/// Reads every sensor once per tick and builds a [`DisplaySnapshot`].
pub struct MetricsPoller {
    gpu: Box<dyn GpuSensor>,
    cpu: Box<dyn CpuSensor>,
    network: Box<dyn NetworkSensor>,
    /// Cached once at least one GPU was found.
    gpu_count: Option<u32>,
    tick: u64,
    health: SegmentHealth,
}

impl MetricsPoller {
    pub fn new(
        gpu: Box<dyn GpuSensor>,
        cpu: Box<dyn CpuSensor>,
        network: Box<dyn NetworkSensor>,
    ) -> Self {
        Self {
            gpu,
            cpu,
            network,
            gpu_count: None,
            tick: 0,
            health: SegmentHealth::default(),
        }
    }

    /// Run one tick. Sensor failures end up in the snapshot, never as an
    /// error of this call.
    pub fn poll_tick(&mut self) -> DisplaySnapshot {
        let started = Instant::now();
        self.tick += 1;

        let gpus = self.poll_gpus();
        let cpu_pct = self.cpu.read_usage();
        self.health.observe("cpu", &cpu_pct);
        let net_download_mbps = self.network.read_download_mbps();
        self.health.observe("net", &net_download_mbps);

        let snapshot = DisplaySnapshot {
            tick: self.tick,
            gpus,
            system: SystemSample {
                cpu_pct,
                net_download_mbps,
            },
            poll_duration: started.elapsed(),
        };
        debug!(
            "Tick {} polled in {:?} ({} live GPUs)",
            snapshot.tick,
            snapshot.poll_duration,
            snapshot.live_gpu_count()
        );
        snapshot
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// GPU count known from an earlier tick.
    pub fn gpu_count(&self) -> Option<u32> {
        self.gpu_count
    }

    fn poll_gpus(&mut self) -> Result<Vec<GpuReading>, SensorError> {
        let count = match self.gpu_count {
            Some(count) => count,
            None => {
                let detected = self.gpu.device_count();
                self.health.observe("gpus", &detected);
                let count = detected?;
                if count > 0 {
                    info!("Detected {} GPU(s)", count);
                    self.gpu_count = Some(count);
                }
                count
            }
        };

        Ok((0..count)
            .map(|index| {
                let sample = self.gpu.read_sample(index);
                self.health.observe(&format!("gpu{}", index), &sample);
                GpuReading { index, sample }
            })
            .collect())
    }
}

/// Change in a segment's health seen by [`SegmentHealth::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Failed,
    Recovered,
}

/// Logs a segment's failure once, and its recovery once.
#[derive(Debug, Default)]
struct SegmentHealth {
    failing: HashSet<String>,
}

impl SegmentHealth {
    fn observe<T>(&mut self, segment: &str, result: &Result<T, SensorError>) -> Option<Transition> {
        match result {
            Ok(_) if self.failing.remove(segment) => {
                info!("Sensor segment {} recovered", segment);
                Some(Transition::Recovered)
            }
            Err(e) if self.failing.insert(segment.to_string()) => {
                warn!("Sensor segment {} failed: {}", segment, e);
                Some(Transition::Failed)
            }
            _ => None,
        }
    }
}
