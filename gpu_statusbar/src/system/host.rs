//! CPU and network sensors backed by `sysinfo`

use super::sensors::{finite, CpuSensor, NetworkSensor, SensorResult};
use crate::utils::SensorError;
use log::{debug, info};
use std::thread;
use std::time::{Duration, Instant};
use sysinfo::{Networks, System, MINIMUM_CPU_UPDATE_INTERVAL};

/// Global CPU usage through `sysinfo`
pub struct SysinfoCpu {
    system: System,
    refreshed_at: Instant,
}

impl SysinfoCpu {
    pub fn new() -> Self {
        let mut system = System::new();
        // 首次刷新只建立基线，第二次才有有效的使用率
        system.refresh_cpu();
        Self {
            system,
            refreshed_at: Instant::now(),
        }
    }
}

impl Default for SysinfoCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSensor for SysinfoCpu {
    fn read_usage(&mut self) -> SensorResult<f32> {
        let wait = settle_time(self.refreshed_at.elapsed(), MINIMUM_CPU_UPDATE_INTERVAL);
        if !wait.is_zero() {
            debug!("Waiting {:?} for CPU counters to settle", wait);
            thread::sleep(wait);
        }
        self.system.refresh_cpu();
        self.refreshed_at = Instant::now();
        if self.system.cpus().is_empty() {
            return Err(SensorError::unavailable("no CPU information available"));
        }
        let usage = finite(self.system.global_cpu_info().cpu_usage(), "cpu usage")?;
        Ok(usage.clamp(0.0, 100.0))
    }
}

/// Download rate from cumulative received bytes.
pub struct SysinfoNetwork {
    networks: Networks,
    /// `None` selects automatically.
    interface: Option<String>,
    baseline: Option<Baseline>,
}

#[derive(Debug, Clone)]
struct Baseline {
    interface: String,
    received: u64,
    at: Instant,
}

impl SysinfoNetwork {
    /// `interface` of `None`, `""` or `"auto"` picks the busiest
    /// non-loopback interface.
    pub fn new(interface: Option<String>) -> Self {
        let interface = interface.filter(|name| !is_auto(name));
        let mut sensor = Self {
            networks: Networks::new_with_refreshed_list(),
            interface,
            baseline: None,
        };
        sensor.baseline = sensor.sample();
        if let Some(baseline) = &sensor.baseline {
            info!("Measuring download rate on interface {}", baseline.interface);
        }
        sensor
    }

    fn sample(&self) -> Option<Baseline> {
        let counters = self
            .networks
            .iter()
            .map(|(name, data)| InterfaceCounters {
                name: name.as_str(),
                received: data.total_received(),
                transmitted: data.total_transmitted(),
            })
            .collect::<Vec<_>>();
        let chosen = select_interface(&counters, self.interface.as_deref())?;
        Some(Baseline {
            interface: chosen.name.to_string(),
            received: chosen.received,
            at: Instant::now(),
        })
    }
}

impl NetworkSensor for SysinfoNetwork {
    fn read_download_mbps(&mut self) -> SensorResult<f64> {
        self.networks.refresh_list();
        self.networks.refresh();
        let current = self
            .sample()
            .ok_or_else(|| SensorError::unavailable("no non-loopback network interface"))?;

        let rate = match self.baseline.as_ref() {
            Some(prev) if prev.interface == current.interface => download_rate_mbps(
                prev.received,
                current.received,
                current.at.duration_since(prev.at),
            ),
            Some(prev) => {
                info!(
                    "Network interface changed from {} to {}",
                    prev.interface, current.interface
                );
                0.0
            }
            None => 0.0,
        };
        debug!(
            "{}: {} bytes received, {:.2} MB/s",
            current.interface, current.received, rate
        );
        self.baseline = Some(current);
        Ok(rate)
    }
}

/// Time still needed before two CPU refreshes are far enough apart to give
/// a meaningful usage figure.
fn settle_time(since_refresh: Duration, minimum: Duration) -> Duration {
    minimum.saturating_sub(since_refresh)
}

/// Received/transmitted totals of one interface.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceCounters<'a> {
    pub name: &'a str,
    pub received: u64,
    pub transmitted: u64,
}

fn is_auto(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.eq_ignore_ascii_case("auto")
}

/// Pick the requested interface when present, otherwise the non-loopback
/// interface with the most traffic.
pub fn select_interface<'a>(
    counters: &[InterfaceCounters<'a>],
    requested: Option<&str>,
) -> Option<InterfaceCounters<'a>> {
    if let Some(wanted) = requested {
        if let Some(found) = counters.iter().find(|c| c.name == wanted) {
            return Some(*found);
        }
    }
    counters
        .iter()
        .filter(|c| !c.name.starts_with("lo"))
        .max_by(|a, b| {
            a.received
                .saturating_add(a.transmitted)
                .cmp(&b.received.saturating_add(b.transmitted))
                .then_with(|| b.name.cmp(a.name))
        })
        .copied()
}

/// MB/s (MiB based) between two cumulative byte counters.
pub fn download_rate_mbps(prev_bytes: u64, curr_bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    // 计数器回绕或网卡重置时按 0 处理
    let delta = curr_bytes.saturating_sub(prev_bytes) as f64;
    delta / (1024.0 * 1024.0) / secs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters() -> Vec<InterfaceCounters<'static>> {
        vec![
            InterfaceCounters {
                name: "lo",
                received: 9_000_000,
                transmitted: 9_000_000,
            },
            InterfaceCounters {
                name: "eth0",
                received: 1_000,
                transmitted: 500,
            },
            InterfaceCounters {
                name: "wlan0",
                received: 50_000,
                transmitted: 20_000,
            },
        ]
    }

    #[test]
    fn auto_selection_skips_loopback() {
        let list = counters();
        assert_eq!(select_interface(&list, None).unwrap().name, "wlan0");
    }

    #[test]
    fn requested_interface_wins_and_falls_back() {
        let list = counters();
        assert_eq!(select_interface(&list, Some("eth0")).unwrap().name, "eth0");
        assert_eq!(select_interface(&list, Some("tun9")).unwrap().name, "wlan0");
    }

    #[test]
    fn only_loopback_means_nothing_to_measure() {
        let list = vec![InterfaceCounters {
            name: "lo",
            received: 10,
            transmitted: 10,
        }];
        assert!(select_interface(&list, None).is_none());
    }

    #[test]
    fn download_rate_in_mebibytes_per_second() {
        let rate = download_rate_mbps(0, 25 * 1024 * 1024, Duration::from_secs(2));
        assert!((rate - 12.5).abs() < 1e-9);
    }

    #[test]
    fn download_rate_edge_cases() {
        assert_eq!(download_rate_mbps(0, 1024, Duration::ZERO), 0.0);
        assert_eq!(download_rate_mbps(5000, 100, Duration::from_secs(1)), 0.0);
    }

    #[test]
    fn first_cpu_read_waits_out_the_update_interval() {
        let minimum = Duration::from_millis(200);
        assert_eq!(settle_time(Duration::from_millis(5), minimum), Duration::from_millis(195));
        assert_eq!(settle_time(Duration::from_secs(1), minimum), Duration::ZERO);
    }

    #[test]
    fn cpu_usage_is_a_percentage_from_the_first_read() {
        let created = Instant::now();
        let mut cpu = SysinfoCpu::new();
        match cpu.read_usage() {
            Ok(usage) => assert!((0.0..=100.0).contains(&usage)),
            Err(e) => assert!(e.is_unavailable()),
        }
        assert!(cpu.refreshed_at.duration_since(created) >= MINIMUM_CPU_UPDATE_INTERVAL);
    }

    #[test]
    fn auto_names() {
        assert!(is_auto(""));
        assert!(is_auto("AUTO"));
        assert!(!is_auto("eth0"));
    }
}
