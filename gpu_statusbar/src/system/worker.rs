//! Background timer driving [`MetricsPoller::poll_tick`]

use super::monitor::MetricsPoller;
use super::snapshot::DisplaySnapshot;
use crate::utils::{AppError, Result};
use log::{debug, error, info, warn};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Lifecycle of the poll timer. The only transition is Running → Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Running,
    Stopped,
}

#[derive(Debug)]
enum Control {
    Stop,
}

/// Called after each snapshot is posted, e.g. to request a repaint.
pub type Notifier = Box<dyn Fn() + Send + 'static>;

/// Holds at most one snapshot: the newest one not yet taken by the UI.
#[derive(Debug, Clone, Default)]
struct LatestSlot(Arc<Mutex<Option<DisplaySnapshot>>>);

impl LatestSlot {
    fn lock(&self) -> MutexGuard<'_, Option<DisplaySnapshot>> {
        // 写入方只做整值替换，中毒后内容仍然完整
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `snapshot`, returning whether an untaken one was overwritten.
    fn replace(&self, snapshot: DisplaySnapshot) -> bool {
        self.lock().replace(snapshot).is_some()
    }

    fn take(&self) -> Option<DisplaySnapshot> {
        self.lock().take()
    }
}

/// Owns the poller on its own thread and posts snapshots back to the UI
/// thread. Ticks run one after another; a slow tick delays the next one.
pub struct PollWorker {
    state: PollerState,
    interval: Duration,
    control: Option<mpsc::Sender<Control>>,
    latest: LatestSlot,
    handle: Option<JoinHandle<()>>,
}

impl PollWorker {
    /// Start ticking immediately, then every `interval`.
    pub fn spawn(poller: MetricsPoller, interval: Duration, notify: Notifier) -> Result<Self> {
        let (control_tx, control_rx) = mpsc::channel::<Control>();
        let latest = LatestSlot::default();
        let posted = latest.clone();

        let handle = thread::Builder::new()
            .name("metrics-poller".to_string())
            .spawn(move || poll_loop(poller, interval, control_rx, posted, notify))
            .map_err(|e| AppError::system(format!("Failed to spawn poll worker: {}", e)))?;

        Ok(Self {
            state: PollerState::Running,
            interval,
            control: Some(control_tx),
            latest,
            handle: Some(handle),
        })
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Newest snapshot posted since the last call. Older ones were already
    /// overwritten. Always `None` once stopped.
    pub fn latest(&mut self) -> Option<DisplaySnapshot> {
        if self.state == PollerState::Stopped {
            return None;
        }
        self.latest.take()
    }

    /// Cancel the timer and wait for the worker thread. Idempotent.
    pub fn stop(&mut self) {
        if self.state == PollerState::Stopped {
            return;
        }
        self.state = PollerState::Stopped;

        if let Some(control) = self.control.take() {
            // 线程已退出时发送会失败，忽略即可
            let _ = control.send(Control::Stop);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Poll worker thread panicked");
            }
        }

        if let Some(snapshot) = self.latest.take() {
            debug!("Discarded snapshot of tick {} posted before stop", snapshot.tick);
        }
        info!("Poll worker stopped");
    }
}

impl Drop for PollWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_loop(
    mut poller: MetricsPoller,
    interval: Duration,
    control: mpsc::Receiver<Control>,
    latest: LatestSlot,
    notify: Notifier,
) {
    info!("Starting poll worker, interval {:?}", interval);
    let mut next_tick = Instant::now();

    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        match control.recv_timeout(wait) {
            Ok(Control::Stop) => break,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Poll worker control channel closed");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        let started = Instant::now();
        let snapshot = poller.poll_tick();
        let elapsed = started.elapsed();
        if elapsed > interval {
            warn!(
                "Tick {} took {:?}, longer than the {:?} interval; next tick deferred",
                snapshot.tick, elapsed, interval
            );
        }

        let tick = snapshot.tick;
        if latest.replace(snapshot) {
            debug!("UI did not take the previous snapshot before tick {}", tick);
        }
        notify();

        next_tick = (started + interval).max(Instant::now());
    }

    info!("Poll worker exiting after {} tick(s)", poller.tick_count());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::sensors::{CpuSensor, GpuSensor, NetworkSensor, SensorResult};
    use std::sync::atomic::{AtomicU64, Ordering};

    struct NoGpu;

    impl GpuSensor for NoGpu {
        fn device_count(&mut self) -> SensorResult<u32> {
            Ok(0)
        }
        fn read_utilization(&mut self, _index: u32) -> SensorResult<f32> {
            Ok(0.0)
        }
        fn read_power(&mut self, _index: u32) -> SensorResult<f32> {
            Ok(0.0)
        }
        fn read_temperature(&mut self, _index: u32) -> SensorResult<f32> {
            Ok(0.0)
        }
    }

    struct Idle;

    impl CpuSensor for Idle {
        fn read_usage(&mut self) -> SensorResult<f32> {
            Ok(1.0)
        }
    }

    impl NetworkSensor for Idle {
        fn read_download_mbps(&mut self) -> SensorResult<f64> {
            Ok(0.0)
        }
    }

    fn poller() -> MetricsPoller {
        MetricsPoller::new(Box::new(NoGpu), Box::new(Idle), Box::new(Idle))
    }

    #[test]
    fn undrained_snapshots_do_not_pile_up() {
        let notified = Arc::new(AtomicU64::new(0));
        let counter = notified.clone();
        let mut worker = PollWorker::spawn(
            poller(),
            Duration::from_millis(1),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        // UI 空闲期间不取快照
        thread::sleep(Duration::from_millis(100));
        let posted_before = notified.load(Ordering::SeqCst);
        assert!(posted_before > 1);

        let newest = worker.latest().expect("a snapshot was posted");
        assert!(newest.tick >= posted_before);
        worker.stop();
        assert!(worker.latest.lock().is_none());
    }

    #[test]
    fn slot_keeps_only_the_newest_snapshot() {
        let slot = LatestSlot::default();
        let mut poller = poller();

        assert!(!slot.replace(poller.poll_tick()));
        assert!(slot.replace(poller.poll_tick()));
        assert!(slot.replace(poller.poll_tick()));

        assert_eq!(slot.take().map(|s| s.tick), Some(3));
        assert!(slot.take().is_none());
    }
}
