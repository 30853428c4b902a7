//! Application state management

use crate::config::AppConfig;
use crate::constants::app;
use crate::system::DisplaySnapshot;
use crate::ui::components::{Segment, StatusLine};
use crate::ui::theme::ColorScheme;
use crate::utils::TickMetrics;
use std::time::Instant;

/// Main application state
#[derive(Debug)]
pub struct AppState {
    /// Configuration
    pub config: AppConfig,

    /// Colors for segments and background
    pub color_scheme: ColorScheme,

    /// Poll timing of received snapshots
    pub tick_metrics: TickMetrics,

    /// UI state
    pub ui_state: UiState,

    /// The snapshot currently on screen
    current: Option<DisplaySnapshot>,

    /// Application start time
    pub start_time: Instant,
}

/// UI-specific state
#[derive(Debug)]
pub struct UiState {
    /// Whether window decorations are hidden
    pub borderless: bool,

    /// Whether the initial top-right placement was done
    pub placed: bool,

    /// Set once a close was requested; no snapshots are applied after it
    pub closing: bool,

    /// Last requested inner window width
    pub width: f32,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig) -> Self {
        let ui_state = UiState::new(config.ui.borderless, config.ui.min_width);

        Self {
            config,
            color_scheme: ColorScheme::default(),
            tick_metrics: TickMetrics::new(app::TICK_HISTORY_LENGTH),
            ui_state,
            current: None,
            start_time: Instant::now(),
        }
    }

    /// Replace the current snapshot with `snapshot`.
    pub fn apply_snapshot(&mut self, snapshot: DisplaySnapshot) {
        if self.ui_state.closing {
            return;
        }
        self.tick_metrics
            .record(snapshot.poll_duration, self.config.polling.interval());
        self.current = Some(snapshot);
    }

    pub fn current_snapshot(&self) -> Option<&DisplaySnapshot> {
        self.current.as_ref()
    }

    /// Segments for the current snapshot
    pub fn segments(&self) -> Vec<Segment> {
        StatusLine::new(&self.config.thresholds, &self.color_scheme)
            .segments(self.current.as_ref())
    }

    /// Hover text with poll statistics
    pub fn tooltip_text(&self) -> String {
        let tick = self.current.as_ref().map(|s| s.tick).unwrap_or(0);
        format!(
            "tick #{}  poll avg {:.1} ms / last {:.1} ms / max {:.1} ms  ({} overruns)\n\
             interval {} ms, up {}s\n\
             right-click for menu, q to quit",
            tick,
            self.tick_metrics.average_poll_ms(),
            self.tick_metrics.last_poll_ms(),
            self.tick_metrics.max_poll_ms(),
            self.tick_metrics.overruns(),
            self.config.polling.interval_ms,
            self.get_uptime().as_secs(),
        )
    }

    /// Get application uptime
    pub fn get_uptime(&self) -> std::time::Duration {
        Instant::now().duration_since(self.start_time)
    }
}

impl UiState {
    fn new(borderless: bool, width: f32) -> Self {
        Self {
            borderless,
            placed: false,
            closing: false,
            width,
        }
    }

    /// Toggle decorations, returning the new borderless flag
    pub fn toggle_border(&mut self) -> bool {
        self.borderless = !self.borderless;
        self.borderless
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::SystemSample;
    use crate::ui::components::display_string;
    use std::time::Duration;

    fn snapshot(tick: u64, cpu: f32) -> DisplaySnapshot {
        DisplaySnapshot {
            tick,
            gpus: Ok(Vec::new()),
            system: SystemSample {
                cpu_pct: Ok(cpu),
                net_download_mbps: Ok(0.0),
            },
            poll_duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn newer_snapshot_replaces_current() {
        let mut state = AppState::new(AppConfig::default());
        assert!(state.current_snapshot().is_none());

        state.apply_snapshot(snapshot(1, 10.0));
        state.apply_snapshot(snapshot(2, 90.0));

        assert_eq!(state.current_snapshot().map(|s| s.tick), Some(2));
        assert_eq!(
            display_string(&state.segments()),
            "GPU N/A | CPU 90% | NET↓ 0.00 MB/s"
        );
        assert_eq!(state.tick_metrics.tick_count(), 2);
    }

    #[test]
    fn closing_freezes_the_display() {
        let mut state = AppState::new(AppConfig::default());
        state.apply_snapshot(snapshot(1, 10.0));
        state.ui_state.closing = true;
        state.apply_snapshot(snapshot(2, 20.0));
        assert_eq!(state.current_snapshot().map(|s| s.tick), Some(1));
    }

    #[test]
    fn toggle_border_flips() {
        let mut state = AppState::new(AppConfig::default());
        assert!(state.ui_state.borderless);
        assert!(!state.ui_state.toggle_border());
        assert!(state.ui_state.toggle_border());
    }
}
