//! Color bands and styling for the status line

use crate::constants::colors;
use egui::{Color32, Style, Visuals};
use serde::{Deserialize, Serialize};

/// Alert level of a value, ordered from coolest to hottest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    Low,
    Medium,
    High,
}

/// Two breakpoints splitting the value range into three bands.
///
/// A value equal to a breakpoint falls into the higher band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub medium: f32,
    pub high: f32,
}

impl BandThresholds {
    pub const fn new(medium: f32, high: f32) -> Self {
        Self { medium, high }
    }

    pub fn classify(&self, value: f32) -> Band {
        if value >= self.high {
            Band::High
        } else if value >= self.medium {
            Band::Medium
        } else {
            Band::Low
        }
    }

    /// Restore `medium <= high` so classification stays monotonic.
    pub fn normalize(&mut self) {
        if !self.medium.is_finite() || !self.high.is_finite() {
            log::warn!("Non-finite band thresholds {:?}, keeping as-is", self);
            return;
        }
        if self.medium > self.high {
            log::warn!(
                "Band thresholds out of order (medium={} > high={}), swapping",
                self.medium,
                self.high
            );
            std::mem::swap(&mut self.medium, &mut self.high);
        }
    }
}

/// Which metric a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    GpuUtilization,
    GpuPower,
    GpuTemperature,
    Cpu,
    NetworkDownload,
}

/// Configured breakpoints per metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandPolicy {
    pub gpu_utilization: BandThresholds,
    pub gpu_temperature: BandThresholds,
    pub cpu: BandThresholds,
    /// Power has no bands unless configured.
    pub gpu_power: Option<BandThresholds>,
    /// Network has no bands unless configured.
    pub network: Option<BandThresholds>,
}

impl Default for BandPolicy {
    fn default() -> Self {
        Self {
            gpu_utilization: BandThresholds::new(40.0, 70.0),
            gpu_temperature: BandThresholds::new(70.0, 85.0),
            cpu: BandThresholds::new(40.0, 75.0),
            gpu_power: None,
            network: None,
        }
    }
}

impl BandPolicy {
    /// Band for `value`, or `None` for metrics drawn in a neutral color.
    pub fn band(&self, metric: Metric, value: f32) -> Option<Band> {
        let thresholds = match metric {
            Metric::GpuUtilization => Some(self.gpu_utilization),
            Metric::GpuTemperature => Some(self.gpu_temperature),
            Metric::Cpu => Some(self.cpu),
            Metric::GpuPower => self.gpu_power,
            Metric::NetworkDownload => self.network,
        };
        thresholds.map(|t| t.classify(value))
    }

    pub fn normalize(&mut self) {
        self.gpu_utilization.normalize();
        self.gpu_temperature.normalize();
        self.cpu.normalize();
        if let Some(t) = self.gpu_power.as_mut() {
            t.normalize();
        }
        if let Some(t) = self.network.as_mut() {
            t.normalize();
        }
    }
}

/// Color scheme for the status line
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub background: Color32,
    pub foreground: Color32,
    pub muted: Color32,
    pub separator: Color32,
    pub low: Color32,
    pub medium: Color32,
    pub high: Color32,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: colors::BACKGROUND,
            foreground: colors::TEXT,
            muted: colors::MUTED,
            separator: colors::SEPARATOR,
            low: colors::BAND_LOW,
            medium: colors::BAND_MEDIUM,
            high: colors::BAND_HIGH,
        }
    }
}

impl ColorScheme {
    pub fn band_color(&self, band: Band) -> Color32 {
        match band {
            Band::Low => self.low,
            Band::Medium => self.medium,
            Band::High => self.high,
        }
    }

    /// Apply the scheme to an egui context
    pub fn apply_to_context(&self, ctx: &egui::Context) {
        ctx.set_visuals(Visuals::dark());
        ctx.style_mut(|style| self.apply_colors_to_style(style));
    }

    fn apply_colors_to_style(&self, style: &mut Style) {
        style.visuals.window_fill = self.background;
        style.visuals.panel_fill = self.background;
        style.visuals.widgets.noninteractive.bg_fill = Color32::TRANSPARENT;

        // 标签不可选中，否则会吞掉拖动事件
        style.interaction.selectable_labels = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_resolve_to_higher_band() {
        let t = BandThresholds::new(40.0, 70.0);
        assert_eq!(t.classify(39.9), Band::Low);
        assert_eq!(t.classify(40.0), Band::Medium);
        assert_eq!(t.classify(69.9), Band::Medium);
        assert_eq!(t.classify(70.0), Band::High);
        assert_eq!(t.classify(100.0), Band::High);
    }

    #[test]
    fn utilization_mapping_is_monotonic() {
        let policy = BandPolicy::default();
        for metric in [Metric::GpuUtilization, Metric::Cpu, Metric::GpuTemperature] {
            let mut previous = Band::Low;
            for step in 0..=1000 {
                let v = step as f32 / 10.0;
                let band = policy.band(metric, v).unwrap();
                assert!(band >= previous, "{:?} dropped at {}", metric, v);
                previous = band;
            }
        }
    }

    #[test]
    fn neutral_metrics_have_no_band_by_default() {
        let policy = BandPolicy::default();
        assert_eq!(policy.band(Metric::GpuPower, 300.0), None);
        assert_eq!(policy.band(Metric::NetworkDownload, 50.0), None);
    }

    #[test]
    fn normalize_swaps_inverted_breakpoints() {
        let mut t = BandThresholds::new(80.0, 30.0);
        t.normalize();
        assert_eq!(t, BandThresholds::new(30.0, 80.0));
        assert_eq!(t.classify(50.0), Band::Medium);
    }

    #[test]
    fn band_colors_follow_alert_level() {
        let scheme = ColorScheme::default();
        assert_eq!(scheme.band_color(Band::Low), colors::GREEN);
        assert_eq!(scheme.band_color(Band::Medium), colors::AMBER);
        assert_eq!(scheme.band_color(Band::High), colors::RED);
    }
}
