//! The single-line GPU/CPU/NET readout

use crate::constants::labels;
use crate::system::{DisplaySnapshot, GpuReading};
use crate::ui::theme::{BandPolicy, ColorScheme, Metric};
use egui::{Color32, FontId, RichText};

/// One colored piece of the status line.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub color: Color32,
}

impl Segment {
    fn new<S: Into<String>>(text: S, color: Color32) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Turns snapshots into segments.
pub struct StatusLine<'a> {
    policy: &'a BandPolicy,
    scheme: &'a ColorScheme,
}

impl<'a> StatusLine<'a> {
    pub fn new(policy: &'a BandPolicy, scheme: &'a ColorScheme) -> Self {
        Self { policy, scheme }
    }

    /// Segments for `snapshot`, or pending placeholders before the first tick.
    pub fn segments(&self, snapshot: Option<&DisplaySnapshot>) -> Vec<Segment> {
        let mut out = Vec::new();
        match snapshot {
            Some(snapshot) => {
                match &snapshot.gpus {
                    Ok(readings) if !readings.is_empty() => {
                        for reading in readings {
                            self.push_gpu(&mut out, reading);
                        }
                    }
                    // 没有检测到 GPU 或枚举失败
                    _ => self.push_missing_gpus(&mut out, labels::UNAVAILABLE),
                }
                self.push_cpu(&mut out, snapshot.system.cpu_pct.as_ref().ok().copied());
                self.push_net(
                    &mut out,
                    snapshot.system.net_download_mbps.as_ref().ok().copied(),
                    labels::UNAVAILABLE,
                );
            }
            None => {
                self.push_missing_gpus(&mut out, labels::PENDING);
                out.push(self.tag(labels::CPU_TAG));
                out.push(self.placeholder(format!("{}%", labels::PENDING)));
                out.push(self.separator());
                self.push_net(&mut out, None, &format!("{} MB/s", labels::PENDING));
            }
        }
        out
    }

    fn push_gpu(&self, out: &mut Vec<Segment>, reading: &GpuReading) {
        out.push(self.tag(format!("{}{} ", labels::GPU_PREFIX, reading.index)));
        match &reading.sample {
            Ok(sample) => {
                out.push(self.value(
                    format!("{:.0}%", sample.utilization_pct),
                    Metric::GpuUtilization,
                    sample.utilization_pct,
                    self.scheme.muted,
                ));
                out.push(self.separator());
                out.push(self.value(
                    format!("{:.0} W", sample.power_watts),
                    Metric::GpuPower,
                    sample.power_watts,
                    self.scheme.foreground,
                ));
                out.push(self.separator());
                out.push(self.value(
                    format!("{:.0} °C", sample.temperature_celsius),
                    Metric::GpuTemperature,
                    sample.temperature_celsius,
                    self.scheme.muted,
                ));
            }
            Err(_) => {
                out.push(self.placeholder(labels::UNAVAILABLE));
                out.push(self.separator());
                out.push(self.placeholder(labels::UNAVAILABLE));
                out.push(self.separator());
                out.push(self.placeholder(labels::UNAVAILABLE));
            }
        }
        out.push(self.separator());
    }

    fn push_missing_gpus(&self, out: &mut Vec<Segment>, placeholder: &str) {
        out.push(self.tag(format!("{} ", labels::GPU_PREFIX)));
        out.push(self.placeholder(placeholder));
        out.push(self.separator());
    }

    fn push_cpu(&self, out: &mut Vec<Segment>, cpu: Option<f32>) {
        out.push(self.tag(labels::CPU_TAG));
        out.push(match cpu {
            Some(cpu) => self.value(format!("{:.0}%", cpu), Metric::Cpu, cpu, self.scheme.muted),
            None => self.placeholder(labels::UNAVAILABLE),
        });
        out.push(self.separator());
    }

    fn push_net(&self, out: &mut Vec<Segment>, mbps: Option<f64>, placeholder: &str) {
        out.push(self.tag(labels::NET_TAG));
        out.push(match mbps {
            Some(mbps) => self.value(
                format!("{:.2} MB/s", mbps),
                Metric::NetworkDownload,
                mbps as f32,
                self.scheme.muted,
            ),
            None => self.placeholder(placeholder),
        });
    }

    fn value(&self, text: String, metric: Metric, value: f32, neutral: Color32) -> Segment {
        let color = self
            .policy
            .band(metric, value)
            .map(|band| self.scheme.band_color(band))
            .unwrap_or(neutral);
        Segment::new(text, color)
    }

    fn tag<S: Into<String>>(&self, text: S) -> Segment {
        Segment::new(text, self.scheme.foreground)
    }

    fn placeholder<S: Into<String>>(&self, text: S) -> Segment {
        Segment::new(text, self.scheme.muted)
    }

    fn separator(&self) -> Segment {
        Segment::new(labels::SEPARATOR, self.scheme.separator)
    }
}

/// The plain text of a status line.
pub fn display_string(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// Lay the segments out left to right with no spacing between them.
pub fn draw_segments(ui: &mut egui::Ui, segments: &[Segment], font: &FontId) {
    ui.spacing_mut().item_spacing.x = 0.0;
    for segment in segments {
        ui.label(
            RichText::new(&segment.text)
                .font(font.clone())
                .strong()
                .color(segment.color),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::colors;
    use crate::system::{GpuSample, SystemSample};
    use crate::utils::SensorError;
    use std::time::Duration;

    fn known_snapshot() -> DisplaySnapshot {
        DisplaySnapshot {
            tick: 1,
            gpus: Ok(vec![GpuReading {
                index: 0,
                sample: Ok(GpuSample {
                    index: 0,
                    utilization_pct: 73.0,
                    power_watts: 150.0,
                    temperature_celsius: 65.0,
                }),
            }]),
            system: SystemSample {
                cpu_pct: Ok(40.0),
                net_download_mbps: Ok(12.5),
            },
            poll_duration: Duration::from_millis(3),
        }
    }

    fn render(snapshot: Option<&DisplaySnapshot>) -> Vec<Segment> {
        let policy = BandPolicy::default();
        let scheme = ColorScheme::default();
        StatusLine::new(&policy, &scheme).segments(snapshot)
    }

    fn color_of(segments: &[Segment], text: &str) -> Color32 {
        segments
            .iter()
            .find(|s| s.text == text)
            .map(|s| s.color)
            .unwrap_or_else(|| panic!("no segment {:?}", text))
    }

    #[test]
    fn known_sample_layout() {
        let snapshot = known_snapshot();
        let segments = render(Some(&snapshot));
        assert_eq!(
            display_string(&segments),
            "GPU0 73% | 150 W | 65 °C | CPU 40% | NET↓ 12.50 MB/s"
        );
        // 再次格式化结果一致
        assert_eq!(render(Some(&snapshot)), segments);
    }

    #[test]
    fn known_sample_colors() {
        let snapshot = known_snapshot();
        let segments = render(Some(&snapshot));
        assert_eq!(color_of(&segments, "73%"), colors::RED);
        assert_eq!(color_of(&segments, "150 W"), colors::TEXT);
        assert_eq!(color_of(&segments, "65 °C"), colors::GREEN);
        assert_eq!(color_of(&segments, "40%"), colors::AMBER);
        assert_eq!(color_of(&segments, "12.50 MB/s"), colors::MUTED);
        assert_eq!(color_of(&segments, " | "), colors::SEPARATOR);
    }

    #[test]
    fn zero_gpus_show_placeholder_and_keep_cpu_net() {
        let mut snapshot = known_snapshot();
        snapshot.gpus = Ok(Vec::new());
        assert_eq!(
            display_string(&render(Some(&snapshot))),
            "GPU N/A | CPU 40% | NET↓ 12.50 MB/s"
        );

        snapshot.gpus = Err(SensorError::unavailable("nvidia-smi not found"));
        assert_eq!(
            display_string(&render(Some(&snapshot))),
            "GPU N/A | CPU 40% | NET↓ 12.50 MB/s"
        );
    }

    #[test]
    fn failed_segments_render_placeholders() {
        let mut snapshot = known_snapshot();
        snapshot.gpus = Ok(vec![GpuReading {
            index: 0,
            sample: Err(SensorError::read_failure("timeout")),
        }]);
        snapshot.system.cpu_pct = Err(SensorError::read_failure("no data"));
        snapshot.system.net_download_mbps = Err(SensorError::unavailable("no iface"));

        let segments = render(Some(&snapshot));
        assert_eq!(
            display_string(&segments),
            "GPU0 N/A | N/A | N/A | CPU N/A | NET↓ N/A"
        );
        assert_eq!(color_of(&segments, "N/A"), colors::MUTED);
    }

    #[test]
    fn pending_before_first_tick() {
        assert_eq!(
            display_string(&render(None)),
            "GPU -- | CPU --% | NET↓ -- MB/s"
        );
    }

    #[test]
    fn multiple_gpus_in_index_order() {
        let mut snapshot = known_snapshot();
        snapshot.gpus = Ok(vec![
            GpuReading {
                index: 0,
                sample: Ok(GpuSample {
                    index: 0,
                    utilization_pct: 5.0,
                    power_watts: 30.4,
                    temperature_celsius: 41.0,
                }),
            },
            GpuReading {
                index: 1,
                sample: Err(SensorError::read_failure("gpu fell off the bus")),
            },
        ]);
        assert_eq!(
            display_string(&render(Some(&snapshot))),
            "GPU0 5% | 30 W | 41 °C | GPU1 N/A | N/A | N/A | CPU 40% | NET↓ 12.50 MB/s"
        );
    }
}
