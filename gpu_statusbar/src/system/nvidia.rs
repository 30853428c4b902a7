//! NVIDIA telemetry through `nvidia-smi`

use super::sensors::{finite, GpuSensor, SensorResult};
use super::snapshot::GpuSample;
use crate::constants::intervals;
use crate::utils::SensorError;
use log::{debug, warn};
use std::io;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const QUERY_FORMAT: &str = "--format=csv,noheader,nounits";

/// How often a running query is checked for completion.
const WAIT_STEP: Duration = Duration::from_millis(10);

/// `nvidia-smi` backed GPU sensor
#[derive(Debug, Clone)]
pub struct NvidiaSmi {
    program: String,
    /// Upper bound for a single invocation.
    timeout: Duration,
}

impl NvidiaSmi {
    pub fn new() -> Self {
        Self::with_program("nvidia-smi")
    }

    /// Use a different executable, e.g. an absolute path.
    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_millis(intervals::POLL_DEFAULT),
        }
    }

    /// Kill invocations that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the tool can be started at all.
    pub fn is_installed(&self) -> bool {
        let spawned = Command::new(&self.program)
            .arg("--help")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                if let Err(e) = self.wait_with_deadline(&mut child) {
                    warn!("{} --help did not finish: {}", self.program, e);
                }
                true
            }
            Err(_) => false,
        }
    }

    fn run(&self, args: &[&str]) -> SensorResult<Output> {
        debug!("Running {} {}", self.program, args.join(" "));
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    SensorError::unavailable(format!("{} not found in PATH", self.program))
                }
                _ => SensorError::read_failure(format!("failed to execute {}: {}", self.program, e)),
            })?;

        self.wait_with_deadline(&mut child)?;
        child.wait_with_output().map_err(|e| {
            SensorError::read_failure(format!("failed to read {} output: {}", self.program, e))
        })
    }

    /// Poll `child` until it exits. A child still running at the deadline is
    /// killed and reaped.
    fn wait_with_deadline(&self, child: &mut Child) -> SensorResult<()> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_status)) => return Ok(()),
                Ok(None) if Instant::now() >= deadline => {
                    // 驱动无响应时结束子进程，避免僵尸
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SensorError::read_failure(format!(
                        "{} timed out after {:?}",
                        self.program, self.timeout
                    )));
                }
                Ok(None) => thread::sleep(WAIT_STEP),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SensorError::read_failure(format!(
                        "failed to wait for {}: {}",
                        self.program, e
                    )));
                }
            }
        }
    }

    fn query(&self, index: u32, fields: &str) -> SensorResult<String> {
        let index = index.to_string();
        let query = format!("--query-gpu={}", fields);
        let output = self.run(&[&query, QUERY_FORMAT, "-i", &index])?;
        if !output.status.success() {
            return Err(SensorError::read_failure(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                combined_output(&output).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn query_single(&self, index: u32, field: &str) -> SensorResult<f32> {
        let out = self.query(index, field)?;
        let values = parse_csv_line(&out, 1)?;
        Ok(values[0])
    }
}

impl Default for NvidiaSmi {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuSensor for NvidiaSmi {
    fn device_count(&mut self) -> SensorResult<u32> {
        let output = self.run(&["--list-gpus"])?;
        if !output.status.success() {
            // 驱动未加载时 nvidia-smi 返回非零退出码
            return Err(SensorError::unavailable(format!(
                "{} --list-gpus exited with {}: {}",
                self.program,
                output.status,
                combined_output(&output).trim()
            )));
        }
        Ok(count_gpus(&String::from_utf8_lossy(&output.stdout)))
    }

    fn read_utilization(&mut self, index: u32) -> SensorResult<f32> {
        self.query_single(index, "utilization.gpu")
    }

    fn read_power(&mut self, index: u32) -> SensorResult<f32> {
        self.query_single(index, "power.draw")
    }

    fn read_temperature(&mut self, index: u32) -> SensorResult<f32> {
        self.query_single(index, "temperature.gpu")
    }

    fn read_sample(&mut self, index: u32) -> SensorResult<GpuSample> {
        let out = self.query(index, "utilization.gpu,power.draw,temperature.gpu")?;
        parse_sample(index, &out)
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

/// Count the `GPU n: ...` lines of `nvidia-smi --list-gpus`. Indented MIG
/// device lines belong to their parent GPU and are not counted.
pub fn count_gpus(list_output: &str) -> u32 {
    list_output
        .lines()
        .filter(|line| line.trim_start().starts_with("GPU "))
        .count() as u32
}

/// Parse the first line of a `--format=csv,noheader,nounits` reply into
/// `expected` numbers.
pub fn parse_csv_line(output: &str, expected: usize) -> SensorResult<Vec<f32>> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| SensorError::read_failure("empty nvidia-smi output"))?;

    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < expected {
        return Err(SensorError::read_failure(format!(
            "unexpected nvidia-smi output: {:?}",
            output
        )));
    }

    parts[..expected]
        .iter()
        .map(|part| {
            let value: f32 = part.parse().map_err(|_| {
                SensorError::read_failure(format!("unparseable nvidia-smi value {:?}", part))
            })?;
            finite(value, part)
        })
        .collect()
}

/// Parse `utilization, power, temperature` for GPU `index`.
pub fn parse_sample(index: u32, output: &str) -> SensorResult<GpuSample> {
    let values = parse_csv_line(output, 3)?;
    Ok(GpuSample {
        index,
        utilization_pct: values[0].clamp(0.0, 100.0),
        power_watts: values[1].max(0.0),
        temperature_celsius: values[2],
    })
}
