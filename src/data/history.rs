//! Reading history for sparklines and battery drain estimates.

use std::collections::VecDeque;
use std::time::Instant;

/// Maximum number of samples kept per series.
const MAX_HISTORY_SIZE: usize = 60;

/// Recent compute pack battery and temperature readings.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Battery level samples (percent).
    pub battery: VecDeque<f64>,
    /// Battery temperature samples (degrees Celsius).
    pub temperature: VecDeque<f64>,
    /// When each battery sample was taken.
    pub timestamps: VecDeque<Instant>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick of readings taken now.
    pub fn record(&mut self, battery: Option<u8>, temperature: Option<f32>) {
        self.record_at(battery, temperature, Instant::now());
    }

    /// Record one tick of readings taken at `at`.
    pub fn record_at(&mut self, battery: Option<u8>, temperature: Option<f32>, at: Instant) {
        if let Some(level) = battery {
            push_capped(&mut self.battery, f64::from(level));
            push_capped(&mut self.timestamps, at);
        }
        if let Some(celsius) = temperature {
            push_capped(&mut self.temperature, f64::from(celsius));
        }
    }

    /// Battery levels normalized to 0-7 for 8 bar levels.
    pub fn battery_sparkline(&self) -> Vec<u8> {
        normalize_sparkline(&self.battery)
    }

    /// Temperatures normalized to 0-7 for 8 bar levels.
    pub fn temperature_sparkline(&self) -> Vec<u8> {
        normalize_sparkline(&self.temperature)
    }

    /// Battery drain in percent per minute across the recorded window.
    ///
    /// Positive while discharging, negative while charging. Returns None
    /// until two samples with distinct timestamps exist.
    pub fn battery_drain_per_minute(&self) -> Option<f64> {
        let first = *self.battery.front()?;
        let last = *self.battery.back()?;
        let start = self.timestamps.front()?;
        let end = self.timestamps.back()?;

        let elapsed = end.duration_since(*start).as_secs_f64();
        if self.battery.len() < 2 || elapsed <= 0.0 {
            return None;
        }
        Some((first - last) / elapsed * 60.0)
    }
}

fn push_capped<T>(series: &mut VecDeque<T>, value: T) {
    series.push_back(value);
    if series.len() > MAX_HISTORY_SIZE {
        series.pop_front();
    }
}

fn normalize_sparkline(values: &VecDeque<f64>) -> Vec<u8> {
    if values.len() < 2 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(f64::EPSILON);

    values
        .iter()
        .map(|&v| {
            let normalized = ((v - min) / range * 7.0) as u8;
            normalized.min(7)
        })
        .collect()
}
