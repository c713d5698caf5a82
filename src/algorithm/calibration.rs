//! Per-user gaze thresholds captured from three posed samples.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Share of the distance from neutral to the posed extreme at which a
/// threshold is placed.
const REACH: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalibrationStep {
    Neutral,
    Up,
    Down,
}

impl CalibrationStep {
    pub const ORDER: [CalibrationStep; 3] = [
        CalibrationStep::Neutral,
        CalibrationStep::Up,
        CalibrationStep::Down,
    ];

    pub fn prompt(self) -> &'static str {
        match self {
            CalibrationStep::Neutral => "Look straight ahead",
            CalibrationStep::Up => "Look up as far as comfortable",
            CalibrationStep::Down => "Look down as far as comfortable",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("no usable sample for the {0:?} step")]
    MissingSample(CalibrationStep),
    #[error("calibration aborted")]
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationThresholds {
    pub neutral: f64,
    pub up: f64,
    pub down: f64,
}

impl Default for CalibrationThresholds {
    fn default() -> Self {
        Self {
            neutral: 0.5,
            up: 0.4,
            down: 0.6,
        }
    }
}

impl CalibrationThresholds {
    pub fn from_samples(neutral: f64, up: f64, down: f64) -> Self {
        Self {
            neutral: neutral.clamp(0.0, 1.0),
            up: (neutral + (up - neutral) * REACH).clamp(0.0, 1.0),
            down: (neutral + (down - neutral) * REACH).clamp(0.0, 1.0),
        }
    }
}

/// Walks the three steps in order. Any missing sample ends the session.
#[derive(Debug, Clone, Default)]
pub struct CalibrationSession {
    samples: Vec<f64>,
    failed: Option<CalibrationError>,
}

impl CalibrationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step waiting for a sample, or `None` once the session is over.
    pub fn current_step(&self) -> Option<CalibrationStep> {
        if self.failed.is_some() {
            return None;
        }
        CalibrationStep::ORDER.get(self.samples.len()).copied()
    }

    /// Records the sample for the current step. `None` (no face, camera read
    /// failure) aborts the session.
    pub fn record(&mut self, sample: Option<f64>) -> Result<(), CalibrationError> {
        let Some(step) = self.current_step() else {
            return match &self.failed {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            };
        };
        match sample.filter(|value| value.is_finite()) {
            Some(value) => {
                log::info!("calibration_record: step={:?} sample={:.3}", step, value);
                self.samples.push(value);
                Ok(())
            }
            None => {
                log::warn!("calibration_record: missing sample for step={:?}", step);
                self.failed = Some(CalibrationError::MissingSample(step));
                Err(CalibrationError::MissingSample(step))
            }
        }
    }

    pub fn abort(&mut self) {
        if self.failed.is_none() {
            self.failed = Some(CalibrationError::Aborted);
        }
    }

    pub fn finish(self) -> Result<CalibrationThresholds, CalibrationError> {
        if let Some(err) = self.failed {
            return Err(err);
        }
        match self.samples.as_slice() {
            [neutral, up, down] => Ok(CalibrationThresholds::from_samples(*neutral, *up, *down)),
            _ => {
                let missing = CalibrationStep::ORDER[self.samples.len().min(2)];
                Err(CalibrationError::MissingSample(missing))
            }
        }
    }
}

/// Unwraps a calibration outcome, falling back to the fixed defaults on
/// failure.
pub fn thresholds_or_default(
    outcome: Result<CalibrationThresholds, CalibrationError>,
) -> CalibrationThresholds {
    match outcome {
        Ok(thresholds) => {
            log::info!(
                "calibration_finish: neutral={:.3} up={:.3} down={:.3}",
                thresholds.neutral,
                thresholds.up,
                thresholds.down
            );
            thresholds
        }
        Err(err) => {
            log::warn!("calibration_finish: {}; using default thresholds", err);
            CalibrationThresholds::default()
        }
    }
}
