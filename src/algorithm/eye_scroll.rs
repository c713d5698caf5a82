//! Gaze-driven scrolling from the vertical position of the eye inside its
//! contour.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::calibration::CalibrationThresholds;
use crate::models::events::ScrollDirection;
use crate::models::landmarks::{EyeJoint, EyeLandmarks};
use crate::models::settings::{check_positive_max, check_range, SettingsError};

/// How smoothed gaze positions map to scroll intent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GazePolicy {
    /// Fixed bands with a constant speed.
    Fixed { up: f64, down: f64, speed: f64 },
    /// Per-user thresholds from a calibration run, with speed growing as the
    /// gaze moves past them.
    Calibrated,
}

impl Default for GazePolicy {
    fn default() -> Self {
        GazePolicy::Fixed {
            up: 0.4,
            down: 0.6,
            speed: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GazeScrollConfig {
    pub enabled: bool,
    pub policy: GazePolicy,
    /// Dead band around calibrated thresholds.
    pub neutral_zone: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub sensitivity: f64,
    /// Moving-average length in frames.
    pub window: usize,
    pub cooldown_ms: u64,
}

impl Default for GazeScrollConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            policy: GazePolicy::default(),
            neutral_zone: 0.05,
            min_speed: 20.0,
            max_speed: 90.0,
            sensitivity: 1.5,
            window: 5,
            cooldown_ms: 10,
        }
    }
}

impl GazeScrollConfig {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let GazePolicy::Fixed { up, down, speed } = self.policy {
            check_range("gaze.policy.up", up, 0.0, 1.0)?;
            check_range("gaze.policy.down", down, up, 1.0)?;
            check_positive_max("gaze.policy.speed", speed, 1_000.0)?;
        }
        check_range("gaze.neutralZone", self.neutral_zone, 0.0, 0.5)?;
        check_range("gaze.minSpeed", self.min_speed, 0.0, 1_000.0)?;
        check_range("gaze.maxSpeed", self.max_speed, self.min_speed, 1_000.0)?;
        check_positive_max("gaze.sensitivity", self.sensitivity, 10.0)?;
        if self.window == 0 || self.window > 60 {
            return Err(SettingsError::OutOfRange {
                field: "gaze.window",
                value: self.window as f64,
                min: 1.0,
                max: 60.0,
            });
        }
        Ok(())
    }
}

/// Scroll request produced for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeIntent {
    pub direction: ScrollDirection,
    /// Wheel units for this frame.
    pub speed: f64,
}

/// Corner position between upper (0.0) and lower (1.0) lid. A closed or
/// degenerate eye reads as centred.
pub fn vertical_ratio(eye: &EyeLandmarks) -> f64 {
    let top = eye[EyeJoint::UpperLidOuter].y;
    let height = eye.height();
    if !height.is_finite() || height.abs() <= f64::EPSILON {
        return 0.5;
    }
    let ratio = (eye[EyeJoint::Corner].y - top) / height;
    if ratio.is_finite() {
        ratio
    } else {
        0.5
    }
}

fn dynamic_speed(position: f64, threshold: f64, config: &GazeScrollConfig) -> f64 {
    let distance = ((position - threshold).abs() / 0.5).min(1.0);
    (config.min_speed + (config.max_speed - config.min_speed) * distance) * config.sensitivity
}

#[derive(Debug, Clone)]
pub struct GazeScroller {
    config: GazeScrollConfig,
    thresholds: CalibrationThresholds,
    history: VecDeque<f64>,
}

impl GazeScroller {
    pub fn new(config: GazeScrollConfig, thresholds: CalibrationThresholds) -> Self {
        Self {
            history: VecDeque::with_capacity(config.window),
            config,
            thresholds,
        }
    }

    /// Mean of the last `window` ratios, this one included.
    pub fn smooth(&mut self, ratio: f64) -> f64 {
        self.history.push_back(ratio);
        while self.history.len() > self.config.window.max(1) {
            self.history.pop_front();
        }
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }

    pub fn observe(&mut self, eye: &EyeLandmarks) -> Option<GazeIntent> {
        let position = self.smooth(vertical_ratio(eye));
        match self.config.policy {
            GazePolicy::Fixed { up, down, speed } => {
                if position < up {
                    Some(GazeIntent {
                        direction: ScrollDirection::Up,
                        speed,
                    })
                } else if position > down {
                    Some(GazeIntent {
                        direction: ScrollDirection::Down,
                        speed,
                    })
                } else {
                    None
                }
            }
            GazePolicy::Calibrated => {
                let up = self.thresholds.up;
                let down = self.thresholds.down;
                if position < up - self.config.neutral_zone {
                    Some(GazeIntent {
                        direction: ScrollDirection::Up,
                        speed: dynamic_speed(position, up, &self.config),
                    })
                } else if position > down + self.config.neutral_zone {
                    Some(GazeIntent {
                        direction: ScrollDirection::Down,
                        speed: dynamic_speed(position, down, &self.config),
                    })
                } else {
                    None
                }
            }
        }
    }

    /// Drops the smoothing history, e.g. when the face is lost.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
