//! Blink detection from lid opening.

use serde::{Deserialize, Serialize};

use super::geometry::distance;
use crate::models::landmarks::FaceLandmarks;
use crate::models::settings::{check_positive_max, SettingsError};

/// Threshold rule below which both eyes count as closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlinkPolicy {
    Fixed { threshold: f64 },
    /// `base / (factor * span)`, where `span` is the distance between the
    /// outer eye corners. A face further from the camera has a smaller span
    /// and gets a proportionally larger threshold.
    FaceDistanceAdjusted { base: f64, factor: f64 },
}

impl Default for BlinkPolicy {
    fn default() -> Self {
        BlinkPolicy::FaceDistanceAdjusted {
            base: 0.003,
            factor: 1.05,
        }
    }
}

impl BlinkPolicy {
    pub fn validate(&self) -> Result<(), SettingsError> {
        match *self {
            BlinkPolicy::Fixed { threshold } => {
                check_positive_max("blink.threshold", threshold, 1.0)
            }
            BlinkPolicy::FaceDistanceAdjusted { base, factor } => {
                check_positive_max("blink.base", base, 1.0)?;
                check_positive_max("blink.factor", factor, 100.0)
            }
        }
    }

    pub fn threshold(&self, face: &FaceLandmarks) -> f64 {
        match *self {
            BlinkPolicy::Fixed { threshold } => threshold,
            BlinkPolicy::FaceDistanceAdjusted { base, factor } => {
                let (left, right) = face.outer_corners();
                let span = distance(left, right);
                let adjusted = base / (factor * span);
                if span > f64::EPSILON && adjusted.is_finite() {
                    adjusted
                } else {
                    base
                }
            }
        }
    }

    pub fn eyes_closed(&self, face: &FaceLandmarks) -> bool {
        let threshold = self.threshold(face);
        face.left_eye.height() < threshold && face.right_eye.height() < threshold
    }
}

/// Reports the frame on which the eyes close; staying closed counts once.
#[derive(Debug, Clone, Default)]
pub struct BlinkDetector {
    closed: bool,
}

impl BlinkDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, face: Option<&FaceLandmarks>, policy: &BlinkPolicy) -> bool {
        let closed = face.is_some_and(|face| policy.eyes_closed(face));
        let onset = closed && !self.closed;
        self.closed = closed;
        onset
    }

    pub fn reset(&mut self) {
        self.closed = false;
    }
}
