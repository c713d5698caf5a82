//! Control settings (settings.json).
//!
//! Every threshold the pipeline uses lives here with its default. Values are
//! checked once by [`ControlSettings::validate`] when they enter the process
//! (file, command line, control surface) and trusted afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::blink::BlinkPolicy;
use crate::algorithm::debounce::DebounceConfig;
use crate::algorithm::eye_scroll::GazeScrollConfig;
use crate::algorithm::gestures::ClassifierConfig;
use crate::algorithm::pointer_motion::MotionConfig;
use crate::algorithm::scroll::ScrollConfig;

pub const MAX_HOLD_FRAMES: u32 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("requiredHoldFrames must be at most 10, got {0}")]
    HoldFrames(u32),
    #[error("screen size must be non-zero, got {width}x{height}")]
    ScreenSize { width: u32, height: u32 },
    #[error("failed to read settings file {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("failed to parse settings file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Pose that enables pointer tracking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingPose {
    /// Index tip above its knuckle, every other digit down.
    #[default]
    IndexRaised,
    /// Index finger fully straight (both joint angles above
    /// `straightAngleDeg`), every other digit down.
    IndexStraight,
}

/// What the screenshot gesture does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScreenshotMode {
    /// Send the platform screenshot hotkey and let the OS tool handle it.
    #[default]
    Hotkey,
    /// Grab the desktop and write a timestamped PNG into `dir`
    /// (the user's pictures directory when unset).
    Save {
        #[serde(default)]
        dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlSettings {
    /// Pointer sensitivity: normalized hand travel is multiplied by this and
    /// by the screen size.
    pub scaling_factor: f64,
    /// Exponential-smoothing coefficient in `(0, 1]`; lower is smoother.
    pub smooth_factor: f64,
    pub scroll_speed_factor: f64,
    /// Scroll ticks added per accumulator call at speed factor 1.0.
    pub base_scroll_amount: f64,
    pub required_hold_frames: u32,
    pub click_cooldown_s: f64,
    pub scroll_cooldown_s: f64,
    pub screenshot_cooldown_s: f64,
    /// Thumb-to-fingertip distance below which a pinch is recognized.
    pub pinch_threshold: f64,
    /// Largest pairwise fingertip distance for the all-fingers pinch.
    pub screenshot_threshold: f64,
    /// Largest horizontal thumb-tip to wrist offset for thumbs up/down.
    pub thumb_lateral_tolerance: f64,
    /// Frame delta (normalized units) below which no acceleration applies.
    pub slow_threshold: f64,
    pub accel_gain: f64,
    pub max_accel: f64,
    pub tracking_pose: TrackingPose,
    pub straight_angle_deg: f64,
    pub screenshot_mode: ScreenshotMode,
    /// Explicit screen size; queried from the display when unset.
    pub screen: Option<ScreenSize>,
    pub frame_interval_ms: u64,
    pub gaze: GazeScrollConfig,
    pub blink: BlinkPolicy,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            scaling_factor: 4.0,
            smooth_factor: 0.2,
            scroll_speed_factor: 1.0,
            base_scroll_amount: 1.0,
            required_hold_frames: 0,
            click_cooldown_s: 0.1,
            scroll_cooldown_s: 0.03,
            screenshot_cooldown_s: 2.0,
            pinch_threshold: 0.04,
            screenshot_threshold: 0.1,
            thumb_lateral_tolerance: 0.2,
            slow_threshold: 0.003,
            accel_gain: 40.0,
            max_accel: 4.0,
            tracking_pose: TrackingPose::default(),
            straight_angle_deg: 175.0,
            screenshot_mode: ScreenshotMode::default(),
            screen: None,
            frame_interval_ms: 33,
            gaze: GazeScrollConfig::default(),
            blink: BlinkPolicy::default(),
        }
    }
}

impl ControlSettings {
    /// Reads a settings file. Missing fields take their defaults; the result
    /// is validated before it is returned.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings: ControlSettings =
            serde_json::from_str(&raw).map_err(|e| SettingsError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        settings.validate()?;
        log::info!("load_settings: path={}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        check_range("scalingFactor", self.scaling_factor, 0.1, 10.0)?;
        check_positive_max("smoothFactor", self.smooth_factor, 1.0)?;
        check_range("scrollSpeedFactor", self.scroll_speed_factor, 0.05, 10.0)?;
        check_positive_max("baseScrollAmount", self.base_scroll_amount, 100.0)?;
        if self.required_hold_frames > MAX_HOLD_FRAMES {
            return Err(SettingsError::HoldFrames(self.required_hold_frames));
        }
        check_range("clickCooldownS", self.click_cooldown_s, 0.0, 60.0)?;
        check_range("scrollCooldownS", self.scroll_cooldown_s, 0.0, 60.0)?;
        check_range("screenshotCooldownS", self.screenshot_cooldown_s, 0.0, 600.0)?;
        check_positive_max("pinchThreshold", self.pinch_threshold, 1.0)?;
        check_positive_max("screenshotThreshold", self.screenshot_threshold, 1.0)?;
        check_positive_max("thumbLateralTolerance", self.thumb_lateral_tolerance, 1.0)?;
        check_range("slowThreshold", self.slow_threshold, 0.0, 1.0)?;
        check_range("accelGain", self.accel_gain, 0.0, 1_000.0)?;
        check_range("maxAccel", self.max_accel, 1.0, 20.0)?;
        check_range("straightAngleDeg", self.straight_angle_deg, 90.0, 180.0)?;
        if let Some(screen) = self.screen {
            if screen.width == 0 || screen.height == 0 {
                return Err(SettingsError::ScreenSize {
                    width: screen.width,
                    height: screen.height,
                });
            }
        }
        if self.frame_interval_ms == 0 {
            return Err(SettingsError::OutOfRange {
                field: "frameIntervalMs",
                value: 0.0,
                min: 1.0,
                max: 1_000.0,
            });
        }
        self.gaze.validate()?;
        self.blink.validate()?;
        Ok(())
    }

    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            pinch_threshold: self.pinch_threshold,
            screenshot_threshold: self.screenshot_threshold,
            thumb_lateral_tolerance: self.thumb_lateral_tolerance,
            tracking_pose: self.tracking_pose,
            straight_angle_deg: self.straight_angle_deg,
        }
    }

    pub fn debounce(&self) -> DebounceConfig {
        DebounceConfig {
            required_hold_frames: self.required_hold_frames,
            click_cooldown_ms: seconds_to_ms(self.click_cooldown_s),
            screenshot_cooldown_ms: seconds_to_ms(self.screenshot_cooldown_s),
        }
    }

    pub fn motion(&self, screen: ScreenSize) -> MotionConfig {
        MotionConfig {
            scaling_factor: self.scaling_factor,
            smooth_factor: self.smooth_factor,
            slow_threshold: self.slow_threshold,
            accel_gain: self.accel_gain,
            max_accel: self.max_accel,
            screen_width: screen.width as f64,
            screen_height: screen.height as f64,
        }
    }

    pub fn scroll(&self) -> ScrollConfig {
        ScrollConfig {
            base_scroll_amount: self.base_scroll_amount,
            cooldown_ms: seconds_to_ms(self.scroll_cooldown_s),
        }
    }
}

pub(crate) fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1_000.0).round() as u64
}

pub(crate) fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), SettingsError> {
    if !value.is_finite() {
        return Err(SettingsError::NotFinite { field, value });
    }
    if value < min || value > max {
        return Err(SettingsError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// `value` in `(0, max]`.
pub(crate) fn check_positive_max(
    field: &'static str,
    value: f64,
    max: f64,
) -> Result<(), SettingsError> {
    check_range(field, value, 0.0, max)?;
    if value <= 0.0 {
        return Err(SettingsError::OutOfRange {
            field,
            value,
            min: f64::EPSILON,
            max,
        });
    }
    Ok(())
}
