//! Relative pointer motion from a tracked landmark.
//!
//! Each frame contributes the delta between the current and previous raw
//! landmark position. The delta is scaled to screen pixels, accelerated for
//! fast sweeps, damped by the smoothing factor and added to the live cursor
//! position.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub scaling_factor: f64,
    pub smooth_factor: f64,
    pub slow_threshold: f64,
    pub accel_gain: f64,
    pub max_accel: f64,
    pub screen_width: f64,
    pub screen_height: f64,
}

impl MotionConfig {
    /// Keeps a position inside `[0, width] x [0, height]`.
    pub fn clamp_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (
            clamp_axis(x, self.screen_width),
            clamp_axis(y, self.screen_height),
        )
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max.max(0.0))
}

/// Clamped linear ramp: 1.0 below `slow_threshold`, growing with speed above
/// it, never beyond `max_accel`.
pub fn acceleration(speed: f64, config: &MotionConfig) -> f64 {
    if !speed.is_finite() {
        return config.max_accel;
    }
    if speed < config.slow_threshold {
        return 1.0;
    }
    (1.0 + (speed - config.slow_threshold) * config.accel_gain).min(config.max_accel)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionController {
    previous: Option<(f64, f64)>,
}

impl MotionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<(f64, f64)> {
        self.previous
    }

    pub fn is_seeded(&self) -> bool {
        self.previous.is_some()
    }

    /// Integrates one raw landmark position.
    ///
    /// The first call after construction or [`reset`](Self::reset) only seeds
    /// the baseline and returns `None`. Later calls return the new absolute
    /// cursor position, clamped to the screen. The raw input always becomes
    /// the next baseline, whatever the caller does with the result.
    pub fn integrate(
        &mut self,
        x: f64,
        y: f64,
        cursor: (f64, f64),
        config: &MotionConfig,
    ) -> Option<(f64, f64)> {
        let Some((prev_x, prev_y)) = self.previous.replace((x, y)) else {
            return None;
        };

        let dx = x - prev_x;
        let dy = y - prev_y;
        let accel = acceleration(dx.hypot(dy), config);
        let gain_x = config.scaling_factor * config.screen_width * accel * config.smooth_factor;
        let gain_y = config.scaling_factor * config.screen_height * accel * config.smooth_factor;

        Some(config.clamp_to_screen(cursor.0 + dx * gain_x, cursor.1 + dy * gain_y))
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
