//! Fractional scroll intent to whole wheel ticks.

use crate::models::events::ScrollDirection;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollConfig {
    /// Intent added per call at speed factor 1.0.
    pub base_scroll_amount: f64,
    pub cooldown_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollAccumulator {
    accumulator: f64,
    last_direction: Option<ScrollDirection>,
    last_fire_ms: Option<u64>,
}

impl ScrollAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remainder(&self) -> f64 {
        self.accumulator
    }

    /// Adds one call's worth of intent and returns the whole ticks to
    /// dispatch. The remainder carries over to the next call in the same
    /// direction. Calls inside the cooldown window are ignored entirely and
    /// return `None`; a call past the gate returns `Some`, possibly of zero.
    pub fn tick(
        &mut self,
        direction: ScrollDirection,
        speed_factor: f64,
        now_ms: u64,
        config: &ScrollConfig,
    ) -> Option<u32> {
        if let Some(last) = self.last_fire_ms {
            if now_ms.saturating_sub(last) < config.cooldown_ms {
                return None;
            }
        }
        self.last_fire_ms = Some(now_ms);

        if self.last_direction != Some(direction) {
            self.accumulator = 0.0;
            self.last_direction = Some(direction);
        }

        let intent = config.base_scroll_amount * speed_factor;
        if intent.is_finite() && intent > 0.0 {
            self.accumulator += intent;
        }

        let ticks = self.accumulator.floor();
        if ticks < 1.0 {
            return Some(0);
        }
        self.accumulator -= ticks;
        Some(ticks.min(u32::MAX as f64) as u32)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
