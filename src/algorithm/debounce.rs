//! Hold/cooldown state machine between the classifier and the action
//! dispatchers.
//!
//! The state is a plain value: [`step`] takes the previous [`GestureState`]
//! and returns the next one together with the gesture to fire, if any. The
//! pipeline owns the value and nothing else mutates it.

use std::collections::HashMap;

use super::gestures::{Gesture, GestureClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Consecutive frames a gesture must be seen before it fires. `0` and `1`
    /// both fire on the first frame.
    pub required_hold_frames: u32,
    pub click_cooldown_ms: u64,
    pub screenshot_cooldown_ms: u64,
}

impl DebounceConfig {
    /// Scroll gestures have none here; their rate is gated by the
    /// [`ScrollAccumulator`](super::scroll::ScrollAccumulator).
    pub fn cooldown_ms(&self, gesture: Gesture) -> u64 {
        match gesture {
            Gesture::Screenshot => self.screenshot_cooldown_ms,
            Gesture::LeftClick | Gesture::RightClick => self.click_cooldown_ms,
            Gesture::ScrollUp | Gesture::ScrollDown | Gesture::TrackingEnable => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureState {
    pub current: Option<Gesture>,
    /// Consecutive frames `current` has been observed, this frame included.
    pub hold_count: u32,
    pub last_fire_ms: HashMap<Gesture, u64>,
    /// Set once a click-class gesture fires; cleared when the classification
    /// changes.
    pub latched: bool,
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }
}

/// Advances the state machine by one frame.
pub fn step(
    state: GestureState,
    observed: Option<Gesture>,
    now_ms: u64,
    config: &DebounceConfig,
) -> (GestureState, Option<Gesture>) {
    let mut next = state;

    if observed != next.current {
        next.current = observed;
        next.hold_count = 0;
        next.latched = false;
    }

    let Some(gesture) = next.current else {
        return (next, None);
    };

    next.hold_count = next.hold_count.saturating_add(1);
    if next.hold_count < config.required_hold_frames.max(1) {
        return (next, None);
    }

    match gesture.class() {
        GestureClass::Pointer => return (next, None),
        GestureClass::Click if next.latched => return (next, None),
        GestureClass::Click | GestureClass::Scroll => {}
    }

    if let Some(last) = next.last_fire_ms.get(&gesture) {
        if now_ms.saturating_sub(*last) < config.cooldown_ms(gesture) {
            return (next, None);
        }
    }

    next.last_fire_ms.insert(gesture, now_ms);
    if gesture.class() == GestureClass::Click {
        next.latched = true;
    }
    log::debug!(
        "debounce_step: fired gesture={:?} hold_count={} ts={}",
        gesture,
        next.hold_count,
        now_ms
    );
    (next, Some(gesture))
}
