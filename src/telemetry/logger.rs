//! Device input sink.
//!
//! The pipeline never talks to the OS directly: every action is an
//! [`InputEvent`] handed to an [`InputSink`].
//!
//!   1. [`RdevSink`] injects events through `rdev::simulate`. A single
//!      `airflick-rdev-hook` thread runs `rdev::listen` for the lifetime of
//!      the process and keeps the last known cursor position, since the
//!      pointer is driven relative to wherever the cursor really is.
//!   2. [`RecordingSink`] keeps events in memory. Used for dry runs and tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;

use crate::models::events::{InputEvent, MouseButton, ScrollDelta};
use crate::telemetry::screenshot;

/// Pause between synthetic key events; some platforms drop events sent
/// back-to-back.
const KEY_EVENT_GAP: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("input simulation rejected {0}")]
    Simulate(String),
    #[error("unknown key name {0}")]
    UnknownKey(String),
    #[error("screenshot capture failed: {0}")]
    Screenshot(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub trait InputSink {
    /// Last known cursor position in screen pixels.
    fn cursor_position(&self) -> (f64, f64);

    fn dispatch(&mut self, event: &InputEvent) -> Result<(), SinkError>;
}

fn lock_pos(pos: &Mutex<(f64, f64)>) -> MutexGuard<'_, (f64, f64)> {
    match pos.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ─── rdev ─────────────────────────────────────────────────────────────────────

pub struct RdevSink {
    last_pos: Arc<Mutex<(f64, f64)>>,
}

impl RdevSink {
    /// Creates the sink and starts the cursor hook thread. `initial` is used
    /// until the hook reports the first real mouse move.
    pub fn start(initial: (f64, f64)) -> Result<Self, SinkError> {
        let last_pos = Arc::new(Mutex::new(initial));
        let hook_pos = Arc::clone(&last_pos);
        std::thread::Builder::new()
            .name("airflick-rdev-hook".to_string())
            .spawn(move || {
                if let Err(e) = rdev::listen(move |event| {
                    if let rdev::EventType::MouseMove { x, y } = event.event_type {
                        *lock_pos(&hook_pos) = (x, y);
                    }
                }) {
                    log::error!("rdev::listen error: {e:?}");
                }
            })?;
        Ok(Self { last_pos })
    }

    fn simulate(event_type: &rdev::EventType) -> Result<(), SinkError> {
        rdev::simulate(event_type).map_err(|_| SinkError::Simulate(format!("{event_type:?}")))
    }
}

impl InputSink for RdevSink {
    fn cursor_position(&self) -> (f64, f64) {
        *lock_pos(&self.last_pos)
    }

    fn dispatch(&mut self, event: &InputEvent) -> Result<(), SinkError> {
        match event {
            InputEvent::Move { x, y, .. } => {
                Self::simulate(&rdev::EventType::MouseMove { x: *x, y: *y })?;
                *lock_pos(&self.last_pos) = (*x, *y);
            }
            InputEvent::Click { button, .. } => {
                let button = rdev_button(*button);
                Self::simulate(&rdev::EventType::ButtonPress(button))?;
                Self::simulate(&rdev::EventType::ButtonRelease(button))?;
            }
            InputEvent::Scroll { delta, .. } => {
                Self::simulate(&rdev::EventType::Wheel {
                    delta_x: delta.dx,
                    delta_y: delta.dy,
                })?;
            }
            InputEvent::Hotkey { key_codes, .. } => {
                let keys = key_codes
                    .iter()
                    .map(|name| {
                        screenshot::key_from_name(name)
                            .ok_or_else(|| SinkError::UnknownKey(name.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                spawn_hotkey(keys)?;
            }
            InputEvent::Screenshot { path, .. } => {
                let path = PathBuf::from(path);
                std::thread::Builder::new()
                    .name("airflick-screenshot".to_string())
                    .spawn(move || {
                        if let Err(e) = screenshot::capture_desktop(&path) {
                            log::warn!("save_screenshot: {e}");
                        } else {
                            log::info!("save_screenshot: path={}", path.display());
                        }
                    })?;
            }
        }
        Ok(())
    }
}

/// Presses the chord in order and releases it in reverse on a short-lived
/// thread so the frame loop never waits on the key gaps.
fn spawn_hotkey(keys: Vec<rdev::Key>) -> Result<(), SinkError> {
    std::thread::Builder::new()
        .name("airflick-hotkey".to_string())
        .spawn(move || {
            let presses = keys.iter().map(|key| rdev::EventType::KeyPress(*key));
            let releases = keys.iter().rev().map(|key| rdev::EventType::KeyRelease(*key));
            for event_type in presses.chain(releases) {
                if let Err(e) = RdevSink::simulate(&event_type) {
                    log::warn!("send_hotkey: {e}");
                    return;
                }
                std::thread::sleep(KEY_EVENT_GAP);
            }
        })?;
    Ok(())
}

fn rdev_button(button: MouseButton) -> rdev::Button {
    match button {
        MouseButton::Left => rdev::Button::Left,
        MouseButton::Right => rdev::Button::Right,
        MouseButton::Middle => rdev::Button::Middle,
    }
}

// ─── In-memory ────────────────────────────────────────────────────────────────

/// Records dispatched events and moves a virtual cursor.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<InputEvent>,
    cursor: (f64, f64),
    /// Reject every `Move`, standing in for an OS fail-safe.
    pub reject_moves: bool,
}

impl RecordingSink {
    pub fn new(cursor: (f64, f64)) -> Self {
        Self {
            cursor,
            ..Self::default()
        }
    }

    pub fn moves(&self) -> impl Iterator<Item = (u64, f64, f64)> + '_ {
        self.events.iter().filter_map(|event| match event {
            InputEvent::Move { ts, x, y } => Some((*ts, *x, *y)),
            _ => None,
        })
    }

    pub fn scroll_total(&self) -> ScrollDelta {
        self.events.iter().fold(ScrollDelta { dx: 0, dy: 0 }, |acc, event| match event {
            InputEvent::Scroll { delta, .. } => ScrollDelta {
                dx: acc.dx + delta.dx,
                dy: acc.dy + delta.dy,
            },
            _ => acc,
        })
    }
}

impl InputSink for RecordingSink {
    fn cursor_position(&self) -> (f64, f64) {
        self.cursor
    }

    fn dispatch(&mut self, event: &InputEvent) -> Result<(), SinkError> {
        if let InputEvent::Move { x, y, .. } = event {
            if self.reject_moves {
                return Err(SinkError::Simulate(format!("move to ({x}, {y})")));
            }
            self.cursor = (*x, *y);
        }
        log::debug!("recording_sink: {event:?}");
        self.events.push(event.clone());
        Ok(())
    }
}
