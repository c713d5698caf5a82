//! Device input events emitted by the gesture pipeline.

use serde::{Deserialize, Serialize};

/// Mouse button.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Vertical scroll direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// Wheel sign: positive scrolls content up.
    pub fn sign(self) -> i64 {
        match self {
            ScrollDirection::Up => 1,
            ScrollDirection::Down => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
        }
    }
}

/// Wheel delta in whole ticks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScrollDelta {
    pub dx: i64,
    pub dy: i64,
}

/// One dispatched input action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    /// Absolute cursor move in screen pixels.
    Move {
        /// Milliseconds on the frame clock.
        ts: u64,
        x: f64,
        y: f64,
    },
    /// Press and release of a mouse button.
    Click {
        ts: u64,
        button: MouseButton,
    },
    Scroll {
        ts: u64,
        delta: ScrollDelta,
    },
    /// Key chord sent as one hotkey.
    Hotkey {
        ts: u64,
        #[serde(rename = "keyCodes", alias = "key_codes")]
        key_codes: Vec<String>,
    },
    /// Desktop capture written to disk.
    Screenshot {
        ts: u64,
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_hotkey_with_camel_case_key_codes() {
        let event = InputEvent::Hotkey {
            ts: 100,
            key_codes: vec!["PrintScreen".to_string()],
        };

        let json = serde_json::to_string(&event).expect("serialize hotkey");
        assert!(json.contains("\"type\":\"hotkey\""));
        assert!(json.contains("\"keyCodes\""));
        assert!(!json.contains("\"key_codes\""));
    }

    #[test]
    fn accepts_snake_case_key_codes_during_deserialization() {
        let raw = r#"{"type":"hotkey","ts":3,"key_codes":["MetaLeft","ShiftLeft","Num4"]}"#;
        let event: InputEvent = serde_json::from_str(raw).expect("deserialize hotkey");
        match event {
            InputEvent::Hotkey { key_codes, .. } => assert_eq!(key_codes.len(), 3),
            _ => panic!("expected hotkey event"),
        }
    }

    #[test]
    fn scroll_direction_sign_points_up_for_positive_wheel() {
        assert_eq!(ScrollDirection::Up.sign(), 1);
        assert_eq!(ScrollDirection::Down.sign(), -1);
    }
}
