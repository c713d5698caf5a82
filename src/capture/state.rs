//! Active tracking-session state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::algorithm::blink::BlinkDetector;
use crate::algorithm::calibration::CalibrationThresholds;
use crate::algorithm::debounce::GestureState;
use crate::algorithm::eye_scroll::GazeScroller;
use crate::algorithm::gestures::Gesture;
use crate::algorithm::pointer_motion::MotionController;
use crate::algorithm::scroll::ScrollAccumulator;
use crate::models::settings::{ControlSettings, ScreenSize};

/// What the control panel shows for the latest frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", content = "gesture", rename_all = "camelCase")]
pub enum TrackingStatus {
    #[default]
    Stopped,
    HandNotDetected,
    /// Tracking pose held; the pointer follows the index tip.
    Tracking,
    /// Hand visible but in no recognized pose.
    Paused,
    Gesture(Gesture),
}

impl TrackingStatus {
    pub fn label(&self) -> String {
        match self {
            TrackingStatus::Stopped => "Gesture: None".to_string(),
            TrackingStatus::HandNotDetected => "Gesture: Hand not detected".to_string(),
            TrackingStatus::Tracking => format!("Tracking: {}", Gesture::TrackingEnable.label()),
            TrackingStatus::Paused => "Gesture: Index Finger Folded".to_string(),
            TrackingStatus::Gesture(gesture) => format!("Gesture: {}", gesture.label()),
        }
    }
}

/// Data for one active tracking session. Created at start, mutated once per
/// frame, dropped at stop.
pub struct TrackingSession {
    pub session_id: String,
    pub settings: ControlSettings,
    pub screen: ScreenSize,
    /// Frame timestamp of the first processed frame.
    pub start_ts: Option<u64>,
    pub frames: u64,
    pub motion: MotionController,
    pub gestures: GestureState,
    pub scroll: ScrollAccumulator,
    pub gaze: GazeScroller,
    pub gaze_scroll: ScrollAccumulator,
    pub blink: BlinkDetector,
    pub hand_present: bool,
    pub status: TrackingStatus,
}

impl TrackingSession {
    pub fn new(
        settings: ControlSettings,
        screen: ScreenSize,
        thresholds: CalibrationThresholds,
    ) -> Self {
        let gaze = GazeScroller::new(settings.gaze.clone(), thresholds);
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            settings,
            screen,
            start_ts: None,
            frames: 0,
            motion: MotionController::new(),
            gestures: GestureState::default(),
            scroll: ScrollAccumulator::new(),
            gaze,
            gaze_scroll: ScrollAccumulator::new(),
            blink: BlinkDetector::new(),
            hand_present: false,
            status: TrackingStatus::Paused,
        }
    }

    /// Clears every piece of per-frame state while keeping settings.
    pub fn reset(&mut self) {
        self.motion.reset();
        self.gestures = GestureState::default();
        self.scroll.reset();
        self.gaze.reset();
        self.gaze_scroll.reset();
        self.blink.reset();
        self.hand_present = false;
    }
}

/// Shared handle to the (at most one) running session.
#[derive(Clone)]
pub struct TrackingState(pub Arc<Mutex<Option<TrackingSession>>>);

impl TrackingState {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(None)))
    }
}

impl Default for TrackingState {
    fn default() -> Self {
        Self::new()
    }
}
