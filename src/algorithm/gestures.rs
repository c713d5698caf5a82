//! Geometric gesture classifiers.
//!
//! The bank is evaluated in a fixed priority order and the first match wins,
//! so at most one gesture is reported per frame. Thumb-based scroll poses go
//! first: a completed thumbs-up can also satisfy a loose pinch test.

use serde::{Deserialize, Serialize};

use super::geometry::{distance, is_raised, is_straight};
use crate::models::landmarks::{Finger, HandJoint, HandLandmarks};
use crate::models::settings::TrackingPose;

/// Recognized hand gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gesture {
    /// Thumbs up.
    ScrollUp,
    /// Thumbs down.
    ScrollDown,
    /// Thumb tip on index tip.
    LeftClick,
    /// Thumb tip on middle tip.
    RightClick,
    /// All five fingertips bunched together.
    Screenshot,
    /// Index finger alone extended; drives the pointer.
    TrackingEnable,
}

/// How the debounce state machine treats a gesture once it has been held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureClass {
    /// Fires once per acquisition.
    Click,
    /// Fires every frame while held, rate limited by cooldown.
    Scroll,
    /// Never fires an action.
    Pointer,
}

impl Gesture {
    /// Priority order of the classifier bank.
    pub const PRIORITY: [Gesture; 6] = [
        Gesture::ScrollUp,
        Gesture::ScrollDown,
        Gesture::LeftClick,
        Gesture::RightClick,
        Gesture::Screenshot,
        Gesture::TrackingEnable,
    ];

    pub fn class(self) -> GestureClass {
        match self {
            Gesture::LeftClick | Gesture::RightClick | Gesture::Screenshot => GestureClass::Click,
            Gesture::ScrollUp | Gesture::ScrollDown => GestureClass::Scroll,
            Gesture::TrackingEnable => GestureClass::Pointer,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gesture::ScrollUp => "Scroll Up",
            Gesture::ScrollDown => "Scroll Down",
            Gesture::LeftClick => "Left Click",
            Gesture::RightClick => "Right Click",
            Gesture::Screenshot => "Screenshot",
            Gesture::TrackingEnable => "Index Finger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    pub pinch_threshold: f64,
    pub screenshot_threshold: f64,
    pub thumb_lateral_tolerance: f64,
    pub tracking_pose: TrackingPose,
    pub straight_angle_deg: f64,
}

/// Runs the bank in priority order.
pub fn classify(hand: &HandLandmarks, config: &ClassifierConfig) -> Option<Gesture> {
    Gesture::PRIORITY
        .into_iter()
        .find(|gesture| matches_gesture(*gesture, hand, config))
}

/// Evaluates a single predicate of the bank, ignoring priority.
pub fn matches_gesture(gesture: Gesture, hand: &HandLandmarks, config: &ClassifierConfig) -> bool {
    match gesture {
        Gesture::ScrollUp => is_thumbs_up(hand, config.thumb_lateral_tolerance),
        Gesture::ScrollDown => is_thumbs_down(hand, config.thumb_lateral_tolerance),
        Gesture::LeftClick => is_pinch(hand, HandJoint::IndexFingerTip, config.pinch_threshold),
        Gesture::RightClick => is_pinch(hand, HandJoint::MiddleFingerTip, config.pinch_threshold),
        Gesture::Screenshot => is_fingertips_bunched(hand, config.screenshot_threshold),
        Gesture::TrackingEnable => match config.tracking_pose {
            TrackingPose::IndexRaised => is_index_only(hand),
            TrackingPose::IndexStraight => is_index_only_straight(hand, config.straight_angle_deg),
        },
    }
}

pub fn is_thumbs_up(hand: &HandLandmarks, lateral_tolerance: f64) -> bool {
    let tip = hand[HandJoint::ThumbTip];
    let ip = hand[HandJoint::ThumbIp];
    let mcp = hand[HandJoint::ThumbMcp];

    tip.y < ip.y && ip.y < mcp.y && fingers_curled(hand) && thumb_near_wrist(hand, lateral_tolerance)
}

pub fn is_thumbs_down(hand: &HandLandmarks, lateral_tolerance: f64) -> bool {
    let tip = hand[HandJoint::ThumbTip];
    let ip = hand[HandJoint::ThumbIp];
    let mcp = hand[HandJoint::ThumbMcp];

    tip.y > ip.y && ip.y > mcp.y && fingers_curled(hand) && thumb_near_wrist(hand, lateral_tolerance)
}

/// Thumb tip within `threshold` of the given fingertip.
pub fn is_pinch(hand: &HandLandmarks, fingertip: HandJoint, threshold: f64) -> bool {
    distance(hand[HandJoint::ThumbTip], hand[fingertip]) < threshold
}

/// Every pairwise fingertip distance below `threshold`.
pub fn is_fingertips_bunched(hand: &HandLandmarks, threshold: f64) -> bool {
    let tips = hand.fingertips();
    for (i, a) in tips.iter().enumerate() {
        for b in &tips[i + 1..] {
            if distance(*a, *b) >= threshold {
                return false;
            }
        }
    }
    true
}

/// Index raised, thumb and the other three digits down.
pub fn is_index_only(hand: &HandLandmarks) -> bool {
    finger_raised(hand, Finger::Index) && others_down(hand)
}

/// Stricter tracking pose: the index must be straight, not merely raised.
pub fn is_index_only_straight(hand: &HandLandmarks, min_angle_deg: f64) -> bool {
    let [mcp, pip, dip, tip] = Finger::Index.joints();
    is_straight(hand[tip], hand[dip], hand[pip], hand[mcp], min_angle_deg) && others_down(hand)
}

pub fn finger_raised(hand: &HandLandmarks, finger: Finger) -> bool {
    is_raised(hand[finger.tip()], hand[finger.raise_reference()])
}

fn others_down(hand: &HandLandmarks) -> bool {
    [Finger::Thumb, Finger::Middle, Finger::Ring, Finger::Pinky]
        .into_iter()
        .all(|finger| !finger_raised(hand, finger))
}

/// Four non-thumb tips below their knuckles.
fn fingers_curled(hand: &HandLandmarks) -> bool {
    [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky]
        .into_iter()
        .all(|finger| hand[finger.tip()].y > hand[finger.joints()[0]].y)
}

/// Rejects a sideways thumb being read as up/down.
fn thumb_near_wrist(hand: &HandLandmarks, tolerance: f64) -> bool {
    (hand[HandJoint::ThumbTip].x - hand[HandJoint::Wrist].x).abs() < tolerance
}
