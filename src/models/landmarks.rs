//! Landmark sets produced by the external pose/face model, one per frame.
//!
//! Coordinates are normalized to the image: `x` and `y` in `[0, 1]`, `y`
//! growing downwards. `z` is whatever relative depth the model supplies.

use std::ops::Index;

use serde::{Deserialize, Serialize};

pub const HAND_JOINT_COUNT: usize = 21;
pub const EYE_JOINT_COUNT: usize = 6;

/// One normalized point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Hand joints in the order the hand model emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist = 0,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl HandJoint {
    pub const ALL: [HandJoint; HAND_JOINT_COUNT] = [
        HandJoint::Wrist,
        HandJoint::ThumbCmc,
        HandJoint::ThumbMcp,
        HandJoint::ThumbIp,
        HandJoint::ThumbTip,
        HandJoint::IndexFingerMcp,
        HandJoint::IndexFingerPip,
        HandJoint::IndexFingerDip,
        HandJoint::IndexFingerTip,
        HandJoint::MiddleFingerMcp,
        HandJoint::MiddleFingerPip,
        HandJoint::MiddleFingerDip,
        HandJoint::MiddleFingerTip,
        HandJoint::RingFingerMcp,
        HandJoint::RingFingerPip,
        HandJoint::RingFingerDip,
        HandJoint::RingFingerTip,
        HandJoint::PinkyMcp,
        HandJoint::PinkyPip,
        HandJoint::PinkyDip,
        HandJoint::PinkyTip,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The five digits, each described by its four joints from the palm out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// `[base, second, third, tip]`. For the thumb that is CMC, MCP, IP, TIP;
    /// for the other digits MCP, PIP, DIP, TIP.
    pub fn joints(self) -> [HandJoint; 4] {
        match self {
            Finger::Thumb => [
                HandJoint::ThumbCmc,
                HandJoint::ThumbMcp,
                HandJoint::ThumbIp,
                HandJoint::ThumbTip,
            ],
            Finger::Index => [
                HandJoint::IndexFingerMcp,
                HandJoint::IndexFingerPip,
                HandJoint::IndexFingerDip,
                HandJoint::IndexFingerTip,
            ],
            Finger::Middle => [
                HandJoint::MiddleFingerMcp,
                HandJoint::MiddleFingerPip,
                HandJoint::MiddleFingerDip,
                HandJoint::MiddleFingerTip,
            ],
            Finger::Ring => [
                HandJoint::RingFingerMcp,
                HandJoint::RingFingerPip,
                HandJoint::RingFingerDip,
                HandJoint::RingFingerTip,
            ],
            Finger::Pinky => [
                HandJoint::PinkyMcp,
                HandJoint::PinkyPip,
                HandJoint::PinkyDip,
                HandJoint::PinkyTip,
            ],
        }
    }

    pub fn tip(self) -> HandJoint {
        self.joints()[3]
    }

    /// Joint the tip is compared against for the raised test: the IP joint
    /// for the thumb, the knuckle (MCP) for every other digit.
    pub fn raise_reference(self) -> HandJoint {
        match self {
            Finger::Thumb => HandJoint::ThumbIp,
            other => other.joints()[0],
        }
    }
}

/// All 21 joints of one detected hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks(pub [Landmark; HAND_JOINT_COUNT]);

impl HandLandmarks {
    pub fn new(points: [Landmark; HAND_JOINT_COUNT]) -> Self {
        Self(points)
    }

    pub fn get(&self, joint: HandJoint) -> Landmark {
        self.0[joint.index()]
    }

    pub fn set(&mut self, joint: HandJoint, point: Landmark) {
        self.0[joint.index()] = point;
    }

    pub fn fingertips(&self) -> [Landmark; 5] {
        Finger::ALL.map(|finger| self.get(finger.tip()))
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(Landmark::is_finite)
    }
}

impl Index<HandJoint> for HandLandmarks {
    type Output = Landmark;

    fn index(&self, joint: HandJoint) -> &Self::Output {
        &self.0[joint.index()]
    }
}

/// Eye-contour points in the order the face model's eye subsets list them:
/// outer corner, two upper-lid points, inner corner, two lower-lid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EyeJoint {
    Corner = 0,
    UpperLidOuter,
    UpperLidInner,
    InnerCorner,
    LowerLidInner,
    LowerLidOuter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EyeLandmarks(pub [Landmark; EYE_JOINT_COUNT]);

impl EyeLandmarks {
    pub fn get(&self, joint: EyeJoint) -> Landmark {
        self.0[joint as usize]
    }

    /// Lid opening measured between the upper and lower lid samples.
    pub fn height(&self) -> f64 {
        self.get(EyeJoint::LowerLidInner).y - self.get(EyeJoint::UpperLidOuter).y
    }
}

impl Index<EyeJoint> for EyeLandmarks {
    type Output = Landmark;

    fn index(&self, joint: EyeJoint) -> &Self::Output {
        &self.0[joint as usize]
    }
}

/// Eye regions of one detected face. The two corner points that bound the
/// face span are `left_eye[Corner]` and `right_eye[InnerCorner]`, matching the
/// face model's index layout for the right-eye subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceLandmarks {
    pub left_eye: EyeLandmarks,
    pub right_eye: EyeLandmarks,
}

impl FaceLandmarks {
    pub fn outer_corners(&self) -> (Landmark, Landmark) {
        (
            self.left_eye.get(EyeJoint::Corner),
            self.right_eye.get(EyeJoint::InnerCorner),
        )
    }
}

/// One line of the landmark stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkFrame {
    /// Milliseconds on the source clock.
    pub ts: u64,
    #[serde(default)]
    pub hand: Option<HandLandmarks>,
    #[serde(default)]
    pub face: Option<FaceLandmarks>,
}
