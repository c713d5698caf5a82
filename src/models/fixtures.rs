//! Synthetic hand and face poses for tests.

use crate::models::landmarks::{
    EyeLandmarks, FaceLandmarks, Finger, HandJoint, HandLandmarks, Landmark, HAND_JOINT_COUNT,
};

fn p(x: f64, y: f64) -> Landmark {
    Landmark::new(x, y)
}

/// Palm facing the camera, every digit extended upwards and spread apart.
pub fn open_hand() -> HandLandmarks {
    let mut hand = HandLandmarks::new([Landmark::default(); HAND_JOINT_COUNT]);
    hand.set(HandJoint::Wrist, p(0.50, 0.90));
    set_finger(&mut hand, Finger::Thumb, [(0.42, 0.85), (0.37, 0.78), (0.33, 0.72), (0.30, 0.66)]);
    set_finger(&mut hand, Finger::Index, [(0.42, 0.60), (0.42, 0.50), (0.42, 0.43), (0.42, 0.37)]);
    set_finger(&mut hand, Finger::Middle, [(0.50, 0.58), (0.50, 0.47), (0.50, 0.40), (0.50, 0.33)]);
    set_finger(&mut hand, Finger::Ring, [(0.57, 0.60), (0.57, 0.50), (0.57, 0.44), (0.57, 0.39)]);
    set_finger(&mut hand, Finger::Pinky, [(0.63, 0.64), (0.63, 0.56), (0.63, 0.51), (0.63, 0.47)]);
    hand
}

/// Index extended in a straight line, the other four digits curled.
pub fn index_pointing() -> HandLandmarks {
    let mut hand = open_hand();
    fold(&mut hand, Finger::Middle);
    fold(&mut hand, Finger::Ring);
    fold(&mut hand, Finger::Pinky);
    set_finger(&mut hand, Finger::Thumb, [(0.42, 0.85), (0.37, 0.78), (0.40, 0.72), (0.45, 0.75)]);
    hand
}

/// Fist with the thumb pointing straight up, close to the wrist column.
pub fn thumbs_up() -> HandLandmarks {
    let mut hand = open_hand();
    hand.set(HandJoint::Wrist, p(0.50, 0.80));
    set_finger(&mut hand, Finger::Thumb, [(0.45, 0.65), (0.42, 0.56), (0.44, 0.48), (0.45, 0.40)]);
    for finger in [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky] {
        fold(&mut hand, finger);
    }
    hand
}

/// Mirror of [`thumbs_up`]: thumb pointing down.
pub fn thumbs_down() -> HandLandmarks {
    let mut hand = open_hand();
    hand.set(HandJoint::Wrist, p(0.50, 0.40));
    set_finger(&mut hand, Finger::Index, [(0.42, 0.50), (0.44, 0.45), (0.44, 0.50), (0.43, 0.55)]);
    set_finger(&mut hand, Finger::Middle, [(0.50, 0.50), (0.52, 0.45), (0.52, 0.50), (0.51, 0.55)]);
    set_finger(&mut hand, Finger::Ring, [(0.57, 0.50), (0.59, 0.45), (0.59, 0.50), (0.58, 0.55)]);
    set_finger(&mut hand, Finger::Pinky, [(0.63, 0.52), (0.65, 0.48), (0.65, 0.52), (0.64, 0.56)]);
    set_finger(&mut hand, Finger::Thumb, [(0.45, 0.55), (0.44, 0.62), (0.45, 0.70), (0.46, 0.78)]);
    hand
}

/// Thumbs-up whose curled index tip rests against the thumb tip, so the
/// left-click pinch test also passes.
pub fn thumbs_up_touching_index() -> HandLandmarks {
    let mut hand = thumbs_up();
    set_finger(&mut hand, Finger::Index, [(0.47, 0.36), (0.52, 0.33), (0.50, 0.38), (0.46, 0.41)]);
    hand
}

/// Open hand with the thumb tip touching the index tip.
pub fn left_pinch() -> HandLandmarks {
    let mut hand = open_hand();
    hand.set(HandJoint::ThumbTip, p(0.43, 0.38));
    hand
}

/// Open hand with the thumb tip touching the middle tip.
pub fn right_pinch() -> HandLandmarks {
    let mut hand = open_hand();
    hand.set(HandJoint::ThumbIp, p(0.40, 0.45));
    hand.set(HandJoint::ThumbTip, p(0.49, 0.34));
    hand
}

/// All five fingertips bunched together, but not touching closely enough for
/// either pinch click.
pub fn fingertips_bunched() -> HandLandmarks {
    let mut hand = open_hand();
    hand.set(HandJoint::ThumbIp, p(0.44, 0.52));
    hand.set(HandJoint::ThumbTip, p(0.50, 0.45));
    hand.set(HandJoint::IndexFingerTip, p(0.45, 0.40));
    hand.set(HandJoint::MiddleFingerTip, p(0.50, 0.37));
    hand.set(HandJoint::RingFingerTip, p(0.54, 0.40));
    hand.set(HandJoint::PinkyTip, p(0.53, 0.45));
    hand
}

/// Every joint shifted by `(dx, dy)`.
pub fn translated(hand: &HandLandmarks, dx: f64, dy: f64) -> HandLandmarks {
    let mut moved = *hand;
    for point in moved.0.iter_mut() {
        point.x += dx;
        point.y += dy;
    }
    moved
}

fn set_finger(hand: &mut HandLandmarks, finger: Finger, points: [(f64, f64); 4]) {
    for (joint, (x, y)) in finger.joints().into_iter().zip(points) {
        hand.set(joint, p(x, y));
    }
}

/// Curls a non-thumb digit so its tip ends below the knuckle.
fn fold(hand: &mut HandLandmarks, finger: Finger) {
    let [mcp, _, _, _] = finger.joints();
    let base = hand.get(mcp);
    set_finger(
        hand,
        finger,
        [
            (base.x, base.y),
            (base.x + 0.02, base.y - 0.04),
            (base.x + 0.02, base.y + 0.01),
            (base.x + 0.01, base.y + 0.05),
        ],
    );
}

/// Eye contour whose corner sits at `ratio` between the lids (0 = upper lid).
pub fn eye(center_x: f64, height: f64, ratio: f64) -> EyeLandmarks {
    let top = 0.40;
    let bottom = top + height;
    let corner_y = top + height * ratio;
    EyeLandmarks([
        p(center_x - 0.03, corner_y),
        p(center_x - 0.01, top),
        p(center_x + 0.01, top),
        p(center_x + 0.03, top + height / 2.0),
        p(center_x + 0.01, bottom),
        p(center_x - 0.01, bottom),
    ])
}

pub fn face(eye_height: f64, ratio: f64) -> FaceLandmarks {
    FaceLandmarks {
        left_eye: eye(0.40, eye_height, ratio),
        right_eye: eye(0.60, eye_height, ratio),
    }
}
