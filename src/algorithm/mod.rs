pub mod blink;
pub mod calibration;
pub mod debounce;
pub mod eye_scroll;
pub mod geometry;
pub mod gestures;
pub mod pointer_motion;
pub mod scroll;
