//! Control-surface commands for tracking sessions.
//!
//! Every command validates its input here, at the boundary, and reports
//! failures as display strings. The per-frame path never sees an invalid
//! value.

use crate::algorithm::calibration::CalibrationThresholds;
use crate::capture::pipeline::{self, FrameReport};
use crate::capture::state::{TrackingSession, TrackingState, TrackingStatus};
use crate::models::landmarks::LandmarkFrame;
use crate::models::settings::{ControlSettings, ScreenSize};
use crate::telemetry::logger::InputSink;

pub async fn start_tracking(
    state: &TrackingState,
    settings: ControlSettings,
    screen: ScreenSize,
    thresholds: CalibrationThresholds,
) -> Result<String, String> {
    let mut guard = state.0.lock().await;
    if guard.is_some() {
        return Err("Tracking already in progress".to_string());
    }

    settings
        .validate()
        .map_err(|e| format!("Invalid settings: {e}"))?;
    if screen.width == 0 || screen.height == 0 {
        return Err(format!(
            "Invalid screen size: {}x{}",
            screen.width, screen.height
        ));
    }

    let session = TrackingSession::new(settings, screen, thresholds);
    let session_id = session.session_id.clone();
    log::info!(
        "start_tracking: session={session_id} screen={}x{} pose={:?}",
        screen.width,
        screen.height,
        session.settings.tracking_pose
    );
    *guard = Some(session);
    Ok(session_id)
}

/// Ends the session and drops all of its motion, gesture and scroll state.
/// Returns the number of frames processed.
pub async fn stop_tracking(state: &TrackingState, session_id: &str) -> Result<u64, String> {
    let mut guard = state.0.lock().await;
    let active = guard.as_ref().ok_or("No active tracking session")?;
    if active.session_id != session_id {
        return Err(format!(
            "Session ID mismatch: active={}, requested={session_id}",
            active.session_id
        ));
    }

    let Some(mut session) = guard.take() else {
        return Err("No active tracking session".to_string());
    };
    session.reset();
    log::info!(
        "stop_tracking: session={session_id} frames={}",
        session.frames
    );
    Ok(session.frames)
}

pub async fn tracking_status(state: &TrackingState) -> TrackingStatus {
    state
        .0
        .lock()
        .await
        .as_ref()
        .map(|session| session.status)
        .unwrap_or(TrackingStatus::Stopped)
}

/// Runs one frame through the active session, if any.
pub async fn process_tick(
    state: &TrackingState,
    frame: &LandmarkFrame,
    sink: &mut dyn InputSink,
) -> Option<FrameReport> {
    let mut guard = state.0.lock().await;
    let session = guard.as_mut()?;
    Some(pipeline::process_frame(session, frame, sink))
}

/// Applies a settings change to the running session after validating the
/// full result. Per-frame state is left untouched.
async fn update_settings(
    state: &TrackingState,
    command: &str,
    apply: impl FnOnce(&mut ControlSettings),
) -> Result<(), String> {
    let mut guard = state.0.lock().await;
    let session = guard.as_mut().ok_or("No active tracking session")?;

    let mut candidate = session.settings.clone();
    apply(&mut candidate);
    candidate
        .validate()
        .map_err(|e| format!("{command}: {e}"))?;
    session.settings = candidate;
    log::info!("{command}: session={}", session.session_id);
    Ok(())
}

pub async fn update_sensitivity(state: &TrackingState, scaling_factor: f64) -> Result<(), String> {
    update_settings(state, "update_sensitivity", |s| s.scaling_factor = scaling_factor).await
}

pub async fn update_smoothness(state: &TrackingState, smooth_factor: f64) -> Result<(), String> {
    update_settings(state, "update_smoothness", |s| s.smooth_factor = smooth_factor).await
}

pub async fn update_scroll_speed(
    state: &TrackingState,
    scroll_speed_factor: f64,
) -> Result<(), String> {
    update_settings(state, "update_scroll_speed", |s| {
        s.scroll_speed_factor = scroll_speed_factor
    })
    .await
}

pub async fn update_hold_frames(state: &TrackingState, frames: u32) -> Result<(), String> {
    update_settings(state, "update_hold_frames", |s| s.required_hold_frames = frames).await
}
