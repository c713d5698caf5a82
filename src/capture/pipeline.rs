//! One pipeline pass per landmark frame.
//!
//! classify → debounce → pointer motion / scroll / click / screenshot, then
//! the optional eye channel (gaze scroll, blink). All state lives in the
//! [`TrackingSession`]; the sink is the only side effect.

use chrono::Local;
use serde::Serialize;

use super::state::{TrackingSession, TrackingStatus};
use crate::algorithm::debounce;
use crate::algorithm::gestures::{classify, Gesture};
use crate::algorithm::scroll::ScrollConfig;
use crate::models::events::{InputEvent, MouseButton, ScrollDelta, ScrollDirection};
use crate::models::landmarks::{FaceLandmarks, HandJoint, HandLandmarks, LandmarkFrame};
use crate::telemetry::logger::InputSink;
use crate::telemetry::screenshot::screenshot_event;

/// Outcome of one frame, for status display and logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub ts: u64,
    pub gesture: Option<Gesture>,
    pub fired: Option<Gesture>,
    pub status: TrackingStatus,
    /// Cursor position dispatched this frame.
    pub moved_to: Option<(f64, f64)>,
    /// Signed wheel ticks dispatched this frame, hand and gaze combined.
    pub scroll_ticks: i64,
    pub blink: bool,
}

pub fn process_frame(
    session: &mut TrackingSession,
    frame: &LandmarkFrame,
    sink: &mut dyn InputSink,
) -> FrameReport {
    let now = frame.ts;
    if session.start_ts.is_none() {
        session.start_ts = Some(now);
    }
    session.frames += 1;

    let hand = frame.hand.filter(HandLandmarks::is_finite);
    note_hand_presence(session, hand.is_some(), now);

    let gesture = hand
        .as_ref()
        .and_then(|hand| classify(hand, &session.settings.classifier()));
    let debounce_config = session.settings.debounce();
    let (next_state, fired) = debounce::step(
        std::mem::take(&mut session.gestures),
        gesture,
        now,
        &debounce_config,
    );
    session.gestures = next_state;

    let mut report = FrameReport {
        ts: now,
        gesture,
        fired,
        status: TrackingStatus::HandNotDetected,
        moved_to: None,
        scroll_ticks: 0,
        blink: false,
    };

    match (hand, gesture) {
        (Some(hand), Some(Gesture::TrackingEnable)) => {
            report.moved_to = drive_pointer(session, &hand, now, sink);
        }
        _ => session.motion.reset(),
    }

    if let Some(gesture) = fired {
        match dispatch_gesture(session, gesture, now, sink) {
            Some(ticks) => report.scroll_ticks += ticks,
            None => report.fired = None,
        }
    }

    match frame.face.as_ref() {
        Some(face) => {
            report.scroll_ticks += drive_gaze(session, face, now, sink);
        }
        None => session.gaze.reset(),
    }
    report.blink = session
        .blink
        .observe(frame.face.as_ref(), &session.settings.blink);
    if report.blink {
        log::info!("blink_detected: ts={now}");
    }

    report.status = match (hand.is_some(), report.fired.or(gesture)) {
        (false, _) => TrackingStatus::HandNotDetected,
        (true, Some(Gesture::TrackingEnable)) => TrackingStatus::Tracking,
        (true, Some(g)) => TrackingStatus::Gesture(g),
        (true, None) => TrackingStatus::Paused,
    };
    session.status = report.status;
    log::trace!("process_frame: {report:?}");
    report
}

fn note_hand_presence(session: &mut TrackingSession, present: bool, now: u64) {
    if present == session.hand_present {
        return;
    }
    session.hand_present = present;
    if present {
        log::info!("process_frame: hand detected ts={now}");
    } else {
        log::info!("process_frame: hand lost ts={now}");
    }
}

/// Integrates the index tip and moves the cursor. A rejected move is dropped;
/// the motion baseline has already advanced, so the next delta stays
/// consistent.
fn drive_pointer(
    session: &mut TrackingSession,
    hand: &HandLandmarks,
    now: u64,
    sink: &mut dyn InputSink,
) -> Option<(f64, f64)> {
    let tip = hand[HandJoint::IndexFingerTip];
    let config = session.settings.motion(session.screen);
    let (x, y) = session
        .motion
        .integrate(tip.x, tip.y, sink.cursor_position(), &config)?;

    match sink.dispatch(&InputEvent::Move { ts: now, x, y }) {
        Ok(()) => Some((x, y)),
        Err(e) => {
            log::warn!("move_cursor: sink rejected move: {e}");
            None
        }
    }
}

/// Dispatches a fired gesture; returns the signed wheel ticks sent, or `None`
/// when the scroll accumulator's cooldown gated the call.
fn dispatch_gesture(
    session: &mut TrackingSession,
    gesture: Gesture,
    now: u64,
    sink: &mut dyn InputSink,
) -> Option<i64> {
    let event = match gesture {
        Gesture::ScrollUp | Gesture::ScrollDown => {
            let direction = if gesture == Gesture::ScrollUp {
                ScrollDirection::Up
            } else {
                ScrollDirection::Down
            };
            let config = session.settings.scroll();
            let ticks = session.scroll.tick(
                direction,
                session.settings.scroll_speed_factor,
                now,
                &config,
            )?;
            return Some(send_scroll(direction, ticks, now, sink));
        }
        Gesture::LeftClick => InputEvent::Click {
            ts: now,
            button: MouseButton::Left,
        },
        Gesture::RightClick => InputEvent::Click {
            ts: now,
            button: MouseButton::Right,
        },
        Gesture::Screenshot => screenshot_event(&session.settings.screenshot_mode, now, Local::now()),
        Gesture::TrackingEnable => return Some(0),
    };

    log::info!("dispatch_gesture: gesture={gesture:?} ts={now}");
    if let Err(e) = sink.dispatch(&event) {
        log::warn!("dispatch_gesture: gesture={gesture:?} failed: {e}");
    }
    Some(0)
}

fn drive_gaze(
    session: &mut TrackingSession,
    face: &FaceLandmarks,
    now: u64,
    sink: &mut dyn InputSink,
) -> i64 {
    if !session.settings.gaze.enabled {
        return 0;
    }
    let Some(intent) = session.gaze.observe(&face.left_eye) else {
        return 0;
    };
    let config = ScrollConfig {
        base_scroll_amount: 1.0,
        cooldown_ms: session.settings.gaze.cooldown_ms,
    };
    match session
        .gaze_scroll
        .tick(intent.direction, intent.speed, now, &config)
    {
        Some(ticks) => send_scroll(intent.direction, ticks, now, sink),
        None => 0,
    }
}

fn send_scroll(direction: ScrollDirection, ticks: u32, now: u64, sink: &mut dyn InputSink) -> i64 {
    if ticks == 0 {
        return 0;
    }
    let dy = direction.sign() * i64::from(ticks);
    log::debug!("send_scroll: direction={} ticks={ticks}", direction.as_str());
    match sink.dispatch(&InputEvent::Scroll {
        ts: now,
        delta: ScrollDelta { dx: 0, dy },
    }) {
        Ok(()) => dy,
        Err(e) => {
            log::warn!("send_scroll: {e}");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::calibration::CalibrationThresholds;
    use crate::algorithm::eye_scroll::GazeScrollConfig;
    use crate::models::fixtures;
    use crate::models::settings::{ControlSettings, ScreenSize};
    use crate::telemetry::logger::RecordingSink;

    const SCREEN: ScreenSize = ScreenSize {
        width: 1920,
        height: 1080,
    };

    fn session(settings: ControlSettings) -> TrackingSession {
        TrackingSession::new(settings, SCREEN, CalibrationThresholds::default())
    }

    fn hand_frame(ts: u64, hand: HandLandmarks) -> LandmarkFrame {
        LandmarkFrame {
            ts,
            hand: Some(hand),
            face: None,
        }
    }

    #[test]
    fn index_pose_tracks_from_first_frame_and_moves_from_second() {
        let mut session = session(ControlSettings::default());
        let mut sink = RecordingSink::new((960.0, 540.0));
        let base = fixtures::index_pointing();

        let reports: Vec<FrameReport> = (0..6)
            .map(|i| {
                let hand = fixtures::translated(&base, 0.01 * i as f64, 0.0);
                process_frame(&mut session, &hand_frame(i * 33, hand), &mut sink)
            })
            .collect();

        assert!(reports.iter().all(|r| r.status == TrackingStatus::Tracking));
        assert_eq!(reports[0].moved_to, None);
        assert!(reports[1..].iter().all(|r| r.moved_to.is_some()));

        let moves: Vec<_> = sink.moves().collect();
        assert_eq!(moves.len(), 5);
        assert_eq!(moves[0].0, 33);
        assert!(moves.windows(2).all(|w| w[1].1 > w[0].1));
    }

    #[test]
    fn thumbs_up_fires_on_fifth_frame_then_at_cooldown_rate() {
        let settings = ControlSettings {
            required_hold_frames: 5,
            scroll_cooldown_s: 0.05,
            ..ControlSettings::default()
        };
        let mut session = session(settings);
        let mut sink = RecordingSink::default();

        let fired: Vec<usize> = (0..12u64)
            .filter_map(|i| {
                let report =
                    process_frame(&mut session, &hand_frame(i * 20, fixtures::thumbs_up()), &mut sink);
                report.fired.map(|_| i as usize + 1)
            })
            .collect();

        // 20 ms frames against a 50 ms cooldown: frame 5 (80 ms), then every
        // third frame.
        assert_eq!(fired, vec![5, 8, 11]);
        assert_eq!(sink.scroll_total(), ScrollDelta { dx: 0, dy: 3 });
        assert!(sink.moves().next().is_none());
    }

    #[test]
    fn gated_scroll_is_not_reported_as_fired() {
        let settings = ControlSettings {
            required_hold_frames: 1,
            ..ControlSettings::default()
        };
        let mut session = session(settings);
        let mut sink = RecordingSink::default();
        let frames = [
            (0, fixtures::thumbs_up()),
            (10, fixtures::thumbs_down()),
            (33, fixtures::thumbs_down()),
            (66, fixtures::thumbs_down()),
        ];

        let outcome: Vec<(Option<Gesture>, i64)> = frames
            .into_iter()
            .map(|(ts, hand)| {
                let report = process_frame(&mut session, &hand_frame(ts, hand), &mut sink);
                (report.fired, report.scroll_ticks)
            })
            .collect();

        // 30 ms scroll cooldown: the switch at 10 ms is gated, 33 ms is not.
        assert_eq!(
            outcome,
            vec![
                (Some(Gesture::ScrollUp), 1),
                (None, 0),
                (Some(Gesture::ScrollDown), -1),
                (Some(Gesture::ScrollDown), -1),
            ]
        );
        assert_eq!(sink.scroll_total(), ScrollDelta { dx: 0, dy: -1 });
    }

    #[test]
    fn lost_hand_resets_motion_and_reports_status() {
        let mut session = session(ControlSettings::default());
        let mut sink = RecordingSink::new((960.0, 540.0));
        let hand = fixtures::index_pointing();

        process_frame(&mut session, &hand_frame(0, hand), &mut sink);
        let lost = process_frame(
            &mut session,
            &LandmarkFrame {
                ts: 33,
                hand: None,
                face: None,
            },
            &mut sink,
        );
        assert_eq!(lost.status, TrackingStatus::HandNotDetected);
        assert!(!session.motion.is_seeded());

        let back = process_frame(
            &mut session,
            &hand_frame(66, fixtures::translated(&hand, 0.2, 0.0)),
            &mut sink,
        );
        assert_eq!(back.moved_to, None);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn scroll_pose_suspends_pointer_integration() {
        let mut session = session(ControlSettings::default());
        let mut sink = RecordingSink::new((960.0, 540.0));
        process_frame(&mut session, &hand_frame(0, fixtures::index_pointing()), &mut sink);
        process_frame(&mut session, &hand_frame(33, fixtures::thumbs_up()), &mut sink);
        assert!(!session.motion.is_seeded());
        let report = process_frame(&mut session, &hand_frame(66, fixtures::index_pointing()), &mut sink);
        assert_eq!(report.moved_to, None);
    }

    #[test]
    fn rejected_move_is_dropped_but_baseline_advances() {
        let mut session = session(ControlSettings::default());
        let mut sink = RecordingSink::new((960.0, 540.0));
        let hand = fixtures::index_pointing();
        sink.reject_moves = true;

        process_frame(&mut session, &hand_frame(0, hand), &mut sink);
        let moved = fixtures::translated(&hand, 0.05, 0.0);
        let report = process_frame(&mut session, &hand_frame(33, moved), &mut sink);
        assert_eq!(report.moved_to, None);
        assert_eq!(report.status, TrackingStatus::Tracking);
        let tip = moved[HandJoint::IndexFingerTip];
        assert_eq!(session.motion.previous(), Some((tip.x, tip.y)));
    }

    #[test]
    fn pinch_clicks_once_per_acquisition() {
        let mut session = session(ControlSettings::default());
        let mut sink = RecordingSink::default();
        let frames = [
            Some(fixtures::left_pinch()),
            Some(fixtures::left_pinch()),
            Some(fixtures::left_pinch()),
            Some(fixtures::open_hand()),
            Some(fixtures::left_pinch()),
        ];
        for (i, hand) in frames.into_iter().enumerate() {
            let frame = LandmarkFrame {
                ts: i as u64 * 200,
                hand,
                face: None,
            };
            process_frame(&mut session, &frame, &mut sink);
        }
        let clicks = sink
            .events
            .iter()
            .filter(|e| matches!(e, InputEvent::Click { button: MouseButton::Left, .. }))
            .count();
        assert_eq!(clicks, 2);
    }

    #[test]
    fn screenshot_gesture_sends_hotkey_by_default() {
        let mut session = session(ControlSettings::default());
        let mut sink = RecordingSink::default();
        let report = process_frame(
            &mut session,
            &hand_frame(0, fixtures::fingertips_bunched()),
            &mut sink,
        );
        assert_eq!(report.fired, Some(Gesture::Screenshot));
        assert!(matches!(sink.events.as_slice(), [InputEvent::Hotkey { .. }]));
    }

    #[test]
    fn gaze_scrolls_when_enabled() {
        let settings = ControlSettings {
            gaze: GazeScrollConfig {
                enabled: true,
                ..GazeScrollConfig::default()
            },
            ..ControlSettings::default()
        };
        let mut session = session(settings);
        let mut sink = RecordingSink::default();
        let frame = LandmarkFrame {
            ts: 0,
            hand: None,
            face: Some(fixtures::face(0.02, 0.1)),
        };
        let report = process_frame(&mut session, &frame, &mut sink);
        assert_eq!(report.scroll_ticks, 10);
        assert_eq!(report.status, TrackingStatus::HandNotDetected);
    }

    #[test]
    fn blink_onset_is_reported_once() {
        let mut session = session(ControlSettings::default());
        let mut sink = RecordingSink::default();
        let closed = LandmarkFrame {
            ts: 0,
            hand: None,
            face: Some(fixtures::face(0.002, 0.5)),
        };
        assert!(process_frame(&mut session, &closed, &mut sink).blink);
        let mut again = closed.clone();
        again.ts = 33;
        assert!(!process_frame(&mut session, &again, &mut sink).blink);
    }
}
