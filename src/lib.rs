pub mod algorithm;
pub mod args;
pub mod capture;
pub mod commands;
pub mod models;
pub mod telemetry;

use std::future::Future;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tokio::time::MissedTickBehavior;

use algorithm::calibration::{thresholds_or_default, CalibrationSession, CalibrationThresholds};
use algorithm::eye_scroll::vertical_ratio;
use args::Args;
use capture::source::{spawn_reader, FrameReceiver, JsonLinesSource, LandmarkSource, SourceError};
use capture::state::TrackingState;
use models::settings::{ControlSettings, ScreenSize, ScreenshotMode};
use telemetry::logger::{InputSink, RdevSink, RecordingSink};

pub fn run() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run_with(args) {
        log::error!("airflick: {e}");
        std::process::exit(1);
    }
}

fn run_with(args: Args) -> Result<(), String> {
    let settings = resolve_settings(&args)?;

    let mut source: Box<dyn LandmarkSource + Send> = if args.input == "-" {
        Box::new(JsonLinesSource::new(BufReader::new(std::io::stdin())))
    } else {
        Box::new(JsonLinesSource::open(Path::new(&args.input)).map_err(|e| e.to_string())?)
    };

    let thresholds = if args.calibrate {
        calibrate(source.as_mut())
    } else {
        CalibrationThresholds::default()
    };

    if args.dry_run {
        let screen = settings.screen.unwrap_or_else(|| {
            display_size().unwrap_or_else(|e| {
                log::warn!("run: {e}; assuming 1920x1080");
                ScreenSize {
                    width: 1920,
                    height: 1080,
                }
            })
        });
        let mut sink = RecordingSink::new(screen_center(screen));
        drive(settings, screen, thresholds, source, &mut sink)?;
        log::info!("run: recorded {} events", sink.events.len());
        if let Some(path) = &args.events_out {
            let file = std::fs::File::create(path)
                .map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
            serde_json::to_writer_pretty(file, &sink.events)
                .map_err(|e| format!("Failed to write events: {e}"))?;
        }
    } else {
        let screen = match settings.screen {
            Some(screen) => screen,
            None => display_size()?,
        };
        let mut sink = RdevSink::start(screen_center(screen))
            .map_err(|e| format!("Failed to start input hook: {e}"))?;
        drive(settings, screen, thresholds, source, &mut sink)?;
    }
    Ok(())
}

/// File (or defaults), then command-line overrides, then one validation pass.
fn resolve_settings(args: &Args) -> Result<ControlSettings, String> {
    let mut settings = match &args.config {
        Some(path) => ControlSettings::load(path).map_err(|e| e.to_string())?,
        None => ControlSettings::default(),
    };

    if let Some(value) = args.sensitivity {
        settings.scaling_factor = value;
    }
    if let Some(value) = args.smoothness {
        settings.smooth_factor = value;
    }
    if let Some(value) = args.scroll_speed {
        settings.scroll_speed_factor = value;
    }
    if let Some(value) = args.hold_frames {
        settings.required_hold_frames = value;
    }
    if let Some(pose) = args.pose {
        settings.tracking_pose = pose.into();
    }
    if let Some(dir) = &args.screenshot_dir {
        settings.screenshot_mode = ScreenshotMode::Save {
            dir: Some(dir.clone()),
        };
    }
    if args.eye_scroll {
        settings.gaze.enabled = true;
    }

    settings.validate().map_err(|e| e.to_string())?;
    Ok(settings)
}

fn display_size() -> Result<ScreenSize, String> {
    let (width, height) =
        rdev::display_size().map_err(|e| format!("Failed to query display size: {e:?}"))?;
    Ok(ScreenSize {
        width: width as u32,
        height: height as u32,
    })
}

fn screen_center(screen: ScreenSize) -> (f64, f64) {
    (screen.width as f64 / 2.0, screen.height as f64 / 2.0)
}

/// One frame per calibration step, eye position taken from the left eye.
/// Any failure falls back to the default thresholds.
fn calibrate(source: &mut dyn LandmarkSource) -> CalibrationThresholds {
    let mut session = CalibrationSession::new();
    while let Some(step) = session.current_step() {
        log::info!("calibrate: {}", step.prompt());
        let sample = match source.next_frame() {
            Ok(Some(frame)) => frame.face.map(|face| vertical_ratio(&face.left_eye)),
            Ok(None) => None,
            Err(e) => {
                log::warn!("calibrate: {e}");
                session.abort();
                break;
            }
        };
        if session.record(sample).is_err() {
            break;
        }
    }
    thresholds_or_default(session.finish())
}

fn drive(
    settings: ControlSettings,
    screen: ScreenSize,
    thresholds: CalibrationThresholds,
    source: Box<dyn LandmarkSource + Send>,
    sink: &mut dyn InputSink,
) -> Result<(), String> {
    let mut frames =
        spawn_reader(source).map_err(|e| format!("Failed to start landmark reader: {e}"))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to build runtime: {e}"))?;

    runtime.block_on(async move {
        let state = TrackingState::new();
        let interval = Duration::from_millis(settings.frame_interval_ms);
        let session_id =
            commands::tracking::start_tracking(&state, settings, screen, thresholds).await?;

        let loop_result =
            frame_loop(&state, interval, &mut frames, sink, tokio::signal::ctrl_c()).await;
        commands::tracking::stop_tracking(&state, &session_id).await?;
        loop_result
    })
}

/// Takes one frame per tick until the stream ends or `shutdown` resolves.
/// Frames are processed one at a time; waiting for the next one never blocks
/// the shutdown signal.
async fn frame_loop<F: Future>(
    state: &TrackingState,
    interval: Duration,
    frames: &mut FrameReceiver,
    sink: &mut dyn InputSink,
    shutdown: F,
) -> Result<(), String> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);
    let mut last_label = String::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = &mut shutdown => {
                log::info!("frame_loop: interrupted");
                return Ok(());
            }
            _ = ticker.tick() => tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::info!("frame_loop: interrupted");
                    return Ok(());
                }
                next = frames.recv() => next,
            },
        };

        let frame = match next {
            Some(Ok(frame)) => frame,
            None => {
                log::info!("frame_loop: landmark stream ended");
                return Ok(());
            }
            Some(Err(SourceError::Parse { line, message })) => {
                log::warn!("frame_loop: skipping line {line}: {message}");
                continue;
            }
            Some(Err(e)) => return Err(e.to_string()),
        };

        if let Some(report) = commands::tracking::process_tick(state, &frame, sink).await {
            let label = report.status.label();
            if label != last_label {
                log::info!("frame_loop: {label}");
                last_label = label;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::capture::source::VecSource;
    use crate::models::fixtures;
    use crate::models::landmarks::LandmarkFrame;

    const SCREEN: ScreenSize = ScreenSize {
        width: 1280,
        height: 720,
    };

    struct BrokenSource {
        frames: VecSource,
    }

    impl LandmarkSource for BrokenSource {
        fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, SourceError> {
            match self.frames.next_frame()? {
                Some(frame) => Ok(Some(frame)),
                None => Err(SourceError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "camera gone",
                ))),
            }
        }
    }

    fn gaze_frame(ts: u64, ratio: f64) -> LandmarkFrame {
        LandmarkFrame {
            ts,
            hand: None,
            face: Some(fixtures::face(0.04, ratio)),
        }
    }

    fn hand_frame(ts: u64) -> LandmarkFrame {
        LandmarkFrame {
            ts,
            hand: Some(fixtures::index_pointing()),
            face: None,
        }
    }

    async fn started(state: &TrackingState) -> String {
        commands::tracking::start_tracking(
            state,
            ControlSettings::default(),
            SCREEN,
            CalibrationThresholds::default(),
        )
        .await
        .expect("start tracking")
    }

    #[test]
    fn calibration_takes_one_frame_per_step() {
        let mut source = VecSource::new(vec![
            gaze_frame(0, 0.5),
            gaze_frame(33, 0.3),
            gaze_frame(66, 0.7),
        ]);
        let thresholds = calibrate(&mut source);
        assert!((thresholds.neutral - 0.5).abs() < 1e-9);
        assert!((thresholds.up - 0.36).abs() < 1e-9);
        assert!((thresholds.down - 0.64).abs() < 1e-9);
    }

    #[test]
    fn calibration_falls_back_when_the_stream_ends_early() {
        let mut source = VecSource::new(vec![gaze_frame(0, 0.5), gaze_frame(33, 0.3)]);
        assert_eq!(calibrate(&mut source), CalibrationThresholds::default());
    }

    #[test]
    fn calibration_falls_back_on_read_failure() {
        let mut source = BrokenSource {
            frames: VecSource::new(vec![gaze_frame(0, 0.5)]),
        };
        assert_eq!(calibrate(&mut source), CalibrationThresholds::default());
    }

    #[test]
    fn calibration_falls_back_when_face_is_missing() {
        let mut source =
            VecSource::new(vec![gaze_frame(0, 0.5), hand_frame(33), gaze_frame(66, 0.7)]);
        assert_eq!(calibrate(&mut source), CalibrationThresholds::default());
    }

    #[tokio::test]
    async fn frame_loop_runs_until_the_stream_ends() {
        let state = TrackingState::new();
        let id = started(&state).await;
        let mut sink = RecordingSink::new((640.0, 360.0));
        let mut frames = spawn_reader(Box::new(VecSource::new(
            (0..4).map(|i| hand_frame(i * 33)).collect(),
        )))
        .expect("spawn reader");

        let result = frame_loop(
            &state,
            Duration::from_millis(1),
            &mut frames,
            &mut sink,
            std::future::pending::<()>(),
        )
        .await;
        assert_eq!(result, Ok(()));
        assert_eq!(commands::tracking::stop_tracking(&state, &id).await, Ok(4));
    }

    #[tokio::test]
    async fn frame_loop_skips_malformed_lines() {
        let state = TrackingState::new();
        let id = started(&state).await;
        let mut sink = RecordingSink::default();
        let raw = "{\"ts\":0}\n{broken\n{\"ts\":33}\n";
        let mut frames =
            spawn_reader(Box::new(JsonLinesSource::new(Cursor::new(raw)))).expect("spawn reader");

        let result = frame_loop(
            &state,
            Duration::from_millis(1),
            &mut frames,
            &mut sink,
            std::future::pending::<()>(),
        )
        .await;
        assert_eq!(result, Ok(()));
        assert_eq!(commands::tracking::stop_tracking(&state, &id).await, Ok(2));
    }

    #[tokio::test]
    async fn frame_loop_reports_read_failure() {
        let state = TrackingState::new();
        started(&state).await;
        let mut sink = RecordingSink::default();
        let mut frames = spawn_reader(Box::new(BrokenSource {
            frames: VecSource::new(vec![hand_frame(0)]),
        }))
        .expect("spawn reader");

        let result = frame_loop(
            &state,
            Duration::from_millis(1),
            &mut frames,
            &mut sink,
            std::future::pending::<()>(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop_while_waiting_for_a_frame() {
        let state = TrackingState::new();
        let id = started(&state).await;
        let mut sink = RecordingSink::default();
        // Sender kept alive with nothing to send: a stalled stream.
        let (_tx, mut frames) = tokio::sync::mpsc::channel(1);

        let result = frame_loop(
            &state,
            Duration::from_millis(1),
            &mut frames,
            &mut sink,
            tokio::time::sleep(Duration::from_millis(20)),
        )
        .await;
        assert_eq!(result, Ok(()));
        assert_eq!(commands::tracking::stop_tracking(&state, &id).await, Ok(0));
    }
}
