//! Screenshot gesture dispatch.
//!
//! `Hotkey` mode sends the platform screenshot chord and leaves the rest to
//! the OS tool. `Save` mode grabs one desktop frame with ffmpeg into a
//! timestamped PNG.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Local};

use crate::models::events::InputEvent;
use crate::models::settings::ScreenshotMode;
use crate::telemetry::logger::SinkError;

/// Event for one screenshot gesture fired at frame time `ts`.
pub fn screenshot_event(mode: &ScreenshotMode, ts: u64, now: DateTime<Local>) -> InputEvent {
    match mode {
        ScreenshotMode::Hotkey => InputEvent::Hotkey {
            ts,
            key_codes: hotkey_chord()
                .iter()
                .map(|key| format!("{key:?}"))
                .collect(),
        },
        ScreenshotMode::Save { dir } => {
            let dir = dir.clone().unwrap_or_else(default_screenshot_dir);
            InputEvent::Screenshot {
                ts,
                path: dir.join(screenshot_file_name(now)).to_string_lossy().into_owned(),
            }
        }
    }
}

pub fn screenshot_file_name(now: DateTime<Local>) -> String {
    format!("screenshot_{}.png", now.format("%Y%m%d_%H%M%S"))
}

/// `{Pictures}/AirFlick`, or the home directory when the platform has no
/// pictures folder.
pub fn default_screenshot_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("AirFlick")
}

pub fn hotkey_chord() -> Vec<rdev::Key> {
    if cfg!(target_os = "macos") {
        vec![rdev::Key::MetaLeft, rdev::Key::ShiftLeft, rdev::Key::Num4]
    } else {
        vec![rdev::Key::PrintScreen]
    }
}

/// Inverse of the `Debug` names stored in hotkey events.
pub fn key_from_name(name: &str) -> Option<rdev::Key> {
    let key = match name {
        "PrintScreen" => rdev::Key::PrintScreen,
        "MetaLeft" => rdev::Key::MetaLeft,
        "MetaRight" => rdev::Key::MetaRight,
        "ShiftLeft" => rdev::Key::ShiftLeft,
        "ShiftRight" => rdev::Key::ShiftRight,
        "ControlLeft" => rdev::Key::ControlLeft,
        "ControlRight" => rdev::Key::ControlRight,
        "Alt" => rdev::Key::Alt,
        "Num3" => rdev::Key::Num3,
        "Num4" => rdev::Key::Num4,
        "Num5" => rdev::Key::Num5,
        "KeyS" => rdev::Key::KeyS,
        _ => return None,
    };
    Some(key)
}

pub fn find_ffmpeg_exe() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let name = if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" };
            let candidate = dir.join(name);
            if candidate.exists() {
                log::debug!("ffmpeg: using bundled binary at {}", candidate.display());
                return candidate;
            }
        }
    }

    log::debug!("ffmpeg: bundled binary not found, falling back to system PATH");
    PathBuf::from("ffmpeg")
}

/// Input arguments selecting the whole desktop on this platform.
fn desktop_grab_args() -> Vec<String> {
    if cfg!(target_os = "windows") {
        vec!["-f".into(), "gdigrab".into(), "-i".into(), "desktop".into()]
    } else if cfg!(target_os = "macos") {
        vec!["-f".into(), "avfoundation".into(), "-i".into(), "1:none".into()]
    } else {
        let display = std::env::var("DISPLAY").unwrap_or_else(|_| ":0.0".to_string());
        vec!["-f".into(), "x11grab".into(), "-i".into(), display]
    }
}

/// Writes one desktop frame to `target`, creating the parent directory.
pub fn capture_desktop(target: &Path) -> Result<(), SinkError> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let ffmpeg = find_ffmpeg_exe();
    let mut command = Command::new(&ffmpeg);
    command.arg("-y").args(desktop_grab_args());
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        command.creation_flags(CREATE_NO_WINDOW);
    }
    let output = command
        .arg("-frames:v")
        .arg("1")
        .arg(target)
        .output()
        .map_err(|e| {
            SinkError::Screenshot(format!("failed to run ffmpeg ({}): {e}", ffmpeg.display()))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SinkError::Screenshot(format!(
            "status: {} | {}",
            output.status,
            stderr.lines().rev().take(6).collect::<Vec<_>>().join(" | ")
        )));
    }

    Ok(())
}
