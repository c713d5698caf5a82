use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::models::settings::TrackingPose;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Landmark stream, one JSON frame per line ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Settings file (JSON); missing fields take their defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pointer sensitivity (scaling factor)
    #[arg(long)]
    pub sensitivity: Option<f64>,

    /// Smoothing coefficient in (0, 1]
    #[arg(long)]
    pub smoothness: Option<f64>,

    /// Scroll speed factor
    #[arg(long)]
    pub scroll_speed: Option<f64>,

    /// Frames a gesture must be held before it fires (0-10)
    #[arg(long)]
    pub hold_frames: Option<u32>,

    /// Hand pose that drives the pointer
    #[arg(long, value_enum)]
    pub pose: Option<PoseArg>,

    /// Save screenshots into this directory instead of sending the OS hotkey
    #[arg(long)]
    pub screenshot_dir: Option<PathBuf>,

    /// Scroll with eye gaze when face landmarks are present
    #[arg(long, default_value_t = false)]
    pub eye_scroll: bool,

    /// Capture gaze thresholds from the first frames before tracking
    #[arg(long, default_value_t = false)]
    pub calibrate: bool,

    /// Record events instead of injecting them
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// With --dry-run, write the recorded events here as JSON
    #[arg(long)]
    pub events_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PoseArg {
    Raised,
    Straight,
}

impl From<PoseArg> for TrackingPose {
    fn from(value: PoseArg) -> Self {
        match value {
            PoseArg::Raised => TrackingPose::IndexRaised,
            PoseArg::Straight => TrackingPose::IndexStraight,
        }
    }
}
