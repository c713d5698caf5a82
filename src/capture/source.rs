//! Landmark sources.
//!
//! The detector itself runs outside this process. A source is constructed
//! once per session; calibration borrows it directly, then [`spawn_reader`]
//! moves it onto its own thread so blocking reads never stall the frame loop.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::models::landmarks::LandmarkFrame;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read landmark stream: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed landmark frame on line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub trait LandmarkSource {
    /// Next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, SourceError>;
}

/// One JSON [`LandmarkFrame`] per line; blank lines are skipped.
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        log::info!("open_source: path={}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let trimmed = self.buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|e| SourceError::Parse {
                    line: self.line,
                    message: e.to_string(),
                });
        }
    }
}

/// In-memory source over prepared frames.
pub struct VecSource {
    frames: std::vec::IntoIter<LandmarkFrame>,
}

impl VecSource {
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl LandmarkSource for VecSource {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, SourceError> {
        Ok(self.frames.next())
    }
}

pub type FrameReceiver = mpsc::Receiver<Result<LandmarkFrame, SourceError>>;

/// Reads `source` on a dedicated thread. The channel holds a single frame, so
/// the reader never runs more than one frame ahead of the consumer. The
/// channel closes when the stream ends or after an I/O error has been sent.
pub fn spawn_reader(
    mut source: Box<dyn LandmarkSource + Send>,
) -> std::io::Result<FrameReceiver> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::Builder::new()
        .name("landmark-reader".to_string())
        .spawn(move || loop {
            let item = match source.next_frame() {
                Ok(Some(frame)) => Ok(frame),
                Ok(None) => {
                    log::debug!("landmark_reader: stream ended");
                    break;
                }
                Err(e) => Err(e),
            };
            let fatal = matches!(item, Err(SourceError::Io(_)));
            if tx.blocking_send(item).is_err() || fatal {
                break;
            }
        })?;
    Ok(rx)
}
