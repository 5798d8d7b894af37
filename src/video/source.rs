use opencv::{prelude::*, videoio};

use super::{Frame, StreamMetadata};
use crate::error::{LoadSkipError, Result};

/// Sequential reader over the input video with frame- and time-based seeking.
///
/// Reads happen exclusively on the control thread; frames carry their stream
/// index so later stages never depend on read order being re-derivable.
pub struct VideoSource {
    capture: videoio::VideoCapture,
    meta: StreamMetadata,
    next_index: i64,
}

impl VideoSource {
    pub fn open(path: &str) -> Result<Self> {
        // CAP_ANY lets OpenCV pick the best backend for the platform.
        let capture = videoio::VideoCapture::from_file(path, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(LoadSkipError::OpenVideo {
                path: path.to_string(),
            });
        }

        let meta = StreamMetadata {
            fps: capture.get(videoio::CAP_PROP_FPS)?,
            width: capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32,
            height: capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32,
            total_frames: capture.get(videoio::CAP_PROP_FRAME_COUNT)? as i64,
        };

        Ok(Self {
            capture,
            meta,
            next_index: 0,
        })
    }

    pub fn metadata(&self) -> &StreamMetadata {
        &self.meta
    }

    pub fn seek_to_frame(&mut self, index: i64) -> Result<()> {
        self.capture
            .set(videoio::CAP_PROP_POS_FRAMES, index as f64)?;
        self.next_index = index;
        Ok(())
    }

    pub fn seek_to_time(&mut self, ms: f64) -> Result<()> {
        self.capture.set(videoio::CAP_PROP_POS_MSEC, ms)?;
        // Re-read the frame position: the backend lands on the nearest frame.
        self.next_index = self.capture.get(videoio::CAP_PROP_POS_FRAMES)? as i64;
        Ok(())
    }

    /// Read the next frame. `Ok(None)` is end of stream; `Err` is a decode
    /// failure for a single frame, after which the position has still advanced
    /// and reading may continue.
    pub fn read_next(&mut self) -> std::result::Result<Option<Frame>, opencv::Error> {
        let mut mat = Mat::default();
        let got = match self.capture.read(&mut mat) {
            Ok(got) => got,
            Err(err) => {
                self.next_index += 1;
                return Err(err);
            }
        };
        if !got || mat.empty() {
            return Ok(None);
        }

        let timestamp_ms = self.capture.get(videoio::CAP_PROP_POS_MSEC)?;
        let frame = Frame {
            mat,
            index: self.next_index,
            timestamp_ms,
        };
        self.next_index += 1;
        Ok(Some(frame))
    }

    /// Index the next successful read would carry.
    pub fn next_index(&self) -> i64 {
        self.next_index
    }
}
