use opencv::{core, prelude::*, videoio};

use super::StreamMetadata;
use crate::error::{LoadSkipError, Result};

/// Append-only writer for the output video.
///
/// Frames are written pass-through at the source frame rate and resolution
/// with the mp4v codec. `close` flushes and releases the container; the Drop
/// impl covers early exits so partial output is always finalized.
pub struct VideoSink {
    writer: videoio::VideoWriter,
    released: bool,
}

impl VideoSink {
    pub fn open(path: &str, meta: &StreamMetadata) -> Result<Self> {
        let fourcc = videoio::VideoWriter::fourcc('m', 'p', '4', 'v')?;
        let writer = videoio::VideoWriter::new(
            path,
            fourcc,
            meta.fps,
            core::Size::new(meta.width, meta.height),
            true,
        )?;
        if !writer.is_opened()? {
            return Err(LoadSkipError::OpenSink {
                path: path.to_string(),
            });
        }
        Ok(Self {
            writer,
            released: false,
        })
    }

    /// Append one frame. Callers must pass frames in ascending stream order.
    pub fn write(&mut self, frame: &Mat) -> std::result::Result<(), opencv::Error> {
        self.writer.write(frame)
    }

    pub fn close(&mut self) -> Result<()> {
        if !self.released {
            self.released = true;
            self.writer.release()?;
        }
        Ok(())
    }
}

impl Drop for VideoSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
