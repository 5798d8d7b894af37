pub mod sink;
pub mod source;

pub use sink::VideoSink;
pub use source::VideoSource;

use opencv::prelude::*;

/// One decoded frame, owned for the duration of a single batch.
pub struct Frame {
    pub mat: Mat,
    /// Position in the source stream, counted from frame 0.
    pub index: i64,
    /// Source timestamp in milliseconds, as reported by the container.
    pub timestamp_ms: f64,
}

/// Stream properties read once at open time, immutable for the run.
#[derive(Debug, Clone, Copy)]
pub struct StreamMetadata {
    pub fps: f64,
    pub width: i32,
    pub height: i32,
    pub total_frames: i64,
}
