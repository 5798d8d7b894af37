use thiserror::Error;

/// Error taxonomy for the load-removal pipeline.
///
/// Startup errors (bad timecodes, unopenable files) abort before any frame is
/// processed; `SinkWrite` is the only fatal mid-run error.
#[derive(Error, Debug)]
pub enum LoadSkipError {
    #[error("Invalid timecode format: '{value}', expected HH:MM:SS.mmm or MM:SS.mmm")]
    InvalidTimecode { value: String },

    #[error("Invalid region of interest: '{value}', expected 'x,y,w,h' with non-negative integers")]
    InvalidRoi { value: String },

    #[error("Could not open input video. '{path}'")]
    OpenVideo { path: String },

    #[error("Could not load template image. '{path}'")]
    OpenTemplate { path: String },

    #[error("Could not open output video for writing. '{path}'")]
    OpenSink { path: String },

    #[error("Failed to write frame {index} to output: {source}")]
    SinkWrite {
        index: i64,
        source: opencv::Error,
    },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

pub type Result<T> = std::result::Result<T, LoadSkipError>;
