use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::classifier::Classifier;
use crate::error::{LoadSkipError, Result};
use crate::report::RunSummary;
use crate::video::{Frame, VideoSink, VideoSource};
use crate::window::{BoundMode, FrameWindow};

pub struct PipelineConfig {
    pub input: String,
    pub output: String,
    /// Optional window bounds, in seconds.
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub bound: BoundMode,
    pub classifier: Classifier,
    pub workers: usize,
    pub batch_size: usize,
}

/// Drive the whole run: open source and sink, apply the window, then loop
/// read batch -> classify batch (parallel) -> write kept frames (in order)
/// until the stream or window is exhausted.
///
/// `running` is the cancellation flag; it is checked between batches only, so
/// an in-flight batch always finishes with a complete set of decisions.
pub fn run(config: &PipelineConfig, running: &AtomicBool) -> Result<RunSummary> {
    let mut source = VideoSource::open(&config.input)?;
    let meta = *source.metadata();

    let window = FrameWindow::from_seconds(config.start, config.end, meta.fps, meta.total_frames);
    let end_ms = config.end.map(|s| s * 1000.0);
    match config.bound {
        BoundMode::Frames => source.seek_to_frame(window.start)?,
        BoundMode::Timestamp => {
            if let Some(start) = config.start {
                source.seek_to_time(start * 1000.0)?;
            }
        }
    }

    let mut sink = VideoSink::open(&config.output, &meta)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .build()?;

    let expected = match config.bound {
        BoundMode::Frames => window.len(),
        BoundMode::Timestamp => meta.total_frames,
    };
    let progress = make_progress_bar(expected);

    let mut current = window.start;
    let mut total_written = 0u64;
    let mut done = false;

    while !done && running.load(Ordering::SeqCst) {
        // READING
        let to_read = match config.bound {
            BoundMode::Frames => (config.batch_size as i64).min(window.end - current),
            BoundMode::Timestamp => config.batch_size as i64,
        };
        let mut batch: Vec<Frame> = Vec::with_capacity(to_read.max(0) as usize);
        for _ in 0..to_read {
            match source.read_next() {
                Ok(Some(frame)) => {
                    if let Some(limit) = end_ms {
                        if config.bound == BoundMode::Timestamp && frame.timestamp_ms > limit {
                            // Over-limit frame is discarded, never classified.
                            done = true;
                            break;
                        }
                    }
                    current += 1;
                    batch.push(frame);
                }
                Ok(None) => {
                    done = true;
                    break;
                }
                Err(err) => {
                    // One bad frame does not abort the run.
                    log::warn!(
                        "dropping frame {}: decode failed: {err}",
                        source.next_index() - 1
                    );
                    current += 1;
                    progress.inc(1);
                }
            }
        }

        if batch.is_empty() {
            break;
        }

        // CLASSIFYING
        let decisions = classify_batch(&pool, &batch, &config.classifier);

        // WRITING
        for (frame, keep) in batch.iter().zip(&decisions) {
            if *keep {
                if let Err(err) = sink.write(&frame.mat) {
                    progress.abandon();
                    let _ = sink.close();
                    return Err(LoadSkipError::SinkWrite {
                        index: frame.index,
                        source: err,
                    });
                }
                total_written += 1;
            }
            progress.inc(1);
        }

        if config.bound == BoundMode::Frames && current >= window.end {
            done = true;
        }
    }

    sink.close()?;
    progress.finish();

    Ok(RunSummary::new(total_written, meta.fps))
}

/// Classify every frame of a batch on the bounded pool. The result vector is
/// positionally aligned with the batch regardless of completion order.
fn classify_batch(pool: &rayon::ThreadPool, batch: &[Frame], classifier: &Classifier) -> Vec<bool> {
    classify_batch_with(pool, batch, |frame| {
        classifier.classify(&frame.mat).unwrap_or_else(|err| {
            log::warn!("classification failed for frame {}: {err}", frame.index);
            false
        })
    })
}

fn classify_batch_with<T, F>(pool: &rayon::ThreadPool, batch: &[T], classify: F) -> Vec<bool>
where
    T: Sync,
    F: Fn(&T) -> bool + Sync,
{
    pool.install(|| batch.par_iter().map(|item| classify(item)).collect())
}

fn make_progress_bar(total_frames: i64) -> ProgressBar {
    if total_frames > 0 {
        let pb = ProgressBar::new(total_frames as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} frames [{elapsed_precise}<{eta_precise}]",
            )
            .unwrap()
            .progress_chars("##-"),
        );
        pb
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {pos} frames [{elapsed_precise}]").unwrap(),
        );
        pb
    }
}
