use clap::ValueEnum;

/// How the processing window's end is enforced. The two variants mirror the
/// two behaviors found in the tool family; neither is universally "correct",
/// so both are explicit modes rather than a silent merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoundMode {
    /// Count frames: stop reading once the current frame index reaches the
    /// end frame, independent of container timestamps. Deterministic across
    /// containers with sparse or jittery timestamps.
    Frames,
    /// Trust timestamps: stop as soon as a read frame's timestamp exceeds the
    /// end time, discarding that over-limit frame before classification.
    Timestamp,
}

/// Effective frame range `[start, end)`, derived once from the optional user
/// timecodes and the stream metadata, then frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    pub start: i64,
    pub end: i64,
}

impl FrameWindow {
    /// Clamp requested bounds into `[0, total]`. An inverted request collapses
    /// to an empty window at `start` rather than raising.
    pub fn clamped(start: i64, end: i64, total: i64) -> Self {
        let start = start.clamp(0, total);
        let end = end.max(start).min(total);
        Self { start, end }
    }

    pub fn from_seconds(start: Option<f64>, end: Option<f64>, fps: f64, total: i64) -> Self {
        let start_frame = start.map(|s| (s * fps) as i64).unwrap_or(0);
        let end_frame = end.map(|s| (s * fps) as i64).unwrap_or(total);
        Self::clamped(start_frame, end_frame, total)
    }

    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_start_clamps_to_zero() {
        let w = FrameWindow::clamped(-5, 500, 1000);
        assert_eq!(w.start, 0);
        assert_eq!(w.end, 500);
    }

    #[test]
    fn test_end_clamps_to_total() {
        let w = FrameWindow::clamped(0, 2000, 1000);
        assert_eq!(w.end, 1000);
        assert_eq!(w.len(), 1000);
    }

    #[test]
    fn test_inverted_window_is_empty_not_an_error() {
        let w = FrameWindow::clamped(900, 100, 1000);
        assert_eq!(w.start, 900);
        assert_eq!(w.end, 900);
        assert!(w.is_empty());
        assert_eq!(w.len(), 0);
    }

    #[test]
    fn test_from_seconds_scales_by_fps() {
        let w = FrameWindow::from_seconds(Some(2.0), Some(4.0), 30.0, 1000);
        assert_eq!(w.start, 60);
        assert_eq!(w.end, 120);

        // No bounds given: the whole stream.
        let full = FrameWindow::from_seconds(None, None, 30.0, 1000);
        assert_eq!(full.start, 0);
        assert_eq!(full.end, 1000);
    }
}
