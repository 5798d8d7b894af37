use crate::timecode;

/// Fixed offset applied when the run starts from the Yorkist marker.
pub const YORKIST_PENALTY_SECS: f64 = 38.0;
/// Fixed offset applied when the run starts from the Lancastrian marker.
pub const LANCASTRIAN_PENALTY_SECS: f64 = 77.0;

/// Final accounting for one run, produced once at shutdown.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub total_written: u64,
    pub fps: f64,
}

impl RunSummary {
    pub fn new(total_written: u64, fps: f64) -> Self {
        Self { total_written, fps }
    }

    pub fn duration_secs(&self) -> f64 {
        self.total_written as f64 / self.fps
    }

    pub fn yorkist_duration_secs(&self) -> f64 {
        self.duration_secs() + YORKIST_PENALTY_SECS
    }

    pub fn lancastrian_duration_secs(&self) -> f64 {
        self.duration_secs() + LANCASTRIAN_PENALTY_SECS
    }

    /// The three summary lines, in the order the original tool printed them.
    pub fn report_lines(&self) -> [String; 3] {
        [
            format!("Output duration: {}", timecode::format(self.duration_secs())),
            format!(
                "Output duration with penalty starting Lancastrians: {}",
                timecode::format(self.lancastrian_duration_secs())
            ),
            format!(
                "Output duration with penalty starting Yorkists: {}",
                timecode::format(self.yorkist_duration_secs())
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_arithmetic() {
        let summary = RunSummary::new(150, 30.0);
        assert_eq!(summary.duration_secs(), 5.0);
        assert_eq!(summary.yorkist_duration_secs(), 43.0);
        assert_eq!(summary.lancastrian_duration_secs(), 82.0);
    }

    #[test]
    fn test_report_lines_formatted() {
        let lines = RunSummary::new(150, 30.0).report_lines();
        assert_eq!(lines[0], "Output duration: 00:00:05.000");
        assert_eq!(
            lines[1],
            "Output duration with penalty starting Lancastrians: 00:01:22.000"
        );
        assert_eq!(
            lines[2],
            "Output duration with penalty starting Yorkists: 00:00:43.000"
        );
    }
}
