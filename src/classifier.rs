use opencv::{core, imgproc, prelude::*};
use std::str::FromStr;

use crate::error::LoadSkipError;

/// Rectangular region of interest, in pixel coordinates of the source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Roi {
    /// Intersect with a frame of `cols` x `rows` pixels. Returns None when the
    /// intersection is empty, in which case callers fall back to the whole frame.
    pub fn clamp_to(&self, cols: i32, rows: i32) -> Option<core::Rect> {
        let x = self.x.clamp(0, cols);
        let y = self.y.clamp(0, rows);
        let w = self.w.min(cols - x);
        let h = self.h.min(rows - y);
        if w <= 0 || h <= 0 {
            return None;
        }
        Some(core::Rect::new(x, y, w, h))
    }
}

impl FromStr for Roi {
    type Err = LoadSkipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LoadSkipError::InvalidRoi {
            value: s.to_string(),
        };
        let fields: Vec<i32> = s
            .split(',')
            .map(|f| f.trim().parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        if fields.iter().any(|&v| v < 0) {
            return Err(invalid());
        }
        match fields.as_slice() {
            [x, y, w, h] => Ok(Roi {
                x: *x,
                y: *y,
                w: *w,
                h: *h,
            }),
            _ => Err(invalid()),
        }
    }
}

/// Frame classification policy. Returns true when a frame should be kept.
///
/// Both policies are pure functions of the frame and the captured
/// configuration; a single instance is shared across classification workers.
#[derive(Debug)]
pub enum Classifier {
    /// Keep the frame iff the mean gray value of the (sub)frame exceeds
    /// `threshold` (0 = pure black, 255 = white). Loading screens are assumed
    /// to be black frames, optionally judged on a sub-area only.
    Brightness { threshold: f64, roi: Option<Roi> },
    /// Keep the frame iff the best normalized cross-correlation score against
    /// `template` stays below `threshold`. A score at or above the threshold
    /// anywhere in the frame signals a template hit, i.e. a loading screen.
    Template { threshold: f64, template: Mat },
}

impl Classifier {
    pub fn classify(&self, frame: &Mat) -> opencv::Result<bool> {
        match self {
            Classifier::Brightness { threshold, roi } => {
                Ok(mean_luma(frame, *roi)? > *threshold)
            }
            Classifier::Template {
                threshold,
                template,
            } => Ok(max_match_score(frame, template)? < *threshold),
        }
    }
}

fn mean_luma(frame: &Mat, roi: Option<Roi>) -> opencv::Result<f64> {
    let mut gray = Mat::default();
    match roi.and_then(|r| r.clamp_to(frame.cols(), frame.rows())) {
        Some(rect) => {
            let view = Mat::roi(frame, rect)?;
            imgproc::cvt_color(&view, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
        }
        None => {
            imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
        }
    }
    Ok(core::mean(&gray, &core::no_array())?[0])
}

fn max_match_score(frame: &Mat, template: &Mat) -> opencv::Result<f64> {
    let mut scores = Mat::default();
    imgproc::match_template(
        frame,
        template,
        &mut scores,
        imgproc::TM_CCOEFF_NORMED,
        &core::no_array(),
    )?;
    let mut max_val = 0.0f64;
    core::min_max_loc(
        &scores,
        None,
        Some(&mut max_val),
        None,
        None,
        &core::no_array(),
    )?;
    Ok(max_val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Vec3b};

    fn solid_frame(rows: i32, cols: i32, value: f64) -> Mat {
        Mat::new_rows_cols_with_default(
            rows,
            cols,
            core::CV_8UC3,
            Scalar::new(value, value, value, 0.0),
        )
        .unwrap()
    }

    /// Deterministic noise frame, distinct per seed.
    fn noise_frame(rows: i32, cols: i32, mut seed: u32) -> Mat {
        let mut frame = solid_frame(rows, cols, 0.0);
        for r in 0..rows {
            for c in 0..cols {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let v = (seed >> 24) as u8;
                *frame.at_2d_mut::<Vec3b>(r, c).unwrap() = Vec3b::from([v, v, v]);
            }
        }
        frame
    }

    /// Gradient pattern with enough variance for a meaningful correlation.
    fn gradient_template(rows: i32, cols: i32) -> Mat {
        let mut template = solid_frame(rows, cols, 0.0);
        for r in 0..rows {
            for c in 0..cols {
                let v = ((r * 13 + c * 31) % 251) as u8;
                *template.at_2d_mut::<Vec3b>(r, c).unwrap() = Vec3b::from([v, v, v]);
            }
        }
        template
    }

    #[test]
    fn test_roi_parse() {
        assert_eq!(
            "10,20,30,40".parse::<Roi>().unwrap(),
            Roi {
                x: 10,
                y: 20,
                w: 30,
                h: 40
            }
        );
        assert!("10,20,30".parse::<Roi>().is_err());
        assert!("10,20,30,40,50".parse::<Roi>().is_err());
        assert!("10,20,-1,40".parse::<Roi>().is_err());
        assert!("a,b,c,d".parse::<Roi>().is_err());
        // Values past i32::MAX must be rejected, not wrapped negative.
        assert!("4294967295,0,10,10".parse::<Roi>().is_err());
        assert!("0,0,10,2147483648".parse::<Roi>().is_err());
        assert!("2147483647,0,10,10".parse::<Roi>().is_ok());
    }

    #[test]
    fn test_roi_clamp() {
        let roi = Roi {
            x: 50,
            y: 50,
            w: 100,
            h: 100,
        };
        let rect = roi.clamp_to(80, 80).unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (50, 50, 30, 30));

        // Entirely outside the frame: empty intersection.
        let off = Roi {
            x: 200,
            y: 0,
            w: 10,
            h: 10,
        };
        assert!(off.clamp_to(80, 80).is_none());
    }

    #[test]
    fn test_brightness_black_frame_discarded() {
        let classifier = Classifier::Brightness {
            threshold: 10.0,
            roi: None,
        };
        let black = solid_frame(48, 64, 0.0);
        assert!(!classifier.classify(&black).unwrap());
    }

    #[test]
    fn test_brightness_white_frame_kept() {
        let classifier = Classifier::Brightness {
            threshold: 10.0,
            roi: None,
        };
        let white = solid_frame(48, 64, 255.0);
        assert!(classifier.classify(&white).unwrap());
    }

    #[test]
    fn test_brightness_roi_restricts_judgement() {
        // Bright frame with a black 16x16 patch at the origin: whole-frame mean
        // passes, the ROI over the patch does not.
        let mut frame = solid_frame(48, 64, 200.0);
        let patch = solid_frame(16, 16, 0.0);
        let rect = core::Rect::new(0, 0, 16, 16);
        let mut dst = Mat::roi_mut(&mut frame, rect).unwrap();
        patch.copy_to(&mut dst).unwrap();

        let whole = Classifier::Brightness {
            threshold: 10.0,
            roi: None,
        };
        assert!(whole.classify(&frame).unwrap());

        let patch_only = Classifier::Brightness {
            threshold: 10.0,
            roi: Some(Roi {
                x: 0,
                y: 0,
                w: 16,
                h: 16,
            }),
        };
        assert!(!patch_only.classify(&frame).unwrap());
    }

    #[test]
    fn test_template_exact_hit_discarded() {
        let template = gradient_template(16, 16);
        let mut frame = solid_frame(64, 64, 0.0);
        let rect = core::Rect::new(20, 12, 16, 16);
        let mut dst = Mat::roi_mut(&mut frame, rect).unwrap();
        template.copy_to(&mut dst).unwrap();

        let classifier = Classifier::Template {
            threshold: 0.9,
            template,
        };
        assert!(!classifier.classify(&frame).unwrap());
    }

    #[test]
    fn test_template_noise_kept() {
        let classifier = Classifier::Template {
            threshold: 0.9,
            template: gradient_template(16, 16),
        };
        let frame = noise_frame(64, 64, 42);
        assert!(classifier.classify(&frame).unwrap());
    }
}
