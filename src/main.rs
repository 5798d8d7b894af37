mod classifier;
mod error;
mod pipeline;
mod report;
mod timecode;
mod video;
mod window;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use opencv::imgcodecs;
use opencv::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::classifier::{Classifier, Roi};
use crate::error::LoadSkipError;
use crate::pipeline::PipelineConfig;
use crate::window::BoundMode;

/// Remove loading frames from a segment of video and report the runtime.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to input video file
    infile: String,
    /// Path to output video file
    outfile: String,
    /// Start timecode (HH:MM:SS.mmm or MM:SS.mmm)
    #[arg(long)]
    start: Option<String>,
    /// End timecode (HH:MM:SS.mmm or MM:SS.mmm)
    #[arg(long)]
    end: Option<String>,
    /// How the frame classifier decides what a loading frame is
    #[arg(long, value_enum, default_value_t = Policy::Brightness)]
    policy: Policy,
    /// Decision threshold: max mean gray value for brightness (default 10),
    /// min correlation score for template (default 0.9)
    #[arg(long)]
    threshold: Option<f64>,
    /// Region of interest as 'x,y,w,h' (pixels), brightness policy only
    #[arg(long)]
    roi: Option<String>,
    /// Path to the comparison image, template policy only
    #[arg(long, required_if_eq("policy", "template"))]
    comparison: Option<String>,
    /// Number of worker threads for frame classification
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    workers: u16,
    /// Batch size for frame processing
    #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u16).range(1..))]
    batch: u16,
    /// How the end of the processing window is enforced
    #[arg(long, value_enum, default_value_t = BoundMode::Frames)]
    bound: BoundMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Dark-frame heuristic: mean luma below the threshold means loading
    Brightness,
    /// Template match: a correlation hit anywhere in the frame means loading
    Template,
}

const DEFAULT_BRIGHTNESS_THRESHOLD: f64 = 10.0;
const DEFAULT_TEMPLATE_THRESHOLD: f64 = 0.9;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let start = cli.start.as_deref().map(timecode::parse).transpose()?;
    let end = cli.end.as_deref().map(timecode::parse).transpose()?;

    let classifier = build_classifier(&cli)?;

    let config = PipelineConfig {
        input: cli.infile,
        output: cli.outfile,
        start,
        end,
        bound: cli.bound,
        classifier,
        workers: cli.workers as usize,
        batch_size: cli.batch as usize,
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error registering Ctrl-C handler")?;

    let summary = pipeline::run(&config, &running)?;

    for line in summary.report_lines() {
        println!("{line}");
    }
    Ok(())
}

fn build_classifier(cli: &Cli) -> Result<Classifier> {
    match cli.policy {
        Policy::Brightness => {
            let roi = cli.roi.as_deref().map(str::parse::<Roi>).transpose()?;
            Ok(Classifier::Brightness {
                threshold: cli.threshold.unwrap_or(DEFAULT_BRIGHTNESS_THRESHOLD),
                roi,
            })
        }
        Policy::Template => {
            let Some(path) = cli.comparison.clone() else {
                anyhow::bail!("--comparison is required with --policy template");
            };
            let template = imgcodecs::imread(&path, imgcodecs::IMREAD_COLOR)?;
            if template.empty() {
                return Err(LoadSkipError::OpenTemplate { path }.into());
            }
            Ok(Classifier::Template {
                threshold: cli.threshold.unwrap_or(DEFAULT_TEMPLATE_THRESHOLD),
                template,
            })
        }
    }
}
