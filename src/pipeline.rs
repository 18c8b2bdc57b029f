//! Capture loop: frame → faces → distances → report / overlay → pacing.

use anyhow::{Context, Result};
use log::{debug, info};
use opencv::core::{Mat, Rect};
use opencv::prelude::*;
use opencv::videoio::VideoCapture;
use smallvec::SmallVec;
use std::time::Instant;

use crate::calibration::{CalibrationTable, DistanceRange};
use crate::conf::Settings;
use crate::cv::detector::FaceDetector;
use crate::cv::frame_metrics::{FrameMetrics, frame_delay};
use crate::cv::{self, Window, overlay};
use crate::report::ReportWriter;

pub type Distances = SmallVec<[DistanceRange; 10]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Distances of this frame go to the report and overlay.
    Report,
    /// The face count just changed: clear the report and drop this frame.
    Reset,
}

/// Holds back the first frame after the face count changes, since the
/// cascade regularly loses or invents a face for a single frame.
#[derive(Debug, Default)]
pub struct FaceCountGate {
    accepted: usize,
}

impl FaceCountGate {
    pub fn admit(&mut self, count: usize) -> GateDecision {
        if count != self.accepted && count > 0 {
            self.accepted = count;
            GateDecision::Reset
        } else {
            GateDecision::Report
        }
    }
}

/// Distances for the first `max_faces` faces.
pub fn estimate_all(table: &CalibrationTable, faces: &[Rect], max_faces: usize) -> Distances {
    faces
        .iter()
        .take(max_faces)
        .map(|face| table.estimate(face.width.max(0) as u32))
        .collect()
}

/// Everything the capture loop needs, built once at startup.
pub struct RunContext {
    pub settings: Settings,
    pub calibration: CalibrationTable,
    pub detector: FaceDetector,
    pub report: ReportWriter,
    pub window: Option<Window>,
    metrics: FrameMetrics,
    gate: FaceCountGate,
}

impl RunContext {
    pub fn new(
        settings: Settings,
        calibration: CalibrationTable,
        detector: FaceDetector,
        report: ReportWriter,
    ) -> Result<Self> {
        let window = if settings.gui {
            Some(Window::open(&settings.window_name)?)
        } else {
            info!("Application running in non GUI mode.");
            None
        };

        Ok(Self {
            settings,
            calibration,
            detector,
            report,
            window,
            metrics: FrameMetrics::new(),
            gate: FaceCountGate::default(),
        })
    }
}

pub fn open_source(settings: &Settings) -> Result<VideoCapture> {
    match &settings.video {
        Some(file) => cv::get_stream_file(file),
        None => cv::get_stream_camera(settings.camera_index),
    }
}

/// Runs until the input ends or the close key is pressed in the window.
pub fn run(ctx: &mut RunContext, capture: &mut VideoCapture) -> Result<()> {
    let mut frame = Mat::default();
    info!("Starting capture loop at {} fps", ctx.settings.target_fps);

    loop {
        let started = Instant::now();

        if !capture.read(&mut frame).context("Failed to read frame")? || frame.empty() {
            info!("No more frames, stopping");
            break;
        }

        let faces = ctx.detector.detect(&frame)?;

        match ctx.gate.admit(faces.len()) {
            GateDecision::Reset => {
                debug!("Face count changed to {}, skipping frame", faces.len());
                ctx.report.clear()?;
            }
            GateDecision::Report => {
                let distances = estimate_all(&ctx.calibration, &faces, ctx.settings.max_faces);
                ctx.report.write(&distances).with_context(|| {
                    format!("Failed to write {}", ctx.report.path().display())
                })?;

                if let Some(window) = &ctx.window {
                    overlay::select_faces(&mut frame, &faces)?;
                    overlay::draw_distances(&mut frame, &distances)?;
                    overlay::draw_fps(&mut frame, ctx.metrics.fps())?;
                    window.show(&frame)?;
                }
            }
        }

        let delay = frame_delay(ctx.settings.target_fps, started.elapsed());
        match &ctx.window {
            Some(window) => {
                if window.close_requested(delay.as_millis() as i32)? {
                    info!("Close key pressed");
                    break;
                }
            }
            None => std::thread::sleep(delay),
        }

        ctx.metrics.update();
    }

    info!(
        "Processed {} frames in {:?} (avg {:.1} fps)",
        ctx.metrics.frame_count(),
        ctx.metrics.total_runtime(),
        ctx.metrics.avg_fps()
    );
    Ok(())
}
