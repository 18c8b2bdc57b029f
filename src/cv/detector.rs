use anyhow::{Context, Result, anyhow};
use log::{debug, error, info};
use opencv::core::{AlgorithmHint, Mat, Rect, Size, Vector};
use opencv::imgproc;
use opencv::objdetect::{self, CascadeClassifier};
use opencv::prelude::*;
use std::path::Path;
use std::time::Instant;

use crate::conf::DetectorConf;

/// Haar cascade face detector.
pub struct FaceDetector {
    classifier: CascadeClassifier,
    params: DetectorConf,
    gray: Mat,
}

impl FaceDetector {
    pub fn new(haar_file: &Path, params: DetectorConf) -> Result<Self> {
        info!("Loading face classifier data from {}", haar_file.display());
        let start_time = Instant::now();

        let path = haar_file.to_str().context("Invalid classifier path")?;
        let classifier = match CascadeClassifier::new(path) {
            Ok(classifier) => classifier,
            Err(e) => {
                error!("Failed to load classifier: {}", e);
                return Err(anyhow!("Can't load classifier data: {e}"));
            }
        };

        // OpenCV hands back an empty cascade for unreadable files
        if classifier.empty()? {
            return Err(anyhow!(
                "Can't load classifier data from {}",
                haar_file.display()
            ));
        }

        debug!("Classifier loaded in {:?}", start_time.elapsed());
        Ok(Self {
            classifier,
            params,
            gray: Mat::default(),
        })
    }

    fn flags(&self) -> i32 {
        if self.params.canny_pruning {
            objdetect::CASCADE_DO_CANNY_PRUNING
        } else {
            0
        }
    }

    /// Bounding boxes of all faces found in a BGR frame.
    pub fn detect(&mut self, frame: &Mat) -> Result<Vec<Rect>> {
        let start_time = Instant::now();

        imgproc::cvt_color(
            frame,
            &mut self.gray,
            imgproc::COLOR_BGR2GRAY,
            0,
            AlgorithmHint::ALGO_HINT_DEFAULT,
        )
        .context("Failed to convert frame to grayscale")?;

        let min_size = Size::new(self.params.min_face_size, self.params.min_face_size);
        let mut faces = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                &self.gray,
                &mut faces,
                self.params.scale_factor,
                self.params.min_neighbors,
                self.flags(),
                min_size,
                Size::new(0, 0),
            )
            .context("Face detection failed")?;

        debug!(
            "Detected {} faces in {:?}",
            faces.len(),
            start_time.elapsed()
        );
        Ok(faces.to_vec())
    }
}
