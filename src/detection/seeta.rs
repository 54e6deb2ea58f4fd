use super::{DetectedFace, FaceDetector};
use anyhow::{Context, Result};
use image::RgbaImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// SeetaFace only finds frontal faces and does not classify smiles, so every
/// face it reports has no smile probability.
pub struct SeetaDetector {
    model: rustface::Model,
    min_face_size: u32,
    score_thresh: f64,
}

impl SeetaDetector {
    pub fn from_file(path: &Path) -> Result<SeetaDetector> {
        let file = File::open(path)
            .with_context(|| format!("failed to open SeetaFace model {}", path.display()))?;
        let model = rustface::read_model(BufReader::new(file))
            .with_context(|| format!("failed to read SeetaFace model {}", path.display()))?;

        Ok(SeetaDetector {
            model,
            min_face_size: 20,
            score_thresh: 2.0,
        })
    }

    pub fn min_face_size(mut self, size: u32) -> SeetaDetector {
        self.min_face_size = size.max(20);
        self
    }

    pub fn score_thresh(mut self, thresh: f64) -> SeetaDetector {
        self.score_thresh = thresh;
        self
    }
}

impl FaceDetector for SeetaDetector {
    fn detect(&self, img: &RgbaImage) -> Result<Vec<DetectedFace>> {
        let gray = image::imageops::grayscale(img);
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(self.score_thresh);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(
            gray.as_raw(),
            gray.width(),
            gray.height(),
        ));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                trace!(
                    "SeetaFace hit at ({}, {}) {}x{} score {}",
                    bbox.x(),
                    bbox.y(),
                    bbox.width(),
                    bbox.height(),
                    face.score()
                );
                DetectedFace {
                    left: bbox.x(),
                    top: bbox.y(),
                    right: bbox.x() + bbox.width() as i32,
                    bottom: bbox.y() + bbox.height() as i32,
                    smile_probability: None,
                }
            })
            .collect())
    }
}
