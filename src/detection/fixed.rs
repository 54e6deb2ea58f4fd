use super::{DetectedFace, FaceDetector};
use image::RgbaImage;
use std::str::FromStr;
use thiserror::Error;

/// Detector that reports the same faces for every image.
///
/// Used when face boxes come from somewhere other than a model, e.g. the
/// command line.
#[derive(Debug, Clone, Default)]
pub struct FixedDetector {
    faces: Vec<DetectedFace>,
}

impl FixedDetector {
    pub fn new(faces: Vec<DetectedFace>) -> FixedDetector {
        FixedDetector { faces }
    }
}

impl FaceDetector for FixedDetector {
    fn detect(&self, _img: &RgbaImage) -> anyhow::Result<Vec<DetectedFace>> {
        Ok(self.faces.clone())
    }
}

#[derive(Debug, Error)]
#[error("expected LEFT,TOP,RIGHT,BOTTOM[,SMILE], got {0:?}")]
pub struct ParseFaceError(String);

impl FromStr for DetectedFace {
    type Err = ParseFaceError;

    fn from_str(s: &str) -> Result<DetectedFace, ParseFaceError> {
        let err = || ParseFaceError(s.to_string());
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 && parts.len() != 5 {
            return Err(err());
        }

        let mut edges = [0i32; 4];
        for (edge, part) in edges.iter_mut().zip(&parts) {
            *edge = part.parse().map_err(|_| err())?;
        }
        let smile_probability = match parts.get(4) {
            Some(p) => Some(p.parse::<f32>().map_err(|_| err())?),
            None => None,
        };

        Ok(DetectedFace {
            left: edges[0],
            top: edges[1],
            right: edges[2],
            bottom: edges[3],
            smile_probability,
        })
    }
}
