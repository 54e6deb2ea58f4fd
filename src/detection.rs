use crate::raster::RasterImage;
use crate::shapes::Rect;
use anyhow::anyhow;
use image::RgbaImage;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{Level, debug, span, trace, warn};

pub mod fixed;
#[cfg(feature = "rustface")]
pub mod seeta;

/// A face as reported by a detector backend, before validation and numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedFace {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    /// Probability in `[0, 1]` that the face is smiling, if the backend classifies smiles.
    pub smile_probability: Option<f32>,
}

/// Pluggable face detection backend.
///
/// Implementations run on a worker thread and must not assume anything about
/// the caller's state while they run.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in `img`. No faces is `Ok(vec![])`, not an error.
    fn detect(&self, img: &RgbaImage) -> anyhow::Result<Vec<DetectedFace>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceRegion {
    id: u32,
    bounds: Rect,
    smile_probability: Option<f32>,
}

impl FaceRegion {
    pub(crate) fn new(id: u32, bounds: Rect, smile_probability: Option<f32>) -> FaceRegion {
        FaceRegion {
            id,
            bounds,
            smile_probability,
        }
    }

    /// 1-based position in detector order.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn smile_probability(&self) -> Option<f32> {
        self.smile_probability
    }
}

/// Faces found by one detection call, tied to the image they were found on.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    faces: Vec<FaceRegion>,
    source: RasterImage,
}

impl DetectionResult {
    pub fn faces(&self) -> &[FaceRegion] {
        &self.faces
    }

    /// Whether this result was computed against `img` (by identity).
    pub fn is_for(&self, img: &RasterImage) -> bool {
        self.source.same_identity(img)
    }
}

#[derive(Debug, Error)]
#[error("face detection failed: {cause:#}")]
pub struct DetectionFailure {
    cause: anyhow::Error,
}

impl DetectionFailure {
    pub fn new(cause: anyhow::Error) -> DetectionFailure {
        DetectionFailure { cause }
    }

    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }
}

/// What a worker reports back for one request.
pub type DetectionOutcome = Result<DetectionResult, DetectionFailure>;

/// A detection running on a worker thread.
pub struct PendingDetection {
    generation: u64,
    rx: flume::Receiver<DetectionOutcome>,
}

impl PendingDetection {
    /// Session generation at the time the request was issued.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits for the worker to report back.
    ///
    /// This does not touch the session, so the caller may keep using it
    /// (including `reset` or `load`) while waiting. Hand the outcome to
    /// [`crate::Session::finish`] together with [`PendingDetection::generation`].
    pub async fn outcome(self) -> DetectionOutcome {
        match self.rx.recv_async().await {
            Ok(outcome) => outcome,
            Err(_) => Err(DetectionFailure::new(anyhow!(
                "detection worker exited without a result"
            ))),
        }
    }
}

/// Dispatches detection requests to a [`FaceDetector`] off the caller's thread.
#[derive(Clone)]
pub struct DetectionClient {
    detector: Arc<dyn FaceDetector>,
}

impl DetectionClient {
    pub fn new(detector: impl FaceDetector + 'static) -> DetectionClient {
        DetectionClient {
            detector: Arc::new(detector),
        }
    }

    pub fn from_shared(detector: Arc<dyn FaceDetector>) -> DetectionClient {
        DetectionClient { detector }
    }

    /// Starts detection on `img` in a dedicated worker thread.
    pub fn spawn(&self, img: &RasterImage, generation: u64) -> PendingDetection {
        let (tx, rx) = flume::bounded(1);
        let detector = Arc::clone(&self.detector);
        let source = img.clone();
        let worker_tx = tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("face-detection-{generation}"))
            .spawn(move || {
                let span = span!(Level::DEBUG, "face_detection", generation);
                let _guard = span.enter();

                let outcome = run_detector(detector.as_ref(), source);
                if worker_tx.send(outcome).is_err() {
                    trace!("Detection receiver dropped, discarding result");
                }
            });

        if let Err(e) = spawned {
            warn!("Failed to spawn detection worker: {e:?}");
            if tx.send(Err(DetectionFailure::new(e.into()))).is_err() {
                trace!("Detection receiver dropped, discarding spawn failure");
            }
        }

        PendingDetection { generation, rx }
    }

    /// Runs detection on the calling thread.
    pub fn detect_now(&self, img: &RasterImage) -> DetectionOutcome {
        run_detector(self.detector.as_ref(), img.clone())
    }
}

fn run_detector(detector: &dyn FaceDetector, source: RasterImage) -> DetectionOutcome {
    debug!(
        "Running face detector on {}x{} image",
        source.width(),
        source.height()
    );
    let raw = detector
        .detect(source.pixels())
        .map_err(DetectionFailure::new)?;

    let mut faces = Vec::with_capacity(raw.len());
    for (idx, face) in raw.into_iter().enumerate() {
        let id = idx as u32 + 1;
        let bounds = Rect::new(face.left, face.top, face.right, face.bottom).ok_or_else(|| {
            DetectionFailure::new(anyhow!("detector returned an empty box for face {id}: {face:?}"))
        })?;
        trace!("Face {id}: {bounds:?}");
        faces.push(FaceRegion::new(id, bounds, face.smile_probability));
    }

    debug!("Detected {} faces", faces.len());
    Ok(DetectionResult { faces, source })
}
