//! Face detection overlays for still images.
//!
//! A [`Session`] holds a loaded image and derives every displayed view from
//! it: outlined and labelled faces, solid redaction of faces, or the image as
//! loaded. Detection itself is delegated to a [`FaceDetector`] running on a
//! worker thread.

pub mod detection;
pub mod error;
pub mod export;
pub mod raster;
pub mod render;
pub mod report;
pub mod session;
pub mod shapes;

pub use detection::{
    DetectedFace, DetectionClient, DetectionFailure, DetectionOutcome, DetectionResult, FaceDetector,
    FaceRegion, PendingDetection,
};
pub use error::SessionError;
pub use export::{DirectorySink, ImageSink};
pub use raster::RasterImage;
pub use render::{OverlayStyle, RedactionStyle};
pub use session::{Completion, Session, ViewPhase};
