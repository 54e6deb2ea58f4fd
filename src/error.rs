use crate::detection::DetectionFailure;
use crate::session::ViewPhase;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Detection(#[from] DetectionFailure),

    #[error("cannot {operation}: {phase}")]
    InvalidState {
        operation: &'static str,
        phase: ViewPhase,
    },

    #[error("a face detection request is already in flight")]
    Busy,

    #[error("image dimensions are zero ({width}x{height})")]
    EmptyInput { width: u32, height: u32 },

    #[error("failed to save image: {0:#}")]
    Save(anyhow::Error),
}
