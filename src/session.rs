use crate::detection::{DetectionClient, DetectionOutcome, DetectionResult, PendingDetection};
use crate::error::SessionError;
use crate::export::ImageSink;
use crate::raster::RasterImage;
use crate::render::{OverlayStyle, RedactionStyle, render_overlay, render_redacted};
use crate::report::smile_report;
use image::RgbaImage;
use std::fmt;
use std::sync::Arc;
use tracing::{Level, debug, info, span, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    /// Nothing detected since the last load or reset.
    Pristine,
    /// A detection request is in flight.
    Detecting,
    /// A detection result for the loaded image is stored.
    Detected,
}

impl fmt::Display for ViewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewPhase::Pristine => write!(f, "no faces have been detected"),
            ViewPhase::Detecting => write!(f, "face detection is in flight"),
            ViewPhase::Detected => write!(f, "faces are detected"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Completion {
    /// The result was stored and the overlay is now displayed.
    Applied(Arc<DetectionResult>),
    /// The session was reset or reloaded after the request was issued.
    Discarded,
}

/// Owns the loaded image, the displayed image and the last detection result.
///
/// The loaded image is never modified. Every displayed image is derived from
/// it from scratch, so repeated overlays or redactions never compound.
/// `reset` and `load` bump a generation counter; detections issued under an
/// older generation are dropped when they complete.
pub struct Session {
    client: DetectionClient,
    overlay_style: OverlayStyle,
    redaction_style: RedactionStyle,
    pristine: RasterImage,
    current: RasterImage,
    last_detection: Option<Arc<DetectionResult>>,
    generation: u64,
    in_flight: Option<u64>,
}

impl Session {
    pub fn new(client: DetectionClient, image: RgbaImage) -> Result<Session, SessionError> {
        let pristine = RasterImage::new(image)?;
        info!(
            "Starting session on {}x{} image",
            pristine.width(),
            pristine.height()
        );

        Ok(Session {
            client,
            overlay_style: OverlayStyle::default(),
            redaction_style: RedactionStyle::default(),
            current: pristine.deep_copy(),
            pristine,
            last_detection: None,
            generation: 0,
            in_flight: None,
        })
    }

    pub fn with_overlay_style(mut self, style: OverlayStyle) -> Session {
        self.overlay_style = style;
        self
    }

    pub fn with_redaction_style(mut self, style: RedactionStyle) -> Session {
        self.redaction_style = style;
        self
    }

    pub fn phase(&self) -> ViewPhase {
        if self.in_flight.is_some() {
            ViewPhase::Detecting
        } else if self.last_detection.is_some() {
            ViewPhase::Detected
        } else {
            ViewPhase::Pristine
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The image as loaded.
    pub fn pristine(&self) -> &RasterImage {
        &self.pristine
    }

    /// The image currently on display, for handing to a save routine.
    pub fn current(&self) -> &RasterImage {
        &self.current
    }

    pub fn last_detection(&self) -> Option<&Arc<DetectionResult>> {
        self.last_detection.as_ref()
    }

    /// Replaces the loaded image. On error the session is left as it was.
    pub fn load(&mut self, image: RgbaImage) -> Result<(), SessionError> {
        let pristine = RasterImage::new(image)?;
        info!("Loaded {}x{} image", pristine.width(), pristine.height());

        self.current = pristine.deep_copy();
        self.pristine = pristine;
        self.start_generation();
        Ok(())
    }

    /// Restores the loaded image and forgets any detection, including one in flight.
    pub fn reset(&mut self) {
        debug!("Resetting session at generation {}", self.generation);
        self.current = self.pristine.deep_copy();
        self.start_generation();
    }

    fn start_generation(&mut self) {
        self.generation += 1;
        self.last_detection = None;
        if let Some(stale) = self.in_flight.take() {
            debug!("Abandoning detection from generation {stale}");
        }
    }

    /// Starts face detection on the loaded image.
    ///
    /// Detection always runs on the loaded image, never on a rendered view.
    /// Only one request may be in flight; a second one fails with
    /// [`SessionError::Busy`]. A request that is dropped instead of completed
    /// with [`Session::complete`] or [`Session::finish`] keeps the session busy until `reset` or `load`.
    pub fn request_detection(&mut self) -> Result<PendingDetection, SessionError> {
        if self.in_flight.is_some() {
            return Err(SessionError::Busy);
        }

        debug!("Requesting detection at generation {}", self.generation);
        let pending = self.client.spawn(&self.pristine, self.generation);
        self.in_flight = Some(self.generation);
        Ok(pending)
    }

    /// Waits for `pending` and applies it if it still belongs to this session.
    ///
    /// Holds the session for the whole wait. Callers that need to `reset` or
    /// `load` meanwhile await [`PendingDetection::outcome`] themselves and
    /// pass the result to [`Session::finish`].
    pub async fn complete(
        &mut self,
        pending: PendingDetection,
    ) -> Result<Completion, SessionError> {
        let generation = pending.generation();
        let outcome = pending.outcome().await;
        self.finish(generation, outcome)
    }

    /// Applies the outcome of a request issued under `generation`.
    ///
    /// On success the overlay becomes the displayed image. On failure the
    /// stored result and the displayed image are kept as they were. Outcomes
    /// from before the last `reset` or `load` are dropped.
    pub fn finish(
        &mut self,
        generation: u64,
        outcome: DetectionOutcome,
    ) -> Result<Completion, SessionError> {
        let span = span!(Level::DEBUG, "finish_detection", generation);
        let _guard = span.enter();

        if generation != self.generation || self.in_flight != Some(generation) {
            debug!(
                "Dropping stale detection from generation {generation}, now at {}",
                self.generation
            );
            return Ok(Completion::Discarded);
        }
        self.in_flight = None;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!("{e}");
                return Err(e.into());
            }
        };

        if !result.is_for(&self.pristine) {
            debug!("Dropping detection computed against a different image");
            return Ok(Completion::Discarded);
        }

        let result = Arc::new(result);
        self.current = render_overlay(&self.pristine, result.faces(), &self.overlay_style);
        self.last_detection = Some(Arc::clone(&result));
        info!("Detected {} faces", result.faces().len());

        Ok(Completion::Applied(result))
    }

    pub fn complete_blocking(
        &mut self,
        pending: PendingDetection,
    ) -> Result<Completion, SessionError> {
        pollster::block_on(self.complete(pending))
    }

    /// Requests detection and waits for it.
    pub async fn detect(&mut self) -> Result<Completion, SessionError> {
        let pending = self.request_detection()?;
        self.complete(pending).await
    }

    fn stored_detection(&self, operation: &'static str) -> Result<&DetectionResult, SessionError> {
        match (self.phase(), &self.last_detection) {
            (ViewPhase::Detected, Some(d)) if d.is_for(&self.pristine) => Ok(d),
            (phase, _) => Err(SessionError::InvalidState { operation, phase }),
        }
    }

    /// Boxes and labels over the loaded image. The displayed image is unchanged.
    pub fn render_overlay_view(&self) -> Result<RasterImage, SessionError> {
        let detection = self.stored_detection("render overlay")?;
        Ok(render_overlay(
            &self.pristine,
            detection.faces(),
            &self.overlay_style,
        ))
    }

    /// Redacted faces over the loaded image. The displayed image is unchanged.
    pub fn render_redacted_view(&self) -> Result<RasterImage, SessionError> {
        let detection = self.stored_detection("render redaction")?;
        Ok(render_redacted(
            &self.pristine,
            detection.faces(),
            &self.redaction_style,
        ))
    }

    /// Displays the overlay view.
    pub fn apply_overlay(&mut self) -> Result<&RasterImage, SessionError> {
        self.current = self.render_overlay_view()?;
        Ok(&self.current)
    }

    /// Displays the redacted view.
    pub fn apply_redaction(&mut self) -> Result<&RasterImage, SessionError> {
        self.current = self.render_redacted_view()?;
        Ok(&self.current)
    }

    pub fn report(&self) -> Result<Vec<String>, SessionError> {
        let detection = self.stored_detection("report smiles")?;
        Ok(smile_report(detection.faces()))
    }

    /// Hands the displayed image to `sink`.
    pub fn save_current(&self, sink: &dyn ImageSink, label: &str) -> Result<(), SessionError> {
        sink.save(&self.current, label).map_err(SessionError::Save)
    }
}
