use crate::detection::FaceRegion;
use crate::raster::RasterImage;
use image::{Rgb, Rgba};
use imageproc::drawing;
use tracing::{Level, span, trace};

#[derive(Debug, Clone, PartialEq)]
pub struct RedactionStyle {
    /// Always painted fully opaque.
    pub mask_color: Rgb<u8>,
}

impl Default for RedactionStyle {
    fn default() -> RedactionStyle {
        RedactionStyle {
            mask_color: Rgb([0, 0, 0]),
        }
    }
}

/// Paints every face box solid with the mask colour.
///
/// Only the part of a box that lies on the image is painted.
pub fn render_redacted(
    base: &RasterImage,
    faces: &[FaceRegion],
    style: &RedactionStyle,
) -> RasterImage {
    let span = span!(Level::DEBUG, "render_redacted", faces = faces.len());
    let _guard = span.enter();

    let [r, g, b] = style.mask_color.0;
    let mask = Rgba([r, g, b, u8::MAX]);

    let mut canvas = base.to_canvas();
    for face in faces {
        match face.bounds().clip_to(base.width(), base.height()) {
            Some(area) => drawing::draw_filled_rect_mut(&mut canvas, area.into(), mask),
            None => trace!("Face {} lies outside the image, nothing to redact", face.id()),
        }
    }

    RasterImage::from_canvas(canvas)
}
