use crate::error::SessionError;
use image::RgbaImage;
use std::sync::Arc;

/// A decoded RGBA8 image that is never written to after construction.
///
/// Clones share the same pixel storage. Since nothing can mutate that storage,
/// sharing is safe across threads; renderers always allocate a new buffer.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: Arc<RgbaImage>,
}

impl RasterImage {
    /// Wraps decoded pixels. Zero-sized images are rejected.
    pub fn new(pixels: RgbaImage) -> Result<RasterImage, SessionError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(SessionError::EmptyInput { width, height });
        }

        Ok(RasterImage {
            pixels: Arc::new(pixels),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// A new image with its own pixel storage and the same contents.
    pub fn deep_copy(&self) -> RasterImage {
        RasterImage {
            pixels: Arc::new(RgbaImage::clone(&self.pixels)),
        }
    }

    /// Seals a renderer's canvas. Renderers never change dimensions, so the
    /// canvas is as non-empty as the image it was copied from.
    pub(crate) fn from_canvas(canvas: RgbaImage) -> RasterImage {
        RasterImage {
            pixels: Arc::new(canvas),
        }
    }

    /// Mutable working copy for a renderer.
    pub(crate) fn to_canvas(&self) -> RgbaImage {
        RgbaImage::clone(&self.pixels)
    }

    /// True if both handles refer to the same pixel storage.
    pub fn same_identity(&self, other: &RasterImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// True if both images have identical dimensions and bytes.
    pub fn same_pixels(&self, other: &RasterImage) -> bool {
        self.pixels.dimensions() == other.pixels.dimensions()
            && self.pixels.as_raw() == other.pixels.as_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn rejects_zero_sized_input() {
        let err = RasterImage::new(RgbaImage::new(0, 12)).unwrap_err();
        assert!(matches!(
            err,
            SessionError::EmptyInput {
                width: 0,
                height: 12
            }
        ));
        assert!(RasterImage::new(RgbaImage::new(4, 0)).is_err());
    }

    #[test]
    fn deep_copy_has_new_identity() {
        let img = RasterImage::new(RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 255]))).unwrap();
        let shared = img.clone();
        let copied = img.deep_copy();

        assert!(img.same_identity(&shared));
        assert!(!img.same_identity(&copied));
        assert!(img.same_pixels(&copied));
    }
}
