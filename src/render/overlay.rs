use crate::detection::FaceRegion;
use crate::raster::RasterImage;
use crate::shapes::Rect;
use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::Rgba;
use imageproc::drawing;
use std::sync::LazyLock;
use tracing::{Level, span, trace, warn};

/// Image width at which the style's pixel sizes apply unscaled.
pub const REFERENCE_WIDTH: f32 = 1080.;

static LABEL_FONT: LazyLock<Option<FontRef<'static>>> = LazyLock::new(|| {
    match FontRef::try_from_slice(include_bytes!("../../assets/DejaVuSans-Bold.ttf")) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("Bundled label font is unreadable, labels disabled: {e:?}");
            None
        }
    }
});

/// Sizes are in pixels for an image exactly `reference_width` wide and are
/// scaled linearly with the actual width.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub reference_width: f32,
    pub stroke_width: f32,
    pub text_size: f32,
    /// Gap between the label baseline and the top edge of the box.
    pub label_margin: f32,
    pub box_color: Rgba<u8>,
    pub label_color: Rgba<u8>,
}

impl Default for OverlayStyle {
    fn default() -> OverlayStyle {
        OverlayStyle {
            reference_width: REFERENCE_WIDTH,
            stroke_width: 6.,
            text_size: 40.,
            label_margin: 10.,
            box_color: Rgba([255, 0, 0, 255]),
            label_color: Rgba([255, 255, 0, 255]),
        }
    }
}

impl OverlayStyle {
    pub fn scale_for(&self, width: u32) -> f32 {
        if self.reference_width > 0. {
            width as f32 / self.reference_width
        } else {
            1.
        }
    }
}

/// Outlines every face and labels it `Face {id}` above its top-left corner.
///
/// Boxes and labels that land partly or wholly off the canvas are clipped.
pub fn render_overlay(base: &RasterImage, faces: &[FaceRegion], style: &OverlayStyle) -> RasterImage {
    let span = span!(Level::DEBUG, "render_overlay", faces = faces.len());
    let _guard = span.enter();

    let scale = style.scale_for(base.width());
    let stroke = ((style.stroke_width * scale).round() as i32).max(1);
    let text_px = (style.text_size * scale).max(1.);
    let margin = style.label_margin * scale;
    trace!("scale {scale}, stroke {stroke}px, text {text_px}px");

    // Edges pulled into this frame still land off the canvas, and lines
    // stay short however far a box reaches.
    let (width, height) = (canvas_extent(base.width()), canvas_extent(base.height()));
    let frame = Rect::new(
        -stroke,
        -stroke,
        width.saturating_add(stroke),
        height.saturating_add(stroke),
    );

    let mut canvas = base.to_canvas();
    for face in faces {
        let bounds = face.bounds();

        // Stroke is centred on the box edge.
        for i in 0..stroke {
            let d = i - stroke / 2;
            let edge = bounds
                .inflate(d)
                .zip(frame)
                .and_then(|(edge, frame)| edge.clamp_within(frame));
            if let Some(edge) = edge {
                drawing::draw_hollow_rect_mut(&mut canvas, edge.into(), style.box_color);
            }
        }

        if let Some(font) = LABEL_FONT.as_ref() {
            let px = PxScale::from(text_px);
            let scaled = font.as_scaled(px);
            let text = format!("Face {}", face.id());
            let x = bounds.left();
            let y = (bounds.top() as f32 - margin - scaled.ascent()).round() as i32;

            let (text_w, _) = drawing::text_size(px, font, &text);
            let text_h = scaled.height().ceil() as i64;
            let (lx, ly) = (i64::from(x), i64::from(y));
            let visible = lx < i64::from(width)
                && ly < i64::from(height)
                && lx + i64::from(text_w) > 0
                && ly + text_h > 0;
            if visible {
                drawing::draw_text_mut(&mut canvas, style.label_color, x, y, px, font, &text);
            } else {
                trace!("Label for face {} is off the canvas", face.id());
            }
        }
    }

    RasterImage::from_canvas(canvas)
}

fn canvas_extent(len: u32) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::time::{Duration, Instant};

    const BG: Rgba<u8> = Rgba([40, 80, 120, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn base(width: u32, height: u32) -> RasterImage {
        RasterImage::new(RgbaImage::from_pixel(width, height, BG)).unwrap()
    }

    fn face(id: u32, left: i32, top: i32, right: i32, bottom: i32) -> FaceRegion {
        FaceRegion::new(id, Rect::new(left, top, right, bottom).unwrap(), None)
    }

    #[test]
    fn base_is_untouched() {
        let img = base(1080, 400);
        let before = img.pixels().clone();
        let out = render_overlay(&img, &[face(1, 100, 200, 300, 360)], &OverlayStyle::default());

        assert_eq!(img.pixels().as_raw(), before.as_raw());
        assert!(!out.same_identity(&img));
        assert!(!out.same_pixels(&img));
    }

    #[test]
    fn output_is_deterministic() {
        let img = base(640, 480);
        let faces = [face(1, 50, 60, 200, 220), face(2, 300, 10, 420, 150)];
        let style = OverlayStyle::default();

        let a = render_overlay(&img, &faces, &style);
        let b = render_overlay(&img, &faces, &style);
        assert_eq!(a.pixels().as_raw(), b.pixels().as_raw());
    }

    #[test]
    fn stroke_is_centred_on_the_edge() {
        let img = base(1080, 400);
        let out = render_overlay(&img, &[face(1, 100, 200, 300, 360)], &OverlayStyle::default());
        let px = out.pixels();

        // 6px stroke: 2px outside the edge, the edge itself, 3px inside.
        for x in 98..=103 {
            assert_eq!(*px.get_pixel(x, 280), RED, "x = {x}");
        }
        assert_eq!(*px.get_pixel(97, 280), BG);
        assert_eq!(*px.get_pixel(104, 280), BG);
        assert_eq!(*px.get_pixel(200, 280), BG);
    }

    #[test]
    fn stroke_scales_with_width() {
        let img = base(2160, 200);
        let out = render_overlay(&img, &[face(1, 500, 80, 900, 190)], &OverlayStyle::default());
        let px = out.pixels();

        for x in 495..=506 {
            assert_eq!(*px.get_pixel(x, 150), RED, "x = {x}");
        }
        assert_eq!(*px.get_pixel(494, 150), BG);
        assert_eq!(*px.get_pixel(507, 150), BG);
    }

    #[test]
    fn small_images_keep_a_visible_stroke() {
        let img = base(100, 100);
        let out = render_overlay(&img, &[face(1, 20, 20, 60, 60)], &OverlayStyle::default());
        assert_eq!(*out.pixels().get_pixel(20, 40), RED);
        assert_eq!(*out.pixels().get_pixel(21, 40), BG);
    }

    #[test]
    fn label_sits_above_the_box() {
        let img = base(1080, 400);
        let out = render_overlay(&img, &[face(1, 100, 200, 300, 360)], &OverlayStyle::default());
        let px = out.pixels();

        let mut label_pixels = 0;
        for y in 140..190 {
            for x in 100..300 {
                if *px.get_pixel(x, y) != BG {
                    label_pixels += 1;
                }
            }
        }
        assert!(label_pixels > 0);

        // Nothing is drawn between the baseline margin and the stroke.
        for x in 100..300 {
            assert_eq!(*px.get_pixel(x, 194), BG, "x = {x}");
        }
    }

    #[test]
    fn off_canvas_label_is_clipped() {
        let img = base(300, 200);
        let faces = [face(1, 0, 0, 80, 80), face(2, 250, 150, 400, 260)];
        let out = render_overlay(&img, &faces, &OverlayStyle::default());

        assert_eq!(out.width(), 300);
        assert_eq!(out.height(), 200);
        assert_eq!(*out.pixels().get_pixel(0, 40), RED);
    }

    #[test]
    fn box_off_the_canvas_draws_nothing() {
        let img = base(100, 100);
        let out = render_overlay(&img, &[face(1, 500, 500, 600, 600)], &OverlayStyle::default());
        assert!(out.same_pixels(&img));
    }

    #[test]
    fn box_far_wider_than_the_canvas() {
        let img = base(100, 100);
        let start = Instant::now();
        let out = render_overlay(
            &img,
            &[face(1, -2_000_000_000, 10, 2_000_000_000, 50)],
            &OverlayStyle::default(),
        );

        assert!(start.elapsed() < Duration::from_secs(2));
        let px = out.pixels();
        assert_eq!(*px.get_pixel(50, 10), RED);
        assert_eq!(*px.get_pixel(50, 49), RED);
        assert_eq!(*px.get_pixel(0, 30), BG);
        assert_eq!(*px.get_pixel(99, 30), BG);
    }

    #[test]
    fn box_spanning_every_coordinate() {
        let img = base(100, 100);
        let start = Instant::now();
        let out = render_overlay(
            &img,
            &[face(1, i32::MIN, i32::MIN, i32::MAX, i32::MAX)],
            &OverlayStyle::default(),
        );

        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(out.same_pixels(&img));
    }

    #[test]
    fn no_faces_copies_the_base() {
        let img = base(64, 48);
        let out = render_overlay(&img, &[], &OverlayStyle::default());
        assert!(out.same_pixels(&img));
        assert!(!out.same_identity(&img));
    }
}
