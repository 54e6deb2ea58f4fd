// Edges are in image pixel coordinates. `right` and `bottom` are exclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rect {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

// imageproc stores sizes as u32 but adds them to i32 edges, so sizes past
// i32::MAX are cut back. The far edge moves inward, never wraps.
impl From<Rect> for imageproc::rect::Rect {
    fn from(r: Rect) -> imageproc::rect::Rect {
        let max = i32::MAX as u32;
        imageproc::rect::Rect::at(r.left, r.top).of_size(r.width().min(max), r.height().min(max))
    }
}

impl Rect {
    /// Returns `None` unless `left < right` and `top < bottom`.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Option<Rect> {
        if left < right && top < bottom {
            Some(Rect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    pub fn left(&self) -> i32 {
        self.left
    }
    pub fn top(&self) -> i32 {
        self.top
    }
    pub fn right(&self) -> i32 {
        self.right
    }
    pub fn bottom(&self) -> i32 {
        self.bottom
    }
    pub fn width(&self) -> u32 {
        self.right.abs_diff(self.left)
    }
    pub fn height(&self) -> u32 {
        self.bottom.abs_diff(self.top)
    }

    /// Grows (positive `d`) or shrinks (negative `d`) every edge by `d` pixels.
    pub fn inflate(&self, d: i32) -> Option<Rect> {
        Rect::new(
            self.left.saturating_sub(d),
            self.top.saturating_sub(d),
            self.right.saturating_add(d),
            self.bottom.saturating_add(d),
        )
    }

    /// The part of this rect that lies on a `width` x `height` canvas.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rect> {
        let max_x = i32::try_from(width).unwrap_or(i32::MAX);
        let max_y = i32::try_from(height).unwrap_or(i32::MAX);
        Rect::new(
            self.left.max(0),
            self.top.max(0),
            self.right.min(max_x),
            self.bottom.min(max_y),
        )
    }

    /// Moves every edge that lies outside `frame` onto the nearest frame edge.
    ///
    /// Unlike [`Rect::clip_to`] the edges stay edges: a box reaching past the
    /// frame on the left gets its left edge on the frame's left edge.
    pub fn clamp_within(&self, frame: Rect) -> Option<Rect> {
        Rect::new(
            self.left.clamp(frame.left, frame.right),
            self.top.clamp(frame.top, frame.bottom),
            self.right.clamp(frame.left, frame.right),
            self.bottom.clamp(frame.top, frame.bottom),
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_edges() {
        assert!(Rect::new(10, 10, 10, 20).is_none());
        assert!(Rect::new(10, 20, 30, 5).is_none());
        assert!(Rect::new(-5, -5, 5, 5).is_some());
    }

    #[test]
    fn width_spans_the_whole_i32_range() {
        let r = Rect::new(i32::MIN, -1, i32::MAX, 1).unwrap();
        assert_eq!(r.width(), u32::MAX);
        assert_eq!(r.height(), 2);
    }

    #[test]
    fn clamp_pulls_edges_into_frame() {
        let frame = Rect::new(-2, -2, 102, 102).unwrap();
        let wide = Rect::new(-2_000_000_000, 10, 2_000_000_000, 50).unwrap();
        assert_eq!(wide.clamp_within(frame), Rect::new(-2, 10, 102, 50));

        let inside = Rect::new(5, 5, 20, 20).unwrap();
        assert_eq!(inside.clamp_within(frame), Some(inside));

        let beyond = Rect::new(200, 0, 300, 10).unwrap();
        assert!(beyond.clamp_within(frame).is_none());
    }

    #[test]
    fn clip_keeps_intersection_only() {
        let r = Rect::new(80, -10, 130, 40).unwrap();
        let clipped = r.clip_to(100, 100).unwrap();
        assert_eq!(clipped, Rect::new(80, 0, 100, 40).unwrap());

        let outside = Rect::new(120, 0, 140, 10).unwrap();
        assert!(outside.clip_to(100, 100).is_none());
    }

    #[test]
    fn inflate_and_shrink() {
        let r = Rect::new(10, 10, 20, 20).unwrap();
        assert_eq!(r.inflate(2), Rect::new(8, 8, 22, 22));
        assert_eq!(r.inflate(-4), Rect::new(14, 14, 16, 16));
        assert_eq!(r.inflate(-5), None);
    }

    #[test]
    fn converts_to_imageproc() {
        let r: imageproc::rect::Rect = Rect::new(3, 4, 13, 9).unwrap().into();
        assert_eq!((r.left(), r.top(), r.width(), r.height()), (3, 4, 10, 5));
    }

    #[test]
    fn huge_conversion_does_not_overflow() {
        let r: imageproc::rect::Rect = Rect::new(-2_000_000_000, 0, 2_000_000_000, 10)
            .unwrap()
            .into();
        assert_eq!(r.left(), -2_000_000_000);
        assert_eq!(r.width(), i32::MAX as u32);
        assert!(r.right() < 2_000_000_000);
    }
}
