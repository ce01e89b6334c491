use serde::{Deserialize, Serialize};

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// The whole screen as a rect, or `None` for a zero-sized screen.
    pub fn full_rect(&self) -> Option<DirtyRect> {
        DirtyRect::clipped(0, 0, self.width as i32, self.height as i32, *self)
    }
}

/// Pixel-space box with inclusive bounds: `x1 <= x2`, `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirtyRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl DirtyRect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Clip an `x, y, w, h` region to the screen. Returns `None` when nothing
    /// of it is on screen.
    pub fn clipped(x: i32, y: i32, w: i32, h: i32, screen: ScreenSize) -> Option<Self> {
        if w <= 0 || h <= 0 {
            return None;
        }
        let (x, y) = (x as i64, y as i64);
        Self::clipped_bounds(x, y, x + w as i64 - 1, y + h as i64 - 1, screen)
    }

    /// Clip inclusive bounds to the screen. Bounds are taken as `i64` so
    /// callers can pass `x - r`, `x + r` and similar without overflow.
    pub fn clipped_bounds(x1: i64, y1: i64, x2: i64, y2: i64, screen: ScreenSize) -> Option<Self> {
        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(screen.width as i64 - 1);
        let y2 = y2.min(screen.height as i64 - 1);
        (x1 <= x2 && y1 <= y2).then(|| Self {
            x1: x1 as i32,
            y1: y1 as i32,
            x2: x2 as i32,
            y2: y2 as i32,
        })
    }

    /// Width in pixels, saturating at `i32::MAX`.
    pub fn width(&self) -> i32 {
        span(self.x1, self.x2)
    }

    pub fn height(&self) -> i32 {
        span(self.y1, self.y2)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Smallest rect covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// True if the rects overlap or are within one pixel of each other,
    /// i.e. their 1-pixel-expanded boxes intersect.
    pub fn touches(&self, other: &Self) -> bool {
        let (a, b) = (self.widen(), other.widen());
        !(a.2 + 1 < b.0 - 1 || a.0 - 1 > b.2 + 1 || a.3 + 1 < b.1 - 1 || a.1 - 1 > b.3 + 1)
    }

    pub fn intersects(&self, other: &Self) -> bool {
        !(self.x2 < other.x1 || self.x1 > other.x2 || self.y2 < other.y1 || self.y1 > other.y2)
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.x1 <= other.x1 && self.y1 <= other.y1 && self.x2 >= other.x2 && self.y2 >= other.y2
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    fn widen(&self) -> (i64, i64, i64, i64) {
        (self.x1 as i64, self.y1 as i64, self.x2 as i64, self.y2 as i64)
    }
}

fn span(lo: i32, hi: i32) -> i32 {
    (hi as i64 - lo as i64 + 1).clamp(0, i32::MAX as i64) as i32
}

/// Borrowed, row-stride-aware raw-byte view of a framebuffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub bytes: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Bytes from the start of one row to the next.
    pub stride: usize,
    pub bytes_per_pixel: usize,
}

impl<'a> FrameView<'a> {
    /// A tightly packed view (`stride = width * bytes_per_pixel`).
    pub fn packed(bytes: &'a [u8], width: u32, height: u32, bytes_per_pixel: usize) -> Self {
        Self {
            bytes,
            width,
            height,
            stride: width as usize * bytes_per_pixel,
            bytes_per_pixel,
        }
    }

    /// Bytes of pixels `[x1, x2)` on row `y`, or an empty slice if the span
    /// falls outside the buffer.
    pub fn row(&self, y: u32, x1: u32, x2: u32) -> &'a [u8] {
        let start = y as usize * self.stride + x1 as usize * self.bytes_per_pixel;
        let end = y as usize * self.stride + x2 as usize * self.bytes_per_pixel;
        self.bytes.get(start..end).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: ScreenSize = ScreenSize::new(240, 320);

    #[test]
    fn clipped_region_inside_screen() {
        let r = DirtyRect::clipped(10, 10, 5, 5, SCREEN).unwrap();
        assert_eq!(r, DirtyRect::new(10, 10, 14, 14));
        assert_eq!(r.width(), 5);
        assert_eq!(r.area(), 25);
    }

    #[test]
    fn clipped_region_partially_off_screen() {
        let r = DirtyRect::clipped(-5, 310, 20, 20, SCREEN).unwrap();
        assert_eq!(r, DirtyRect::new(0, 310, 14, 319));
    }

    #[test]
    fn clipped_region_fully_off_screen_or_empty() {
        assert!(DirtyRect::clipped(300, 0, 10, 10, SCREEN).is_none());
        assert!(DirtyRect::clipped(-20, -20, 10, 10, SCREEN).is_none());
        assert!(DirtyRect::clipped(0, 0, 0, 10, SCREEN).is_none());
        assert!(DirtyRect::clipped(0, 0, 10, -1, SCREEN).is_none());
    }

    #[test]
    fn clipped_bounds_survive_extreme_coordinates() {
        let r = DirtyRect::clipped_bounds(i32::MIN as i64, 0, i32::MAX as i64, 10, SCREEN).unwrap();
        assert_eq!(r, DirtyRect::new(0, 0, 239, 10));
        assert_eq!(r.width(), 240);

        let r = DirtyRect::clipped(i32::MAX - 5, 0, i32::MAX, 10, SCREEN);
        assert!(r.is_none());
        assert!(DirtyRect::clipped_bounds(5, 5, 4, 9, SCREEN).is_none());
    }

    #[test]
    fn unclipped_extents_saturate() {
        let wide = DirtyRect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(wide.width(), i32::MAX);
        assert_eq!(wide.height(), i32::MAX);
        assert!(wide.touches(&DirtyRect::new(i32::MAX, 0, i32::MAX, 0)));
        assert!(!DirtyRect::new(i32::MAX, 0, i32::MAX, 0).touches(&DirtyRect::new(0, 0, 1, 1)));
    }

    #[test]
    fn touches_includes_one_pixel_gap() {
        let a = DirtyRect::new(0, 0, 9, 9);
        assert!(a.touches(&DirtyRect::new(10, 0, 12, 9)));
        assert!(a.touches(&DirtyRect::new(11, 0, 12, 9)));
        assert!(!a.touches(&DirtyRect::new(12, 0, 14, 9)));
        assert!(!a.intersects(&DirtyRect::new(10, 0, 12, 9)));
    }

    #[test]
    fn union_covers_both() {
        let a = DirtyRect::new(10, 10, 14, 14);
        let b = DirtyRect::new(14, 14, 18, 18);
        let u = a.union(&b);
        assert_eq!(u, DirtyRect::new(10, 10, 18, 18));
        assert!(u.contains(&a) && u.contains(&b));
    }

    #[test]
    fn frame_view_rows_respect_stride() {
        // 3x2 pixels, 2 bytes each, rows padded to 8 bytes.
        let bytes = [1, 1, 2, 2, 3, 3, 0, 0, 4, 4, 5, 5, 6, 6, 0, 0];
        let view = FrameView {
            bytes: &bytes,
            width: 3,
            height: 2,
            stride: 8,
            bytes_per_pixel: 2,
        };
        assert_eq!(view.row(0, 0, 3), &[1, 1, 2, 2, 3, 3]);
        assert_eq!(view.row(1, 1, 2), &[5, 5]);
        assert!(view.row(5, 0, 3).is_empty());
    }
}
