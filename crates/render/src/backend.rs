use lge_common::{Color565, FrameView, ScreenSize};

/// Primitive drawing interface exposed by the display driver.
///
/// Fills write to an internal back buffer; `blit_region` pushes part of
/// that buffer to the physical display.
pub trait DrawBackend {
    /// Canvas size in pixels.
    fn size(&self) -> ScreenSize;

    fn fill_circle(&mut self, x: i32, y: i32, r: i32, color: Color565);

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color565);

    #[allow(clippy::too_many_arguments)]
    fn fill_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color565,
    );

    fn fill_screen(&mut self, color: Color565);

    /// Draw `text` on one line with its top-left cell at `x, y`, one
    /// `GLYPH_WIDTH` x `GLYPH_HEIGHT` cell per byte.
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color565);

    /// Copy `x, y, w, h` of the back buffer to the display.
    fn blit_region(&mut self, x: i32, y: i32, w: i32, h: i32);

    /// Raw read access to the back buffer, if the backend keeps one.
    fn frame_view(&self) -> Option<FrameView<'_>> {
        None
    }
}
