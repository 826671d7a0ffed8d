//! Drawing collaborators consumed by widgets.
//!
//! Widgets never rasterize anything themselves. Text is turned into cached,
//! opaque surfaces by a [`TextRenderer`], and a [`Painter`] draws primitives
//! and blits those surfaces. Both are implemented by the embedding backend.
//!
//! # Surface Lifecycle
//!
//! ```ignore
//! let id = painter.render_text("Alice", Color::BLACK);
//! painter.blit(id, Point::new(4, 22));
//! // ... many frames later, once the text is no longer shown:
//! painter.release_surface(id);
//! ```

use slotmap::new_key_type;

use super::types::{Color, Point, Rect, Size};

new_key_type! {
    /// Handle to a rendered surface owned by the backend.
    ///
    /// Handles stay valid until passed to [`TextRenderer::release_surface`].
    pub struct SurfaceId;
}

/// Renders text into cacheable surfaces.
pub trait TextRenderer {
    /// Render `text` in `color` and return a handle to the new surface.
    fn render_text(&mut self, text: &str, color: Color) -> SurfaceId;

    /// Pixel size of a previously rendered surface.
    ///
    /// Unknown handles report [`Size::ZERO`].
    fn surface_size(&self, id: SurfaceId) -> Size;

    /// Release a surface. Releasing an unknown handle is a no-op.
    fn release_surface(&mut self, id: SurfaceId);
}

/// The 2D drawing interface a widget paints through.
///
/// Coordinates are widget-local pixels.
pub trait Painter: TextRenderer {
    // =========================================================================
    // Primitives
    // =========================================================================

    /// Fill a rectangle with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a horizontal line from `x1` to `x2` at row `y`.
    fn draw_line_h(&mut self, x1: i32, x2: i32, y: i32, color: Color);

    /// Draw a vertical line from `y1` to `y2` at column `x`.
    fn draw_line_v(&mut self, x: i32, y1: i32, y2: i32, color: Color);

    /// Alpha-blend a color over a rectangle.
    fn blend_rect(&mut self, rect: Rect, color: Color);

    /// Draw a surface with its top-left corner at `at`.
    fn blit(&mut self, id: SurfaceId, at: Point);

    // =========================================================================
    // Clipping
    // =========================================================================

    /// Push a clip rectangle, intersected with the current one.
    fn clip_rect(&mut self, rect: Rect);

    /// Pop the most recently pushed clip rectangle.
    fn restore_clip(&mut self);
}
