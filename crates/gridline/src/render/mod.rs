//! Render-side types and the drawing traits widgets paint through.

mod surface;
mod types;

pub use surface::{Painter, SurfaceId, TextRenderer};
pub use types::{Color, Point, Rect, Size};
