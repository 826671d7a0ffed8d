//! ScrollBar implementation.
//!
//! [`ScrollBar`] is the scrollbar model embedded in scrolling widgets. It
//! owns the value/range bookkeeping, thumb geometry and drag handling, and
//! paints itself through a [`Painter`]. The owning widget forwards pointer
//! input that lands inside [`ScrollBar::geometry`] and reports value changes
//! through its own signals, since it decides when slots may run.
//!
//! # Example
//!
//! ```
//! use gridline::widget::widgets::{Orientation, ScrollBar};
//!
//! let mut bar = ScrollBar::new(Orientation::Vertical);
//! bar.set_range(0, 40);
//! assert!(bar.set_value(55));
//! assert_eq!(bar.value(), 40);
//! ```

use crate::render::{Color, Painter, Point, Rect};

use super::Orientation;

/// Parts of the scrollbar for hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScrollBarPart {
    /// Outside the scrollbar.
    #[default]
    None,
    /// The track above/left of the thumb.
    TrackDecrease,
    /// The track below/right of the thumb.
    TrackIncrease,
    /// The thumb itself.
    Thumb,
}

/// A scrollbar model for controlling scroll position.
#[derive(Debug, Clone)]
pub struct ScrollBar {
    /// Scrollbar orientation.
    orientation: Orientation,

    /// Position and size in the owning widget's coordinates.
    geometry: Rect,

    /// Whether the bar is shown and accepts input.
    visible: bool,

    /// Minimum value.
    minimum: i32,

    /// Maximum value.
    maximum: i32,

    /// Current value.
    value: i32,

    /// Page step size (used when clicking the track).
    page_step: i32,

    /// Thumb length in pixels, or `None` for a full-length thumb.
    thumb_length: Option<i32>,

    /// Whether the thumb is currently being dragged.
    dragging: bool,

    /// Drag start position along the bar axis.
    drag_start_pos: i32,

    /// Value when drag started.
    drag_start_value: i32,

    /// Track color.
    track_color: Color,

    /// Thumb color.
    thumb_color: Color,

    /// Thumb pressed color.
    thumb_pressed_color: Color,
}

impl ScrollBar {
    /// Create a new scrollbar with the given orientation.
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            geometry: Rect::ZERO,
            visible: true,
            minimum: 0,
            maximum: 0,
            value: 0,
            page_step: 1,
            thumb_length: None,
            dragging: false,
            drag_start_pos: 0,
            drag_start_value: 0,
            track_color: Color::from_rgba8(230, 230, 230, 255),
            thumb_color: Color::from_rgba8(180, 180, 180, 255),
            thumb_pressed_color: Color::from_rgba8(140, 140, 140, 255),
        }
    }

    /// Get the orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Position and size in the owning widget's coordinates.
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Place the bar inside the owning widget.
    pub fn set_geometry(&mut self, rect: Rect) {
        self.geometry = rect;
    }

    /// Whether the bar is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the bar. A hidden bar ignores input and is not painted.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.dragging = false;
        }
    }

    // =========================================================================
    // Value and Range
    // =========================================================================

    /// Get the minimum value.
    pub fn minimum(&self) -> i32 {
        self.minimum
    }

    /// Get the maximum value.
    pub fn maximum(&self) -> i32 {
        self.maximum
    }

    /// Get the current value.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Set the current value, clamped to `[minimum, maximum]`.
    ///
    /// Returns whether the stored value changed.
    pub fn set_value(&mut self, value: i32) -> bool {
        let clamped = value.clamp(self.minimum, self.maximum);
        if self.value != clamped {
            self.value = clamped;
            true
        } else {
            false
        }
    }

    /// Set the value range and clamp the current value into it.
    ///
    /// Returns whether the current value changed.
    pub fn set_range(&mut self, minimum: i32, maximum: i32) -> bool {
        let (min, max) = if minimum <= maximum {
            (minimum, maximum)
        } else {
            (maximum, minimum)
        };
        self.minimum = min;
        self.maximum = max;
        let clamped = self.value.clamp(min, max);
        let changed = clamped != self.value;
        self.value = clamped;
        changed
    }

    /// Get the page step.
    pub fn page_step(&self) -> i32 {
        self.page_step
    }

    /// Set the page step used when clicking the track.
    pub fn set_page_step(&mut self, step: i32) {
        self.page_step = step.max(1);
    }

    /// Get the thumb length in pixels, or `None` for a full-length thumb.
    pub fn thumb_length(&self) -> Option<i32> {
        self.thumb_length
    }

    /// Set the thumb length in pixels. `None` makes the thumb fill the track.
    pub fn set_thumb_length(&mut self, length: Option<i32>) {
        self.thumb_length = length.map(|l| l.max(0));
    }

    /// Whether the thumb is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    // =========================================================================
    // Geometry Helpers
    // =========================================================================

    fn track_length(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.geometry.width(),
            Orientation::Vertical => self.geometry.height(),
        }
    }

    fn axis(&self, pos: Point) -> i32 {
        match self.orientation {
            Orientation::Horizontal => pos.x,
            Orientation::Vertical => pos.y,
        }
    }

    /// Get the thumb rectangle, in the owning widget's coordinates.
    pub fn thumb_rect(&self) -> Rect {
        let track = self.geometry;
        let track_len = self.track_length();
        let thumb_len = self.thumb_length.unwrap_or(track_len).min(track_len);
        let range = self.maximum - self.minimum;
        let travel = track_len - thumb_len;
        let position = if range > 0 && travel > 0 {
            ((self.value - self.minimum) as i64 * travel as i64 / range as i64) as i32
        } else {
            0
        };

        match self.orientation {
            Orientation::Horizontal => Rect::new(
                track.left() + position,
                track.top(),
                thumb_len,
                track.height(),
            ),
            Orientation::Vertical => Rect::new(
                track.left(),
                track.top() + position,
                track.width(),
                thumb_len,
            ),
        }
    }

    fn hit_test(&self, pos: Point) -> ScrollBarPart {
        if !self.visible || !self.geometry.contains(pos) {
            return ScrollBarPart::None;
        }
        let thumb = self.thumb_rect();
        if thumb.contains(pos) {
            return ScrollBarPart::Thumb;
        }
        let thumb_start = match self.orientation {
            Orientation::Horizontal => thumb.left(),
            Orientation::Vertical => thumb.top(),
        };
        if self.axis(pos) < thumb_start {
            ScrollBarPart::TrackDecrease
        } else {
            ScrollBarPart::TrackIncrease
        }
    }

    /// Check whether a point falls on the bar.
    pub fn contains(&self, pos: Point) -> bool {
        self.hit_test(pos) != ScrollBarPart::None
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Handle a left-button press. Returns whether the value changed.
    pub fn press(&mut self, pos: Point) -> bool {
        match self.hit_test(pos) {
            ScrollBarPart::Thumb => {
                self.dragging = true;
                self.drag_start_pos = self.axis(pos);
                self.drag_start_value = self.value;
                false
            }
            ScrollBarPart::TrackDecrease => self.set_value(self.value - self.page_step),
            ScrollBarPart::TrackIncrease => self.set_value(self.value + self.page_step),
            ScrollBarPart::None => false,
        }
    }

    /// Handle pointer motion. Returns whether the value changed.
    pub fn drag(&mut self, pos: Point) -> bool {
        if !self.dragging {
            return false;
        }
        let thumb = self.thumb_rect();
        let thumb_len = match self.orientation {
            Orientation::Horizontal => thumb.width(),
            Orientation::Vertical => thumb.height(),
        };
        let travel = self.track_length() - thumb_len;
        let range = self.maximum - self.minimum;
        if travel <= 0 || range <= 0 {
            return false;
        }
        let delta_pos = (self.axis(pos) - self.drag_start_pos) as i64;
        let delta_value = (delta_pos * range as i64 / travel as i64) as i32;
        self.set_value(self.drag_start_value + delta_value)
    }

    /// Handle a left-button release. Returns whether a drag ended.
    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.dragging, false)
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Paint the track and thumb.
    pub fn paint(&self, painter: &mut dyn Painter) {
        if !self.visible || self.geometry.size.is_empty() {
            return;
        }
        painter.fill_rect(self.geometry, self.track_color);
        let color = if self.dragging {
            self.thumb_pressed_color
        } else {
            self.thumb_color
        };
        painter.fill_rect(self.thumb_rect(), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical(len: i32) -> ScrollBar {
        let mut bar = ScrollBar::new(Orientation::Vertical);
        bar.set_geometry(Rect::new(100, 0, 16, len));
        bar
    }

    #[test]
    fn test_value_clamped_to_range() {
        let mut bar = vertical(100);
        bar.set_range(0, 10);
        assert!(bar.set_value(20));
        assert_eq!(bar.value(), 10);
        assert!(!bar.set_value(10));
        assert!(bar.set_value(-3));
        assert_eq!(bar.value(), 0);
    }

    #[test]
    fn test_shrinking_range_clamps_value() {
        let mut bar = vertical(100);
        bar.set_range(0, 10);
        bar.set_value(8);
        assert!(bar.set_range(0, 5));
        assert_eq!(bar.value(), 5);
    }

    #[test]
    fn test_full_thumb_by_default() {
        let bar = vertical(100);
        assert_eq!(bar.thumb_rect(), Rect::new(100, 0, 16, 100));
    }

    #[test]
    fn test_thumb_position_follows_value() {
        let mut bar = vertical(100);
        bar.set_range(0, 10);
        bar.set_thumb_length(Some(20));
        bar.set_value(5);
        assert_eq!(bar.thumb_rect(), Rect::new(100, 40, 16, 20));
    }

    #[test]
    fn test_track_click_pages() {
        let mut bar = vertical(100);
        bar.set_range(0, 10);
        bar.set_thumb_length(Some(20));
        bar.set_page_step(3);
        assert!(bar.press(Point::new(105, 90)));
        assert_eq!(bar.value(), 3);
    }

    #[test]
    fn test_thumb_drag() {
        let mut bar = vertical(100);
        bar.set_range(0, 10);
        bar.set_thumb_length(Some(20));
        assert!(!bar.press(Point::new(105, 5)));
        assert!(bar.is_dragging());
        assert!(bar.drag(Point::new(105, 45)));
        assert_eq!(bar.value(), 5);
        assert!(bar.release());
        assert!(!bar.drag(Point::new(105, 95)));
    }

    #[test]
    fn test_hidden_bar_ignores_input() {
        let mut bar = vertical(100);
        bar.set_range(0, 10);
        bar.set_visible(false);
        assert!(!bar.contains(Point::new(105, 50)));
        assert!(!bar.press(Point::new(105, 90)));
    }
}
