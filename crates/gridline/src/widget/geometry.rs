//! Size hints for widget layout.
//!
//! A widget reports a [`SizeHint`] when asked for its preferred size, and the
//! parent answers with an allocation that the widget may refuse.

use crate::render::Size;

/// Size hint containing the preferred, minimum, and maximum sizes for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeHint {
    /// The preferred size for the widget to display optimally.
    pub preferred: Size,

    /// The minimum acceptable size. If `None`, the widget has no minimum
    /// constraint (can shrink to zero).
    pub minimum: Option<Size>,

    /// The maximum size the widget should be. If `None`, the widget has no
    /// maximum constraint (can grow indefinitely).
    pub maximum: Option<Size>,
}

impl SizeHint {
    /// Create a new size hint with the specified preferred size.
    pub fn new(preferred: Size) -> Self {
        Self {
            preferred,
            minimum: None,
            maximum: None,
        }
    }

    /// Create a size hint with explicit width and height.
    pub fn from_dimensions(width: i32, height: i32) -> Self {
        Self::new(Size::new(width, height))
    }

    /// Set the minimum size.
    pub fn with_minimum(mut self, minimum: Size) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Set the maximum size.
    pub fn with_maximum(mut self, maximum: Size) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Get the effective minimum size (returns zero if not set).
    pub fn effective_minimum(&self) -> Size {
        self.minimum.unwrap_or(Size::ZERO)
    }

    /// Get the effective maximum size (returns a very large size if not set).
    pub fn effective_maximum(&self) -> Size {
        self.maximum.unwrap_or(Size::new(i32::MAX, i32::MAX))
    }

    /// Constrain a size to be within the minimum and maximum bounds.
    pub fn constrain(&self, size: Size) -> Size {
        let min = self.effective_minimum();
        let max = self.effective_maximum();

        Size::new(
            size.width.clamp(min.width, max.width.max(min.width)),
            size.height.clamp(min.height, max.height.max(min.height)),
        )
    }
}
