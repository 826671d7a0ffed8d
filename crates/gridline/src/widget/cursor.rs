//! Cursor shape hints.
//!
//! Widgets do not set the cursor themselves. They emit a [`CursorShape`]
//! through a signal and the window system applies it.

/// The shape (icon) of the mouse cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CursorShape {
    /// The default arrow cursor (platform-specific).
    #[default]
    Arrow,
    /// A pointing hand cursor.
    Hand,
    /// Resize cursor for horizontal resizing (east-west).
    ResizeHorizontal,
    /// Resize cursor for vertical resizing (north-south).
    ResizeVertical,
    /// Resize cursor for column resizing.
    ResizeColumn,
}

impl CursorShape {
    /// Check if this is a resize cursor.
    pub fn is_resize_cursor(self) -> bool {
        matches!(
            self,
            CursorShape::ResizeHorizontal | CursorShape::ResizeVertical | CursorShape::ResizeColumn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_cursor() {
        assert!(CursorShape::ResizeHorizontal.is_resize_cursor());
        assert!(!CursorShape::default().is_resize_cursor());
    }
}
