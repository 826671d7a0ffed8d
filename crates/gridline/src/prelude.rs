//! Prelude module for Gridline.
//!
//! ```
//! use gridline::prelude::*;
//! ```

// ============================================================================
// Table
// ============================================================================

pub use crate::widget::widgets::table::{
    Cell, CellArg, CellValue, MenuHandle, PopupKey, SizeSpec, SortFn, SortOrder, Table,
    TableFlags, ValueRef,
};
pub use crate::{TableConfig, TableError, TablePalette};

// ============================================================================
// Widget Foundation
// ============================================================================

pub use crate::widget::widgets::{Action, Menu};
pub use crate::widget::{
    CursorShape, Key, KeyboardModifiers, MouseButton, SizeHint, Widget, WidgetEvent,
};

// ============================================================================
// Rendering
// ============================================================================

pub use crate::render::{Color, Painter, Point, Rect, Size, SurfaceId, TextRenderer};

// ============================================================================
// Core
// ============================================================================

pub use gridline_core::{Clock, ManualClock, Signal};
