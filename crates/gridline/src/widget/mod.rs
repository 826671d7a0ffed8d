//! Widget system for Gridline.
//!
//! This module provides:
//!
//! - [`Widget`] trait: size negotiation, painting and event entry points
//! - Widget events for input handling and lifecycle
//! - Size hints for layout negotiation
//! - Cursor shape hints
//!
//! Widgets use interior mutability: every entry point takes `&self`, so a
//! widget can be shared between the event loop and a data-producing thread.

mod cursor;
mod events;
mod geometry;
pub mod widgets;

pub use cursor::CursorShape;
pub use events::{
    EventBase, FocusReason, Key, KeyPressEvent, KeyReleaseEvent, KeyboardModifiers, MouseButton,
    MouseMoveEvent, MousePressEvent, MouseReleaseEvent, WheelEvent, WidgetEvent,
};
pub use geometry::SizeHint;

use crate::render::{Painter, Size};

/// The base trait for widgets.
pub trait Widget: Send + Sync {
    /// The preferred size for layout.
    fn size_hint(&self) -> SizeHint;

    /// Receive the allocated size. Returns `false` if the widget refuses it.
    fn size_allocate(&self, size: Size) -> bool;

    /// Paint the widget in its own coordinates.
    fn paint(&self, painter: &mut dyn Painter);

    /// Handle an event. Returns whether the event was consumed; consumed
    /// events are also marked accepted.
    fn event(&self, event: &mut WidgetEvent) -> bool;
}
