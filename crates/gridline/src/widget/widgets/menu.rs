//! Menu implementation.
//!
//! [`Menu`] is the popup collaborator used for context menus. It keeps a list
//! of [`MenuItem`]s, knows where it was expanded and whether it is showing.
//! Drawing and input routing of the expanded popup belong to the window
//! system, which reads [`Menu::position`] and calls [`Menu::trigger_item`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gridline::widget::widgets::{Action, Menu};
//!
//! let mut menu = Menu::new();
//! let delete = Arc::new(Action::new("Delete"));
//! menu.add_action(delete.clone());
//! menu.add_separator();
//!
//! menu.popup_at(100, 100);
//! assert!(menu.is_visible());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gridline_core::Signal;

use crate::render::Point;

// ============================================================================
// Action
// ============================================================================

/// A named, triggerable menu entry.
pub struct Action {
    text: String,
    enabled: AtomicBool,
    /// Emitted when the action is triggered.
    pub triggered: Signal<()>,
}

impl Action {
    /// Create an enabled action with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            enabled: AtomicBool::new(true),
            triggered: Signal::new(),
        }
    }

    /// The displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the action can be triggered.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Enable or disable the action.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Trigger the action if it is enabled.
    pub fn trigger(&self) {
        if self.is_enabled() {
            self.triggered.emit(());
        }
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("text", &self.text)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

// ============================================================================
// MenuItem
// ============================================================================

/// An item in a menu.
#[derive(Debug, Clone)]
pub enum MenuItem {
    /// A clickable action item.
    Action(Arc<Action>),
    /// A visual separator line.
    Separator,
}

impl MenuItem {
    /// Check if this is a separator.
    pub fn is_separator(&self) -> bool {
        matches!(self, MenuItem::Separator)
    }

    /// Display text, if the item has any.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            MenuItem::Action(action) => Some(action.text()),
            MenuItem::Separator => None,
        }
    }
}

// ============================================================================
// Menu
// ============================================================================

/// A popup menu.
///
/// # Signals
///
/// - [`triggered`](Menu::triggered): Emitted when an action is triggered
/// - [`about_to_show`](Menu::about_to_show): Emitted before the menu is shown
/// - [`about_to_hide`](Menu::about_to_hide): Emitted before the menu is hidden
#[derive(Debug, Default)]
pub struct Menu {
    /// Menu items.
    items: Vec<MenuItem>,

    /// Where the menu was last expanded, in global coordinates.
    position: Point,

    /// Whether the menu is expanded.
    visible: bool,

    /// Signal emitted when an action is triggered.
    pub triggered: Signal<Arc<Action>>,
    /// Signal emitted before the menu is shown.
    pub about_to_show: Signal<()>,
    /// Signal emitted before the menu is hidden.
    pub about_to_hide: Signal<()>,
}

impl Menu {
    /// Create a new empty menu.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Append an action.
    pub fn add_action(&mut self, action: Arc<Action>) {
        self.items.push(MenuItem::Action(action));
    }

    /// Append a separator.
    pub fn add_separator(&mut self) {
        self.items.push(MenuItem::Separator);
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// All items in display order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Number of items, separators included.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Check whether the menu has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // =========================================================================
    // Show/Hide
    // =========================================================================

    /// Expand the menu at the given global position.
    ///
    /// An already expanded menu is collapsed first, so each call yields a
    /// single showing instance.
    pub fn popup_at(&mut self, x: i32, y: i32) {
        self.hide();
        self.about_to_show.emit(());
        self.position = Point::new(x, y);
        self.visible = true;
    }

    /// Collapse the menu.
    pub fn hide(&mut self) {
        if self.visible {
            self.about_to_hide.emit(());
            self.visible = false;
        }
    }

    /// Close the menu (same as hide).
    pub fn close(&mut self) {
        self.hide();
    }

    /// Check if the menu is expanded.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Where the menu was last expanded.
    pub fn position(&self) -> Point {
        self.position
    }

    // =========================================================================
    // Action Triggering
    // =========================================================================

    /// Trigger the action at the given index and close the menu.
    pub fn trigger_item(&mut self, index: usize) {
        if let Some(MenuItem::Action(action)) = self.items.get(index).cloned()
            && action.is_enabled()
        {
            action.trigger();
            self.triggered.emit(action);
            self.close();
        }
    }
}
