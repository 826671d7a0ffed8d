//! Built-in widgets.

mod menu;
mod scroll_bar;
pub mod table;

pub use menu::{Action, Menu, MenuItem};
pub use scroll_bar::ScrollBar;
pub use table::Table;

/// Orientation of a scrollbar or other one-dimensional widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    #[default]
    Vertical,
}
