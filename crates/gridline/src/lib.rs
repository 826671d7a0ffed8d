//! Gridline - a retained-mode table widget.
//!
//! The crate provides [`Table`]: a grid of typed cells under a column header
//! strip, with a polled refresh cycle that keeps rendered cell surfaces
//! across rebuilds, row, cell and column selection, column resizing,
//! keyboard and wheel scrolling, and per-cell popup menus.
//!
//! Windowing, text rasterization and drawing stay with the embedding
//! application, which implements [`render::Painter`] and feeds
//! [`widget::WidgetEvent`]s to the table.
//!
//! # Example
//!
//! ```
//! use gridline::prelude::*;
//!
//! let table = Table::new(TableFlags::MULTI);
//! table.add_column(Some("Process"), Some(SizeSpec::Pixels(160)), None).unwrap();
//! table.add_column(Some("PID"), None, None).unwrap();
//! table.add_row("%s:%u", ["init".into(), 1u32.into()]).unwrap();
//!
//! table.select_row(0).unwrap();
//! assert_eq!(table.selected_rows(), vec![0]);
//! ```

pub mod config;
pub mod error;
pub mod prelude;
pub mod render;
pub mod widget;

pub use gridline_core::{Clock, ManualClock, Signal, SystemClock};

pub use config::{TableConfig, TablePalette};
pub use error::{Result, TableError};
pub use widget::widgets::table::{
    Cell, CellArg, PopupKey, SizeSpec, SortOrder, Table, TableFlags,
};
