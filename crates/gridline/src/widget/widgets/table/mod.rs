//! Table widget.
//!
//! A [`Table`] shows rows of typed cells under a strip of column headers.
//! Rows are described by a compact format string, one conversion per column
//! separated by `:`:
//!
//! ```
//! use gridline::widget::widgets::table::{SizeSpec, Table, TableFlags};
//!
//! let table = Table::new(TableFlags::MULTI);
//! table.add_column(Some("Name"), Some(SizeSpec::Pixels(120)), None).unwrap();
//! table.add_column(Some("Age"), None, None).unwrap();
//! table.add_row("%s:%d", ["Alice".into(), 30i32.into()]).unwrap();
//! table.add_row("%s:%d", ["Bob".into(), 25i32.into()]).unwrap();
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.save_text(','), "Name,Age,\nAlice,30,\nBob,25,\n");
//! ```
//!
//! # Polled Tables
//!
//! A table built with [`Table::new_polled`] rebuilds its rows inside every
//! [`draw`](Table::draw): the grid is moved aside, the poll callback adds the
//! current rows, and cells equal to their predecessor at the same row keep
//! its rendered surface and selection.
//!
//! ```
//! use gridline::widget::widgets::table::{Table, TableFlags};
//!
//! let table = Table::new_polled(TableFlags::NONE, |t| {
//!     for n in 0..3i32 {
//!         t.add_row("%d", [n.into()]).unwrap();
//!     }
//! });
//! table.add_column(Some("n"), None, None).unwrap();
//! ```
//!
//! # Locking
//!
//! All state sits behind one re-entrant lock. Signals, double-click callbacks
//! and popups are dispatched after the state borrow is released, so they may
//! call back into the table. Text functions, surface functions and sort
//! functions run while the state is borrowed and must not.

mod cell;
mod column;
mod export;
mod format;
mod grid;
mod interaction;
mod paint;
mod popup;
mod sort;
mod viewport;

use std::cell::RefCell;
use std::io::Write;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;
use std::time::Duration;

use gridline_core::logging::{span_names, targets};
use gridline_core::{Clock, PerfSpan, Signal, SystemClock};
use parking_lot::ReentrantMutex;

use crate::config::TableConfig;
use crate::error::Result;
use crate::render::{Painter, Point, Size, TextRenderer};
use crate::widget::widgets::Menu;
use crate::widget::{CursorShape, SizeHint, Widget, WidgetEvent};

use self::grid::TableState;

pub use cell::{Cell, CellArg, CellValue, EXPIRED_TEXT, OpaquePtr, SurfaceFn, TextFn, ValueRef};
pub use column::{Column, ParseSizeSpecError, SizeSpec, SortFn, SortOrder};
pub use format::{CellKind, ColumnSpec, Pattern, RefKind, RowFormat};
pub use popup::{MenuHandle, PopupKey};

/// Callback run by a polled table to repopulate its rows.
pub type PollFn = Arc<dyn Fn(&Table) + Send + Sync>;

/// Callback receiving a row or column index.
pub type IndexFn = Arc<dyn Fn(usize) + Send + Sync>;

/// Table behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TableFlags(u8);

impl TableFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Expand horizontally to the space offered.
    pub const HFILL: Self = Self(0x01);
    /// Expand vertically to the space offered.
    pub const VFILL: Self = Self(0x02);
    /// Shift extends and Control toggles the selection.
    pub const MULTI: Self = Self(0x04);
    /// Every click toggles the clicked cell.
    pub const MULTITOGGLE: Self = Self(0x08);
    /// Rows are rebuilt by a poll callback on every draw.
    pub const POLL: Self = Self(0x10);
    /// Both fill flags.
    pub const EXPAND: Self = Self(Self::HFILL.0 | Self::VFILL.0);

    /// Returns true if every flag in `other` is set.
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// The raw flag bits.
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for TableFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TableFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Something that must happen once the state borrow is released.
pub(crate) enum Notification {
    RowDoubleClicked(usize, Option<IndexFn>),
    ColumnDoubleClicked(usize, Option<IndexFn>),
    Cursor(CursorShape),
    Focus,
    VerticalScrolled(i32),
    HorizontalScrolled(i32),
    ShowPopup(MenuHandle, Point),
    ClosePopup(MenuHandle),
}

/// A table of typed cells with a column header strip.
///
/// See the [module documentation](self) for an overview.
pub struct Table {
    state: ReentrantMutex<RefCell<TableState>>,
    clock: Arc<dyn Clock>,

    // Signals
    /// Emitted when a row is double-clicked. The parameter is the row.
    pub row_double_clicked: Signal<usize>,
    /// Emitted when a column header is double-clicked. The parameter is the column.
    pub column_double_clicked: Signal<usize>,
    /// Emitted when the pointer cursor should change shape.
    pub cursor_requested: Signal<CursorShape>,
    /// Emitted when a press asks for keyboard focus.
    pub focus_requested: Signal<()>,
    /// Emitted when the first visible row changes.
    pub vertical_scrolled: Signal<i32>,
    /// Emitted when the horizontal pixel offset changes.
    pub horizontal_scrolled: Signal<i32>,
}

impl Table {
    /// Create a table with the default configuration.
    pub fn new(flags: TableFlags) -> Self {
        Self::with_config(flags, TableConfig::default())
    }

    /// Create a table with explicit metrics and timings.
    pub fn with_config(flags: TableFlags, config: TableConfig) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(TableState::new(flags, config))),
            clock: Arc::new(SystemClock),
            row_double_clicked: Signal::new(),
            column_double_clicked: Signal::new(),
            cursor_requested: Signal::new(),
            focus_requested: Signal::new(),
            vertical_scrolled: Signal::new(),
            horizontal_scrolled: Signal::new(),
        }
    }

    /// Create a table whose rows are rebuilt by `poll` on every draw.
    pub fn new_polled(flags: TableFlags, poll: impl Fn(&Table) + Send + Sync + 'static) -> Self {
        let table = Self::new(flags);
        let poll: PollFn = Arc::new(poll);
        table.set_poll_fn(Some(poll));
        table
    }

    /// Use `clock` for double-click, key repeat and wheel timing.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the poll callback. Installing one makes the table polled.
    pub fn set_poll_fn(&self, poll: Option<PollFn>) {
        self.with_state(|s, _| s.set_poll_fn(poll));
    }

    // =========================================================================
    // State Access
    // =========================================================================

    fn with_state<R>(&self, f: impl FnOnce(&mut TableState, &mut Vec<Notification>) -> R) -> R {
        let guard = self.state.lock();
        let mut out = Vec::new();
        let result = {
            let mut state = guard.borrow_mut();
            f(&mut state, &mut out)
        };
        self.dispatch(out);
        result
    }

    fn read<R>(&self, f: impl FnOnce(&TableState) -> R) -> R {
        let guard = self.state.lock();
        let state = guard.borrow();
        f(&state)
    }

    fn dispatch(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            match notification {
                Notification::RowDoubleClicked(row, callback) => {
                    tracing::debug!(target: targets::TABLE, row, "row double-clicked");
                    if let Some(callback) = callback {
                        callback(row);
                    }
                    self.row_double_clicked.emit(row);
                }
                Notification::ColumnDoubleClicked(column, callback) => {
                    tracing::debug!(target: targets::TABLE, column, "column double-clicked");
                    if let Some(callback) = callback {
                        callback(column);
                    }
                    self.column_double_clicked.emit(column);
                }
                Notification::Cursor(shape) => self.cursor_requested.emit(shape),
                Notification::Focus => self.focus_requested.emit(()),
                Notification::VerticalScrolled(offset) => self.vertical_scrolled.emit(offset),
                Notification::HorizontalScrolled(x) => self.horizontal_scrolled.emit(x),
                Notification::ShowPopup(menu, at) => menu.lock().popup_at(at.x, at.y),
                Notification::ClosePopup(menu) => menu.lock().hide(),
            }
        }
    }

    // =========================================================================
    // Columns and Rows
    // =========================================================================

    /// Append a column and return its index.
    ///
    /// Without a size, a named column fills the spare width and an unnamed
    /// one is a zero-width spacer. Existing rows get a null cell.
    pub fn add_column(
        &self,
        name: Option<&str>,
        size: Option<SizeSpec>,
        sort_fn: Option<SortFn>,
    ) -> Result<usize> {
        self.with_state(|s, out| {
            let index = s.add_column(name, size, sort_fn)?;
            s.report_scroll(out);
            Ok(index)
        })
    }

    /// Append a row described by `format` and return its index.
    ///
    /// `values` supplies one argument per value conversion in `format`.
    pub fn add_row(
        &self,
        format: &str,
        values: impl IntoIterator<Item = CellArg>,
    ) -> Result<usize> {
        self.with_state(|s, out| {
            let index = s.add_row(format, values)?;
            s.report_scroll(out);
            Ok(index)
        })
    }

    /// Start a refresh cycle. Existing cells are kept aside so their
    /// surfaces and selection can be recovered by [`end`](Self::end).
    pub fn begin(&self) {
        self.with_state(|s, _| {
            s.begin();
        });
    }

    /// Finish a refresh cycle started by [`begin`](Self::begin).
    pub fn end(&self) {
        self.with_state(|s, out| {
            s.end();
            s.report_scroll(out);
        });
    }

    /// Run a whole refresh cycle around `fill`, holding the lock throughout.
    pub fn refresh(&self, fill: impl FnOnce(&Table)) {
        let _guard = self.state.lock();
        self.begin();
        fill(self);
        self.end();
    }

    pub fn row_count(&self) -> usize {
        self.read(|s| s.rows.len())
    }

    pub fn column_count(&self) -> usize {
        self.read(|s| s.columns.len())
    }

    /// A snapshot of a column.
    pub fn column(&self, index: usize) -> Option<Column> {
        self.read(|s| {
            s.columns.get(index).map(|c| {
                let mut c = c.clone();
                c.pool.clear();
                c
            })
        })
    }

    /// The text a cell displays, `None` for empty cells and images.
    pub fn cell_text(&self, row: usize, column: usize) -> Option<String> {
        self.read(|s| s.rows.get(row)?.get(column)?.text())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn row_selected(&self, row: usize) -> bool {
        self.read(|s| s.row_selected(row))
    }

    /// Indices of every fully selected row.
    pub fn selected_rows(&self) -> Vec<usize> {
        self.read(|s| s.selected_rows())
    }

    /// The first fully selected row.
    pub fn selected_row(&self) -> Option<usize> {
        self.read(|s| (0..s.rows.len()).find(|&m| s.row_selected(m)))
    }

    pub fn select_row(&self, row: usize) -> Result<()> {
        self.with_state(|s, _| s.select_row(row))
    }

    pub fn deselect_row(&self, row: usize) -> Result<()> {
        self.with_state(|s, _| s.deselect_row(row))
    }

    pub fn select_all_rows(&self) {
        self.with_state(|s, _| s.select_all_rows());
    }

    pub fn deselect_all_rows(&self) {
        self.with_state(|s, _| s.deselect_all_rows());
    }

    pub fn cell_selected(&self, row: usize, column: usize) -> bool {
        self.read(|s| s.cell_selected(row, column))
    }

    pub fn select_cell(&self, row: usize, column: usize) -> Result<()> {
        self.with_state(|s, _| s.set_cell_selected(row, column, true))
    }

    pub fn deselect_cell(&self, row: usize, column: usize) -> Result<()> {
        self.with_state(|s, _| s.set_cell_selected(row, column, false))
    }

    pub fn column_selected(&self, column: usize) -> bool {
        self.read(|s| s.column_selected(column))
    }

    pub fn select_column(&self, column: usize) -> Result<()> {
        self.with_state(|s, _| s.set_column_selected(column, true))
    }

    pub fn deselect_column(&self, column: usize) -> Result<()> {
        self.with_state(|s, _| s.set_column_selected(column, false))
    }

    pub fn select_all_columns(&self) {
        self.with_state(|s, _| s.set_all_columns_selected(true));
    }

    pub fn deselect_all_columns(&self) {
        self.with_state(|s, _| s.set_all_columns_selected(false));
    }

    /// The first selected column.
    pub fn selected_column(&self) -> Option<usize> {
        self.read(|s| s.selected_column())
    }

    // =========================================================================
    // Popups and Callbacks
    // =========================================================================

    /// Register a fresh, empty popup menu under `key` and return it. A menu
    /// previously registered under the same key is closed and dropped.
    pub fn set_popup(&self, key: PopupKey) -> MenuHandle {
        let (menu, old) = self.with_state(|s, _| s.popups.replace(key));
        if let Some(old) = old {
            old.lock().close();
        }
        menu
    }

    /// Edit the popup under `key`, registering an empty one if needed.
    pub fn with_popup<R>(&self, key: PopupKey, f: impl FnOnce(&mut Menu) -> R) -> R {
        let menu = self.with_state(|s, _| s.popups.get_or_insert(key));
        let mut menu = menu.lock();
        f(&mut menu)
    }

    /// The popup registered under exactly `key`.
    pub fn popup(&self, key: PopupKey) -> Option<MenuHandle> {
        self.read(|s| s.popups.get(key))
    }

    /// Unregister and close the popup under `key`.
    pub fn remove_popup(&self, key: PopupKey) -> Option<MenuHandle> {
        let old = self.with_state(|s, _| s.popups.remove(key))?;
        old.lock().close();
        Some(old)
    }

    /// Call `f` with the row index on every row double-click.
    pub fn set_row_double_click_fn(&self, f: impl Fn(usize) + Send + Sync + 'static) {
        let f: IndexFn = Arc::new(f);
        self.with_state(|s, _| s.row_double_click_fn = Some(f));
    }

    /// Call `f` with the column index on every column header double-click.
    pub fn set_column_double_click_fn(&self, f: impl Fn(usize) + Send + Sync + 'static) {
        let f: IndexFn = Arc::new(f);
        self.with_state(|s, _| s.column_double_click_fn = Some(f));
    }

    // =========================================================================
    // Sorting and Export
    // =========================================================================

    /// Reorder the rows by `column`.
    pub fn sort_rows(&self, column: usize, order: SortOrder) -> Result<()> {
        self.with_state(|s, _| s.sort_rows(column, order))
    }

    /// Re-render every cell surface on the next draw.
    pub fn redraw_cells(&self) {
        self.with_state(|s, _| s.redraw_cells = true);
    }

    /// Named columns as delimited text, header line first.
    pub fn save_text(&self, separator: char) -> String {
        self.read(|s| s.save_text(separator))
    }

    /// Write [`save_text`](Self::save_text) to `writer`.
    ///
    /// The text is built under the lock and written after releasing it, so
    /// a slow writer never blocks drawing or input.
    pub fn save_text_to<W: Write>(&self, writer: &mut W, separator: char) -> Result<()> {
        let text = self.save_text(separator);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    /// First row shown below the header.
    pub fn scroll_offset(&self) -> usize {
        self.read(|s| s.offset())
    }

    /// Scroll to `offset`, clamped to the valid range.
    pub fn set_scroll_offset(&self, offset: usize) {
        self.with_state(|s, out| {
            s.set_offset(i64::try_from(offset).unwrap_or(i64::MAX));
            s.report_scroll(out);
        });
    }

    /// Largest valid scroll offset.
    pub fn max_scroll_offset(&self) -> usize {
        self.read(|s| s.max_offset())
    }

    /// Horizontal pixel offset of the columns.
    pub fn x_offset(&self) -> i32 {
        self.read(|s| s.x_offset())
    }

    /// Scroll the columns horizontally, clamped to the overflow.
    pub fn set_x_offset(&self, x: i32) {
        self.with_state(|s, out| {
            s.set_x_offset(x);
            s.report_scroll(out);
        });
    }

    /// Scroll the least distance that shows `row`.
    pub fn scroll_to_row(&self, row: usize) {
        self.with_state(|s, out| {
            s.scroll_to_row(row);
            s.report_scroll(out);
        });
    }

    /// Rows that fit in the current height.
    pub fn visible_rows(&self) -> usize {
        self.read(|s| s.visible_rows())
    }

    /// Override the preferred width and the number of rows the preferred
    /// height shows.
    pub fn set_size_hint(&self, width: Option<i32>, rows: Option<usize>) {
        self.with_state(|s, _| s.set_size_hint(width, rows));
    }

    // =========================================================================
    // Drawing and Events
    // =========================================================================

    /// Paint the table. A polled table runs its refresh cycle first.
    #[tracing::instrument(skip_all, target = "gridline::table", level = "trace")]
    pub fn draw(&self, painter: &mut dyn Painter) {
        let _perf = PerfSpan::new(span_names::DRAW);
        let guard = self.state.lock();
        let poll = guard.borrow().poll.clone();
        if let Some(poll) = poll {
            let _refresh = PerfSpan::new(span_names::REFRESH);
            guard.borrow_mut().begin();
            poll(self);
            guard.borrow_mut().end();
        }

        let mut out = Vec::new();
        {
            let mut state = guard.borrow_mut();
            state.paint(painter);
            state.report_scroll(&mut out);
        }
        self.dispatch(out);
    }

    /// Handle an input event. Returns whether it was consumed.
    pub fn handle_event(&self, event: &mut WidgetEvent) -> bool {
        let now = self.clock.now();
        self.with_state(|s, out| s.handle_event(event, now, out))
    }

    /// Run due double-click expiries and key repeats. Call from the event
    /// loop, for example after [`time_until_next_timer`] elapses.
    ///
    /// [`time_until_next_timer`]: Self::time_until_next_timer
    pub fn process_timers(&self) {
        let now = self.clock.now();
        self.with_state(|s, out| s.fire_timers(now, out));
    }

    /// Time until the next input timer is due.
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.with_state(|s, _| s.timers.time_until_next(now))
    }

    /// Release every surface the table holds through `renderer`. Cells and
    /// labels render again on the next draw.
    pub fn release_surfaces(&self, renderer: &mut dyn TextRenderer) {
        let ids = self.with_state(|s, _| s.take_surfaces());
        tracing::debug!(target: targets::TABLE, count = ids.len(), "surfaces released");
        for id in ids {
            renderer.release_surface(id);
        }
    }
}

impl Widget for Table {
    fn size_hint(&self) -> SizeHint {
        self.read(|s| s.size_hint())
    }

    fn size_allocate(&self, size: Size) -> bool {
        self.with_state(|s, out| {
            let accepted = s.size_allocate(size);
            s.report_scroll(out);
            accepted
        })
    }

    fn paint(&self, painter: &mut dyn Painter) {
        self.draw(painter);
    }

    fn event(&self, event: &mut WidgetEvent) -> bool {
        self.handle_event(event)
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.state.lock();
        match guard.try_borrow() {
            Ok(state) => f.debug_struct("Table").field("state", &*state).finish(),
            Err(_) => f.debug_struct("Table").finish_non_exhaustive(),
        }
    }
}

static_assertions::assert_impl_all!(Table: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_flags() {
        let flags = TableFlags::MULTI | TableFlags::HFILL;
        assert!(flags.contains(TableFlags::MULTI));
        assert!(!flags.contains(TableFlags::POLL));
        assert!(TableFlags::EXPAND.contains(TableFlags::VFILL));
        let mut flags = TableFlags::NONE;
        flags |= TableFlags::POLL;
        assert_eq!(flags.bits(), 0x10);
    }

    #[test]
    fn test_signal_slot_may_call_back() {
        let table = Arc::new(Table::new(TableFlags::NONE));
        table.add_column(Some("n"), Some(SizeSpec::Pixels(50)), None).unwrap();
        for n in 0..40i32 {
            table.add_row("%d", [n.into()]).unwrap();
        }
        table.size_allocate(Size::new(216, 216));

        let seen = Arc::new(AtomicUsize::new(0));
        let inner = table.clone();
        let counter = seen.clone();
        table.vertical_scrolled.connect(move |offset| {
            counter.store(*offset as usize, Ordering::SeqCst);
            // Re-entering the table from a slot must not deadlock or panic.
            let _ = inner.row_count();
        });
        table.set_scroll_offset(7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
        assert_eq!(table.scroll_offset(), 7);
    }

    #[test]
    fn test_polled_draw_rebuilds_rows() {
        let generation = Arc::new(AtomicUsize::new(1));
        let source = generation.clone();
        let table = Table::new_polled(TableFlags::NONE, move |t| {
            for n in 0..source.load(Ordering::SeqCst) {
                t.add_row("%u", [(n as u32).into()]).unwrap();
            }
        });
        table.add_column(Some("n"), None, None).unwrap();
        assert!(table.add_row("%u", [1u32.into()]).is_err());

        struct Null;
        impl TextRenderer for Null {
            fn render_text(&mut self, _text: &str, _color: crate::render::Color) -> crate::render::SurfaceId {
                crate::render::SurfaceId::default()
            }
            fn surface_size(&self, _id: crate::render::SurfaceId) -> Size {
                Size::ZERO
            }
            fn release_surface(&mut self, _id: crate::render::SurfaceId) {}
        }
        impl Painter for Null {
            fn fill_rect(&mut self, _: crate::render::Rect, _: crate::render::Color) {}
            fn draw_line_h(&mut self, _: i32, _: i32, _: i32, _: crate::render::Color) {}
            fn draw_line_v(&mut self, _: i32, _: i32, _: i32, _: crate::render::Color) {}
            fn blend_rect(&mut self, _: crate::render::Rect, _: crate::render::Color) {}
            fn blit(&mut self, _: crate::render::SurfaceId, _: Point) {}
            fn clip_rect(&mut self, _: crate::render::Rect) {}
            fn restore_clip(&mut self) {}
        }

        table.draw(&mut Null);
        assert_eq!(table.row_count(), 1);
        generation.store(3, Ordering::SeqCst);
        table.draw(&mut Null);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell_text(2, 0).as_deref(), Some("2"));
        assert!(table.add_column(Some("late"), None, None).is_err());
    }
}
