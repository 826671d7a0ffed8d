//! Table state: columns, rows, selection and the refresh cycle.

use gridline_core::TimerManager;
use gridline_core::logging::targets;

use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::render::{Size, SurfaceId};
use crate::widget::widgets::{Orientation, ScrollBar};

use super::cell::{Cell, CellArg};
use super::column::{Column, SizeSpec, SortFn};
use super::format::{ColumnSpec, RowFormat};
use super::interaction::InputState;
use super::popup::PopupRegistry;
use super::{IndexFn, PollFn, TableFlags};

/// Whether a refresh cycle is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RefreshPhase {
    #[default]
    Idle,
    Refreshing,
}

/// Everything a table owns, guarded by the table's lock.
pub(crate) struct TableState {
    pub flags: TableFlags,
    pub config: TableConfig,
    pub columns: Vec<Column>,
    /// Rows of cells; every row holds exactly `columns.len()` cells.
    pub rows: Vec<Vec<Cell>>,
    pub phase: RefreshPhase,
    /// Set by the first completed refresh or draw. Polled tables stop
    /// accepting columns outside a refresh after that.
    pub refreshed_once: bool,

    /// Allocated size.
    pub size: Size,
    /// Width of the cell area, left of the vertical scrollbar.
    pub table_width: i32,
    pub vbar: ScrollBar,
    pub hbar: ScrollBar,
    pub hint_width: Option<i32>,
    pub hint_height: Option<i32>,
    /// Offsets last reported through the scroll signals.
    pub reported_offset: i32,
    pub reported_x_offset: i32,

    pub popups: PopupRegistry,
    pub input: InputState,
    pub timers: TimerManager,

    /// Surfaces to release on the next draw.
    pub pending_release: Vec<SurfaceId>,
    pub redraw_cells: bool,

    pub row_double_click_fn: Option<IndexFn>,
    pub column_double_click_fn: Option<IndexFn>,
    pub poll: Option<PollFn>,
}

impl TableState {
    pub fn new(flags: TableFlags, config: TableConfig) -> Self {
        Self {
            flags,
            config: config.sanitized(),
            columns: Vec::new(),
            rows: Vec::new(),
            phase: RefreshPhase::Idle,
            refreshed_once: false,
            size: Size::ZERO,
            table_width: 0,
            vbar: ScrollBar::new(Orientation::Vertical),
            hbar: ScrollBar::new(Orientation::Horizontal),
            hint_width: None,
            hint_height: None,
            reported_offset: 0,
            reported_x_offset: 0,
            popups: PopupRegistry::default(),
            input: InputState::default(),
            timers: TimerManager::new(),
            pending_release: Vec::new(),
            redraw_cells: false,
            row_double_click_fn: None,
            column_double_click_fn: None,
            poll: None,
        }
    }

    // =========================================================================
    // Indices
    // =========================================================================

    pub fn check_column(&self, index: usize) -> Result<()> {
        if index < self.columns.len() {
            Ok(())
        } else {
            Err(TableError::ColumnOutOfRange {
                index,
                count: self.columns.len(),
            })
        }
    }

    pub fn check_row(&self, index: usize) -> Result<()> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(TableError::RowOutOfRange {
                index,
                count: self.rows.len(),
            })
        }
    }

    fn is_polled(&self) -> bool {
        self.flags.contains(TableFlags::POLL)
    }

    // =========================================================================
    // Grid Construction
    // =========================================================================

    pub fn add_column(
        &mut self,
        name: Option<&str>,
        size: Option<SizeSpec>,
        sort_fn: Option<SortFn>,
    ) -> Result<usize> {
        if self.is_polled() && self.refreshed_once && self.phase != RefreshPhase::Refreshing {
            return Err(TableError::NotRefreshing);
        }

        let available = self.size.width - self.config.scrollbar_width;
        let (width, fill) = match (size, name) {
            (Some(spec), _) => (spec.resolve(available), false),
            (None, Some(_)) => (0, true),
            (None, None) => (0, false),
        };

        self.columns.try_reserve(1)?;
        for row in &mut self.rows {
            row.try_reserve(1)?;
        }
        self.columns
            .push(Column::new(name.map(str::to_owned), width, fill, sort_fn));
        for row in &mut self.rows {
            row.push(Cell::null(""));
        }
        self.layout_columns();

        let index = self.columns.len() - 1;
        tracing::debug!(target: targets::TABLE, index, ?name, width, fill, "column added");
        Ok(index)
    }

    pub fn add_row(
        &mut self,
        format: &str,
        values: impl IntoIterator<Item = CellArg>,
    ) -> Result<usize> {
        if self.is_polled() && self.phase != RefreshPhase::Refreshing {
            return Err(TableError::NotRefreshing);
        }

        let format = RowFormat::parse(format);
        let columns = self.columns.len();
        let values: Vec<CellArg> = values.into_iter().collect();
        let (expected, found) = (format.expected_values(columns), values.len());
        if expected != found {
            return Err(TableError::ArgumentMismatch { expected, found });
        }

        let mut values = values.into_iter();
        let mut row = Vec::new();
        row.try_reserve_exact(columns)?;
        for column in 0..columns {
            let cell = match format.spec(column) {
                None => Cell::null(""),
                Some(ColumnSpec::Literal { text } | ColumnSpec::Malformed { text }) => {
                    Cell::null(text.as_str())
                }
                Some(ColumnSpec::Value {
                    text,
                    kind,
                    pattern,
                }) => {
                    let arg = values
                        .next()
                        .ok_or(TableError::ArgumentMismatch { expected, found })?;
                    let value = arg.into_value(*kind).map_err(|arg| TableError::ArgumentType {
                        column,
                        expected: kind.name(),
                        found: arg.kind_name(),
                    })?;
                    Cell::with_value(value, text.clone(), pattern.clone())
                }
            };
            row.push(cell);
        }

        self.rows.try_reserve(1)?;
        self.rows.push(row);
        if self.phase == RefreshPhase::Idle {
            self.update_scrollbars();
        }
        Ok(self.rows.len() - 1)
    }

    // =========================================================================
    // Refresh Cycle
    // =========================================================================

    /// Move every cell into its column's pool and start collecting new rows.
    #[tracing::instrument(skip(self), target = "gridline::table", level = "trace", fields(rows = self.rows.len()))]
    pub fn begin(&mut self) -> bool {
        if self.phase == RefreshPhase::Refreshing {
            contract_violation("begin called while a refresh is already open");
            return false;
        }
        let rows = std::mem::take(&mut self.rows);
        for column in &mut self.columns {
            column.pool.clear();
            column.pool.reserve(rows.len());
        }
        for row in rows {
            for (column, cell) in self.columns.iter_mut().zip(row) {
                column.pool.push(cell);
            }
        }
        self.phase = RefreshPhase::Refreshing;
        true
    }

    /// Carry surfaces and selection over from equal pooled cells, then drop
    /// the pools.
    #[tracing::instrument(skip(self), target = "gridline::table", level = "trace", fields(rows = self.rows.len()))]
    pub fn end(&mut self) -> bool {
        if self.phase != RefreshPhase::Refreshing {
            contract_violation("end called without a matching begin");
            return false;
        }
        let mut reused = 0usize;
        for (n, column) in self.columns.iter_mut().enumerate() {
            for (m, mut old) in std::mem::take(&mut column.pool).into_iter().enumerate() {
                if let Some(cell) = self.rows.get_mut(m).and_then(|row| row.get_mut(n))
                    && cell.same_content(&old)
                {
                    cell.surface = old.surface.take();
                    cell.selected = old.selected;
                    reused += 1;
                }
                if let Some(surface) = old.surface.take() {
                    self.pending_release.push(surface.id);
                }
            }
        }
        tracing::trace!(
            target: targets::TABLE,
            reused,
            released = self.pending_release.len(),
            "refresh finished"
        );
        self.phase = RefreshPhase::Idle;
        self.refreshed_once = true;
        self.update_scrollbars();
        true
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn row_selected(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|cells| !cells.is_empty() && cells.iter().all(|c| c.selected))
    }

    fn set_row_selected(&mut self, row: usize, selected: bool) {
        if let Some(cells) = self.rows.get_mut(row) {
            for cell in cells {
                cell.selected = selected;
            }
        }
    }

    pub fn select_row(&mut self, row: usize) -> Result<()> {
        self.check_row(row)?;
        self.set_row_selected(row, true);
        tracing::debug!(target: targets::TABLE, row, "row selected");
        Ok(())
    }

    pub fn deselect_row(&mut self, row: usize) -> Result<()> {
        self.check_row(row)?;
        self.set_row_selected(row, false);
        Ok(())
    }

    pub fn select_all_rows(&mut self) {
        for cell in self.rows.iter_mut().flatten() {
            cell.selected = true;
        }
    }

    pub fn deselect_all_rows(&mut self) {
        for cell in self.rows.iter_mut().flatten() {
            cell.selected = false;
        }
    }

    /// Select rows `from..=to` in either direction.
    pub fn select_row_range(&mut self, from: usize, to: usize) {
        for row in from.min(to)..=from.max(to) {
            self.set_row_selected(row, true);
        }
    }

    pub fn cell_selected(&self, row: usize, column: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .is_some_and(|c| c.selected)
    }

    pub fn set_cell_selected(&mut self, row: usize, column: usize, selected: bool) -> Result<()> {
        self.check_row(row)?;
        self.check_column(column)?;
        self.rows[row][column].selected = selected;
        Ok(())
    }

    pub fn toggle_cell(&mut self, row: usize, column: usize) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            cell.selected = !cell.selected;
        }
    }

    pub fn selected_rows(&self) -> Vec<usize> {
        (0..self.rows.len()).filter(|&m| self.row_selected(m)).collect()
    }

    pub fn column_selected(&self, column: usize) -> bool {
        self.columns.get(column).is_some_and(|c| c.selected)
    }

    pub fn set_column_selected(&mut self, column: usize, selected: bool) -> Result<()> {
        self.check_column(column)?;
        self.columns[column].selected = selected;
        Ok(())
    }

    pub fn set_all_columns_selected(&mut self, selected: bool) {
        for column in &mut self.columns {
            column.selected = selected;
        }
    }

    pub fn selected_column(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.selected)
    }

    // =========================================================================
    // Surfaces
    // =========================================================================

    /// Every surface the table still holds, emptying the caches.
    pub fn take_surfaces(&mut self) -> Vec<SurfaceId> {
        let mut ids = std::mem::take(&mut self.pending_release);
        for column in &mut self.columns {
            ids.extend(column.label.take());
            ids.extend(column.pool.iter_mut().filter_map(|c| c.surface.take()).map(|s| s.id));
        }
        ids.extend(
            self.rows
                .iter_mut()
                .flatten()
                .filter_map(|c| c.surface.take())
                .map(|s| s.id),
        );
        ids
    }

    pub fn set_poll_fn(&mut self, poll: Option<PollFn>) {
        if poll.is_some() {
            self.flags = self.flags | TableFlags::POLL;
        }
        self.poll = poll;
    }
}

/// Report misuse of the refresh protocol. Debug builds panic, release builds
/// log and carry on.
fn contract_violation(what: &'static str) {
    tracing::error!(target: targets::TABLE, "{what}");
    debug_assert!(false, "{what}");
}

impl std::fmt::Debug for TableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableState")
            .field("flags", &self.flags)
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .field("phase", &self.phase)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TableState {
        let mut state = TableState::new(TableFlags::NONE, TableConfig::default());
        state.add_column(Some("Name"), None, None).unwrap();
        state.add_column(Some("Age"), Some(SizeSpec::Pixels(40)), None).unwrap();
        state
    }

    #[test]
    fn test_add_row_parses_format() {
        let mut s = state();
        s.add_row("%s:%d", ["Alice".into(), 30i32.into()]).unwrap();
        assert_eq!(s.rows.len(), 1);
        assert_eq!(s.rows[0][0].text().as_deref(), Some("Alice"));
        assert_eq!(s.rows[0][1].text().as_deref(), Some("30"));
    }

    #[test]
    fn test_missing_and_extra_specs() {
        let mut s = state();
        s.add_row("%s", ["Alice".into()]).unwrap();
        assert_eq!(s.rows[0][1].text(), None);

        s.add_row("%s:%d:%d", ["Bob".into(), 1i32.into()]).unwrap();
        assert_eq!(s.rows[1].len(), 2);
    }

    #[test]
    fn test_argument_mismatch_adds_nothing() {
        let mut s = state();
        let err = s.add_row("%s:%d", ["Alice".into()]).unwrap_err();
        assert!(matches!(
            err,
            TableError::ArgumentMismatch {
                expected: 2,
                found: 1
            }
        ));
        let err = s.add_row("%s:%d", ["Alice".into(), "thirty".into()]).unwrap_err();
        assert!(matches!(err, TableError::ArgumentType { column: 1, .. }));
        assert!(s.rows.is_empty());
    }

    #[test]
    fn test_malformed_spec_degrades_to_null() {
        let mut s = state();
        s.add_row("%q:%d", [7i32.into()]).unwrap();
        assert_eq!(s.rows.len(), 1);
        assert_eq!(s.rows[0][0].text().as_deref(), Some("%q"));
        assert_eq!(s.rows[0][1].text().as_deref(), Some("7"));
    }

    #[test]
    fn test_oversized_width_degrades_to_null() {
        let mut s = state();
        s.add_row("%99999999999999999999d:%d", [2i32.into()]).unwrap();
        assert_eq!(
            s.rows[0][0].text().as_deref(),
            Some("%99999999999999999999d")
        );
        assert_eq!(s.rows[0][1].text().as_deref(), Some("2"));
    }

    #[test]
    fn test_malformed_spec_takes_no_value() {
        let mut s = state();
        let err = s.add_row("%[s8:%d", [1i32.into(), 2i32.into()]).unwrap_err();
        assert!(matches!(
            err,
            TableError::ArgumentMismatch {
                expected: 1,
                found: 2
            }
        ));
        assert!(s.rows.is_empty());
    }

    #[test]
    fn test_add_column_backfills_rows() {
        let mut s = state();
        s.add_row("%s:%d", ["Alice".into(), 30i32.into()]).unwrap();
        s.add_column(None, Some(SizeSpec::Pixels(10)), None).unwrap();
        assert_eq!(s.rows[0].len(), 3);
        assert_eq!(s.rows[0][2].text(), None);
    }

    #[test]
    fn test_unnamed_column_without_size_is_spacer() {
        let mut s = state();
        let n = s.add_column(None, None, None).unwrap();
        assert!(!s.columns[n].fill);
        assert_eq!(s.columns[n].width, 0);
        assert!(s.columns[0].fill);
    }

    #[test]
    fn test_polled_table_rejects_rows_outside_refresh() {
        let mut s = TableState::new(TableFlags::POLL, TableConfig::default());
        s.add_column(Some("A"), None, None).unwrap();
        assert!(matches!(
            s.add_row("%d", [1i32.into()]),
            Err(TableError::NotRefreshing)
        ));
        assert!(s.begin());
        s.add_row("%d", [1i32.into()]).unwrap();
        assert!(s.end());
        assert!(matches!(
            s.add_column(Some("B"), None, None),
            Err(TableError::NotRefreshing)
        ));
    }

    #[test]
    fn test_refresh_keeps_selection_of_equal_cells() {
        let mut s = state();
        s.add_row("%s:%d", ["Alice".into(), 30i32.into()]).unwrap();
        s.add_row("%s:%d", ["Bob".into(), 25i32.into()]).unwrap();
        s.select_row(1).unwrap();

        s.begin();
        s.add_row("%s:%d", ["Alice".into(), 30i32.into()]).unwrap();
        s.add_row("%s:%d", ["Bob".into(), 26i32.into()]).unwrap();
        s.end();

        assert!(s.cell_selected(1, 0));
        assert!(!s.cell_selected(1, 1));
        assert!(!s.row_selected(1));
    }

    #[test]
    fn test_row_selection_queries() {
        let mut s = state();
        for name in ["a", "b", "c", "d"] {
            s.add_row("%s:%d", [name.into(), 1i32.into()]).unwrap();
        }
        s.select_row_range(3, 1);
        assert_eq!(s.selected_rows(), vec![1, 2, 3]);
        s.deselect_row(2).unwrap();
        assert_eq!(s.selected_rows(), vec![1, 3]);
        s.deselect_all_rows();
        s.deselect_all_rows();
        assert!(s.selected_rows().is_empty());
        assert!(matches!(
            s.select_row(9),
            Err(TableError::RowOutOfRange { index: 9, count: 4 })
        ));
    }

    #[test]
    fn test_row_without_columns_is_never_selected() {
        let mut s = TableState::new(TableFlags::NONE, TableConfig::default());
        s.add_row("", Vec::<CellArg>::new()).unwrap();
        s.select_row(0).unwrap();
        assert!(!s.row_selected(0));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "end called without a matching begin")]
    fn test_end_while_idle_panics_in_debug() {
        let mut s = state();
        s.end();
    }
}
