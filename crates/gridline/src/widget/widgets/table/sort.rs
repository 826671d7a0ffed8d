//! Row sorting.

use gridline_core::logging::targets;

use crate::error::Result;

use super::column::SortOrder;
use super::grid::TableState;

impl TableState {
    /// Stable sort of the rows by `column`, using the column's sort
    /// function or natural cell order. Cells keep their selection and
    /// cached surfaces.
    pub fn sort_rows(&mut self, column: usize, order: SortOrder) -> Result<()> {
        self.check_column(column)?;
        let key = &self.columns[column];
        self.rows.sort_by(|a, b| {
            let ordering = key.compare(&a[column], &b[column]);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        self.columns[column].sort_order = order;
        tracing::debug!(target: targets::TABLE, column, ?order, rows = self.rows.len(), "rows sorted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::TableConfig;
    use crate::widget::widgets::table::{Cell, CellArg, SizeSpec, SortFn, TableFlags};

    fn table(sort_fn: Option<SortFn>) -> TableState {
        let mut s = TableState::new(TableFlags::NONE, TableConfig::default());
        s.add_column(Some("Name"), Some(SizeSpec::Pixels(80)), sort_fn).unwrap();
        s.add_column(Some("Age"), Some(SizeSpec::Pixels(40)), None).unwrap();
        for (name, age) in [("Carol", 41i32), ("alice", 30), ("Bob", 25), ("Dave", 30)] {
            s.add_row("%s:%d", [CellArg::from(name), CellArg::from(age)]).unwrap();
        }
        s
    }

    fn names(s: &TableState) -> Vec<String> {
        s.rows.iter().map(|r| r[0].export_text()).collect()
    }

    #[test]
    fn test_numeric_sort_is_stable() {
        let mut s = table(None);
        s.select_row(1).unwrap();
        s.sort_rows(1, SortOrder::Ascending).unwrap();
        assert_eq!(names(&s), ["Bob", "alice", "Dave", "Carol"]);
        assert_eq!(s.selected_rows(), vec![1]);

        s.sort_rows(1, SortOrder::Descending).unwrap();
        assert_eq!(names(&s), ["Carol", "alice", "Dave", "Bob"]);
        assert_eq!(s.columns[1].sort_order(), SortOrder::Descending);
    }

    #[test]
    fn test_column_sort_fn() {
        let by_lowercase: SortFn = Arc::new(|a: &Cell, b: &Cell| {
            let (a, b) = (a.export_text().to_lowercase(), b.export_text().to_lowercase());
            a.cmp(&b)
        });
        let mut s = table(Some(by_lowercase));
        s.sort_rows(0, SortOrder::Ascending).unwrap();
        assert_eq!(names(&s), ["alice", "Bob", "Carol", "Dave"]);

        let mut plain = table(None);
        plain.sort_rows(0, SortOrder::Ascending).unwrap();
        assert_eq!(names(&plain), ["Bob", "Carol", "Dave", "alice"]);
    }

    #[test]
    fn test_sort_rejects_bad_column() {
        let mut s = table(None);
        assert!(s.sort_rows(5, SortOrder::Ascending).is_err());
    }
}
