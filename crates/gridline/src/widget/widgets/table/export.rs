//! Delimited text export.

use std::fmt::Write as _;

use super::grid::TableState;

impl TableState {
    /// Named columns as delimited text, header line first.
    ///
    /// Every value is followed by `separator` and every line ends with a
    /// newline. Unnamed columns are skipped.
    pub fn save_text(&self, separator: char) -> String {
        let named: Vec<usize> = (0..self.columns.len())
            .filter(|&n| self.columns[n].is_named())
            .collect();

        let mut out = String::new();
        for &n in &named {
            out.push_str(self.columns[n].name().unwrap_or_default());
            out.push(separator);
        }
        out.push('\n');
        for row in &self.rows {
            for &n in &named {
                if let Some(cell) = row.get(n) {
                    let _ = write!(out, "{}{separator}", cell.export_text());
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::widget::widgets::table::{SizeSpec, TableFlags};

    #[test]
    fn test_save_text_skips_unnamed_columns() {
        let mut s = TableState::new(TableFlags::NONE, TableConfig::default());
        s.add_column(Some("Name"), Some(SizeSpec::Pixels(80)), None).unwrap();
        s.add_column(None, Some(SizeSpec::Pixels(8)), None).unwrap();
        s.add_column(Some("Age"), None, None).unwrap();
        s.add_row("%s::%d", ["Alice".into(), 30i32.into()]).unwrap();
        s.add_row("%s::", ["Bob".into()]).unwrap();
        assert_eq!(s.save_text('\t'), "Name\tAge\t\nAlice\t30\t\nBob\t<null>\t\n");
    }

    #[test]
    fn test_save_text_without_rows() {
        let mut s = TableState::new(TableFlags::NONE, TableConfig::default());
        assert_eq!(s.save_text(','), "\n");
        s.add_column(Some("a"), None, None).unwrap();
        assert_eq!(s.save_text(','), "a,\n");
    }
}
