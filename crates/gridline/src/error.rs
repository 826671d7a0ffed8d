//! Error types for Gridline widgets.

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors reported by the table widget.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Growing the grid failed to allocate.
    #[error("Out of memory while growing the table")]
    OutOfMemory,

    /// The number of row values does not match the row format.
    #[error("Row format expects {expected} values, {found} supplied")]
    ArgumentMismatch { expected: usize, found: usize },

    /// A row value does not match the kind its column format asks for.
    #[error("Column {column} expects {expected} but got {found}")]
    ArgumentType {
        column: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// Rows or columns were added outside the refresh window of a polled table.
    #[error("Polled tables accept rows and columns only while refreshing")]
    NotRefreshing,

    /// A column index is past the last column.
    #[error("Column {index} out of range ({count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    /// A row index is past the last row.
    #[error("Row {index} out of range ({count} rows)")]
    RowOutOfRange { index: usize, count: usize },

    /// Writing exported text failed.
    #[error("Failed to write table text: {0}")]
    Io(#[from] std::io::Error),

    /// Table configuration could not be parsed.
    #[error("Invalid table configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<std::collections::TryReserveError> for TableError {
    fn from(_: std::collections::TryReserveError) -> Self {
        TableError::OutOfMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TableError::ArgumentMismatch {
            expected: 2,
            found: 1,
        };
        assert_eq!(err.to_string(), "Row format expects 2 values, 1 supplied");

        let err = TableError::ColumnOutOfRange { index: 4, count: 2 };
        assert_eq!(err.to_string(), "Column 4 out of range (2 columns)");
    }

    #[test]
    fn test_try_reserve_maps_to_out_of_memory() {
        let mut v: Vec<u64> = Vec::new();
        let err = v.try_reserve(usize::MAX).unwrap_err();
        assert!(matches!(TableError::from(err), TableError::OutOfMemory));
    }
}
