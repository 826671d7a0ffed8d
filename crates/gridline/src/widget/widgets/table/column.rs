//! Table columns.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::render::SurfaceId;

use super::cell::Cell;

/// Comparison function used to sort rows by a column.
pub type SortFn = Arc<dyn Fn(&Cell, &Cell) -> Ordering + Send + Sync>;

/// Sort order for a column's sort indicator and [`Table::sort_rows`].
///
/// [`Table::sort_rows`]: super::Table::sort_rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// How wide a new column should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeSpec {
    /// A fixed width in pixels.
    Pixels(i32),
    /// A percentage of the table width, resolved when the column is added.
    Percent(i32),
}

impl SizeSpec {
    /// Parse `"120"`, `"120px"` or `"25%"`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(p) = text.strip_suffix('%') {
            return p.trim().parse().ok().filter(|p| *p >= 0).map(SizeSpec::Percent);
        }
        let px = text.strip_suffix("px").unwrap_or(text);
        px.trim().parse().ok().filter(|w| *w >= 0).map(SizeSpec::Pixels)
    }

    /// Resolve to pixels against the available width.
    pub fn resolve(self, available: i32) -> i32 {
        match self {
            SizeSpec::Pixels(w) => w.max(0),
            SizeSpec::Percent(p) => (i64::from(p) * i64::from(available.max(0)) / 100) as i32,
        }
    }
}

/// Error returned when a size spec string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid column size: {0:?}")]
pub struct ParseSizeSpecError(pub String);

impl FromStr for SizeSpec {
    type Err = ParseSizeSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizeSpec::parse(s).ok_or_else(|| ParseSizeSpecError(s.to_owned()))
    }
}

/// A column of the table.
#[derive(Clone)]
pub struct Column {
    pub(crate) name: Option<String>,
    pub(crate) width: i32,
    pub(crate) fill: bool,
    /// Left edge relative to the first column, before horizontal scrolling.
    pub(crate) x: i32,
    pub(crate) sort_order: SortOrder,
    pub(crate) sort_fn: Option<SortFn>,
    pub(crate) selected: bool,
    pub(crate) label: Option<SurfaceId>,
    /// Cells of the previous refresh cycle, by row.
    pub(crate) pool: Vec<Cell>,
}

impl Column {
    pub(crate) fn new(name: Option<String>, width: i32, fill: bool, sort_fn: Option<SortFn>) -> Self {
        Self {
            name,
            width,
            fill,
            x: 0,
            sort_order: SortOrder::Ascending,
            sort_fn,
            selected: false,
            label: None,
            pool: Vec::new(),
        }
    }

    /// The header label, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Whether the column absorbs the table's spare width.
    pub fn is_fill(&self) -> bool {
        self.fill
    }

    /// Left edge relative to the first column.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// The sort indicator.
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Whether the column is selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether the column has a non-empty header label and is exported.
    pub(crate) fn is_named(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub(crate) fn compare(&self, a: &Cell, b: &Cell) -> Ordering {
        match &self.sort_fn {
            Some(f) => f(a, b),
            None => a.natural_cmp(b),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("fill", &self.fill)
            .field("x", &self.x)
            .field("sort_order", &self.sort_order)
            .field("has_sort_fn", &self.sort_fn.is_some())
            .field("selected", &self.selected)
            .field("pooled", &self.pool.len())
            .finish()
    }
}
