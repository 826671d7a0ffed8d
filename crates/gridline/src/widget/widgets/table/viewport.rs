//! Viewport: visible rows, scroll offsets, column layout and size
//! negotiation.

use gridline_core::logging::targets;

use crate::render::{Point, Rect, Size};
use crate::widget::SizeHint;

use super::grid::TableState;
use super::{Notification, TableFlags};

/// What lies under a point of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hit {
    VerticalBar,
    HorizontalBar,
    /// The resize band at the right edge of a column header.
    ResizeHandle(usize),
    /// A column header, or the header strip right of the last column.
    Header(Option<usize>),
    /// The cell area. `row` is `None` below the last row, `column` is
    /// `None` right of the last column.
    Cell {
        row: Option<usize>,
        column: Option<usize>,
    },
    Outside,
}

impl TableState {
    // =========================================================================
    // Vertical
    // =========================================================================

    /// Rows that fit in the widget height, header included.
    pub fn visible_rows(&self) -> usize {
        (self.size.height / self.config.row_height).max(0) as usize
    }

    /// Rows that fit below the header, at least one.
    fn data_rows(&self) -> usize {
        let height = (self.size.height - self.config.header_height).max(0);
        ((height / self.config.row_height) as usize).max(1)
    }

    pub fn max_offset(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.rows.len() + 2).saturating_sub(self.visible_rows())
        }
    }

    /// First row shown below the header.
    pub fn offset(&self) -> usize {
        self.vbar.value().max(0) as usize
    }

    /// Set the row offset, clamped to `[0, max_offset]`.
    pub fn set_offset(&mut self, offset: i64) -> bool {
        let offset = offset.clamp(0, i64::from(i32::MAX)) as i32;
        self.vbar.set_value(offset)
    }

    /// Scroll the least distance that brings `row` into view.
    pub fn scroll_to_row(&mut self, row: usize) -> bool {
        let offset = self.offset();
        let data_rows = self.data_rows();
        let target = if row < offset {
            row
        } else if row >= offset + data_rows {
            row + 1 - data_rows
        } else {
            return false;
        };
        self.set_offset(target as i64)
    }

    /// Recompute the vertical range and thumb, then the column layout.
    pub fn update_scrollbars(&mut self) {
        let rows = self.rows.len();
        let visible = self.visible_rows();
        self.vbar.set_range(0, self.max_offset() as i32);
        self.vbar
            .set_page_step(self.data_rows().saturating_sub(1).max(1) as i32);

        let track = self.vbar.geometry().height();
        let thumb = if visible > 0 && visible - 1 < rows {
            Some(((visible - 1) as i64 * i64::from(track) / rows as i64) as i32)
        } else {
            None
        };
        self.vbar.set_thumb_length(thumb);
        self.layout_columns();
    }

    // =========================================================================
    // Horizontal
    // =========================================================================

    pub fn x_offset(&self) -> i32 {
        self.hbar.value()
    }

    pub fn total_column_width(&self) -> i32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Size fill columns, recompute column positions and the horizontal
    /// range.
    pub fn layout_columns(&mut self) {
        let fixed: i32 = self.columns.iter().filter(|c| !c.fill).map(|c| c.width).sum();
        let fills = self.columns.iter().filter(|c| c.fill).count() as i32;
        if fills > 0 {
            let spare = (self.table_width - fixed).max(0);
            let each = spare / fills;
            let mut remainder = spare - each * fills;
            for column in self.columns.iter_mut().filter(|c| c.fill) {
                column.width = each + remainder;
                remainder = 0;
            }
        }

        let mut x = 0;
        for column in &mut self.columns {
            column.x = x;
            x += column.width;
        }

        let overflow = (x - self.table_width).max(0);
        self.hbar.set_range(0, overflow);
        self.hbar.set_page_step((self.table_width / 2).max(1));
        self.hbar.set_thumb_length((overflow > 0).then(|| {
            (i64::from(self.table_width) * i64::from(self.hbar.geometry().width())
                / i64::from(x.max(1))) as i32
        }));
        self.hbar
            .set_visible(overflow > 0 && !self.size.is_empty());
    }

    pub fn set_x_offset(&mut self, x: i32) -> bool {
        self.hbar.set_value(x)
    }

    /// Queue scroll signals for offsets that moved since the last report.
    pub fn report_scroll(&mut self, out: &mut Vec<Notification>) {
        let offset = self.vbar.value();
        if offset != self.reported_offset {
            self.reported_offset = offset;
            out.push(Notification::VerticalScrolled(offset));
        }
        let x = self.hbar.value();
        if x != self.reported_x_offset {
            self.reported_x_offset = x;
            out.push(Notification::HorizontalScrolled(x));
        }
    }

    // =========================================================================
    // Hit Testing
    // =========================================================================

    /// The column whose body spans `x` (widget coordinates).
    pub fn column_at(&self, x: i32) -> Option<usize> {
        let x = x + self.x_offset();
        self.columns
            .iter()
            .position(|c| c.width > 0 && x >= c.x && x < c.x + c.width)
    }

    /// The column whose right edge lies within half the resize band of `x`.
    pub fn resize_handle_at(&self, x: i32) -> Option<usize> {
        let x = x + self.x_offset();
        let half = self.config.resize_band / 2;
        self.columns
            .iter()
            .position(|c| c.width > 0 && (x - (c.x + c.width)).abs() <= half)
    }

    pub fn hit(&self, pos: Point) -> Hit {
        if self.vbar.contains(pos) {
            return Hit::VerticalBar;
        }
        if self.hbar.contains(pos) {
            return Hit::HorizontalBar;
        }
        let area = Rect::new(0, 0, self.table_width, self.size.height);
        if !area.contains(pos) {
            return Hit::Outside;
        }
        if pos.y < self.config.header_height {
            return match self.resize_handle_at(pos.x) {
                Some(column) => Hit::ResizeHandle(column),
                None => Hit::Header(self.column_at(pos.x)),
            };
        }
        let row = self.offset() + ((pos.y - self.config.header_height) / self.config.row_height) as usize;
        Hit::Cell {
            row: (row < self.rows.len()).then_some(row),
            column: self.column_at(pos.x),
        }
    }

    // =========================================================================
    // Size Negotiation
    // =========================================================================

    pub fn size_hint(&self) -> SizeHint {
        let config = &self.config;
        let width = self.hint_width.unwrap_or_else(|| {
            self.columns
                .iter()
                .map(|c| if c.fill { config.fill_min_width } else { c.width })
                .sum::<i32>()
                + config.scrollbar_width
                + 2
        });
        let height = self.hint_height.unwrap_or(config.preferred_height);

        let hint = SizeHint::from_dimensions(width, height).with_minimum(Size::new(
            config.scrollbar_width + 1,
            config.row_height + 1,
        ));
        let hfill = self.flags.contains(TableFlags::HFILL);
        let vfill = self.flags.contains(TableFlags::VFILL);
        if hfill && vfill {
            hint
        } else {
            hint.with_maximum(Size::new(
                if hfill { i32::MAX } else { width },
                if vfill { i32::MAX } else { height },
            ))
        }
    }

    pub fn set_size_hint(&mut self, width: Option<i32>, rows: Option<usize>) {
        self.hint_width = width;
        self.hint_height = rows.map(|n| {
            let rows = i32::try_from(n).unwrap_or(i32::MAX);
            self.config
                .header_height
                .saturating_add(rows.saturating_mul(self.config.row_height))
        });
    }

    /// Accept an allocation. Sizes no wider than the scrollbar or no taller
    /// than one row are refused.
    pub fn size_allocate(&mut self, size: Size) -> bool {
        let bar = self.config.scrollbar_width;
        let header = self.config.header_height;
        if size.width <= bar || size.height <= self.config.row_height {
            tracing::debug!(target: targets::TABLE, ?size, "allocation refused");
            return false;
        }
        self.size = size;

        let show_vbar = size.height >= bar * 2;
        self.vbar.set_visible(show_vbar);
        self.vbar.set_geometry(Rect::new(
            size.width - bar,
            header,
            bar,
            (size.height - header).max(0),
        ));
        self.table_width = if show_vbar { size.width - bar } else { size.width };
        self.hbar
            .set_geometry(Rect::new(0, size.height - bar, self.table_width, bar));

        self.update_scrollbars();
        true
    }
}
