//! Drawing the table.

use gridline_core::logging::targets;

use crate::render::{Color, Painter, Point, Rect, SurfaceId, TextRenderer};

use super::cell::{CachedSurface, Cell, CellValue};
use super::grid::TableState;

/// Horizontal gap between a column edge and its cell text.
const CELL_PADDING: i32 = 2;

impl TableState {
    /// Paint the table in widget coordinates.
    ///
    /// Surfaces discarded by the last refresh are released first. Cell
    /// surfaces are rendered on demand and cached on their cell until the
    /// displayed text changes or [`redraw_cells`] forces a re-render.
    ///
    /// [`redraw_cells`]: super::Table::redraw_cells
    #[tracing::instrument(skip_all, target = "gridline::table", level = "trace", fields(rows = self.rows.len()))]
    pub fn paint(&mut self, painter: &mut dyn Painter) {
        for id in self.pending_release.drain(..) {
            painter.release_surface(id);
        }
        self.refreshed_once = true;
        if self.size.is_empty() {
            return;
        }

        let palette = self.config.palette.clone();
        let header = self.config.header_height;
        let row_h = self.config.row_height;
        let height = self.size.height;
        let width = self.table_width;
        let x_offset = self.x_offset();
        let offset = self.offset().min(self.rows.len());
        let redraw = self.redraw_cells;

        let area = Rect::new(0, 0, width, height);
        painter.fill_rect(area, palette.background);
        painter.fill_rect(Rect::new(0, 0, width, header), palette.header);
        painter.clip_rect(area);

        let mut drawn_rows = 0;
        for (index, column) in self.columns.iter_mut().enumerate() {
            if column.width <= 0 {
                continue;
            }
            let x = column.x - x_offset;
            if x >= width {
                break;
            }
            if x + column.width <= 0 {
                continue;
            }
            if x > 0 {
                painter.draw_line_v(x - 1, header - 1, height, palette.grid);
            }

            if column.label.is_none()
                && let Some(name) = column.name.as_deref().filter(|n| !n.is_empty())
            {
                column.label = Some(painter.render_text(name, palette.text));
            }
            if let Some(label) = column.label {
                let size = painter.surface_size(label);
                painter.blit(
                    label,
                    Point::new(
                        x + (column.width - size.width) / 2,
                        (header - size.height) / 2,
                    ),
                );
            }

            let mut y = header;
            let mut count = 0;
            for row in self.rows.iter_mut().skip(offset) {
                if y >= height {
                    break;
                }
                let Some(cell) = row.get_mut(index) else {
                    break;
                };
                let at = Point::new(x + CELL_PADDING, y);
                if let Some(id) = cell_surface(cell, painter, at, palette.text, redraw) {
                    let size = painter.surface_size(id);
                    painter.blit(id, Point::new(at.x, y + (row_h - size.height) / 2));
                }
                if cell.selected {
                    painter.blend_rect(Rect::new(x, y, column.width, row_h), palette.selection);
                }
                y += row_h;
                count += 1;
            }
            drawn_rows = drawn_rows.max(count);

            if column.selected {
                painter.blend_rect(Rect::new(x, 0, column.width, height), palette.selection);
            }
        }

        let right = (self.total_column_width() - x_offset).min(width);
        if right > 0 && right < width {
            painter.draw_line_v(right - 1, header - 1, height, palette.grid);
        }
        for n in 0..=drawn_rows {
            let y = header + n as i32 * row_h;
            if y < height {
                painter.draw_line_h(0, width, y, palette.grid);
            }
        }
        painter.restore_clip();

        self.vbar.paint(painter);
        self.hbar.paint(painter);

        if redraw {
            tracing::trace!(target: targets::TABLE, "cell surfaces re-rendered");
        }
        self.redraw_cells = false;
    }
}

/// The surface to show for `cell`, rendering it if the cache is stale.
fn cell_surface(
    cell: &mut Cell,
    painter: &mut dyn Painter,
    at: Point,
    color: Color,
    redraw: bool,
) -> Option<SurfaceId> {
    if let CellValue::FnSurface(f) = &cell.value {
        if !redraw && let Some(cached) = &cell.surface {
            return Some(cached.id);
        }
        let renderer: &mut dyn TextRenderer = &mut *painter;
        let id = f(renderer, at);
        replace_surface(cell, painter, CachedSurface { id, text: None });
        return Some(id);
    }

    let text = cell.text();
    if !redraw
        && let Some(cached) = &cell.surface
        && cached.text == text
    {
        return Some(cached.id);
    }
    match text {
        Some(text) => {
            let id = painter.render_text(&text, color);
            replace_surface(
                cell,
                painter,
                CachedSurface {
                    id,
                    text: Some(text),
                },
            );
            Some(id)
        }
        None => {
            if let Some(old) = cell.surface.take() {
                painter.release_surface(old.id);
            }
            None
        }
    }
}

fn replace_surface(cell: &mut Cell, painter: &mut dyn Painter, surface: CachedSurface) {
    let id = surface.id;
    if let Some(old) = cell.surface.replace(surface)
        && old.id != id
    {
        painter.release_surface(old.id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use slotmap::SlotMap;

    use super::*;
    use crate::config::TableConfig;
    use crate::render::Size;
    use crate::widget::widgets::table::{CellArg, SizeSpec, TableFlags};

    #[derive(Default)]
    struct Recorder {
        surfaces: SlotMap<SurfaceId, String>,
        rendered: Vec<String>,
        released: Vec<SurfaceId>,
        blits: Vec<(SurfaceId, Point)>,
        blends: usize,
        clip_depth: i32,
    }

    impl TextRenderer for Recorder {
        fn render_text(&mut self, text: &str, _color: Color) -> SurfaceId {
            self.rendered.push(text.to_owned());
            self.surfaces.insert(text.to_owned())
        }

        fn surface_size(&self, id: SurfaceId) -> Size {
            let len = self.surfaces.get(id).map_or(0, |t| t.len());
            Size::new(len as i32 * 6, 12)
        }

        fn release_surface(&mut self, id: SurfaceId) {
            self.surfaces.remove(id);
            self.released.push(id);
        }
    }

    impl Painter for Recorder {
        fn fill_rect(&mut self, _rect: Rect, _color: Color) {}
        fn draw_line_h(&mut self, _x1: i32, _x2: i32, _y: i32, _color: Color) {}
        fn draw_line_v(&mut self, _x: i32, _y1: i32, _y2: i32, _color: Color) {}
        fn blend_rect(&mut self, _rect: Rect, _color: Color) {
            self.blends += 1;
        }
        fn blit(&mut self, id: SurfaceId, at: Point) {
            self.blits.push((id, at));
        }
        fn clip_rect(&mut self, _rect: Rect) {
            self.clip_depth += 1;
        }
        fn restore_clip(&mut self) {
            self.clip_depth -= 1;
        }
    }

    fn table() -> TableState {
        let mut s = TableState::new(TableFlags::NONE, TableConfig::default());
        s.add_column(Some("Name"), Some(SizeSpec::Pixels(100)), None).unwrap();
        s.add_column(Some("Age"), Some(SizeSpec::Pixels(50)), None).unwrap();
        s.add_row("%s:%d", ["Alice".into(), 30i32.into()]).unwrap();
        s.add_row("%s:%d", ["Bob".into(), 25i32.into()]).unwrap();
        s.size_allocate(Size::new(216, 216));
        s
    }

    #[test]
    fn test_surfaces_cached_between_passes() {
        let mut s = table();
        let mut painter = Recorder::default();
        s.paint(&mut painter);
        assert_eq!(painter.rendered, ["Name", "Alice", "Bob", "Age", "30", "25"]);
        assert_eq!(painter.clip_depth, 0);

        painter.rendered.clear();
        s.paint(&mut painter);
        assert!(painter.rendered.is_empty());
        assert!(painter.released.is_empty());
    }

    #[test]
    fn test_cells_blitted_in_their_rows() {
        let mut s = table();
        let mut painter = Recorder::default();
        s.paint(&mut painter);
        let bob = painter.surfaces.iter().find(|(_, t)| *t == "Bob").map(|(id, _)| id).unwrap();
        let (_, at) = painter.blits.iter().find(|(id, _)| *id == bob).unwrap();
        // Second row starts at header + row height; text is 12 high.
        assert_eq!(*at, Point::new(CELL_PADDING, 20 + 18 + 3));
    }

    #[test]
    fn test_redraw_cells_rerenders_everything() {
        let mut s = table();
        let mut painter = Recorder::default();
        s.paint(&mut painter);
        s.redraw_cells = true;
        painter.rendered.clear();
        s.paint(&mut painter);
        assert_eq!(painter.rendered, ["Alice", "Bob", "30", "25"]);
        assert_eq!(painter.released.len(), 4);
        assert!(!s.redraw_cells);
    }

    #[test]
    fn test_changed_reference_is_rerendered() {
        let value = Arc::new(parking_lot::RwLock::new(7i32));
        let mut s = TableState::new(TableFlags::NONE, TableConfig::default());
        s.add_column(Some("n"), Some(SizeSpec::Pixels(60)), None).unwrap();
        s.add_row("%*d", [CellArg::from(&value)]).unwrap();
        s.size_allocate(Size::new(216, 216));

        let mut painter = Recorder::default();
        s.paint(&mut painter);
        *value.write() = 8;
        painter.rendered.clear();
        s.paint(&mut painter);
        assert_eq!(painter.rendered, ["8"]);
        assert_eq!(painter.released.len(), 1);
    }

    #[test]
    fn test_surface_fn_called_once() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let mut s = TableState::new(TableFlags::NONE, TableConfig::default());
        s.add_column(Some("img"), Some(SizeSpec::Pixels(60)), None).unwrap();
        s.add_row(
            "%[Fs]",
            [CellArg::surface_fn(move |r: &mut dyn TextRenderer, _at| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                r.render_text("icon", Color::BLACK)
            })],
        )
        .unwrap();
        s.size_allocate(Size::new(216, 216));

        let mut painter = Recorder::default();
        s.paint(&mut painter);
        s.paint(&mut painter);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_selection_tints() {
        let mut s = table();
        s.select_row(0).unwrap();
        s.set_column_selected(1, true).unwrap();
        let mut painter = Recorder::default();
        s.paint(&mut painter);
        // Two selected cells and one selected column.
        assert_eq!(painter.blends, 3);
    }

    #[test]
    fn test_pending_surfaces_released_first() {
        let mut s = table();
        let mut painter = Recorder::default();
        s.paint(&mut painter);
        s.begin();
        s.add_row("%s:%d", ["Carol".into(), 41i32.into()]).unwrap();
        s.end();
        assert_eq!(s.pending_release.len(), 4);
        painter.released.clear();
        s.paint(&mut painter);
        assert_eq!(painter.released.len(), 4);
    }
}
