//! Shared helpers for table integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use gridline::prelude::*;
use gridline::widget::{
    FocusReason, KeyPressEvent, KeyReleaseEvent, MouseMoveEvent, MousePressEvent,
    MouseReleaseEvent, WheelEvent,
};
use slotmap::SlotMap;

/// Allocated size used by most tests: 12 visible rows, a 200 px wide table
/// area left of the vertical scrollbar and 10 data rows below the header.
pub const SIZE: Size = Size::new(216, 216);

pub const HEADER: i32 = 20;
pub const ROW: i32 = 18;

/// A y coordinate inside `row` when the table is not scrolled.
pub fn row_y(row: usize) -> i32 {
    HEADER + row as i32 * ROW + ROW / 2
}

/// A painter that records what the table asked for.
#[derive(Default)]
pub struct RecordingPainter {
    pub surfaces: SlotMap<SurfaceId, String>,
    pub rendered: Vec<String>,
    pub released: Vec<SurfaceId>,
    pub blits: Vec<(SurfaceId, Point)>,
    pub blends: Vec<Rect>,
    pub clips: i32,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything recorded so far, keeping live surfaces.
    pub fn reset(&mut self) {
        self.rendered.clear();
        self.released.clear();
        self.blits.clear();
        self.blends.clear();
    }

    /// Texts blitted during the recorded passes, in order.
    pub fn blitted_texts(&self) -> Vec<String> {
        self.blits
            .iter()
            .filter_map(|(id, _)| self.surfaces.get(*id).cloned())
            .collect()
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }
}

impl TextRenderer for RecordingPainter {
    fn render_text(&mut self, text: &str, _color: Color) -> SurfaceId {
        self.rendered.push(text.to_owned());
        self.surfaces.insert(text.to_owned())
    }

    fn surface_size(&self, id: SurfaceId) -> Size {
        let chars = self.surfaces.get(id).map_or(0, |t| t.chars().count());
        Size::new(chars as i32 * 7, 12)
    }

    fn release_surface(&mut self, id: SurfaceId) {
        assert!(
            self.surfaces.remove(id).is_some(),
            "surface released twice or never rendered"
        );
        self.released.push(id);
    }
}

impl Painter for RecordingPainter {
    fn fill_rect(&mut self, _rect: Rect, _color: Color) {}

    fn draw_line_h(&mut self, _x1: i32, _x2: i32, _y: i32, _color: Color) {}

    fn draw_line_v(&mut self, _x: i32, _y1: i32, _y2: i32, _color: Color) {}

    fn blend_rect(&mut self, rect: Rect, _color: Color) {
        self.blends.push(rect);
    }

    fn blit(&mut self, id: SurfaceId, at: Point) {
        self.blits.push((id, at));
    }

    fn clip_rect(&mut self, _rect: Rect) {
        self.clips += 1;
    }

    fn restore_clip(&mut self) {
        self.clips -= 1;
    }
}

/// The Name/Age table used across scenarios, allocated at [`SIZE`].
pub fn people(flags: TableFlags) -> Table {
    let table = Table::new(flags);
    table
        .add_column(Some("Name"), Some(SizeSpec::Pixels(100)), None)
        .unwrap();
    table
        .add_column(Some("Age"), Some(SizeSpec::Pixels(50)), None)
        .unwrap();
    table
        .add_row("%s:%d", ["Alice".into(), 30i32.into()])
        .unwrap();
    table.add_row("%s:%d", ["Bob".into(), 25i32.into()]).unwrap();
    assert!(table.size_allocate(SIZE));
    table
}

/// A single-column table of `rows` numbered rows, driven by `clock`.
pub fn numbered(rows: usize, clock: &ManualClock) -> Table {
    let table = Table::new(TableFlags::NONE).with_clock(Arc::new(clock.clone()));
    table
        .add_column(Some("n"), Some(SizeSpec::Pixels(80)), None)
        .unwrap();
    for n in 0..rows {
        table.add_row("%u", [(n as u32).into()]).unwrap();
    }
    assert!(table.size_allocate(SIZE));
    table
}

pub fn press_with(table: &Table, button: MouseButton, x: i32, y: i32, modifiers: KeyboardModifiers) -> bool {
    let pos = Point::new(x, y);
    let mut event = WidgetEvent::MousePress(MousePressEvent::new(
        button,
        pos,
        pos,
        pos.offset(100, 100),
        modifiers,
    ));
    table.handle_event(&mut event)
}

pub fn click(table: &Table, x: i32, y: i32) -> bool {
    let pressed = press_with(table, MouseButton::Left, x, y, KeyboardModifiers::NONE);
    release(table, x, y);
    pressed
}

pub fn release(table: &Table, x: i32, y: i32) -> bool {
    let pos = Point::new(x, y);
    let mut event = WidgetEvent::MouseRelease(MouseReleaseEvent::new(
        MouseButton::Left,
        pos,
        pos,
        pos,
        KeyboardModifiers::NONE,
    ));
    table.handle_event(&mut event)
}

pub fn move_to(table: &Table, x: i32, y: i32) -> bool {
    let pos = Point::new(x, y);
    let mut event = WidgetEvent::MouseMove(MouseMoveEvent::new(
        pos,
        pos,
        pos,
        0,
        KeyboardModifiers::NONE,
    ));
    table.handle_event(&mut event)
}

/// One wheel notch; positive `notches` scroll up.
pub fn wheel(table: &Table, notches: f32) -> bool {
    let mut event = WidgetEvent::Wheel(WheelEvent::new(
        Point::new(10, 60),
        0.0,
        notches,
        KeyboardModifiers::NONE,
    ));
    table.handle_event(&mut event)
}

pub fn key_down(table: &Table, key: Key) -> bool {
    let mut event = WidgetEvent::KeyPress(KeyPressEvent::new(key, KeyboardModifiers::NONE, false));
    table.handle_event(&mut event)
}

pub fn key_up(table: &Table, key: Key) -> bool {
    let mut event = WidgetEvent::KeyRelease(KeyReleaseEvent::new(key, KeyboardModifiers::NONE));
    table.handle_event(&mut event)
}

pub fn focus_out(table: &Table) {
    let mut event = WidgetEvent::focus_out(FocusReason::Other);
    table.handle_event(&mut event);
}
