//! Pointer and keyboard handling.
//!
//! Handlers run with the table state borrowed and only record what should
//! happen outside the borrow (signals, callbacks, popups) as
//! [`Notification`]s.

use std::time::{Duration, Instant};

use gridline_core::logging::targets;
use gridline_core::{TimerId, TimerManager};

use crate::render::Point;
use crate::widget::{
    CursorShape, Key, KeyPressEvent, KeyReleaseEvent, KeyboardModifiers, MouseButton,
    MouseMoveEvent, MousePressEvent, MouseReleaseEvent, WheelEvent, WidgetEvent,
};

use super::grid::TableState;
use super::popup::MenuHandle;
use super::viewport::Hit;
use super::{Notification, TableFlags};

/// Popups open this far below and right of the pointer.
const POPUP_OFFSET: i32 = 4;

/// Detects a second click on the same row or column before a timer runs out.
#[derive(Debug, Default)]
pub(crate) struct ClickTracker {
    index: Option<usize>,
    timer: Option<TimerId>,
}

impl ClickTracker {
    /// Register a click. Returns `true` when it completes a double-click.
    fn click(&mut self, timers: &mut TimerManager, index: usize, now: Instant, window: Duration) -> bool {
        let pending = self.timer.is_some_and(|t| timers.is_active(t));
        if pending && self.index == Some(index) {
            self.reset(timers);
            return true;
        }
        self.index = Some(index);
        // A click elsewhere restarts the window on the same timer.
        let rearmed = self
            .timer
            .is_some_and(|t| timers.reschedule(t, now, window).is_ok());
        if !rearmed {
            self.timer = Some(timers.start_one_shot(now, window));
        }
        false
    }

    /// Forget the marker if `id` is this tracker's timer.
    fn expire(&mut self, id: TimerId) -> bool {
        if self.timer == Some(id) {
            self.timer = None;
            self.index = None;
            true
        } else {
            false
        }
    }

    fn cancel(&mut self, timers: &mut TimerManager) {
        if let Some(timer) = self.timer.take() {
            timers.cancel(timer);
        }
    }

    fn reset(&mut self, timers: &mut TimerManager) {
        self.cancel(timers);
        self.index = None;
    }
}

/// Transient input state.
#[derive(Debug, Default)]
pub(crate) struct InputState {
    pub row_click: ClickTracker,
    pub column_click: ClickTracker,
    /// The held navigation key and its repeat timer.
    pub key_repeat: Option<(Key, TimerId)>,
    pub last_wheel: Option<Instant>,
    /// Column being resized by a header drag.
    pub resizing: Option<usize>,
    /// Pointer x of the last resize step.
    pub drag_x: i32,
    /// Cursor shape last requested.
    pub cursor: CursorShape,
}

/// Keys that move the row selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Navigation {
    Up,
    Down,
    PageUp,
    PageDown,
}

impl Navigation {
    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::ArrowUp => Some(Navigation::Up),
            Key::ArrowDown => Some(Navigation::Down),
            Key::PageUp => Some(Navigation::PageUp),
            Key::PageDown => Some(Navigation::PageDown),
            _ => None,
        }
    }
}

/// How a left click on a cell changes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectMode {
    Exclusive,
    Toggle,
    Range,
}

impl TableState {
    fn select_mode(&self, modifiers: KeyboardModifiers) -> SelectMode {
        let multi = self.flags.contains(TableFlags::MULTI);
        if multi && modifiers.shift {
            SelectMode::Range
        } else if self.flags.contains(TableFlags::MULTITOGGLE) || (multi && modifiers.control) {
            SelectMode::Toggle
        } else {
            SelectMode::Exclusive
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub fn handle_event(
        &mut self,
        event: &mut WidgetEvent,
        now: Instant,
        out: &mut Vec<Notification>,
    ) -> bool {
        self.fire_timers(now, out);
        let consumed = match event {
            WidgetEvent::MousePress(e) => self.mouse_press(e, now, out),
            WidgetEvent::MouseRelease(e) => self.mouse_release(e),
            WidgetEvent::MouseMove(e) => self.mouse_move(e, out),
            WidgetEvent::Wheel(e) => self.wheel(e, now),
            WidgetEvent::KeyPress(e) => self.key_press(e, now),
            WidgetEvent::KeyRelease(e) => self.key_release(e),
            WidgetEvent::FocusOut(..) | WidgetEvent::Hide(_) | WidgetEvent::Detach(_) => {
                self.cancel_input(out);
                false
            }
            WidgetEvent::FocusIn(..) | WidgetEvent::Show(_) => false,
        };
        self.report_scroll(out);
        if consumed {
            event.accept();
        }
        consumed
    }

    /// Run the actions of every timer due at `now`.
    pub fn fire_timers(&mut self, now: Instant, out: &mut Vec<Notification>) {
        for id in self.timers.process_expired(now) {
            if self.input.row_click.expire(id) || self.input.column_click.expire(id) {
                continue;
            }
            if let Some((key, timer)) = self.input.key_repeat
                && timer == id
                && let Some(nav) = Navigation::from_key(key)
            {
                self.navigate(nav);
            }
        }
        self.report_scroll(out);
    }

    /// Stop every input timer and any resize in progress.
    pub fn cancel_input(&mut self, out: &mut Vec<Notification>) {
        self.input.row_click.reset(&mut self.timers);
        self.input.column_click.reset(&mut self.timers);
        self.cancel_key_repeat();
        if self.input.resizing.take().is_some() {
            tracing::debug!(target: targets::TABLE, "resize cancelled");
        }
        self.vbar.release();
        self.hbar.release();
        self.set_cursor(CursorShape::Arrow, out);
    }

    fn cancel_key_repeat(&mut self) {
        if let Some((_, timer)) = self.input.key_repeat.take() {
            self.timers.cancel(timer);
        }
    }

    fn set_cursor(&mut self, shape: CursorShape, out: &mut Vec<Notification>) {
        if self.input.cursor != shape {
            self.input.cursor = shape;
            out.push(Notification::Cursor(shape));
        }
    }

    // =========================================================================
    // Mouse
    // =========================================================================

    fn mouse_press(&mut self, e: &MousePressEvent, now: Instant, out: &mut Vec<Notification>) -> bool {
        let pos = e.local_pos;
        let hit = self.hit(pos);
        if hit == Hit::Outside {
            return false;
        }
        out.push(Notification::Focus);

        match e.button {
            MouseButton::Left => match hit {
                Hit::VerticalBar => {
                    self.vbar.press(pos);
                }
                Hit::HorizontalBar => {
                    self.hbar.press(pos);
                }
                Hit::ResizeHandle(column) => {
                    self.input.resizing = Some(column);
                    self.input.drag_x = pos.x;
                    self.set_cursor(CursorShape::ResizeHorizontal, out);
                    tracing::debug!(target: targets::TABLE, column, "resize started");
                }
                Hit::Header(Some(column)) => self.column_click(column, e.modifiers, now, out),
                Hit::Header(None) => {
                    if self.select_mode(e.modifiers) != SelectMode::Toggle {
                        self.set_all_columns_selected(false);
                    }
                }
                Hit::Cell {
                    row: Some(row),
                    column,
                } => self.cell_click(row, column, e.modifiers, now, out),
                Hit::Cell { row: None, .. } => self.deselect_all_rows(),
                Hit::Outside => {}
            },
            MouseButton::Right => {
                let menu = match hit {
                    Hit::Header(Some(column)) | Hit::ResizeHandle(column) => {
                        self.popups.for_header(column)
                    }
                    Hit::Cell {
                        row: Some(row),
                        column,
                    } => self.popups.for_cell(row, column),
                    _ => None,
                };
                if let Some(menu) = menu {
                    self.open_popup(menu, e.global_pos, out);
                }
            }
            MouseButton::Middle => {}
        }
        true
    }

    fn open_popup(&mut self, menu: MenuHandle, global: Point, out: &mut Vec<Notification>) {
        if let Some(previous) = self.popups.expand(&menu) {
            out.push(Notification::ClosePopup(previous));
        }
        out.push(Notification::ShowPopup(menu, global.offset(POPUP_OFFSET, POPUP_OFFSET)));
    }

    fn column_click(
        &mut self,
        column: usize,
        modifiers: KeyboardModifiers,
        now: Instant,
        out: &mut Vec<Notification>,
    ) {
        if self.select_mode(modifiers) == SelectMode::Toggle {
            if let Some(c) = self.columns.get_mut(column) {
                c.selected = !c.selected;
            }
        } else {
            for (n, c) in self.columns.iter_mut().enumerate() {
                c.selected = n == column;
            }
        }
        tracing::debug!(target: targets::TABLE, column, "column clicked");

        let window = Duration::from_millis(self.config.double_click_ms);
        if self
            .input
            .column_click
            .click(&mut self.timers, column, now, window)
        {
            out.push(Notification::ColumnDoubleClicked(
                column,
                self.column_double_click_fn.clone(),
            ));
        }
    }

    fn cell_click(
        &mut self,
        row: usize,
        column: Option<usize>,
        modifiers: KeyboardModifiers,
        now: Instant,
        out: &mut Vec<Notification>,
    ) {
        self.set_all_columns_selected(false);
        match self.select_mode(modifiers) {
            SelectMode::Range => {
                let nearest = (0..self.rows.len())
                    .filter(|&m| self.row_selected(m))
                    .min_by_key(|&m| m.abs_diff(row));
                match nearest {
                    Some(anchor) => self.select_row_range(anchor, row),
                    None => self.select_row_range(row, row),
                }
                tracing::debug!(target: targets::TABLE, row, ?nearest, "range selected");
            }
            SelectMode::Toggle => {
                if let Some(column) = column {
                    self.toggle_cell(row, column);
                }
            }
            SelectMode::Exclusive => {
                self.deselect_all_rows();
                self.select_row_range(row, row);
                tracing::debug!(target: targets::TABLE, row, "row selected");

                let window = Duration::from_millis(self.config.double_click_ms);
                if self.input.row_click.click(&mut self.timers, row, now, window) {
                    out.push(Notification::RowDoubleClicked(
                        row,
                        self.row_double_click_fn.clone(),
                    ));
                }
            }
        }
    }

    fn mouse_release(&mut self, e: &MouseReleaseEvent) -> bool {
        if e.button != MouseButton::Left {
            return false;
        }
        let resized = self.input.resizing.take();
        if let Some(column) = resized {
            tracing::debug!(target: targets::TABLE, column, "resize finished");
        }
        let dragged = self.vbar.release() | self.hbar.release();
        resized.is_some() || dragged
    }

    fn mouse_move(&mut self, e: &MouseMoveEvent, out: &mut Vec<Notification>) -> bool {
        let pos = e.local_pos;
        if let Some(column) = self.input.resizing {
            let inside = pos.x >= 0 && pos.y >= 0 && pos.x < self.size.width && pos.y < self.size.height;
            if inside {
                let delta = pos.x - self.input.drag_x;
                self.input.drag_x = pos.x;
                let min = self.config.min_column_width;
                if let Some(c) = self.columns.get_mut(column) {
                    c.width = (c.width + delta).max(min);
                    tracing::trace!(target: targets::TABLE, column, width = c.width, "resizing");
                }
                self.layout_columns();
            }
            self.set_cursor(CursorShape::ResizeHorizontal, out);
            return true;
        }
        if self.vbar.is_dragging() {
            self.vbar.drag(pos);
            return true;
        }
        if self.hbar.is_dragging() {
            self.hbar.drag(pos);
            return true;
        }

        let over_handle = matches!(self.hit(pos), Hit::ResizeHandle(_));
        let shape = if over_handle {
            CursorShape::ResizeHorizontal
        } else {
            CursorShape::Arrow
        };
        self.set_cursor(shape, out);
        over_handle
    }

    fn wheel(&mut self, e: &WheelEvent, now: Instant) -> bool {
        if e.delta_y == 0.0 {
            return false;
        }
        let window = self.config.wheel_accel_window_ms;
        let step = match self.input.last_wheel {
            Some(last) => {
                let dt = now.saturating_duration_since(last).as_millis() as u64;
                if dt < window {
                    1 + (window - dt) * 8 / 512
                } else {
                    1
                }
            }
            None => 1,
        };
        self.input.last_wheel = Some(now);

        let step = step as i64;
        let offset = self.offset() as i64;
        let target = if e.delta_y > 0.0 {
            offset - step
        } else {
            offset + step
        };
        self.set_offset(target);
        true
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    fn key_press(&mut self, e: &KeyPressEvent, now: Instant) -> bool {
        let Some(nav) = Navigation::from_key(e.key) else {
            return false;
        };
        // Held keys repeat through our own timer.
        if e.is_repeat {
            return true;
        }
        self.cancel_key_repeat();
        self.navigate(nav);
        let timer = self.timers.start_delayed_repeating(
            now,
            Duration::from_millis(self.config.key_delay_ms),
            Duration::from_millis(self.config.key_repeat_ms),
        );
        self.input.key_repeat = Some((e.key, timer));
        true
    }

    fn key_release(&mut self, e: &KeyReleaseEvent) -> bool {
        match self.input.key_repeat {
            Some((key, _)) if key == e.key => {
                self.cancel_key_repeat();
                true
            }
            _ => false,
        }
    }

    /// Move the row selection and scroll it into view.
    fn navigate(&mut self, nav: Navigation) {
        let count = self.rows.len();
        if count == 0 {
            return;
        }
        let first = (0..count).find(|&m| self.row_selected(m));
        let last = (0..count).rev().find(|&m| self.row_selected(m));
        let page = self.visible_rows().saturating_sub(1).max(1);
        let target = match (nav, first, last) {
            (Navigation::Up, Some(first), _) => first.saturating_sub(1),
            (Navigation::PageUp, Some(first), _) => first.saturating_sub(page),
            (Navigation::Down, _, Some(last)) => (last + 1).min(count - 1),
            (Navigation::PageDown, _, Some(last)) => (last + page).min(count - 1),
            _ => 0,
        };
        self.deselect_all_rows();
        self.select_row_range(target, target);
        self.scroll_to_row(target);
        tracing::trace!(target: targets::TABLE, ?nav, row = target, "keyboard selection");
    }
}
