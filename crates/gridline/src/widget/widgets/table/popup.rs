//! Context menus registered on cells, columns and headers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::widget::widgets::Menu;

/// Shared handle to a registered popup menu.
pub type MenuHandle = Arc<Mutex<Menu>>;

/// Where a popup menu applies.
///
/// `None` is a wildcard: a key with `row: None` applies to every row of its
/// column and to the column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PopupKey {
    /// The row, or any row.
    pub row: Option<usize>,
    /// The column, or any column.
    pub column: Option<usize>,
}

impl PopupKey {
    /// Matches every cell.
    pub const ANY: PopupKey = PopupKey {
        row: None,
        column: None,
    };

    /// Create a key.
    pub fn new(row: Option<usize>, column: Option<usize>) -> Self {
        Self { row, column }
    }

    /// Keys to try for a right click on a cell, most specific first.
    fn cell_lookup(row: usize, column: Option<usize>) -> [PopupKey; 4] {
        [
            PopupKey::new(Some(row), column),
            PopupKey::new(None, column),
            PopupKey::new(Some(row), None),
            PopupKey::ANY,
        ]
    }
}

/// Popup menus by key.
#[derive(Debug, Default)]
pub(crate) struct PopupRegistry {
    menus: HashMap<PopupKey, MenuHandle>,
    /// The menu most recently opened by a right click.
    expanded: Option<MenuHandle>,
}

impl PopupRegistry {
    /// Register a fresh menu under `key`. Returns it with the menu it
    /// replaced.
    pub fn replace(&mut self, key: PopupKey) -> (MenuHandle, Option<MenuHandle>) {
        let menu: MenuHandle = Arc::new(Mutex::new(Menu::new()));
        let old = self.menus.insert(key, menu.clone());
        if let Some(old) = &old {
            self.forget_expanded(old);
        }
        (menu, old)
    }

    /// The menu under `key`, registering an empty one if needed.
    pub fn get_or_insert(&mut self, key: PopupKey) -> MenuHandle {
        self.menus
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(Menu::new())))
            .clone()
    }

    pub fn get(&self, key: PopupKey) -> Option<MenuHandle> {
        self.menus.get(&key).cloned()
    }

    pub fn remove(&mut self, key: PopupKey) -> Option<MenuHandle> {
        let old = self.menus.remove(&key)?;
        self.forget_expanded(&old);
        Some(old)
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    /// The menu for a right click on a cell.
    pub fn for_cell(&self, row: usize, column: Option<usize>) -> Option<MenuHandle> {
        PopupKey::cell_lookup(row, column)
            .into_iter()
            .find_map(|key| self.get(key))
    }

    /// The menu for a right click on a column header.
    pub fn for_header(&self, column: usize) -> Option<MenuHandle> {
        self.get(PopupKey::new(None, Some(column)))
    }

    /// Record `menu` as the expanded popup. Returns the previously expanded
    /// menu if it is a different one.
    pub fn expand(&mut self, menu: &MenuHandle) -> Option<MenuHandle> {
        let previous = self.expanded.replace(menu.clone())?;
        (!Arc::ptr_eq(&previous, menu)).then_some(previous)
    }

    fn forget_expanded(&mut self, menu: &MenuHandle) {
        if self.expanded.as_ref().is_some_and(|e| Arc::ptr_eq(e, menu)) {
            self.expanded = None;
        }
    }
}
