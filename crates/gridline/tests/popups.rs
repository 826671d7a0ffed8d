//! Context menus opened by right clicks.

mod common;

use std::sync::Arc;

use common::*;
use gridline::prelude::*;

fn right_click(table: &Table, x: i32, y: i32) {
    press_with(table, MouseButton::Right, x, y, KeyboardModifiers::NONE);
}

fn is_visible(menu: &MenuHandle) -> bool {
    menu.lock().is_visible()
}

#[test]
fn test_most_specific_popup_wins() {
    let table = people(TableFlags::NONE);
    let any = table.set_popup(PopupKey::ANY);
    let row = table.set_popup(PopupKey::new(Some(1), None));
    let column = table.set_popup(PopupKey::new(None, Some(1)));
    let exact = table.set_popup(PopupKey::new(Some(1), Some(1)));

    right_click(&table, 120, row_y(1));
    assert!(is_visible(&exact));

    right_click(&table, 120, row_y(0));
    assert!(is_visible(&column));
    assert!(!is_visible(&exact));

    right_click(&table, 50, row_y(1));
    assert!(is_visible(&row));
    assert!(!is_visible(&column));

    right_click(&table, 50, row_y(0));
    assert!(is_visible(&any));
    assert!(!is_visible(&row));
}

#[test]
fn test_popup_opens_below_right_of_pointer() {
    let table = people(TableFlags::NONE);
    let menu = table.set_popup(PopupKey::ANY);
    right_click(&table, 50, row_y(0));
    // The helper reports global = local + (100, 100).
    assert_eq!(menu.lock().position(), Point::new(154, 100 + row_y(0) + 4));
}

#[test]
fn test_header_popup_uses_column_key() {
    let table = people(TableFlags::NONE);
    let any = table.set_popup(PopupKey::ANY);
    right_click(&table, 120, 10);
    assert!(!is_visible(&any));

    let header = table.set_popup(PopupKey::new(None, Some(1)));
    right_click(&table, 120, 10);
    assert!(is_visible(&header));
}

#[test]
fn test_right_click_without_menu_does_nothing() {
    let table = people(TableFlags::NONE);
    table.set_popup(PopupKey::new(Some(0), None));
    right_click(&table, 50, row_y(1));
    assert!(table.selected_rows().is_empty());
    assert!(!is_visible(&table.popup(PopupKey::new(Some(0), None)).unwrap()));
}

#[test]
fn test_replacing_popup_closes_old_menu() {
    let table = people(TableFlags::NONE);
    let first = table.set_popup(PopupKey::ANY);
    right_click(&table, 50, row_y(0));
    assert!(is_visible(&first));

    let second = table.set_popup(PopupKey::ANY);
    assert!(!is_visible(&first));
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&table.popup(PopupKey::ANY).unwrap(), &second));
}

#[test]
fn test_remove_popup() {
    let table = people(TableFlags::NONE);
    let menu = table.set_popup(PopupKey::ANY);
    right_click(&table, 50, row_y(0));

    let removed = table.remove_popup(PopupKey::ANY).unwrap();
    assert!(Arc::ptr_eq(&removed, &menu));
    assert!(!is_visible(&menu));
    assert!(table.popup(PopupKey::ANY).is_none());
    assert!(table.remove_popup(PopupKey::ANY).is_none());

    right_click(&table, 50, row_y(0));
    assert!(!is_visible(&menu));
}

#[test]
fn test_with_popup_fills_menu() {
    let table = people(TableFlags::NONE);
    let count = table.with_popup(PopupKey::new(None, Some(0)), |menu| {
        menu.add_action(Arc::new(Action::new("Copy")));
        menu.add_separator();
        menu.add_action(Arc::new(Action::new("Delete")));
        menu.item_count()
    });
    assert_eq!(count, 3);
    let menu = table.popup(PopupKey::new(None, Some(0))).unwrap();
    assert_eq!(menu.lock().items()[0].display_text(), Some("Copy"));
}
