//! Ordered list editing for galleries and repeatable content blocks.
//!
//! Every operation is pure: it borrows the current list and returns the edited
//! copy. Out-of-range indices leave the list unchanged.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fresh unique id for a new list item.
pub fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}

/// Add `item` at the end.
pub fn append<T: Clone>(list: &[T], item: T) -> Vec<T> {
    let mut items = list.to_vec();
    items.push(item);
    items
}

/// Remove the element at `index`.
pub fn remove_at<T: Clone>(list: &[T], index: usize) -> Vec<T> {
    let mut items = list.to_vec();
    if index < items.len() {
        items.remove(index);
    }
    items
}

/// Move the element at `from` so it ends up at `to`.
pub fn move_to<T: Clone>(list: &[T], from: usize, to: usize) -> Vec<T> {
    let mut items = list.to_vec();
    if from >= items.len() || to >= items.len() || from == to {
        return items;
    }
    let item = items.remove(from);
    items.insert(to, item);
    items
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Swap the element at `index` with its neighbour in `direction`.
pub fn move_step<T: Clone>(list: &[T], index: usize, direction: Direction) -> Vec<T> {
    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => index.checked_add(1),
    };

    match target {
        Some(target) if index < list.len() && target < list.len() => {
            let mut items = list.to_vec();
            items.swap(index, target);
            items
        }
        _ => list.to_vec(),
    }
}

/// Replace the element at `index` with `f(element)`.
pub fn update_at<T: Clone>(list: &[T], index: usize, f: impl FnOnce(&T) -> T) -> Vec<T> {
    let mut items = list.to_vec();
    if let Some(slot) = items.get_mut(index) {
        *slot = f(slot);
    }
    items
}

/// A single edit, as submitted by the admin editors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ListEdit<T> {
    Append { item: T },
    Remove { index: usize },
    Move { from: usize, to: usize },
    Step { index: usize, direction: Direction },
    Replace { index: usize, item: T },
}

impl<T: Clone> ListEdit<T> {
    /// Apply the edit. Appends beyond `max_items` are ignored.
    pub fn apply(self, list: &[T], max_items: Option<usize>) -> Vec<T> {
        match self {
            ListEdit::Append { item } => {
                if max_items.is_some_and(|max| list.len() >= max) {
                    list.to_vec()
                } else {
                    append(list, item)
                }
            }
            ListEdit::Remove { index } => remove_at(list, index),
            ListEdit::Move { from, to } => move_to(list, from, to),
            ListEdit::Step { index, direction } => move_step(list, index, direction),
            ListEdit::Replace { index, item } => update_at(list, index, |_| item),
        }
    }
}
