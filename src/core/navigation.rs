use crate::domain::tree::{Node, Tree};
use crate::domain::view_state::ViewState;
use log::debug;

/// Moves the cursor to the previous visible row. No-op on the first row or
/// when the cursor path is stale.
pub fn navigate_up(tree: &Tree, state: &ViewState) -> ViewState {
    step(tree, state, |index, _| index.checked_sub(1))
}

/// Moves the cursor to the next visible row. No-op on the last row or when
/// the cursor path is stale.
pub fn navigate_down(tree: &Tree, state: &ViewState) -> ViewState {
    step(tree, state, |index, len| {
        if index + 1 < len { Some(index + 1) } else { None }
    })
}

fn step(
    tree: &Tree,
    state: &ViewState,
    next_index: impl Fn(usize, usize) -> Option<usize>,
) -> ViewState {
    if tree.find_node_by_path(state.cursor_path()).is_none() {
        return state.clone();
    }

    let flat = tree.flatten(state);
    let Some(current) = cursor_index(&flat, state.cursor_path()) else {
        return state.clone();
    };

    match next_index(current, flat.len()) {
        Some(next) => state.set_cursor(&flat[next].path),
        None => state.clone(),
    }
}

/// Expands a collapsed directory, or enters an expanded one by moving to its
/// first child.
pub fn navigate_in(tree: &Tree, state: &ViewState) -> ViewState {
    let Some(cursor) = tree.find_node_by_path(state.cursor_path()) else {
        return state.clone();
    };
    if !cursor.is_dir {
        return state.clone();
    }

    if !state.is_open(&cursor.path) {
        return state.set_open(&cursor.path, true);
    }
    match tree.children(cursor).next() {
        Some(first) => state.set_cursor(&first.path),
        None => state.clone(),
    }
}

/// Collapses an expanded directory, or moves the cursor to the parent.
pub fn navigate_out(tree: &Tree, state: &ViewState) -> ViewState {
    let Some(cursor) = tree.find_node_by_path(state.cursor_path()) else {
        return state.clone();
    };

    if cursor.is_dir && state.is_open(&cursor.path) {
        return state.set_open(&cursor.path, false);
    }
    match tree.parent(cursor) {
        Some(parent) => state.set_cursor(&parent.path),
        None => state.clone(),
    }
}

pub fn cursor_index(flat: &[&Node], cursor_path: &str) -> Option<usize> {
    flat.iter().position(|node| node.path == cursor_path)
}

/// Picks the row the cursor lands on after the row at `removed_index` of
/// `flat_before` disappeared. Prefers the row just above the gap. Returns an
/// empty string when nothing is left.
pub fn next_cursor_after_removal(
    flat_before: &[&Node],
    removed_index: usize,
    flat_after: &[&Node],
) -> String {
    if let Some(removed) = flat_before.get(removed_index) {
        debug!(
            "Relocating cursor after removing row {} ({})",
            removed_index, removed.path
        );
    }

    let Some(last) = flat_after.last() else {
        return String::new();
    };

    if removed_index >= flat_after.len() {
        last.path.clone()
    } else if removed_index == 0 {
        flat_after[0].path.clone()
    } else {
        flat_after[removed_index - 1].path.clone()
    }
}
