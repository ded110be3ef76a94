use crate::domain::tree::{Node, Tree};
use crate::domain::view_state::ViewState;

/// Flips the cursor node's selection. On a directory the new value is applied
/// to the whole subtree, directories included.
pub fn toggle_selection(tree: &Tree, state: &ViewState) -> ViewState {
    let Some(cursor) = tree.find_node_by_path(state.cursor_path()) else {
        return state.clone();
    };

    let selected = !state.is_selected(&cursor.path);
    if !cursor.is_dir {
        return state.set_selected(&cursor.path, selected);
    }

    let mut targets = vec![cursor.path.as_str()];
    collect_descendants(tree, cursor, &mut targets);
    state.set_selected_many(targets, selected)
}

fn collect_descendants<'a>(tree: &'a Tree, node: &'a Node, out: &mut Vec<&'a str>) {
    for child in tree.children(node) {
        out.push(&child.path);
        if child.is_dir {
            collect_descendants(tree, child, out);
        }
    }
}

/// Selected file paths in depth-first order over the whole tree. Directory
/// flags are never reported.
pub fn get_selected_paths(tree: &Tree, state: &ViewState) -> Vec<String> {
    tree.all_nodes()
        .into_iter()
        .filter(|node| !node.is_dir && state.is_selected(&node.path))
        .map(|node| node.path.clone())
        .collect()
}

/// True when a directory has descendant files and every one is selected.
pub fn has_full_selection(tree: &Tree, node: &Node, state: &ViewState) -> bool {
    if !node.is_dir {
        return false;
    }
    let (selected, total) = count_selected_files(tree, node, state);
    selected > 0 && selected == total
}

/// True when a directory has some, but not all, descendant files selected.
pub fn has_partial_selection(tree: &Tree, node: &Node, state: &ViewState) -> bool {
    if !node.is_dir {
        return false;
    }
    let (selected, total) = count_selected_files(tree, node, state);
    selected > 0 && selected < total
}

/// Counts (selected, total) over every descendant file. Intermediate
/// directory flags are ignored.
pub fn count_selected_files(tree: &Tree, node: &Node, state: &ViewState) -> (usize, usize) {
    if !node.is_dir {
        return (usize::from(state.is_selected(&node.path)), 1);
    }

    tree.children(node)
        .map(|child| count_selected_files(tree, child, state))
        .fold((0, 0), |(s, t), (cs, ct)| (s + cs, t + ct))
}
