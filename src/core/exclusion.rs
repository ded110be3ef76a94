use crate::core::navigation::{cursor_index, next_cursor_after_removal};
use crate::domain::tree::{ExcludedNode, NodeId, Tree};
use crate::domain::view_state::ViewState;
use log::{debug, info};

/// Removes the cursor node from `tree` and returns the repaired view state
/// together with what was removed. Returns `None`, leaving both untouched,
/// when the cursor is the root or no longer exists.
pub fn exclude_at_cursor(tree: &mut Tree, state: &ViewState) -> Option<(ViewState, ExcludedNode)> {
    let cursor_path = state.cursor_path().to_string();

    let flat_before = tree.flatten(state);
    let removed_index = cursor_index(&flat_before, &cursor_path).unwrap_or(0);
    // Ids stay valid once detached, so the rows can be re-read afterwards.
    let before_ids: Vec<NodeId> = flat_before.iter().map(|node| node.id).collect();

    let excluded = tree.exclude_node(&cursor_path)?;
    info!("Excluded: {}", excluded.relative_path);
    debug!("Detached node {} ({})", excluded.id, excluded.path);

    let before: Vec<_> = before_ids.into_iter().map(|id| tree.node(id)).collect();
    let after = tree.flatten(state);
    let next_cursor = next_cursor_after_removal(&before, removed_index, &after);
    debug_assert!(cursor_index(&after, &excluded.path).is_none());

    let repaired = state.prune(&excluded.path).set_cursor(&next_cursor);
    debug!(
        "State after exclusion: {} open, {} selected",
        repaired.open_paths().count(),
        repaired.selected_count()
    );
    Some((repaired, excluded))
}
