use std::collections::HashSet;

/// UI overlay on a [`Tree`](crate::domain::tree::Tree): cursor position plus
/// the sets of expanded and selected paths.
///
/// Every mutator returns a new value and leaves `self` untouched. Each call
/// copies both sets, so a mutation costs O(open + selected); the sets stay
/// small enough in an interactive session for that to be acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    cursor_path: String,
    open: HashSet<String>,
    selected: HashSet<String>,
}

impl ViewState {
    pub fn new(root_path: &str) -> Self {
        Self {
            cursor_path: root_path.to_string(),
            open: HashSet::new(),
            selected: HashSet::new(),
        }
    }

    pub fn cursor_path(&self) -> &str {
        &self.cursor_path
    }

    pub fn is_open(&self, path: &str) -> bool {
        self.open.contains(path)
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selected.contains(path)
    }

    pub fn open_paths(&self) -> impl Iterator<Item = &str> {
        self.open.iter().map(String::as_str)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn set_open(&self, path: &str, open: bool) -> Self {
        let mut next = self.clone();
        toggle_member(&mut next.open, path, open);
        next
    }

    #[must_use]
    pub fn set_selected(&self, path: &str, selected: bool) -> Self {
        self.set_selected_many(std::iter::once(path), selected)
    }

    /// Applies the same selection flag to several paths with a single copy.
    #[must_use]
    pub fn set_selected_many<'p>(
        &self,
        paths: impl IntoIterator<Item = &'p str>,
        selected: bool,
    ) -> Self {
        let mut next = self.clone();
        for path in paths {
            toggle_member(&mut next.selected, path, selected);
        }
        next
    }

    #[must_use]
    pub fn set_cursor(&self, path: &str) -> Self {
        let mut next = self.clone();
        next.cursor_path = path.to_string();
        next
    }

    /// Drops open and selected entries for `prefix` and everything beneath it.
    /// Matching stops at path-segment boundaries: pruning `/root/dir1` keeps
    /// `/root/dir10`.
    #[must_use]
    pub fn prune(&self, prefix: &str) -> Self {
        let mut next = self.clone();
        next.open.retain(|path| !is_within(path, prefix));
        next.selected.retain(|path| !is_within(path, prefix));
        next
    }
}

fn toggle_member(set: &mut HashSet<String>, path: &str, member: bool) {
    if member {
        set.insert(path.to_string());
    } else {
        set.remove(path);
    }
}

fn is_within(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => prefix.ends_with(['/', '\\']) || rest.starts_with(['/', '\\']),
        None => false,
    }
}
