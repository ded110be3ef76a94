use crate::domain::view_state::ViewState;
use crate::infra::file_system::FileSystem;
use anyhow::{Context, bail};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Component, Path};

/// Stable index of a node inside its tree's arena.
pub type NodeId = usize;

/// Predicate deciding whether a path is kept while building. Receives the
/// absolute path and whether it is a directory.
pub type KeepFn<'a> = dyn Fn(&str, bool) -> bool + 'a;

/// One filesystem entry. `path` is the node's identity.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub path: String,
    pub name: String,
    pub is_dir: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A node detached from the tree by [`Tree::exclude_node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedNode {
    pub id: NodeId,
    pub path: String,
    /// Root-relative, `/`-separated. Used as the ignore-list key.
    pub relative_path: String,
}

/// Arena-backed file tree. Nodes own their children by index and keep a
/// non-owning parent index; excluded subtrees stay in the arena, unreachable.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    index: HashMap<String, NodeId>,
}

impl Tree {
    pub fn root(&self) -> &Node {
        &self.nodes[self.root]
    }

    /// Reads a node by id, including nodes that have been excluded.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn parent(&self, node: &Node) -> Option<&Node> {
        node.parent.map(|id| &self.nodes[id])
    }

    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> {
        node.children.iter().map(move |&id| &self.nodes[id])
    }

    pub fn find_node_by_path(&self, path: &str) -> Option<&Node> {
        self.index.get(path).map(|&id| &self.nodes[id])
    }

    /// Every reachable node in depth-first pre-order, ignoring view state.
    pub fn all_nodes(&self) -> Vec<&Node> {
        let mut result = Vec::with_capacity(self.index.len());
        self.collect(self.root, &mut |_: &Node| true, &mut result);
        result
    }

    /// Depth-first pre-order walk that only descends into open directories.
    pub fn flatten(&self, state: &ViewState) -> Vec<&Node> {
        let mut result = Vec::new();
        self.collect(
            self.root,
            &mut |node: &Node| state.is_open(&node.path),
            &mut result,
        );
        result
    }

    fn collect<'a>(
        &'a self,
        id: NodeId,
        descend: &mut dyn FnMut(&Node) -> bool,
        result: &mut Vec<&'a Node>,
    ) {
        let node = &self.nodes[id];
        result.push(node);
        if node.is_dir && descend(node) {
            for &child in &node.children {
                self.collect(child, descend, result);
            }
        }
    }

    /// Root-relative, `/`-separated form of `path`. The root itself is `""`.
    pub fn relative_path(&self, path: &str) -> Option<String> {
        relative_to(Path::new(&self.root().path), path)
    }

    /// Detaches the node at `path` from its parent. Returns `None` for the
    /// root or a path not in the tree.
    pub fn exclude_node(&mut self, path: &str) -> Option<ExcludedNode> {
        let id = *self.index.get(path)?;
        let parent_id = self.nodes[id].parent?;
        let relative_path = self.relative_path(path)?;

        self.nodes[parent_id].children.retain(|&child| child != id);
        self.nodes[id].parent = None;

        let mut detached = Vec::new();
        self.collect(id, &mut |_: &Node| true, &mut detached);
        let detached: Vec<String> = detached.into_iter().map(|n| n.path.clone()).collect();
        for removed in &detached {
            self.index.remove(removed);
        }

        debug!(
            "Excluded {} ({} nodes detached)",
            relative_path,
            detached.len()
        );
        Some(ExcludedNode {
            id,
            path: path.to_string(),
            relative_path,
        })
    }
}

/// `/`-separated form of `path` relative to `root`, or `None` when `path`
/// is not beneath it.
pub fn relative_to(root: &Path, path: &str) -> Option<String> {
    let relative = Path::new(path).strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    Some(segments.join("/"))
}

/// Builds a tree by scanning `root_path` through `fs`. Only a failure to stat
/// the root is fatal; unreadable directories become empty and unstattable
/// entries are skipped.
pub fn build_tree(
    fs: &dyn FileSystem,
    root_path: &str,
    keep: Option<&KeepFn<'_>>,
) -> anyhow::Result<Tree> {
    info!("Building tree for: {}", root_path);

    let info = fs
        .stat(Path::new(root_path))
        .with_context(|| format!("cannot read root {}", root_path))?;
    if !info.is_dir {
        bail!("root path is not a directory: {}", root_path);
    }

    let mut tree = Tree {
        nodes: Vec::new(),
        root: 0,
        index: HashMap::new(),
    };
    let root = push_node(&mut tree, root_path.to_string(), true, None);
    build_children(&mut tree, fs, root, keep);

    info!("Built tree with {} nodes", tree.nodes.len());
    Ok(tree)
}

fn push_node(tree: &mut Tree, path: String, is_dir: bool, parent: Option<NodeId>) -> NodeId {
    let id = tree.nodes.len();
    let name = Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.clone());

    tree.index.insert(path.clone(), id);
    tree.nodes.push(Node {
        id,
        path,
        name,
        is_dir,
        parent,
        children: Vec::new(),
    });
    id
}

fn build_children(tree: &mut Tree, fs: &dyn FileSystem, id: NodeId, keep: Option<&KeepFn<'_>>) {
    let dir_path = tree.nodes[id].path.clone();

    let entries = match fs.list_entries(Path::new(&dir_path)) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list {}: {}", dir_path, e);
            return;
        }
    };

    let mut children = Vec::with_capacity(entries.len());
    for entry in entries {
        let child_path = Path::new(&dir_path)
            .join(&entry.name)
            .to_string_lossy()
            .to_string();

        if let Some(keep) = keep {
            if !keep(&child_path, entry.is_dir) {
                debug!("Skipping filtered path: {}", child_path);
                continue;
            }
        }

        let info = match fs.stat(Path::new(&child_path)) {
            Ok(info) => info,
            Err(e) => {
                debug!("Skipping unstattable entry {}: {}", child_path, e);
                continue;
            }
        };

        let child = push_node(tree, child_path, info.is_dir, Some(id));
        if info.is_dir {
            build_children(tree, fs, child, keep);
        }
        children.push(child);
    }

    children.sort_by(|&a, &b| {
        let (a, b) = (&tree.nodes[a], &tree.nodes[b]);
        b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name))
    });
    tree.nodes[id].children = children;
}
