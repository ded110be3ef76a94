use crate::domain::tree::{Node, Tree};

/// Hierarchical display item: a label with or without nested items.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeItem<L> {
    Leaf(L),
    Branch(L, Vec<TreeItem<L>>),
}

/// One rendered line: box-drawing guide followed by the item label.
#[derive(Debug, PartialEq)]
pub struct TreeRow<'a, L> {
    pub guide: String,
    pub label: &'a L,
}

impl<L> TreeItem<L> {
    pub fn label(&self) -> &L {
        match self {
            TreeItem::Leaf(label) | TreeItem::Branch(label, _) => label,
        }
    }

    /// Lines in pre-order; the top item has an empty guide.
    pub fn rows(&self) -> Vec<TreeRow<'_, L>> {
        let mut rows = vec![TreeRow {
            guide: String::new(),
            label: self.label(),
        }];
        if let TreeItem::Branch(_, children) = self {
            push_rows(children, "", &mut rows);
        }
        rows
    }
}

fn push_rows<'a, L>(items: &'a [TreeItem<L>], indent: &str, rows: &mut Vec<TreeRow<'a, L>>) {
    for (i, item) in items.iter().enumerate() {
        let last = i + 1 == items.len();
        let connector = if last { "└── " } else { "├── " };
        rows.push(TreeRow {
            guide: format!("{indent}{connector}"),
            label: item.label(),
        });

        if let TreeItem::Branch(_, children) = item {
            let continuation = if last { "    " } else { "│   " };
            push_rows(children, &format!("{indent}{continuation}"), rows);
        }
    }
}

/// Builds display items for `node`, descending into directories for which
/// `expand` holds.
pub fn build_items<'a>(
    tree: &'a Tree,
    node: &'a Node,
    expand: &dyn Fn(&Node) -> bool,
) -> TreeItem<&'a Node> {
    if node.is_dir && expand(node) {
        let children = tree
            .children(node)
            .map(|child| build_items(tree, child, expand))
            .collect();
        TreeItem::Branch(node, children)
    } else {
        TreeItem::Leaf(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::build_tree;
    use crate::domain::view_state::ViewState;
    use crate::infra::mem_fs::MemFileSystem;

    fn render(item: &TreeItem<&str>) -> Vec<String> {
        item.rows()
            .into_iter()
            .map(|row| format!("{}{}", row.guide, row.label))
            .collect()
    }

    #[test]
    fn test_rows_draw_guides() {
        let item = TreeItem::Branch(
            "root",
            vec![
                TreeItem::Branch(
                    "src",
                    vec![TreeItem::Leaf("lib.rs"), TreeItem::Leaf("main.rs")],
                ),
                TreeItem::Leaf("Cargo.toml"),
            ],
        );

        assert_eq!(
            render(&item),
            vec![
                "root",
                "├── src",
                "│   ├── lib.rs",
                "│   └── main.rs",
                "└── Cargo.toml",
            ]
        );
    }

    #[test]
    fn test_last_branch_uses_blank_continuation() {
        let item = TreeItem::Branch(
            "root",
            vec![TreeItem::Branch("dir", vec![TreeItem::Leaf("file")])],
        );
        assert_eq!(render(&item), vec!["root", "└── dir", "    └── file"]);
    }

    #[test]
    fn test_rows_follow_flatten_order() {
        let fs = MemFileSystem::new();
        fs.add_file("/root/b.txt", "b");
        fs.add_file("/root/a/inner.txt", "i");
        fs.add_file("/root/c/hidden.txt", "h");
        let tree = build_tree(&fs, "/root", None).unwrap();
        let state = ViewState::new("/root")
            .set_open("/root", true)
            .set_open("/root/a", true);

        let items = build_items(&tree, tree.root(), &|node: &Node| state.is_open(&node.path));
        let rows = items.rows();
        let row_paths: Vec<&str> = rows
            .iter()
            .map(|row| row.label.path.as_str())
            .collect();
        let flat = tree.flatten(&state);
        let flat_paths: Vec<&str> = flat
            .iter()
            .map(|node| node.path.as_str())
            .collect();

        assert_eq!(row_paths, flat_paths);
    }
}
