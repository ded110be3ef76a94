use crate::core::selection::get_selected_paths;
use crate::core::token_counter::{NaiveTokenizer, Tokenizer};
use crate::core::tree_view::build_items;
use crate::domain::models::{ContextOutput, FileContext};
use crate::domain::tree::{Node, Tree};
use crate::domain::view_state::ViewState;
use crate::infra::file_system::FileSystem;
use log::{debug, info, warn};
use std::path::Path;

/// Reads the selected files and assembles everything the output needs.
/// A file that cannot be read keeps its slot with the error in place of its
/// content.
pub fn build_context_output(
    fs: &dyn FileSystem,
    tree: &Tree,
    state: &ViewState,
    prompt: &str,
) -> ContextOutput {
    let paths = get_selected_paths(tree, state);
    debug!("Building context output from {} files", paths.len());

    let tokenizer = NaiveTokenizer;
    let mut token_count = tokenizer.count_tokens(prompt);
    let mut files = Vec::with_capacity(paths.len());

    for path in &paths {
        let content = match fs.read_all_bytes(Path::new(path)) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).to_string();
                token_count += tokenizer.count_tokens(&text);
                Ok(text)
            }
            Err(e) => {
                warn!("Error reading file {}: {}", path, e);
                Err(e.to_string())
            }
        };

        files.push(FileContext {
            relative_path: tree.relative_path(path).unwrap_or_else(|| path.clone()),
            extension: Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_string(),
            content,
        });
    }

    let file_map = if files.is_empty() {
        String::new()
    } else {
        render_file_map(tree, state)
    };

    ContextOutput {
        prompt: prompt.trim().to_string(),
        file_map,
        files,
        token_count,
    }
}

/// The whole tree as box-drawing text, selected files marked with ` *`.
pub fn render_file_map(tree: &Tree, state: &ViewState) -> String {
    let items = build_items(tree, tree.root(), &|_: &Node| true);

    let mut map = String::new();
    for row in items.rows() {
        let node = *row.label;
        map.push_str(&row.guide);
        map.push_str(&node.name);
        if !node.is_dir && state.is_selected(&node.path) {
            map.push_str(" *");
        }
        map.push('\n');
    }
    map
}

pub fn format_output(output: &ContextOutput) -> String {
    debug!(
        "Formatting context output with {} tokens",
        output.token_count
    );
    let mut result = String::new();

    if !output.prompt.is_empty() {
        result.push_str("# Prompt\n\n");
        result.push_str(&output.prompt);
        result.push_str("\n\n");
    }

    if output.files.is_empty() {
        info!("No files selected");
        result.push_str("No files selected\n");
        return result;
    }

    result.push_str("# Directory Structure\n\n");
    result.push_str(&output.file_map);
    result.push('\n');

    result.push_str("# Selected Files\n\n");
    for file in &output.files {
        result.push_str(&format!("## {}\n\n```{}\n", file.relative_path, file.extension));
        match &file.content {
            Ok(text) => {
                result.push_str(text);
                if !text.ends_with('\n') {
                    result.push('\n');
                }
            }
            Err(e) => result.push_str(&format!("Error reading file: {}\n", e)),
        }
        result.push_str("```\n\n");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::build_tree;
    use crate::infra::mem_fs::MemFileSystem;

    fn sample_fs() -> MemFileSystem {
        let fs = MemFileSystem::new();
        fs.add_file("/root/file1.txt", "Content of file 1");
        fs.add_file("/root/subdir/file2.rs", "fn main() {}\n");
        fs.add_file("/root/file3.txt", "Content of file 3");
        fs
    }

    fn generate(fs: &MemFileSystem, state: ViewState, prompt: &str) -> String {
        let tree = build_tree(fs, "/root", None).unwrap();
        format_output(&build_context_output(fs, &tree, &state, prompt))
    }

    #[test]
    fn test_output_layout() {
        let fs = sample_fs();
        let state = ViewState::new("/root")
            .set_selected("/root/file1.txt", true)
            .set_selected("/root/subdir/file2.rs", true);

        let output = generate(&fs, state, "");

        assert_eq!(
            output,
            "# Directory Structure\n\n\
             root\n\
             ├── subdir\n\
             │   └── file2.rs *\n\
             ├── file1.txt *\n\
             └── file3.txt\n\
             \n\
             # Selected Files\n\n\
             ## subdir/file2.rs\n\n\
             ```rs\n\
             fn main() {}\n\
             ```\n\n\
             ## file1.txt\n\n\
             ```txt\n\
             Content of file 1\n\
             ```\n\n"
        );
        assert!(!output.contains("Content of file 3"));
    }

    #[test]
    fn test_no_selection() {
        let fs = sample_fs();
        let output = generate(&fs, ViewState::new("/root"), "");
        assert_eq!(output, "No files selected\n");
    }

    #[test]
    fn test_prompt_comes_first() {
        let fs = sample_fs();
        let state = ViewState::new("/root").set_selected("/root/file1.txt", true);

        let output = generate(&fs, state, "Refactor this code");

        assert!(output.starts_with("# Prompt\n\nRefactor this code\n\n# Directory Structure"));
    }

    #[test]
    fn test_prompt_without_selection() {
        let fs = sample_fs();
        let output = generate(&fs, ViewState::new("/root"), "Explain");
        assert_eq!(output, "# Prompt\n\nExplain\n\nNo files selected\n");
    }

    #[test]
    fn test_unreadable_file_gets_inline_error() {
        let mut fs = sample_fs();
        fs.deny_reading("/root/file1.txt");
        let state = ViewState::new("/root")
            .set_selected("/root/file1.txt", true)
            .set_selected("/root/file3.txt", true);

        let output = generate(&fs, state, "");

        assert!(output.contains("## file1.txt\n\n```txt\nError reading file: "));
        assert!(output.contains("## file3.txt\n\n```txt\nContent of file 3\n```\n"));
    }

    #[test]
    fn test_vanished_file_gets_inline_error() {
        let fs = sample_fs();
        let tree = build_tree(&fs, "/root", None).unwrap();
        let state = ViewState::new("/root").set_selected("/root/file3.txt", true);
        fs.remove("/root/file3.txt");

        let output = build_context_output(&fs, &tree, &state, "");
        assert_eq!(output.files.len(), 1);
        assert!(output.files[0].content.is_err());
    }

    #[test]
    fn test_token_count_covers_prompt_and_files() {
        let fs = sample_fs();
        let tree = build_tree(&fs, "/root", None).unwrap();
        let state = ViewState::new("/root").set_selected("/root/file1.txt", true);

        let output = build_context_output(&fs, &tree, &state, "abcd");
        // "abcd" is 1 token, "Content of file 1" is 17 chars = 5 tokens.
        assert_eq!(output.token_count, 6);
    }
}
