use crate::domain::tree::{Node, Tree};
use crate::infra::file_system::FileSystem;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

/// Estimates how many model tokens a piece of text costs.
pub trait Tokenizer {
    fn count_tokens(&self, text: &str) -> usize;
}

/// Roughly four characters per token, rounded up.
pub struct NaiveTokenizer;

impl Tokenizer for NaiveTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

pub struct TokenCounter<'a, T: Tokenizer> {
    fs: &'a dyn FileSystem,
    tokenizer: T,
    cache: HashMap<String, usize>,
}

impl<'a, T: Tokenizer> TokenCounter<'a, T> {
    pub fn new(fs: &'a dyn FileSystem, tokenizer: T) -> Self {
        Self {
            fs,
            tokenizer,
            cache: HashMap::new(),
        }
    }

    /// Token count for every file node in the tree, keyed by path.
    pub fn build_tree_token_map(&mut self, tree: &Tree) -> HashMap<String, usize> {
        let tokens: HashMap<String, usize> = tree
            .all_nodes()
            .into_iter()
            .filter(|node| !node.is_dir)
            .map(|node| (node.path.clone(), self.tokens_for_file(&node.path)))
            .collect();

        debug!("Counted tokens for {} files", tokens.len());
        tokens
    }

    /// Cached per path; unreadable files count as zero.
    pub fn tokens_for_file(&mut self, path: &str) -> usize {
        if let Some(&cached) = self.cache.get(path) {
            return cached;
        }

        let count = match self.fs.read_all_bytes(Path::new(path)) {
            Ok(bytes) => self
                .tokenizer
                .count_tokens(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                warn!("Cannot read {} for token counting: {}", path, e);
                0
            }
        };
        self.cache.insert(path.to_string(), count);
        count
    }
}

/// Tokens of a file, or the sum over a directory's files still in the tree.
pub fn node_tokens(tree: &Tree, node: &Node, tokens: &HashMap<String, usize>) -> usize {
    if !node.is_dir {
        return tokens.get(&node.path).copied().unwrap_or(0);
    }

    let mut sum = 0;
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.is_dir {
            stack.extend(tree.children(current));
        } else {
            sum += tokens.get(&current.path).copied().unwrap_or(0);
        }
    }
    sum
}

pub fn sum_tokens<'p>(
    paths: impl IntoIterator<Item = &'p String>,
    tokens: &HashMap<String, usize>,
) -> usize {
    paths
        .into_iter()
        .map(|path| tokens.get(path).copied().unwrap_or(0))
        .sum()
}

pub fn format_token_count(count: usize) -> String {
    if count < 1_000 {
        count.to_string()
    } else if count < 1_000_000 {
        format!("{:.1}k", count as f64 / 1_000.0)
    } else {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::build_tree;
    use crate::infra::mem_fs::MemFileSystem;

    #[test]
    fn test_naive_tokenizer() {
        let tokenizer = NaiveTokenizer;
        assert_eq!(tokenizer.count_tokens(""), 0);
        assert_eq!(tokenizer.count_tokens("a"), 1);
        assert_eq!(tokenizer.count_tokens("test"), 1);
        assert_eq!(tokenizer.count_tokens("hello"), 2);
        assert_eq!(tokenizer.count_tokens("this is a test!"), 4);
        assert_eq!(tokenizer.count_tokens("你好世界"), 1);
        assert_eq!(tokenizer.count_tokens("hello世界"), 2);
    }

    fn sample() -> MemFileSystem {
        let fs = MemFileSystem::new();
        fs.add_file("/root/file1.txt", "hello world");
        fs.add_file("/root/file2.txt", "test");
        fs.add_file("/root/dir/file3.txt", "1234567890");
        fs
    }

    #[test]
    fn test_build_tree_token_map() {
        let fs = sample();
        let tree = build_tree(&fs, "/root", None).unwrap();
        let tokens = TokenCounter::new(&fs, NaiveTokenizer).build_tree_token_map(&tree);

        assert_eq!(tokens.get("/root/file1.txt"), Some(&3));
        assert_eq!(tokens.get("/root/file2.txt"), Some(&1));
        assert_eq!(tokens.get("/root/dir/file3.txt"), Some(&3));
        assert!(!tokens.contains_key("/root"));
        assert!(!tokens.contains_key("/root/dir"));
    }

    #[test]
    fn test_token_counts_are_cached() {
        let fs = sample();
        let mut counter = TokenCounter::new(&fs, NaiveTokenizer);

        assert_eq!(counter.tokens_for_file("/root/file2.txt"), 1);
        assert_eq!(counter.tokens_for_file("/root/file2.txt"), 1);
        assert_eq!(fs.read_count("/root/file2.txt"), 1);
    }

    #[test]
    fn test_unreadable_file_counts_as_zero() {
        let mut fs = sample();
        fs.deny_reading("/root/file1.txt");
        let tree = build_tree(&fs, "/root", None).unwrap();
        let tokens = TokenCounter::new(&fs, NaiveTokenizer).build_tree_token_map(&tree);

        assert_eq!(tokens.get("/root/file1.txt"), Some(&0));
        assert_eq!(tokens.get("/root/file2.txt"), Some(&1));
    }

    #[test]
    fn test_node_tokens_sums_remaining_files() {
        let fs = sample();
        let mut tree = build_tree(&fs, "/root", None).unwrap();
        let tokens = TokenCounter::new(&fs, NaiveTokenizer).build_tree_token_map(&tree);

        assert_eq!(node_tokens(&tree, tree.root(), &tokens), 7);
        tree.exclude_node("/root/dir").unwrap();
        assert_eq!(node_tokens(&tree, tree.root(), &tokens), 4);
    }

    #[test]
    fn test_format_token_count() {
        assert_eq!(format_token_count(0), "0");
        assert_eq!(format_token_count(999), "999");
        assert_eq!(format_token_count(1_000), "1.0k");
        assert_eq!(format_token_count(12_345), "12.3k");
        assert_eq!(format_token_count(2_500_000), "2.5M");
    }
}
