use crate::core::settings::Settings;
use std::path::PathBuf;

/// Where the generated context goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
    Clipboard,
}

#[derive(Debug, Clone)]
pub struct PickConfig {
    pub root_path: String,
    pub output: OutputTarget,
    pub exclude_names: Vec<String>,
    pub respect_gitignore: bool,
    pub initial_prompt: Option<String>,
    pub settings: Settings,
}

/// One selected file as it appears in the generated context.
#[derive(Debug, Clone)]
pub struct FileContext {
    pub relative_path: String,
    pub extension: String,
    /// The file text, or the read error when the file could not be loaded.
    pub content: Result<String, String>,
}

#[derive(Debug)]
pub struct ContextOutput {
    pub prompt: String,
    pub file_map: String,
    pub files: Vec<FileContext>,
    pub token_count: usize,
}
