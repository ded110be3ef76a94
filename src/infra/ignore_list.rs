use crate::domain::tree::relative_to;
use crate::infra::file_system::FileSystem;
use anyhow::Context;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const IGNORE_FILE_NAME: &str = ".pickyignore";

fn ignore_file_path(root: &str) -> PathBuf {
    Path::new(root).join(IGNORE_FILE_NAME)
}

/// Loads the persisted exclusions. A missing or unreadable ignore file
/// yields an empty set.
pub fn load(fs: &dyn FileSystem, root: &str) -> BTreeSet<String> {
    let path = ignore_file_path(root);

    match fs.stat(&path) {
        Ok(info) if !info.is_dir => {}
        _ => {
            debug!("No ignore file at: {}", path.display());
            return BTreeSet::new();
        }
    }

    match fs.read_all_bytes(&path) {
        Ok(bytes) => {
            let ignores = parse_lines(&String::from_utf8_lossy(&bytes));
            info!("Loaded {} ignored paths from {}", ignores.len(), path.display());
            ignores
        }
        Err(e) => {
            debug!("Cannot read {}: {}", path.display(), e);
            BTreeSet::new()
        }
    }
}

/// Writes one slash-normalized path per line, sorted. Nothing is written for
/// an empty set.
pub fn save(fs: &dyn FileSystem, root: &str, ignores: &BTreeSet<String>) -> anyhow::Result<()> {
    if ignores.is_empty() {
        return Ok(());
    }

    let normalized: BTreeSet<String> = ignores.iter().map(|p| normalize(p)).collect();
    let mut content = normalized.into_iter().collect::<Vec<_>>().join("\n");
    content.push('\n');

    let path = ignore_file_path(root);
    fs.write_all_bytes(&path, content.as_bytes())
        .with_context(|| format!("cannot write {}", path.display()))?;
    info!("Saved {} ignored paths to {}", ignores.len(), path.display());
    Ok(())
}

fn parse_lines(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(normalize)
        .collect()
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Decides which paths make it into the tree: persisted exclusions, excluded
/// entry names and, optionally, the root `.gitignore`.
#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    ignored: BTreeSet<String>,
    exclude_names: Vec<String>,
    gitignore: Option<Gitignore>,
}

impl PathFilter {
    pub fn new(root: &str, ignored: BTreeSet<String>, exclude_names: Vec<String>) -> Self {
        Self {
            root: PathBuf::from(root),
            ignored,
            exclude_names,
            gitignore: None,
        }
    }

    /// Adds the patterns of `<root>/.gitignore`, if there is one.
    pub fn with_gitignore(mut self, fs: &dyn FileSystem) -> Self {
        let path = self.root.join(".gitignore");
        let bytes = match fs.read_all_bytes(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("No .gitignore file at {}: {}", path.display(), e);
                return self;
            }
        };

        let mut builder = GitignoreBuilder::new(&self.root);
        for line in String::from_utf8_lossy(&bytes).lines() {
            if let Err(e) = builder.add_line(Some(path.clone()), line) {
                warn!("Skipping .gitignore pattern {:?}: {}", line, e);
            }
        }

        match builder.build() {
            Ok(gitignore) => {
                info!("Loaded {} patterns from .gitignore", gitignore.num_ignores());
                self.gitignore = Some(gitignore);
            }
            Err(e) => warn!("Cannot use {}: {}", path.display(), e),
        }
        self
    }

    pub fn keep(&self, path: &str, is_dir: bool) -> bool {
        let Some(relative) = relative_to(&self.root, path) else {
            return true;
        };

        if relative == IGNORE_FILE_NAME || self.ignored.contains(&relative) {
            return false;
        }

        let name = relative.rsplit('/').next().unwrap_or(&relative);
        if self.exclude_names.iter().any(|excluded| excluded == name) {
            debug!("Path {} matches excluded name", relative);
            return false;
        }

        !self.ignored_by_gitignore(&relative, is_dir)
    }

    fn ignored_by_gitignore(&self, relative: &str, is_dir: bool) -> bool {
        self.gitignore
            .as_ref()
            .is_some_and(|gitignore| gitignore.matched(relative, is_dir).is_ignore())
    }
}
