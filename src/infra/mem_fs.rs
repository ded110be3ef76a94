//! In-memory filesystem used by the unit tests.

use crate::infra::file_system::{EntryInfo, FileSystem, PathInfo};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum MemEntry {
    Dir,
    File(Vec<u8>),
}

#[derive(Default)]
pub struct MemFileSystem {
    entries: RefCell<BTreeMap<PathBuf, MemEntry>>,
    unlistable: BTreeSet<PathBuf>,
    unstattable: BTreeSet<PathBuf>,
    unreadable: BTreeSet<PathBuf>,
    reads: RefCell<HashMap<PathBuf, usize>>,
}

impl MemFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dir(&self, path: &str) {
        let path = PathBuf::from(path);
        self.ensure_parent_dirs(&path);
        self.entries.borrow_mut().insert(path, MemEntry::Dir);
    }

    pub fn add_file(&self, path: &str, content: &str) {
        let path = PathBuf::from(path);
        self.ensure_parent_dirs(&path);
        self.entries
            .borrow_mut()
            .insert(path, MemEntry::File(content.as_bytes().to_vec()));
    }

    pub fn remove(&self, path: &str) {
        self.entries.borrow_mut().remove(Path::new(path));
    }

    /// Makes `list_entries` fail for this directory.
    pub fn deny_listing(&mut self, path: &str) {
        self.unlistable.insert(PathBuf::from(path));
    }

    /// Makes `stat` fail for this path while it is still listed.
    pub fn deny_stat(&mut self, path: &str) {
        self.unstattable.insert(PathBuf::from(path));
    }

    /// Makes `read_all_bytes` fail for this file.
    pub fn deny_reading(&mut self, path: &str) {
        self.unreadable.insert(PathBuf::from(path));
    }

    pub fn content(&self, path: &str) -> Option<String> {
        match self.entries.borrow().get(Path::new(path)) {
            Some(MemEntry::File(data)) => Some(String::from_utf8_lossy(data).to_string()),
            _ => None,
        }
    }

    pub fn read_count(&self, path: &str) -> usize {
        self.reads
            .borrow()
            .get(Path::new(path))
            .copied()
            .unwrap_or(0)
    }

    fn ensure_parent_dirs(&self, path: &Path) {
        let mut entries = self.entries.borrow_mut();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MemEntry::Dir);
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: not found", path.display()),
    )
}

fn permission_denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("{}: permission denied", path.display()),
    )
}

impl FileSystem for MemFileSystem {
    fn stat(&self, path: &Path) -> io::Result<PathInfo> {
        if self.unstattable.contains(path) {
            return Err(permission_denied(path));
        }
        match self.entries.borrow().get(path) {
            Some(MemEntry::Dir) => Ok(PathInfo { is_dir: true }),
            Some(MemEntry::File(_)) => Ok(PathInfo { is_dir: false }),
            None => Err(not_found(path)),
        }
    }

    fn list_entries(&self, path: &Path) -> io::Result<Vec<EntryInfo>> {
        if self.unlistable.contains(path) {
            return Err(permission_denied(path));
        }

        let entries = self.entries.borrow();
        match entries.get(path) {
            Some(MemEntry::Dir) => {}
            Some(MemEntry::File(_)) => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{}: not a directory", path.display()),
                ));
            }
            None => return Err(not_found(path)),
        }

        // Reverse order so callers cannot rely on listing order.
        let mut listed: Vec<EntryInfo> = entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .filter_map(|(p, entry)| {
                p.file_name().map(|name| EntryInfo {
                    name: name.to_string_lossy().to_string(),
                    is_dir: matches!(entry, MemEntry::Dir),
                })
            })
            .collect();
        listed.reverse();
        Ok(listed)
    }

    fn read_all_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        *self
            .reads
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_insert(0) += 1;

        if self.unreadable.contains(path) {
            return Err(permission_denied(path));
        }

        match self.entries.borrow().get(path) {
            Some(MemEntry::File(data)) => Ok(data.clone()),
            Some(MemEntry::Dir) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{}: is a directory", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn write_all_bytes(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.ensure_parent_dirs(path);
        self.entries
            .borrow_mut()
            .insert(path.to_path_buf(), MemEntry::File(data.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parent_dirs() {
        let fs = MemFileSystem::new();
        fs.add_file("/root/dir/file.txt", "content");

        assert!(fs.stat(Path::new("/root")).unwrap().is_dir);
        assert!(fs.stat(Path::new("/root/dir")).unwrap().is_dir);
        assert!(!fs.stat(Path::new("/root/dir/file.txt")).unwrap().is_dir);
    }

    #[test]
    fn test_list_entries_returns_direct_children_only() {
        let fs = MemFileSystem::new();
        fs.add_file("/root/a.txt", "a");
        fs.add_file("/root/dir/b.txt", "b");

        let mut names: Vec<String> = fs
            .list_entries(Path::new("/root"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.txt", "dir"]);
    }
}
