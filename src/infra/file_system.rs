use log::debug;
use std::fs;
use std::io;
use std::path::Path;

/// Result of stat'ing a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathInfo {
    pub is_dir: bool,
}

/// One entry returned by listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub is_dir: bool,
}

/// The filesystem capability the tree builder, token counter and output
/// writers depend on. Callers must not assume `list_entries` is ordered.
pub trait FileSystem {
    fn stat(&self, path: &Path) -> io::Result<PathInfo>;
    fn list_entries(&self, path: &Path) -> io::Result<Vec<EntryInfo>>;
    fn read_all_bytes(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write_all_bytes(&self, path: &Path, data: &[u8]) -> io::Result<()>;
}

pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn stat(&self, path: &Path) -> io::Result<PathInfo> {
        let metadata = fs::metadata(path)?;
        Ok(PathInfo {
            is_dir: metadata.is_dir(),
        })
    }

    fn list_entries(&self, path: &Path) -> io::Result<Vec<EntryInfo>> {
        let mut entries = Vec::new();

        for entry in walkdir::WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
        {
            let entry = entry.map_err(io::Error::from)?;

            // Symlinks are never followed, so link cycles cannot recurse forever.
            if entry.file_type().is_symlink() {
                debug!("Skipping symlink: {}", entry.path().display());
                continue;
            }

            entries.push(EntryInfo {
                name: entry.file_name().to_string_lossy().to_string(),
                is_dir: entry.file_type().is_dir(),
            });
        }

        Ok(entries)
    }

    fn read_all_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        debug!("Reading file contents: {}", path.display());
        fs::read(path)
    }

    fn write_all_bytes(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        debug!("Writing {} bytes to {}", data.len(), path.display());
        fs::write(path, data)
    }
}
