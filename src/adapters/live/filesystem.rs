//! Live filesystem adapter using `std::fs`.

use std::io;
use std::path::{Path, PathBuf};

use crate::ports::filesystem::{EntryType, FileSystem, FsResult};

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn entry_type(&self, path: &Path) -> FsResult<Option<EntryType>> {
        match std::fs::symlink_metadata(path) {
            Ok(meta) => {
                let file_type = meta.file_type();
                let kind = if file_type.is_symlink() {
                    EntryType::Symlink
                } else if file_type.is_dir() {
                    EntryType::Dir
                } else if file_type.is_file() {
                    EntryType::File
                } else {
                    EntryType::Other
                };
                Ok(Some(kind))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<String>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn read_link(&self, path: &Path) -> FsResult<PathBuf> {
        Ok(std::fs::read_link(path)?)
    }

    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf> {
        Ok(std::fs::canonicalize(path)?)
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        Ok(std::fs::create_dir_all(path)?)
    }

    fn symlink(&self, source: &Path, link: &Path) -> FsResult<()> {
        create_symlink(source, link)?;
        Ok(())
    }

    fn remove_link(&self, path: &Path) -> FsResult<()> {
        let meta = std::fs::symlink_metadata(path)?;
        if !meta.file_type().is_symlink() {
            return Err(format!("{} is not a symlink", path.display()).into());
        }
        remove_symlink(path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn create_symlink(source: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(windows)]
fn create_symlink(source: &Path, link: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, link)
    } else {
        std::os::windows::fs::symlink_file(source, link)
    }
}

#[cfg(unix)]
fn remove_symlink(path: &Path) -> io::Result<()> {
    std::fs::remove_file(path)
}

// Directory symlinks on Windows are removed like directories.
#[cfg(windows)]
fn remove_symlink(path: &Path) -> io::Result<()> {
    std::fs::remove_file(path).or_else(|_| std::fs::remove_dir(path))
}
