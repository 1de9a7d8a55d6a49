//! Recording adapter for the `FileSystem` port.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::json;

use crate::cassette::recorder::CassetteRecorder;
use crate::ports::filesystem::{EntryType, FileSystem, FsResult};

/// Records filesystem interactions while delegating to an inner implementation.
pub struct RecordingFileSystem {
    inner: Box<dyn FileSystem>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingFileSystem {
    /// Creates a new recording filesystem wrapping the given implementation.
    pub fn new(inner: Box<dyn FileSystem>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }

    fn record<T: Serialize>(&self, method: &str, input: &serde_json::Value, result: &FsResult<T>) {
        let mut guard = self.recorder.lock().unwrap_or_else(PoisonError::into_inner);
        guard.record_result(method, input, result);
    }
}

fn path_input(path: &Path) -> serde_json::Value {
    json!({ "path": path.display().to_string() })
}

impl FileSystem for RecordingFileSystem {
    fn entry_type(&self, path: &Path) -> FsResult<Option<EntryType>> {
        let result = self.inner.entry_type(path);
        self.record("entry_type", &path_input(path), &result);
        result
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<String>> {
        let result = self.inner.list_dir(path);
        self.record("list_dir", &path_input(path), &result);
        result
    }

    fn read_link(&self, path: &Path) -> FsResult<PathBuf> {
        let result = self.inner.read_link(path);
        self.record("read_link", &path_input(path), &result);
        result
    }

    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf> {
        let result = self.inner.canonicalize(path);
        self.record("canonicalize", &path_input(path), &result);
        result
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        let result = self.inner.create_dir_all(path);
        self.record("create_dir_all", &path_input(path), &result);
        result
    }

    fn symlink(&self, source: &Path, link: &Path) -> FsResult<()> {
        let result = self.inner.symlink(source, link);
        let input = json!({
            "source": source.display().to_string(),
            "link": link.display().to_string(),
        });
        self.record("symlink", &input, &result);
        result
    }

    fn remove_link(&self, path: &Path) -> FsResult<()> {
        let result = self.inner.remove_link(path);
        self.record("remove_link", &path_input(path), &result);
        result
    }
}
