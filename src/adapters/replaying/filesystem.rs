//! Replaying adapter for the `FileSystem` port.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::filesystem::{EntryType, FileSystem, FsResult};

/// Replays recorded filesystem operations from a cassette.
///
/// Nothing touches the disk: every call returns what was recorded for the
/// next interaction of the same method.
pub struct ReplayingFileSystem {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingFileSystem {
    /// Creates a new replaying filesystem from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn replay<T: DeserializeOwned>(&self, method: &str, input: &serde_json::Value) -> FsResult<T> {
        let output = {
            let mut replayer = self.replayer.lock().unwrap_or_else(PoisonError::into_inner);
            replayer.next_interaction(method, input)?.output.clone()
        };
        extract_result(&output, method)
    }
}

/// Extracts a Result from a cassette output JSON value.
///
/// Expects `{"ok": <value>}` or `{"err": "message"}`.
fn extract_result<T: DeserializeOwned>(output: &serde_json::Value, method: &str) -> FsResult<T> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("fs::{method}: failed to deserialize: {e}").into())
}

fn path_input(path: &Path) -> serde_json::Value {
    json!({ "path": path.display().to_string() })
}

impl FileSystem for ReplayingFileSystem {
    fn entry_type(&self, path: &Path) -> FsResult<Option<EntryType>> {
        self.replay("entry_type", &path_input(path))
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<String>> {
        self.replay("list_dir", &path_input(path))
    }

    fn read_link(&self, path: &Path) -> FsResult<PathBuf> {
        self.replay("read_link", &path_input(path))
    }

    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf> {
        self.replay("canonicalize", &path_input(path))
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        self.replay("create_dir_all", &path_input(path))
    }

    fn symlink(&self, source: &Path, link: &Path) -> FsResult<()> {
        let input = json!({
            "source": source.display().to_string(),
            "link": link.display().to_string(),
        });
        self.replay("symlink", &input)
    }

    fn remove_link(&self, path: &Path) -> FsResult<()> {
        self.replay("remove_link", &path_input(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;

    fn make_fs(interactions: Vec<Interaction>) -> ReplayingFileSystem {
        let cassette = Cassette { name: "test".into(), recorded_at: Utc::now(), interactions };
        ReplayingFileSystem::new(CassetteReplayer::new(&cassette))
    }

    #[test]
    fn replays_entry_types() {
        let fs = make_fs(vec![
            Interaction {
                seq: 0,
                method: "entry_type".into(),
                input: json!({"path": "/t/a.md"}),
                output: json!({"ok": "symlink"}),
            },
            Interaction {
                seq: 1,
                method: "entry_type".into(),
                input: json!({"path": "/t/b.md"}),
                output: json!({"ok": null}),
            },
        ]);
        assert_eq!(fs.entry_type(Path::new("/t/a.md")).unwrap(), Some(EntryType::Symlink));
        assert_eq!(fs.entry_type(Path::new("/t/b.md")).unwrap(), None);
    }

    #[test]
    fn replays_recorded_failure() {
        let fs = make_fs(vec![Interaction {
            seq: 0,
            method: "symlink".into(),
            input: json!({"source": "/s/a.md", "link": "/t/a.md"}),
            output: json!({"err": "Permission denied (os error 13)"}),
        }]);
        let err = fs.symlink(Path::new("/s/a.md"), Path::new("/t/a.md")).unwrap_err();
        assert!(err.to_string().contains("Permission denied"));
    }

    #[test]
    fn exhausted_cassette_is_an_error_not_a_panic() {
        let fs = make_fs(vec![]);
        let err = fs.read_link(Path::new("/t/a.md")).unwrap_err();
        assert!(err.to_string().contains("Cassette exhausted"));
    }
}
