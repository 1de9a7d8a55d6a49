//! Service context bundling the filesystem port.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::adapters::live::LiveFileSystem;
use crate::adapters::recording::RecordingFileSystem;
use crate::adapters::replaying::ReplayingFileSystem;
use crate::cassette::{Cassette, CassetteRecorder, CassetteReplayer};
use crate::error::LinkError;
use crate::ports::filesystem::FileSystem;

/// Bundles the port trait objects a run needs.
///
/// Constructors wire up different adapter implementations (live,
/// recording, replaying).
pub struct ServiceContext {
    /// Filesystem for link inspection and mutation.
    pub fs: Box<dyn FileSystem>,
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a live context backed by the real disk.
    #[must_use]
    pub fn live() -> Self {
        Self { fs: Box::new(LiveFileSystem), recorder: None }
    }

    /// Creates a live context that records every filesystem call.
    ///
    /// The cassette is written to `path` by [`ServiceContext::finish`].
    #[must_use]
    pub fn recording(path: &Path) -> Self {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, "promptlink-session")));
        Self {
            fs: Box::new(RecordingFileSystem::new(Box::new(LiveFileSystem), Arc::clone(&recorder))),
            recorder: Some(recorder),
        }
    }

    /// Creates a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, LinkError> {
        let cassette = Cassette::load(path).map_err(LinkError::Cassette)?;
        Ok(Self::replaying_cassette(&cassette))
    }

    /// Creates a replaying context from an in-memory cassette.
    #[must_use]
    pub fn replaying_cassette(cassette: &Cassette) -> Self {
        Self {
            fs: Box::new(ReplayingFileSystem::new(CassetteReplayer::new(cassette))),
            recorder: None,
        }
    }

    /// Consumes the context, writing the cassette if this was a recording.
    ///
    /// Returns the cassette path when one was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be written.
    pub fn finish(self) -> Result<Option<PathBuf>, LinkError> {
        let Self { fs, recorder } = self;
        // Releases the adapter's clone of the recorder.
        drop(fs);

        let Some(recorder) = recorder else {
            return Ok(None);
        };
        let recorder = Arc::try_unwrap(recorder)
            .map_err(|_| LinkError::Cassette("recording adapter still has references".into()))?
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let path = recorder.finish().map_err(|e| LinkError::Cassette(e.to_string()))?;
        Ok(Some(path))
    }
}
