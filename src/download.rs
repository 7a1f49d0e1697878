/// Download resource management.
///
/// A produced artifact is held behind an opaque handle created by an
/// [`ArtifactStore`]. The [`DownloadManager`] owns at most one live handle.
/// It releases the previous handle once a replacement exists, and on
/// [`DownloadManager::clear`] and drop.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};
use uuid::Uuid;

use crate::classify::{PendingArtifact, FALLBACK_FILENAME};
use crate::error::{ClientError, Result};

/// Opaque reference to stored artifact bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(String);

impl ArtifactHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backing storage for artifact bytes.
///
/// Methods are synchronous: `release` runs from `Drop`.
pub trait ArtifactStore: Send + Sync {
    /// Human-readable name of this store (e.g., "memory").
    fn name(&self) -> &str;

    /// Store bytes and return a new live handle.
    fn create(&self, data: &[u8], mime_type: &str) -> Result<ArtifactHandle>;

    /// Release a handle. Releasing an unknown or already released handle is a no-op.
    fn release(&self, handle: &ArtifactHandle);

    /// Read the bytes behind a live handle.
    fn read(&self, handle: &ArtifactHandle) -> Result<Vec<u8>>;
}

#[derive(Debug)]
struct StoredBlob {
    data: Vec<u8>,
    mime_type: String,
}

#[derive(Debug, Default)]
struct MemoryRegistry {
    blobs: Mutex<HashMap<String, StoredBlob>>,
    created: AtomicUsize,
    released: AtomicUsize,
}

/// In-memory store handing out `blob:<uuid>` references.
///
/// Clones share one registry, so a caller can keep a clone to audit the
/// handles a manager creates and releases.
#[derive(Debug, Clone, Default)]
pub struct MemoryArtifactStore {
    inner: Arc<MemoryRegistry>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles created and not yet released.
    pub fn live_count(&self) -> usize {
        self.blobs().len()
    }

    pub fn created_count(&self) -> usize {
        self.inner.created.load(Ordering::SeqCst)
    }

    pub fn released_count(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }

    pub fn is_live(&self, handle: &ArtifactHandle) -> bool {
        self.blobs().contains_key(handle.as_str())
    }

    /// MIME type recorded when the handle was created.
    pub fn mime_type_of(&self, handle: &ArtifactHandle) -> Option<String> {
        self.blobs()
            .get(handle.as_str())
            .map(|b| b.mime_type.clone())
    }

    fn blobs(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredBlob>> {
        self.inner
            .blobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn create(&self, data: &[u8], mime_type: &str) -> Result<ArtifactHandle> {
        let key = format!("blob:{}", Uuid::new_v4());
        self.blobs().insert(
            key.clone(),
            StoredBlob {
                data: data.to_vec(),
                mime_type: mime_type.to_string(),
            },
        );
        self.inner.created.fetch_add(1, Ordering::SeqCst);
        Ok(ArtifactHandle(key))
    }

    fn release(&self, handle: &ArtifactHandle) {
        if self.blobs().remove(handle.as_str()).is_some() {
            self.inner.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn read(&self, handle: &ArtifactHandle) -> Result<Vec<u8>> {
        self.blobs()
            .get(handle.as_str())
            .map(|b| b.data.clone())
            .ok_or_else(|| ClientError::UnknownHandle(handle.to_string()))
    }
}

/// Store that spools each artifact to its own file in a directory.
///
/// Releasing a handle deletes the file. File I/O is blocking and runs on
/// the calling thread, including inside async dispatch, so this store is
/// meant for artifacts small enough to write in one call.
#[derive(Debug, Clone)]
pub struct SpoolArtifactStore {
    dir: PathBuf,
}

impl SpoolArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, handle: &ArtifactHandle) -> Result<PathBuf> {
        let path = PathBuf::from(handle.as_str());
        if path.parent() != Some(self.dir.as_path()) {
            return Err(ClientError::UnknownHandle(handle.to_string()));
        }
        Ok(path)
    }
}

impl ArtifactStore for SpoolArtifactStore {
    fn name(&self) -> &str {
        "spool"
    }

    fn create(&self, data: &[u8], _mime_type: &str) -> Result<ArtifactHandle> {
        let path = self.dir.join(format!("{}.artifact", Uuid::new_v4()));
        std::fs::write(&path, data)
            .map_err(|e| ClientError::ArtifactStore(format!("spool write failed: {e}")))?;
        Ok(ArtifactHandle(path.to_string_lossy().into_owned()))
    }

    fn release(&self, handle: &ArtifactHandle) {
        if let Ok(path) = self.path_of(handle) {
            // Already gone is fine.
            let _ = std::fs::remove_file(path);
        }
    }

    fn read(&self, handle: &ArtifactHandle) -> Result<Vec<u8>> {
        let path = self.path_of(handle)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ClientError::UnknownHandle(handle.to_string()),
            _ => ClientError::Io(e),
        })
    }
}

/// The currently downloadable artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub handle: ArtifactHandle,
    /// Suggested name for saving.
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
}

/// Owner of the single live artifact handle.
pub struct DownloadManager<S: ArtifactStore> {
    store: S,
    active: Option<DownloadArtifact>,
}

impl<S: ArtifactStore> DownloadManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            active: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn active(&self) -> Option<&DownloadArtifact> {
        self.active.as_ref()
    }

    /// Install new artifact bytes.
    ///
    /// The previous handle is released only after the new one is created,
    /// so a failed create leaves the current artifact in place.
    pub fn install(
        &mut self,
        data: &[u8],
        mime_type: &str,
        filename: &str,
    ) -> Result<&DownloadArtifact> {
        let handle = self.store.create(data, mime_type)?;
        debug!(handle = %handle, store = self.store.name(), "Artifact handle created");

        self.clear();

        Ok(&*self.active.insert(DownloadArtifact {
            handle,
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            size: data.len() as u64,
        }))
    }

    pub fn install_pending(&mut self, artifact: &PendingArtifact) -> Result<&DownloadArtifact> {
        self.install(&artifact.data, &artifact.mime_type, &artifact.filename)
    }

    /// Release the active handle, if any.
    pub fn clear(&mut self) {
        if let Some(previous) = self.active.take() {
            self.store.release(&previous.handle);
            debug!(handle = %previous.handle, "Artifact handle released");
        }
    }

    /// Read the active artifact's bytes.
    pub fn read_active(&self) -> Result<Vec<u8>> {
        let artifact = self.active.as_ref().ok_or(ClientError::NoArtifact)?;
        self.store.read(&artifact.handle)
    }

    /// Write the active artifact into `dir` under its suggested name.
    ///
    /// Only the final component of the suggested name is used.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let artifact = self.active.as_ref().ok_or(ClientError::NoArtifact)?;
        let data = self.store.read(&artifact.handle)?;

        let path = dir.as_ref().join(safe_file_name(&artifact.filename));
        tokio::fs::write(&path, &data).await?;

        info!(path = %path.display(), bytes = data.len(), "Artifact saved");
        Ok(path)
    }
}

impl<S: ArtifactStore> Drop for DownloadManager<S> {
    fn drop(&mut self) {
        self.clear();
    }
}

fn safe_file_name(suggested: &str) -> String {
    Path::new(suggested)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}
