use crate::keys::{is_temp_file_name, temp_file_name};
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use stowage_core::validation::validate_storage_key;
use tokio::fs;

/// Local filesystem storage implementation
///
/// One flat directory, one file per key. Writes go to a temporary file in the
/// same directory and are published under the final name with a no-clobber
/// hard link, so a key is either absent or complete.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

/// Removes a temporary file when dropped, whether the write finished, failed
/// or the owning future was cancelled.
///
/// The file itself is created on a blocking thread that outlives a cancelled
/// future. Dropping the guard raises `abandoned` before removing the path;
/// the writer checks the flag after creating the file, so whichever side runs
/// last deletes it.
struct TempFileGuard {
    path: PathBuf,
    abandoned: Arc<AtomicBool>,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            abandoned: Arc::new(AtomicBool::new(false)),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

fn remove_temp_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove temporary upload file"
        ),
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        self.abandoned.store(true, Ordering::SeqCst);
        remove_temp_file(&self.path);
    }
}

/// Map a write-side IO error, keeping "disk full" distinguishable.
fn write_error(action: &str, path: &Path, err: std::io::Error) -> StorageError {
    let message = format!("Failed to {} {}: {}", action, path.display(), err);
    if err.kind() == ErrorKind::StorageFull {
        StorageError::InsufficientSpace(message)
    } else {
        StorageError::UploadFailed(message)
    }
}

/// Map a read-side IO error, turning a missing file into `NotFound`.
fn read_error(action: &str, key: &str, path: &Path, err: std::io::Error) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::DownloadFailed(format!(
            "Failed to {} {}: {}",
            action,
            path.display(),
            err
        ))
    }
}

/// Create, fill and flush a temporary file. Runs on a blocking thread.
fn write_temp_blocking(path: &Path, data: &[u8], abandoned: &AtomicBool) -> StorageResult<()> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| write_error("create temporary file", path, e))?;

    let result = file
        .write_all(data)
        .map_err(|e| write_error("write temporary file", path, e))
        .and_then(|()| {
            file.sync_all()
                .map_err(|e| write_error("sync temporary file", path, e))
        });

    if abandoned.load(Ordering::SeqCst) {
        remove_temp_file(path);
    }

    result
}

/// Whether a temporary file was last touched at least `older_than` ago. A
/// modification time in the future counts as fresh.
fn is_stale(modified: SystemTime, older_than: Duration) -> bool {
    modified
        .elapsed()
        .map(|age| age >= older_than)
        .unwrap_or(false)
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Directory holding stored files (e.g., "static/uploads"),
    ///   created if missing
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a storage key to its filesystem path.
    ///
    /// The key predicate rejects separators and parent references, so the
    /// joined path always names a direct child of `base_path`.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_storage_key(storage_key)?;
        Ok(self.base_path.join(storage_key))
    }

    fn new_temp_path(&self) -> PathBuf {
        self.base_path.join(temp_file_name())
    }

    /// Create and fill the guarded temporary file, flushed to disk.
    async fn write_temp(&self, guard: &TempFileGuard, data: Bytes) -> StorageResult<()> {
        let path = guard.path.clone();
        let abandoned = guard.abandoned.clone();

        tokio::task::spawn_blocking(move || write_temp_blocking(&path, &data, &abandoned))
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!("Temporary file write task failed: {}", e))
            })?
    }

    /// Publish a finished temporary file under its final name without ever
    /// replacing an existing entry.
    async fn publish(&self, temp_path: &Path, final_path: &Path, key: &str) -> StorageResult<()> {
        match fs::hard_link(temp_path, final_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StorageError::KeyExists(key.to_string()))
            }
            Err(e) => {
                // Some filesystems do not support hard links.
                tracing::debug!(
                    key = %key,
                    error = %e,
                    "Hard link publish failed, falling back to rename"
                );

                if fs::try_exists(final_path).await.unwrap_or(false) {
                    return Err(StorageError::KeyExists(key.to_string()));
                }

                fs::rename(temp_path, final_path)
                    .await
                    .map_err(|e| write_error("publish", final_path, e))
            }
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let final_path = self.key_to_path(key)?;
        let start = std::time::Instant::now();
        let size_bytes = data.len();

        let guard = TempFileGuard::new(self.new_temp_path());
        self.write_temp(&guard, data).await?;
        self.publish(guard.path(), &final_path, key).await?;
        drop(guard);

        tracing::info!(
            path = %final_path.display(),
            key = %key,
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage put successful"
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        let data = fs::read(&path)
            .await
            .map_err(|e| read_error("read file", key, &path, e))?;

        tracing::debug!(
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage get successful"
        );

        Ok(data)
    }

    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        let file = fs::File::open(&path)
            .await
            .map_err(|e| read_error("open file", key, &path, e))?;

        let key = key.to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(
                    key = %key,
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream read error"
                );
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn content_length(&self, key: &str) -> StorageResult<u64> {
        let path = self.key_to_path(key)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| read_error("stat file", key, &path, e))?;
        Ok(meta.len())
    }

    async fn sweep_temp_files(&self, older_than: Duration) -> StorageResult<usize> {
        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !is_temp_file_name(name) {
                continue;
            }

            // Another worker sharing the directory may still be writing it.
            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Failed to stat temporary file");
                    continue;
                }
            };
            if !is_stale(modified, older_than) {
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    file = %name,
                    error = %e,
                    "Failed to remove leftover temporary file"
                ),
            }
        }

        Ok(removed)
    }

    async fn health_check(&self) -> StorageResult<()> {
        let guard = TempFileGuard::new(self.new_temp_path());
        self.write_temp(&guard, Bytes::new()).await
    }
}
