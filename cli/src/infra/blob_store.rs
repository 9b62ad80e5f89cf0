//! Directory-backed implementation of the `BlobStore` port.
//!
//! Keys are `/`-separated paths relative to the store root. Filesystem
//! work runs on the blocking pool.

use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::application::ports::{BlobObject, BlobStore};
use crate::domain::StorageError;

pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }}

fn map_io(key: &str, err: io::Error) -> StorageError {
    match err.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
        io::ErrorKind::PermissionDenied => StorageError::AccessDenied(key.to_string()),
        _ => StorageError::Io {
            key: key.to_string(),
            source: err,
        },
    }
}

/// Resolve `key` under `root`, refusing anything that would leave it.
fn resolve(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
    let relative = Path::new(key);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(StorageError::AccessDenied(key.to_string()));
    }
    Ok(root.join(relative))
}

async fn blocking<T, F>(key: &str, work: F) -> Result<T, StorageError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| StorageError::Io {
            key: key.to_string(),
            source: io::Error::other(err),
        })?
}

/// `None` when the entry disappeared while being read.
fn unless_vanished<T>(result: io::Result<T>) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Every file below `dir`, as keys relative to `root`.
///
/// Fails with `NotFound` only when `dir` itself is missing; entries removed
/// mid-walk are skipped.
fn walk(root: &Path, dir: &Path, out: &mut Vec<BlobObject>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let Some(entry) = unless_vanished(entry)? else {
            continue;
        };
        let path = entry.path();
        let Some(file_type) = unless_vanished(entry.file_type())? else {
            continue;
        };
        if file_type.is_dir() {
            unless_vanished(walk(root, &path, out))?;
            continue;
        }
        // Follows symlinks, so a dangling link reads as vanished.
        let Some(meta) = unless_vanished(std::fs::metadata(&path))? else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        out.push(BlobObject {
            key,
            last_modified: DateTime::<Utc>::from(meta.modified()?),
        });
    }
    Ok(())
}

/// Objects whose key starts with `prefix`, sorted by key.
fn list(root: &Path, prefix: &str) -> Result<Vec<BlobObject>, StorageError> {
    // Only the directory named by the prefix needs walking.
    let dir_part = prefix.rfind('/').map_or("", |idx| &prefix[..idx]);
    let dir = if dir_part.is_empty() {
        root.to_path_buf()
    } else {
        resolve(root, dir_part)?
    };
    let mut objects = Vec::new();
    match walk(root, &dir, &mut objects) {
        Ok(()) => {}
        // Only the top-level read reports NotFound: an absent prefix
        // directory holds no objects.
        Err(err) if err.kind() == io::ErrorKind::NotFound && dir != root => {}
        Err(err) => return Err(map_io(prefix, err)),
    }
    objects.retain(|object| object.key.starts_with(prefix));
    objects.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(objects)
}

impl BlobStore for FsBlobStore {
    async fn put_object(&self, key: &str, body: &[u8]) -> Result<(), StorageError> {
        let path = resolve(&self.root, key)?;
        let owned_key = key.to_string();
        let body = body.to_vec();
        blocking(key, move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| map_io(&owned_key, e))?;
            }
            // Write then rename, so readers never see a partial object.
            let tmp = path.with_extension("partial");
            std::fs::write(&tmp, &body).map_err(|e| map_io(&owned_key, e))?;
            std::fs::rename(&tmp, &path).map_err(|e| map_io(&owned_key, e))
        })
        .await
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<BlobObject>, StorageError> {
        let root = self.root.clone();
        let owned_prefix = prefix.to_string();
        blocking(prefix, move || list(&root, &owned_prefix)).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, StorageError> {
        let root = self.root.clone();
        let owned_prefix = prefix.to_string();
        blocking(prefix, move || {
            let objects = match list(&root, &owned_prefix) {
                Ok(objects) => objects,
                Err(StorageError::NotFound(_)) => return Ok(0),
                Err(err) => return Err(err),
            };
            for object in &objects {
                let path = resolve(&root, &object.key)?;
                match std::fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                    Err(err) => return Err(map_io(&object.key, err)),
                }
            }
            if let Some(dir) = owned_prefix.strip_suffix('/') {
                if !dir.is_empty() {
                    // Leftover empty directories are not worth failing over.
                    let _ = std::fs::remove_dir_all(resolve(&root, dir)?);
                }
            }
            Ok(objects.len())
        })
        .await
    }
}
