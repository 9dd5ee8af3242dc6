//! Local filesystem implementation.

use super::{EntryKind, FileSystem, Metadata};
use std::future::Future;
use std::io::{Error, ErrorKind, Result};
use std::time::Duration;

/// Upper bound for enumerations, reads and deletions.
const LONG_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound for single-path probes.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// A filesystem implementation for local file operations using `tokio::fs`.
///
/// This is a zero-sized type that implements the `FileSystem` trait for
/// local filesystem operations. Every operation is bounded by a timeout so a
/// stalled network mount cannot hang the host application.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

/// Runs `operation`, turning an elapsed deadline into `ErrorKind::TimedOut`.
async fn with_timeout<T>(
    duration: Duration,
    what: &str,
    path: &str,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(duration, operation)
        .await
        .map_err(|_| Error::new(ErrorKind::TimedOut, format!("Timeout {what}: {path}")))?
}

fn convert(metadata: &std::fs::Metadata, is_symlink: bool) -> Metadata {
    let file_type = metadata.file_type();
    let kind = if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    };

    let allocated = {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            // st_blocks is always expressed in 512-byte units.
            Some(metadata.blocks() * 512)
        }

        #[cfg(not(unix))]
        {
            None
        }
    };

    Metadata {
        kind,
        len: metadata.len(),
        allocated,
        created: metadata.created().ok(),
        modified: metadata.modified().ok(),
        is_symlink,
    }
}

impl FileSystem for LocalFileSystem {
    async fn read_dir(&self, path: &str) -> Result<Vec<String>> {
        with_timeout(LONG_TIMEOUT, "reading directory", path, async {
            let mut read_dir = tokio::fs::read_dir(path).await?;
            let mut names = Vec::new();

            while let Some(entry) = read_dir.next_entry().await? {
                match entry.file_name().into_string() {
                    Ok(name) => names.push(name),
                    Err(raw) => tracing::warn!(
                        "Skipping entry with a non UTF-8 name in {}: {:?}",
                        path,
                        raw
                    ),
                }
            }

            Ok::<_, Error>(names)
        })
        .await
    }

    async fn metadata(&self, path: &str) -> Result<Metadata> {
        with_timeout(PROBE_TIMEOUT, "reading metadata", path, async {
            let link_meta = tokio::fs::symlink_metadata(path).await?;

            if link_meta.file_type().is_symlink() {
                // Follow the link so symlinked directories stay navigable.
                match tokio::fs::metadata(path).await {
                    Ok(target) => Ok::<_, Error>(convert(&target, true)),
                    Err(e) => {
                        tracing::debug!("Broken or inaccessible symlink: {}: {}", path, e);
                        Err(e)
                    }
                }
            } else {
                Ok(convert(&link_meta, false))
            }
        })
        .await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let result = tokio::time::timeout(PROBE_TIMEOUT, tokio::fs::metadata(path)).await;

        Ok(matches!(result, Ok(Ok(_))))
    }

    async fn is_dir(&self, path: &str) -> Result<bool> {
        let metadata = with_timeout(
            PROBE_TIMEOUT,
            "checking if path is directory",
            path,
            tokio::fs::metadata(path),
        )
        .await?;

        Ok(metadata.is_dir())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        with_timeout(LONG_TIMEOUT, "deleting", path, async {
            let metadata = tokio::fs::symlink_metadata(path).await?;

            if metadata.is_dir() {
                tokio::fs::remove_dir_all(path).await?;
            } else {
                tokio::fs::remove_file(path).await?;
            }

            Ok::<_, Error>(())
        })
        .await
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        with_timeout(LONG_TIMEOUT, "reading file", path, tokio::fs::read(path)).await
    }
}
