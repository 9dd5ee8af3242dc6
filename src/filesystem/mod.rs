//! Filesystem abstraction for the storage browser.
//!
//! This module provides a trait-based abstraction for filesystem operations,
//! allowing the browser to list, measure, preview and delete entries through a
//! common interface. [`LocalFileSystem`] is the `tokio::fs` implementation.

use std::io::Result;
use std::time::SystemTime;

mod local;

#[cfg(test)]
pub(crate) mod memory;

pub use local::LocalFileSystem;

/// The kind of an entry as reported by a metadata probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Anything else (sockets, fifos, devices, ...).
    Other,
}

/// Metadata of a single path.
///
/// Probes follow symbolic links, so `kind` describes the link target while
/// `is_symlink` records that the path itself is a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// The kind of the entry.
    pub kind: EntryKind,
    /// Logical length in bytes.
    pub len: u64,
    /// Bytes allocated on disk, when the filesystem reports it.
    pub allocated: Option<u64>,
    /// Creation time, when available.
    pub created: Option<SystemTime>,
    /// Last modification time, when available.
    pub modified: Option<SystemTime>,
    /// Whether the probed path is a symbolic link.
    pub is_symlink: bool,
}

impl Metadata {
    /// Returns `true` if the entry is a directory.
    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// Returns `true` if the entry is a regular file.
    #[inline]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    /// Bytes this entry occupies: the allocated size, or the logical length
    /// when no allocation metadata is available.
    #[inline]
    #[must_use]
    pub fn occupied_bytes(&self) -> u64 {
        self.allocated.unwrap_or(self.len)
    }
}

/// A trait for abstracting filesystem operations.
///
/// All methods are async so that listing, size aggregation and preview
/// decoding stay off the host's rendering path.
pub trait FileSystem: Send + Sync {
    /// Returns the names of the immediate children of the directory at `path`.
    ///
    /// Names are returned in the order the filesystem yields them. Paths are
    /// strings, so children whose names are not valid UTF-8 can't be
    /// addressed and are left out with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read (e.g., permission denied,
    /// path does not exist, not a directory).
    async fn read_dir(&self, path: &str) -> Result<Vec<String>>;

    /// Probes the metadata of `path`, following symbolic links.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or cannot be accessed.
    async fn metadata(&self, path: &str) -> Result<Metadata>;

    /// Check if a path exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem cannot be accessed.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Check if a path is a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or cannot be accessed.
    async fn is_dir(&self, path: &str) -> Result<bool>;

    /// Delete the file or directory (recursively) at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be removed.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Read the whole contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Joins a directory path and a child name the way listings build child paths.
#[must_use]
pub fn join(directory: &str, name: &str) -> String {
    std::path::Path::new(directory)
        .join(name)
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_appends_child_name() {
        assert_eq!(join("/tmp/root", "a.txt"), "/tmp/root/a.txt");
        assert_eq!(join("/tmp/root/", "a.txt"), "/tmp/root/a.txt");
    }

    #[test]
    fn occupied_bytes_prefers_allocation() {
        let mut meta = Metadata {
            kind: EntryKind::File,
            len: 10,
            allocated: Some(4096),
            created: None,
            modified: None,
            is_symlink: false,
        };
        assert_eq!(meta.occupied_bytes(), 4096);

        meta.allocated = None;
        assert_eq!(meta.occupied_bytes(), 10);
    }
}
