use std::{
    hash::{Hash, Hasher},
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use tokio::sync::OnceCell;

use crate::filesystem::{FileSystem, Metadata};

/// A regular file shown by the browser.
///
/// Files are identified by their absolute path: two `File`s with the same path
/// compare equal whatever their other attributes say.
#[derive(Clone, educe::Educe)]
#[educe(Debug, PartialEq, Eq, Hash)]
pub struct File {
    #[educe(PartialEq(ignore), Hash(ignore))]
    name: String,
    path: PathBuf,
    #[educe(PartialEq(ignore), Hash(ignore))]
    parent: Option<PathBuf>,
    #[educe(PartialEq(ignore), Hash(ignore))]
    size: u64,
    #[educe(PartialEq(ignore), Hash(ignore))]
    created: Option<SystemTime>,
    #[educe(PartialEq(ignore), Hash(ignore))]
    modified: Option<SystemTime>,
}

impl File {
    pub(crate) fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        parent: Option<PathBuf>,
        metadata: &Metadata,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            parent,
            size: metadata.len,
            created: metadata.created,
            modified: metadata.modified,
        }
    }

    /// Returns the name of the file.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the absolute path of the file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the directory the file was listed from, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&Path> {
        self.parent.as_deref()
    }

    /// Returns the logical size of the file in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the creation time of the file.
    #[inline]
    #[must_use]
    pub const fn created(&self) -> Option<SystemTime> {
        self.created
    }

    /// Returns the last modified time of the file.
    #[inline]
    #[must_use]
    pub const fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Returns the lowercased text after the final `.` of the name, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_lowercase())
    }
}

/// A directory shown by the browser.
///
/// The recursive byte count is computed on first request and shared by every
/// clone of the same listing entry.
#[derive(Clone, educe::Educe)]
#[educe(Debug, PartialEq, Eq, Hash)]
pub struct Directory {
    #[educe(PartialEq(ignore), Hash(ignore))]
    name: String,
    path: PathBuf,
    #[educe(PartialEq(ignore), Hash(ignore))]
    parent: Option<PathBuf>,
    #[educe(PartialEq(ignore), Hash(ignore))]
    created: Option<SystemTime>,
    #[educe(PartialEq(ignore), Hash(ignore))]
    modified: Option<SystemTime>,
    #[educe(Debug(ignore), PartialEq(ignore), Hash(ignore))]
    byte_count: Arc<OnceCell<u64>>,
}

impl Directory {
    pub(crate) fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        parent: Option<PathBuf>,
        metadata: Option<&Metadata>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            parent,
            created: metadata.and_then(|m| m.created),
            modified: metadata.and_then(|m| m.modified),
            byte_count: Arc::new(OnceCell::new()),
        }
    }

    /// Returns the name of the directory.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the absolute path of the directory.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the directory this one was listed from, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&Path> {
        self.parent.as_deref()
    }

    /// Returns the creation time of the directory.
    #[inline]
    #[must_use]
    pub const fn created(&self) -> Option<SystemTime> {
        self.created
    }

    /// Returns the last modified time of the directory.
    #[inline]
    #[must_use]
    pub const fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Returns the total size of every file below this directory, computing
    /// it on the first call.
    ///
    /// See [`byte_count`](crate::directory::byte_count) for how sizes are summed.
    pub async fn byte_count<F: FileSystem>(&self, filesystem: &F) -> u64 {
        let path = self.path.to_string_lossy().to_string();
        *self
            .byte_count
            .get_or_init(|| crate::directory::byte_count(filesystem, &path))
            .await
    }

    /// Returns the recursive byte count if it has already been computed.
    #[inline]
    #[must_use]
    pub fn cached_byte_count(&self) -> Option<u64> {
        self.byte_count.get().copied()
    }
}

/// An entry of a directory listing: either a file or a directory.
///
/// Entries compare equal, and hash the same, iff their paths are equal.
#[derive(Debug, Clone)]
pub enum FileEntry {
    File(File),
    Directory(Directory),
}

impl FileEntry {
    /// Returns the name of the entry.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => file.name(),
            Self::Directory(directory) => directory.name(),
        }
    }

    /// Returns the absolute path of the entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File(file) => file.path(),
            Self::Directory(directory) => directory.path(),
        }
    }

    /// Returns the path of the directory the entry was listed from, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Path> {
        match self {
            Self::File(file) => file.parent(),
            Self::Directory(directory) => directory.parent(),
        }
    }

    /// Returns `true` if the entry is a directory.
    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Returns `true` if the entry is a regular file.
    #[inline]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Returns the creation time of the entry.
    #[must_use]
    pub const fn created(&self) -> Option<SystemTime> {
        match self {
            Self::File(file) => file.created(),
            Self::Directory(directory) => directory.created(),
        }
    }

    /// Returns the last modified time of the entry.
    #[must_use]
    pub const fn modified(&self) -> Option<SystemTime> {
        match self {
            Self::File(file) => file.modified(),
            Self::Directory(directory) => directory.modified(),
        }
    }

    /// Returns the byte count known without touching the filesystem: the
    /// size of a file, or the cached recursive count of a directory.
    #[must_use]
    pub fn known_byte_count(&self) -> Option<u64> {
        match self {
            Self::File(file) => Some(file.size()),
            Self::Directory(directory) => directory.cached_byte_count(),
        }
    }

    #[must_use]
    pub const fn as_file(&self) -> Option<&File> {
        match self {
            Self::File(file) => Some(file),
            Self::Directory(_) => None,
        }
    }

    #[must_use]
    pub const fn as_directory(&self) -> Option<&Directory> {
        match self {
            Self::File(_) => None,
            Self::Directory(directory) => Some(directory),
        }
    }
}

impl PartialEq for FileEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for FileEntry {}

impl Hash for FileEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path().hash(state);
    }
}

impl From<File> for FileEntry {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl From<Directory> for FileEntry {
    fn from(directory: Directory) -> Self {
        Self::Directory(directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{memory::MemoryFileSystem, EntryKind};
    use std::collections::HashSet;

    fn file_metadata(len: u64) -> Metadata {
        Metadata {
            kind: EntryKind::File,
            len,
            allocated: None,
            created: None,
            modified: Some(SystemTime::UNIX_EPOCH),
            is_symlink: false,
        }
    }

    #[test]
    fn entries_are_equal_iff_paths_are_equal() {
        let a = FileEntry::from(File::new("a", "/r/a", None, &file_metadata(1)));
        let renamed = FileEntry::from(File::new("other", "/r/a", None, &file_metadata(99)));
        let dir_same_path = FileEntry::from(Directory::new("a", "/r/a", None, None));
        let b = FileEntry::from(File::new("a", "/r/b", None, &file_metadata(1)));

        assert_eq!(a, renamed);
        assert_eq!(a, dir_same_path);
        assert_ne!(a, b);

        let set: HashSet<FileEntry> = [a, renamed, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn extension_is_lowercased_text_after_last_dot() {
        let meta = file_metadata(0);
        assert_eq!(
            File::new("a.PNG", "/a.PNG", None, &meta).extension(),
            Some("png".to_string())
        );
        assert_eq!(
            File::new("archive.tar.GZ", "/archive.tar.GZ", None, &meta).extension(),
            Some("gz".to_string())
        );
        assert_eq!(File::new("notes", "/notes", None, &meta).extension(), None);
    }

    #[test]
    fn file_attributes_come_from_metadata() {
        let file = File::new("a.txt", "/r/a.txt", Some("/r".into()), &file_metadata(42));
        let entry = FileEntry::from(file.clone());

        assert_eq!(file.size(), 42);
        assert_eq!(entry.parent(), Some(Path::new("/r")));
        assert_eq!(entry.modified(), Some(SystemTime::UNIX_EPOCH));
        assert_eq!(entry.known_byte_count(), Some(42));
        assert!(entry.is_file());
        assert!(entry.as_directory().is_none());
    }

    #[tokio::test]
    async fn directory_byte_count_is_memoised_across_clones() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/r");
        fs.add_file("/r/a.txt", vec![0u8; 7]);

        let directory = Directory::new("r", "/r", None, None);
        let clone = directory.clone();
        assert_eq!(clone.cached_byte_count(), None);

        assert_eq!(directory.byte_count(&fs).await, 7);
        assert_eq!(clone.cached_byte_count(), Some(7));

        // Later changes are not picked up by an already measured entry.
        fs.add_file("/r/b.txt", vec![0u8; 3]);
        assert_eq!(clone.byte_count(&fs).await, 7);
    }
}
