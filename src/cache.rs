//! Per-directory contents cache.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::directory;
use crate::entry::{Directory, FileEntry};
use crate::error::{BrowserError, BrowserResult};
use crate::filesystem::FileSystem;
use crate::sorting::{sort, SortingStrategy};

#[derive(Debug)]
struct CacheState {
    files: Vec<FileEntry>,
    needs_reload: bool,
}

/// Keeps the sorted listing of one directory.
///
/// The listing is computed on first access and reused until
/// [`invalidate`](Self::invalidate) is called. All access goes through one
/// mutex, so reads and removals on the same directory are serialized while
/// providers of different directories never contend.
#[derive(Debug)]
pub struct ContentsProvider<F: FileSystem> {
    filesystem: Arc<F>,
    directory: Directory,
    sorting_strategy: Option<SortingStrategy>,
    state: Mutex<CacheState>,
}

impl<F: FileSystem> ContentsProvider<F> {
    #[must_use]
    pub fn new(
        filesystem: Arc<F>,
        directory: Directory,
        sorting_strategy: Option<SortingStrategy>,
    ) -> Self {
        Self {
            filesystem,
            directory,
            sorting_strategy,
            state: Mutex::new(CacheState {
                files: Vec::new(),
                needs_reload: true,
            }),
        }
    }

    /// Returns the directory this provider lists.
    #[inline]
    #[must_use]
    pub const fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Returns the strategy applied to the listing.
    #[inline]
    #[must_use]
    pub const fn sorting_strategy(&self) -> Option<&SortingStrategy> {
        self.sorting_strategy.as_ref()
    }

    /// Returns the sorted listing, reloading it first if it is stale.
    ///
    /// If the directory can't be read, the previous listing (empty before the
    /// first successful read) is returned and the next call tries again.
    pub async fn files(&self) -> Vec<FileEntry> {
        let mut state = self.state.lock().await;
        self.reload_if_needed(&mut state).await;
        state.files.clone()
    }

    /// Marks the listing stale. The next [`files`](Self::files) call rereads
    /// the directory.
    pub async fn invalidate(&self) {
        self.state.lock().await.needs_reload = true;
    }

    /// Returns `true` if the next read will reload the directory.
    pub async fn needs_reload(&self) -> bool {
        self.state.lock().await.needs_reload
    }

    /// Deletes `entry` and drops it from the cached listing.
    ///
    /// Returns `false`, leaving the listing untouched, if the entry is not in
    /// the listing or the filesystem refused to delete it. Use
    /// [`try_remove`](Self::try_remove) to learn why.
    pub async fn remove(&self, entry: &FileEntry) -> bool {
        match self.try_remove(entry).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to delete {}: {}", entry.path().display(), e);
                false
            }
        }
    }

    /// Deletes `entry` and drops it from the cached listing.
    ///
    /// A successful removal does not mark the listing stale: only the deleted
    /// entry disappears, and the rest of the listing keeps its order.
    ///
    /// # Errors
    ///
    /// - [`BrowserError::NotInListing`] if the entry is not part of the current listing.
    /// - [`BrowserError::Io`] if the filesystem delete fails.
    pub async fn try_remove(&self, entry: &FileEntry) -> BrowserResult<()> {
        let mut state = self.state.lock().await;
        self.reload_if_needed(&mut state).await;

        let Some(index) = state.files.iter().position(|file| file == entry) else {
            return Err(BrowserError::NotInListing(entry.path().to_path_buf()));
        };

        self.filesystem
            .delete(&entry.path().to_string_lossy())
            .await?;

        state.files.remove(index);
        tracing::debug!("Deleted {}", entry.path().display());
        Ok(())
    }

    async fn reload_if_needed(&self, state: &mut CacheState) {
        if !state.needs_reload {
            return;
        }

        let mut files = match directory::list(self.filesystem.as_ref(), &self.directory).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(
                    "Can't read directory {}: {}",
                    self.directory.path().display(),
                    e
                );
                return;
            }
        };

        for file in &files {
            if let FileEntry::Directory(directory) = file {
                directory.byte_count(self.filesystem.as_ref()).await;
            }
        }

        sort(&mut files, self.sorting_strategy.as_ref());
        state.files = files;
        state.needs_reload = false;
    }
}
