//! Directory listing and recursive size aggregation.

use std::io::Result;
use std::path::PathBuf;

use crate::entry::{Directory, File, FileEntry};
use crate::filesystem::{join, EntryKind, FileSystem};

/// Lists the immediate children of `directory`.
///
/// Each child is probed for its kind and attributes. Children that disappear
/// between enumeration and probing, or that cannot be probed at all, are left
/// out of the result. Entries are returned in filesystem order; see
/// [`sort`](crate::sorting::sort) for ordering.
///
/// # Errors
///
/// Returns an error if the directory itself cannot be enumerated.
pub async fn list<F: FileSystem + ?Sized>(
    filesystem: &F,
    directory: &Directory,
) -> Result<Vec<FileEntry>> {
    let directory_path = directory.path().to_string_lossy().to_string();
    let names = filesystem.read_dir(&directory_path).await?;
    let parent = Some(PathBuf::from(&directory_path));

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let path = join(&directory_path, &name);

        let metadata = match filesystem.metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!("Skipping entry that can't be probed: {}: {}", path, e);
                continue;
            }
        };

        entries.push(match metadata.kind {
            EntryKind::Directory => {
                Directory::new(name, path, parent.clone(), Some(&metadata)).into()
            }
            EntryKind::File | EntryKind::Other => {
                File::new(name, path, parent.clone(), &metadata).into()
            }
        });
    }

    Ok(entries)
}

/// Returns the total number of bytes occupied by every regular file below
/// `path`.
///
/// Each file counts its allocated size, or its logical length when the
/// filesystem reports no allocation. Symlinked directories are not descended.
/// Unreadable directories contribute nothing, so an unreadable root yields 0.
pub async fn byte_count<F: FileSystem + ?Sized>(filesystem: &F, path: &str) -> u64 {
    let mut total = 0u64;
    let mut pending = vec![path.to_string()];

    while let Some(directory) = pending.pop() {
        let names = match filesystem.read_dir(&directory).await {
            Ok(names) => names,
            Err(e) => {
                tracing::debug!("Can't read directory while counting bytes: {}: {}", directory, e);
                continue;
            }
        };

        for name in names {
            let child = join(&directory, &name);
            let Ok(metadata) = filesystem.metadata(&child).await else {
                continue;
            };

            match metadata.kind {
                EntryKind::File => total = total.saturating_add(metadata.occupied_bytes()),
                EntryKind::Directory if !metadata.is_symlink => pending.push(child),
                EntryKind::Directory | EntryKind::Other => {}
            }
        }
    }

    total
}
