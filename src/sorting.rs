use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::entry::FileEntry;

/// Rule used to order entries of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategorySorting {
    /// Names ascending, compared case-sensitively.
    Alphabetical,
    /// Byte counts descending, larger entries first.
    BySize,
}

/// Strategy to sort the files and directories of a listing.
///
/// # Example
/// ```no_run
/// # use storage_browser::{CategorySorting, SortingStrategy};
/// let strategy = SortingStrategy::new(true, CategorySorting::Alphabetical);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortingStrategy {
    /// Place every directory before every file.
    pub directories_first: bool,
    /// Rule applied within directories and within files.
    pub category: CategorySorting,
}

impl SortingStrategy {
    #[inline]
    #[must_use]
    pub const fn new(directories_first: bool, category: CategorySorting) -> Self {
        Self {
            directories_first,
            category,
        }
    }

    /// Compares two entries under this strategy.
    ///
    /// Directories whose byte count has not been computed yet count as 0.
    /// Ties are broken by path, so the ordering is total.
    #[must_use]
    pub fn compare(&self, lhs: &FileEntry, rhs: &FileEntry) -> Ordering {
        if self.directories_first {
            match (lhs.is_dir(), rhs.is_dir()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }

        let by_category = match self.category {
            CategorySorting::Alphabetical => lhs.name().cmp(rhs.name()),
            CategorySorting::BySize => rhs
                .known_byte_count()
                .unwrap_or(0)
                .cmp(&lhs.known_byte_count().unwrap_or(0)),
        };

        by_category.then_with(|| lhs.path().cmp(rhs.path()))
    }
}

impl Default for SortingStrategy {
    /// Directories first, larger entries first.
    fn default() -> Self {
        Self::new(true, CategorySorting::BySize)
    }
}

/// Sorts `entries` in place with `strategy`.
///
/// Without a strategy the entries keep the order the filesystem returned.
pub fn sort(entries: &mut [FileEntry], strategy: Option<&SortingStrategy>) {
    if let Some(strategy) = strategy {
        entries.sort_by(|lhs, rhs| strategy.compare(lhs, rhs));
    }
}
