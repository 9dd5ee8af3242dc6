//! Error types for `storage-browser`.
//!
//! Most browsing failures degrade to an empty or placeholder state instead of
//! an error. The fallible entry points (`try_*` methods, settings loading)
//! return [`BrowserResult<T>`].

use std::path::PathBuf;

/// Unified error type for the browser's fallible operations.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    /// The root path does not exist or is not a directory.
    #[error("root directory not found: {0}")]
    RootNotFound(PathBuf),

    /// The platform did not report a home directory.
    #[error("home directory is unavailable")]
    HomeUnavailable,

    /// The entry is not part of the directory's current listing.
    #[error("entry is not in the current listing: {0}")]
    NotInListing(PathBuf),

    /// Failed to parse a TOML settings file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `storage-browser`.
pub type BrowserResult<T> = Result<T, BrowserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_not_found_displays_path() {
        let err = BrowserError::RootNotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "root directory not found: /missing");
    }

    #[test]
    fn not_in_listing_displays_path() {
        let err = BrowserError::NotInListing(PathBuf::from("/tmp/a.txt"));
        assert_eq!(
            err.to_string(),
            "entry is not in the current listing: /tmp/a.txt"
        );
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BrowserError = io_err.into();
        assert!(matches!(err, BrowserError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
