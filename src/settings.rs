//! Browser settings, optionally loaded from a TOML file.
//!
//! ```toml
//! [sorting_strategy]
//! directories_first = true
//! category = "alphabetical"   # or "by-size"
//!
//! [preview]
//! encoding = "utf8"           # utf16-le, utf16-be, ascii, latin1
//! max_string_preview_length = 1000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BrowserError, BrowserResult};
use crate::preview::PreviewSettings;
use crate::sorting::SortingStrategy;

/// Settings of the browser.
///
/// The default sorts directories first and larger entries first, and
/// previews text as UTF-8 up to 1000 characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Strategy used to order listings. `None` keeps filesystem order.
    #[serde(default = "default_sorting_strategy")]
    pub sorting_strategy: Option<SortingStrategy>,
    /// Settings used when previewing files.
    #[serde(default)]
    pub preview: PreviewSettings,
}

fn default_sorting_strategy() -> Option<SortingStrategy> {
    Some(SortingStrategy::default())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sorting_strategy: default_sorting_strategy(),
            preview: PreviewSettings::default(),
        }
    }
}

impl Settings {
    #[inline]
    #[must_use]
    pub const fn new(sorting_strategy: Option<SortingStrategy>, preview: PreviewSettings) -> Self {
        Self {
            sorting_strategy,
            preview,
        }
    }

    /// Parses settings from TOML. Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::ConfigParse`] if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> BrowserResult<Self> {
        toml::from_str(content).map_err(|e| BrowserError::ConfigParse(e.to_string()))
    }

    /// Loads settings from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`BrowserError::Io`] if the file cannot be read.
    /// - [`BrowserError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> BrowserResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
