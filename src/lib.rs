//! storage-browser is an embeddable file browser widget for [ratatui](https://ratatui.rs).
//!
//! The browser starts at a root directory (the home directory or a custom
//! path), lists each directory with its entries sorted by a configurable
//! strategy and shows the byte size of every row, directories included.
//! Opening a file presents a preview: text decoded with the configured
//! encoding, PNG/JPEG images, property lists, or the file URL of content the
//! host should render itself.
//!
//! Listings are cached per directory and only reread on
//! [`StorageBrowser::reload`] or when navigating back to a parent.
//!
//! # Example
//!
//! ```no_run
//! use ratatui::crossterm::event::{self, Event, KeyCode};
//! use storage_browser::{Source, StorageBrowser};
//!
//! # tokio_test::block_on(async {
//! let mut terminal = ratatui::init();
//! let mut browser = StorageBrowser::new(Source::Home).await.unwrap();
//!
//! loop {
//!     terminal.draw(|f| f.render_widget(&browser.widget(), f.area())).unwrap();
//!
//!     let event = event::read().unwrap();
//!     if let Event::Key(key) = event {
//!         if key.code == KeyCode::Char('q') {
//!             break;
//!         }
//!     }
//!     browser.handle(&event).await;
//! }
//!
//! ratatui::restore();
//! # })
//! ```

mod browser;
mod cache;
mod directory;
mod entry;
mod error;
mod filesystem;
pub mod format;
mod input;
pub mod preview;
mod settings;
mod sorting;
mod widget;

pub use browser::{DirectoryPage, FilePage, Source, StorageBrowser};
pub use cache::ContentsProvider;
pub use directory::{byte_count, list};
pub use entry::{Directory, File, FileEntry};
pub use error::{BrowserError, BrowserResult};
pub use filesystem::{join, EntryKind, FileSystem, LocalFileSystem, Metadata};
pub use input::Input;
pub use preview::{FilePreview, ImageKind, PreviewSettings, TextEncoding};
pub use settings::Settings;
pub use sorting::{sort, CategorySorting, SortingStrategy};
pub use widget::{preview_text, Renderer, StatefulRenderer, Theme};
