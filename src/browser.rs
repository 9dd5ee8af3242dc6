use std::{path::PathBuf, sync::Arc};

use ratatui::widgets::WidgetRef;
use url::Url;

use crate::{
    cache::ContentsProvider,
    entry::{Directory, File, FileEntry},
    error::{BrowserError, BrowserResult},
    filesystem::{FileSystem, LocalFileSystem},
    input::Input,
    preview::{self, FilePreview},
    settings::Settings,
    widget::Renderer,
    Theme,
};

/// Root directory to browse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// The user's home directory, shown as "Home".
    Home,
    /// A custom root directory.
    Custom {
        /// Absolute path of the root directory, without a `file://` prefix.
        path: String,
        /// Name shown as the title of the root page.
        name: String,
    },
}

impl Source {
    /// Builds a custom source.
    #[must_use]
    pub fn custom(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Custom {
            path: path.into(),
            name: name.into(),
        }
    }
}

/// One level of the navigation stack: a directory and its cached listing.
#[derive(Debug)]
pub struct DirectoryPage<F: FileSystem> {
    provider: ContentsProvider<F>,
    files: Vec<FileEntry>,
    selected: usize,
    scroll_offset: usize,
}

impl<F: FileSystem> DirectoryPage<F> {
    fn new(provider: ContentsProvider<F>) -> Self {
        Self {
            provider,
            files: Vec::new(),
            selected: 0,
            scroll_offset: 0,
        }
    }

    /// Returns the directory shown by this page.
    #[inline]
    #[must_use]
    pub const fn directory(&self) -> &Directory {
        self.provider.directory()
    }

    /// Returns the entries shown by this page.
    #[inline]
    #[must_use]
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Returns the index of the selected entry.
    #[inline]
    #[must_use]
    pub const fn selected_idx(&self) -> usize {
        self.selected
    }

    /// Returns the selected entry, if the page is not empty.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&FileEntry> {
        self.files.get(self.selected)
    }

    async fn refresh(&mut self) {
        self.files = self.provider.files().await;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.files.len().saturating_sub(1));
    }
}

/// A file presented with its preview.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePage {
    file: File,
    preview: FilePreview,
}

impl FilePage {
    /// Returns the presented file.
    #[inline]
    #[must_use]
    pub const fn file(&self) -> &File {
        &self.file
    }

    /// Returns the preview of the presented file.
    #[inline]
    #[must_use]
    pub const fn preview(&self) -> &FilePreview {
        &self.preview
    }
}

/// A browser over the files below a root directory.
///
/// The browser keeps a stack of directory pages, one per level the user
/// entered, each with its own cached listing. Opening a file presents a file
/// page with its preview on top of the stack.
/// You can obtain a renderable widget from it with the [`widget`](#method.widget) method.
///
/// # Examples
///
/// Creating a browser over a custom root:
///
/// ```no_run
/// use storage_browser::{Source, StorageBrowser};
///
/// # tokio_test::block_on(async {
/// let browser = StorageBrowser::new(Source::custom("/var/log", "Logs")).await.unwrap();
/// let widget = browser.widget();
/// # })
/// ```
///
/// Handling user input:
///
/// ```no_run
/// use storage_browser::{Input, Source, StorageBrowser};
///
/// # tokio_test::block_on(async {
/// let mut browser = StorageBrowser::new(Source::Home).await.unwrap();
/// browser.handle(Input::Down).await;
/// browser.handle(Input::Right).await;
/// # })
/// ```
#[derive(Debug)]
pub struct StorageBrowser<F: FileSystem = LocalFileSystem> {
    filesystem: Arc<F>,
    settings: Settings,
    root: Directory,
    root_exists: bool,
    pages: Vec<DirectoryPage<F>>,
    presented: Option<FilePage>,
    theme: Theme<F>,
}

impl<F: FileSystem> StorageBrowser<F> {
    /// Creates a browser with a custom filesystem implementation.
    ///
    /// A root that does not exist, or is not a directory, is not an error:
    /// the browser then renders the root error view and ignores input.
    ///
    /// A relative custom path is resolved against the current directory.
    ///
    /// # Errors
    ///
    /// - [`BrowserError::HomeUnavailable`] if `source` is [`Source::Home`]
    ///   and no home directory can be determined.
    /// - [`BrowserError::Io`] if a relative path can't be made absolute.
    pub async fn with_fs(
        filesystem: Arc<F>,
        source: Source,
        settings: Settings,
    ) -> BrowserResult<Self> {
        let (path, name) = match source {
            Source::Home => {
                let home = dirs::home_dir().ok_or(BrowserError::HomeUnavailable)?;
                (home.to_string_lossy().to_string(), "Home".to_string())
            }
            Source::Custom { path, name } => (path, name),
        };
        // Entries are identified by absolute paths.
        let path = std::path::absolute(&path)?.to_string_lossy().to_string();

        let root_exists = matches!(filesystem.is_dir(&path).await, Ok(true));
        let metadata = filesystem.metadata(&path).await.ok();
        let root = Directory::new(name, PathBuf::from(&path), None, metadata.as_ref());

        let mut browser = Self {
            filesystem,
            settings,
            root: root.clone(),
            root_exists,
            pages: Vec::new(),
            presented: None,
            theme: Theme::default(),
        };

        if root_exists {
            browser.push_page(root).await;
        } else if matches!(browser.filesystem.exists(&path).await, Ok(true)) {
            tracing::warn!("Root is not a directory: {}", path);
        } else {
            tracing::warn!("Root directory not found: {}", path);
        }

        Ok(browser)
    }

    /// Build a ratatui widget to render the browser. The widget can then
    /// be rendered with [`Frame::render_widget`](https://docs.rs/ratatui/latest/ratatui/terminal/struct.Frame.html#method.render_widget).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ratatui::{Terminal, backend::CrosstermBackend};
    /// use storage_browser::{Source, StorageBrowser};
    ///
    /// # tokio_test::block_on(async {
    /// let browser = StorageBrowser::new(Source::Home).await.unwrap();
    ///
    /// let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout())).unwrap();
    ///
    /// terminal.draw(|f| {
    ///     let widget = browser.widget();
    ///     f.render_widget(&widget, f.area());
    /// }).unwrap();
    /// # })
    /// ```
    #[inline]
    #[must_use]
    pub const fn widget(&self) -> impl WidgetRef + '_ {
        Renderer(self)
    }

    /// Build a stateful widget that keeps the list's scroll position between
    /// renders.
    #[inline]
    #[must_use]
    pub fn widget_stateful(&mut self) -> crate::widget::StatefulRenderer<'_, F> {
        crate::widget::StatefulRenderer(self)
    }

    /// Handles input from user and updates the state of the browser.
    /// The different inputs are interpreted as follows:
    /// - `Up`: Move the selection up.
    /// - `Down`: Move the selection down.
    /// - `Home`: Select the first entry.
    /// - `End`: Select the last entry.
    /// - `PageUp`: Scroll the selection up.
    /// - `PageDown`: Scroll the selection down.
    /// - `Left`: Close the presented file, or move to the parent page.
    /// - `Right`: Enter the selected directory, or present the selected file.
    /// - `Delete`: Delete the selected entry.
    /// - `None`: Do nothing.
    ///
    /// Nothing happens while the root error view is shown, and only `Left`
    /// is handled while a file is presented.
    pub async fn handle<I: Into<Input>>(&mut self, input: I) {
        const SCROLL_COUNT: usize = 12;

        let input = input.into();

        if self.presented.is_some() {
            if input == Input::Left {
                self.dismiss();
            }
            return;
        }

        match input {
            Input::Left => return self.back().await,
            Input::Right => return self.open_selected().await,
            Input::Delete => {
                self.delete_selected().await;
                return;
            }
            _ => {}
        }

        let Some(page) = self.pages.last_mut() else {
            return;
        };
        let len = page.files.len();

        match input {
            Input::Up => {
                if len > 0 {
                    page.selected = page.selected.wrapping_sub(1).min(len - 1);
                }
            }
            Input::Down => {
                if len > 0 {
                    page.selected = (page.selected + 1) % len;
                }
            }
            Input::Home => page.selected = 0,
            Input::End => page.selected = len.saturating_sub(1),
            Input::PageUp => page.selected = page.selected.saturating_sub(SCROLL_COUNT),
            Input::PageDown => {
                page.selected = (page.selected + SCROLL_COUNT).min(len.saturating_sub(1));
            }
            Input::Left | Input::Right | Input::Delete | Input::None => (),
        }
    }

    /// Enters the selected directory, or presents the selected file.
    pub async fn open_selected(&mut self) {
        let Some(entry) = self.current().cloned() else {
            return;
        };

        match entry {
            FileEntry::Directory(directory) => self.push_page(directory).await,
            FileEntry::File(file) => self.present(file).await,
        }
    }

    /// Presents `file` with its preview.
    pub async fn present(&mut self, file: File) {
        let preview = preview::preview(self.filesystem.as_ref(), &file, &self.settings.preview).await;
        self.presented = Some(FilePage { file, preview });
    }

    /// Closes the presented file page, if any.
    #[inline]
    pub fn dismiss(&mut self) {
        self.presented = None;
    }

    /// Goes back to the parent page. Does nothing on the root page.
    pub async fn back(&mut self) {
        if self.pages.len() <= 1 {
            return;
        }

        self.pages.pop();
        if let Some(page) = self.pages.last_mut() {
            page.refresh().await;
        }
    }

    /// Deletes the selected entry of the current page.
    ///
    /// Returns `false` if nothing is selected or the delete failed; the
    /// entry then stays in the list.
    pub async fn delete_selected(&mut self) -> bool {
        let Some(page) = self.pages.last_mut() else {
            return false;
        };
        let Some(entry) = page.current().cloned() else {
            return false;
        };

        if !page.provider.remove(&entry).await {
            return false;
        }

        page.files.retain(|file| file != &entry);
        page.clamp_selection();
        true
    }

    /// Marks the current listing stale and reads the directory again.
    pub async fn reload(&mut self) {
        if let Some(page) = self.pages.last_mut() {
            page.provider.invalidate().await;
            page.refresh().await;
        }
    }

    /// Returns the `file://` URL to hand to the host's share mechanism: the
    /// presented file, or else the selected entry if it is a file.
    #[must_use]
    pub fn share_target(&self) -> Option<Url> {
        let file = match &self.presented {
            Some(page) => page.file(),
            None => self.current()?.as_file()?,
        };
        preview::file_url(file.path())
    }

    /// Sets the theme of the browser.
    #[inline]
    pub fn set_theme(&mut self, theme: Theme<F>) {
        self.theme = theme;
    }

    /// Returns the theme of the browser.
    #[inline]
    #[must_use]
    pub const fn theme(&self) -> &Theme<F> {
        &self.theme
    }

    /// Returns the settings of the browser.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the root directory.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> &Directory {
        &self.root
    }

    /// Returns the root directory, or why it can't be browsed.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::RootNotFound`] if the root was missing or not
    /// a directory when the browser was created.
    pub fn try_root(&self) -> BrowserResult<&Directory> {
        if self.root_exists {
            Ok(&self.root)
        } else {
            Err(BrowserError::RootNotFound(self.root.path().to_path_buf()))
        }
    }

    /// Returns `false` if the root was missing or not a directory.
    #[inline]
    #[must_use]
    pub const fn root_exists(&self) -> bool {
        self.root_exists
    }

    /// Returns the title of the visible view.
    #[must_use]
    pub fn title(&self) -> &str {
        if !self.root_exists {
            return "Error";
        }
        match (&self.presented, self.pages.last()) {
            (Some(page), _) => page.file().name(),
            (None, Some(page)) => page.directory().name(),
            (None, None) => self.root.name(),
        }
    }

    /// Returns the navigation stack, root page first.
    #[inline]
    #[must_use]
    pub fn pages(&self) -> &[DirectoryPage<F>] {
        &self.pages
    }

    /// Returns the directory of the current page.
    #[must_use]
    pub fn cwd(&self) -> Option<&Directory> {
        self.pages.last().map(DirectoryPage::directory)
    }

    /// Returns the entries of the current page.
    #[must_use]
    pub fn files(&self) -> &[FileEntry] {
        self.pages.last().map_or(&[] as &[FileEntry], DirectoryPage::files)
    }

    /// Returns the index of the selected entry on the current page.
    #[must_use]
    pub fn selected_idx(&self) -> usize {
        self.pages.last().map_or(0, DirectoryPage::selected_idx)
    }

    /// Sets the selected entry of the current page.
    ///
    /// # Panics
    ///
    /// Panics if `selected` is greater or equal to the number of entries.
    #[inline]
    pub fn set_selected_idx(&mut self, selected: usize) {
        assert!(selected < self.files().len());

        if let Some(page) = self.pages.last_mut() {
            page.selected = selected;
        }
    }

    /// Selects the entry named `name` on the current page.
    ///
    /// Returns true if the entry was found and selected, false otherwise.
    pub fn select_file(&mut self, name: &str) -> bool {
        let Some(page) = self.pages.last_mut() else {
            return false;
        };

        if let Some(index) = page.files.iter().position(|f| f.name() == name) {
            page.selected = index;
            true
        } else {
            false
        }
    }

    /// Returns the selected entry of the current page.
    #[must_use]
    pub fn current(&self) -> Option<&FileEntry> {
        self.pages.last().and_then(DirectoryPage::current)
    }

    /// Returns the presented file page, if any.
    #[inline]
    #[must_use]
    pub const fn presented(&self) -> Option<&FilePage> {
        self.presented.as_ref()
    }

    /// Returns the current scroll offset of the list.
    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.pages.last().map_or(0, |page| page.scroll_offset)
    }

    pub(crate) fn set_scroll_offset(&mut self, offset: usize) {
        if let Some(page) = self.pages.last_mut() {
            page.scroll_offset = offset;
        }
    }

    async fn push_page(&mut self, directory: Directory) {
        let provider = ContentsProvider::new(
            self.filesystem.clone(),
            directory,
            self.settings.sorting_strategy,
        );
        let mut page = DirectoryPage::new(provider);
        page.refresh().await;
        self.pages.push(page);
    }
}

impl StorageBrowser<LocalFileSystem> {
    /// Creates a browser over the local filesystem with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::HomeUnavailable`] if `source` is
    /// [`Source::Home`] and no home directory can be determined.
    pub async fn new(source: Source) -> BrowserResult<Self> {
        Self::with_settings(source, Settings::default()).await
    }

    /// Creates a browser over the local filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::HomeUnavailable`] if `source` is
    /// [`Source::Home`] and no home directory can be determined.
    pub async fn with_settings(source: Source, settings: Settings) -> BrowserResult<Self> {
        Self::with_fs(Arc::new(LocalFileSystem), source, settings).await
    }
}
