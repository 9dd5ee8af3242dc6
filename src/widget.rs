use std::{io::Cursor, sync::Arc};

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, HighlightSpacing, List, ListItem, ListState, Paragraph, StatefulWidget,
        Widget, WidgetRef, Wrap,
    },
};

use crate::{
    browser::FilePage,
    entry::FileEntry,
    filesystem::FileSystem,
    format::{format_byte_count, format_date},
    preview::{FilePreview, ImageKind},
    StorageBrowser,
};

type LineFactory<F> = Arc<dyn Fn(&StorageBrowser<F>) -> Line<'static> + Send + Sync>;

/// Shown in place of a size that has not been computed yet.
const UNKNOWN_SIZE: &str = "--";

pub struct Renderer<'a, F: FileSystem>(pub(crate) &'a StorageBrowser<F>);

/// A stateful renderer that can be used with render_stateful_widget.
/// This allows tracking and updating the scroll offset state.
pub struct StatefulRenderer<'a, F: FileSystem>(pub(crate) &'a mut StorageBrowser<F>);

impl<F: FileSystem> StatefulRenderer<'_, F> {
    /// Render the browser, keeping the scroll position of the directory list.
    pub fn render(self, area: Rect, buf: &mut Buffer) {
        let offset = render_browser(self.0, area, buf);
        self.0.set_scroll_offset(offset);
    }
}

impl<F: FileSystem> WidgetRef for Renderer<'_, F> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        render_browser(self.0, area, buf);
    }
}

/// Renders whichever view is visible and returns the list's scroll offset.
fn render_browser<F: FileSystem>(browser: &StorageBrowser<F>, area: Rect, buf: &mut Buffer) -> usize {
    if !browser.root_exists() {
        render_root_error(browser, area, buf);
        browser.scroll_offset()
    } else if let Some(page) = browser.presented() {
        render_file_page(browser, page, area, buf);
        browser.scroll_offset()
    } else {
        render_directory(browser, area, buf)
    }
}

fn themed_block<F: FileSystem>(browser: &StorageBrowser<F>) -> Option<Block<'static>> {
    let theme = browser.theme();
    let mut block = theme.block.clone()?;

    for title_top in theme.title_top(browser) {
        block = block.title_top(title_top);
    }
    for title_bottom in theme.title_bottom(browser) {
        block = block.title_bottom(title_bottom);
    }

    Some(block)
}

fn render_directory<F: FileSystem>(browser: &StorageBrowser<F>, area: Rect, buf: &mut Buffer) -> usize {
    let theme = browser.theme();
    let block = themed_block(browser);

    let inner = block.as_ref().map_or(area, |block| block.inner(area));
    let symbol_width = theme
        .highlight_symbol
        .as_deref()
        .map_or(0, |symbol| Span::raw(symbol).width());
    let row_width = usize::from(inner.width).saturating_sub(symbol_width);

    let mut state = ListState::default()
        .with_selected(Some(browser.selected_idx()))
        .with_offset(browser.scroll_offset());

    let highlight_style = match browser.current() {
        Some(entry) if entry.is_dir() => theme.highlight_dir_style,
        _ => theme.highlight_item_style,
    };

    let mut list = List::new(browser.files().iter().map(|entry| entry.row(theme, row_width)))
        .style(theme.style)
        .highlight_spacing(theme.highlight_spacing.clone())
        .highlight_style(highlight_style)
        .scroll_padding(theme.scroll_padding);

    if let Some(symbol) = theme.highlight_symbol.as_deref() {
        list = list.highlight_symbol(symbol);
    }
    if let Some(block) = block {
        list = list.block(block);
    }

    StatefulWidget::render(list, area, buf, &mut state);
    state.offset()
}

fn render_file_page<F: FileSystem>(
    browser: &StorageBrowser<F>,
    page: &FilePage,
    area: Rect,
    buf: &mut Buffer,
) {
    let theme = browser.theme();
    let inner = match themed_block(browser) {
        Some(block) => {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        }
        None => area,
    };

    let file = page.file();
    let mut details = vec![detail_line(theme, "Size", format_byte_count(file.size()))];
    if let Some(created) = file.created() {
        details.push(detail_line(theme, "Creation Date", format_date(created)));
    }
    if let Some(modified) = file.modified() {
        details.push(detail_line(theme, "Modification Date", format_date(modified)));
    }

    let [name_area, preview_area, details_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(details.len() as u16),
    ])
    .areas(inner);

    Paragraph::new(Line::styled(
        file.name().to_string(),
        theme.item_style.add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(name_area, buf);

    Paragraph::new(preview_text(page.preview()))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL))
        .render(preview_area, buf);

    Paragraph::new(details).render(details_area, buf);
}

fn detail_line<F: FileSystem>(theme: &Theme<F>, title: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{title}: "), theme.item_style),
        Span::styled(value, theme.size_style),
    ])
}

fn render_root_error<F: FileSystem>(browser: &StorageBrowser<F>, area: Rect, buf: &mut Buffer) {
    let theme = browser.theme();
    let block = themed_block(browser);
    let inner = block.as_ref().map_or(area, |block| block.inner(area));
    if let Some(block) = block {
        block.render(area, buf);
    }

    let [_, message_area, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let message = Text::from(vec![
        Line::styled(
            "Failed to open root directory ;(",
            theme.item_style.add_modifier(Modifier::BOLD),
        ),
        Line::default(),
        Line::styled(
            browser.root().path().display().to_string(),
            theme.size_style,
        ),
    ]);

    Paragraph::new(message)
        .alignment(Alignment::Center)
        .render(message_area, buf);
}

/// Describes a preview as text for the terminal.
///
/// Images are only probed for their dimensions; web content and textures are
/// left to the host, which gets their file URL.
#[must_use]
pub fn preview_text(preview: &FilePreview) -> Text<'static> {
    match preview {
        FilePreview::Image { kind, data } => {
            let dimensions = image::ImageReader::with_format(Cursor::new(data), kind.format())
                .into_dimensions();
            let label = match kind {
                ImageKind::Png => "PNG",
                ImageKind::Jpeg => "JPEG",
            };
            match dimensions {
                Ok((width, height)) => Text::from(format!("{label} image, {width}×{height}")),
                Err(e) => {
                    tracing::debug!("Can't decode {} image: {}", label, e);
                    placeholder()
                }
            }
        }
        FilePreview::Web(url) | FilePreview::Texture(url) => {
            Text::from(vec![Line::from("Rendered by host:"), Line::from(url.to_string())])
        }
        FilePreview::PropertyList(dictionary) => Text::from(
            dictionary
                .iter()
                .map(|(key, value)| Line::from(format!("{key} = {}", describe_plist(value))))
                .collect::<Vec<_>>(),
        ),
        FilePreview::Text(text) => Text::from(text.clone()),
        FilePreview::Unsupported => placeholder(),
    }
}

fn placeholder() -> Text<'static> {
    Text::from("?").alignment(Alignment::Center)
}

fn describe_plist(value: &plist::Value) -> String {
    match value {
        plist::Value::String(s) => format!("{s:?}"),
        plist::Value::Boolean(b) => b.to_string(),
        plist::Value::Integer(i) => i.to_string(),
        plist::Value::Real(r) => r.to_string(),
        plist::Value::Data(data) => format!("<{} bytes>", data.len()),
        plist::Value::Array(items) => format!("[{} items]", items.len()),
        plist::Value::Dictionary(entries) => format!("{{{} entries}}", entries.len()),
        other => format!("{other:?}"),
    }
}

impl FileEntry {
    /// Returns the list row for the entry: its name, then its size
    /// right-aligned within `width` columns.
    fn row<F: FileSystem>(&self, theme: &Theme<F>, width: usize) -> ListItem<'static> {
        let name_style = if self.is_dir() {
            theme.dir_style
        } else {
            theme.item_style
        };
        let size = self
            .known_byte_count()
            .map_or_else(|| UNKNOWN_SIZE.to_string(), format_byte_count);

        let name = Span::styled(self.name().to_string(), name_style);
        let used = name.width() + size.chars().count();
        let padding = " ".repeat(width.saturating_sub(used).max(1));

        ListItem::new(Line::from(vec![
            name,
            Span::raw(padding),
            Span::styled(size, theme.size_style),
        ]))
    }
}

/// The theme of the storage browser.
///
/// This struct is used to customize the look of the browser.
/// It allows to set the style of the widget, of the entries and of their sizes.
/// You can also wrap the widget in a block with the [`Theme::with_block`](#method.block)
/// method and add customizable titles to it with [`Theme::with_title_top`](#method.title_top)
/// and [`Theme::with_title_bottom`](#method.title_bottom).
#[derive(Clone, educe::Educe)]
#[educe(Debug, PartialEq, Eq, Hash)]
pub struct Theme<F: FileSystem = crate::filesystem::LocalFileSystem> {
    block: Option<Block<'static>>,
    #[educe(Debug(ignore), PartialEq(ignore), Hash(ignore))]
    title_top: Vec<LineFactory<F>>,
    #[educe(Debug(ignore), PartialEq(ignore), Hash(ignore))]
    title_bottom: Vec<LineFactory<F>>,
    style: Style,
    item_style: Style,
    dir_style: Style,
    size_style: Style,
    highlight_spacing: HighlightSpacing,
    highlight_item_style: Style,
    highlight_dir_style: Style,
    highlight_symbol: Option<String>,
    scroll_padding: usize,
}

impl<F: FileSystem> Theme<F> {
    /// Create a new empty theme.
    ///
    /// The theme will not have any style set. To get a theme with the default style, use [`Theme::default`](#method.default).
    ///
    /// # Example
    /// ```no_run
    /// # use storage_browser::Theme;
    /// let theme: Theme = Theme::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            block: None,
            title_top: Vec::new(),
            title_bottom: Vec::new(),
            style: Style::new(),
            item_style: Style::new(),
            dir_style: Style::new(),
            size_style: Style::new(),
            highlight_spacing: HighlightSpacing::WhenSelected,
            highlight_item_style: Style::new(),
            highlight_dir_style: Style::new(),
            highlight_symbol: None,
            scroll_padding: 0,
        }
    }

    /// Add a top title showing the title of the visible view: the directory
    /// name, the presented file name, or "Error".
    ///
    /// ```plaintext
    /// ┌Documents─────────────────────────┐
    /// │ Photos                      4 MB │
    /// │ passport.png              820 KB │
    /// │ resume.pdf                 96 KB │
    /// └──────────────────────────────────┘
    /// ```
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn add_default_title(self) -> Self {
        self.with_title_top(|browser: &StorageBrowser<F>| Line::from(browser.title().to_string()))
    }

    /// Wrap the browser with a custom [`Block`](https://docs.rs/ratatui/latest/ratatui/widgets/block/struct.Block.html) widget.
    ///
    /// # Example
    /// ```no_run
    /// # use ratatui::widgets::*;
    /// # use storage_browser::Theme;
    /// let theme: Theme = Theme::default().with_block(Block::default().borders(Borders::ALL));
    /// ```
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_block(mut self, block: Block<'static>) -> Self {
        self.block = Some(block);
        self
    }

    /// Set the style of the widget.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_style<S: Into<Style>>(mut self, style: S) -> Self {
        self.style = style.into();
        self
    }

    /// Set the style of file names. To set the style of the directories, use [`Theme::with_dir_style`](#method.dir_style).
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_item_style<S: Into<Style>>(mut self, item_style: S) -> Self {
        self.item_style = item_style.into();
        self
    }

    /// Set the style of directory names. To set the style of the files, use [`Theme::with_item_style`](#method.item_style).
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_dir_style<S: Into<Style>>(mut self, dir_style: S) -> Self {
        self.dir_style = dir_style.into();
        self
    }

    /// Set the style of sizes, dates and other secondary text.
    ///
    /// # Example
    /// ```no_run
    /// # use ratatui::prelude::*;
    /// # use storage_browser::Theme;
    /// let theme: Theme = Theme::default().with_size_style(Style::default().fg(Color::Gray));
    /// ```
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_size_style<S: Into<Style>>(mut self, size_style: S) -> Self {
        self.size_style = size_style.into();
        self
    }

    /// Set the style of the highlighted row when it is a file.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_highlight_item_style<S: Into<Style>>(mut self, highlight_item_style: S) -> Self {
        self.highlight_item_style = highlight_item_style.into();
        self
    }

    /// Set the style of the highlighted row when it is a directory.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_highlight_dir_style<S: Into<Style>>(mut self, highlight_dir_style: S) -> Self {
        self.highlight_dir_style = highlight_dir_style.into();
        self
    }

    /// Set the symbol used to highlight the selected item.
    ///
    /// Behind the scene, it use the [List::highlight_symbol](https://docs.rs/ratatui/latest/ratatui/widgets/struct.List.html#method.highlight_symbol) method. See its documentation for more.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_highlight_symbol(mut self, highlight_symbol: &str) -> Self {
        self.highlight_symbol = Some(highlight_symbol.to_owned());
        self
    }

    /// Set the spacing between the highlighted item and the other items.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_highlight_spacing(mut self, highlight_spacing: HighlightSpacing) -> Self {
        self.highlight_spacing = highlight_spacing;
        self
    }

    /// Sets the number of items around the currently selected item that should be kept visible.
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_scroll_padding(mut self, scroll_padding: usize) -> Self {
        self.scroll_padding = scroll_padding;
        self
    }

    /// Add a top title factory to the theme.
    ///
    /// `title_top` is a function that take a reference to the current [`StorageBrowser`] and returns
    /// a [`Line`](https://docs.rs/ratatui/latest/ratatui/text/struct.Line.html)
    /// to be displayed as a title at the top of the wrapping block (if it exist). You can call
    /// this function multiple times to add multiple titles.
    ///
    /// # Example
    /// ```no_run
    /// use ratatui::prelude::*;
    /// # use storage_browser::{StorageBrowser, Theme};
    /// let theme = Theme::default()
    ///     .with_title_top(|browser: &StorageBrowser| {
    ///         Line::from(format!("{} entries", browser.files().len())).right_aligned()
    ///     });
    /// ```
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_title_top(
        mut self,
        title_top: impl Fn(&StorageBrowser<F>) -> Line<'static> + 'static + Send + Sync,
    ) -> Self {
        self.title_top.push(Arc::new(title_top));
        self
    }

    /// Add a bottom title factory to the theme. See [`Theme::with_title_top`](#method.title_top).
    #[inline]
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_title_bottom(
        mut self,
        title_bottom: impl Fn(&StorageBrowser<F>) -> Line<'static> + 'static + Send + Sync,
    ) -> Self {
        self.title_bottom.push(Arc::new(title_bottom));
        self
    }

    /// Returns the wrapping block (if it exist) of the theme.
    #[inline]
    #[must_use]
    pub const fn block(&self) -> Option<&Block<'static>> {
        self.block.as_ref()
    }

    /// Returns the style of the widget of the theme.
    #[inline]
    #[must_use]
    pub const fn style(&self) -> &Style {
        &self.style
    }

    /// Returns the style of file names.
    #[inline]
    #[must_use]
    pub const fn item_style(&self) -> &Style {
        &self.item_style
    }

    /// Returns the style of directory names.
    #[inline]
    #[must_use]
    pub const fn dir_style(&self) -> &Style {
        &self.dir_style
    }

    /// Returns the style of sizes and other secondary text.
    #[inline]
    #[must_use]
    pub const fn size_style(&self) -> &Style {
        &self.size_style
    }

    /// Returns the symbol used to highlight the selected item of the theme.
    #[inline]
    #[must_use]
    pub fn highlight_symbol(&self) -> Option<&str> {
        self.highlight_symbol.as_deref()
    }

    /// Returns the generated top titles of the theme.
    #[inline]
    #[must_use]
    pub fn title_top(&self, browser: &StorageBrowser<F>) -> Vec<Line<'static>> {
        self.title_top
            .iter()
            .map(|title_top| title_top(browser))
            .collect()
    }

    /// Returns the generated bottom titles of the theme.
    #[inline]
    #[must_use]
    pub fn title_bottom(&self, browser: &StorageBrowser<F>) -> Vec<Line<'static>> {
        self.title_bottom
            .iter()
            .map(|title_bottom| title_bottom(browser))
            .collect()
    }
}

impl<F: FileSystem> Default for Theme<F> {
    /// Return a slightly customized default theme. To get a theme with no style set, use [`Theme::new`](#method.new).
    ///
    /// The theme will have a block with all borders titled with the visible
    /// view, white file names, light blue directory names, gray sizes and a
    /// dark gray background for the highlighted row.
    fn default() -> Self {
        Self {
            block: Some(Block::default().borders(Borders::ALL)),
            title_top: Vec::new(),
            title_bottom: Vec::new(),
            style: Style::default(),
            item_style: Style::default().fg(Color::White),
            dir_style: Style::default().fg(Color::LightBlue),
            size_style: Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            highlight_spacing: HighlightSpacing::Always,
            highlight_item_style: Style::default().fg(Color::White).bg(Color::DarkGray),
            highlight_dir_style: Style::default().fg(Color::LightBlue).bg(Color::DarkGray),
            highlight_symbol: None,
            scroll_padding: 0,
        }
        .add_default_title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Settings, Source};
    use std::fs;
    use tempfile::TempDir;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn render(browser: &StorageBrowser) -> String {
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        browser.widget().render_ref(area, &mut buf);
        buffer_text(&buf)
    }

    #[tokio::test]
    async fn directory_rows_show_name_and_size() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.txt"), "0123456789").unwrap();
        let browser = StorageBrowser::new(Source::custom(tmp.path().to_string_lossy(), "Root"))
            .await
            .unwrap();

        let screen = render(&browser);
        assert!(screen.contains("Root"));
        let row = screen.lines().find(|line| line.contains("b.txt")).unwrap();
        assert!(row.trim_end_matches('│').trim_end().ends_with("10 bytes"), "{row}");
    }

    #[tokio::test]
    async fn sizes_stay_right_aligned_with_a_multibyte_highlight_symbol() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.txt"), "0123456789").unwrap();
        let mut browser = StorageBrowser::new(Source::custom(tmp.path().to_string_lossy(), "Root"))
            .await
            .unwrap();
        browser.set_theme(Theme::default().with_highlight_symbol("▶ "));

        let screen = render(&browser);
        let row = screen.lines().find(|line| line.contains("b.txt")).unwrap();
        assert!(row.contains("▶ b.txt"), "{row}");
        assert!(row.ends_with("10 bytes│"), "{row}");
    }

    #[tokio::test]
    async fn missing_root_renders_error_view() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let browser = StorageBrowser::new(Source::custom(missing.to_string_lossy(), "Nope"))
            .await
            .unwrap();

        let screen = render(&browser);
        assert!(screen.contains("Error"));
        assert!(screen.contains("Failed to open root directory ;("));
    }

    #[tokio::test]
    async fn file_page_shows_preview_and_details() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("note.txt"), "hello there").unwrap();
        let mut browser = StorageBrowser::with_settings(
            Source::custom(tmp.path().to_string_lossy(), "Root"),
            Settings::default(),
        )
        .await
        .unwrap();
        browser.open_selected().await;

        let screen = render(&browser);
        assert!(screen.contains("note.txt"));
        assert!(screen.contains("hello there"));
        assert!(screen.contains("Size: 11 bytes"));
        assert!(screen.contains("Modification Date: "));
    }

    #[test]
    fn undecodable_image_falls_back_to_placeholder() {
        let text = preview_text(&FilePreview::Image {
            kind: ImageKind::Png,
            data: b"not a png".to_vec(),
        });
        assert_eq!(text, placeholder());
    }

    #[test]
    fn property_list_lines_describe_values() {
        let mut dictionary = plist::Dictionary::new();
        dictionary.insert("Name".to_string(), plist::Value::String("demo".to_string()));
        dictionary.insert("Flags".to_string(), plist::Value::Array(vec![]));

        let text = preview_text(&FilePreview::PropertyList(dictionary));
        let mut lines: Vec<String> = text.lines.iter().map(ToString::to_string).collect();
        lines.sort();
        assert_eq!(lines, vec!["Flags = [0 items]", "Name = \"demo\""]);
    }
}
