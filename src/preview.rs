//! File preview dispatch.
//!
//! [`preview`] picks a preview kind from the file's extension and loads what
//! the view needs to display it. It never fails: unreadable or undecodable
//! files become [`FilePreview::Unsupported`].

use std::io::Cursor;
use std::path::Path;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use url::Url;

use crate::entry::File;
use crate::filesystem::FileSystem;

/// Appended to text previews that were cut at the maximum length.
pub const ELLIPSIS: &str = "...";

/// Character encoding used to decode text previews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    Ascii,
    Latin1,
}

impl TextEncoding {
    /// Decodes `bytes`, returning `None` if they are not valid in this encoding.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Self::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
            Self::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
            Self::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().copied().map(char::from).collect()),
            Self::Latin1 => Some(bytes.iter().copied().map(char::from).collect()),
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }

    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Settings used when previewing file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewSettings {
    /// Encoding used to decode text previews.
    #[serde(default)]
    pub encoding: TextEncoding,
    /// Maximum number of characters shown before a text preview is cut.
    #[serde(default = "default_max_string_preview_length")]
    pub max_string_preview_length: usize,
}

fn default_max_string_preview_length() -> usize {
    1000
}

impl PreviewSettings {
    #[inline]
    #[must_use]
    pub const fn new(encoding: TextEncoding, max_string_preview_length: usize) -> Self {
        Self {
            encoding,
            max_string_preview_length,
        }
    }
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self::new(TextEncoding::Utf8, default_max_string_preview_length())
    }
}

/// Raster image formats decoded in process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// The matching `image` crate format.
    #[must_use]
    pub const fn format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// What the browser can show for a file.
#[derive(Debug, Clone, PartialEq)]
pub enum FilePreview {
    /// Raw bytes of a raster image.
    Image { kind: ImageKind, data: Vec<u8> },
    /// A file the host renders with an embedded web view (`webp`).
    Web(Url),
    /// A GPU texture container the host loads itself (`ktx`).
    Texture(Url),
    /// A property list with a dictionary root.
    PropertyList(plist::Dictionary),
    /// Decoded text, cut at the configured length and suffixed with [`ELLIPSIS`].
    Text(String),
    /// Nothing can be shown for this file.
    Unsupported,
}

/// Builds the preview of `file`.
///
/// The dispatch key is the lowercased text after the last `.` of the name:
/// - `png`, `jpg`, `jpeg`: the file bytes as an image.
/// - `webp`: a file URL for a web view.
/// - `ktx`: a file URL for a texture loader.
/// - `plist`: the decoded dictionary, trying XML then binary.
/// - anything else, including names without a `.`: text decoded with
///   `settings.encoding`.
pub async fn preview<F: FileSystem>(
    filesystem: &F,
    file: &File,
    settings: &PreviewSettings,
) -> FilePreview {
    let path = file.path().to_string_lossy().to_string();

    let preview = match file.extension().as_deref() {
        Some("png") => read(filesystem, &path).await.map(|data| FilePreview::Image {
            kind: ImageKind::Png,
            data,
        }),
        Some("jpg" | "jpeg") => read(filesystem, &path).await.map(|data| FilePreview::Image {
            kind: ImageKind::Jpeg,
            data,
        }),
        Some("webp") => file_url(file.path()).map(FilePreview::Web),
        Some("ktx") => file_url(file.path()).map(FilePreview::Texture),
        Some("plist") => read(filesystem, &path)
            .await
            .and_then(|data| decode_property_list(&data))
            .map(FilePreview::PropertyList),
        _ => read(filesystem, &path)
            .await
            .and_then(|data| settings.encoding.decode(&data))
            .map(|text| FilePreview::Text(truncate(text, settings.max_string_preview_length))),
    };

    preview.unwrap_or_else(|| {
        tracing::debug!("No preview available for {}", path);
        FilePreview::Unsupported
    })
}

async fn read<F: FileSystem>(filesystem: &F, path: &str) -> Option<Vec<u8>> {
    match filesystem.read(path).await {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::debug!("Can't read file for preview: {}: {}", path, e);
            None
        }
    }
}

/// Returns the `file://` URL of an absolute path.
#[must_use]
pub fn file_url(path: &Path) -> Option<Url> {
    Url::from_file_path(path).ok()
}

/// Decodes a property list whose root is a dictionary, trying XML first and
/// the binary format second.
#[must_use]
pub fn decode_property_list(data: &[u8]) -> Option<plist::Dictionary> {
    if let Some(dictionary) = plist::Value::from_reader_xml(data)
        .ok()
        .and_then(plist::Value::into_dictionary)
    {
        return Some(dictionary);
    }

    if !data.starts_with(b"bplist") {
        return None;
    }

    plist::Value::from_reader(Cursor::new(data))
        .ok()
        .and_then(plist::Value::into_dictionary)
}

/// Keeps the first `max_length` characters of `text`, appending [`ELLIPSIS`]
/// when anything was cut.
///
/// Characters are extended grapheme clusters, so combined emoji and accented
/// letters are never split.
#[must_use]
pub fn truncate(text: String, max_length: usize) -> String {
    match text.grapheme_indices(true).nth(max_length) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{EntryKind, LocalFileSystem, Metadata};
    use std::fs;
    use tempfile::TempDir;

    const XML_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Name</key>
    <string>demo</string>
    <key>Count</key>
    <integer>3</integer>
</dict>
</plist>
"#;

    fn file_at(path: &Path) -> File {
        let metadata = Metadata {
            kind: EntryKind::File,
            len: 0,
            allocated: None,
            created: None,
            modified: None,
            is_symlink: false,
        };
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        File::new(name, path, path.parent().map(Path::to_path_buf), &metadata)
    }

    async fn preview_of(tmp: &TempDir, name: &str, contents: &[u8]) -> FilePreview {
        preview_with(tmp, name, contents, &PreviewSettings::default()).await
    }

    async fn preview_with(
        tmp: &TempDir,
        name: &str,
        contents: &[u8],
        settings: &PreviewSettings,
    ) -> FilePreview {
        let path = tmp.path().join(name);
        fs::write(&path, contents).unwrap();
        preview(&LocalFileSystem, &file_at(&path), settings).await
    }

    #[tokio::test]
    async fn extension_matching_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();

        let png = preview_of(&tmp, "a.PNG", b"\x89PNG fake").await;
        assert_eq!(
            png,
            FilePreview::Image {
                kind: ImageKind::Png,
                data: b"\x89PNG fake".to_vec()
            }
        );

        let jpeg = preview_of(&tmp, "photo.JpEg", b"jpeg bytes").await;
        assert!(matches!(
            jpeg,
            FilePreview::Image {
                kind: ImageKind::Jpeg,
                ..
            }
        ));

        let jpg = preview_of(&tmp, "photo.jpg", b"jpg bytes").await;
        assert!(matches!(
            jpg,
            FilePreview::Image {
                kind: ImageKind::Jpeg,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn name_without_extension_goes_through_text_path() {
        let tmp = TempDir::new().unwrap();

        let notes = preview_of(&tmp, "notes", b"remember the milk").await;
        assert_eq!(notes, FilePreview::Text("remember the milk".to_string()));
    }

    #[tokio::test]
    async fn long_text_is_cut_with_ellipsis() {
        let tmp = TempDir::new().unwrap();
        let text = "x".repeat(5000);

        let preview = preview_with(
            &tmp,
            "long.txt",
            text.as_bytes(),
            &PreviewSettings::new(TextEncoding::Utf8, 1000),
        )
        .await;

        let FilePreview::Text(shown) = preview else {
            panic!("expected text preview, got {preview:?}");
        };
        assert_eq!(shown.chars().count(), 1000 + ELLIPSIS.len());
        assert!(shown.ends_with(ELLIPSIS));
        assert_eq!(&shown[..1000], &text[..1000]);
    }

    #[tokio::test]
    async fn text_at_exact_limit_is_untouched() {
        let tmp = TempDir::new().unwrap();
        let text = "y".repeat(10);

        let preview = preview_with(
            &tmp,
            "exact.md",
            text.as_bytes(),
            &PreviewSettings::new(TextEncoding::Utf8, 10),
        )
        .await;

        assert_eq!(preview, FilePreview::Text(text));
    }

    #[tokio::test]
    async fn invalid_text_is_unsupported() {
        let tmp = TempDir::new().unwrap();

        let preview = preview_of(&tmp, "blob.bin", &[0xff, 0xfe, 0x00, 0xc3]).await;
        assert_eq!(preview, FilePreview::Unsupported);
    }

    #[tokio::test]
    async fn configured_encoding_is_used_for_text() {
        let tmp = TempDir::new().unwrap();
        let utf16: Vec<u8> = "héllo"
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();

        let preview = preview_with(
            &tmp,
            "wide.txt",
            &utf16,
            &PreviewSettings::new(TextEncoding::Utf16Le, 1000),
        )
        .await;

        assert_eq!(preview, FilePreview::Text("héllo".to_string()));
    }

    #[tokio::test]
    async fn xml_plist_decodes_to_dictionary() {
        let tmp = TempDir::new().unwrap();

        let preview = preview_of(&tmp, "Info.plist", XML_PLIST.as_bytes()).await;
        let FilePreview::PropertyList(dictionary) = preview else {
            panic!("expected property list, got {preview:?}");
        };
        assert_eq!(
            dictionary.get("Name").and_then(plist::Value::as_string),
            Some("demo")
        );
    }

    #[tokio::test]
    async fn binary_plist_decodes_to_dictionary() {
        let tmp = TempDir::new().unwrap();
        let mut dictionary = plist::Dictionary::new();
        dictionary.insert("Enabled".to_string(), plist::Value::Boolean(true));
        let mut data = Vec::new();
        plist::Value::Dictionary(dictionary.clone())
            .to_writer_binary(&mut data)
            .unwrap();

        let preview = preview_of(&tmp, "settings.plist", &data).await;
        assert_eq!(preview, FilePreview::PropertyList(dictionary));
    }

    #[tokio::test]
    async fn corrupt_plist_is_unsupported() {
        let tmp = TempDir::new().unwrap();

        let preview = preview_of(&tmp, "broken.plist", b"<plist><dict><key>").await;
        assert_eq!(preview, FilePreview::Unsupported);
    }

    #[test]
    fn plist_without_dictionary_root_is_rejected() {
        let array = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><array><string>a</string></array></plist>"#;
        assert!(decode_property_list(array.as_bytes()).is_none());
    }

    #[tokio::test]
    async fn webp_and_ktx_resolve_to_file_urls() {
        let tmp = TempDir::new().unwrap();

        let webp = preview_of(&tmp, "anim.webp", b"RIFF").await;
        let expected = Url::from_file_path(tmp.path().join("anim.webp")).unwrap();
        assert_eq!(webp, FilePreview::Web(expected));

        let ktx = preview_of(&tmp, "tex.KTX", b"KTX").await;
        assert!(matches!(ktx, FilePreview::Texture(url) if url.scheme() == "file"));
    }

    #[tokio::test]
    async fn missing_image_is_unsupported() {
        let tmp = TempDir::new().unwrap();
        let file = file_at(&tmp.path().join("gone.png"));

        let preview = preview(&LocalFileSystem, &file, &PreviewSettings::default()).await;
        assert_eq!(preview, FilePreview::Unsupported);
    }

    #[test]
    fn truncate_keeps_grapheme_clusters_whole() {
        let text = "e\u{301}e\u{301}e\u{301}".to_string();
        assert_eq!(truncate(text, 2), "e\u{301}e\u{301}...");
    }

    #[test]
    fn decode_rejects_invalid_input_per_encoding() {
        assert_eq!(TextEncoding::Ascii.decode(b"plain"), Some("plain".to_string()));
        assert_eq!(TextEncoding::Ascii.decode("é".as_bytes()), None);
        assert_eq!(TextEncoding::Latin1.decode(&[0xe9]), Some("é".to_string()));
        assert_eq!(TextEncoding::Utf16Be.decode(&[0x00]), None);
        assert_eq!(
            TextEncoding::Utf16Be.decode(&[0x00, 0x68, 0x00, 0x69]),
            Some("hi".to_string())
        );
    }
}
