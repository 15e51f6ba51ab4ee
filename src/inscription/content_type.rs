//! Content type resolution for inscribed files
//!
//! The file extension decides first. Textual types get an explicit UTF-8
//! charset so browsers render the decoded body correctly. Unknown extensions
//! fall back to magic-byte detection, and anything unrecognised is served as
//! `application/octet-stream`.
//!
//! ```rust
//! use darinals::inscription::content_type::{resolve, ContentKind};
//! use std::path::Path;
//!
//! assert_eq!(resolve(Path::new("note.txt"), b"hi"), "text/plain; charset=utf-8");
//!
//! let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
//! assert_eq!(ContentKind::detect(&png), Some(ContentKind::Png));
//! assert_eq!(resolve(Path::new("blob"), &png), "image/png");
//! ```

use std::path::Path;

/// Fallback for unrecognised content
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension to media type
const EXTENSIONS: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("text", "text/plain"),
    ("md", "text/markdown"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("ico", "image/x-icon"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("glb", "model/gltf-binary"),
    ("woff2", "font/woff2"),
];

/// Media type for a file, with charset for textual types
pub fn resolve(path: &Path, data: &[u8]) -> String {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            let ext = ext.to_ascii_lowercase();
            EXTENSIONS
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        });

    let mime = by_extension
        .or_else(|| ContentKind::detect(data).map(|kind| kind.mime_type()))
        .unwrap_or(OCTET_STREAM);

    with_charset(mime)
}

/// Append `; charset=utf-8` to textual media types
pub fn with_charset(mime: &str) -> String {
    if is_textual(mime) && !mime.contains("charset") {
        format!("{}; charset=utf-8", mime)
    } else {
        mime.to_string()
    }
}

fn is_textual(mime: &str) -> bool {
    mime.starts_with("text/")
        || matches!(
            mime,
            "application/json" | "application/javascript" | "application/xml"
        )
}

/// Formats recognisable from their leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Png,
    Jpeg,
    Gif,
    WebP,
    Svg,
    Pdf,
    Mp3,
    Wav,
    Ogg,
    Flac,
    Mp4,
    WebM,
    Zip,
    Gzip,
    Json,
    Text,
}

impl ContentKind {
    /// Detect a format from leading bytes
    ///
    /// Binary signatures are checked before textual heuristics; valid UTF-8
    /// without control characters counts as plain text.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        let signature = if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ContentKind::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ContentKind::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ContentKind::Gif)
        } else if riff(data, b"WEBP") {
            Some(ContentKind::WebP)
        } else if riff(data, b"WAVE") {
            Some(ContentKind::Wav)
        } else if data.starts_with(b"%PDF") {
            Some(ContentKind::Pdf)
        } else if data.starts_with(b"ID3") {
            Some(ContentKind::Mp3)
        } else if data.starts_with(b"OggS") {
            Some(ContentKind::Ogg)
        } else if data.starts_with(b"fLaC") {
            Some(ContentKind::Flac)
        } else if data.len() >= 12 && &data[4..8] == b"ftyp" {
            Some(ContentKind::Mp4)
        } else if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
            Some(ContentKind::WebM)
        } else if data.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            Some(ContentKind::Zip)
        } else if data.starts_with(&[0x1F, 0x8B, 0x08]) {
            Some(ContentKind::Gzip)
        } else {
            None
        };
        if signature.is_some() {
            return signature;
        }

        let text = std::str::from_utf8(data).ok()?;
        if text
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        {
            return None;
        }

        let trimmed = text.trim_start();
        if trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && trimmed.contains("<svg"))
        {
            Some(ContentKind::Svg)
        } else if (trimmed.starts_with('{') || trimmed.starts_with('['))
            && serde_json::from_str::<serde_json::Value>(text).is_ok()
        {
            Some(ContentKind::Json)
        } else {
            Some(ContentKind::Text)
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentKind::Png => "image/png",
            ContentKind::Jpeg => "image/jpeg",
            ContentKind::Gif => "image/gif",
            ContentKind::WebP => "image/webp",
            ContentKind::Svg => "image/svg+xml",
            ContentKind::Pdf => "application/pdf",
            ContentKind::Mp3 => "audio/mpeg",
            ContentKind::Wav => "audio/wav",
            ContentKind::Ogg => "audio/ogg",
            ContentKind::Flac => "audio/flac",
            ContentKind::Mp4 => "video/mp4",
            ContentKind::WebM => "video/webm",
            ContentKind::Zip => "application/zip",
            ContentKind::Gzip => "application/gzip",
            ContentKind::Json => "application/json",
            ContentKind::Text => "text/plain",
        }
    }
}

fn riff(data: &[u8], form: &[u8; 4]) -> bool {
    data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == form
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_wins() {
        assert_eq!(resolve(Path::new("a.PNG"), b"not a png"), "image/png");
        assert_eq!(
            resolve(Path::new("data.json"), b"{}"),
            "application/json; charset=utf-8"
        );
        assert_eq!(
            resolve(Path::new("app.js"), b"let x = 1;"),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(
            resolve(Path::new("index.html"), b"<p>"),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_magic_byte_fallback() {
        assert_eq!(resolve(Path::new("image"), b"GIF89a...."), "image/gif");
        assert_eq!(resolve(Path::new("doc.unknown"), b"%PDF-1.7"), "application/pdf");
        assert_eq!(
            resolve(Path::new("noext"), br#"{"p":"dar-20"}"#),
            "application/json; charset=utf-8"
        );
    }

    #[test]
    fn test_octet_stream_fallback() {
        assert_eq!(resolve(Path::new("blob.bin"), &[0x00, 0x01, 0xfe]), OCTET_STREAM);
        assert_eq!(resolve(Path::new("empty"), &[]), OCTET_STREAM);
    }

    #[test]
    fn test_text_detection() {
        assert_eq!(ContentKind::detect(b"hello\nworld"), Some(ContentKind::Text));
        assert_eq!(
            ContentKind::detect(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
            Some(ContentKind::Svg)
        );
        assert_eq!(ContentKind::detect(b"{not json"), Some(ContentKind::Text));
        assert_eq!(ContentKind::detect(&[0xff, 0xfe, 0x00]), None);
    }

    #[test]
    fn test_riff_forms() {
        let mut webp = b"RIFF\0\0\0\0WEBPVP8 ".to_vec();
        assert_eq!(ContentKind::detect(&webp), Some(ContentKind::WebP));
        webp[8..12].copy_from_slice(b"WAVE");
        assert_eq!(ContentKind::detect(&webp), Some(ContentKind::Wav));
    }

    #[test]
    fn test_charset_not_duplicated() {
        assert_eq!(
            with_charset("text/plain;charset=utf-8"),
            "text/plain;charset=utf-8"
        );
        assert_eq!(with_charset("image/png"), "image/png");
    }
}
