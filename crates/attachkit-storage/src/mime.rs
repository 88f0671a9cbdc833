//! Content-based MIME type detection.
//!
//! Magic numbers are checked first; the file extension is only consulted
//! when the content is not recognized.

/// Number of leading bytes needed by [`sniff`].
pub const SNIFF_LEN: usize = 512;

/// Fallback for unrecognized binary content.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Reported for zero-length files.
pub const EMPTY: &str = "application/x-empty";

/// Classify `head` (the leading bytes of a file) into a MIME type.
///
/// `file_name` is only used as a fallback hint.
pub fn detect(head: &[u8], file_name: &str) -> String {
    if head.is_empty() {
        return EMPTY.to_string();
    }
    if let Some(mime) = sniff(head) {
        return mime.to_string();
    }

    let guessed = mime_guess::from_path(file_name).first_raw();
    if looks_like_text(head) {
        return match guessed {
            Some(mime) if is_textual(mime) => mime.to_string(),
            _ => "text/plain".to_string(),
        };
    }
    guessed.unwrap_or(OCTET_STREAM).to_string()
}

/// Recognize well-known binary signatures and markup prologues.
pub fn sniff(data: &[u8]) -> Option<&'static str> {
    // Raster images
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if is_bmp(data) {
        return Some("image/bmp");
    }
    if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        return Some("image/tiff");
    }
    if data.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        return Some("image/vnd.microsoft.icon");
    }

    // RIFF containers
    if data.len() >= 12 && data.starts_with(b"RIFF") {
        match &data[8..12] {
            b"WEBP" => return Some("image/webp"),
            b"WAVE" => return Some("audio/x-wav"),
            b"AVI " => return Some("video/x-msvideo"),
            _ => {}
        }
    }

    // ISO base media (ftyp box at offset 4)
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return Some(match &data[8..12] {
            b"qt  " => "video/quicktime",
            b"M4A " => "audio/mp4",
            b"avif" => "image/avif",
            b"heic" | b"heix" => "image/heic",
            _ => "video/mp4",
        });
    }
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some("video/webm");
    }

    // Audio
    if data.starts_with(b"ID3") || data.starts_with(&[0xFF, 0xFB]) {
        return Some("audio/mpeg");
    }
    if data.starts_with(b"OggS") {
        return Some("audio/ogg");
    }
    if data.starts_with(b"fLaC") {
        return Some("audio/flac");
    }

    // Documents and archives
    if data.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    if data.starts_with(b"PK\x03\x04") || data.starts_with(b"PK\x05\x06") {
        return Some("application/zip");
    }
    if data.starts_with(&[0x1F, 0x8B]) {
        return Some("application/gzip");
    }
    if data.starts_with(&[b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C]) {
        return Some("application/x-7z-compressed");
    }
    if data.starts_with(b"Rar!\x1A\x07") {
        return Some("application/vnd.rar");
    }

    sniff_markup(data)
}

/// `BM`, zero reserved header bytes, and a known DIB header size.
fn is_bmp(data: &[u8]) -> bool {
    if data.len() < 18 || !data.starts_with(b"BM") || data[6..10] != [0, 0, 0, 0] {
        return false;
    }
    let dib_size = u32::from_le_bytes([data[14], data[15], data[16], data[17]]);
    matches!(dib_size, 12 | 40 | 52 | 56 | 108 | 124)
}

fn sniff_markup(data: &[u8]) -> Option<&'static str> {
    let text = std::str::from_utf8(strip_bom(data)).ok()?;
    let trimmed = text.trim_start();
    let lower = trimmed
        .get(..trimmed.len().min(256))
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    if lower.starts_with("<svg") || (lower.starts_with("<?xml") && lower.contains("<svg")) {
        return Some("image/svg+xml");
    }
    if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        return Some("text/html");
    }
    if lower.starts_with("<?xml") {
        return Some("application/xml");
    }
    None
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

/// Whether the bytes read as UTF-8 text without control characters.
///
/// A multi-byte sequence cut off at the end of the sample is tolerated.
fn looks_like_text(data: &[u8]) -> bool {
    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => match std::str::from_utf8(&data[..e.valid_up_to()]) {
            Ok(text) => text,
            Err(_) => return false,
        },
        Err(_) => return false,
    };
    text.chars()
        .all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t' | '\x0C'))
}

fn is_textual(mime: &str) -> bool {
    mime.starts_with("text/")
        || matches!(
            mime,
            "application/json" | "application/xml" | "application/javascript"
        )
}
