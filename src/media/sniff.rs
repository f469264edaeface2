//! Content type detection from downloaded bytes.

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_GIF: &str = "image/gif";
pub const MIME_HEIC: &str = "image/heic";
pub const MIME_HEIF: &str = "image/heif";
pub const MIME_MP4: &str = "video/mp4";
pub const MIME_QUICKTIME: &str = "video/quicktime";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Detect the MIME type of `bytes`.
///
/// Known photo and video signatures are checked first, then a few other
/// common formats, then the extension of `filename` if one is given.
/// Anything unrecognised is treated as JPEG.
pub fn detect_mime_type(bytes: &[u8], filename: Option<&str>) -> String {
    if let Some(mime) = sniff_known(bytes).or_else(|| sniff_generic(bytes)) {
        return mime.to_string();
    }

    if let Some(name) = filename {
        if let Some(mime) = mime_guess::from_path(name).first() {
            return mime.essence_str().to_string();
        }
    }

    MIME_JPEG.to_string()
}

/// File extension (with leading dot) for a MIME type.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        MIME_PNG => ".png",
        MIME_HEIC => ".heic",
        MIME_HEIF => ".heif",
        MIME_MP4 => ".mp4",
        MIME_QUICKTIME => ".mov",
        MIME_GIF => ".gif",
        _ => ".jpg",
    }
}

/// File extension for downloaded content.
pub fn extension_for_content(bytes: &[u8], filename: Option<&str>) -> &'static str {
    extension_for_mime(&detect_mime_type(bytes, filename))
}

fn sniff_known(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(MIME_JPEG);
    }

    if bytes.starts_with(&PNG_SIGNATURE) {
        return Some(MIME_PNG);
    }

    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        let brand = &bytes[8..12];
        return Some(match brand {
            b"heic" => MIME_HEIC,
            b"heif" => MIME_HEIF,
            _ if &brand[..2] == b"qt" => MIME_QUICKTIME,
            _ => MIME_MP4,
        });
    }

    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some(MIME_GIF);
    }

    None
}

fn sniff_generic(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(b"BM") && bytes.len() >= 14 {
        return Some("image/bmp");
    }
    if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
        return Some("image/tiff");
    }
    if bytes.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    None
}
