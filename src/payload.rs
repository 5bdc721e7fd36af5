use base64::Engine;

use crate::error::AppError;

/// Drops a `data:<mime>;base64,` prefix when the client sent a data URL.
pub fn strip_data_url_prefix(encoded: &str) -> &str {
    match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    }
}

pub fn decode_base64_payload(encoded: &str) -> Result<Vec<u8>, AppError> {
    let payload = strip_data_url_prefix(encoded).trim();
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
    Ok(bytes)
}

/// Mime type announced by a data URL, if any.
pub fn data_url_mime(encoded: &str) -> Option<&str> {
    let header = encoded.strip_prefix("data:")?.split_once(',')?.0;
    let mime = header.split(';').next()?;
    (!mime.is_empty()).then_some(mime)
}

/// Extension after the last dot, `jpg` when the name has none.
pub fn file_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "jpg",
    }
}

pub fn image_mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}
