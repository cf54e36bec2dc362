use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbImage;

use crate::error::DecodeError;

/// Separator between a data-URL header (`data:image/jpeg;base64`) and the body.
const HEADER_SEPARATOR: u8 = b',';

/// Decode a data-URL or bare base64 payload into an RGB buffer.
/// Whitespace inside the base64 text, such as line wrapping, is skipped.
pub fn decode_payload(payload: &[u8]) -> Result<RgbImage, DecodeError> {
    let body: Vec<u8> = strip_header(payload)
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if body.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = STANDARD.decode(&body)?;
    decode_image_bytes(&bytes)
}

/// Decode raw encoded image bytes (PNG, JPEG, ...) into an RGB buffer.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<RgbImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Everything after the first separator, or the whole payload without one.
fn strip_header(payload: &[u8]) -> &[u8] {
    match payload.iter().position(|&b| b == HEADER_SEPARATOR) {
        Some(idx) => &payload[idx + 1..],
        None => payload,
    }
}
