use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageFormat;
use thiserror::Error;

/// Avatars are stored no larger than this on either side.
pub const AVATAR_MAX_DIMENSION: u32 = 256;
const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("expected a base64 image data URL")]
    NotADataUrl,
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("image data is not valid base64")]
    InvalidBase64,
    #[error("image exceeds the 4 MiB upload limit")]
    TooLarge,
    #[error("could not decode image: {0}")]
    Decode(String),
}

pub struct ProcessedImage {
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

/// Split `data:image/png;base64,...` into its MIME type and decoded bytes.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>), ImageError> {
    let rest = data_url
        .trim()
        .strip_prefix("data:")
        .ok_or(ImageError::NotADataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(ImageError::NotADataUrl)?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or(ImageError::NotADataUrl)?
        .to_ascii_lowercase();

    if !matches!(mime.as_str(), "image/png" | "image/jpeg" | "image/jpg") {
        return Err(ImageError::UnsupportedType(mime));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| ImageError::InvalidBase64)?;
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ImageError::TooLarge);
    }
    Ok((mime, bytes))
}

/// Decode an uploaded avatar, shrink it to fit [`AVATAR_MAX_DIMENSION`] and
/// re-encode it as PNG. Smaller images keep their size.
pub fn process_avatar(data_url: &str) -> Result<ProcessedImage, ImageError> {
    let (_, bytes) = decode_data_url(data_url)?;
    let img = image::load_from_memory(&bytes).map_err(|e| ImageError::Decode(e.to_string()))?;

    let img = if img.width() > AVATAR_MAX_DIMENSION || img.height() > AVATAR_MAX_DIMENSION {
        img.thumbnail(AVATAR_MAX_DIMENSION, AVATAR_MAX_DIMENSION)
    } else {
        img
    };

    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    Ok(ProcessedImage {
        content_type: "image/png",
        data,
    })
}
