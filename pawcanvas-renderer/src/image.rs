//! Bitmap decoding and encoding.
//!
//! Uploaded photos arrive as PNG/JPEG bytes or as `data:` URIs; everything
//! downstream works on [`Bitmap`]s.

use std::path::Path;

use base64::Engine;
use image::ImageEncoder;
use pawcanvas_core::Bitmap;

use crate::error::{RenderError, RenderResult};

/// Photo formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG, keeps transparency.
    Png,
    /// JPEG, the usual camera format.
    Jpeg,
    /// Anything else; rejected on decode.
    Unknown,
}

impl ImageFormat {
    /// Guess from a file name such as `rex.JPG`.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Self::Png,
            Some("jpg" | "jpeg") => Self::Jpeg,
            _ => Self::Unknown,
        }
    }

    /// Guess from a `Content-Type` value; parameters are ignored.
    #[must_use]
    pub fn from_mime(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Self::Jpeg,
            _ => Self::Unknown,
        }
    }

    /// Sniff the leading signature bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        const PNG_SIGNATURE: &[u8] = b"\x89PNG";
        const JPEG_SOI: &[u8] = &[0xFF, 0xD8, 0xFF];
        if data.starts_with(PNG_SIGNATURE) {
            Self::Png
        } else if data.starts_with(JPEG_SOI) {
            Self::Jpeg
        } else {
            Self::Unknown
        }
    }

    /// MIME type used in data URIs and uploads.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Decode PNG or JPEG bytes into an RGBA bitmap.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the bytes are not a supported image.
pub fn decode_bitmap(data: &[u8]) -> RenderResult<Bitmap> {
    if ImageFormat::from_magic_bytes(data) == ImageFormat::Unknown {
        return Err(RenderError::Decode(
            "unrecognized image format (expected PNG or JPEG)".to_string(),
        ));
    }

    let photo = image::load_from_memory(data)
        .map_err(|e| RenderError::Decode(e.to_string()))?
        .into_rgba8();
    let (w, h) = photo.dimensions();
    tracing::debug!("Decoded {w}x{h} photo");

    Bitmap::from_rgba(w, h, photo.into_raw())
        .map_err(|e| RenderError::Decode(e.to_string()))
}

/// Decode a base64 `data:` URI, e.g. `data:image/png;base64,iVBORw0KGgo...`.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the URI is malformed or the payload is
/// not a supported image.
pub fn decode_data_uri(uri: &str) -> RenderResult<Bitmap> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Decode("not a data URI".to_string()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Decode("invalid data URI: missing comma".to_string()))?;
    if !metadata.ends_with(";base64") {
        return Err(RenderError::Decode(
            "only base64 data URIs are supported".to_string(),
        ));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| RenderError::Decode(format!("invalid base64: {e}")))?;
    decode_bitmap(&bytes)
}

/// Encode a bitmap as PNG.
///
/// # Errors
///
/// Returns [`RenderError::Encode`] if encoding fails.
pub fn encode_png(bitmap: &Bitmap) -> RenderResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            bitmap.pixels(),
            bitmap.width,
            bitmap.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;
    Ok(buf)
}

/// Wrap encoded bytes in a base64 data URI.
#[must_use]
pub fn to_data_uri(bytes: &[u8], format: ImageFormat) -> String {
    format!(
        "data:{};base64,{}",
        format.mime(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Encode a bitmap as a PNG data URI.
///
/// # Errors
///
/// Returns [`RenderError::Encode`] if encoding fails.
pub fn bitmap_to_data_uri(bitmap: &Bitmap) -> RenderResult<String> {
    Ok(to_data_uri(&encode_png(bitmap)?, ImageFormat::Png))
}

#[cfg(test)]
mod tests {
    use pawcanvas_core::CanvasError;

    use super::*;

    // 1x1 red pixel
    const RED_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_upload_format_guessing() {
        assert_eq!(ImageFormat::from_path(Path::new("rex.PNG")), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("bella.jpeg")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("whiskers")), ImageFormat::Unknown);
        assert_eq!(
            ImageFormat::from_mime("image/jpeg; charset=binary"),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), ImageFormat::Unknown);
    }

    #[test]
    fn test_data_uri_decodes() {
        let bmp = decode_data_uri(&format!("data:image/png;base64,{RED_PNG}")).expect("decode");
        assert_eq!((bmp.width, bmp.height), (1, 1));
    }

    #[test]
    fn test_rejects_malformed_data_uris() {
        assert!(decode_data_uri("not a data uri").is_err());
        assert!(decode_data_uri("data:image/png").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_png_round_trip_keeps_pixels() {
        let bmp = Bitmap::from_rgba(2, 1, vec![10, 20, 30, 255, 40, 50, 60, 128]).expect("bitmap");
        let png = encode_png(&bmp).expect("encode");
        assert_eq!(ImageFormat::from_magic_bytes(&png), ImageFormat::Png);
        assert_eq!(decode_bitmap(&png).expect("decode"), bmp);
    }

    #[test]
    fn test_garbage_maps_to_decode_error() {
        let err = decode_bitmap(b"definitely not an image").expect_err("garbage");
        assert!(matches!(CanvasError::from(err), CanvasError::Decode(_)));

        // Right magic, truncated body.
        let err = decode_bitmap(&[0x89, 0x50, 0x4E, 0x47, 0x0D]).expect_err("truncated");
        assert!(matches!(err, RenderError::Decode(_)));
    }
}
