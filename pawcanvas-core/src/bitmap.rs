//! Decoded RGBA pixel buffers.

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{CanvasError, CanvasResult};

/// A decoded image: 8-bit RGBA, row-major, no padding.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBitmap")]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    #[serde(serialize_with = "encode_pixels")]
    pixels: Vec<u8>,
}

#[derive(Deserialize)]
struct RawBitmap {
    width: u32,
    height: u32,
    #[serde(deserialize_with = "decode_pixels")]
    pixels: Vec<u8>,
}

impl TryFrom<RawBitmap> for Bitmap {
    type Error = CanvasError;

    fn try_from(raw: RawBitmap) -> CanvasResult<Self> {
        Self::from_rgba(raw.width, raw.height, raw.pixels)
    }
}

impl Bitmap {
    /// Wrap an RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] if either dimension is zero or the
    /// buffer length does not match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> CanvasResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::Validation(format!(
                "bitmap must not be empty ({width}x{height})"
            )));
        }
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(CanvasError::Validation(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a bitmap filled with one color.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] if either dimension is zero.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> CanvasResult<Self> {
        let count = (width as usize) * (height as usize);
        let pixels = rgba.iter().copied().cycle().take(count * 4).collect();
        Self::from_rgba(width, height, pixels)
    }

    /// Raw RGBA bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable RGBA bytes. The length is fixed.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consume the bitmap and return its buffer.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The pixel at `(x, y)`, if in range.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

fn encode_pixels<S: Serializer>(pixels: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(pixels))
}

fn decode_pixels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(serde::de::Error::custom)
}
