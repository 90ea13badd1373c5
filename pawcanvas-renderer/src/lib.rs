//! # PawCanvas Renderer
//!
//! Turns bytes into bitmaps and documents into images.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   decode    ┌──────────────┐
//! │ PNG / JPEG   │ ──────────▶ │    Bitmap    │
//! │ data: URI    │             │  (RGBA8)     │
//! └──────────────┘             └──────────────┘
//! ┌──────────────┐    SVG      ┌──────────────┐  resvg   ┌────────────┐
//! │ Document     │ ──────────▶ │  usvg tree   │ ───────▶ │ PNG / JPEG │
//! └──────────────┘             └──────────────┘          └────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;

pub use error::{RenderError, RenderResult};
pub use export::{
    DocumentExporter, ExportConfig, RasterFormat, DOWNLOAD_FILENAME, THUMBNAIL_MULTIPLIER,
};
pub use image::{
    bitmap_to_data_uri, decode_bitmap, decode_data_uri, encode_png, to_data_uri, ImageFormat,
};
