//! # PawCanvas Core
//!
//! Document model for the PawCanvas pet photo editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               pawcanvas-core                │
//! ├─────────────────────────────────────────────┤
//! │  Document          │  Interaction           │
//! │  - Objects         │  - Pan tool            │
//! │  - Paint order     │  - Hit testing         │
//! │  - Aspect/viewport │  - Layer panel         │
//! ├─────────────────────────────────────────────┤
//! │  Filters           │  Persistence           │
//! │  - Pixel pipeline  │  - JSON snapshots      │
//! │  - Original pixels │  - Remote edit tickets │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! No I/O happens here. Decoding, rasterizing and HTTP live in the
//! `pawcanvas-renderer` and `pawcanvas-client` crates.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bitmap;
pub mod document;
pub mod error;
pub mod filter;
pub mod interaction;
pub mod layer;
pub mod object;
pub mod preset;

pub use bitmap::Bitmap;
pub use document::{
    AspectRatio, CanvasDocument, DocumentConfig, DocumentSnapshot, EditMetadata, ImportOptions,
    RemoteTicket, ReorderOp, SavedEdit, Size, ViewportTransform, DEFAULT_BACKGROUND,
    FILTERED_SUFFIX, LOADED_IMAGE_NAME, NO_BG_SUFFIX,
};
pub use error::{CanvasError, CanvasResult};
pub use filter::{Filter, FilterStep};
pub use interaction::{
    Cursor, EditorState, InteractionMode, PanState, PanTool, PointerEvent, PointerPhase,
};
pub use layer::{layer_entries, LayerEntry, LayerIcon, LayerPanel};
pub use object::{
    BoundingBox, CanvasObject, ImageData, ObjectId, ObjectKind, ObjectSpec, Origin, Point,
    Transform, TransformPatch, DEFAULT_FILL,
};
pub use preset::Preset;

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
