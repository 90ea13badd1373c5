//! Layer list derived from a document, front-most first.

use serde::{Deserialize, Serialize};

use crate::{CanvasDocument, CanvasObject, ObjectId, ObjectKind};

/// Icon shown next to a layer that has no thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerIcon {
    /// Rectangle.
    Square,
    /// Circle.
    Circle,
    /// Triangle.
    Triangle,
    /// Polygon (stars).
    Star,
    /// Path overlay.
    Palette,
    /// Text.
    Type,
    /// Raster image.
    Image,
}

impl LayerIcon {
    /// Icon for an object variant.
    #[must_use]
    pub fn for_kind(kind: &ObjectKind) -> Self {
        match kind {
            ObjectKind::Rectangle { .. } => Self::Square,
            ObjectKind::Circle { .. } => Self::Circle,
            ObjectKind::Triangle { .. } => Self::Triangle,
            ObjectKind::Polygon { .. } => Self::Star,
            ObjectKind::Path { .. } => Self::Palette,
            ObjectKind::Text { .. } => Self::Type,
            ObjectKind::Image(_) => Self::Image,
        }
    }
}

/// One row of the layers panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerEntry {
    /// Object id.
    pub id: ObjectId,
    /// Object name.
    pub name: String,
    /// Variant title (`Rectangle`, `Image`, ...).
    pub kind: &'static str,
    /// Fallback icon.
    pub icon: LayerIcon,
    /// PNG thumbnail, when a renderer supplied one.
    #[serde(skip)]
    pub thumbnail: Option<Vec<u8>>,
}

impl LayerEntry {
    /// Entry without a thumbnail.
    #[must_use]
    pub fn from_object(object: &CanvasObject) -> Self {
        Self {
            id: object.id,
            name: object.name.clone(),
            kind: object.kind.title(),
            icon: LayerIcon::for_kind(&object.kind),
            thumbnail: None,
        }
    }
}

/// Layer entries for a document, front-most first, without thumbnails.
#[must_use]
pub fn layer_entries(doc: &CanvasDocument) -> Vec<LayerEntry> {
    doc.objects().iter().rev().map(LayerEntry::from_object).collect()
}

/// Caches the layer list until the document changes.
#[derive(Debug, Clone, Default)]
pub struct LayerPanel {
    key: Option<(u64, u64)>,
    entries: Vec<LayerEntry>,
}

impl LayerPanel {
    /// Create an empty panel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entries, rebuilt only if the document changed since the last
    /// call. `thumbnail` is asked once per object on rebuild.
    pub fn entries<F>(&mut self, doc: &CanvasDocument, mut thumbnail: F) -> &[LayerEntry]
    where
        F: FnMut(&CanvasObject) -> Option<Vec<u8>>,
    {
        let key = (doc.generation(), doc.revision());
        if self.key != Some(key) {
            tracing::debug!("Rebuilding layer list at revision {}", key.1);
            self.entries = doc
                .objects()
                .iter()
                .rev()
                .map(|object| LayerEntry {
                    thumbnail: thumbnail(object),
                    ..LayerEntry::from_object(object)
                })
                .collect();
            self.key = Some(key);
        }
        &self.entries
    }

    /// Force a rebuild on the next call.
    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
