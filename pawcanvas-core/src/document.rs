//! The canvas document: an ordered stack of objects on a fixed-size surface.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    Bitmap, CanvasError, CanvasObject, CanvasResult, Filter, ImageData, ObjectId, ObjectKind,
    ObjectSpec, Origin, Point, Transform, TransformPatch,
};

/// Default surface width in pixels.
pub const DEFAULT_WIDTH: f64 = 600.0;
/// Default surface height in pixels.
pub const DEFAULT_HEIGHT: f64 = 600.0;
/// Default background color.
pub const DEFAULT_BACKGROUND: &str = "#f0f0f0";
/// Name suffix carried by filtered images.
pub const FILTERED_SUFFIX: &str = " (Filtered)";
/// Name suffix carried by images with the background removed.
pub const NO_BG_SUFFIX: &str = " (No BG)";
/// Name given to the raster restored from a saved edit.
pub const LOADED_IMAGE_NAME: &str = "Loaded Image";

/// Surface dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Construction parameters for a [`CanvasDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Surface width in pixels.
    pub width: f64,
    /// Surface height in pixels.
    pub height: f64,
    /// Background color, also used after `clear`.
    pub background: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

/// Pan and zoom applied when displaying the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    /// Zoom factor (1.0 = 100%).
    pub zoom: f64,
    /// Horizontal pan in screen pixels.
    pub pan_x: f64,
    /// Vertical pan in screen pixels.
    pub pan_y: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ViewportTransform {
    /// Shift the view by a screen-space delta.
    pub fn relative_pan(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Back to identity.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether no pan or zoom is applied.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Convert a screen point to surface coordinates.
    #[must_use]
    pub fn to_surface(&self, x: f64, y: f64) -> Point {
        Point::new((x - self.pan_x) / self.zoom, (y - self.pan_y) / self.zoom)
    }
}

/// Surface presets offered by the aspect control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// The size the document was created with.
    #[serde(rename = "original")]
    Original,
    /// 600x600.
    #[serde(rename = "1:1")]
    Square,
    /// 480x600.
    #[serde(rename = "4:5")]
    Portrait,
    /// 600x338.
    #[serde(rename = "16:9")]
    Widescreen,
}

impl AspectRatio {
    /// Surface size for this preset.
    #[must_use]
    pub fn size(self, original: Size) -> Size {
        match self {
            Self::Original => original,
            Self::Square => Size::new(600.0, 600.0),
            Self::Portrait => Size::new(480.0, 600.0),
            Self::Widescreen => Size::new(600.0, 338.0),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "1:1" => Ok(Self::Square),
            "4:5" => Ok(Self::Portrait),
            "16:9" => Ok(Self::Widescreen),
            other => Err(CanvasError::Validation(format!(
                "unknown aspect ratio: {other}"
            ))),
        }
    }
}

/// Stacking change for one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderOp {
    /// One step toward the front.
    BringForward,
    /// One step toward the back.
    SendBackward,
    /// Front-most.
    BringToFront,
    /// Back-most.
    SendToBack,
}

/// How an imported raster is sized and named.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    /// Fraction of the surface the image may cover on its longer side.
    pub target_fraction: f64,
    /// Explicit layer name.
    pub name: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            target_fraction: 0.5,
            name: None,
        }
    }
}

impl ImportOptions {
    /// Set the fit fraction.
    #[must_use]
    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.target_fraction = fraction;
        self
    }

    /// Set the layer name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Persistable form of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// Surface dimensions at save time.
    #[serde(default)]
    pub surface: Size,
    /// Background color.
    #[serde(default = "default_background")]
    pub background: String,
    /// Objects in paint order.
    #[serde(default)]
    pub objects: Vec<CanvasObject>,
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

/// Metadata stored next to a saved edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditMetadata {
    /// Filter that was active when saving.
    pub filters: Option<Filter>,
    /// Document snapshot.
    pub objects: DocumentSnapshot,
}

/// A saved edit as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEdit {
    /// Backend id.
    pub id: u64,
    /// Where the flattened PNG can be fetched.
    pub edited_image_url: String,
    /// Metadata saved with the image, if any.
    #[serde(default)]
    pub edit_metadata: Option<EditMetadata>,
}

/// Claim on an image object for a long-running remote edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteTicket {
    /// Document generation when the ticket was issued.
    pub generation: u64,
    /// Object the result will replace.
    pub target: ObjectId,
}

/// An editable canvas.
#[derive(Debug, Clone)]
pub struct CanvasDocument {
    surface: Size,
    original_surface: Size,
    default_background: String,
    background: String,
    /// Paint order, back to front.
    objects: Vec<CanvasObject>,
    active: Option<ObjectId>,
    viewport: ViewportTransform,
    applied_filter: Option<Filter>,
    revision: u64,
    generation: u64,
    /// Selection and pointer events for existing and newly added objects.
    interactive: bool,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new(DocumentConfig::default())
    }
}

impl CanvasDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new(config: DocumentConfig) -> Self {
        let surface = Size::new(config.width, config.height);
        Self {
            surface,
            original_surface: surface,
            background: config.background.clone(),
            default_background: config.background,
            objects: Vec::new(),
            active: None,
            viewport: ViewportTransform::default(),
            applied_filter: None,
            revision: 0,
            generation: 0,
            interactive: true,
        }
    }

    /// Current surface size.
    #[must_use]
    pub fn surface(&self) -> Size {
        self.surface
    }

    /// Background color.
    #[must_use]
    pub fn background(&self) -> &str {
        &self.background
    }

    /// Objects in paint order (last is front-most).
    #[must_use]
    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the document has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Selected object id.
    #[must_use]
    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    /// Selected object.
    #[must_use]
    pub fn active_object(&self) -> Option<&CanvasObject> {
        self.active.and_then(|id| self.object(id))
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> ViewportTransform {
        self.viewport
    }

    /// Last filter applied through [`CanvasDocument::apply_filter`].
    #[must_use]
    pub fn applied_filter(&self) -> Option<Filter> {
        self.applied_filter
    }

    /// Mutation counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bumped whenever the document is wiped.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn index_of(&self, id: ObjectId) -> CanvasResult<usize> {
        self.objects
            .iter()
            .position(|o| o.id == id)
            .ok_or(CanvasError::NotFound(id))
    }

    fn object_mut(&mut self, id: ObjectId) -> CanvasResult<&mut CanvasObject> {
        let idx = self.index_of(id)?;
        Ok(&mut self.objects[idx])
    }

    /// Add an object in front of everything and select it.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] if the geometry is unusable.
    pub fn add_object(&mut self, spec: ObjectSpec) -> CanvasResult<ObjectId> {
        let mut object = spec.build(self.objects.len() + 1)?;
        object.selectable = self.interactive;
        object.interactive = self.interactive;
        let id = object.id;
        tracing::debug!("Adding {} ({id})", object.name);
        self.objects.push(object);
        if self.interactive {
            self.active = Some(id);
        }
        self.touch();
        Ok(id)
    }

    /// Remove an object.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotFound`] if the id is unknown.
    pub fn remove_object(&mut self, id: ObjectId) -> CanvasResult<CanvasObject> {
        let idx = self.index_of(id)?;
        let removed = self.objects.remove(idx);
        if self.active == Some(id) {
            self.active = None;
        }
        tracing::debug!("Removed {} ({id})", removed.name);
        self.touch();
        Ok(removed)
    }

    /// Delete the selected object, if any.
    pub fn remove_active(&mut self) -> Option<CanvasObject> {
        let id = self.active?;
        self.remove_object(id).ok()
    }

    /// Change an object's stacking position.
    ///
    /// Moves at the boundary are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotFound`] if the id is unknown.
    pub fn reorder(&mut self, id: ObjectId, op: ReorderOp) -> CanvasResult<()> {
        let idx = self.index_of(id)?;
        let last = self.objects.len() - 1;
        let target = match op {
            ReorderOp::BringForward => (idx + 1).min(last),
            ReorderOp::SendBackward => idx.saturating_sub(1),
            ReorderOp::BringToFront => last,
            ReorderOp::SendToBack => 0,
        };
        if target == idx {
            return Ok(());
        }
        let object = self.objects.remove(idx);
        self.objects.insert(target, object);
        tracing::debug!("Reordered {id}: {idx} -> {target}");
        self.touch();
        Ok(())
    }

    /// Update position, scale or rotation.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotFound`] if the id is unknown, or
    /// [`CanvasError::Validation`] for non-finite values.
    pub fn set_transform(&mut self, id: ObjectId, patch: TransformPatch) -> CanvasResult<()> {
        let values = [patch.left, patch.top, patch.scale_x, patch.scale_y, patch.angle];
        if values.iter().flatten().any(|v| !v.is_finite()) {
            return Err(CanvasError::Validation(
                "transform values must be finite".to_string(),
            ));
        }
        self.object_mut(id)?.patch_transform(&patch);
        self.touch();
        Ok(())
    }

    /// Recolor a shape or text. Images are left alone and report `false`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotFound`] if the id is unknown.
    pub fn set_fill(&mut self, id: ObjectId, color: &str) -> CanvasResult<bool> {
        let object = self.object_mut(id)?;
        if !object.kind.has_fill() {
            return Ok(false);
        }
        object.fill = Some(color.to_string());
        self.touch();
        Ok(true)
    }

    /// Rename an object.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotFound`] if the id is unknown.
    pub fn rename(&mut self, id: ObjectId, name: impl Into<String>) -> CanvasResult<()> {
        self.object_mut(id)?.name = name.into();
        self.touch();
        Ok(())
    }

    /// Make an object the active one.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotFound`] if the id is unknown.
    pub fn select(&mut self, id: ObjectId) -> CanvasResult<()> {
        self.index_of(id)?;
        self.active = Some(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.active = None;
    }

    /// Change the background color.
    pub fn set_background(&mut self, color: impl Into<String>) {
        self.background = color.into();
        self.touch();
    }

    /// Reset pan and zoom.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Pan the viewport by a screen-space delta.
    pub fn relative_pan(&mut self, dx: f64, dy: f64) {
        self.viewport.relative_pan(dx, dy);
    }

    /// Toggle selection and pointer events on every object, including
    /// objects added while the setting is in force.
    pub fn set_interactive(&mut self, enabled: bool) {
        self.interactive = enabled;
        for object in &mut self.objects {
            object.selectable = enabled;
            object.interactive = enabled;
        }
    }

    /// Whether objects currently accept selection and pointer events.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Topmost interactive object under a surface point.
    #[must_use]
    pub fn object_at(&self, x: f64, y: f64) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.interactive && o.contains_point(x, y))
            .map(|o| o.id)
    }

    /// Add a raster, fitted to the surface and centered.
    ///
    /// The image is added on top of whatever is there.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] if the fraction is not in `(0, 1]`.
    pub fn import_image(
        &mut self,
        bitmap: Bitmap,
        options: ImportOptions,
    ) -> CanvasResult<ObjectId> {
        let f = options.target_fraction;
        if f.is_nan() || f <= 0.0 || f > 1.0 {
            return Err(CanvasError::Validation(format!(
                "target fraction must be within (0, 1], got {f}"
            )));
        }
        let scale = (f * self.surface.width / f64::from(bitmap.width))
            .min(f * self.surface.height / f64::from(bitmap.height));
        let center = self.surface.center();
        let transform = Transform {
            left: center.x,
            top: center.y,
            scale_x: scale,
            scale_y: scale,
            angle: 0.0,
            origin: Origin::Center,
        };

        let mut spec = ObjectSpec::image(bitmap).with_transform(transform);
        spec.name = options.name;
        let id = self.add_object(spec)?;
        tracing::debug!("Imported image {id} at scale {scale:.3}");
        Ok(id)
    }

    /// Resolve which image an image operation should act on.
    ///
    /// Explicit id, then the active image, then the back-most image.
    fn image_target(&self, explicit: Option<ObjectId>) -> CanvasResult<ObjectId> {
        if let Some(id) = explicit {
            let object = self.object(id).ok_or(CanvasError::NotFound(id))?;
            if !object.is_image() {
                return Err(CanvasError::NoTarget(format!("{} is not an image", object.name)));
            }
            return Ok(id);
        }
        self.active_object()
            .filter(|o| o.is_image())
            .or_else(|| self.objects.iter().find(|o| o.is_image()))
            .map(|o| o.id)
            .ok_or_else(|| {
                tracing::warn!("No image to operate on");
                CanvasError::NoTarget("select an image or add one first".to_string())
            })
    }

    /// Filter an image from its original pixels, replacing it in place.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoTarget`] if no image qualifies, or
    /// [`CanvasError::NotFound`] for an unknown explicit id.
    pub fn apply_filter(
        &mut self,
        target: Option<ObjectId>,
        filter: Filter,
    ) -> CanvasResult<ObjectId> {
        let id = self.image_target(target)?;
        let object = self.object_mut(id)?;
        let Some(data) = object.image_mut() else {
            return Err(CanvasError::NoTarget(format!("{id} is not an image")));
        };
        data.current = filter.apply(&data.original);
        data.filter = filter;

        let base = object
            .name
            .strip_suffix(FILTERED_SUFFIX)
            .unwrap_or(&object.name)
            .to_string();
        object.name = if filter.is_normal() {
            base
        } else {
            format!("{base}{FILTERED_SUFFIX}")
        };
        tracing::debug!("Applied {filter} to {id}");

        self.applied_filter = Some(filter);
        if self.interactive {
            self.active = Some(id);
        }
        self.touch();
        Ok(id)
    }

    /// Resize the surface to an aspect preset.
    ///
    /// Resets the viewport and re-centers the back-most object.
    pub fn change_surface_aspect(&mut self, aspect: AspectRatio) {
        self.viewport.reset();
        self.surface = aspect.size(self.original_surface);
        let center = self.surface.center();
        if let Some(first) = self.objects.first_mut() {
            first.center_on(center);
        }
        for object in &mut self.objects {
            object.refresh_bounds();
        }
        tracing::debug!(
            "Surface is now {}x{}",
            self.surface.width,
            self.surface.height
        );
        self.touch();
    }

    /// Capture the persistable state.
    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            surface: self.surface,
            background: self.background.clone(),
            objects: self.objects.clone(),
        }
    }

    /// Rebuild a document from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Validation`] for duplicate ids or objects that
    /// would be rejected by [`CanvasDocument::add_object`].
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> CanvasResult<Self> {
        let mut seen = HashSet::new();
        for object in &snapshot.objects {
            if !seen.insert(object.id) {
                return Err(CanvasError::Validation(format!(
                    "duplicate object id {}",
                    object.id
                )));
            }
            object.validate()?;
        }

        let mut doc = Self::new(DocumentConfig::default());
        doc.surface = snapshot.surface;
        doc.original_surface = snapshot.surface;
        doc.background = snapshot.background;
        doc.objects = snapshot.objects;
        for object in &mut doc.objects {
            object.refresh_bounds();
        }
        Ok(doc)
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(&self.snapshot()).map_err(CanvasError::Serialization)
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the snapshot is invalid.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let snapshot: DocumentSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Remove everything and start over.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.active = None;
        self.applied_filter = None;
        self.background.clone_from(&self.default_background);
        self.viewport.reset();
        self.generation += 1;
        self.touch();
        tracing::debug!("Cleared document (generation {})", self.generation);
    }

    /// Replace the document with a saved edit's flattened image.
    ///
    /// Only the raster and the background come back; saved vector objects
    /// are not rehydrated because they are already baked into the image.
    ///
    /// # Errors
    ///
    /// Propagates errors from the import or the saved filter.
    pub fn load_saved_edit(
        &mut self,
        bitmap: Bitmap,
        metadata: Option<&EditMetadata>,
    ) -> CanvasResult<ObjectId> {
        self.clear();
        if let Some(meta) = metadata {
            self.background.clone_from(&meta.objects.background);
        }
        let id = self.import_image(
            bitmap,
            ImportOptions::default()
                .with_fraction(0.8)
                .with_name(LOADED_IMAGE_NAME),
        )?;
        if let Some(filter) = metadata.and_then(|m| m.filters) {
            self.apply_filter(Some(id), filter)?;
        }
        tracing::info!("Loaded saved edit into {id}");
        Ok(id)
    }

    /// Start a remote edit on an image.
    ///
    /// # Errors
    ///
    /// Same target rules as [`CanvasDocument::apply_filter`].
    pub fn begin_remote(&self, target: Option<ObjectId>) -> CanvasResult<RemoteTicket> {
        let target = self.image_target(target)?;
        Ok(RemoteTicket {
            generation: self.generation,
            target,
        })
    }

    /// Whether a ticket still refers to a live image.
    #[must_use]
    pub fn ticket_is_current(&self, ticket: &RemoteTicket) -> bool {
        ticket.generation == self.generation
            && self.object(ticket.target).is_some_and(CanvasObject::is_image)
    }

    /// Commit a remote result for a ticket.
    ///
    /// Returns `Ok(None)` and leaves the document untouched if the ticket is
    /// stale. The new pixels become the image's original.
    ///
    /// # Errors
    ///
    /// Currently infallible for a current ticket; the result type matches the
    /// other mutating operations.
    pub fn complete_image_replacement(
        &mut self,
        ticket: &RemoteTicket,
        bitmap: Bitmap,
        suffix: &str,
    ) -> CanvasResult<Option<ObjectId>> {
        if !self.ticket_is_current(ticket) {
            tracing::warn!("Discarding stale result for {}", ticket.target);
            return Ok(None);
        }
        let interactive = self.interactive;
        let object = self.object_mut(ticket.target)?;
        object.kind = ObjectKind::Image(ImageData::new(bitmap));
        object.selectable = interactive;
        object.interactive = interactive;
        if !object.name.ends_with(suffix) {
            object.name.push_str(suffix);
        }
        object.refresh_bounds();
        self.touch();
        Ok(Some(ticket.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(w: u32, h: u32) -> Bitmap {
        Bitmap::solid(w, h, [200, 150, 100, 255]).expect("bitmap")
    }

    #[test]
    fn test_add_names_and_selects() {
        let mut doc = CanvasDocument::default();
        let a = doc.add_object(ObjectSpec::rectangle(100.0, 100.0)).expect("add");
        let b = doc.add_object(ObjectSpec::circle(50.0)).expect("add");
        assert_eq!(doc.object(a).map(|o| o.name.as_str()), Some("Rectangle 1"));
        assert_eq!(doc.object(b).map(|o| o.name.as_str()), Some("Circle 2"));
        assert_eq!(doc.active(), Some(b));
        assert_eq!(doc.revision(), 2);
    }

    #[test]
    fn test_rejected_add_changes_nothing() {
        let mut doc = CanvasDocument::default();
        assert!(doc.add_object(ObjectSpec::circle(0.0)).is_err());
        assert!(doc.is_empty());
        assert_eq!(doc.revision(), 0);
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let mut doc = CanvasDocument::default();
        doc.add_object(ObjectSpec::rectangle(1.0, 1.0)).expect("add");
        let before = doc.revision();
        let missing = ObjectId::new();
        assert!(matches!(
            doc.remove_object(missing),
            Err(CanvasError::NotFound(id)) if id == missing
        ));
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.revision(), before);
    }

    #[test]
    fn test_remove_active() {
        let mut doc = CanvasDocument::default();
        doc.add_object(ObjectSpec::rectangle(1.0, 1.0)).expect("add");
        assert!(doc.remove_active().is_some());
        assert!(doc.active().is_none());
        assert!(doc.remove_active().is_none());
    }

    #[test]
    fn test_reorder_moves() {
        let mut doc = CanvasDocument::default();
        let ids: Vec<_> = (0..3)
            .map(|_| doc.add_object(ObjectSpec::rectangle(1.0, 1.0)).expect("add"))
            .collect();
        let order = |d: &CanvasDocument| d.objects().iter().map(|o| o.id).collect::<Vec<_>>();

        doc.reorder(ids[0], ReorderOp::BringForward).expect("reorder");
        assert_eq!(order(&doc), [ids[1], ids[0], ids[2]]);

        doc.reorder(ids[2], ReorderOp::SendToBack).expect("reorder");
        assert_eq!(order(&doc), [ids[2], ids[1], ids[0]]);

        let rev = doc.revision();
        doc.reorder(ids[0], ReorderOp::BringToFront).expect("reorder");
        doc.reorder(ids[2], ReorderOp::SendBackward).expect("reorder");
        assert_eq!(order(&doc), [ids[2], ids[1], ids[0]]);
        assert_eq!(doc.revision(), rev);
    }

    #[test]
    fn test_set_fill_skips_images() {
        let mut doc = CanvasDocument::default();
        let img = doc.import_image(bitmap(4, 4), ImportOptions::default()).expect("import");
        let rect = doc.add_object(ObjectSpec::rectangle(1.0, 1.0)).expect("add");
        assert!(!doc.set_fill(img, "#00ff00").expect("fill"));
        assert!(doc.set_fill(rect, "#00ff00").expect("fill"));
        assert_eq!(doc.object(rect).and_then(|o| o.fill.as_deref()), Some("#00ff00"));
        assert!(doc.object(img).and_then(|o| o.fill.as_deref()).is_none());
    }

    #[test]
    fn test_import_fits_half_surface() {
        let mut doc = CanvasDocument::default();
        let id = doc.import_image(bitmap(1200, 600), ImportOptions::default()).expect("import");
        let obj = doc.object(id).expect("object");
        assert!((obj.transform.scale_x - 0.25).abs() < 1e-9);
        assert_eq!(obj.transform.origin, Origin::Center);
        assert!((obj.bounds.width() - 300.0).abs() < 1e-9);
        let c = obj.bounds.center();
        assert!((c.x - 300.0).abs() < 1e-9 && (c.y - 300.0).abs() < 1e-9);
        assert_eq!(obj.name, "Image 1");
    }

    #[test]
    fn test_second_import_is_additive() {
        let mut doc = CanvasDocument::default();
        doc.import_image(bitmap(10, 10), ImportOptions::default()).expect("import");
        doc.import_image(bitmap(10, 10), ImportOptions::default()).expect("import");
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_filter_in_place_and_revert() {
        let mut doc = CanvasDocument::default();
        let back = doc.add_object(ObjectSpec::rectangle(1.0, 1.0)).expect("add");
        let img = doc.import_image(bitmap(2, 2), ImportOptions::default()).expect("import");
        doc.add_object(ObjectSpec::circle(5.0)).expect("add");
        let original = doc
            .object(img)
            .and_then(CanvasObject::image)
            .expect("image")
            .original
            .clone();

        let id = doc.apply_filter(None, Filter::Sepia).expect("filter");
        assert_eq!(id, img);
        assert_eq!(doc.objects()[1].id, img);
        assert_eq!(doc.objects()[0].id, back);
        let id = doc.apply_filter(None, Filter::Grayscale).expect("filter");
        let obj = doc.object(id).expect("object");
        assert_eq!(obj.name, "Image 2 (Filtered)");
        assert_eq!(doc.applied_filter(), Some(Filter::Grayscale));

        doc.apply_filter(Some(img), Filter::Normal).expect("filter");
        let obj = doc.object(img).expect("object");
        assert_eq!(obj.name, "Image 2");
        assert_eq!(obj.image().map(|d| &d.current), Some(&original));
    }

    #[test]
    fn test_filter_without_image_is_no_target() {
        let mut doc = CanvasDocument::default();
        let rect = doc.add_object(ObjectSpec::rectangle(1.0, 1.0)).expect("add");
        assert!(matches!(
            doc.apply_filter(None, Filter::Sepia),
            Err(CanvasError::NoTarget(_))
        ));
        assert!(matches!(
            doc.apply_filter(Some(rect), Filter::Sepia),
            Err(CanvasError::NoTarget(_))
        ));
    }

    #[test]
    fn test_aspect_resizes_and_recenters_first() {
        let mut doc = CanvasDocument::default();
        let first = doc.add_object(ObjectSpec::rectangle(100.0, 50.0).at(10.0, 10.0)).expect("add");
        doc.relative_pan(40.0, -20.0);

        doc.change_surface_aspect(AspectRatio::Widescreen);
        assert_eq!(doc.surface(), Size::new(600.0, 338.0));
        assert!(doc.viewport().is_identity());
        let c = doc.object(first).expect("object").bounds.center();
        assert!((c.x - 300.0).abs() < 1e-9 && (c.y - 169.0).abs() < 1e-9);

        doc.change_surface_aspect(AspectRatio::Original);
        assert_eq!(doc.surface(), Size::new(600.0, 600.0));
    }

    #[test]
    fn test_aspect_names_parse() {
        assert_eq!("4:5".parse::<AspectRatio>().ok(), Some(AspectRatio::Portrait));
        assert!("3:2".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_clear_bumps_generation_and_resets_background() {
        let mut doc = CanvasDocument::default();
        doc.set_background("#000000");
        doc.add_object(ObjectSpec::rectangle(1.0, 1.0)).expect("add");
        doc.clear();
        assert!(doc.is_empty());
        assert_eq!(doc.background(), DEFAULT_BACKGROUND);
        assert_eq!(doc.generation(), 1);
    }

    #[test]
    fn test_load_saved_edit_uses_metadata() {
        let mut doc = CanvasDocument::default();
        doc.add_object(ObjectSpec::rectangle(1.0, 1.0)).expect("add");
        let meta = EditMetadata {
            filters: Some(Filter::Sepia),
            objects: DocumentSnapshot {
                surface: Size::default(),
                background: "#abcdef".to_string(),
                objects: Vec::new(),
            },
        };
        let id = doc.load_saved_edit(bitmap(100, 50), Some(&meta)).expect("load");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.background(), "#abcdef");
        let obj = doc.object(id).expect("object");
        assert_eq!(obj.name, "Loaded Image (Filtered)");
        assert!((obj.transform.scale_x - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut doc = CanvasDocument::default();
        let img = doc.import_image(bitmap(2, 2), ImportOptions::default()).expect("import");
        let ticket = doc.begin_remote(None).expect("ticket");
        assert_eq!(ticket.target, img);

        doc.clear();
        let out = doc
            .complete_image_replacement(&ticket, bitmap(3, 3), NO_BG_SUFFIX)
            .expect("complete");
        assert!(out.is_none());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_replacement_keeps_transform() {
        let mut doc = CanvasDocument::default();
        let img = doc.import_image(bitmap(2, 2), ImportOptions::default()).expect("import");
        doc.apply_filter(None, Filter::Sepia).expect("filter");
        let before = doc.object(img).expect("object").transform;
        let ticket = doc.begin_remote(Some(img)).expect("ticket");
        let fresh = Bitmap::solid(2, 2, [1, 2, 3, 0]).expect("bitmap");
        let out = doc
            .complete_image_replacement(&ticket, fresh.clone(), NO_BG_SUFFIX)
            .expect("complete");
        assert_eq!(out, Some(img));
        let obj = doc.object(img).expect("object");
        assert_eq!(obj.transform, before);
        assert_eq!(obj.name, "Image 1 (Filtered) (No BG)");
        assert_eq!(obj.image().map(|d| &d.original), Some(&fresh));
    }

    #[test]
    fn test_object_at_prefers_front() {
        let mut doc = CanvasDocument::default();
        doc.add_object(ObjectSpec::rectangle(100.0, 100.0)).expect("add");
        let front = doc.add_object(ObjectSpec::rectangle(50.0, 50.0)).expect("add");
        assert_eq!(doc.object_at(10.0, 10.0), Some(front));
        doc.set_interactive(false);
        assert_eq!(doc.object_at(10.0, 10.0), None);
    }

    #[test]
    fn test_snapshot_rejects_duplicate_ids() {
        let mut doc = CanvasDocument::default();
        doc.add_object(ObjectSpec::rectangle(1.0, 1.0)).expect("add");
        let mut snap = doc.snapshot();
        snap.objects.push(snap.objects[0].clone());
        assert!(matches!(
            CanvasDocument::from_snapshot(snap),
            Err(CanvasError::Validation(_))
        ));
    }
}
