//! An open document wired to its remote collaborators.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use pawcanvas_core::{
    CanvasDocument, CanvasError, CanvasObject, CanvasResult, EditMetadata, ObjectId, SavedEdit,
    NO_BG_SUFFIX,
};
use pawcanvas_renderer::{decode_bitmap, encode_png, DocumentExporter, RasterFormat};

use crate::api::ApiClient;
use crate::background::BackgroundRemover;
use crate::error::ClientError;

/// One editing session.
///
/// The document lock is never held across an `.await`; remote results are
/// committed through a [`pawcanvas_core::RemoteTicket`] so anything that
/// cleared or replaced the target in the meantime wins.
pub struct EditorSession {
    document: Mutex<CanvasDocument>,
    api: ApiClient,
    remover: Option<Arc<dyn BackgroundRemover>>,
    exporter: DocumentExporter,
    busy: AtomicBool,
}

/// Clears the busy flag when the operation ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EditorSession {
    /// Open a session on `document`.
    #[must_use]
    pub fn new(document: CanvasDocument, api: ApiClient) -> Self {
        Self {
            document: Mutex::new(document),
            api,
            remover: None,
            exporter: DocumentExporter::with_defaults(),
            busy: AtomicBool::new(false),
        }
    }

    /// Attach a background remover.
    #[must_use]
    pub fn with_remover(mut self, remover: Arc<dyn BackgroundRemover>) -> Self {
        self.remover = Some(remover);
        self
    }

    /// Use a custom exporter for saves.
    #[must_use]
    pub fn with_exporter(mut self, exporter: DocumentExporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// The backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Whether a background removal is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, CanvasDocument> {
        match self.document.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Run `f` against the document.
    pub fn with_document<R>(&self, f: impl FnOnce(&mut CanvasDocument) -> R) -> R {
        f(&mut self.lock())
    }

    /// Close the session and hand back the document.
    #[must_use]
    pub fn into_document(self) -> CanvasDocument {
        match self.document.into_inner() {
            Ok(doc) => doc,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Flatten the document and store it on the backend.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Render`] if export fails or
    /// [`CanvasError::RemoteService`] if the upload fails.
    pub async fn save(&self) -> CanvasResult<Option<SavedEdit>> {
        let (png, metadata) = {
            let doc = self.lock();
            let png = self.exporter.export_raster(&doc, RasterFormat::Png, 1.0)?;
            let metadata = EditMetadata {
                filters: doc.applied_filter(),
                objects: doc.snapshot(),
            };
            (png, metadata)
        };
        Ok(self.api.save_edit(png, &metadata).await?)
    }

    /// Saved edits for the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::RemoteService`] if the listing fails.
    pub async fn recent_edits(&self) -> CanvasResult<Vec<SavedEdit>> {
        Ok(self.api.list_edits().await?)
    }

    /// Replace the document with a saved edit.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::RemoteService`] if the download fails or
    /// [`CanvasError::Decode`] if the image is unreadable. The document is
    /// untouched in both cases.
    pub async fn load_edit(&self, edit: &SavedEdit) -> CanvasResult<ObjectId> {
        let bytes = self.api.fetch_image(&edit.edited_image_url).await?;
        let bitmap = decode_bitmap(&bytes)?;
        self.lock()
            .load_saved_edit(bitmap, edit.edit_metadata.as_ref())
    }

    /// Strip the background from the active (or first) image.
    ///
    /// Returns `Ok(None)` if the document moved on while the request was
    /// out and the result was discarded.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Busy`] while another removal is running,
    /// [`CanvasError::NoTarget`] without an image, or
    /// [`CanvasError::RemoteService`] if the service fails. The document is
    /// unchanged on error.
    pub async fn remove_background(&self) -> CanvasResult<Option<ObjectId>> {
        let remover = self
            .remover
            .clone()
            .ok_or_else(|| CanvasError::from(ClientError::NoBackgroundRemover))?;
        let _busy = BusyGuard::acquire(&self.busy).ok_or(CanvasError::Busy)?;

        let (ticket, png) = {
            let doc = self.lock();
            let ticket = doc.begin_remote(None)?;
            let image = doc
                .object(ticket.target)
                .and_then(CanvasObject::image)
                .ok_or(CanvasError::NotFound(ticket.target))?;
            (ticket, encode_png(&image.current)?)
        };
        tracing::info!("Removing background from {}", ticket.target);

        let result = remover.remove_background(png).await?;
        let bitmap = decode_bitmap(&result).map_err(|e| {
            CanvasError::RemoteService(format!("background removal returned {e}"))
        })?;

        self.lock()
            .complete_image_replacement(&ticket, bitmap, NO_BG_SUFFIX)
    }
}
