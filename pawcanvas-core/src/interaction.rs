//! Pointer handling: the pan tool and select-mode hit testing.

use serde::{Deserialize, Serialize};

use crate::{CanvasDocument, ObjectId, Point};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// X position on screen.
    pub x: f64,
    /// Y position on screen.
    pub y: f64,
}

impl PointerEvent {
    /// Button pressed at `(x, y)`.
    #[must_use]
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Down,
            x,
            y,
        }
    }

    /// Pointer moved to `(x, y)`.
    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Move,
            x,
            y,
        }
    }

    /// Button released at `(x, y)`.
    #[must_use]
    pub fn up(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Up,
            x,
            y,
        }
    }
}

/// Cursor the host should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    /// Arrow.
    Default,
    /// Open hand, pan tool ready.
    Grab,
    /// Closed hand, dragging.
    Grabbing,
}

/// Pan tool state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanState {
    /// Tool is off.
    #[default]
    Idle,
    /// Tool is on; `drag` holds the last pointer position while dragging.
    Panning {
        /// Last pointer position of an ongoing drag.
        drag: Option<Point>,
    },
}

/// Drags the viewport around while disabling object interaction.
#[derive(Debug, Clone, Default)]
pub struct PanTool {
    state: PanState,
}

impl PanTool {
    /// Create an idle pan tool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PanState {
        self.state
    }

    /// Whether the tool is on.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, PanState::Panning { .. })
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PanState::Panning { drag: Some(_) })
    }

    /// Cursor for the current state.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        match self.state {
            PanState::Idle => Cursor::Default,
            PanState::Panning { drag: None } => Cursor::Grab,
            PanState::Panning { drag: Some(_) } => Cursor::Grabbing,
        }
    }

    /// Turn the tool on: objects stop reacting and the selection is dropped.
    pub fn activate(&mut self, doc: &mut CanvasDocument) {
        doc.set_interactive(false);
        doc.deselect();
        self.state = PanState::Panning { drag: None };
        tracing::debug!("Pan tool on");
    }

    /// Turn the tool off and make objects interactive again.
    pub fn deactivate(&mut self, doc: &mut CanvasDocument) {
        doc.set_interactive(true);
        doc.deselect();
        self.state = PanState::Idle;
        tracing::debug!("Pan tool off");
    }

    /// Feed a pointer event. Returns `true` if the event was consumed.
    pub fn handle(&mut self, doc: &mut CanvasDocument, event: &PointerEvent) -> bool {
        let PanState::Panning { drag } = self.state else {
            return false;
        };
        let here = Point::new(event.x, event.y);
        match (event.phase, drag) {
            (PointerPhase::Down, _) => {
                self.state = PanState::Panning { drag: Some(here) };
            }
            (PointerPhase::Move, Some(last)) => {
                doc.relative_pan(here.x - last.x, here.y - last.y);
                self.state = PanState::Panning { drag: Some(here) };
            }
            (PointerPhase::Move, None) => {}
            (PointerPhase::Up, _) => {
                self.state = PanState::Panning { drag: None };
            }
        }
        true
    }
}

/// How pointer events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Click to select objects.
    #[default]
    Select,
    /// Drag to pan the view.
    Pan,
}

/// A document plus the current tool.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    document: CanvasDocument,
    mode: InteractionMode,
    pan: PanTool,
}

impl EditorState {
    /// Wrap a document in select mode.
    #[must_use]
    pub fn new(document: CanvasDocument) -> Self {
        Self {
            document,
            mode: InteractionMode::Select,
            pan: PanTool::new(),
        }
    }

    /// The document.
    #[must_use]
    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// The document, mutably.
    pub fn document_mut(&mut self) -> &mut CanvasDocument {
        &mut self.document
    }

    /// Unwrap the document.
    #[must_use]
    pub fn into_document(self) -> CanvasDocument {
        self.document
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Cursor for the current mode.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.pan.cursor()
    }

    /// Switch tools.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode == self.mode {
            return;
        }
        match mode {
            InteractionMode::Pan => self.pan.activate(&mut self.document),
            InteractionMode::Select => self.pan.deactivate(&mut self.document),
        }
        self.mode = mode;
    }

    /// Route a pointer event to the current tool.
    ///
    /// In select mode a press selects the topmost interactive object under
    /// the pointer (or clears the selection) and returns its id.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Option<ObjectId> {
        match self.mode {
            InteractionMode::Pan => {
                self.pan.handle(&mut self.document, event);
                None
            }
            InteractionMode::Select => {
                if event.phase != PointerPhase::Down {
                    return None;
                }
                let p = self.document.viewport().to_surface(event.x, event.y);
                match self.document.object_at(p.x, p.y) {
                    Some(id) => {
                        self.document.select(id).ok()?;
                        Some(id)
                    }
                    None => {
                        self.document.deselect();
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectSpec;

    #[test]
    fn test_pan_drag_accumulates() {
        let mut doc = CanvasDocument::default();
        let mut tool = PanTool::new();
        tool.activate(&mut doc);
        assert_eq!(tool.cursor(), Cursor::Grab);

        tool.handle(&mut doc, &PointerEvent::down(10.0, 10.0));
        assert!(tool.is_dragging());
        tool.handle(&mut doc, &PointerEvent::moved(15.0, 20.0));
        tool.handle(&mut doc, &PointerEvent::moved(25.0, 20.0));
        tool.handle(&mut doc, &PointerEvent::up(25.0, 20.0));
        let vp = doc.viewport();
        assert!((vp.pan_x - 15.0).abs() < f64::EPSILON);
        assert!((vp.pan_y - 10.0).abs() < f64::EPSILON);

        // Moves without a press do nothing.
        tool.handle(&mut doc, &PointerEvent::moved(100.0, 100.0));
        assert!((doc.viewport().pan_x - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_idle_tool_ignores_events() {
        let mut doc = CanvasDocument::default();
        let mut tool = PanTool::new();
        assert!(!tool.handle(&mut doc, &PointerEvent::down(0.0, 0.0)));
        assert_eq!(tool.state(), PanState::Idle);
    }

    #[test]
    fn test_pan_mode_disables_objects() {
        let mut doc = CanvasDocument::default();
        doc.add_object(ObjectSpec::rectangle(10.0, 10.0)).expect("add");
        let mut editor = EditorState::new(doc);

        editor.set_mode(InteractionMode::Pan);
        assert!(editor.document().active().is_none());
        assert!(editor.document().objects().iter().all(|o| !o.selectable && !o.interactive));

        editor.set_mode(InteractionMode::Select);
        assert!(editor.document().objects().iter().all(|o| o.selectable && o.interactive));
    }

    #[test]
    fn test_objects_added_while_panning_stay_inert() {
        let mut editor = EditorState::new(CanvasDocument::default());
        editor.set_mode(InteractionMode::Pan);

        let id = editor
            .document_mut()
            .add_object(ObjectSpec::rectangle(20.0, 20.0).at(10.0, 10.0))
            .expect("add");
        let doc = editor.document();
        let object = doc.object(id).expect("object");
        assert!(!object.selectable && !object.interactive);
        assert!(doc.active().is_none());
        assert!(doc.object_at(15.0, 15.0).is_none());

        editor.set_mode(InteractionMode::Select);
        let object = editor.document().object(id).expect("object");
        assert!(object.selectable && object.interactive);
        assert_eq!(editor.document().object_at(15.0, 15.0), Some(id));
    }

    #[test]
    fn test_select_hit_test_goes_through_viewport() {
        let mut doc = CanvasDocument::default();
        let id = doc
            .add_object(ObjectSpec::rectangle(20.0, 20.0).at(100.0, 100.0))
            .expect("add");
        doc.deselect();
        let mut editor = EditorState::new(doc);

        editor.set_mode(InteractionMode::Pan);
        editor.handle_pointer(&PointerEvent::down(0.0, 0.0));
        editor.handle_pointer(&PointerEvent::moved(50.0, 0.0));
        editor.handle_pointer(&PointerEvent::up(50.0, 0.0));
        editor.set_mode(InteractionMode::Select);

        // Object now appears 50px to the right on screen.
        assert_eq!(editor.handle_pointer(&PointerEvent::down(105.0, 105.0)), None);
        assert_eq!(editor.handle_pointer(&PointerEvent::down(155.0, 105.0)), Some(id));
        assert_eq!(editor.document().active(), Some(id));
    }
}
