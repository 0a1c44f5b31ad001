//! Interaction state types consumed by the session: pointer and key events
//! (screen coordinates), the drag state machine and the label editor state
//! machine. Transition logic lives in the session, which owns the model and
//! scene the transitions act on.

use erdling_core::Point;
use erdling_render::SceneId;

/// Pointer input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    /// Opens the inline label editor on the node under the pointer.
    DoubleClick(Point),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
}

/// Dragging state. Entities, attributes and relationship diamonds are all
/// drag targets; dragging an entity carries its attributes along, the other
/// two move alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        target: SceneId,
        /// Last pointer position in world coordinates, so each move applies
        /// an exact delta with no accumulated rounding against the grab point.
        last_world: Point,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}

/// In-place label editing. At most one label is edited at a time; starting a
/// new edit implicitly cancels the previous one.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Viewing,
    Editing {
        target: SceneId,
        buffer: String,
        /// Display name when the edit began; committing an unchanged buffer
        /// is a no-op cancel.
        original: String,
    },
}

impl EditorState {
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }
}
