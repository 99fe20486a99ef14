//! Pointer gestures: dragging and corner resizing of elements.
//!
//! The engine is a small state machine. Hosts start a gesture from an
//! element's pointer-down handler, forward global move/up events while
//! [`GestureEngine::is_active`] is true, and the engine writes the resulting
//! frames back into the [`Scene`].

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, Frame, MIN_ELEMENT_SIZE};
use crate::scene::{ElementPatch, Scene};
use crate::state::SessionContext;

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

/// A pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// Client x.
    pub x: f32,
    /// Client y.
    pub y: f32,
}

impl PointerEvent {
    /// Create a pointer event.
    #[must_use]
    pub const fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self { phase, x, y }
    }
}

/// Corner handle grabbed for a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    /// Top-left corner; pins the bottom-right.
    TopLeft,
    /// Top-right corner; pins the bottom-left.
    TopRight,
    /// Bottom-left corner; pins the top-right.
    BottomLeft,
    /// Bottom-right corner; pins the top-left.
    BottomRight,
}

impl ResizeHandle {
    /// All handles.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    const fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    const fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureState {
    Idle,
    Dragging {
        id: ElementId,
        offset_x: f32,
        offset_y: f32,
    },
    Resizing {
        id: ElementId,
        handle: ResizeHandle,
        pointer_x: f32,
        pointer_y: f32,
        start: Frame,
        ratio: Option<f32>,
    },
}

/// Compute the frame produced by dragging `handle` of `start` by a canvas-space
/// delta of `(dx, dy)`.
///
/// With `ratio` set, the height follows the width. The side opposite the
/// handle stays where it was.
#[must_use]
pub fn resize_frame(start: Frame, handle: ResizeHandle, dx: f32, dy: f32, ratio: Option<f32>) -> Frame {
    let raw_w = if handle.is_left() {
        start.width - dx
    } else {
        start.width + dx
    };
    let raw_h = if handle.is_top() {
        start.height - dy
    } else {
        start.height + dy
    };

    let (width, height) = match ratio {
        Some(ratio) => {
            let min_w = (MIN_ELEMENT_SIZE * ratio.max(1.0)).ceil();
            let width = raw_w.round().max(min_w);
            (width, (width / ratio).round())
        }
        None => (
            raw_w.round().max(MIN_ELEMENT_SIZE),
            raw_h.round().max(MIN_ELEMENT_SIZE),
        ),
    };

    let x = if handle.is_left() {
        start.x + start.width - width
    } else {
        start.x
    };
    let y = if handle.is_top() {
        start.y + start.height - height
    } else {
        start.y
    };

    Frame::new(x, y, width, height)
}

/// Drag and resize state machine.
#[derive(Debug, Clone)]
pub struct GestureEngine {
    state: GestureState,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureEngine {
    /// Create an idle engine.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    /// Whether a drag or resize is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// Whether a resize is in progress.
    #[must_use]
    pub const fn is_resizing(&self) -> bool {
        matches!(self.state, GestureState::Resizing { .. })
    }

    /// Element being manipulated.
    #[must_use]
    pub const fn target(&self) -> Option<ElementId> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Dragging { id, .. } | GestureState::Resizing { id, .. } => Some(id),
        }
    }

    /// Start dragging an element from a client-space pointer position.
    ///
    /// Selects the element. Returns `false` while a resize is running or if
    /// the element does not exist.
    pub fn begin_drag(
        &mut self,
        scene: &Scene,
        session: &mut SessionContext,
        id: ElementId,
        client_x: f32,
        client_y: f32,
    ) -> bool {
        if self.is_resizing() {
            return false;
        }
        let Some(element) = scene.get_element(id) else {
            return false;
        };
        session.selected = Some(id);
        let (px, py) = session.to_canvas(client_x, client_y);
        self.state = GestureState::Dragging {
            id,
            offset_x: px - element.frame.x,
            offset_y: py - element.frame.y,
        };
        tracing::debug!("Drag started on element {id}");
        true
    }

    /// Start resizing an element from one of its corner handles.
    ///
    /// Returns `false` while a drag is running or if the element does not exist.
    pub fn begin_resize(
        &mut self,
        scene: &Scene,
        session: &SessionContext,
        id: ElementId,
        handle: ResizeHandle,
        client_x: f32,
        client_y: f32,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(element) = scene.get_element(id) else {
            return false;
        };
        let start = element.frame;
        self.state = GestureState::Resizing {
            id,
            handle,
            pointer_x: client_x,
            pointer_y: client_y,
            start,
            ratio: session.lock_aspect_ratio.then(|| start.aspect_ratio()),
        };
        tracing::debug!("Resize started on element {id} ({handle:?})");
        true
    }

    /// Apply a pointer move to the active gesture.
    pub fn pointer_move(
        &mut self,
        scene: &mut Scene,
        session: &SessionContext,
        client_x: f32,
        client_y: f32,
    ) {
        let (id, patch) = match self.state {
            GestureState::Idle => return,
            GestureState::Dragging {
                id,
                offset_x,
                offset_y,
            } => {
                let Some(lock) = scene.get_element(id).map(|e| e.lock) else {
                    return;
                };
                let (px, py) = session.to_canvas(client_x, client_y);
                let mut patch = ElementPatch::default();
                if lock.allows_x() {
                    patch = patch.with_x((px - offset_x).round());
                }
                if lock.allows_y() {
                    patch = patch.with_y((py - offset_y).round());
                }
                (id, patch)
            }
            GestureState::Resizing {
                id,
                handle,
                pointer_x,
                pointer_y,
                start,
                ratio,
            } => {
                let dx = (client_x - pointer_x) / session.zoom();
                let dy = (client_y - pointer_y) / session.zoom();
                let frame = resize_frame(start, handle, dx, dy, ratio);
                let patch = ElementPatch::size(frame.width, frame.height)
                    .with_x(frame.x)
                    .with_y(frame.y);
                (id, patch)
            }
        };

        // The element may have been deleted mid-gesture.
        let _ = scene.update_element(id, patch);
    }

    /// End any gesture.
    pub fn pointer_up(&mut self) {
        if let Some(id) = self.target() {
            tracing::debug!("Gesture ended on element {id}");
        }
        self.state = GestureState::Idle;
    }

    /// Feed a global pointer event. `Down` is ignored; gestures start from
    /// [`begin_drag`](Self::begin_drag) or [`begin_resize`](Self::begin_resize).
    pub fn handle(&mut self, scene: &mut Scene, session: &SessionContext, event: PointerEvent) {
        match event.phase {
            PointerPhase::Down => {}
            PointerPhase::Move => self.pointer_move(scene, session, event.x, event.y),
            PointerPhase::Up => self.pointer_up(),
        }
    }
}
