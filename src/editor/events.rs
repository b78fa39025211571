use egui::Pos2;

/// Phase of one pointer event. The engine treats the host's native drag
/// transport as an abstract stream of `(position, phase)` events, so drops
/// are testable without any rendering surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    /// The pointer moved (a drag may or may not be in flight).
    Moved,
    /// The pointer was released. Over a registered zone this resolves the
    /// drop; anywhere else it abandons the drag.
    Released,
    /// The drag was cancelled (escape key, focus loss). The tree is
    /// left untouched; drag state and zones are still torn down.
    Cancelled,
}

/// One event from the host's pointer stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub pos: Pos2,
    pub phase: PointerPhase,
}

impl PointerEvent {
    pub fn moved(pos: Pos2) -> Self {
        Self {
            pos,
            phase: PointerPhase::Moved,
        }
    }

    pub fn released(pos: Pos2) -> Self {
        Self {
            pos,
            phase: PointerPhase::Released,
        }
    }

    pub fn cancelled(pos: Pos2) -> Self {
        Self {
            pos,
            phase: PointerPhase::Cancelled,
        }
    }
}
