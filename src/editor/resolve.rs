use egui::{Pos2, Rect};

use super::options::PageEditorOptions;
use super::zones::DropPosition;

/// Translate a live pointer position within a hovered element's box into
/// exactly one drop verdict.
///
/// Quartile rule (with the default bands): the top quarter of the box is
/// `before`, the bottom quarter is `after`, and the middle is `inside` for
/// container-capable elements. A non-container has no inside, so its
/// ambiguous middle band still must resolve to a linear position; `after`
/// is the deterministic fallback.
///
/// Callers re-evaluate this on every pointer move: both the pointer and
/// (during scrolling or resizing) the box geometry can change, so the
/// verdict is never cached.
pub fn resolve_drop_position(
    pointer: Pos2,
    bounds: Rect,
    container_capable: bool,
    options: &PageEditorOptions,
) -> DropPosition {
    let (before, after) = options.drop_bands();
    let height = bounds.height().max(f32::EPSILON);
    let offset = pointer.y - bounds.min.y;

    if offset < height * before {
        DropPosition::Before
    } else if offset > height * after {
        DropPosition::After
    } else if container_capable {
        DropPosition::Inside
    } else {
        DropPosition::After
    }
}
