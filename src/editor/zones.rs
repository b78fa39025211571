use std::fmt;

use egui::{Pos2, Rect};

use crate::element::ElementId;

use super::options::PageEditorOptions;

/// Where a drop lands relative to its target element.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum DropPosition {
    /// Insert as the target's previous sibling.
    Before,
    /// Insert as the target's next sibling.
    After,
    /// Append to the target's children (container-capable targets only).
    Inside,
}

impl DropPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Inside => "inside",
        }
    }
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a published drop zone: owning element plus position
/// variant, displayed as `<elementId>-<position>`.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct DropZoneId {
    pub owner: ElementId,
    pub position: DropPosition,
}

impl fmt::Display for DropZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.owner, self.position)
    }
}

/// A candidate drop target published by a rendered element while a drag is
/// active. `bounds` is screen-space and re-published whenever the owning
/// element's rendered geometry changes.
#[derive(Clone, Debug, PartialEq)]
pub struct DropZone {
    pub owner: ElementId,
    pub position: DropPosition,
    pub bounds: Rect,
}

impl DropZone {
    pub fn id(&self) -> DropZoneId {
        DropZoneId {
            owner: self.owner.clone(),
            position: self.position,
        }
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.bounds.contains(pos)
    }

    pub(super) fn area(&self) -> f32 {
        self.bounds.width() * self.bounds.height()
    }

    /// The zones an element offers given its current on-screen box: a thin
    /// `before` strip at the top, a thin `after` strip at the bottom, and
    /// (for container-capable elements only) an `inside` zone covering the
    /// whole box. An empty container still offers its (placeholder-sized)
    /// full box, so users can drop into empty containers.
    pub fn zones_for_element(
        owner: &ElementId,
        bounds: Rect,
        container_capable: bool,
        options: &PageEditorOptions,
    ) -> Vec<DropZone> {
        let strip = options
            .edge_strip_thickness
            .min(bounds.height() / 2.0)
            .max(1.0);

        let before = Rect::from_min_max(
            bounds.min,
            Pos2::new(bounds.max.x, bounds.min.y + strip),
        );
        let after = Rect::from_min_max(
            Pos2::new(bounds.min.x, bounds.max.y - strip),
            bounds.max,
        );

        let mut zones = vec![
            DropZone {
                owner: owner.clone(),
                position: DropPosition::Before,
                bounds: before,
            },
            DropZone {
                owner: owner.clone(),
                position: DropPosition::After,
                bounds: after,
            },
        ];
        if container_capable {
            zones.push(DropZone {
                owner: owner.clone(),
                position: DropPosition::Inside,
                bounds,
            });
        }
        zones
    }
}
