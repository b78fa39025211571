use egui::{Pos2, Rect};
use itertools::Itertools as _;

use crate::element::{ElementId, WidgetKind};

use super::zones::{DropPosition, DropZone};

/// What is being dragged, and from where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragSource {
    /// A new widget dragged off the palette. The dropped element is seeded
    /// from the registry's declared defaults.
    Palette { kind: WidgetKind },
    /// An existing element dragged from the canvas. A successful drop
    /// relocates its whole subtree; the source location is vacated.
    Canvas { element_id: ElementId },
}

/// An in-flight drag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragItem {
    pub source: DragSource,
}

impl DragItem {
    pub fn new_widget(kind: impl Into<WidgetKind>) -> Self {
        Self {
            source: DragSource::Palette { kind: kind.into() },
        }
    }

    pub fn existing_element(element_id: impl Into<ElementId>) -> Self {
        Self {
            source: DragSource::Canvas {
                element_id: element_id.into(),
            },
        }
    }

    pub fn from_canvas(&self) -> bool {
        matches!(self.source, DragSource::Canvas { .. })
    }

    /// The element being relocated, for canvas drags.
    pub fn dragged_element_id(&self) -> Option<&ElementId> {
        match &self.source {
            DragSource::Canvas { element_id } => Some(element_id),
            DragSource::Palette { .. } => None,
        }
    }
}

/// Single source of truth for "what is being dragged right now" and "which
/// drop zones currently exist", shared by every rendered node.
#[derive(Clone, Debug, Default)]
pub struct DragSession {
    item: Option<DragItem>,
    zones: Vec<DropZone>,
}

impl DragSession {
    /// Start a drag. At most one drag session exists at a time: if one is
    /// already active this is a silent no-op.
    pub fn begin_drag(&mut self, item: DragItem) {
        if self.item.is_some() {
            log::debug!("begin_drag ignored: a drag is already active");
            return;
        }
        log::debug!("begin_drag: {:?}", item.source);
        self.item = Some(item);
    }

    /// End the drag, clearing the item and every registered zone. The zone
    /// clear is defensive (individual registrars may not have cleaned up),
    /// and the whole call is idempotent: ending twice equals ending once.
    pub fn end_drag(&mut self) {
        if self.item.take().is_some() {
            log::debug!("end_drag: retracting {} zones", self.zones.len());
        }
        self.zones.clear();
    }

    pub fn is_dragging(&self) -> bool {
        self.item.is_some()
    }

    pub fn item(&self) -> Option<&DragItem> {
        self.item.as_ref()
    }

    pub fn zones(&self) -> &[DropZone] {
        &self.zones
    }

    /// Publish zones. Re-registering a zone id replaces its bounds, so a
    /// registrar can simply re-publish whenever its element's geometry
    /// changes. Zones are only accepted while a drag is active.
    pub fn register_zones(&mut self, zones: impl IntoIterator<Item = DropZone>) {
        if self.item.is_none() {
            return;
        }
        for zone in zones {
            let id = zone.id();
            if let Some(existing) = self.zones.iter_mut().find(|existing| existing.id() == id) {
                *existing = zone;
            } else {
                self.zones.push(zone);
            }
        }
    }

    /// Retract every zone owned by `owner` (it unmounted, or is itself
    /// being dragged).
    pub fn unregister_zones_for(&mut self, owner: &ElementId) {
        self.zones.retain(|zone| &zone.owner != owner);
    }

    /// The zone under `pos`, preferring the smallest containing zone: thin
    /// edge strips beat the full-box `inside` zone, and a nested child's
    /// zones beat its ancestors'.
    pub fn zone_at(&self, pos: Pos2) -> Option<&DropZone> {
        self.zones
            .iter()
            .filter(|zone| zone.contains(pos))
            .min_by(|a, b| a.area().total_cmp(&b.area()))
    }

    /// The element the pointer is hovering, as the innermost (smallest)
    /// owner whose box contains `pos`. An owner's box is the union of its
    /// registered zones, so a leaf's thin strips still make its whole box
    /// hoverable; the quartile rule decides the verdict, not the strips.
    pub fn owner_at(&self, pos: Pos2) -> Option<(ElementId, Rect)> {
        self.zones
            .iter()
            .map(|zone| zone.owner.clone())
            .unique()
            .filter_map(|owner| {
                let bounds = self.owner_bounds(&owner)?;
                bounds.contains(pos).then_some((owner, bounds))
            })
            .min_by(|a, b| {
                (a.1.width() * a.1.height()).total_cmp(&(b.1.width() * b.1.height()))
            })
    }

    /// The full on-screen box of `owner`, reconstructed as the union of its
    /// registered zones (the edge strips span the full height between them).
    pub fn owner_bounds(&self, owner: &ElementId) -> Option<Rect> {
        self.zones
            .iter()
            .filter(|zone| &zone.owner == owner)
            .map(|zone| zone.bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Whether `owner` published an `inside` zone, i.e. is container-capable.
    pub fn owner_is_container_capable(&self, owner: &ElementId) -> bool {
        self.zones
            .iter()
            .any(|zone| &zone.owner == owner && zone.position == DropPosition::Inside)
    }
}
