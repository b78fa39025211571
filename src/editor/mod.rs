use std::collections::VecDeque;

use egui::{Pos2, Rect};

use crate::element::{ElementId, ElementIdAllocator, PageTree, PropValue, WidgetKind};
use crate::widgets::WidgetRegistry;

mod events;
mod history;
mod integrity;
mod mutate;
mod options;
#[cfg(feature = "persistence")]
mod persistence;
mod resolve;
mod session;
mod ui;
mod zones;

#[cfg(test)]
mod model_tests;

pub use events::{PointerEvent, PointerPhase};
pub use history::History;
pub use mutate::{MutationOutcome, RejectReason, ReorderDirection};
pub use options::PageEditorOptions;
#[cfg(feature = "persistence")]
pub use persistence::{PAGE_SNAPSHOT_VERSION, PagePersistenceError, PageSnapshot};
pub use resolve::resolve_drop_position;
pub use session::{DragItem, DragSession, DragSource};
pub use ui::{ElementAction, ElementContext, PageBehavior};
pub use zones::{DropPosition, DropZone, DropZoneId};

/// The structural editing engine for one page.
///
/// Owns the element tree, the drag session (drop zones included), the
/// selection, and the undo history, and exposes the editing API that
/// widget components call: select, update, delete, duplicate, move
/// up/down, and drop resolution. Widget *content* is rendered by the host
/// through [`PageBehavior`]; the engine only ever touches structure.
///
/// Everything is single-threaded and synchronous: each mutation is atomic
/// from the caller's perspective (validate-then-commit), so a re-render
/// can never observe a half-applied edit.
#[derive(Clone, Debug)]
pub struct PageEditor {
    pub options: PageEditorOptions,
    pub registry: WidgetRegistry,

    tree: PageTree,
    session: DragSession,
    selected: Option<ElementId>,
    ids: ElementIdAllocator,
    history: History,

    last_pointer: Option<Pos2>,

    debug_log: VecDeque<String>,
}

impl PageEditor {
    pub fn new(registry: WidgetRegistry) -> Self {
        Self::with_tree(PageTree::new(), registry)
    }

    pub fn with_tree(tree: PageTree, registry: WidgetRegistry) -> Self {
        Self::with_tree_and_options(tree, registry, PageEditorOptions::default())
    }

    pub fn with_tree_and_options(
        tree: PageTree,
        registry: WidgetRegistry,
        options: PageEditorOptions,
    ) -> Self {
        let history = History::new(options.max_undo_depth);
        Self {
            options,
            registry,
            tree,
            session: DragSession::default(),
            selected: None,
            ids: ElementIdAllocator::new(),
            history,
            last_pointer: None,
            debug_log: VecDeque::new(),
        }
    }

    pub fn tree(&self) -> &PageTree {
        &self.tree
    }

    /// Replace the whole tree (e.g. after loading a page). Ephemeral state
    /// (selection, drag session, zones, history) is reset.
    pub fn set_tree(&mut self, tree: PageTree) {
        self.tree = tree;
        self.selected = None;
        self.session.end_drag();
        self.history.clear();
        self.last_pointer = None;
    }

    /// The drag session, for hosts that hit-test zones themselves.
    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_dragging()
    }

    pub fn drag_item(&self) -> Option<&DragItem> {
        self.session.item()
    }

    // ------------------------------------------------------------------
    // Selection

    pub fn selected_element_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// Set the selection unconditionally. Membership is not validated; a
    /// selection referencing a pruned id is cleared by the next mutation.
    pub fn select(&mut self, id: impl Into<ElementId>) {
        self.selected = Some(id.into());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ------------------------------------------------------------------
    // Content/style editing

    /// Shallow-merge `patch` into the element's content record. Children
    /// and kind are never touched. Dangling ids are tolerated no-ops.
    pub fn update_content(
        &mut self,
        id: &ElementId,
        patch: impl IntoIterator<Item = (String, PropValue)>,
    ) -> MutationOutcome {
        if !self.tree.contains(id) {
            return MutationOutcome::Rejected(RejectReason::UnknownElement);
        }
        let snapshot = self.tree.clone();
        if let Some(element) = self.tree.get_mut(id) {
            element.content.extend(patch);
        }
        self.history.push(snapshot);
        self.after_mutation("update_content");
        MutationOutcome::Applied
    }

    /// Shallow-merge `patch` into the element's style record.
    pub fn update_style(
        &mut self,
        id: &ElementId,
        patch: impl IntoIterator<Item = (String, String)>,
    ) -> MutationOutcome {
        if !self.tree.contains(id) {
            return MutationOutcome::Rejected(RejectReason::UnknownElement);
        }
        let snapshot = self.tree.clone();
        if let Some(element) = self.tree.get_mut(id) {
            element.style.extend(patch);
        }
        self.history.push(snapshot);
        self.after_mutation("update_style");
        MutationOutcome::Applied
    }

    // ------------------------------------------------------------------
    // Structural editing

    /// Delete the subtree rooted at `id`. Zones and selection owned by the
    /// removed subtree are released with it.
    pub fn delete(&mut self, id: &ElementId) -> MutationOutcome {
        if !self.tree.contains(id) {
            log::debug!("delete ignored: unknown element {id}");
            return MutationOutcome::Rejected(RejectReason::UnknownElement);
        }
        let snapshot = self.tree.clone();
        let Some(removed) = mutate::detach(&mut self.tree, id) else {
            return MutationOutcome::Rejected(RejectReason::UnknownElement);
        };
        for element in removed.iter() {
            self.session.unregister_zones_for(&element.id);
        }
        self.history.push(snapshot);
        self.debug_log_event(format!("delete {}", removed.id));
        self.after_mutation("delete");
        MutationOutcome::Applied
    }

    /// Duplicate the subtree rooted at `id` (fresh ids throughout) as the
    /// original's next sibling, and select the clone. Returns the clone's
    /// root id, or `None` for dangling ids.
    pub fn duplicate(&mut self, id: &ElementId) -> Option<ElementId> {
        if !self.tree.contains(id) {
            log::debug!("duplicate ignored: unknown element {id}");
            return None;
        }
        let snapshot = self.tree.clone();
        let clone_id = mutate::duplicate(&mut self.tree, id, &mut self.ids)?;
        self.history.push(snapshot);
        self.selected = Some(clone_id.clone());
        self.debug_log_event(format!("duplicate {id} -> {clone_id}"));
        self.after_mutation("duplicate");
        Some(clone_id)
    }

    pub fn move_up(&mut self, id: &ElementId) -> MutationOutcome {
        self.reorder(id, ReorderDirection::Up)
    }

    pub fn move_down(&mut self, id: &ElementId) -> MutationOutcome {
        self.reorder(id, ReorderDirection::Down)
    }

    /// Swap `id` with its adjacent sibling; no-op at the boundary.
    pub fn reorder(&mut self, id: &ElementId, direction: ReorderDirection) -> MutationOutcome {
        let snapshot = self.tree.clone();
        let outcome = mutate::reorder(&mut self.tree, id, direction);
        if outcome.applied() {
            self.history.push(snapshot);
            self.debug_log_event(format!("reorder {id} {direction:?}"));
            self.after_mutation("reorder");
        }
        outcome
    }

    pub fn can_move_up(&self, id: &ElementId) -> bool {
        self.tree.parent_of(id).is_some_and(|(_, index)| index > 0)
    }

    pub fn can_move_down(&self, id: &ElementId) -> bool {
        self.tree.parent_of(id).is_some_and(|(parent, index)| {
            let count = parent.map_or(self.tree.children.len(), |p| p.children.len());
            index + 1 < count
        })
    }

    // ------------------------------------------------------------------
    // Drag & drop

    /// Start dragging a new widget off the palette. No-op while another
    /// drag is active.
    pub fn begin_palette_drag(&mut self, kind: impl Into<WidgetKind>) {
        self.session.begin_drag(DragItem::new_widget(kind));
    }

    /// Start dragging an existing canvas element. No-op for dangling ids
    /// or while another drag is active.
    pub fn begin_canvas_drag(&mut self, element_id: impl Into<ElementId>) {
        let element_id = element_id.into();
        if !self.tree.contains(&element_id) {
            log::debug!("begin_canvas_drag ignored: unknown element {element_id}");
            return;
        }
        self.session.begin_drag(DragItem::existing_element(element_id));
    }

    /// Abandon/finish the drag: clears the item and retracts every zone.
    /// Safe to call at any time, any number of times.
    pub fn end_drag(&mut self) {
        self.session.end_drag();
    }

    /// Publish the drop zones `element_id` offers given its current
    /// on-screen box. Only meaningful while a drag is active; the dragged
    /// element and its subtree never offer zones.
    pub fn register_element_zones(&mut self, element_id: &ElementId, bounds: Rect) {
        if !self.session.is_dragging() {
            return;
        }
        let dragged = self
            .session
            .item()
            .and_then(|item| item.dragged_element_id().cloned());
        if let Some(dragged) = dragged {
            if self.tree.is_descendant(&dragged, element_id) {
                self.session.unregister_zones_for(element_id);
                return;
            }
        }
        let Some(element) = self.tree.get(element_id) else {
            return;
        };
        let container_capable = self.registry.is_container_capable(&element.kind);
        let zones = DropZone::zones_for_element(element_id, bounds, container_capable, &self.options);
        self.session.register_zones(zones);
    }

    /// Retract every zone `element_id` published (it scrolled out of view
    /// or unmounted).
    pub fn unregister_element_zones(&mut self, element_id: &ElementId) {
        self.session.unregister_zones_for(element_id);
    }

    /// The single entry point once a pointer release lands on a drop
    /// target. Palette drags insert a freshly seeded element; canvas drags
    /// relocate the existing subtree. `target == None` is the synthetic
    /// root. The drag always ends, applied or not.
    pub fn resolve_drop(
        &mut self,
        target: Option<&ElementId>,
        position: DropPosition,
    ) -> MutationOutcome {
        let Some(item) = self.session.item().cloned() else {
            // Drag-state desync: a release with nothing in flight.
            self.session.end_drag();
            return MutationOutcome::Rejected(RejectReason::NoActiveDrag);
        };

        let snapshot = self.tree.clone();
        let outcome = match item.source {
            DragSource::Palette { kind } => {
                let id = self.ids.allocate(&self.tree);
                let element = self.registry.instantiate(&kind, id.clone());
                let outcome =
                    mutate::insert(&mut self.tree, element, target, position, &self.registry);
                if outcome.applied() {
                    self.selected = Some(id);
                }
                outcome
            }
            DragSource::Canvas { element_id } => mutate::move_element(
                &mut self.tree,
                &element_id,
                target,
                position,
                &self.registry,
            ),
        };

        let target_text = target.map_or("root", ElementId::as_str);
        match outcome {
            MutationOutcome::Applied => {
                self.history.push(snapshot);
                self.debug_log_event(format!("drop applied: {position} {target_text}"));
                self.after_mutation("resolve_drop");
            }
            MutationOutcome::Rejected(reason) => {
                log::debug!("drop rejected ({position} {target_text}): {reason}");
                self.debug_log_event(format!("drop rejected: {reason}"));
            }
        }
        self.session.end_drag();
        outcome
    }

    // ------------------------------------------------------------------
    // Pointer transport

    /// Feed one event from the host's pointer stream. Releases over a
    /// registered zone resolve the drop; releases elsewhere and cancels
    /// abandon the drag (the tree stays untouched either way on abandon).
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Option<MutationOutcome> {
        match event.phase {
            PointerPhase::Moved => {
                self.last_pointer = Some(event.pos);
                None
            }
            PointerPhase::Released => {
                self.last_pointer = Some(event.pos);
                if !self.session.is_dragging() {
                    return None;
                }
                match self.drop_verdict_at(event.pos) {
                    Some((owner, position)) => Some(self.resolve_drop(Some(&owner), position)),
                    None => {
                        self.end_drag();
                        None
                    }
                }
            }
            PointerPhase::Cancelled => {
                self.end_drag();
                None
            }
        }
    }

    /// The drop target + verdict the pointer position implies right now:
    /// hit-test the registered zones for the hovered element, then apply
    /// the quartile rule over that element's full box. Re-evaluated on
    /// every call; nothing is cached.
    pub fn drop_verdict_at(&self, pos: Pos2) -> Option<(ElementId, DropPosition)> {
        let (owner, bounds) = self.session.owner_at(pos)?;
        let container_capable = self.session.owner_is_container_capable(&owner);
        let position = resolve::resolve_drop_position(pos, bounds, container_capable, &self.options);
        Some((owner, position))
    }

    /// The zone the last observed pointer position is over. Derived on
    /// demand, never stored.
    pub fn active_drop_zone(&self) -> Option<DropZoneId> {
        let pos = self.last_pointer?;
        self.drop_verdict_at(pos)
            .map(|(owner, position)| DropZoneId { owner, position })
    }

    // ------------------------------------------------------------------
    // History

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.tree);
        if changed {
            self.debug_log_event("undo".to_owned());
            self.after_mutation("undo");
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.tree);
        if changed {
            self.debug_log_event("redo".to_owned());
            self.after_mutation("redo");
        }
        changed
    }

    // ------------------------------------------------------------------
    // Debugging

    pub fn debug_log_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.debug_log.iter().map(String::as_str)
    }

    pub fn debug_log_clear(&mut self) {
        self.debug_log.clear();
    }

    fn debug_log_event(&mut self, line: String) {
        if !self.options.debug_event_log {
            return;
        }
        while self.debug_log.len() >= self.options.debug_event_log_capacity.max(1) {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(line);
    }

    /// Post-mutation housekeeping: a selection referencing a pruned id is
    /// cleared, and (opt-in) integrity checks run against the new tree.
    fn after_mutation(&mut self, what: &str) {
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| !self.tree.contains(selected))
        {
            self.selected = None;
        }

        if !self.options.debug_integrity {
            return;
        }
        let issues = integrity::tree_integrity_issues(&self.tree, &self.registry);
        if issues.is_empty() {
            return;
        }
        for issue in &issues {
            log::warn!("{issue}");
        }
        self.debug_log_event(format!(
            "{what}: {} integrity issues (hash {:x})",
            issues.len(),
            integrity::hash_issues(&issues)
        ));
        if self.options.debug_integrity_panic {
            panic!(
                "tree integrity failed after {what}:\n{}",
                issues.join("\n")
            );
        }
    }
}
