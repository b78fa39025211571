#![forbid(unsafe_code)]

//! Drag-and-drop page-builder tree editing for egui.
//!
//! This crate is the *structural* engine behind a visual page builder: it
//! owns the recursive widget tree, the drag session and its drop zones,
//! drop resolution, tree mutations (insert/move/duplicate/delete/reorder),
//! selection, and undo. What each widget looks like is the host's
//! business, supplied through the [`PageBehavior`] trait; which kinds
//! exist and which may hold children comes from the [`WidgetRegistry`].

pub mod editor;
pub mod element;
pub mod page_builder;
pub mod widgets;

pub use editor::{
    DragItem, DragSession, DragSource, DropPosition, DropZone, DropZoneId, ElementAction,
    ElementContext, History, MutationOutcome, PageBehavior, PageEditor, PageEditorOptions,
    PointerEvent, PointerPhase, RejectReason, ReorderDirection, resolve_drop_position,
};
pub use element::{Element, ElementId, ElementIdAllocator, PageTree, PropValue, WidgetKind};
pub use page_builder::PageBuilder;
pub use widgets::{WidgetRegistry, WidgetSpec};

#[cfg(feature = "persistence")]
pub use editor::{PAGE_SNAPSHOT_VERSION, PagePersistenceError, PageSnapshot};
