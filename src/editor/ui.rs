use egui::{Rect, Stroke, StrokeKind, Ui};

use crate::element::{Element, ElementId};
use crate::widgets::WidgetRegistry;

use super::PageEditor;
use super::events::PointerEvent;

/// Structural context for one rendered element, handed to the host's
/// renderer so it can draw chrome (selection ring, move/delete buttons)
/// without knowing mutation internals.
#[derive(Clone, Copy, Debug)]
pub struct ElementContext {
    pub is_selected: bool,
    /// Nesting depth; top-level elements are at 0.
    pub depth: usize,
    pub can_move_up: bool,
    pub can_move_down: bool,
    pub child_count: usize,
}

/// What the host's renderer wants done after drawing one element. The
/// editor applies the request through its normal editing API at the end
/// of the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ElementAction {
    #[default]
    None,
    Select,
    Delete,
    Duplicate,
    MoveUp,
    MoveDown,
    /// Start dragging this element (from a grab handle or header).
    Drag,
}

/// Implemented by the host: draws each element's visual content.
///
/// The editor walks the tree, calls [`Self::element_ui`] per node, lays
/// out children below container-capable nodes, and uses each node's
/// resulting on-screen box for drop-zone geometry. What the content looks
/// like is entirely the host's business.
pub trait PageBehavior {
    /// Draw one element's own content. Children are laid out by the editor
    /// after this returns.
    fn element_ui(&mut self, ui: &mut Ui, element: &Element, context: &ElementContext)
    -> ElementAction;

    /// Placeholder shown inside an empty container-capable element, so it
    /// still has a box users can drop into.
    fn empty_container_ui(&mut self, ui: &mut Ui, element: &Element) {
        let _ = element;
        ui.weak("Drop widgets here");
    }
}

struct Placement {
    depth: usize,
    index: usize,
    sibling_count: usize,
}

impl PageEditor {
    /// Show the page and run one frame of the structural editing loop:
    /// walk the tree through `behavior`, apply the actions it returns,
    /// publish drop zones from the observed element boxes while a drag is
    /// live, feed the pointer stream, and highlight the active drop zone.
    pub fn ui(&mut self, ui: &mut Ui, behavior: &mut dyn PageBehavior) {
        let mut observed: Vec<(ElementId, Rect)> = Vec::new();
        let mut pending: Vec<(ElementId, ElementAction)> = Vec::new();

        {
            let selected = self.selected.clone();
            let count = self.tree.children.len();
            for (index, element) in self.tree.children.iter().enumerate() {
                element_ui(
                    ui,
                    behavior,
                    &self.registry,
                    selected.as_ref(),
                    element,
                    &Placement {
                        depth: 0,
                        index,
                        sibling_count: count,
                    },
                    &mut observed,
                    &mut pending,
                );
            }
        }

        // Actions are queued during the walk and applied afterwards, so a
        // delete can never invalidate elements still being drawn.
        for (id, action) in pending {
            self.apply_action(id, action);
        }

        if self.session.is_dragging() {
            for (id, bounds) in observed {
                self.register_element_zones(&id, bounds);
            }
        }

        self.pump_pointer(ui);

        if self.session.is_dragging() {
            self.paint_active_zone_highlight(ui);
            // Zone geometry tracks every re-render while the drag lasts.
            ui.ctx().request_repaint();
        }
    }

    fn apply_action(&mut self, id: ElementId, action: ElementAction) {
        match action {
            ElementAction::None => {}
            ElementAction::Select => self.select(id),
            ElementAction::Delete => {
                let _ = self.delete(&id);
            }
            ElementAction::Duplicate => {
                let _ = self.duplicate(&id);
            }
            ElementAction::MoveUp => {
                let _ = self.move_up(&id);
            }
            ElementAction::MoveDown => {
                let _ = self.move_down(&id);
            }
            ElementAction::Drag => self.begin_canvas_drag(id),
        }
    }

    /// Translate egui's pointer input into the abstract event stream.
    fn pump_pointer(&mut self, ui: &Ui) {
        let (pointer, released, escape) = ui.ctx().input(|input| {
            (
                input.pointer.latest_pos(),
                input.pointer.any_released(),
                input.key_pressed(egui::Key::Escape),
            )
        });
        let Some(pos) = pointer.or(self.last_pointer) else {
            return;
        };
        let event = if escape {
            PointerEvent::cancelled(pos)
        } else if released {
            PointerEvent::released(pos)
        } else {
            PointerEvent::moved(pos)
        };
        let _ = self.handle_pointer_event(event);
    }

    fn paint_active_zone_highlight(&self, ui: &Ui) {
        let Some(zone_id) = self.active_drop_zone() else {
            return;
        };
        // Highlight the strip/box matching the verdict; the owner's full
        // box is the fallback when the verdict came from the quartile rule
        // rather than a strip hit.
        let rect = self
            .session
            .zones()
            .iter()
            .find(|zone| zone.owner == zone_id.owner && zone.position == zone_id.position)
            .map(|zone| zone.bounds)
            .or_else(|| self.session.owner_bounds(&zone_id.owner));
        let Some(rect) = rect else {
            return;
        };

        let accent = ui.visuals().selection.bg_fill;
        let painter = ui.painter();
        painter.rect_filled(rect, 2.0, accent.gamma_multiply(0.2));
        painter.rect_stroke(rect, 2.0, Stroke::new(2.0, accent), StrokeKind::Inside);
    }
}

#[expect(clippy::too_many_arguments)]
fn element_ui(
    ui: &mut Ui,
    behavior: &mut dyn PageBehavior,
    registry: &WidgetRegistry,
    selected: Option<&ElementId>,
    element: &Element,
    placement: &Placement,
    observed: &mut Vec<(ElementId, Rect)>,
    pending: &mut Vec<(ElementId, ElementAction)>,
) {
    let context = ElementContext {
        is_selected: selected == Some(&element.id),
        depth: placement.depth,
        can_move_up: placement.index > 0,
        can_move_down: placement.index + 1 < placement.sibling_count,
        child_count: element.children.len(),
    };
    let container_capable = registry.is_container_capable(&element.kind);

    let inner = ui.vertical(|ui| {
        let action = behavior.element_ui(ui, element, &context);
        if action != ElementAction::None {
            pending.push((element.id.clone(), action));
        }
        if container_capable {
            ui.indent(("pagebuilder_indent", element.id.as_str()), |ui| {
                if element.children.is_empty() {
                    behavior.empty_container_ui(ui, element);
                } else {
                    let count = element.children.len();
                    for (index, child) in element.children.iter().enumerate() {
                        element_ui(
                            ui,
                            behavior,
                            registry,
                            selected,
                            child,
                            &Placement {
                                depth: placement.depth + 1,
                                index,
                                sibling_count: count,
                            },
                            observed,
                            pending,
                        );
                    }
                }
            });
        }
    });

    observed.push((element.id.clone(), inner.response.rect));
}
