use egui::{Pos2, Rect};

use crate::element::{Element, ElementId, PageTree};
use crate::page_builder::PageBuilder;
use crate::widgets::WidgetRegistry;

use super::integrity;
use super::{
    DropPosition, MutationOutcome, PageEditor, PointerEvent, RejectReason, ReorderDirection,
};

fn assert_tree_ok(editor: &PageEditor) {
    let issues = integrity::tree_integrity_issues(editor.tree(), &editor.registry);
    assert!(
        issues.is_empty(),
        "tree integrity failed:\n{}",
        issues.join("\n")
    );
    if let Some(selected) = editor.selected_element_id() {
        assert!(
            editor.tree().contains(selected),
            "selection {selected} points at a pruned element"
        );
    }
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed ^ 0xB0B0_CAFE_B0B0_CAFE)
    }

    fn next_u64(&mut self) -> u64 {
        // Simple LCG: deterministic, fast, no dependency.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005u64)
            .wrapping_add(1442695040888963407u64);
        self.0
    }

    fn next_usize(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() as usize) % upper
    }

    fn next_bool(&mut self) -> bool {
        (self.next_u64() & 1) != 0
    }
}

const KINDS: &[&str] = &[
    "section",
    "column",
    "container",
    "flex-container",
    "heading",
    "text",
    "image",
    "button",
    "divider",
    "spacer",
];

fn random_position(rng: &mut Rng) -> DropPosition {
    match rng.next_usize(3) {
        0 => DropPosition::Before,
        1 => DropPosition::After,
        _ => DropPosition::Inside,
    }
}

fn starting_editor() -> PageEditor {
    let registry = WidgetRegistry::with_builtin_widgets();
    let mut builder = PageBuilder::new(&registry);
    let heading = builder.widget("heading");
    let intro = builder.widget("text");
    let hero = builder.container("section", vec![heading, intro]);
    let aside = builder.widget("text");
    let column = builder.container("column", vec![aside]);
    let tree = builder.finish(vec![hero, column]);
    PageEditor::with_tree(tree, registry)
}

/// A fixed two-level page with stable ids, for directed scenarios.
fn two_element_editor() -> PageEditor {
    let tree = PageTree {
        children: vec![
            Element::new("hero", "section"),
            Element::new("para", "text"),
        ],
    };
    PageEditor::with_tree(tree, WidgetRegistry::with_builtin_widgets())
}

fn rect(top: f32, bottom: f32) -> Rect {
    Rect::from_min_max(Pos2::new(0.0, top), Pos2::new(400.0, bottom))
}

// ---------------------------------------------------------------------------
// Randomized invariant regime

#[test]
fn model_random_edit_sequences_preserve_invariants() {
    for seed in 1u64..=10u64 {
        let mut rng = Rng::new(seed);
        let mut editor = starting_editor();
        assert_tree_ok(&editor);

        for _step in 0..300 {
            let ids: Vec<ElementId> = editor
                .tree()
                .iter()
                .map(|element| element.id.clone())
                .collect();
            let pick = if ids.is_empty() {
                None
            } else {
                Some(ids[rng.next_usize(ids.len())].clone())
            };
            // Occasionally target an id that was never (or is no longer)
            // in the tree, to emulate stale references from re-renders.
            let target = if rng.next_usize(6) == 0 {
                Some(ElementId::from("stale-reference"))
            } else if rng.next_bool() {
                pick.clone()
            } else {
                None
            };

            match rng.next_usize(9) {
                0 | 1 => {
                    let kind = KINDS[rng.next_usize(KINDS.len())];
                    editor.begin_palette_drag(kind);
                    let _ = editor.resolve_drop(target.as_ref(), random_position(&mut rng));
                }
                2 => {
                    if let Some(source) = pick {
                        editor.begin_canvas_drag(source);
                        let _ = editor.resolve_drop(target.as_ref(), random_position(&mut rng));
                    }
                }
                3 => {
                    if let Some(id) = pick {
                        let _ = editor.duplicate(&id);
                    }
                }
                4 => {
                    if let Some(id) = target {
                        let _ = editor.delete(&id);
                    }
                }
                5 => {
                    if let Some(id) = pick {
                        let direction = if rng.next_bool() {
                            ReorderDirection::Up
                        } else {
                            ReorderDirection::Down
                        };
                        let _ = editor.reorder(&id, direction);
                    }
                }
                6 => {
                    let _ = editor.undo();
                }
                7 => {
                    let _ = editor.redo();
                }
                _ => {
                    if let Some(id) = pick {
                        if rng.next_bool() {
                            editor.select(id);
                        } else {
                            let _ = editor.update_content(
                                &id,
                                [("text".to_owned(), "edited".into())],
                            );
                        }
                    }
                }
            }

            assert!(!editor.is_dragging(), "a resolved drop must end the drag");
            assert_tree_ok(&editor);
        }
    }
}

#[test]
fn moving_an_ancestor_into_its_descendant_never_changes_the_tree() {
    let tree = PageTree {
        children: vec![Element::new("outer", "section").with_children(vec![
            Element::new("mid", "column").with_children(vec![Element::new("leaf", "text")]),
        ])],
    };
    let mut editor = PageEditor::with_tree(tree.clone(), WidgetRegistry::with_builtin_widgets());

    for position in [DropPosition::Before, DropPosition::After, DropPosition::Inside] {
        editor.begin_canvas_drag("outer");
        let outcome = editor.resolve_drop(Some(&"mid".into()), position);
        assert_eq!(
            outcome,
            MutationOutcome::Rejected(RejectReason::TargetInsideMoved)
        );
        assert_eq!(editor.tree(), &tree);
        assert!(!editor.is_dragging());
    }
}

// ---------------------------------------------------------------------------
// Pointer-driven drops (the abstract drag transport, no rendering surface)

#[test]
fn pointer_release_over_a_container_middle_drops_inside() {
    let mut editor = two_element_editor();
    editor.begin_palette_drag("heading");
    editor.register_element_zones(&"hero".into(), rect(0.0, 100.0));
    editor.register_element_zones(&"para".into(), rect(100.0, 160.0));

    let hover = Pos2::new(50.0, 50.0);
    let _ = editor.handle_pointer_event(PointerEvent::moved(hover));
    let active = editor.active_drop_zone().unwrap();
    assert_eq!(active.to_string(), "hero-inside");

    let outcome = editor.handle_pointer_event(PointerEvent::released(hover));
    assert_eq!(outcome, Some(MutationOutcome::Applied));

    let hero = editor.tree().get(&"hero".into()).unwrap();
    assert_eq!(hero.children.len(), 1);
    assert_eq!(hero.children[0].kind.as_str(), "heading");
    // The dropped widget is selected, the drag is over, zones are gone.
    assert_eq!(editor.selected_element_id(), Some(&hero.children[0].id));
    assert!(!editor.is_dragging());
    assert!(editor.session().zones().is_empty());
}

#[test]
fn pointer_release_in_the_bottom_quartile_drops_after() {
    let mut editor = two_element_editor();
    editor.begin_palette_drag("text");
    editor.register_element_zones(&"para".into(), rect(100.0, 200.0));

    // y=190 of a 100-high box starting at 100: bottom quartile.
    let outcome = editor.handle_pointer_event(PointerEvent::released(Pos2::new(50.0, 190.0)));
    assert_eq!(outcome, Some(MutationOutcome::Applied));

    let top: Vec<&str> = editor
        .tree()
        .children
        .iter()
        .map(|element| element.kind.as_str())
        .collect();
    assert_eq!(top, ["section", "text", "text"]);
}

#[test]
fn middle_band_over_a_leaf_falls_back_to_after() {
    let mut editor = two_element_editor();
    editor.begin_palette_drag("image");
    editor.register_element_zones(&"para".into(), rect(100.0, 200.0));

    let outcome = editor.handle_pointer_event(PointerEvent::released(Pos2::new(50.0, 150.0)));
    assert_eq!(outcome, Some(MutationOutcome::Applied));
    assert_eq!(editor.tree().children[2].kind.as_str(), "image");
}

#[test]
fn release_outside_every_zone_abandons_the_drag() {
    let mut editor = two_element_editor();
    let before = editor.tree().clone();
    editor.begin_palette_drag("heading");
    editor.register_element_zones(&"hero".into(), rect(0.0, 100.0));

    let outcome = editor.handle_pointer_event(PointerEvent::released(Pos2::new(900.0, 900.0)));
    assert_eq!(outcome, None);
    assert_eq!(editor.tree(), &before);
    assert!(!editor.is_dragging());
    assert!(editor.session().zones().is_empty());
}

#[test]
fn cancel_tears_down_the_drag_and_leaves_the_tree_untouched() {
    let mut editor = two_element_editor();
    let before = editor.tree().clone();
    editor.begin_canvas_drag("para");
    editor.register_element_zones(&"hero".into(), rect(0.0, 100.0));

    let _ = editor.handle_pointer_event(PointerEvent::cancelled(Pos2::new(10.0, 10.0)));
    assert_eq!(editor.tree(), &before);
    assert!(!editor.is_dragging());
    assert!(editor.session().zones().is_empty());
}

#[test]
fn canvas_drag_moves_the_subtree_on_release() {
    let mut editor = two_element_editor();
    editor.begin_canvas_drag("para");
    editor.register_element_zones(&"hero".into(), rect(0.0, 100.0));
    // The dragged element itself must not publish zones.
    editor.register_element_zones(&"para".into(), rect(100.0, 160.0));
    assert!(
        editor
            .session()
            .zones()
            .iter()
            .all(|zone| zone.owner.as_str() != "para")
    );

    let outcome = editor.handle_pointer_event(PointerEvent::released(Pos2::new(50.0, 50.0)));
    assert_eq!(outcome, Some(MutationOutcome::Applied));

    assert_eq!(editor.tree().children.len(), 1);
    let hero = editor.tree().get(&"hero".into()).unwrap();
    assert_eq!(hero.children.len(), 1);
    assert_eq!(hero.children[0].id.as_str(), "para");
}

#[test]
fn resolving_a_drop_with_no_active_drag_is_tolerated() {
    let mut editor = two_element_editor();
    let before = editor.tree().clone();
    let outcome = editor.resolve_drop(Some(&"hero".into()), DropPosition::Inside);
    assert_eq!(
        outcome,
        MutationOutcome::Rejected(RejectReason::NoActiveDrag)
    );
    assert_eq!(editor.tree(), &before);
}

#[test]
fn ending_a_drag_twice_equals_ending_it_once() {
    let mut editor = two_element_editor();
    editor.begin_palette_drag("text");
    editor.register_element_zones(&"hero".into(), rect(0.0, 100.0));

    editor.end_drag();
    assert!(!editor.is_dragging());
    assert!(editor.session().zones().is_empty());

    editor.end_drag();
    assert!(!editor.is_dragging());
    assert!(editor.session().zones().is_empty());
}

// ---------------------------------------------------------------------------
// Selection & history coordination

#[test]
fn deleting_the_selected_element_clears_the_selection() {
    let mut editor = two_element_editor();
    editor.select("para");
    assert!(editor.delete(&"para".into()).applied());
    assert_eq!(editor.selected_element_id(), None);
}

#[test]
fn deleting_an_ancestor_of_the_selection_clears_it_too() {
    let tree = PageTree {
        children: vec![Element::new("hero", "section")
            .with_children(vec![Element::new("title", "heading")])],
    };
    let mut editor = PageEditor::with_tree(tree, WidgetRegistry::with_builtin_widgets());
    editor.select("title");
    assert!(editor.delete(&"hero".into()).applied());
    assert_eq!(editor.selected_element_id(), None);
}

#[test]
fn update_merges_without_touching_children_or_kind() {
    let tree = PageTree {
        children: vec![Element::new("hero", "section")
            .with_content("label", "old")
            .with_children(vec![Element::new("title", "heading")])],
    };
    let mut editor = PageEditor::with_tree(tree, WidgetRegistry::with_builtin_widgets());

    let outcome = editor.update_content(
        &"hero".into(),
        [
            ("label".to_owned(), "new".into()),
            ("padding".to_owned(), 12.0.into()),
        ],
    );
    assert!(outcome.applied());

    let hero = editor.tree().get(&"hero".into()).unwrap();
    assert_eq!(hero.content.get("label").and_then(|v| v.as_text()), Some("new"));
    assert!(hero.content.contains_key("padding"));
    assert_eq!(hero.children.len(), 1);
    assert_eq!(hero.kind.as_str(), "section");

    let outcome = editor.update_style(&"hero".into(), [("gap".to_owned(), "8px".to_owned())]);
    assert!(outcome.applied());
    assert_eq!(
        editor.tree().get(&"hero".into()).unwrap().style.get("gap").map(String::as_str),
        Some("8px")
    );

    assert_eq!(
        editor.update_content(&"ghost".into(), [("a".to_owned(), "b".into())]),
        MutationOutcome::Rejected(RejectReason::UnknownElement)
    );
}

#[test]
fn undo_reverses_a_resolved_drop_and_redo_replays_it() {
    let mut editor = two_element_editor();
    let before = editor.tree().clone();

    editor.begin_palette_drag("button");
    let outcome = editor.resolve_drop(Some(&"hero".into()), DropPosition::Inside);
    assert!(outcome.applied());
    let after = editor.tree().clone();
    assert_ne!(before, after);

    assert!(editor.undo());
    assert_eq!(editor.tree(), &before);
    // The dropped (and selected) element no longer exists, so the
    // selection went with it.
    assert_eq!(editor.selected_element_id(), None);

    assert!(editor.redo());
    assert_eq!(editor.tree(), &after);
}

#[test]
fn reorder_via_the_editor_respects_boundaries() {
    let tree = PageTree {
        children: vec![
            Element::new("a", "text"),
            Element::new("b", "text"),
        ],
    };
    let mut editor = PageEditor::with_tree(tree, WidgetRegistry::with_builtin_widgets());

    assert!(!editor.can_move_up(&"a".into()));
    assert!(editor.can_move_down(&"a".into()));
    assert_eq!(
        editor.move_up(&"a".into()),
        MutationOutcome::Rejected(RejectReason::AtBoundary)
    );
    assert!(editor.move_down(&"a".into()).applied());
    assert_eq!(editor.tree().children[1].id.as_str(), "a");
    assert!(!editor.can_move_down(&"a".into()));
}
