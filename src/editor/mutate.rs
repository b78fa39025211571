use std::fmt;

use crate::element::{Element, ElementId, ElementIdAllocator, PageTree};
use crate::widgets::WidgetRegistry;

use super::zones::DropPosition;

/// Result of a structural operation.
///
/// The engine has no fatal error conditions: dangling ids, cycle-creating
/// moves, and stale references from async re-renders all degrade to a
/// rejection that leaves the tree untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Rejected(RejectReason),
}

impl MutationOutcome {
    pub fn applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Why a structural operation was rejected. For logs and debug output;
/// callers are not expected to branch on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The operand element id is not (or no longer) in the tree.
    UnknownElement,
    /// The target element id is not (or no longer) in the tree.
    UnknownTarget,
    /// Moving an element into its own subtree would orphan it.
    TargetInsideMoved,
    /// `inside` drops require a container-capable target.
    TargetNotContainer,
    /// Reorder hit the first/last sibling boundary.
    AtBoundary,
    /// A drop was resolved with no drag in flight.
    NoActiveDrag,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnknownElement => "unknown element id",
            Self::UnknownTarget => "unknown target id",
            Self::TargetInsideMoved => "target is inside the moved subtree",
            Self::TargetNotContainer => "target is not container-capable",
            Self::AtBoundary => "already at the sibling boundary",
            Self::NoActiveDrag => "no active drag",
        };
        f.write_str(text)
    }
}

/// Direction for [`reorder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderDirection {
    Up,
    Down,
}

/// Splice `element` into the tree relative to `target`.
///
/// - `before`/`after`: insert into the target's sibling list immediately
///   before/after the target.
/// - `inside`: append to the target's children; requires the target's kind
///   to be container-capable per the registry.
/// - `target == None` is the synthetic root: the element lands at the top
///   level (`before` prepends, anything else appends).
pub fn insert(
    tree: &mut PageTree,
    element: Element,
    target: Option<&ElementId>,
    position: DropPosition,
    registry: &WidgetRegistry,
) -> MutationOutcome {
    let Some(target_id) = target else {
        match position {
            DropPosition::Before => tree.children.insert(0, element),
            DropPosition::After | DropPosition::Inside => tree.children.push(element),
        }
        return MutationOutcome::Applied;
    };

    match position {
        DropPosition::Before | DropPosition::After => {
            let Some((siblings, index)) = tree.siblings_mut(target_id) else {
                return MutationOutcome::Rejected(RejectReason::UnknownTarget);
            };
            let at = match position {
                DropPosition::Before => index,
                DropPosition::After | DropPosition::Inside => index + 1,
            };
            siblings.insert(at, element);
            MutationOutcome::Applied
        }
        DropPosition::Inside => match tree.get_mut(target_id) {
            Some(container) if registry.is_container_capable(&container.kind) => {
                container.children.push(element);
                MutationOutcome::Applied
            }
            Some(_) => MutationOutcome::Rejected(RejectReason::TargetNotContainer),
            None => MutationOutcome::Rejected(RejectReason::UnknownTarget),
        },
    }
}

/// Relocate the subtree rooted at `element_id`: detach it, then re-insert
/// it relative to `target` per [`insert`]'s contract.
///
/// Every precondition is verified *before* the detach so a rejected move
/// leaves the tree byte-for-byte unchanged. In particular, moving an
/// element into its own descendant is rejected outright (the detach would
/// otherwise take the target with it and the subtree would be lost).
pub fn move_element(
    tree: &mut PageTree,
    element_id: &ElementId,
    target: Option<&ElementId>,
    position: DropPosition,
    registry: &WidgetRegistry,
) -> MutationOutcome {
    if !tree.contains(element_id) {
        return MutationOutcome::Rejected(RejectReason::UnknownElement);
    }
    if let Some(target_id) = target {
        let Some(target_element) = tree.get(target_id) else {
            return MutationOutcome::Rejected(RejectReason::UnknownTarget);
        };
        if position == DropPosition::Inside && !registry.is_container_capable(&target_element.kind)
        {
            return MutationOutcome::Rejected(RejectReason::TargetNotContainer);
        }
        if tree.is_descendant(element_id, target_id) {
            return MutationOutcome::Rejected(RejectReason::TargetInsideMoved);
        }
    }

    let Some(subtree) = detach(tree, element_id) else {
        return MutationOutcome::Rejected(RejectReason::UnknownElement);
    };
    // The target was verified to exist outside the detached subtree, so
    // this insert cannot miss.
    insert(tree, subtree, target, position, registry)
}

/// Remove and return the subtree rooted at `id`. `None` if the id is
/// dangling (no-op).
pub fn detach(tree: &mut PageTree, id: &ElementId) -> Option<Element> {
    let (siblings, index) = tree.siblings_mut(id)?;
    Some(siblings.remove(index))
}

/// Deep-clone the subtree rooted at `id`, assigning fresh ids to every
/// node in the clone, and insert the clone as the immediate next sibling
/// of the original. Returns the clone's root id.
pub fn duplicate(
    tree: &mut PageTree,
    id: &ElementId,
    ids: &mut ElementIdAllocator,
) -> Option<ElementId> {
    let original = tree.get(id)?.clone();
    let clone = reassign_ids(original, tree, ids);
    let clone_id = clone.id.clone();

    let (siblings, index) = tree.siblings_mut(id)?;
    siblings.insert(index + 1, clone);
    Some(clone_id)
}

fn reassign_ids(
    mut element: Element,
    tree: &PageTree,
    ids: &mut ElementIdAllocator,
) -> Element {
    element.id = ids.allocate(tree);
    let children = std::mem::take(&mut element.children);
    element.children = children
        .into_iter()
        .map(|child| reassign_ids(child, tree, ids))
        .collect();
    element
}

/// Swap `id` with its adjacent sibling in `direction`. No-op at the
/// boundary (already first/last).
pub fn reorder(
    tree: &mut PageTree,
    id: &ElementId,
    direction: ReorderDirection,
) -> MutationOutcome {
    let Some((siblings, index)) = tree.siblings_mut(id) else {
        return MutationOutcome::Rejected(RejectReason::UnknownElement);
    };
    match direction {
        ReorderDirection::Up if index > 0 => {
            siblings.swap(index - 1, index);
            MutationOutcome::Applied
        }
        ReorderDirection::Down if index + 1 < siblings.len() => {
            siblings.swap(index, index + 1);
            MutationOutcome::Applied
        }
        ReorderDirection::Up | ReorderDirection::Down => {
            MutationOutcome::Rejected(RejectReason::AtBoundary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> WidgetRegistry {
        WidgetRegistry::with_builtin_widgets()
    }

    fn two_siblings() -> PageTree {
        PageTree {
            children: vec![
                Element::new("a", "text"),
                Element::new("b", "column"),
            ],
        }
    }

    fn top_ids(tree: &PageTree) -> Vec<&str> {
        tree.children.iter().map(|element| element.id.as_str()).collect()
    }

    #[test]
    fn insert_before_and_after_splice_around_the_target() {
        let registry = registry();

        let mut tree = two_siblings();
        let outcome = insert(
            &mut tree,
            Element::new("c", "text"),
            Some(&"b".into()),
            DropPosition::Before,
            &registry,
        );
        assert!(outcome.applied());
        assert_eq!(top_ids(&tree), ["a", "c", "b"]);

        let mut tree = two_siblings();
        insert(
            &mut tree,
            Element::new("c", "text"),
            Some(&"b".into()),
            DropPosition::After,
            &registry,
        );
        assert_eq!(top_ids(&tree), ["a", "b", "c"]);
    }

    #[test]
    fn insert_inside_appends_to_container_children() {
        let registry = registry();
        let mut tree = two_siblings();
        let outcome = insert(
            &mut tree,
            Element::new("c", "text"),
            Some(&"b".into()),
            DropPosition::Inside,
            &registry,
        );
        assert!(outcome.applied());
        let container = tree.get(&"b".into()).unwrap();
        assert_eq!(container.children.len(), 1);
        assert_eq!(container.children[0].id.as_str(), "c");
    }

    #[test]
    fn insert_inside_a_leaf_is_rejected() {
        let registry = registry();
        let mut tree = two_siblings();
        let before = tree.clone();
        let outcome = insert(
            &mut tree,
            Element::new("c", "text"),
            Some(&"a".into()),
            DropPosition::Inside,
            &registry,
        );
        assert_eq!(
            outcome,
            MutationOutcome::Rejected(RejectReason::TargetNotContainer)
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn insert_with_dangling_target_is_a_no_op() {
        let registry = registry();
        let mut tree = two_siblings();
        let before = tree.clone();
        let outcome = insert(
            &mut tree,
            Element::new("c", "text"),
            Some(&"ghost".into()),
            DropPosition::After,
            &registry,
        );
        assert_eq!(outcome, MutationOutcome::Rejected(RejectReason::UnknownTarget));
        assert_eq!(tree, before);
    }

    #[test]
    fn insert_at_the_synthetic_root() {
        let registry = registry();
        let mut tree = two_siblings();
        insert(
            &mut tree,
            Element::new("front", "text"),
            None,
            DropPosition::Before,
            &registry,
        );
        insert(
            &mut tree,
            Element::new("back", "text"),
            None,
            DropPosition::Inside,
            &registry,
        );
        assert_eq!(top_ids(&tree), ["front", "a", "b", "back"]);
    }

    #[test]
    fn move_into_own_descendant_leaves_the_tree_unchanged() {
        let registry = registry();
        let mut tree = PageTree {
            children: vec![Element::new("outer", "section").with_children(vec![
                Element::new("mid", "column")
                    .with_children(vec![Element::new("leaf", "text")]),
            ])],
        };
        let before = tree.clone();

        for position in [DropPosition::Before, DropPosition::After, DropPosition::Inside] {
            let outcome = move_element(
                &mut tree,
                &"outer".into(),
                Some(&"mid".into()),
                position,
                &registry,
            );
            assert_eq!(
                outcome,
                MutationOutcome::Rejected(RejectReason::TargetInsideMoved),
                "{position} must not orphan the subtree"
            );
            assert_eq!(tree, before);
        }

        // Moving onto itself is the same violation.
        let outcome = move_element(
            &mut tree,
            &"outer".into(),
            Some(&"outer".into()),
            DropPosition::After,
            &registry,
        );
        assert_eq!(
            outcome,
            MutationOutcome::Rejected(RejectReason::TargetInsideMoved)
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn move_detaches_and_reinserts() {
        let registry = registry();
        let mut tree = PageTree {
            children: vec![
                Element::new("a", "text"),
                Element::new("b", "column").with_children(vec![Element::new("b1", "text")]),
            ],
        };
        let outcome = move_element(
            &mut tree,
            &"a".into(),
            Some(&"b".into()),
            DropPosition::Inside,
            &registry,
        );
        assert!(outcome.applied());
        assert_eq!(top_ids(&tree), ["b"]);
        let container = tree.get(&"b".into()).unwrap();
        let child_ids: Vec<&str> = container
            .children
            .iter()
            .map(|child| child.id.as_str())
            .collect();
        assert_eq!(child_ids, ["b1", "a"]);
    }

    #[test]
    fn move_to_root_hoists_the_subtree() {
        let registry = registry();
        let mut tree = PageTree {
            children: vec![Element::new("b", "column")
                .with_children(vec![Element::new("b1", "text")])],
        };
        let outcome = move_element(
            &mut tree,
            &"b1".into(),
            None,
            DropPosition::After,
            &registry,
        );
        assert!(outcome.applied());
        assert_eq!(top_ids(&tree), ["b", "b1"]);
        assert!(tree.get(&"b".into()).unwrap().children.is_empty());
    }

    #[test]
    fn duplicate_inserts_a_fresh_id_clone_right_after_the_original() {
        let mut tree = PageTree {
            children: vec![
                Element::new("a", "column")
                    .with_content("text", "hello")
                    .with_children(vec![Element::new("a1", "text")]),
                Element::new("b", "text"),
            ],
        };
        let mut ids = ElementIdAllocator::new();
        let clone_id = duplicate(&mut tree, &"a".into(), &mut ids).unwrap();

        assert_eq!(tree.children.len(), 3);
        assert_eq!(tree.children[1].id, clone_id);
        assert_ne!(clone_id.as_str(), "a");

        let original = &tree.children[0];
        let clone = &tree.children[1];
        assert_eq!(clone.kind, original.kind);
        assert_eq!(clone.content, original.content);
        assert_eq!(clone.children.len(), 1);
        assert_ne!(clone.children[0].id, original.children[0].id);

        // Every id in the result is unique.
        let mut seen = std::collections::BTreeSet::new();
        for element in tree.iter() {
            assert!(seen.insert(element.id.clone()), "duplicate id {}", element.id);
        }
    }

    #[test]
    fn duplicate_of_a_dangling_id_is_a_no_op() {
        let mut tree = two_siblings();
        let before = tree.clone();
        let mut ids = ElementIdAllocator::new();
        assert!(duplicate(&mut tree, &"ghost".into(), &mut ids).is_none());
        assert_eq!(tree, before);
    }

    #[test]
    fn reorder_swaps_neighbours_and_respects_boundaries() {
        let mut tree = PageTree {
            children: vec![
                Element::new("a", "text"),
                Element::new("b", "text"),
                Element::new("c", "text"),
            ],
        };

        assert!(reorder(&mut tree, &"b".into(), ReorderDirection::Up).applied());
        assert_eq!(top_ids(&tree), ["b", "a", "c"]);

        assert_eq!(
            reorder(&mut tree, &"b".into(), ReorderDirection::Up),
            MutationOutcome::Rejected(RejectReason::AtBoundary)
        );
        assert_eq!(
            reorder(&mut tree, &"c".into(), ReorderDirection::Down),
            MutationOutcome::Rejected(RejectReason::AtBoundary)
        );
        assert_eq!(top_ids(&tree), ["b", "a", "c"]);
    }
}
