use crate::element::{Element, ElementIdAllocator, PageTree, WidgetKind};
use crate::widgets::WidgetRegistry;

/// A small convenience builder for constructing a [`PageTree`] from code.
///
/// This is intentionally lightweight: it only provides an ergonomic way to
/// express scripted default pages (a deterministic starting layout the
/// user then customizes at runtime). For full control you can always
/// construct [`Element`] values and a [`PageTree`] directly.
///
/// Elements are seeded from the registry's declared defaults and get
/// allocator-issued ids, so builder output composes with an editor using
/// the same tree without id collisions.
pub struct PageBuilder<'a> {
    registry: &'a WidgetRegistry,
    ids: ElementIdAllocator,
    // There is no existing tree to collide with while building; the
    // allocator only needs its monotonic serials here.
    scratch: PageTree,
}

impl<'a> PageBuilder<'a> {
    pub fn new(registry: &'a WidgetRegistry) -> Self {
        Self {
            registry,
            ids: ElementIdAllocator::new(),
            scratch: PageTree::new(),
        }
    }

    /// Create an element of `kind`, seeded from the registry defaults.
    #[must_use]
    pub fn widget(&mut self, kind: impl Into<WidgetKind>) -> Element {
        let kind = kind.into();
        let id = self.ids.allocate(&self.scratch);
        self.registry.instantiate(&kind, id)
    }

    /// Create a container-capable element of `kind` holding `children`.
    ///
    /// Panics if the registry does not mark `kind` container-capable;
    /// scripted layouts are authored code, and silently producing a leaf
    /// full of children would only defer the error to the canvas.
    #[must_use]
    pub fn container(
        &mut self,
        kind: impl Into<WidgetKind>,
        children: Vec<Element>,
    ) -> Element {
        let kind = kind.into();
        assert!(
            self.registry.is_container_capable(&kind),
            "container: kind {kind:?} is not container-capable"
        );
        self.widget(kind).with_children(children)
    }

    /// Finish building, producing the tree with `top_level` as the root's
    /// children.
    pub fn finish(self, top_level: Vec<Element>) -> PageTree {
        PageTree {
            children: top_level,
        }
    }

    /// Finish building while mapping every element (pre-order). Returning
    /// `None` drops that element's whole subtree from the output, useful
    /// when a scripted layout references widgets the host has disabled.
    pub fn finish_map(
        self,
        top_level: Vec<Element>,
        mut map: impl FnMut(Element) -> Option<Element>,
    ) -> PageTree {
        fn map_element(
            element: Element,
            map: &mut impl FnMut(Element) -> Option<Element>,
        ) -> Option<Element> {
            let mut element = map(element)?;
            let children = std::mem::take(&mut element.children);
            element.children = children
                .into_iter()
                .filter_map(|child| map_element(child, map))
                .collect();
            Some(element)
        }

        PageTree {
            children: top_level
                .into_iter()
                .filter_map(|element| map_element(element, &mut map))
                .collect(),
        }
    }
}
