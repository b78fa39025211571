use std::collections::BTreeMap;
use std::fmt;

/// Stable, tree-unique identifier of an [`Element`].
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Widget kind tag (`"section"`, `"heading"`, ...), resolved against the
/// host's [`crate::WidgetRegistry`]. The engine itself treats kinds as
/// opaque apart from the container-capability flag the registry supplies.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WidgetKind(String);

impl WidgetKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetKind {
    fn from(kind: &str) -> Self {
        Self(kind.to_owned())
    }
}

impl From<String> for WidgetKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

/// One value in an element's open content record. Opaque to the engine;
/// widget renderers and property panels interpret it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PropValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl PropValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) | Self::Flag(_) => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for PropValue {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<bool> for PropValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

/// A node in the page's widget tree.
///
/// `content` and `style` are open key/value records the engine never
/// interprets; `children` are owned by value, so the hierarchy is acyclic
/// by construction and a node's position in `children` is the only
/// ordering signal.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Element {
    pub id: ElementId,
    pub kind: WidgetKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: BTreeMap<String, PropValue>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub style: BTreeMap<String, String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(id: impl Into<ElementId>, kind: impl Into<WidgetKind>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            content: BTreeMap::new(),
            style: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_content(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.content.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    /// Depth-first iteration over this element and all of its descendants,
    /// in document order.
    pub fn iter(&self) -> ElementIter<'_> {
        ElementIter { stack: vec![self] }
    }
}

/// See [`Element::iter`].
pub struct ElementIter<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for ElementIter<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// The page's widget hierarchy. The tree itself is the synthetic root:
/// top-level elements are its `children`, and operations targeting the
/// root splice at the top level.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PageTree {
    pub children: Vec<Element>,
}

impl PageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth-first iteration over every element, in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> + '_ {
        self.children.iter().flat_map(Element::iter)
    }

    /// Total number of elements in the tree.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.iter().find(|element| &element.id == id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        fn find_in<'a>(children: &'a mut [Element], id: &ElementId) -> Option<&'a mut Element> {
            for element in children {
                if &element.id == id {
                    return Some(element);
                }
                if let Some(found) = find_in(&mut element.children, id) {
                    return Some(found);
                }
            }
            None
        }
        find_in(&mut self.children, id)
    }

    /// The parent of `id` and the index of `id` among its siblings.
    /// Top-level elements report `None` as their parent (the synthetic root).
    pub fn parent_of(&self, id: &ElementId) -> Option<(Option<&Element>, usize)> {
        fn locate<'a>(
            children: &'a [Element],
            parent: Option<&'a Element>,
            id: &ElementId,
        ) -> Option<(Option<&'a Element>, usize)> {
            for (index, element) in children.iter().enumerate() {
                if &element.id == id {
                    return Some((parent, index));
                }
                if let Some(found) = locate(&element.children, Some(element), id) {
                    return Some(found);
                }
            }
            None
        }
        locate(&self.children, None, id)
    }

    /// Whether `descendant` lives in the subtree rooted at `ancestor`
    /// (inclusive: every element is its own descendant). Used to forbid
    /// dropping a node into its own subtree.
    pub fn is_descendant(&self, ancestor: &ElementId, descendant: &ElementId) -> bool {
        self.get(ancestor)
            .is_some_and(|element| element.iter().any(|below| &below.id == descendant))
    }

    /// The sibling list containing `id` (its parent's children, or the top
    /// level) together with `id`'s index in it.
    pub(crate) fn siblings_mut(&mut self, id: &ElementId) -> Option<(&mut Vec<Element>, usize)> {
        fn locate<'a>(
            children: &'a mut Vec<Element>,
            id: &ElementId,
        ) -> Option<(&'a mut Vec<Element>, usize)> {
            if let Some(index) = children.iter().position(|element| &element.id == id) {
                return Some((children, index));
            }
            for element in children.iter_mut() {
                if let Some(found) = locate(&mut element.children, id) {
                    return Some(found);
                }
            }
            None
        }
        locate(&mut self.children, id)
    }
}

/// Allocates fresh element ids (`element-<serial>`).
///
/// The serial counter is monotonic, and ids already present in the tree are
/// skipped, so documents loaded with arbitrary ids can keep them.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ElementIdAllocator {
    next_serial: u64,
}

impl Default for ElementIdAllocator {
    fn default() -> Self {
        Self { next_serial: 1 }
    }
}

impl ElementIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_serial(next_serial: u64) -> Self {
        Self {
            next_serial: next_serial.max(1),
        }
    }

    pub fn next_serial(&self) -> u64 {
        self.next_serial
    }

    /// A fresh id not used anywhere in `tree`.
    pub fn allocate(&mut self, tree: &PageTree) -> ElementId {
        loop {
            let id = ElementId::new(format!("element-{}", self.next_serial));
            self.next_serial = self.next_serial.saturating_add(1);
            if !tree.contains(&id) {
                return id;
            }
        }
    }
}
