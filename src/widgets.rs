use std::collections::BTreeMap;

use ahash::HashMap;

use crate::element::{Element, ElementId, PropValue, WidgetKind};

/// Capabilities and defaults for one widget kind.
///
/// The engine only ever reads `container_capable`; the defaults seed new
/// elements dropped from the palette, and `title` is for palette labels.
#[derive(Clone, Debug)]
pub struct WidgetSpec {
    pub title: String,
    pub container_capable: bool,
    pub default_content: BTreeMap<String, PropValue>,
    pub default_style: BTreeMap<String, String>,
}

impl WidgetSpec {
    pub fn leaf(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            container_capable: false,
            default_content: BTreeMap::new(),
            default_style: BTreeMap::new(),
        }
    }

    pub fn container(title: impl Into<String>) -> Self {
        Self {
            container_capable: true,
            ..Self::leaf(title)
        }
    }

    #[must_use]
    pub fn with_content(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.default_content.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_style.insert(key.into(), value.into());
        self
    }
}

/// The `kind -> capabilities` table the engine consults.
///
/// Variants are data, not branches: adding a widget kind means one
/// `register` call, never a change to the mutation engine.
#[derive(Clone, Debug, Default)]
pub struct WidgetRegistry {
    specs: HashMap<WidgetKind, WidgetSpec>,
    palette: Vec<WidgetKind>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the stock widget set.
    pub fn with_builtin_widgets() -> Self {
        let mut registry = Self::new();

        registry.register("section", WidgetSpec::container("Section"));
        registry.register("column", WidgetSpec::container("Column"));
        registry.register("container", WidgetSpec::container("Container"));
        registry.register(
            "flex-container",
            WidgetSpec::container("Flex Container").with_style("display", "flex"),
        );

        registry.register(
            "heading",
            WidgetSpec::leaf("Heading")
                .with_content("text", "Heading")
                .with_style("font-size", "32px"),
        );
        registry.register(
            "text",
            WidgetSpec::leaf("Text").with_content("text", "Paragraph text"),
        );
        registry.register(
            "image",
            WidgetSpec::leaf("Image")
                .with_content("src", "")
                .with_content("alt", ""),
        );
        registry.register(
            "button",
            WidgetSpec::leaf("Button")
                .with_content("label", "Click me")
                .with_content("href", ""),
        );
        registry.register("divider", WidgetSpec::leaf("Divider"));
        registry.register(
            "spacer",
            WidgetSpec::leaf("Spacer").with_content("height", 24.0),
        );
        registry.register(
            "form",
            WidgetSpec::leaf("Form").with_content("action", ""),
        );
        registry.register(
            "input",
            WidgetSpec::leaf("Input")
                .with_content("placeholder", "")
                .with_content("required", false),
        );

        registry
    }

    /// Register (or replace) the spec for `kind`. First registration also
    /// appends the kind to the palette order.
    pub fn register(&mut self, kind: impl Into<WidgetKind>, spec: WidgetSpec) {
        let kind = kind.into();
        if self.specs.insert(kind.clone(), spec).is_none() {
            self.palette.push(kind);
        }
    }

    pub fn spec(&self, kind: &WidgetKind) -> Option<&WidgetSpec> {
        self.specs.get(kind)
    }

    /// Whether elements of `kind` are semantically permitted to hold
    /// children. Unknown kinds are not.
    pub fn is_container_capable(&self, kind: &WidgetKind) -> bool {
        self.specs
            .get(kind)
            .is_some_and(|spec| spec.container_capable)
    }

    /// Registered kinds in registration order, for palette UIs.
    pub fn palette_kinds(&self) -> &[WidgetKind] {
        &self.palette
    }

    /// Seed a new element of `kind` from its declared defaults. Unknown
    /// kinds yield a bare element (the engine does not hard-enforce the
    /// registry).
    pub fn instantiate(&self, kind: &WidgetKind, id: ElementId) -> Element {
        let mut element = Element::new(id, kind.clone());
        if let Some(spec) = self.specs.get(kind) {
            element.content = spec.default_content.clone();
            element.style = spec.default_style.clone();
        }
        element
    }
}
