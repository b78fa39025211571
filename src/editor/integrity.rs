use std::hash::{Hash as _, Hasher as _};

use itertools::Itertools as _;

use crate::element::PageTree;
use crate::widgets::WidgetRegistry;

/// Structural health report for a page tree. Empty means healthy.
///
/// The tree is acyclic by construction (children are owned), so the checks
/// focus on the invariants mutations could still break: id uniqueness plus
/// advisory capability mismatches (the engine does not hard-enforce the
/// registry, but children under a leaf kind usually mean a bug upstream).
pub(super) fn tree_integrity_issues(tree: &PageTree, registry: &WidgetRegistry) -> Vec<String> {
    let mut issues: Vec<String> = Vec::new();

    for id in tree.iter().map(|element| &element.id).duplicates() {
        issues.push(format!("integrity: duplicate element id {id}"));
    }

    for element in tree.iter() {
        if element.id.as_str().is_empty() {
            issues.push("integrity: element with empty id".to_owned());
        }
        if !element.children.is_empty() && !registry.is_container_capable(&element.kind) {
            issues.push(format!(
                "integrity: non-container {} ({}) holds {} children",
                element.id,
                element.kind,
                element.children.len()
            ));
        }
    }

    issues
}

pub(super) fn hash_issues(lines: &[String]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for line in lines {
        line.hash(&mut hasher);
    }
    hasher.finish()
}
