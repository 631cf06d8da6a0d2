//! Recovery of each source's folder nesting, in merged identifiers.

use super::relocate::RelocationMap;
use crate::models::{NestedSection, RelationInfo, Solution};
use crate::parser;

/// Decode the `NestedProjects` section of `source`, rewriting both ends of
/// every edge through `map` so edges follow relocated entries.
///
/// A source without the section yields an empty result. Solutions assembled
/// in memory have no text; their decoded nesting is used as is.
pub fn extract_nested(source: &Solution, map: &RelocationMap) -> NestedSection {
    let relations: Vec<RelationInfo> = if source.text().is_empty() {
        source.nested.relations().collect()
    } else {
        parser::nested_relations(source.text())
    };

    let mut section = NestedSection::new();
    for relation in relations {
        let child = map.resolve(&source.name, &relation.child);
        let parent = map.resolve(&source.name, &relation.parent);

        if !section.insert(child.clone(), parent) {
            tracing::warn!(
                "{} is nested twice in {}; keeping its first parent",
                child,
                source.name
            );
        }
    }

    section
}
