use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::guid::Guid;

/// A `child = parent` nesting edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationInfo {
    pub child: Guid,
    pub parent: Guid,
}

/// The decoded `GlobalSection(NestedProjects)` of a solution.
///
/// Each child has at most one parent; edges keep insertion order, which is
/// the order they are written back out in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedSection {
    edges: IndexMap<Guid, Guid>,
}

impl NestedSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge. Returns `false` and leaves the section unchanged when the
    /// child already has a parent.
    pub fn insert(&mut self, child: Guid, parent: Guid) -> bool {
        if self.edges.contains_key(&child) {
            return false;
        }
        self.edges.insert(child, parent);
        true
    }

    /// Move a child under a different parent, keeping its position.
    pub fn set_parent(&mut self, child: Guid, parent: Guid) {
        self.edges.insert(child, parent);
    }

    pub fn parent_of(&self, child: &Guid) -> Option<&Guid> {
        self.edges.get(child)
    }

    pub fn children_of<'a>(&'a self, parent: &'a Guid) -> impl Iterator<Item = &'a Guid> + 'a {
        self.edges
            .iter()
            .filter(move |(_, p)| *p == parent)
            .map(|(child, _)| child)
    }

    pub fn has_children(&self, parent: &Guid) -> bool {
        self.edges.values().any(|p| p == parent)
    }

    pub fn relations(&self) -> impl Iterator<Item = RelationInfo> + '_ {
        self.edges.iter().map(|(child, parent)| RelationInfo {
            child: child.clone(),
            parent: parent.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Find a cycle reachable by following parent edges.
    ///
    /// Walks start from each child in insertion order; the returned nodes
    /// begin at the first node the walk revisited.
    pub fn find_cycle(&self) -> Option<Vec<Guid>> {
        let mut acyclic: HashSet<&Guid> = HashSet::new();

        for start in self.edges.keys() {
            if acyclic.contains(start) {
                continue;
            }

            let mut path: Vec<&Guid> = Vec::new();
            let mut on_path: HashSet<&Guid> = HashSet::new();
            let mut current = Some(start);

            while let Some(node) = current {
                if acyclic.contains(node) {
                    break;
                }
                if !on_path.insert(node) {
                    let entry = path.iter().position(|n| *n == node).unwrap_or(0);
                    return Some(path[entry..].iter().map(|g| (*g).clone()).collect());
                }
                path.push(node);
                current = self.edges.get(node);
            }

            acyclic.extend(path);
        }

        None
    }
}

impl FromIterator<RelationInfo> for NestedSection {
    fn from_iter<I: IntoIterator<Item = RelationInfo>>(iter: I) -> Self {
        let mut section = Self::new();
        for relation in iter {
            section.insert(relation.child, relation.parent);
        }
        section
    }
}

/// Writes the section as a `.sln` global section, one edge per line.
impl fmt::Display for NestedSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\tGlobalSection(NestedProjects) = preSolution\r\n")?;
        for (child, parent) in &self.edges {
            write!(f, "\t\t{} = {}\r\n", child, parent)?;
        }
        write!(f, "\tEndGlobalSection\r\n")
    }
}
