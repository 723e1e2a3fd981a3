//! Per-call traversal state.

use std::fmt::Write;

/// One step of the path from the generated root.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Field(String),
    Index(usize),
    MapKey(usize),
    MapValue(usize),
}

/// Mutable state threaded through one top-level generation.
///
/// The visited stack and the path are strictly push/pop: a branch only
/// sees the composite types of its own ancestors.
#[derive(Debug, Clone)]
pub struct TraversalContext {
    root: String,
    /// Composite types on the current branch, with whether entering
    /// consumed depth
    visited: Vec<(String, bool)>,
    remaining_depth: usize,
    path: Vec<PathSegment>,
}

impl TraversalContext {
    pub fn new(root: impl Into<String>, max_depth: usize) -> Self {
        Self {
            root: root.into(),
            visited: Vec::new(),
            remaining_depth: max_depth,
            path: Vec::new(),
        }
    }

    /// Whether no composite is being populated yet.
    pub fn at_root(&self) -> bool {
        self.visited.is_empty()
    }

    /// Whether `type_name` is being populated higher up this branch.
    pub fn is_visited(&self, type_name: &str) -> bool {
        self.visited.iter().any(|(v, _)| v == type_name)
    }

    pub fn remaining_depth(&self) -> usize {
        self.remaining_depth
    }

    /// Nesting level of composites on the current branch.
    pub fn depth(&self) -> usize {
        self.visited.len()
    }

    /// Enter a composite. Nested composites consume one unit of depth.
    pub fn enter(&mut self, type_name: &str, nested: bool) {
        let consumed = nested && self.remaining_depth > 0;
        if consumed {
            self.remaining_depth -= 1;
        }
        self.visited.push((type_name.to_string(), consumed));
    }

    /// Leave the composite entered last.
    pub fn leave(&mut self) {
        if let Some((_, true)) = self.visited.pop() {
            self.remaining_depth += 1;
        }
    }

    pub fn push_field(&mut self, name: &str) {
        self.path.push(PathSegment::Field(name.to_string()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.path.push(PathSegment::Index(index));
    }

    pub fn push_map_key(&mut self, index: usize) {
        self.path.push(PathSegment::MapKey(index));
    }

    pub fn push_map_value(&mut self, index: usize) {
        self.path.push(PathSegment::MapValue(index));
    }

    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Render the current path, e.g. `Order.items[2].product`.
    pub fn path(&self) -> String {
        let mut rendered = self.root.clone();
        for segment in &self.path {
            // Writing into a String cannot fail
            let _ = match segment {
                PathSegment::Field(name) => write!(rendered, ".{name}"),
                PathSegment::Index(idx) => write!(rendered, "[{idx}]"),
                PathSegment::MapKey(idx) => write!(rendered, "[{idx}]#key"),
                PathSegment::MapValue(idx) => write!(rendered, "[{idx}]#value"),
            };
        }
        rendered
    }
}
