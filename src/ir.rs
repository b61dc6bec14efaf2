// Type tree for codegen. One node per element/attribute position.

use std::fmt;

use serde::{Serialize, Serializer};

/// Inferred classification of a node.
///
/// XML values are translated to Go types as follows:
/// conflicting scalars → `interface{}`, bool → `bool`, integer → `int64`,
/// float → `float64`, text → `string`, element with children → `struct`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    #[default]
    Unset,
    Interface,
    Bool,
    Int,
    Float,
    String,
    Struct,
}

impl Kind {
    /// Least kind covering both sides. Numeric kinds widen to `Float`;
    /// any other disagreement becomes `Interface`.
    pub fn unify(self, other: Kind) -> Kind {
        match (self, other) {
            (a, b) if a == b => a,
            (Kind::Unset, x) | (x, Kind::Unset) => x,
            (Kind::Int, Kind::Float) | (Kind::Float, Kind::Int) => Kind::Float,
            _ => Kind::Interface,
        }
    }

    /// Go type token.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Unset => "unset",
            Kind::Interface => "interface{}",
            Kind::Bool => "bool",
            Kind::Int => "int64",
            Kind::Float => "float64",
            Kind::String => "string",
            Kind::Struct => "struct",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Dumps show the same token the renderer prints.
impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One element or attribute position.
///
/// Document nesting is unbounded, so `Clone` and `Drop` walk the tree with
/// an explicit stack.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct TypeNode {
    #[serde(rename = "name")]
    pub raw_name: String,
    #[serde(rename = "attr")]
    pub is_attribute: bool,
    #[serde(rename = "list", skip_serializing_if = "std::ops::Not::not")]
    pub is_list: bool,
    #[serde(rename = "type")]
    pub kind: Kind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TypeNode>, // document order; merges append
}

impl TypeNode {
    /// The synthetic document root.
    pub fn root() -> Self {
        Self::default().with_kind(Kind::Struct)
    }

    pub fn element(name: impl Into<String>) -> Self {
        Self {
            raw_name: name.into(),
            is_attribute: false,
            is_list: false,
            kind: Kind::Unset,
            children: Vec::new(),
        }
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        let mut node = Self::element(name).with_kind(Kind::String);
        node.is_attribute = true;
        node
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_list(mut self, is_list: bool) -> Self {
        self.is_list = is_list;
        self
    }

    pub fn with_children(mut self, children: Vec<TypeNode>) -> Self {
        self.children = children;
        self
    }

    /// Looks up a direct child by raw name.
    pub fn child(&self, raw_name: &str) -> Option<&TypeNode> {
        self.children.iter().find(|c| c.raw_name == raw_name)
    }

    /// Number of nodes on the longest path from `self` down to a leaf.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }

    fn shallow_copy(&self, children: Vec<TypeNode>) -> Self {
        Self {
            raw_name: self.raw_name.clone(),
            is_attribute: self.is_attribute,
            is_list: self.is_list,
            kind: self.kind,
            children,
        }
    }
}

impl Clone for TypeNode {
    fn clone(&self) -> Self {
        // (original, children not yet visited, copies of visited children)
        let mut stack = vec![(self, self.children.iter(), Vec::with_capacity(self.children.len()))];
        let mut copy = None;
        while let Some((_, pending, _)) = stack.last_mut() {
            if let Some(child) = pending.next() {
                stack.push((child, child.children.iter(), Vec::with_capacity(child.children.len())));
                continue;
            }
            let Some((node, _, children)) = stack.pop() else { break };
            let node = node.shallow_copy(children);
            match stack.last_mut() {
                Some((_, _, siblings)) => siblings.push(node),
                None => copy = Some(node),
            }
        }
        copy.unwrap_or_default()
    }
}

impl Drop for TypeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
