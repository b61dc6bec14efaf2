//! Go source emission for a type tree.
//!
//! `Codegen` produces the raw declaration; `render` runs it through the
//! formatter in [`fmt`] and keeps the raw text when formatting fails.
pub mod fmt;

use crate::error::FormatError;
use crate::ident::sanitize;
use crate::ir::{Kind, TypeNode};
use crate::settings::Settings;

pub struct Codegen {
    title_case: bool,
    out: String,
}

/// Formatted source, or the raw source plus the reason formatting failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub source: String,
    pub format_error: Option<FormatError>,
}

impl Codegen {
    pub fn new(settings: &Settings) -> Self {
        Self { title_case: settings.title_case, out: String::new() }
    }

    pub fn emit(&mut self, root: &TypeNode) {
        self.out.push_str("type ");

        let mut stack = vec![Visit::Open(root, 0)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Open(node, depth) => {
                    self.open_node(node, depth);
                    if node.kind == Kind::Struct {
                        stack.push(Visit::Close(node, depth));
                        stack.extend(node.children.iter().rev().map(|c| Visit::Open(c, depth + 1)));
                    } else {
                        self.end_field(node, depth);
                    }
                }
                Visit::Close(node, depth) => {
                    self.indent(depth);
                    self.out.push('}');
                    self.end_field(node, depth);
                }
            }
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn indent(&mut self, depth: usize) {
        self.out.extend(std::iter::repeat_n('\t', depth));
    }

    fn open_node(&mut self, node: &TypeNode, depth: usize) {
        self.indent(depth);
        self.out.push_str(&sanitize(&node.raw_name, self.title_case));
        self.out.push(' ');
        if node.is_list {
            self.out.push_str("[]");
        }
        self.out.push_str(node.kind.as_str());
        if node.kind == Kind::Struct {
            self.out.push_str(" {\n");
        }
    }

    fn end_field(&mut self, node: &TypeNode, depth: usize) {
        // the root has no field, so no tag
        if depth != 0 {
            self.out.push(' ');
            self.out.push_str(&tag(node));
        }
        self.out.push('\n');
    }
}

enum Visit<'a> {
    Open(&'a TypeNode, usize),
    Close(&'a TypeNode, usize),
}

/// Field tag carrying the element or attribute name as written in the document.
pub fn tag(node: &TypeNode) -> String {
    if node.is_attribute {
        format!("`xml:\"{},attr\"`", node.raw_name)
    } else {
        format!("`xml:\"{}\"`", node.raw_name)
    }
}

/// Renders the canonical declaration for `root`.
pub fn render(root: &TypeNode, settings: &Settings) -> Rendered {
    let mut cg = Codegen::new(settings);
    cg.emit(root);
    let unformatted = cg.into_string();

    match fmt::format_source(&unformatted) {
        Ok(source) => Rendered { source, format_error: None },
        Err(error) => {
            tracing::warn!(%error, "emitting unformatted source");
            Rendered { source: unformatted, format_error: Some(error) }
        }
    }
}
