//! Infer Go type definitions from example XML documents.
//!
//! Pipeline: [`populate`] streams the document into a raw type tree,
//! [`inference::normalize`] folds repeated siblings into lists, and
//! [`codegen::render`] prints the canonical declaration.
pub mod cli;
pub mod codegen;
pub mod dump;
pub mod error;
pub mod ident;
pub mod inference;
pub mod ir;
pub mod populate;
pub mod settings;

use std::io::BufRead;

pub use codegen::Rendered;
pub use error::{Error, FormatError, MergeError};
pub use ident::sanitize;
pub use ir::{Kind, TypeNode};
pub use populate::populate;
pub use settings::{MergeOrder, Settings};

// ------------------------------- Front API -------------------------------- //

/// Builds the type tree for one document, normalized unless disabled.
pub fn infer_tree<R: BufRead>(source: R, settings: &Settings) -> Result<TypeNode, Error> {
    let mut root = populate(source, settings)?;
    if settings.normalize {
        inference::normalize(&mut root, settings)?;
    }
    Ok(root)
}

/// Builds and renders the type definition for one document.
///
/// A formatting failure is not an error here; see [`Rendered::format_error`].
pub fn generate<R: BufRead>(source: R, settings: &Settings) -> Result<Rendered, Error> {
    let root = infer_tree(source, settings)?;
    Ok(codegen::render(&root, settings))
}
