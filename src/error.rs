//! Error types for tree construction, merging and formatting.

use thiserror::Error;

use crate::ir::Kind;

/// Fatal errors while reading a document or writing a dump.
#[derive(Debug, Error)]
pub enum Error {
    /// XML decoding error.
    #[error("XML decoding error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute.
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Name or text is not valid in the document's charset.
    #[error("decoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON dump error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document ended with an element still open.
    #[error("unexpected end of document: element '{element}' is not closed")]
    Unclosed {
        /// Innermost open element.
        element: String,
    },

    /// An end tag appeared with no element open.
    #[error("unexpected end tag '{element}'")]
    UnexpectedEnd {
        /// Name on the end tag.
        element: String,
    },

    /// The tree is nested deeper than a JSON dump supports.
    #[error("type tree is {depth} levels deep, JSON dumps support at most {limit}")]
    TooDeep {
        /// Depth of the tree.
        depth: usize,
        /// Deepest tree accepted.
        limit: usize,
    },

    /// Merge failure surfaced in strict mode.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Error returned when two nodes cannot be merged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// Merging is only defined between two struct nodes.
    #[error("cannot merge '{src}' ({src_kind}) into '{dst}' ({dst_kind}): both must be structs")]
    NotStructural {
        /// Raw name of the receiving node.
        dst: String,
        /// Raw name of the absorbed node.
        src: String,
        /// Kind of the receiving node.
        dst_kind: Kind,
        /// Kind of the absorbed node.
        src_kind: Kind,
    },
}

/// Error from the source formatter. Non-fatal for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("format error at line {line}: {message}")]
pub struct FormatError {
    /// 1-based line in the unformatted source.
    pub line: usize,
    /// What was wrong.
    pub message: String,
}

impl Error {
    /// Creates an unclosed element error.
    pub fn unclosed(element: impl Into<String>) -> Self {
        Self::Unclosed {
            element: element.into(),
        }
    }

    /// Creates an unexpected end tag error.
    pub fn unexpected_end(element: impl Into<String>) -> Self {
        Self::UnexpectedEnd {
            element: element.into(),
        }
    }
}

impl FormatError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}
