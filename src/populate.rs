//! Streams XML events into a raw (unnormalized) type tree.
//!
//! Each open element is a frame on an explicit stack; closing an element
//! classifies it and attaches it to the frame below. The bottom frame is the
//! synthetic document root.
//!
//! Names and text are decoded with the charset the document declares
//! (UTF-8 when it declares none).
use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};

use crate::error::Error;
use crate::inference::scalar;
use crate::ir::{Kind, TypeNode};
use crate::settings::Settings;

struct Frame {
    node: TypeNode,
    text: String,
}

/// Builds the raw type tree for one document.
///
/// # Errors
/// Returns `Error` on malformed XML, bytes that are invalid in the declared
/// charset, an end tag with no open element, or elements still open at end
/// of input.
pub fn populate<R: BufRead>(source: R, settings: &Settings) -> Result<TypeNode, Error> {
    let mut reader = Reader::from_reader(source);
    let mut stack = vec![Frame { node: TypeNode::root(), text: String::new() }];
    let mut buf = Vec::new();
    let mut elements = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                stack.push(open(e, reader.decoder())?);
                elements += 1;
            }
            Event::Empty(ref e) => {
                let frame = open(e, reader.decoder())?;
                close(&mut stack, frame, settings);
                elements += 1;
            }
            Event::End(ref e) => {
                if stack.len() < 2 {
                    let name = reader.decoder().decode(e.local_name().into_inner())?;
                    return Err(Error::unexpected_end(name));
                }
                if let Some(frame) = stack.pop() {
                    close(&mut stack, frame, settings);
                }
            }
            Event::Text(ref t) => {
                let text = t.decode()?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(ref t) => {
                let text = t.decode()?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if stack.len() > 1 {
        let innermost = stack.pop().map(|mut f| std::mem::take(&mut f.node.raw_name)).unwrap_or_default();
        return Err(Error::unclosed(innermost));
    }
    let root = stack.pop().map(|f| f.node).unwrap_or_else(TypeNode::root);

    tracing::debug!(elements, top_level = root.children.len(), "populated type tree");
    Ok(root)
}

/// New frame for a start tag, with one leaf per attribute except `xmlns`.
fn open(e: &BytesStart<'_>, decoder: Decoder) -> Result<Frame, Error> {
    let name = decoder.decode(e.local_name().into_inner())?;
    let mut node = TypeNode::element(name);

    for attr in e.attributes() {
        let attr = attr?;
        let key = decoder.decode(attr.key.local_name().into_inner())?;
        if key == "xmlns" {
            continue;
        }
        node.children.push(TypeNode::attribute(key));
    }

    Ok(Frame { node, text: String::new() })
}

/// Classifies a finished element and attaches it to its parent frame.
fn close(stack: &mut [Frame], frame: Frame, settings: &Settings) {
    let Frame { mut node, text } = frame;

    // An element with a single attribute and no sub-elements can't be told
    // apart from text content, so it stays a scalar.
    if node.children.len() > 1 {
        node.kind = Kind::Struct;
    } else {
        node.children.clear();
        node.kind = if settings.infer_scalars {
            scalar::classify(&text)
        } else {
            Kind::String
        };
    }

    if let Some(parent) = stack.last_mut() {
        parent.node.children.push(node);
    }
}
