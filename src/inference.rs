//! Normalization of the raw type tree.
//!
//! The builder records one node per element occurrence. Normalizing folds
//! runs of same-named siblings into a single list node, bottom-up, merging
//! struct shapes so the list element carries the union of their fields.
//!
//! Only *adjacent* siblings are folded: the builder preserves document
//! order, so repeated tags normally sit next to each other. A merge between
//! non-struct siblings fails; by default that failure is swallowed and the
//! earlier sibling's shape wins, dropping the later one's type information.
//! `Settings::strict` turns the failure into an error instead.
pub mod merge;
pub mod scalar;

pub use merge::merge;

use crate::error::MergeError;
use crate::ident::sanitize;
use crate::ir::TypeNode;
use crate::settings::Settings;

// ------------------------------- Normalize -------------------------------- //

/// A node whose children are being normalized. The children are detached
/// from `node` until they are all done.
struct Frame {
    node: TypeNode,
    pending: std::vec::IntoIter<TypeNode>,
    done: Vec<TypeNode>,
}

impl Frame {
    fn new(mut node: TypeNode) -> Self {
        let children = std::mem::take(&mut node.children);
        let done = Vec::with_capacity(children.len());
        Self { node, pending: children.into_iter(), done }
    }

    /// Reattaches the children, with `current` in the slot being worked on.
    fn reassemble(mut self, current: Option<TypeNode>) -> TypeNode {
        self.done.extend(current);
        self.done.extend(self.pending);
        self.node.children = self.done;
        self.node
    }
}

/// Normalize in place, post-order, without recursing on the call stack.
///
/// # Errors
/// Only in strict mode: the first failed merge. The tree is left partially
/// normalized.
pub fn normalize(node: &mut TypeNode, settings: &Settings) -> Result<(), MergeError> {
    let mut stack = vec![Frame::new(std::mem::take(node))];

    while let Some(top) = stack.last_mut() {
        if let Some(child) = top.pending.next() {
            stack.push(Frame::new(child));
            continue;
        }

        let Some(frame) = stack.pop() else { break };
        let mut finished = frame.reassemble(None);
        let result = coalesce(&mut finished, settings);

        if let Err(error) = result {
            let mut partial = finished;
            while let Some(parent) = stack.pop() {
                partial = parent.reassemble(Some(partial));
            }
            *node = partial;
            return Err(error);
        }
        match stack.last_mut() {
            Some(parent) => parent.done.push(finished),
            None => *node = finished,
        }
    }
    Ok(())
}

/// Folds adjacent same-named children of `node` into list nodes.
fn coalesce(node: &mut TypeNode, settings: &Settings) -> Result<(), MergeError> {
    let children = std::mem::take(&mut node.children);
    let mut kept: Vec<TypeNode> = Vec::with_capacity(children.len());
    let mut prev_key: Option<String> = None;

    let mut children = children.into_iter();
    while let Some(mut child) = children.next() {
        let key = sanitize(&child.raw_name, settings.title_case);
        if let Some(prev) = kept.last_mut().filter(|_| prev_key.as_deref() == Some(key.as_str())) {
            if let Err(error) = merge::merge_in_place(prev, &mut child, settings) {
                if settings.strict {
                    kept.push(child);
                    kept.extend(children);
                    node.children = kept;
                    return Err(error);
                }
                tracing::debug!(%error, "dropped shape of repeated sibling");
            }
            prev.is_list = true;
            continue;
        }
        kept.push(child);
        prev_key = Some(key);
    }

    node.children = kept;
    Ok(())
}

// ------------------------------- Tests ------------------------------------ //
