use crate::error::MergeError;
use crate::ident::sanitize;
use crate::ir::{Kind, TypeNode};
use crate::settings::{MergeOrder, Settings};

/// Merges the children of `src` into `dst`.
///
/// Both nodes must be structs. Each child of `src` is matched against the
/// children of `dst` by sanitized name (first match wins); matched pairs are
/// reconciled according to `settings.merge_order` and unmatched children are
/// appended to `dst`.
///
/// # Errors
/// `MergeError::NotStructural` if either side is not a struct. `dst` is left
/// untouched in that case.
pub fn merge(dst: &mut TypeNode, mut src: TypeNode, settings: &Settings) -> Result<(), MergeError> {
    merge_in_place(dst, &mut src, settings)
}

/// Like [`merge`], but `src` is only borrowed and is left intact on error.
pub(crate) fn merge_in_place(dst: &mut TypeNode, src: &mut TypeNode, settings: &Settings) -> Result<(), MergeError> {
    if dst.kind != Kind::Struct || src.kind != Kind::Struct {
        return Err(MergeError::NotStructural {
            dst: dst.raw_name.clone(),
            src: src.raw_name.clone(),
            dst_kind: dst.kind,
            src_kind: src.kind,
        });
    }
    deep_merge(dst, src, settings);
    Ok(())
}

/// A struct pair being merged. Matched child pairs are detached from their
/// parents while they are on the stack and put back when they finish.
struct Step {
    dst: TypeNode,
    src: TypeNode,
    next: usize,
    origin: Option<Origin>,
}

#[derive(Clone, Copy)]
struct Origin {
    dst_idx: usize,
    src_idx: usize,
    // the step's dst came from the parent's src side
    swapped: bool,
}

fn deep_merge(dst: &mut TypeNode, src: &mut TypeNode, settings: &Settings) {
    let mut stack = vec![Step {
        dst: std::mem::take(dst),
        src: std::mem::take(src),
        next: 0,
        origin: None,
    }];

    while let Some(top) = stack.last_mut() {
        if top.next < top.src.children.len() {
            let s_idx = top.next;
            top.next += 1;
            if let Some(step) = merge_child(top, s_idx, settings) {
                stack.push(step);
            }
            continue;
        }

        let Some(done) = stack.pop() else { break };
        match (done.origin, stack.last_mut()) {
            (Some(origin), Some(parent)) if origin.swapped => {
                parent.src.children[origin.src_idx] = done.dst;
                parent.dst.children[origin.dst_idx] = done.src;
            }
            (Some(origin), Some(parent)) => {
                parent.dst.children[origin.dst_idx] = done.dst;
                parent.src.children[origin.src_idx] = done.src;
            }
            _ => {
                *dst = done.dst;
                *src = done.src;
            }
        }
    }
}

/// Merges `step.src.children[s_idx]` into `step.dst`. Returns the nested
/// step when the matched pair is itself a pair of structs.
fn merge_child(step: &mut Step, s_idx: usize, settings: &Settings) -> Option<Step> {
    let key = sanitize(&step.src.children[s_idx].raw_name, settings.title_case);
    let found = step
        .dst
        .children
        .iter()
        .position(|d| sanitize(&d.raw_name, settings.title_case) == key);

    let Some(d_idx) = found else {
        let child = match settings.merge_order {
            MergeOrder::Absorb => std::mem::take(&mut step.src.children[s_idx]),
            MergeOrder::Literal => step.src.children[s_idx].clone(),
        };
        step.dst.children.push(child);
        return None;
    };

    let d_child = &mut step.dst.children[d_idx];
    let s_child = &mut step.src.children[s_idx];
    let structs = d_child.kind == Kind::Struct && s_child.kind == Kind::Struct;
    match settings.merge_order {
        MergeOrder::Absorb => {
            d_child.is_list |= s_child.is_list;
            if !structs {
                absorb(d_child, s_child);
                return None;
            }
        }
        // roles swap: the src child receives, failures are dropped
        MergeOrder::Literal if !structs => return None,
        MergeOrder::Literal => {}
    }

    let swapped = settings.merge_order == MergeOrder::Literal;
    let (d_child, s_child) = (std::mem::take(d_child), std::mem::take(s_child));
    let (dst, src) = if swapped { (s_child, d_child) } else { (d_child, s_child) };
    Some(Step {
        dst,
        src,
        next: 0,
        origin: Some(Origin { dst_idx: d_idx, src_idx: s_idx, swapped }),
    })
}

/// Reconciles a matched pair that is not two structs; `dst` keeps the result.
fn absorb(dst: &mut TypeNode, src: &mut TypeNode) {
    if dst.kind == Kind::Unset {
        dst.kind = src.kind;
        dst.children = std::mem::take(&mut src.children);
        return;
    }

    let kind = dst.kind.unify(src.kind);
    if kind != dst.kind {
        tracing::debug!(field = %dst.raw_name, from = %dst.kind, with = %src.kind, to = %kind, "conflicting field kinds");
        dst.kind = kind;
    }
    if kind != Kind::Struct {
        dst.children.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> TypeNode {
        TypeNode::element(name).with_kind(Kind::String)
    }

    fn strukt(name: &str, children: Vec<TypeNode>) -> TypeNode {
        TypeNode::element(name).with_kind(Kind::Struct).with_children(children)
    }

    fn names(node: &TypeNode) -> Vec<&str> {
        node.children.iter().map(|c| c.raw_name.as_str()).collect()
    }

    #[test]
    fn rejects_non_struct_nodes() {
        let settings = Settings::default();
        let mut dst = leaf("a");
        let err = merge(&mut dst, strukt("a", vec![leaf("x"), leaf("y")]), &settings).unwrap_err();
        assert_eq!(
            err,
            MergeError::NotStructural {
                dst: "a".into(),
                src: "a".into(),
                dst_kind: Kind::String,
                src_kind: Kind::Struct,
            }
        );
        assert_eq!(dst, leaf("a"));

        let mut dst = strukt("a", vec![leaf("x"), leaf("y")]);
        assert!(merge(&mut dst, leaf("a"), &settings).is_err());
    }

    #[test]
    fn unions_children_in_dst_order() {
        let mut dst = strukt("p", vec![leaf("name"), leaf("age")]);
        let src = strukt("p", vec![leaf("age"), leaf("email"), leaf("name")]);
        merge(&mut dst, src, &Settings::default()).unwrap();
        assert_eq!(names(&dst), ["name", "age", "email"]);
    }

    #[test]
    fn matches_on_sanitized_names() {
        let mut dst = strukt("p", vec![leaf("first-name"), leaf("x")]);
        let src = strukt("p", vec![leaf("first_name"), leaf("x")]);
        merge(&mut dst, src, &Settings::default()).unwrap();
        assert_eq!(names(&dst), ["first-name", "x"]);
    }

    #[test]
    fn absorbs_nested_structs() {
        let mut dst = strukt("p", vec![strukt("addr", vec![leaf("city"), leaf("zip")]), leaf("id")]);
        let src = strukt("p", vec![strukt("addr", vec![leaf("street"), leaf("city")]), leaf("id")]);
        merge(&mut dst, src, &Settings::default()).unwrap();
        let addr = dst.child("addr").unwrap();
        assert_eq!(names(addr), ["city", "zip", "street"]);
    }

    #[test]
    fn conflicting_kinds_become_interface() {
        let mut dst = strukt("p", vec![leaf("v"), TypeNode::element("n").with_kind(Kind::Int)]);
        let src = strukt(
            "p",
            vec![strukt("v", vec![leaf("a"), leaf("b")]), TypeNode::element("n").with_kind(Kind::Float)],
        );
        merge(&mut dst, src, &Settings::default()).unwrap();
        let v = dst.child("v").unwrap();
        assert_eq!(v.kind, Kind::Interface);
        assert!(v.children.is_empty());
        assert_eq!(dst.child("n").unwrap().kind, Kind::Float);
    }

    #[test]
    fn list_flag_carries_over() {
        let mut dst = strukt("p", vec![leaf("tag"), leaf("x")]);
        let src = strukt("p", vec![leaf("tag").with_list(true), leaf("x")]);
        merge(&mut dst, src, &Settings::default()).unwrap();
        assert!(dst.child("tag").unwrap().is_list);
    }

    #[test]
    fn literal_order_leaves_first_level_matches_untouched() {
        let settings = Settings { merge_order: MergeOrder::Literal, ..Settings::default() };
        let mut dst = strukt("p", vec![strukt("addr", vec![leaf("city"), leaf("zip")]), leaf("id")]);
        let src = strukt(
            "p",
            vec![strukt("addr", vec![leaf("street"), leaf("city")]), leaf("id"), leaf("extra")],
        );
        merge(&mut dst, src, &settings).unwrap();
        // top level still appends unmatched src children
        assert_eq!(names(&dst), ["addr", "id", "extra"]);
        // the matched child received nothing: the recursion merged into src
        assert_eq!(names(dst.child("addr").unwrap()), ["city", "zip"]);
    }

    fn nested(levels: usize, leaf_name: &str) -> TypeNode {
        let mut node = strukt("a", vec![leaf("x"), leaf(leaf_name)]);
        for _ in 1..levels {
            node = strukt("a", vec![leaf("x"), node]);
        }
        node
    }

    #[test]
    fn deep_struct_pairs_merge_iteratively() {
        let levels = 50_000;
        let mut dst = nested(levels, "left");
        merge(&mut dst, nested(levels, "right"), &Settings::default()).unwrap();
        assert_eq!(dst.depth(), levels + 1);

        let mut innermost = &dst;
        while let Some(next) = innermost.child("a") {
            innermost = next;
        }
        assert_eq!(names(innermost), ["x", "left", "right"]);
    }

    #[test]
    fn literal_order_mutates_dst_at_even_depths() {
        let settings = Settings { merge_order: MergeOrder::Literal, ..Settings::default() };
        let inner_dst = strukt("geo", vec![leaf("lat"), leaf("lon")]);
        let inner_src = strukt("geo", vec![leaf("lat"), leaf("alt")]);
        let mut dst = strukt("p", vec![strukt("addr", vec![inner_dst, leaf("zip")]), leaf("id")]);
        let src = strukt("p", vec![strukt("addr", vec![inner_src, leaf("zip")]), leaf("id")]);
        merge(&mut dst, src, &settings).unwrap();
        let geo = dst.child("addr").unwrap().child("geo").unwrap();
        assert_eq!(names(geo), ["lat", "lon", "alt"]);
    }
}
