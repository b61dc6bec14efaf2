//! Run configuration, threaded explicitly through builder, merger and renderer.

/// How a matched child pair is reconciled during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MergeOrder {
    /// The kept child absorbs the discarded child's subtree.
    #[default]
    Absorb,
    /// Recurse as `merge(src_child, dst_child)`, swapping roles at every
    /// level and ignoring nested failures.
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Treat `-` and `_` as word boundaries when building identifiers.
    pub title_case: bool,
    /// Coalesce repeated siblings before rendering.
    pub normalize: bool,
    pub merge_order: MergeOrder,
    /// Return merge failures instead of swallowing them.
    pub strict: bool,
    /// Classify scalar text as bool/int/float instead of always string.
    pub infer_scalars: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title_case: true,
            normalize: true,
            merge_order: MergeOrder::Absorb,
            strict: false,
            infer_scalars: false,
        }
    }
}
