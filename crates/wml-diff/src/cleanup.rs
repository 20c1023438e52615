//! Semantic-cleanup pass: merge small equalities surrounded by edits
//! (spec.md §4.3), disabled above a configured character threshold.

use wml_model::{DiffKind, DiffOp};

/// Above this many characters in the larger of the two input texts, the
/// semantic-cleanup pass is skipped (spec.md §4.3: "disabled when the larger
/// of the two texts exceeds a configured character threshold").
pub const DEFAULT_CLEANUP_THRESHOLD: usize = 20_000;

/// An `Equal` op shorter than this, flanked by edits on both sides, is folded
/// into the surrounding edit rather than left standing on its own — it
/// mostly reads as flicker (e.g. the shared space between two changed words)
/// rather than a meaningful kept span.
const SMALL_EQUALITY_CHARS: usize = 2;

/// Merge short equalities sandwiched between edits into their neighbors.
///
/// The result still reconstructs `new` from `old` exactly (soundness is
/// unaffected: an `Equal` segment folded into `Delete`+`Insert` carries the
/// identical text on both sides), it just produces fewer, larger edit spans.
pub fn semantic_cleanup(ops: Vec<DiffOp>, old_len: usize, new_len: usize) -> Vec<DiffOp> {
    if old_len.max(new_len) > DEFAULT_CLEANUP_THRESHOLD {
        return ops;
    }

    let mut out: Vec<DiffOp> = Vec::with_capacity(ops.len());
    let mut i = 0;
    while i < ops.len() {
        let op = &ops[i];
        let is_small_sandwiched_equal = op.kind == DiffKind::Equal
            && op.text.chars().count() <= SMALL_EQUALITY_CHARS
            && i > 0
            && i + 1 < ops.len()
            && ops[i - 1].kind != DiffKind::Equal
            && ops[i + 1].kind != DiffKind::Equal;

        if is_small_sandwiched_equal {
            out.push(DiffOp::delete(op.old_start, op.old_end, op.text.clone()));
            out.push(DiffOp::insert(op.new_start, op.new_end, op.text.clone()));
        } else {
            out.push(op.clone());
        }
        i += 1;
    }

    wml_model::coalesce(out)
}
