//! Dispatch tokenized text to `similar`'s diff algorithm and translate the
//! result into canonical [`wml_model::DiffOp`]s (spec.md §4.3).

use crate::cleanup::semantic_cleanup;
use crate::tokenizer::{tokenize, Token};
use similar::{capture_diff_slices, Algorithm};
use wml_model::{coalesce, DiffOp};

/// Wraps a [`Token`] so `similar` compares tokens by their text only,
/// independent of their byte offsets (two occurrences of the word "the" at
/// different positions are the same symbol in the private code plane
/// spec.md §4.3 describes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Symbol<'a>(&'a str);

/// Diff `old` against `new` at word granularity, returning a canonical,
/// coalesced sequence of `Equal`/`Insert`/`Delete` ops such that applying
/// them to `old` reproduces `new` exactly (spec.md §4.3 contract).
///
/// `apply_semantic_cleanup` toggles the small-equality-folding pass; the pass
/// is itself a no-op above [`crate::cleanup::DEFAULT_CLEANUP_THRESHOLD`].
#[tracing::instrument(skip(old, new), fields(old_len = old.len(), new_len = new.len()))]
pub fn diff_words(old: &str, new: &str, apply_semantic_cleanup: bool) -> Vec<DiffOp> {
    if old == new {
        return vec![DiffOp::equal(0, old.len(), 0, new.len(), old)];
    }

    let old_tokens = tokenize(old);
    let new_tokens = tokenize(new);
    let old_symbols: Vec<Symbol<'_>> = old_tokens.iter().map(|t| Symbol(t.text)).collect();
    let new_symbols: Vec<Symbol<'_>> = new_tokens.iter().map(|t| Symbol(t.text)).collect();

    let raw_ops = capture_diff_slices(Algorithm::Myers, &old_symbols, &new_symbols);
    let mut ops = Vec::with_capacity(raw_ops.len());
    for op in raw_ops {
        translate(op, &old_tokens, &new_tokens, &mut ops);
    }
    let ops = coalesce(ops);

    if apply_semantic_cleanup {
        semantic_cleanup(ops, old.len(), new.len())
    } else {
        ops
    }
}

fn translate(
    op: similar::DiffOp,
    old_tokens: &[Token<'_>],
    new_tokens: &[Token<'_>],
    out: &mut Vec<DiffOp>,
) {
    use similar::DiffOp as SimilarOp;
    match op {
        SimilarOp::Equal { old_index, new_index, len } => {
            if len == 0 {
                return;
            }
            let old_start = old_tokens[old_index].start;
            let old_end = old_tokens[old_index + len - 1].end;
            let new_start = new_tokens[new_index].start;
            let new_end = new_tokens[new_index + len - 1].end;
            let text: String = old_tokens[old_index..old_index + len]
                .iter()
                .map(|t| t.text)
                .collect();
            out.push(DiffOp::equal(old_start, old_end, new_start, new_end, text));
        }
        SimilarOp::Delete { old_index, old_len, .. } => {
            if old_len == 0 {
                return;
            }
            let old_start = old_tokens[old_index].start;
            let old_end = old_tokens[old_index + old_len - 1].end;
            let text: String = old_tokens[old_index..old_index + old_len]
                .iter()
                .map(|t| t.text)
                .collect();
            out.push(DiffOp::delete(old_start, old_end, text));
        }
        SimilarOp::Insert { new_index, new_len, .. } => {
            if new_len == 0 {
                return;
            }
            let new_start = new_tokens[new_index].start;
            let new_end = new_tokens[new_index + new_len - 1].end;
            let text: String = new_tokens[new_index..new_index + new_len]
                .iter()
                .map(|t| t.text)
                .collect();
            out.push(DiffOp::insert(new_start, new_end, text));
        }
        SimilarOp::Replace {
            old_index,
            old_len,
            new_index,
            new_len,
        } => {
            translate(
                SimilarOp::Delete { old_index, old_len, new_index },
                old_tokens,
                new_tokens,
                out,
            );
            translate(
                SimilarOp::Insert { old_index, new_index, new_len },
                old_tokens,
                new_tokens,
                out,
            );
        }
    }
}

/// Reconstruct `new` by applying `ops` to `old`. Used by tests and by
/// callers validating diff soundness (spec.md §8).
pub fn apply_ops(old: &str, ops: &[DiffOp]) -> String {
    let mut out = String::new();
    for op in ops {
        match op.kind {
            wml_model::DiffKind::Equal | wml_model::DiffKind::Insert => out.push_str(&op.text),
            wml_model::DiffKind::Delete => {}
        }
    }
    let _ = old;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_change_yields_single_equal_op() {
        let ops = diff_words("same text", "same text", true);
        assert_eq!(ops.len(), 1);
        assert!(ops[0].is_no_op());
    }

    #[test]
    fn mixed_edit_produces_insert_and_delete() {
        // spec.md S3
        let old = "The quick brown fox jumps.";
        let new = "The quick red fox hopped.";
        let ops = diff_words(old, new, true);
        assert!(ops.iter().any(|o| o.kind == wml_model::DiffKind::Insert && o.text.contains("red")));
        assert!(ops.iter().any(|o| o.kind == wml_model::DiffKind::Delete && o.text.contains("brown")));
        assert!(ops.iter().any(|o| o.kind == wml_model::DiffKind::Insert && o.text.contains("hopped")));
        assert!(ops.iter().any(|o| o.kind == wml_model::DiffKind::Delete && o.text.contains("jumps")));
    }

    #[test]
    fn diff_soundness_holds_for_mixed_edit() {
        let old = "The quick brown fox jumps.";
        let new = "The quick red fox hopped.";
        let ops = diff_words(old, new, true);
        assert_eq!(apply_ops(old, &ops), new);
    }

    #[test]
    fn pure_insertion() {
        let old = "Hello world";
        let new = "Hello there world";
        let ops = diff_words(old, new, true);
        assert_eq!(apply_ops(old, &ops), new);
        assert!(ops.iter().any(|o| o.kind == wml_model::DiffKind::Insert));
    }

    #[test]
    fn pure_deletion() {
        let old = "Hello there world";
        let new = "Hello world";
        let ops = diff_words(old, new, true);
        assert_eq!(apply_ops(old, &ops), new);
        assert!(ops.iter().any(|o| o.kind == wml_model::DiffKind::Delete));
    }

    #[test]
    fn empty_to_nonempty() {
        let ops = diff_words("", "new text", true);
        assert_eq!(apply_ops("", &ops), "new text");
    }
}
