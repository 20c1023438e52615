//! Canonical diff operations produced by the Word-level Diff Engine
//! (spec.md §4.3).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Equal,
    Insert,
    Delete,
}

/// One operation in a canonical edit script: `old_range` and `new_range` are
/// half-open byte ranges into the old and new text respectively, and `text`
/// is the slice of whichever side is non-empty for this op
/// (`old_range`'s text for `Delete`, `new_range`'s for `Insert`, either for
/// `Equal`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOp {
    pub kind: DiffKind,
    pub old_start: usize,
    pub old_end: usize,
    pub new_start: usize,
    pub new_end: usize,
    pub text: String,
}

impl DiffOp {
    pub fn equal(old_start: usize, old_end: usize, new_start: usize, new_end: usize, text: impl Into<String>) -> Self {
        Self { kind: DiffKind::Equal, old_start, old_end, new_start, new_end, text: text.into() }
    }

    pub fn insert(new_start: usize, new_end: usize, text: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Insert,
            old_start: 0,
            old_end: 0,
            new_start,
            new_end,
            text: text.into(),
        }
    }

    pub fn delete(old_start: usize, old_end: usize, text: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Delete,
            old_start,
            old_end,
            new_start: 0,
            new_end: 0,
            text: text.into(),
        }
    }

    pub fn is_no_op(&self) -> bool {
        self.kind == DiffKind::Equal
    }
}

/// Coalesce consecutive ops of the same kind into one (spec.md §3: "Sequences
/// are canonical in the sense that consecutive ops of the same kind are
/// coalesced").
pub fn coalesce(ops: Vec<DiffOp>) -> Vec<DiffOp> {
    let mut out: Vec<DiffOp> = Vec::with_capacity(ops.len());
    for op in ops {
        if let Some(last) = out.last_mut() {
            if last.kind == op.kind {
                last.old_end = op.old_end;
                last.new_end = op.new_end;
                last.text.push_str(&op.text);
                continue;
            }
        }
        out.push(op);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces_adjacent_equal_ops() {
        let ops = vec![
            DiffOp::equal(0, 2, 0, 2, "ab"),
            DiffOp::equal(2, 4, 2, 4, "cd"),
            DiffOp::insert(4, 5, "x"),
        ];
        let merged = coalesce(ops);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "abcd");
    }

    #[test]
    fn does_not_merge_different_kinds() {
        let ops = vec![DiffOp::insert(0, 1, "a"), DiffOp::delete(0, 1, "b")];
        assert_eq!(coalesce(ops).len(), 2);
    }
}
