//! Format Hints: half-open intervals of inline formatting over clean-text
//! offsets, produced by the Markdown Preprocessor (spec.md §4.2).

/// The inline decorations the small Markdown dialect recognizes (spec.md
/// §4.2). A plain struct of flags rather than a bitflags type: six booleans
/// is small enough that the extra dependency buys nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub subscript: bool,
    pub superscript: bool,
}

impl FormatFlags {
    pub fn is_empty(&self) -> bool {
        *self == FormatFlags::default()
    }

    /// Union of two flag sets (spec.md §4.2: "overlapping hints are merged,
    /// format sets union").
    pub fn union(self, other: FormatFlags) -> FormatFlags {
        FormatFlags {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
            strikethrough: self.strikethrough || other.strikethrough,
            code: self.code || other.code,
            subscript: self.subscript || other.subscript,
            superscript: self.superscript || other.superscript,
        }
    }
}

/// A half-open `[start, end)` interval over clean-text offsets carrying a
/// set of format flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHint {
    pub start: usize,
    pub end: usize,
    pub flags: FormatFlags,
}

impl FormatHint {
    pub fn new(start: usize, end: usize, flags: FormatFlags) -> Self {
        debug_assert!(start <= end);
        Self { start, end, flags }
    }

    pub fn overlaps(&self, other: &FormatHint) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn intersects_range(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Merge overlapping hints, unioning their flags, producing a
/// non-overlapping, start-sorted sequence (spec.md §4.2).
pub fn normalize_hints(mut hints: Vec<FormatHint>) -> Vec<FormatHint> {
    if hints.is_empty() {
        return hints;
    }
    hints.sort_by_key(|h| (h.start, h.end));

    let mut merged: Vec<FormatHint> = Vec::with_capacity(hints.len());
    for hint in hints {
        if let Some(last) = merged.last_mut() {
            if hint.start <= last.end {
                last.end = last.end.max(hint.end);
                last.flags = last.flags.union(hint.flags);
                continue;
            }
        }
        merged.push(hint);
    }
    merged
}
