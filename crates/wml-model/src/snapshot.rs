//! Target Reference Snapshot (spec.md §3/§4.11): a fixed mapping from
//! 1-based paragraph index to text captured at the start of a turn, used to
//! correct stale references after earlier edits in the same turn.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphSnapshot {
    pub text: String,
    pub normalized_text: String,
    pub in_table: bool,
}

impl ParagraphSnapshot {
    pub fn new(text: impl Into<String>, in_table: bool) -> Self {
        let text = text.into();
        let normalized_text = normalize_whitespace(&text);
        Self {
            text,
            normalized_text,
            in_table,
        }
    }
}

/// Collapse runs of whitespace to a single space and trim the ends, the
/// normalization spec.md §4.11 uses for "strict text" comparisons.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSnapshot {
    pub paragraphs: BTreeMap<usize, ParagraphSnapshot>,
}

impl TargetSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, paragraph_index: usize, snapshot: ParagraphSnapshot) {
        self.paragraphs.insert(paragraph_index, snapshot);
    }

    pub fn get(&self, paragraph_index: usize) -> Option<&ParagraphSnapshot> {
        self.paragraphs.get(&paragraph_index)
    }
}
