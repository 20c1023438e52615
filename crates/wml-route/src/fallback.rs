//! Single-line list fallback (spec.md §4.10): when a diff yields zero
//! changes but the proposed content is a single marker-prefixed line and the
//! target isn't already list-bound, synthesize a one-item list instead of
//! leaving the edit a no-op. An explicit-sequence state carries
//! `(numbering-key → {numId, nextStartAt})` across calls so consecutive
//! "1.", "2.", ... reuse one list rather than allocating a fresh numId per
//! call.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use wml_markdown::classify_line;
use wml_model::{MarkerFormat, StyleSignature};
use wml_numbering::NumberingService;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\.").unwrap());

/// A single marker-prefixed line recognized as a fallback candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackCandidate {
    pub format: MarkerFormat,
    pub text: String,
    pub start_at: Option<u32>,
}

/// Recognize `content` as a single-line list fallback candidate, or return
/// `None` when the target is already list-bound or the content isn't a
/// single marker-prefixed line.
pub fn detect_single_line_list_fallback(content: &str, target_already_list_bound: bool) -> Option<FallbackCandidate> {
    if target_already_list_bound {
        return None;
    }
    let trimmed = content.trim();
    if trimmed.lines().count() != 1 {
        return None;
    }
    match classify_line(trimmed) {
        wml_markdown::LineKind::ListItem { format, text, .. } => {
            let start_at = if format == MarkerFormat::Decimal {
                LEADING_NUMBER.captures(trimmed).and_then(|c| c[1].parse().ok())
            } else {
                None
            };
            Some(FallbackCandidate { format, text, start_at })
        }
        _ => None,
    }
}

/// Allocation decision for one fallback candidate: which numbering
/// definition to use and whether a start-override must be applied.
#[derive(Debug, Clone, Copy)]
pub struct SequenceDecision {
    pub num_id: u32,
    pub start_override: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct SequenceEntry {
    num_id: u32,
    next_start_at: u32,
}

/// Explicit-sequence state threaded by the caller across consecutive
/// single-line list fallback operations in one turn.
#[derive(Debug, Default)]
pub struct ExplicitSequenceState {
    entries: HashMap<String, SequenceEntry>,
}

impl ExplicitSequenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the sequence for `key` (typically derived from the target
    /// paragraph's identity), allocating a numbering definition from
    /// `numbering` the first time the key is seen, and reusing it for as
    /// long as the candidate's `start_at` continues the sequence.
    pub fn advance(&mut self, key: &str, candidate: &FallbackCandidate, numbering: &mut NumberingService) -> SequenceDecision {
        let style = StyleSignature::single_level(candidate.format);
        let requested_start = candidate.start_at.unwrap_or(1);

        if let Some(entry) = self.entries.get_mut(key) {
            if entry.next_start_at == requested_start {
                entry.next_start_at += 1;
                return SequenceDecision { num_id: entry.num_id, start_override: None };
            }
        }

        let definition = numbering.obtain_for_style(&style);
        self.entries.insert(
            key.to_string(),
            SequenceEntry { num_id: definition.num_id, next_start_at: requested_start + 1 },
        );
        SequenceDecision { num_id: definition.num_id, start_override: Some(requested_start) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_single_decimal_line() {
        let candidate = detect_single_line_list_fallback("1. First item", false).unwrap();
        assert_eq!(candidate.format, MarkerFormat::Decimal);
        assert_eq!(candidate.start_at, Some(1));
    }

    #[test]
    fn already_list_bound_target_is_not_a_candidate() {
        assert!(detect_single_line_list_fallback("1. First item", true).is_none());
    }

    #[test]
    fn multi_line_content_is_not_a_candidate() {
        assert!(detect_single_line_list_fallback("1. First\n2. Second", false).is_none());
    }

    #[test]
    fn consecutive_sequence_reuses_one_num_id_without_override() {
        let mut state = ExplicitSequenceState::new();
        let mut numbering = NumberingService::new(0, 0);
        let first = detect_single_line_list_fallback("1. First", false).unwrap();
        let second = detect_single_line_list_fallback("2. Second", false).unwrap();

        let d1 = state.advance("para-1", &first, &mut numbering);
        let d2 = state.advance("para-1", &second, &mut numbering);

        assert_eq!(d1.num_id, d2.num_id);
        assert_eq!(d1.start_override, Some(1));
        assert_eq!(d2.start_override, None);
    }

    #[test]
    fn restarting_sequence_applies_a_fresh_start_override() {
        let mut state = ExplicitSequenceState::new();
        let mut numbering = NumberingService::new(0, 0);
        let first = detect_single_line_list_fallback("5. Fifth", false).unwrap();
        let restart = detect_single_line_list_fallback("1. Restart", false).unwrap();

        state.advance("para-1", &first, &mut numbering);
        let decision = state.advance("para-1", &restart, &mut numbering);
        assert_eq!(decision.start_override, Some(1));
    }
}
