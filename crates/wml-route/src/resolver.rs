//! Target Resolver (spec.md §4.11): resolves `{targetRef?, targetText?}`
//! against a document's paragraph texts.

use wml_model::{normalize_whitespace, TargetSnapshot};

use crate::error::{Error, Result};

/// How a target paragraph was ultimately resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    Reference,
    StrictText,
    FuzzyText,
    StrictTextAfterRefDrift,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// 1-based paragraph index.
    pub paragraph_index: usize,
    pub resolved_by: ResolvedBy,
    /// Set when a reference resolved but its text had drifted from
    /// `target_text` (spec.md §4.11: "log if text drift is detected but do
    /// not reject").
    pub drift_detected: bool,
}

/// Resolve one target against `paragraphs` (plain texts in document order).
#[tracing::instrument(skip(paragraphs, target_text, snapshot))]
pub fn resolve_target_paragraph(
    paragraphs: &[String],
    target_ref: Option<usize>,
    target_text: Option<&str>,
    snapshot: Option<&TargetSnapshot>,
) -> Result<ResolvedTarget> {
    if let Some(reference) = target_ref {
        if reference >= 1 && reference <= paragraphs.len() {
            let paragraph_text = &paragraphs[reference - 1];
            let drifted = target_text
                .map(|t| normalize_whitespace(paragraph_text) != normalize_whitespace(t))
                .unwrap_or(false);

            if drifted {
                if let (Some(text), Some(snapshot)) = (target_text, snapshot) {
                    let drifted_from_snapshot = snapshot
                        .get(reference)
                        .map(|s| s.normalized_text != normalize_whitespace(text))
                        .unwrap_or(true);
                    if drifted_from_snapshot {
                        let in_table = snapshot.get(reference).map(|s| s.in_table).unwrap_or(false);
                        if let Some(reresolved) = strict_text_in_context(paragraphs, text, snapshot, in_table) {
                            return Ok(ResolvedTarget {
                                paragraph_index: reresolved,
                                resolved_by: ResolvedBy::StrictTextAfterRefDrift,
                                drift_detected: true,
                            });
                        }
                    }
                }
            }

            return Ok(ResolvedTarget { paragraph_index: reference, resolved_by: ResolvedBy::Reference, drift_detected: drifted });
        }
    }

    if let Some(text) = target_text {
        let normalized_target = normalize_whitespace(text);
        if let Some(index) = paragraphs.iter().position(|p| normalize_whitespace(p) == normalized_target) {
            return Ok(ResolvedTarget { paragraph_index: index + 1, resolved_by: ResolvedBy::StrictText, drift_detected: false });
        }

        if let Some(index) = fuzzy_match(paragraphs, text) {
            return Ok(ResolvedTarget { paragraph_index: index + 1, resolved_by: ResolvedBy::FuzzyText, drift_detected: false });
        }
    }

    Err(Error::TargetNotFound)
}

fn strict_text_in_context(paragraphs: &[String], text: &str, snapshot: &TargetSnapshot, in_table: bool) -> Option<usize> {
    let normalized_target = normalize_whitespace(text);
    paragraphs.iter().enumerate().position(|(i, p)| {
        let index = i + 1;
        let same_context = snapshot.get(index).map(|s| s.in_table == in_table).unwrap_or(true);
        same_context && normalize_whitespace(p) == normalized_target
    })
}

fn fuzzy_match(paragraphs: &[String], text: &str) -> Option<usize> {
    let normalized_target = normalize_whitespace(text);
    paragraphs.iter().position(|p| {
        let normalized_p = normalize_whitespace(p);
        if normalized_p.is_empty() || normalized_target.is_empty() {
            return false;
        }
        if normalized_p.starts_with(&normalized_target) || normalized_target.starts_with(&normalized_p) {
            return true;
        }
        word_overlap_ratio(&normalized_p, &normalized_target) >= 0.5
    })
}

fn word_overlap_ratio(a: &str, b: &str) -> f64 {
    let words_a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let words_b: std::collections::HashSet<&str> = b.split_whitespace().collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }
    let overlap = words_a.intersection(&words_b).count();
    let smaller = words_a.len().min(words_b.len());
    overlap as f64 / smaller as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use wml_model::ParagraphSnapshot;

    #[test]
    fn reference_resolves_directly() {
        let paragraphs = vec!["first".to_string(), "second".to_string()];
        let result = resolve_target_paragraph(&paragraphs, Some(2), None, None).unwrap();
        assert_eq!(result.paragraph_index, 2);
        assert_eq!(result.resolved_by, ResolvedBy::Reference);
        assert!(!result.drift_detected);
    }

    #[test]
    fn strict_text_resolves_by_normalized_equality() {
        let paragraphs = vec!["Hello   world".to_string()];
        let result = resolve_target_paragraph(&paragraphs, None, Some("Hello world"), None).unwrap();
        assert_eq!(result.paragraph_index, 1);
        assert_eq!(result.resolved_by, ResolvedBy::StrictText);
    }

    #[test]
    fn fuzzy_text_resolves_by_word_overlap() {
        let paragraphs = vec!["The quick brown fox jumps over the lazy dog".to_string()];
        let result = resolve_target_paragraph(&paragraphs, None, Some("quick brown fox"), None).unwrap();
        assert_eq!(result.resolved_by, ResolvedBy::FuzzyText);
    }

    #[test]
    fn unresolvable_target_is_an_error() {
        let paragraphs = vec!["alpha".to_string()];
        assert!(resolve_target_paragraph(&paragraphs, None, Some("completely unrelated text"), None).is_err());
    }

    #[test]
    fn drifted_reference_reresolves_by_strict_text() {
        let paragraphs = vec!["stale text".to_string(), "Hello world".to_string()];
        let mut snapshot = TargetSnapshot::new();
        snapshot.insert(1, ParagraphSnapshot::new("original text", false));
        let result = resolve_target_paragraph(&paragraphs, Some(1), Some("Hello world"), Some(&snapshot)).unwrap();
        assert_eq!(result.paragraph_index, 2);
        assert_eq!(result.resolved_by, ResolvedBy::StrictTextAfterRefDrift);
        assert!(result.drift_detected);
    }
}
