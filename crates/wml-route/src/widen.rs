//! List-block widening and insertion-only planning (spec.md §4.11): when an
//! edit targets one list item but actually spans (or only extends) a run of
//! sibling list paragraphs sharing one numbering identifier.

use wml_model::NumberingContext;

/// The contiguous 0-based `[start, end]` range of sibling list paragraphs
/// sharing `anchor_index`'s numbering identifier.
pub fn widen_list_block(contexts: &[Option<NumberingContext>], anchor_index: usize) -> (usize, usize) {
    let Some(Some(anchor)) = contexts.get(anchor_index) else {
        return (anchor_index, anchor_index);
    };
    let num_id = anchor.num_id;

    let mut start = anchor_index;
    while start > 0 && contexts[start - 1].map(|c| c.num_id) == Some(num_id) {
        start -= 1;
    }
    let mut end = anchor_index;
    while end + 1 < contexts.len() && contexts[end + 1].map(|c| c.num_id) == Some(num_id) {
        end += 1;
    }
    (start, end)
}

/// Join a contiguous range of per-paragraph texts into the block's combined
/// original text, one paragraph per line.
pub fn combined_block_text(paragraph_texts: &[String], start: usize, end: usize) -> String {
    paragraph_texts[start..=end].join("\n")
}

/// When `modified_text` begins with `anchor_text` and adds further lines,
/// return just the new lines to insert after the anchor rather than a full
/// block replacement (spec.md §4.11 "insertion-only planning").
pub fn plan_list_insertion(anchor_text: &str, modified_text: &str) -> Option<Vec<String>> {
    let anchor = anchor_text.trim_end();
    if !modified_text.starts_with(anchor) {
        return None;
    }
    let remainder = modified_text[anchor.len()..].trim_start_matches('\n');
    if remainder.trim().is_empty() {
        return None;
    }
    Some(remainder.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(num_id: u32) -> Option<NumberingContext> {
        Some(NumberingContext { num_id, ilvl: 0 })
    }

    #[test]
    fn widens_to_contiguous_siblings_sharing_num_id() {
        let contexts = vec![ctx(1), ctx(5), ctx(5), ctx(5), ctx(2)];
        assert_eq!(widen_list_block(&contexts, 2), (1, 3));
    }

    #[test]
    fn single_item_with_no_siblings_widens_to_itself() {
        let contexts = vec![ctx(1), ctx(2), ctx(3)];
        assert_eq!(widen_list_block(&contexts, 1), (1, 1));
    }

    #[test]
    fn non_list_anchor_widens_to_itself() {
        let contexts = vec![None, ctx(1)];
        assert_eq!(widen_list_block(&contexts, 0), (0, 0));
    }

    #[test]
    fn insertion_only_plan_returns_new_trailing_lines() {
        let plan = plan_list_insertion("- Alpha", "- Alpha\n- Beta\n- Gamma").unwrap();
        assert_eq!(plan, vec!["- Beta".to_string(), "- Gamma".to_string()]);
    }

    #[test]
    fn non_prefix_modification_is_not_insertion_only() {
        assert!(plan_list_insertion("- Alpha", "- Different\n- Beta").is_none());
    }
}
