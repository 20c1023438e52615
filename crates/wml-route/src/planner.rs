//! Route Planner (spec.md §4.10): picks which flow handles one proposed
//! edit, first match wins.

use once_cell::sync::Lazy;
use regex::Regex;
use wml_markdown::{classify_line, is_table_group_start, preprocess_inline, LineKind};
use wml_model::{ParsedListSummary, RouteFlags, RouteKind, RoutePlan};

static ESCAPED_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\n").unwrap());
static ESCAPED_TAB: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\t").unwrap());

/// Materialize literal `\n`/`\t` escape sequences into real newlines/tabs
/// (spec.md §4.10 rule 1: "content normalized (escape sequences
/// materialized)").
pub fn normalize_content(content: &str) -> String {
    let with_newlines = ESCAPED_NEWLINE.replace_all(content, "\n");
    ESCAPED_TAB.replace_all(&with_newlines, "\t").into_owned()
}

/// Decide the route for one proposed edit (spec.md §4.10).
#[tracing::instrument(skip(old_text, new_content))]
pub fn plan_route(old_text: &str, new_content: &str) -> RoutePlan {
    let normalized_content = normalize_content(new_content);
    let lines: Vec<&str> = normalized_content.lines().collect();
    let is_multi_line = lines.len() > 1;

    let list_summary = parse_list_summary(&lines);
    let mut flags = RouteFlags {
        empty_original: old_text.trim().is_empty(),
        inline_formatting: !preprocess_inline(&normalized_content).format_hints.is_empty(),
        block_elements: has_block_elements(&lines),
        markdown_table: lines.iter().enumerate().any(|(i, _)| is_table_group_start(&lines, i)),
        structured_list: list_summary.as_ref().map(|s| s.item_count > 0).unwrap_or(false),
    };
    flags.block_elements = flags.block_elements || flags.markdown_table;

    let kind = if is_multi_line && flags.structured_list {
        RouteKind::StructuredListDirect
    } else if flags.empty_original && flags.inline_formatting {
        RouteKind::EmptyFormattedText
    } else if flags.empty_original {
        RouteKind::EmptyHtml
    } else if flags.block_elements || (is_multi_line && has_blank_separator(&lines)) {
        RouteKind::BlockHtml
    } else {
        RouteKind::OoxmlEngine
    };

    let mut plan = RoutePlan::new(kind, normalized_content, flags);
    plan.parsed_list_data = list_summary;
    plan
}

fn parse_list_summary(lines: &[&str]) -> Option<ParsedListSummary> {
    let mut item_count = 0usize;
    let mut indents = Vec::new();
    for line in lines {
        if let LineKind::ListItem { indent, .. } = classify_line(line) {
            item_count += 1;
            indents.push(indent);
        }
    }
    if item_count == 0 {
        return None;
    }
    let has_nested_levels = indents.iter().any(|&i| i > *indents.iter().min().unwrap_or(&0));
    Some(ParsedListSummary { item_count, has_nested_levels })
}

fn has_block_elements(lines: &[&str]) -> bool {
    lines.iter().any(|line| matches!(classify_line(line), LineKind::Heading { .. }))
}

fn has_blank_separator(lines: &[&str]) -> bool {
    lines
        .iter()
        .enumerate()
        .any(|(i, line)| line.trim().is_empty() && i > 0 && i + 1 < lines.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiline_list_routes_structured_list_direct() {
        let plan = plan_route("List seed", "- Alpha\n  - Beta\n- Gamma");
        assert_eq!(plan.kind, RouteKind::StructuredListDirect);
        assert_eq!(plan.parsed_list_data.unwrap().item_count, 3);
    }

    #[test]
    fn empty_original_with_formatting_routes_empty_formatted_text() {
        let plan = plan_route("", "**bold**");
        assert_eq!(plan.kind, RouteKind::EmptyFormattedText);
    }

    #[test]
    fn empty_original_plain_routes_empty_html() {
        let plan = plan_route("", "plain text");
        assert_eq!(plan.kind, RouteKind::EmptyHtml);
    }

    #[test]
    fn heading_routes_block_html() {
        let plan = plan_route("existing", "# Title\nmore text");
        assert_eq!(plan.kind, RouteKind::BlockHtml);
    }

    #[test]
    fn plain_mixed_edit_routes_ooxml_engine() {
        let plan = plan_route("The quick brown fox jumps.", "The quick red fox hopped.");
        assert_eq!(plan.kind, RouteKind::OoxmlEngine);
    }

    #[test]
    fn normalizes_escaped_newlines() {
        assert_eq!(normalize_content("a\\nb"), "a\nb");
    }
}
