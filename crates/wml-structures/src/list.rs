//! List Generation (spec.md §4.7): turns a Markdown-listy block into a
//! sequence of list paragraphs sharing one numbering definition, delegating
//! embedded Markdown tables to the Table Generator.

use wml_markdown::{classify_line, infer_indent_step, is_table_group_start, preprocess_inline, LineKind};
use wml_model::{MarkerFormat, StyleSignature};
use wml_numbering::NumberingService;
use wml_reconcile::{build_runs_from_preprocessed, ReconcileContext};
use wml_xml::{serialize, QName, XmlElement, XmlNode};

use crate::error::Result;
use crate::table::generate_table_paragraph;

/// Output of generating list paragraphs from one Markdown block.
pub struct GeneratedList {
    pub paragraphs_xml: Vec<String>,
    pub numbering_xml: String,
}

/// Generate a sequence of list (and interleaved heading/table/plain)
/// paragraphs from `markdown`. When `original_text` is non-empty, the first
/// generated paragraph also carries a tracked deletion reconstructing it
/// (spec.md §4.7).
#[tracing::instrument(skip(markdown, numbering, ctx), fields(len = markdown.len()))]
pub fn generate_list_fragment(
    markdown: &str,
    numbering: &mut NumberingService,
    original_text: Option<&str>,
    ctx: &mut ReconcileContext,
) -> Result<GeneratedList> {
    let lines: Vec<&str> = markdown.lines().collect();

    let list_item_indents: Vec<usize> = lines
        .iter()
        .filter_map(|line| match classify_line(line) {
            LineKind::ListItem { indent, .. } => Some(indent),
            _ => None,
        })
        .collect();
    let step = infer_indent_step(&list_item_indents).max(1);

    let mut level_formats: Vec<Option<MarkerFormat>> = Vec::new();
    for line in &lines {
        if let LineKind::ListItem { indent, format, .. } = classify_line(line) {
            let level = indent / step;
            if level_formats.len() <= level {
                level_formats.resize(level + 1, None);
            }
            if level_formats[level].is_none() {
                level_formats[level] = Some(format);
            }
        }
    }
    let style = StyleSignature {
        levels: level_formats.into_iter().map(|f| f.unwrap_or(MarkerFormat::Decimal)).collect(),
    };
    let definition = if style.levels.is_empty() {
        None
    } else {
        Some(numbering.obtain_for_style(&style))
    };

    let mut paragraphs_xml = Vec::new();
    let mut idx = 0;
    let mut is_first_paragraph = true;

    while idx < lines.len() {
        let line = lines[idx];
        if line.trim().is_empty() {
            idx += 1;
            continue;
        }

        if is_table_group_start(&lines, idx) {
            let (table_xml, consumed) = generate_table_paragraph(&lines[idx..])?;
            paragraphs_xml.push(table_xml);
            idx += consumed;
            is_first_paragraph = false;
            continue;
        }

        match classify_line(line) {
            LineKind::Heading { level, text } => {
                paragraphs_xml.push(build_heading_paragraph(level, &text));
            }
            LineKind::ListItem { indent, text, .. } => {
                let level = indent / step;
                let definition = definition.expect("list item implies a non-empty style signature");
                let deletion = if is_first_paragraph { original_text } else { None };
                paragraphs_xml.push(build_list_paragraph(level as u32, definition.num_id, &text, deletion, ctx)?);
            }
            LineKind::TableRow { .. } | LineKind::TableSeparator => {
                // Only reachable if is_table_group_start missed a malformed
                // table; fall through and render as plain text.
                paragraphs_xml.push(build_plain_paragraph(line, None, ctx));
            }
            LineKind::Plain(text) => {
                let deletion = if is_first_paragraph { original_text } else { None };
                paragraphs_xml.push(build_plain_paragraph(&text, deletion, ctx));
            }
            LineKind::Blank => {}
        }

        is_first_paragraph = false;
        idx += 1;
    }

    let numbering_xml = serialize(&numbering.build_numbering_part())?;
    Ok(GeneratedList { paragraphs_xml, numbering_xml })
}

fn build_heading_paragraph(level: u8, text: &str) -> String {
    let preprocessed = preprocess_inline(text);
    let runs = build_runs_from_preprocessed(&preprocessed.clean_text, &preprocessed.format_hints);
    let p_pr = XmlElement::new(QName::prefixed("w", "pPr")).with_children(vec![XmlNode::Element(
        XmlElement::new(QName::prefixed("w", "outlineLvl")).with_attr(QName::prefixed("w", "val"), (level - 1).to_string()),
    )]);
    render_paragraph(Some(&p_pr), &runs, None)
}

fn build_list_paragraph(
    ilvl: u32,
    num_id: u32,
    text: &str,
    deletion_text: Option<&str>,
    ctx: &mut ReconcileContext,
) -> Result<String> {
    let preprocessed = preprocess_inline(text);
    let runs = build_runs_from_preprocessed(&preprocessed.clean_text, &preprocessed.format_hints);
    let num_pr = XmlElement::new(QName::prefixed("w", "numPr")).with_children(vec![
        XmlNode::Element(XmlElement::new(QName::prefixed("w", "ilvl")).with_attr(QName::prefixed("w", "val"), ilvl.to_string())),
        XmlNode::Element(XmlElement::new(QName::prefixed("w", "numId")).with_attr(QName::prefixed("w", "val"), num_id.to_string())),
    ]);
    let p_pr = XmlElement::new(QName::prefixed("w", "pPr")).with_children(vec![XmlNode::Element(num_pr)]);
    Ok(render_paragraph(Some(&p_pr), &runs, deletion_text.map(|t| tracked_deletion_xml(t, ctx))))
}

fn build_plain_paragraph(text: &str, deletion_text: Option<&str>, ctx: &mut ReconcileContext) -> String {
    let preprocessed = preprocess_inline(text);
    let runs = build_runs_from_preprocessed(&preprocessed.clean_text, &preprocessed.format_hints);
    render_paragraph(None, &runs, deletion_text.map(|t| tracked_deletion_xml(t, ctx)))
}

fn tracked_deletion_xml(text: &str, ctx: &mut ReconcileContext) -> String {
    let id = ctx.next_revision_id();
    let author = ctx.author().to_string();
    let date = ctx.now_rfc3339();
    let del_text = XmlElement::new(QName::prefixed("w", "delText")).with_children(vec![XmlNode::Text(text.to_string())]);
    let run = XmlElement::new(QName::prefixed("w", "r")).with_children(vec![XmlNode::Element(del_text)]);
    format!(
        "<w:del w:id=\"{id}\" w:author=\"{}\" w:date=\"{date}\">{}</w:del>",
        escape_attribute(&author),
        serialize(&run).unwrap_or_default()
    )
}

fn render_paragraph(p_pr: Option<&XmlElement>, runs: &[XmlElement], leading_deletion_xml: Option<String>) -> String {
    let mut out = String::from("<w:p>");
    if let Some(p_pr) = p_pr {
        out.push_str(&serialize(p_pr).unwrap_or_default());
    }
    if let Some(deletion) = leading_deletion_xml {
        out.push_str(&deletion);
    }
    for run in runs {
        out.push_str(&serialize(run).unwrap_or_default());
    }
    out.push_str("</w:p>");
    out
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_flat_bullet_list_sharing_one_numbering_id() {
        let mut numbering = NumberingService::new(0, 0);
        let mut ctx = ReconcileContext::new("reviewer");
        let result = generate_list_fragment("- one\n- two\n- three", &mut numbering, None, &mut ctx).unwrap();
        assert_eq!(result.paragraphs_xml.len(), 3);
        for p in &result.paragraphs_xml {
            assert!(p.contains("w:numId"));
        }
    }

    #[test]
    fn first_paragraph_carries_deletion_when_original_nonempty() {
        let mut numbering = NumberingService::new(0, 0);
        let mut ctx = ReconcileContext::new("reviewer");
        let result = generate_list_fragment("- one\n- two", &mut numbering, Some("old text"), &mut ctx).unwrap();
        assert!(result.paragraphs_xml[0].contains("<w:del"));
        assert!(!result.paragraphs_xml[1].contains("<w:del"));
    }

    #[test]
    fn mixed_heading_and_list_lines_interleave() {
        let mut numbering = NumberingService::new(0, 0);
        let mut ctx = ReconcileContext::new("reviewer");
        let result = generate_list_fragment("# Title\n- item one", &mut numbering, None, &mut ctx).unwrap();
        assert_eq!(result.paragraphs_xml.len(), 2);
        assert!(result.paragraphs_xml[0].contains("outlineLvl"));
        assert!(result.paragraphs_xml[1].contains("numId"));
    }

    #[test]
    fn nested_indentation_produces_distinct_levels() {
        let mut numbering = NumberingService::new(0, 0);
        let mut ctx = ReconcileContext::new("reviewer");
        let result = generate_list_fragment("- top\n  - nested", &mut numbering, None, &mut ctx).unwrap();
        assert!(result.paragraphs_xml[0].contains("w:val=\"0\""));
        assert!(result.paragraphs_xml[1].contains("w:val=\"1\""));
    }
}
