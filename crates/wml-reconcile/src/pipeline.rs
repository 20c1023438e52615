//! The text-edit pipeline (spec.md §4.10 "ooxml-engine" branch): ingest →
//! Markdown-preprocess → diff → split/patch → serialize, wired together for
//! callers that already know they want the surgical diff/patch path rather
//! than list or table generation.

use wml_diff::diff_words;
use wml_markdown::preprocess_inline;
use wml_xml::XmlElement;

use crate::context::ReconcileContext;
use crate::error::Result;
use crate::ingest::ingest_paragraph;
use crate::serialize::serialize_paragraph;
use crate::split::patch;

/// Result of reconciling one paragraph's proposed new content against its
/// existing WML (spec.md §6 contract 1's core, minus route classification).
pub struct ReconciledParagraph {
    pub wml: String,
    pub has_changes: bool,
    pub is_format_only: bool,
}

#[tracing::instrument(skip(old_fragment, new_content, ctx))]
pub fn reconcile_paragraph_text(
    old_fragment: &XmlElement,
    new_content: &str,
    ctx: &mut ReconcileContext,
) -> Result<ReconciledParagraph> {
    let ingested = ingest_paragraph(old_fragment)?;
    let preprocessed = preprocess_inline(new_content);

    let diff_ops = diff_words(&ingested.accepted_text, &preprocessed.clean_text, true);
    let has_changes = diff_ops.iter().any(|op| op.kind != wml_model::DiffKind::Equal)
        || !preprocessed.format_hints.is_empty();

    let outcome = patch(ingested.run_model, &diff_ops, &preprocessed.format_hints, ctx)?;
    let wml = serialize_paragraph(&outcome.model, ctx)?;

    Ok(ReconciledParagraph { wml, has_changes, is_format_only: outcome.is_format_only })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wml_xml::{QName, XmlNode};

    fn paragraph_with_text(text: &str) -> XmlElement {
        let t = XmlElement::new(QName::prefixed("w", "t")).with_children(vec![XmlNode::Text(text.to_string())]);
        let r = XmlElement::new(QName::prefixed("w", "r")).with_children(vec![XmlNode::Element(t)]);
        XmlElement::new(QName::prefixed("w", "p")).with_children(vec![XmlNode::Element(r)])
    }

    #[test]
    fn reconciles_a_simple_text_edit() {
        let fragment = paragraph_with_text("The quick brown fox");
        let mut ctx = ReconcileContext::new("reviewer");
        let result = reconcile_paragraph_text(&fragment, "The quick red fox", &mut ctx).unwrap();
        assert!(result.has_changes);
        assert!(!result.is_format_only);
        assert!(result.wml.contains("<w:ins"));
        assert!(result.wml.contains("<w:del"));
    }

    #[test]
    fn no_op_edit_reports_no_changes() {
        let fragment = paragraph_with_text("Same text");
        let mut ctx = ReconcileContext::new("reviewer");
        let result = reconcile_paragraph_text(&fragment, "Same text", &mut ctx).unwrap();
        assert!(!result.has_changes);
    }

    #[test]
    fn markdown_bold_with_no_text_change_is_format_only() {
        let fragment = paragraph_with_text("word");
        let mut ctx = ReconcileContext::new("reviewer");
        let result = reconcile_paragraph_text(&fragment, "**word**", &mut ctx).unwrap();
        assert!(result.is_format_only);
    }
}
