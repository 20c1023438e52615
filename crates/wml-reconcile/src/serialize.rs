//! Serializer (spec.md §4.5): emits WML from a Run Model, wrapping
//! deletions/insertions/property-changes with revision ids, authors, and an
//! injected date, and producing either a paragraph-only or full-package
//! document fragment.

use wml_model::{PropertyChange, RunEntry, RunKind, RunModel};
use wml_xml::{QName, XmlElement, XmlNode};

use crate::context::ReconcileContext;
use crate::error::Result;

const WORDPROCESSING_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Serialize one paragraph's Run Model to a `<w:p>...</w:p>` string
/// (spec.md §4.5 "Runs are emitted in model order").
#[tracing::instrument(skip(model, ctx))]
pub fn serialize_paragraph(model: &RunModel, ctx: &mut ReconcileContext) -> Result<String> {
    let mut out = String::from("<w:p>");
    if let Some(p_pr) = &model.paragraph_properties_xml {
        out.push_str(p_pr);
    }
    for entry in &model.entries {
        out.push_str(&serialize_entry(entry, ctx)?);
    }
    out.push_str("</w:p>");
    Ok(out)
}

fn serialize_entry(entry: &RunEntry, ctx: &mut ReconcileContext) -> Result<String> {
    match entry.kind {
        RunKind::Text => serialize_text_run(entry, ctx),
        RunKind::Insertion => serialize_tracked_run(entry, ctx, true),
        RunKind::Deletion => serialize_tracked_run(entry, ctx, false),
        RunKind::Hyperlink
        | RunKind::ContainerStart
        | RunKind::ContainerEnd
        | RunKind::Bookmark
        | RunKind::Field
        | RunKind::ParagraphStart
        | RunKind::ParagraphEnd => Ok(entry.node_xml.clone().unwrap_or_default()),
    }
}

fn serialize_text_run(entry: &RunEntry, ctx: &mut ReconcileContext) -> Result<String> {
    let rpr_xml = match &entry.format_change {
        Some(change) => inject_rpr_change(entry.run_properties_xml.as_deref(), change, ctx.next_revision_id())?,
        None => entry.run_properties_xml.clone().unwrap_or_default(),
    };
    let text = entry.text.clone().unwrap_or_default();
    let t_xml = wml_xml::serialize(&build_text_element(&text, "t"))?;
    Ok(format!("<w:r>{rpr_xml}{t_xml}</w:r>"))
}

fn serialize_tracked_run(entry: &RunEntry, ctx: &mut ReconcileContext, is_insertion: bool) -> Result<String> {
    let id = ctx.next_revision_id();
    let author = entry.author.clone().unwrap_or_else(|| ctx.author().to_string());
    let date = ctx.now_rfc3339();
    let tag = if is_insertion { "ins" } else { "del" };
    let text_tag = if is_insertion { "t" } else { "delText" };

    let rpr_xml = entry.run_properties_xml.clone().unwrap_or_default();
    let text = entry.text.clone().unwrap_or_default();
    let t_xml = wml_xml::serialize(&build_text_element(&text, text_tag))?;
    let run_xml = format!("<w:r>{rpr_xml}{t_xml}</w:r>");

    Ok(format!(
        "<w:{tag} w:id=\"{id}\" w:author=\"{author}\" w:date=\"{date}\">{run_xml}</w:{tag}>",
        author = escape_attribute(&author)
    ))
}

fn build_text_element(text: &str, tag_local: &str) -> XmlElement {
    let mut element = XmlElement::new(QName::prefixed("w", tag_local));
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        element = element.with_attr(QName::prefixed("xml", "space"), "preserve");
    }
    element.children = vec![XmlNode::Text(text.to_string())];
    element
}

/// Nest a `<w:rPrChange>` child (carrying the pre-change property snapshot)
/// inside the run's `<w:rPr>` (spec.md §4.5).
fn inject_rpr_change(current_rpr_xml: Option<&str>, change: &PropertyChange, revision_id: u32) -> Result<String> {
    let original_rpr = if change.original_properties_xml.is_empty() {
        XmlElement::new(QName::prefixed("w", "rPr"))
    } else {
        wml_xml::parse(&change.original_properties_xml)?
    };

    let mut rpr_change = XmlElement::new(QName::prefixed("w", "rPrChange"))
        .with_attr(QName::prefixed("w", "id"), revision_id.to_string())
        .with_attr(QName::prefixed("w", "author"), change.author.clone())
        .with_attr(QName::prefixed("w", "date"), change.date.clone());
    rpr_change.children = vec![XmlNode::Element(original_rpr)];

    let mut current_rpr = match current_rpr_xml.filter(|xml| !xml.is_empty()) {
        Some(xml) => wml_xml::parse(xml)?,
        None => XmlElement::new(QName::prefixed("w", "rPr")),
    };
    current_rpr.children.push(XmlNode::Element(rpr_change));
    Ok(wml_xml::serialize(&current_rpr)?)
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The two document-fragment wrapping modes (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// Just the paragraph(s), ready to splice into an existing document.
    ParagraphOnly,
    /// A self-contained document part plus any sibling parts (numbering).
    FullPackage,
}

/// The serialized document fragment plus any sibling part content.
#[derive(Debug, Clone, Default)]
pub struct DocumentFragment {
    pub document_xml: String,
    pub numbering_xml: Option<String>,
}

/// Wrap one or more already-serialized paragraphs per `mode` (spec.md §4.5
/// "Document-fragment wrapping").
pub fn wrap_document_fragment(
    paragraphs_xml: &[String],
    mode: WrapMode,
    numbering_xml: Option<String>,
) -> DocumentFragment {
    let joined = paragraphs_xml.concat();
    match mode {
        WrapMode::ParagraphOnly => DocumentFragment { document_xml: joined, numbering_xml: None },
        WrapMode::FullPackage => DocumentFragment {
            document_xml: format!(
                "<w:document xmlns:w=\"{WORDPROCESSING_NAMESPACE}\"><w:body>{joined}</w:body></w:document>"
            ),
            numbering_xml,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use wml_model::RunEntry;

    fn context() -> ReconcileContext {
        ReconcileContext::new("reviewer")
            .with_clock(Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())))
    }

    #[test]
    fn serializes_plain_text_run() {
        let mut model = RunModel::new();
        model.push(RunEntry::text("hello", None));
        let mut ctx = context();
        let xml = serialize_paragraph(&model, &mut ctx).unwrap();
        assert!(xml.starts_with("<w:p>"));
        assert!(xml.contains("<w:t>hello</w:t>"));
    }

    #[test]
    fn serializes_insertion_with_revision_metadata() {
        let mut model = RunModel::new();
        model.push(RunEntry::insertion("new text", None, "alice"));
        let mut ctx = context();
        let xml = serialize_paragraph(&model, &mut ctx).unwrap();
        assert!(xml.contains("<w:ins"));
        assert!(xml.contains("w:author=\"alice\""));
        assert!(xml.contains("w:id=\"1\""));
    }

    #[test]
    fn serializes_deletion_with_del_text_element() {
        let mut model = RunModel::new();
        model.push(RunEntry::deletion("old text", None, "bob"));
        let mut ctx = context();
        let xml = serialize_paragraph(&model, &mut ctx).unwrap();
        assert!(xml.contains("<w:del"));
        assert!(xml.contains("<w:delText"));
    }

    #[test]
    fn preserves_leading_whitespace_with_xml_space_attribute() {
        let mut model = RunModel::new();
        model.push(RunEntry::text("  indented", None));
        let mut ctx = context();
        let xml = serialize_paragraph(&model, &mut ctx).unwrap();
        assert!(xml.contains("xml:space=\"preserve\""));
    }

    #[test]
    fn paragraph_only_wrap_concatenates_paragraphs() {
        let wrapped = wrap_document_fragment(&["<w:p>a</w:p>".to_string(), "<w:p>b</w:p>".to_string()], WrapMode::ParagraphOnly, None);
        assert_eq!(wrapped.document_xml, "<w:p>a</w:p><w:p>b</w:p>");
        assert!(wrapped.numbering_xml.is_none());
    }

    #[test]
    fn full_package_wrap_includes_document_root_and_numbering() {
        let wrapped = wrap_document_fragment(
            &["<w:p>a</w:p>".to_string()],
            WrapMode::FullPackage,
            Some("<w:numbering/>".to_string()),
        );
        assert!(wrapped.document_xml.starts_with("<w:document"));
        assert!(wrapped.document_xml.contains("<w:body>"));
        assert_eq!(wrapped.numbering_xml.as_deref(), Some("<w:numbering/>"));
    }
}
