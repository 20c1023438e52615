//! Per-paragraph comment-range injection (spec.md §4.9): locate the first
//! occurrence of the requested text across a paragraph's runs, split the
//! enclosing run(s) if necessary, and splice in a range-start marker, the
//! untouched matched text, a range-end marker, and a reference run, all
//! sharing one comment id.

use wml_xml::{serialize, QName, XmlElement, XmlNode};

use crate::error::{Error, Result};

/// Inject one comment range for `text_to_find` into `paragraph`, returning
/// the rewritten paragraph. `paragraph_index` is only used for error
/// messages.
pub fn inject_comment_range(
    paragraph: &XmlElement,
    text_to_find: &str,
    id: u32,
    paragraph_index: usize,
) -> Result<XmlElement> {
    let full_text = paragraph_run_text(paragraph);
    let match_start = full_text.find(text_to_find).ok_or_else(|| Error::TextNotFound {
        paragraph_index,
        text: text_to_find.to_string(),
    })?;
    let match_end = match_start + text_to_find.len();

    let mut new_children = Vec::with_capacity(paragraph.children.len() + 2);
    let mut cursor = 0usize;
    let mut start_inserted = false;
    let mut end_inserted = false;

    for child in &paragraph.children {
        let XmlNode::Element(element) = child else {
            new_children.push(child.clone());
            continue;
        };
        if element.name.local != "r" {
            new_children.push(child.clone());
            continue;
        }

        let text = element.text_content();
        let run_start = cursor;
        let run_end = cursor + text.len();
        cursor = run_end;

        if match_end <= run_start || match_start >= run_end {
            new_children.push(child.clone());
            continue;
        }

        let rpr_xml = element.first_child_named("rPr").map(serialize).transpose()?;
        let local_start = match_start.saturating_sub(run_start).min(text.len());
        let local_end = match_end.saturating_sub(run_start).min(text.len());

        if local_start > 0 {
            new_children.push(XmlNode::Element(build_text_run(&text[..local_start], rpr_xml.as_deref())));
        }
        if match_start >= run_start && !start_inserted {
            new_children.push(XmlNode::Element(comment_range_marker("commentRangeStart", id)));
            start_inserted = true;
        }
        new_children.push(XmlNode::Element(build_text_run(&text[local_start..local_end], rpr_xml.as_deref())));
        if match_end <= run_end && !end_inserted {
            new_children.push(XmlNode::Element(comment_range_marker("commentRangeEnd", id)));
            new_children.push(XmlNode::Element(comment_reference_run(id)));
            end_inserted = true;
        }
        if local_end < text.len() {
            new_children.push(XmlNode::Element(build_text_run(&text[local_end..], rpr_xml.as_deref())));
        }
    }

    let mut result = paragraph.clone();
    result.children = new_children;
    Ok(result)
}

fn paragraph_run_text(paragraph: &XmlElement) -> String {
    paragraph.children_named("r").map(|r| r.text_content()).collect()
}

fn build_text_run(text: &str, rpr_xml: Option<&str>) -> XmlElement {
    let mut t = XmlElement::new(QName::prefixed("w", "t"));
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t = t.with_attr(QName::prefixed("xml", "space"), "preserve");
    }
    t.children = vec![XmlNode::Text(text.to_string())];

    let mut run = XmlElement::new(QName::prefixed("w", "r"));
    if let Some(rpr_xml) = rpr_xml {
        if let Ok(rpr) = wml_xml::parse(rpr_xml) {
            run.children.push(XmlNode::Element(rpr));
        }
    }
    run.children.push(XmlNode::Element(t));
    run
}

fn comment_range_marker(local_name: &str, id: u32) -> XmlElement {
    XmlElement::new(QName::prefixed("w", local_name)).with_attr(QName::prefixed("w", "id"), id.to_string())
}

fn comment_reference_run(id: u32) -> XmlElement {
    let reference =
        XmlElement::new(QName::prefixed("w", "commentReference")).with_attr(QName::prefixed("w", "id"), id.to_string());
    XmlElement::new(QName::prefixed("w", "r")).with_children(vec![XmlNode::Element(reference)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_paragraph(text: &str) -> XmlElement {
        let t = XmlElement::new(QName::prefixed("w", "t")).with_children(vec![XmlNode::Text(text.to_string())]);
        let r = XmlElement::new(QName::prefixed("w", "r")).with_children(vec![XmlNode::Element(t)]);
        XmlElement::new(QName::prefixed("w", "p")).with_children(vec![XmlNode::Element(r)])
    }

    #[test]
    fn injects_range_markers_around_matched_text() {
        let paragraph = plain_paragraph("Paragraph with target_one and target_two.");
        let result = inject_comment_range(&paragraph, "target_one", 1, 1).unwrap();
        let xml = serialize(&result).unwrap();
        assert!(xml.contains("commentRangeStart"));
        assert!(xml.contains("commentRangeEnd"));
        assert!(xml.contains("commentReference"));
    }

    #[test]
    fn missing_text_is_an_error() {
        let paragraph = plain_paragraph("nothing relevant here");
        let result = inject_comment_range(&paragraph, "missing", 1, 3);
        assert!(result.is_err());
    }

    #[test]
    fn preserves_surrounding_text_as_separate_runs() {
        let paragraph = plain_paragraph("before target_one after");
        let result = inject_comment_range(&paragraph, "target_one", 7, 2).unwrap();
        let xml = serialize(&result).unwrap();
        assert!(xml.contains("before"));
        assert!(xml.contains("after"));
    }
}
