//! Part-merge directives for the comments part, the content-type overrides
//! part, and the document relationships part (spec.md §4.9).

use wml_xml::{serialize, QName, XmlElement, XmlNode};

use crate::error::{Error, Result};
use crate::model::CommentRecord;

const COMMENTS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml";
const COMMENTS_RELATIONSHIP_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
const COMMENTS_PART_NAME: &str = "/word/comments.xml";

/// Merge `new_comments` into an existing `<w:comments>` document (or start a
/// fresh one), rejecting any id collision across existing and incoming
/// comments (spec.md §4.9, §7 `duplicate-comment-id`).
pub fn merge_comments_part(existing_comments_xml: Option<&str>, new_comments: &[CommentRecord]) -> Result<String> {
    let mut root = match existing_comments_xml {
        Some(xml) => wml_xml::parse(xml)?,
        None => XmlElement::new(QName::prefixed("w", "comments")),
    };

    let mut seen: std::collections::HashSet<u32> = root
        .children_named("comment")
        .filter_map(|c| c.get_attribute("id").and_then(|v| v.parse().ok()))
        .collect();

    for comment in new_comments {
        if !seen.insert(comment.id) {
            return Err(Error::DuplicateCommentId(comment.id));
        }
        root.children.push(XmlNode::Element(build_comment_element(comment)));
    }

    Ok(serialize(&root)?)
}

fn build_comment_element(comment: &CommentRecord) -> XmlElement {
    let paragraph_text = XmlElement::new(QName::prefixed("w", "t"))
        .with_children(vec![XmlNode::Text(comment.content.clone())]);
    let run = XmlElement::new(QName::prefixed("w", "r")).with_children(vec![XmlNode::Element(paragraph_text)]);
    let paragraph = XmlElement::new(QName::prefixed("w", "p")).with_children(vec![XmlNode::Element(run)]);

    XmlElement::new(QName::prefixed("w", "comment"))
        .with_attr(QName::prefixed("w", "id"), comment.id.to_string())
        .with_attr(QName::prefixed("w", "author"), comment.author.clone())
        .with_attr(QName::prefixed("w", "date"), comment.date.clone())
        .with_children(vec![XmlNode::Element(paragraph)])
}

/// Ensure `[Content_Types].xml` carries an `Override` entry for the comments
/// part, adding one if absent.
pub fn ensure_comments_content_type(content_types_xml: &str) -> Result<String> {
    let mut root = wml_xml::parse(content_types_xml)?;
    let already_present = root
        .children_named("Override")
        .any(|o| o.get_attribute("PartName") == Some(COMMENTS_PART_NAME));
    if !already_present {
        let override_el = XmlElement::new(QName::new("Override"))
            .with_attr(QName::new("PartName"), COMMENTS_PART_NAME)
            .with_attr(QName::new("ContentType"), COMMENTS_CONTENT_TYPE);
        root.children.push(XmlNode::Element(override_el));
    }
    Ok(serialize(&root)?)
}

/// Ensure the document relationships part carries a relationship to the
/// comments part, assigning an id strictly greater than every existing
/// numeric relationship id (spec.md §4.9).
pub fn ensure_comments_relationship(relationships_xml: &str) -> Result<String> {
    let mut root = wml_xml::parse(relationships_xml)?;
    let already_present = root
        .children_named("Relationship")
        .any(|r| r.get_attribute("Type") == Some(COMMENTS_RELATIONSHIP_TYPE));
    if already_present {
        return Ok(serialize(&root)?);
    }

    let max_existing = root
        .children_named("Relationship")
        .filter_map(|r| r.get_attribute("Id"))
        .filter_map(|id| id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
        .max()
        .unwrap_or(0);
    let next_id = format!("rId{}", max_existing + 1);

    let relationship = XmlElement::new(QName::new("Relationship"))
        .with_attr(QName::new("Id"), next_id)
        .with_attr(QName::new("Type"), COMMENTS_RELATIONSHIP_TYPE)
        .with_attr(QName::new("Target"), "comments.xml");
    root.children.push(XmlNode::Element(relationship));
    Ok(serialize(&root)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_comment(id: u32) -> CommentRecord {
        CommentRecord { id, author: "reviewer".into(), date: "2026-01-01T00:00:00+00:00".into(), content: "note".into() }
    }

    #[test]
    fn merges_into_fresh_comments_part() {
        let xml = merge_comments_part(None, &[sample_comment(1), sample_comment(2)]).unwrap();
        assert!(xml.contains("w:id=\"1\""));
        assert!(xml.contains("w:id=\"2\""));
    }

    #[test]
    fn rejects_duplicate_ids_against_existing_part() {
        let existing = merge_comments_part(None, &[sample_comment(1)]).unwrap();
        let result = merge_comments_part(Some(&existing), &[sample_comment(1)]);
        assert!(result.is_err());
    }

    #[test]
    fn content_type_override_is_added_once() {
        let base = "<Types><Default Extension=\"xml\" ContentType=\"text/xml\"/></Types>";
        let once = ensure_comments_content_type(base).unwrap();
        assert!(once.contains(COMMENTS_PART_NAME));
        let twice = ensure_comments_content_type(&once).unwrap();
        assert_eq!(twice.matches(COMMENTS_PART_NAME).count(), 1);
    }

    #[test]
    fn relationship_id_exceeds_existing_numeric_ids() {
        let base = "<Relationships><Relationship Id=\"rId3\" Type=\"x\" Target=\"y\"/></Relationships>";
        let merged = ensure_comments_relationship(base).unwrap();
        assert!(merged.contains("rId4"));
    }
}
