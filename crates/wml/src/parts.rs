//! Contract 7: `mergeSiblingParts` (spec.md §6.7).
//!
//! The diff/patch and list/table/comment flows each hand back sibling-part
//! XML in isolation (a numbering part from [`crate::generate_list_fragment`],
//! a comments part from [`crate::inject_comments_into_document_fragment`]).
//! This is the single place that reconciles those fragments against a host
//! document's existing `[Content_Types].xml`, `word/_rels/document.xml.rels`,
//! `word/numbering.xml`, and `word/comments.xml` — the merge rules spec.md
//! §4.6 (`mergeInto`/`remapPayload`) and §4.9 (part-merge directives) already
//! specify per-part, wired together behind one call so a host adapter never
//! has to sequence `wml-numbering` and `wml-comments` calls itself.

use wml_xml::XmlElement;

use crate::error::Result;

/// What a host currently has, plus whatever this turn produced that needs
/// merging in. All fields are optional except the two parts every WML
/// package carries.
#[derive(Debug, Clone, Default)]
pub struct PartMergeInput {
    pub content_types_xml: String,
    pub relationships_xml: String,
    pub existing_numbering_xml: Option<String>,
    pub incoming_numbering_xml: Option<String>,
    /// Already-serialized paragraph fragments referencing `numId`s from
    /// `incoming_numbering_xml`; rewritten in place to the destination's
    /// remapped ids (spec.md §4.6 `remapPayload`).
    pub incoming_paragraph_nodes_xml: Vec<String>,
    pub existing_comments_xml: Option<String>,
    pub incoming_comments: Vec<wml_comments::CommentRecord>,
}

/// The merged parts plus a log of what was merged, for the host to decide
/// which parts actually changed on disk.
#[derive(Debug, Clone, Default)]
pub struct PartMergeOutcome {
    pub content_types_xml: String,
    pub relationships_xml: String,
    pub numbering_xml: Option<String>,
    pub comments_xml: Option<String>,
    pub rewritten_paragraph_nodes_xml: Vec<String>,
    pub merges: Vec<String>,
}

/// Merge numbering and comments siblings into a host's content-types,
/// relationships, numbering, and comments parts. Part-level failures
/// (`duplicate-comment-id`, `inconsistent-numbering-merge`) abort the whole
/// call per spec.md §7's propagation policy.
#[tracing::instrument(skip(input))]
pub fn merge_sibling_parts(input: PartMergeInput) -> Result<PartMergeOutcome> {
    let mut content_types_xml = input.content_types_xml;
    let mut relationships_xml = input.relationships_xml;
    let mut merges = Vec::new();

    let mut paragraph_nodes: Vec<XmlElement> = input
        .incoming_paragraph_nodes_xml
        .iter()
        .map(|xml| wml_xml::parse(xml))
        .collect::<std::result::Result<_, _>>()?;

    let numbering_xml = match input.incoming_numbering_xml {
        Some(incoming_xml) => {
            let incoming = wml_xml::parse(&incoming_xml)?;
            let merged = match &input.existing_numbering_xml {
                Some(existing_xml) => {
                    let existing = wml_xml::parse(existing_xml)?;
                    let (merged, num_remap) = wml_numbering::merge_into(&existing, &incoming)?;
                    wml_numbering::remap_payload(&mut paragraph_nodes, &num_remap);
                    merged
                }
                // Nothing to merge into yet: the incoming part becomes the
                // destination's numbering part verbatim, no remap needed.
                None => incoming,
            };
            merges.push("numbering".to_string());
            Some(wml_xml::serialize(&merged)?)
        }
        None => None,
    };

    let comments_xml = if input.incoming_comments.is_empty() {
        None
    } else {
        let merged = wml_comments::merge_comments_part(input.existing_comments_xml.as_deref(), &input.incoming_comments)?;
        content_types_xml = wml_comments::ensure_comments_content_type(&content_types_xml)?;
        relationships_xml = wml_comments::ensure_comments_relationship(&relationships_xml)?;
        merges.push("comments".to_string());
        Some(merged)
    };

    let rewritten_paragraph_nodes_xml = paragraph_nodes
        .iter()
        .map(wml_xml::serialize)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(PartMergeOutcome {
        content_types_xml,
        relationships_xml,
        numbering_xml,
        comments_xml,
        rewritten_paragraph_nodes_xml,
        merges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wml_comments::CommentRecord;

    fn base_content_types() -> String {
        "<Types><Default Extension=\"xml\" ContentType=\"text/xml\"/></Types>".to_string()
    }

    fn base_relationships() -> String {
        "<Relationships><Relationship Id=\"rId1\" Type=\"x\" Target=\"styles.xml\"/></Relationships>".to_string()
    }

    #[test]
    fn merges_nothing_when_no_siblings_supplied() {
        let outcome = merge_sibling_parts(PartMergeInput {
            content_types_xml: base_content_types(),
            relationships_xml: base_relationships(),
            ..Default::default()
        })
        .unwrap();
        assert!(outcome.merges.is_empty());
        assert!(outcome.numbering_xml.is_none());
        assert!(outcome.comments_xml.is_none());
    }

    #[test]
    fn merges_comments_and_ensures_content_type_and_relationship() {
        let outcome = merge_sibling_parts(PartMergeInput {
            content_types_xml: base_content_types(),
            relationships_xml: base_relationships(),
            incoming_comments: vec![CommentRecord {
                id: 1,
                author: "reviewer".into(),
                date: "2026-01-01T00:00:00+00:00".into(),
                content: "note".into(),
            }],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(outcome.merges, vec!["comments"]);
        assert!(outcome.content_types_xml.contains("/word/comments.xml"));
        assert!(outcome.relationships_xml.contains("rId2"));
        assert!(outcome.comments_xml.unwrap().contains("w:id=\"1\""));
    }

    #[test]
    fn fresh_numbering_part_passes_through_without_remap() {
        let incoming = "<w:numbering><w:abstractNum w:abstractNumId=\"0\"/>\
                         <w:num w:numId=\"1\"><w:abstractNumId w:val=\"0\"/></w:num></w:numbering>";
        let outcome = merge_sibling_parts(PartMergeInput {
            content_types_xml: base_content_types(),
            relationships_xml: base_relationships(),
            incoming_numbering_xml: Some(incoming.to_string()),
            incoming_paragraph_nodes_xml: vec!["<w:p><w:pPr><w:numPr><w:numId w:val=\"1\"/></w:numPr></w:pPr></w:p>".to_string()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(outcome.merges, vec!["numbering"]);
        assert!(outcome.rewritten_paragraph_nodes_xml[0].contains("w:val=\"1\""));
    }

    #[test]
    fn existing_numbering_part_remaps_incoming_ids() {
        let existing = "<w:numbering><w:abstractNum w:abstractNumId=\"0\"/>\
                         <w:num w:numId=\"1\"><w:abstractNumId w:val=\"0\"/></w:num></w:numbering>";
        let incoming = "<w:numbering><w:abstractNum w:abstractNumId=\"0\"/>\
                         <w:num w:numId=\"1\"><w:abstractNumId w:val=\"0\"/></w:num></w:numbering>";
        let outcome = merge_sibling_parts(PartMergeInput {
            content_types_xml: base_content_types(),
            relationships_xml: base_relationships(),
            existing_numbering_xml: Some(existing.to_string()),
            incoming_numbering_xml: Some(incoming.to_string()),
            incoming_paragraph_nodes_xml: vec!["<w:p><w:pPr><w:numPr><w:numId w:val=\"1\"/></w:numPr></w:pPr></w:p>".to_string()],
            ..Default::default()
        })
        .unwrap();
        let merged_numbering = outcome.numbering_xml.unwrap();
        assert_eq!(merged_numbering.matches("w:numId=\"1\"").count(), 1);
        assert_eq!(merged_numbering.matches("w:numId=\"2\"").count(), 1);
        assert!(outcome.rewritten_paragraph_nodes_xml[0].contains("w:val=\"2\""));
    }
}
