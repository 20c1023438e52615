//! Document-level comment injection (spec.md §4.9): processes multiple
//! requests against one document fragment, rejecting duplicate comment ids
//! across existing and incoming comments.

use wml_reconcile::ReconcileContext;
use wml_xml::{serialize, XmlElement, XmlNode};

use crate::error::{Error, Result};
use crate::inject::inject_comment_range;
use crate::model::{CommentRecord, CommentRequest};

/// Outcome of injecting a batch of comment requests into one document
/// fragment.
pub struct DocumentInjectionResult {
    pub wml: String,
    pub comments: Vec<CommentRecord>,
    pub warnings: Vec<String>,
}

/// Inject `requests` into `doc_wml`, a fragment containing one or more
/// `<w:p>` paragraphs in document order. `existing_ids` are comment ids
/// already present in the destination comments part, used to detect
/// collisions up front (spec.md §4.9: "duplicate identifiers across
/// existing and incoming comments must be rejected").
#[tracing::instrument(skip(doc_wml, requests, ctx))]
pub fn inject_comments_into_document(
    doc_wml: &str,
    requests: &[CommentRequest],
    existing_ids: &[u32],
    ctx: &mut ReconcileContext,
) -> Result<DocumentInjectionResult> {
    let root = wml_xml::parse(doc_wml)?;
    let mut paragraphs: Vec<XmlElement> = collect_paragraphs(&root);

    let mut used_ids: std::collections::HashSet<u32> = existing_ids.iter().copied().collect();
    let mut next_id = existing_ids.iter().copied().max().unwrap_or(0) + 1;

    let mut comments = Vec::new();
    let mut warnings = Vec::new();

    for request in requests {
        if request.paragraph_index == 0 || request.paragraph_index > paragraphs.len() {
            warnings.push(format!(
                "paragraph index {} is out of range; skipping comment",
                request.paragraph_index
            ));
            continue;
        }

        let id = next_id;
        if !used_ids.insert(id) {
            return Err(Error::DuplicateCommentId(id));
        }
        next_id += 1;

        let paragraph = &paragraphs[request.paragraph_index - 1];
        let rewritten = inject_comment_range(paragraph, &request.text_to_find, id, request.paragraph_index)?;
        paragraphs[request.paragraph_index - 1] = rewritten;

        comments.push(CommentRecord {
            id,
            author: request.author.clone(),
            date: ctx.now_rfc3339(),
            content: request.comment_content.clone(),
        });
    }

    let wml = rebuild_document(&root, &paragraphs)?;
    Ok(DocumentInjectionResult { wml, comments, warnings })
}

fn collect_paragraphs(root: &XmlElement) -> Vec<XmlElement> {
    fn walk(node: &XmlElement, out: &mut Vec<XmlElement>) {
        if node.name.local == "p" {
            out.push(node.clone());
            return;
        }
        for child in &node.children {
            if let XmlNode::Element(e) = child {
                walk(e, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

fn rebuild_document(root: &XmlElement, paragraphs: &[XmlElement]) -> Result<String> {
    fn walk(node: &XmlElement, cursor: &mut usize, paragraphs: &[XmlElement]) -> XmlElement {
        if node.name.local == "p" {
            let replacement = paragraphs[*cursor].clone();
            *cursor += 1;
            return replacement;
        }
        let mut rebuilt = node.clone();
        rebuilt.children = node
            .children
            .iter()
            .map(|child| match child {
                XmlNode::Element(e) => XmlNode::Element(walk(e, cursor, paragraphs)),
                XmlNode::Text(t) => XmlNode::Text(t.clone()),
            })
            .collect();
        rebuilt
    }

    if root.name.local == "p" {
        return Ok(serialize(&paragraphs[0])?);
    }
    let mut cursor = 0;
    let rebuilt = walk(root, &mut cursor, paragraphs);
    Ok(serialize(&rebuilt)?)
}
