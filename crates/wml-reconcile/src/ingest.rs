//! Paragraph Ingestor (spec.md §4.1): walks a WML fragment rooted at a
//! paragraph and produces an ordered [`RunModel`] with character offsets.

use wml_model::{NumberingContext, RunEntry, RunKind, RunModel};
use wml_xml::{serialize, QName, XmlElement, XmlNode};

use crate::error::{Error, Result};

/// Everything the orchestrator needs out of one ingested paragraph.
pub struct IngestedParagraph {
    pub run_model: RunModel,
    pub accepted_text: String,
    pub paragraph_properties_xml: Option<String>,
    pub numbering_context: Option<NumberingContext>,
}

/// Ingest a WML fragment rooted at (or containing, as its first paragraph
/// descendant) a `<w:p>` element.
#[tracing::instrument(skip(fragment))]
pub fn ingest_paragraph(fragment: &XmlElement) -> Result<IngestedParagraph> {
    let paragraph = find_paragraph(fragment).ok_or(Error::NoParagraphElement)?;

    let paragraph_properties_xml = paragraph
        .first_child_named("pPr")
        .map(serialize_opaque)
        .transpose()?;

    let numbering_context = paragraph
        .first_child_named("pPr")
        .and_then(extract_numbering_context);

    let mut model = RunModel::new();
    model.paragraph_properties_xml = paragraph_properties_xml.clone();

    for child in &paragraph.children {
        if let XmlNode::Element(element) = child {
            if element.name.local == "pPr" {
                continue;
            }
            walk_element(element, &mut model)?;
        }
    }

    model.recompute_offsets();
    let accepted_text = model.accepted_text();

    Ok(IngestedParagraph {
        run_model: model,
        accepted_text,
        paragraph_properties_xml,
        numbering_context,
    })
}

fn find_paragraph(fragment: &XmlElement) -> Option<&XmlElement> {
    if fragment.name.local == "p" {
        return Some(fragment);
    }
    fragment.first_child_named("p")
}

fn extract_numbering_context(paragraph_properties: &XmlElement) -> Option<NumberingContext> {
    let num_pr = paragraph_properties.first_child_named("numPr")?;
    let num_id: u32 = num_pr.first_child_named("numId")?.get_attribute("val")?.parse().ok()?;
    let ilvl: u32 = num_pr
        .first_child_named("ilvl")
        .and_then(|e| e.get_attribute("val"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    Some(NumberingContext { num_id, ilvl })
}

fn serialize_opaque(element: &XmlElement) -> Result<String> {
    Ok(serialize(element)?)
}

/// Depth-first walk of one child element of the paragraph, appending
/// [`RunEntry`] values to `model` (spec.md §4.1 "Walk order").
fn walk_element(element: &XmlElement, model: &mut RunModel) -> Result<()> {
    match element.name.local.as_str() {
        "proofErr" => {}
        "sdt" => {
            model.push(RunEntry::opaque(RunKind::ContainerStart, opening_tag(element)));
            if let Some(content) = element.first_child_named("sdtContent") {
                for child in &content.children {
                    if let XmlNode::Element(child_element) = child {
                        walk_element(child_element, model)?;
                    }
                }
            }
            model.push(RunEntry::opaque(RunKind::ContainerEnd, format!("</{}>", element.name.to_qualified_string())));
        }
        "smartTag" => {
            model.push(RunEntry::opaque(RunKind::ContainerStart, opening_tag(element)));
            for child in &element.children {
                if let XmlNode::Element(child_element) = child {
                    walk_element(child_element, model)?;
                }
            }
            model.push(RunEntry::opaque(RunKind::ContainerEnd, format!("</{}>", element.name.to_qualified_string())));
        }
        "del" => {
            let text = recover_run_text(element);
            let author = element.get_attribute("author").unwrap_or("unknown").to_string();
            model.push(RunEntry::deletion(text, run_properties_of(element), author));
        }
        "ins" => {
            for child in &element.children {
                if let XmlNode::Element(child_element) = child {
                    walk_element(child_element, model)?;
                }
            }
        }
        "bookmarkStart" => {
            model.push(RunEntry::opaque(RunKind::Bookmark, opening_tag(element)));
        }
        "bookmarkEnd" => {
            model.push(RunEntry::opaque(RunKind::Bookmark, opening_tag(element)));
        }
        "hyperlink" => {
            model.push(RunEntry::opaque(RunKind::ContainerStart, opening_tag(element)));
            for child in &element.children {
                if let XmlNode::Element(child_element) = child {
                    walk_element(child_element, model)?;
                }
            }
            model.push(RunEntry::opaque(RunKind::ContainerEnd, format!("</{}>", element.name.to_qualified_string())));
        }
        "fldSimple" => {
            model.push(RunEntry::opaque(RunKind::Field, serialize_opaque(element)?));
        }
        "r" => {
            let text = recover_run_text(element);
            model.push(RunEntry::text(text, run_properties_of(element)));
        }
        _ => {
            model.push(RunEntry::opaque(RunKind::ContainerStart, serialize_opaque(element)?));
            model.push(RunEntry::opaque(RunKind::ContainerEnd, String::new()));
        }
    }
    Ok(())
}

fn opening_tag(element: &XmlElement) -> String {
    let attrs: String = element
        .attributes
        .iter()
        .map(|a| format!(" {}=\"{}\"", a.name.to_qualified_string(), a.value))
        .collect();
    format!("<{}{attrs}>", element.name.to_qualified_string())
}

fn run_properties_of(run_like: &XmlElement) -> Option<String> {
    run_like.first_child_named("rPr").map(|rpr| serialize(rpr).unwrap_or_default())
}

/// Concatenate literal text, tab (`\t`), and break (`\n`) descendants of a
/// run, per spec.md §4.1.
fn recover_run_text(run_like: &XmlElement) -> String {
    let mut out = String::new();
    collect_run_text(run_like, &mut out);
    out
}

fn collect_run_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        if let XmlNode::Element(child_element) = child {
            match child_element.name.local.as_str() {
                "t" => out.push_str(&child_element.text_content()),
                "tab" => out.push('\t'),
                "br" | "cr" => out.push('\n'),
                "r" => collect_run_text(child_element, out),
                _ => {}
            }
        }
    }
}
