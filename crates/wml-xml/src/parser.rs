//! XML parser that builds an [`XmlElement`] tree using `quick-xml`.

use crate::error::{Error, Result};
use crate::types::{QName, XmlAttribute, XmlElement, XmlNode};
use quick_xml::events::Event;
use quick_xml::Reader;

struct OpenElement {
    element: XmlElement,
}

/// Parse an XML fragment rooted at exactly one element.
///
/// Whitespace-only text nodes between sibling elements are preserved as-is
/// (spec.md's whitespace-preserving-attribute rules live at the serializer,
/// not the parser: this layer never normalizes whitespace away).
#[tracing::instrument(skip(xml), fields(len = xml.len()))]
pub fn parse(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(tag) => {
                let element = start_element(&tag, false)?;
                stack.push(OpenElement { element });
            }
            Event::Empty(tag) => {
                let element = start_element(&tag, true)?;
                push_child(&mut stack, &mut root, XmlNode::Element(element))?;
            }
            Event::End(tag) => {
                let name = QName::parse(std::str::from_utf8(tag.name().as_ref()).unwrap_or(""));
                let Some(open) = stack.pop() else {
                    return Err(Error::MismatchedEndTag {
                        expected: String::new(),
                        found: name.to_qualified_string(),
                    });
                };
                if open.element.name != name {
                    return Err(Error::MismatchedEndTag {
                        expected: open.element.name.to_qualified_string(),
                        found: name.to_qualified_string(),
                    });
                }
                push_child(&mut stack, &mut root, XmlNode::Element(open.element))?;
            }
            Event::Text(text) => {
                let decoded = text.unescape()?.into_owned();
                if !decoded.is_empty() {
                    push_child(&mut stack, &mut root, XmlNode::Text(decoded))?;
                }
            }
            Event::CData(cdata) => {
                let decoded = String::from_utf8_lossy(cdata.as_ref()).into_owned();
                push_child(&mut stack, &mut root, XmlNode::Text(decoded))?;
            }
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {
                // Opaque, uninteresting for a paragraph fragment; skip.
            }
            Event::Eof => break,
        }
    }

    root.ok_or(Error::EmptyDocument)
}

fn start_element(tag: &quick_xml::events::BytesStart<'_>, self_closing: bool) -> Result<XmlElement> {
    let name = QName::parse(std::str::from_utf8(tag.name().as_ref()).unwrap_or(""));
    let mut attributes = Vec::new();
    for attr in tag.attributes() {
        let attr = attr?;
        let attr_name = QName::parse(std::str::from_utf8(attr.key.as_ref()).unwrap_or(""));
        let value = attr.unescape_value()?.into_owned();
        attributes.push(XmlAttribute::new(attr_name, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        self_closing,
    })
}

fn push_child(
    stack: &mut [OpenElement],
    root: &mut Option<XmlElement>,
    node: XmlNode,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.element.children.push(node);
        Ok(())
    } else {
        match node {
            XmlNode::Element(e) => {
                if root.is_some() {
                    return Err(Error::MultipleRoots);
                }
                *root = Some(e);
                Ok(())
            }
            XmlNode::Text(_) => {
                // Stray top-level text outside the root element; ignore, as
                // quick-xml emits an empty Text event around the root in some
                // inputs (e.g. trailing newline).
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_paragraph() {
        let xml = r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#;
        let root = parse(xml).unwrap();
        assert_eq!(root.name.to_qualified_string(), "w:p");
        assert_eq!(root.text_content(), "Hello");
    }

    #[test]
    fn parses_attributes_and_self_closing() {
        let xml = r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="3"/></w:numPr></w:pPr></w:p>"#;
        let root = parse(xml).unwrap();
        let ppr = root.first_child_named("pPr").unwrap();
        let num_pr = ppr.first_child_named("numPr").unwrap();
        let ilvl = num_pr.first_child_named("ilvl").unwrap();
        assert_eq!(ilvl.get_attribute_qualified("w", "val"), Some("0"));
        assert!(ilvl.self_closing);
    }

    #[test]
    fn rejects_mismatched_end_tag() {
        let xml = r#"<w:p><w:r></w:p></w:r>"#;
        assert!(parse(xml).is_err());
    }

    #[test]
    fn rejects_multiple_roots() {
        let xml = r#"<w:p/><w:p/>"#;
        assert!(matches!(parse(xml), Err(Error::MultipleRoots)));
    }

    #[test]
    fn preserves_entity_escapes() {
        let xml = r#"<w:t>A &amp; B &lt; C</w:t>"#;
        let root = parse(xml).unwrap();
        assert_eq!(root.text_content(), "A & B < C");
    }
}
