//! Serialize an [`XmlElement`] tree back to a string using `quick-xml`.

use crate::error::Result;
use crate::types::{XmlElement, XmlNode};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Serialize a tree rooted at `element`, byte for byte reproducing unescaped
/// text the way `quick-xml` would re-escape it (`&`, `<`, `>` only — WML
/// consumers, including Word, do not require `"`/`'` escaping outside
/// attribute values).
pub fn serialize(element: &XmlElement) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_element(&mut writer, element)?;
    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, element: &XmlElement) -> Result<()> {
    let tag_name = element.name.to_qualified_string();
    let mut start = BytesStart::new(tag_name.clone());
    for attr in &element.attributes {
        start.push_attribute((attr.name.to_qualified_string().as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() && element.self_closing {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Text(text) => {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
            XmlNode::Element(child_el) => write_element(writer, child_el)?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(tag_name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn round_trips_simple_paragraph() {
        let xml = r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#;
        let root = parse(xml).unwrap();
        let out = serialize(&root).unwrap();
        assert_eq!(parse(&out).unwrap(), root);
    }

    #[test]
    fn escapes_special_characters() {
        use crate::types::{QName, XmlElement, XmlNode};
        let el = XmlElement::new(QName::prefixed("w", "t"))
            .with_children(vec![XmlNode::Text("A & B < C > D".to_string())]);
        let out = serialize(&el).unwrap();
        assert!(out.contains("&amp;"));
        assert!(out.contains("&lt;"));
        assert!(out.contains("&gt;"));
    }

    #[test]
    fn preserves_self_closing_empty_elements() {
        let xml = r#"<w:br/>"#;
        let root = parse(xml).unwrap();
        let out = serialize(&root).unwrap();
        assert!(out.ends_with("/>"));
    }
}
