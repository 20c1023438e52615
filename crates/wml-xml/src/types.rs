//! Core types for the XML DOM facade.
//!
//! A [`XmlNode`] tree is a minimal, allocation-friendly DOM: elements carry a
//! namespace-qualified name, an attribute list, and ordered children. Unlike a
//! general-purpose XML library, this adapter never needs to answer "what
//! namespace is this prefix bound to" beyond the fixed `w:` main namespace
//! (spec.md §6) and a handful of known extension namespaces, so prefixes are
//! tracked as plain strings rather than resolved against an in-scope map.

/// A qualified element or attribute name: an optional namespace prefix plus a
/// local name. Equality and lookups always go by `(prefix, local)` so callers
/// can never accidentally match `w:id` against `r:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
        }
    }

    pub fn prefixed(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local: local.into(),
        }
    }

    /// Render as `prefix:local` or just `local` when there is no prefix.
    pub fn to_qualified_string(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.local),
            None => self.local.clone(),
        }
    }

    /// Parse a raw tag/attribute name of the form `prefix:local` or `local`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local)) => Self::prefixed(prefix, local),
            None => Self::new(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlAttribute {
    pub name: QName,
    pub value: String,
}

impl XmlAttribute {
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// A node in the XML tree: either an element or a text run.
///
/// Unknown elements (content controls, smart tags, pre-existing tracked
/// changes this crate doesn't special-case, anything in a namespace the
/// caller never asked about) round-trip byte-for-byte as opaque
/// [`XmlNode::Element`] values — the adapter never drops unrecognized
/// attributes or children.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: QName,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
    /// Self-closed in the source (`<w:br/>`), preserved so re-serialization of
    /// an untouched element is indistinguishable from the input.
    pub self_closing: bool,
}

impl XmlElement {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    pub fn with_attr(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push(XmlAttribute::new(name, value));
        self
    }

    pub fn with_children(mut self, children: Vec<XmlNode>) -> Self {
        self.children = children;
        self
    }

    pub fn get_attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == local)
            .map(|a| a.value.as_str())
    }

    pub fn get_attribute_qualified(&self, prefix: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.prefix.as_deref() == Some(prefix) && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self.attributes.iter_mut().find(|a| a.name == name) {
            existing.value = value;
        } else {
            self.attributes.push(XmlAttribute::new(name, value));
        }
    }

    /// Direct child elements whose local name matches, in document order.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter_map(move |c| match c {
            XmlNode::Element(e) if e.name.local == local => Some(e),
            _ => None,
        })
    }

    pub fn first_child_named(&self, local: &str) -> Option<&XmlElement> {
        self.children_named(local).next()
    }

    /// Concatenated text of all direct and nested text nodes, in document
    /// order. Does not special-case `w:tab`/`w:br` — callers that need the
    /// tab/break-to-character substitution from spec.md §4.1 do that
    /// themselves while walking, since this adapter has no notion of which
    /// elements are tab/break markers.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qname_parses_prefix() {
        let q = QName::parse("w:r");
        assert_eq!(q.prefix.as_deref(), Some("w"));
        assert_eq!(q.local, "r");
    }

    #[test]
    fn qname_parses_bare_local() {
        let q = QName::parse("document");
        assert_eq!(q.prefix, None);
        assert_eq!(q.local, "document");
    }

    #[test]
    fn element_get_attribute() {
        let el = XmlElement::new(QName::prefixed("w", "r")).with_attr(QName::new("id"), "5");
        assert_eq!(el.get_attribute("id"), Some("5"));
        assert_eq!(el.get_attribute("missing"), None);
    }

    #[test]
    fn element_text_content_nested() {
        let inner = XmlElement::new(QName::prefixed("w", "t"))
            .with_children(vec![XmlNode::Text("hello".into())]);
        let outer = XmlElement::new(QName::prefixed("w", "r"))
            .with_children(vec![XmlNode::Element(inner)]);
        assert_eq!(outer.text_content(), "hello");
    }

    #[test]
    fn children_named_filters_by_local_name_only() {
        let a = XmlElement::new(QName::prefixed("w", "r"));
        let b = XmlElement::new(QName::prefixed("x", "r"));
        let parent = XmlElement::new(QName::new("p"))
            .with_children(vec![XmlNode::Element(a.clone()), XmlNode::Element(b)]);
        let found: Vec<_> = parent.children_named("r").collect();
        assert_eq!(found.len(), 2);
    }
}
