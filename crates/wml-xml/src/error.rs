//! Error types for XML parsing.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or serializing an XML fragment.
#[derive(Debug, Clone)]
pub enum Error {
    /// XML syntax error surfaced by `quick-xml`.
    XmlSyntax { message: String },

    /// Mismatched end tag (e.g. `<w:r>...</w:p>`).
    MismatchedEndTag { expected: String, found: String },

    /// The document had no root element.
    EmptyDocument,

    /// More than one top-level element was found; a fragment must be rooted
    /// at exactly one element (spec.md §4.1: "a paragraph fragment").
    MultipleRoots,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::XmlSyntax { message } => write!(f, "XML syntax error: {message}"),
            Error::MismatchedEndTag { expected, found } => write!(
                f,
                "mismatched end tag: expected </{expected}>, found </{found}>"
            ),
            Error::EmptyDocument => write!(f, "empty XML fragment: no root element found"),
            Error::MultipleRoots => write!(f, "invalid XML: multiple root elements"),
        }
    }
}

impl std::error::Error for Error {}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlSyntax {
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlSyntax {
            message: format!("attribute error: {err}"),
        }
    }
}
