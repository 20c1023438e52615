//! A thin parse/serialize facade over an XML DOM, scoped to what
//! WordprocessingML paragraph-fragment reconciliation needs.
//!
//! This is deliberately not a general-purpose XML library: there is no DTD
//! support, no namespace-URI resolution (only prefix strings, since WML
//! fragments arrive with a fixed, known prefix set), and no streaming API.
//! What it does guarantee: unrecognized elements and attributes always
//! round-trip, and attribute lookups always go through [`types::QName`]
//! rather than string-prefixed keys.

pub mod error;
pub mod parser;
pub mod serializer;
pub mod types;

pub use error::{Error, Result};
pub use parser::parse;
pub use serializer::serialize;
pub use types::{QName, XmlAttribute, XmlElement, XmlNode};
