//! Error taxonomy for numbering allocation and part manipulation.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("numbering xml has no abstractNumId attribute on <w:abstractNum>")]
    MissingAbstractNumId,
    #[error("numbering xml has no numId attribute on <w:num>")]
    MissingNumId,
    #[error("target numId {0} not found in numbering xml")]
    UnknownNumId(u32),
    #[error("malformed numbering xml: {0}")]
    Malformed(String),
    #[error("inconsistent numbering merge: {0}")]
    InconsistentMerge(String),
    #[error(transparent)]
    Xml(#[from] wml_xml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
