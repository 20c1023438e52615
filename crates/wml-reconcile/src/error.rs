//! Error taxonomy for ingestion, splitting/patching, and serialization.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("fragment does not contain a paragraph element")]
    NoParagraphElement,
    #[error("mismatched end tag while walking paragraph: expected {expected}, found {found}")]
    MismatchedStructure { expected: String, found: String },
    #[error("diff boundary {0} does not fall on a run entry boundary after splitting")]
    UnalignedSplitBoundary(usize),
    #[error("cannot serialize a run entry of kind {0:?} without a recorded author for a tracked change")]
    MissingAuthor(wml_model::RunKind),
    #[error(transparent)]
    Xml(#[from] wml_xml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
