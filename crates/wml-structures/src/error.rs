//! Error taxonomy for list and table generation/reconciliation.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("markdown table is malformed: {0}")]
    InvalidTableMarkdown(String),
    #[error("list block contains no recognizable list item")]
    EmptyListBlock,
    #[error(transparent)]
    Xml(#[from] wml_xml::Error),
    #[error(transparent)]
    Reconcile(#[from] wml_reconcile::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
