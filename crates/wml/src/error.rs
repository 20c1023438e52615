//! The top-level error taxonomy (spec.md §7). Each variant corresponds to
//! one error kind name from the taxonomy; propagation policy (per-change
//! isolation vs. whole-call abort) is enforced by the orchestration
//! functions in [`crate::interfaces`], not by this type itself.

#[derive(Debug, thiserror::Error)]
pub enum RedlineError {
    #[error("malformed input xml: {0}")]
    MalformedInputXml(String),
    #[error("target paragraph not found")]
    TargetNotFound,
    #[error("duplicate comment id {0}")]
    DuplicateCommentId(u32),
    #[error("invalid table markdown: {0}")]
    InvalidTableMarkdown(String),
    #[error("numbering merge could not allocate within the preferred identifier window: {0}")]
    InconsistentNumberingMerge(String),
    #[error("validation failed: {0}")]
    ValidationFailed(String),
}

pub type Result<T> = std::result::Result<T, RedlineError>;

impl From<wml_xml::Error> for RedlineError {
    fn from(err: wml_xml::Error) -> Self {
        RedlineError::MalformedInputXml(err.to_string())
    }
}

impl From<wml_reconcile::Error> for RedlineError {
    fn from(err: wml_reconcile::Error) -> Self {
        match err {
            wml_reconcile::Error::Xml(inner) => inner.into(),
            other => RedlineError::MalformedInputXml(other.to_string()),
        }
    }
}

impl From<wml_structures::Error> for RedlineError {
    fn from(err: wml_structures::Error) -> Self {
        match err {
            wml_structures::Error::InvalidTableMarkdown(detail) => RedlineError::InvalidTableMarkdown(detail),
            wml_structures::Error::Xml(inner) => inner.into(),
            wml_structures::Error::Reconcile(inner) => inner.into(),
            other => RedlineError::MalformedInputXml(other.to_string()),
        }
    }
}

impl From<wml_comments::Error> for RedlineError {
    fn from(err: wml_comments::Error) -> Self {
        match err {
            wml_comments::Error::DuplicateCommentId(id) => RedlineError::DuplicateCommentId(id),
            wml_comments::Error::Xml(inner) => inner.into(),
            other => RedlineError::MalformedInputXml(other.to_string()),
        }
    }
}

impl From<wml_numbering::Error> for RedlineError {
    fn from(err: wml_numbering::Error) -> Self {
        match err {
            wml_numbering::Error::InconsistentMerge(detail) => RedlineError::InconsistentNumberingMerge(detail),
            wml_numbering::Error::Xml(inner) => inner.into(),
            other => RedlineError::MalformedInputXml(other.to_string()),
        }
    }
}

impl From<wml_route::Error> for RedlineError {
    fn from(err: wml_route::Error) -> Self {
        match err {
            wml_route::Error::TargetNotFound => RedlineError::TargetNotFound,
        }
    }
}
