//! Error taxonomy for comment-range injection and part merging.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("comment text {text:?} was not found in paragraph {paragraph_index}")]
    TextNotFound { paragraph_index: usize, text: String },
    #[error("paragraph index {0} is out of range")]
    ParagraphIndexOutOfRange(usize),
    #[error("duplicate comment id {0}")]
    DuplicateCommentId(u32),
    #[error(transparent)]
    Xml(#[from] wml_xml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
