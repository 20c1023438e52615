//! Error taxonomy for route planning and target resolution.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("neither a target reference nor target text resolved a paragraph")]
    TargetNotFound,
}

pub type Result<T> = std::result::Result<T, Error>;
