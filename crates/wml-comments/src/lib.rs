//! Comment-range injection and comments-part merging (spec.md §4.9).

pub mod document;
pub mod error;
pub mod inject;
pub mod model;
pub mod parts;

pub use document::{inject_comments_into_document, DocumentInjectionResult};
pub use error::{Error, Result};
pub use inject::inject_comment_range;
pub use model::{CommentRecord, CommentRequest};
pub use parts::{ensure_comments_content_type, ensure_comments_relationship, merge_comments_part};
