//! Markdown Preprocessor (spec.md §4.2) and the shared line/marker
//! classifiers List Generation and Table Generation both dispatch through
//! (spec.md §4.7, §4.8, §9).

pub mod inline;
pub mod line;

pub use inline::{preprocess_inline, PreprocessedText};
pub use line::{classify_line, infer_indent_step, is_table_group_start, LineKind};
