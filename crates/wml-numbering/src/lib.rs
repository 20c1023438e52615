//! Numbering Service (spec.md §4.6): per-run style-signature interning,
//! identifier allocation, numbering-part emission, merge, and remap.

pub mod error;
pub mod service;

pub use error::{Error, Result};
pub use service::{apply_start_override, merge_into, remap_payload, NumberingService, DEFAULT_PREFERRED_BOUND};
