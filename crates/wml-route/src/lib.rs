//! Route Planner & Orchestrator support and Target Resolver (spec.md §4.10,
//! §4.11).

pub mod error;
pub mod fallback;
pub mod planner;
pub mod resolver;
pub mod widen;

pub use error::{Error, Result};
pub use fallback::{detect_single_line_list_fallback, ExplicitSequenceState, FallbackCandidate, SequenceDecision};
pub use planner::{normalize_content, plan_route};
pub use resolver::{resolve_target_paragraph, ResolvedBy, ResolvedTarget};
pub use widen::{combined_block_text, plan_list_insertion, widen_list_block};
