//! Word-level diff engine (spec.md §4.3): tokenizes paragraph text into a
//! word alphabet, diffs it with `similar`, and folds short sandwiched
//! equalities back into their neighboring edits.

pub mod cleanup;
pub mod diff;
pub mod tokenizer;

pub use cleanup::{semantic_cleanup, DEFAULT_CLEANUP_THRESHOLD};
pub use diff::{apply_ops, diff_words};
pub use tokenizer::{tokenize, Token, TokenKind};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn diff_is_sound(old in ".{0,60}", new in ".{0,60}") {
            let ops = diff_words(&old, &new, true);
            prop_assert_eq!(apply_ops(&old, &ops), new);
        }

        #[test]
        fn diff_is_deterministic(old in ".{0,60}", new in ".{0,60}") {
            let first = diff_words(&old, &new, true);
            let second = diff_words(&old, &new, true);
            prop_assert_eq!(first, second);
        }
    }
}
