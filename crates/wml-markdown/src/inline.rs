//! Inline Markdown stripping (spec.md §4.2): recognizes a small, flat subset
//! of emphasis markers and removes them from the text, recording the spans
//! they covered as [`FormatHint`]s over the resulting clean text.

use once_cell::sync::Lazy;
use regex::Regex;
use wml_model::{normalize_hints, FormatFlags, FormatHint};

/// One recognized inline marker: an opening/closing delimiter pair and the
/// format flag it turns on. Matched outside-in, longest delimiter first, so
/// `**x**` is tried before `*x*` can steal its delimiters.
struct MarkerRule {
    regex: &'static Lazy<Regex>,
    flag: fn(&mut FormatFlags),
}

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^\*]+?)\*\*").unwrap());
static ITALIC_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^\*]+?)\*").unwrap());
static ITALIC_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_([^_]+?)_").unwrap());
static UNDERLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+\+([^+]+?)\+\+").unwrap());
static STRIKETHROUGH: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~]+?)~~").unwrap());
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+?)`").unwrap());
static TAG_U: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<u>(.*?)</u>").unwrap());
static TAG_S: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<s>(.*?)</s>").unwrap());

fn rules() -> [MarkerRule; 8] {
    [
        MarkerRule { regex: &BOLD, flag: |f| f.bold = true },
        MarkerRule { regex: &ITALIC_STAR, flag: |f| f.italic = true },
        MarkerRule { regex: &ITALIC_UNDERSCORE, flag: |f| f.italic = true },
        MarkerRule { regex: &UNDERLINE, flag: |f| f.underline = true },
        MarkerRule { regex: &STRIKETHROUGH, flag: |f| f.strikethrough = true },
        MarkerRule { regex: &CODE, flag: |f| f.code = true },
        MarkerRule { regex: &TAG_U, flag: |f| f.underline = true },
        MarkerRule { regex: &TAG_S, flag: |f| f.strikethrough = true },
    ]
}

/// Result of running the inline pass over one string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreprocessedText {
    pub clean_text: String,
    pub format_hints: Vec<FormatHint>,
}

/// Strip recognized inline markers from `input`, returning the clean text
/// and the format hints anchored to clean-text offsets.
///
/// Applies rules repeatedly against the shrinking clean text until no rule
/// matches; each match is stripped of its delimiters and the inner span is
/// recorded as a hint at its position *in the text as it exists after this
/// and all prior strips* (clean-text coordinates throughout, per spec.md §4.2).
#[tracing::instrument(skip(input), fields(len = input.len()))]
pub fn preprocess_inline(input: &str) -> PreprocessedText {
    let mut text = input.to_string();
    let mut hints: Vec<FormatHint> = Vec::new();

    loop {
        let mut progressed = false;
        for rule in rules() {
            if let Some(m) = rule.regex.find(&text) {
                let caps = rule.regex.captures(&text).expect("find matched above");
                let inner = caps.get(1).expect("rule has one capture group");
                let whole = m;
                let start = whole.start();
                let inner_text = inner.as_str().to_string();
                let inner_len = inner_text.len();

                text.replace_range(whole.start()..whole.end(), &inner_text);

                let mut flags = FormatFlags::default();
                (rule.flag)(&mut flags);
                hints.push(FormatHint::new(start, start + inner_len, flags));

                shift_hints_after_replace(&mut hints, whole.end(), whole.start() + inner_len, hints.len() - 1);
                progressed = true;
                break;
            }
        }
        if !progressed {
            break;
        }
    }

    PreprocessedText { clean_text: text, format_hints: normalize_hints(hints) }
}

/// After replacing `[_, old_end)` with something ending at `new_end`, shift
/// every previously-recorded hint that started at or after `old_end` by the
/// same delta. `skip_index` is the hint just pushed for this replacement,
/// which is already expressed in post-replacement coordinates.
fn shift_hints_after_replace(hints: &mut [FormatHint], old_end: usize, new_end: usize, skip_index: usize) {
    let delta = new_end as isize - old_end as isize;
    if delta == 0 {
        return;
    }
    for (i, hint) in hints.iter_mut().enumerate() {
        if i == skip_index {
            continue;
        }
        if hint.start >= old_end {
            hint.start = (hint.start as isize + delta).max(0) as usize;
            hint.end = (hint.end as isize + delta).max(0) as usize;
        }
    }
}
