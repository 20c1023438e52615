//! Line-level classification shared by List Generation and Table Generation
//! (spec.md §4.7, §4.8): heading, list-marker, and table-row detection,
//! centralized here so both consumers agree on one set of patterns
//! (spec.md §9 redesign note: regex detection should live in one place
//! rather than be duplicated per caller).

use once_cell::sync::Lazy;
use regex::Regex;
use wml_model::MarkerFormat;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)[-*+]\s+(.*)$").unwrap());
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)(\d+)\.\s+(.*)$").unwrap());
static LOWER_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)([a-z])\.\s+(.*)$").unwrap());
static UPPER_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)([A-Z])\.\s+(.*)$").unwrap());
static LOWER_ROMAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(m{0,4}(cm|cd|d?c{0,3})(xc|xl|l?x{0,3})(ix|iv|v?i{0,3}))\.\s+(.*)$").unwrap());
static UPPER_ROMAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(M{0,4}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3}))\.\s+(.*)$").unwrap());
static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|?\s*:?-{1,}:?\s*(\|\s*:?-{1,}:?\s*)*\|?\s*$").unwrap());
static TABLE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|.*\|\s*$").unwrap());

/// A single classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Heading { level: u8, text: String },
    ListItem { indent: usize, format: MarkerFormat, text: String },
    TableRow { cells: Vec<String> },
    TableSeparator,
    Plain(String),
    Blank,
}

/// Classify one line in isolation. Table-group detection (needing the next
/// line to confirm a separator row) is layered on top by [`classify_block`].
pub fn classify_line(line: &str) -> LineKind {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(caps) = HEADING.captures(line) {
        let level = caps[1].len() as u8;
        return LineKind::Heading { level, text: caps[2].to_string() };
    }
    if TABLE_SEPARATOR.is_match(line) && line.contains('-') {
        return LineKind::TableSeparator;
    }
    if TABLE_ROW.is_match(line) {
        return LineKind::TableRow { cells: split_table_row(line) };
    }
    if let Some(caps) = BULLET.captures(line) {
        return LineKind::ListItem {
            indent: caps[1].len(),
            format: MarkerFormat::Bullet,
            text: caps[2].to_string(),
        };
    }
    if let Some(caps) = DECIMAL.captures(line) {
        return LineKind::ListItem {
            indent: caps[1].len(),
            format: MarkerFormat::Decimal,
            text: caps[3].to_string(),
        };
    }
    if let Some(caps) = LOWER_ROMAN.captures(line) {
        if !caps[2].is_empty() {
            return LineKind::ListItem {
                indent: caps[1].len(),
                format: MarkerFormat::LowerRoman,
                text: caps[6].to_string(),
            };
        }
    }
    if let Some(caps) = UPPER_ROMAN.captures(line) {
        if !caps[2].is_empty() {
            return LineKind::ListItem {
                indent: caps[1].len(),
                format: MarkerFormat::UpperRoman,
                text: caps[6].to_string(),
            };
        }
    }
    if let Some(caps) = LOWER_ALPHA.captures(line) {
        return LineKind::ListItem {
            indent: caps[1].len(),
            format: MarkerFormat::LowerAlpha,
            text: caps[2].to_string(),
        };
    }
    if let Some(caps) = UPPER_ALPHA.captures(line) {
        return LineKind::ListItem {
            indent: caps[1].len(),
            format: MarkerFormat::UpperAlpha,
            text: caps[2].to_string(),
        };
    }
    LineKind::Plain(line.to_string())
}

fn split_table_row(line: &str) -> Vec<String> {
    let trimmed = line.trim().trim_start_matches('|').trim_end_matches('|');
    trimmed.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// True when `lines` starting at `index` form the head of a Markdown table:
/// a row followed immediately by a separator row (spec.md §4.7: "at least
/// two consecutive lines, the second matching a separator row").
pub fn is_table_group_start(lines: &[&str], index: usize) -> bool {
    if index + 1 >= lines.len() {
        return false;
    }
    matches!(classify_line(lines[index]), LineKind::TableRow { .. })
        && matches!(classify_line(lines[index + 1]), LineKind::TableSeparator)
}

/// Infer the smallest positive indentation jump across a block of
/// already-classified list items, used as the spaces-per-level unit
/// (spec.md §4.7 "indentation-step detector").
pub fn infer_indent_step(indents: &[usize]) -> usize {
    let mut sorted: Vec<usize> = indents.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&d| d > 0)
        .min()
        .unwrap_or(2)
}
