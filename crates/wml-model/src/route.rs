//! The Route Plan (spec.md §3/§4.10): the tagged decision produced by the
//! planner selecting which flow handles an edit.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    StructuredListDirect,
    EmptyFormattedText,
    EmptyHtml,
    BlockHtml,
    OoxmlEngine,
    SingleLineListFallback,
}

/// Summary of a parsed list-like block, enough for route classification
/// (spec.md §4.10 rule 1: "parses as a list with at least one real item").
/// The full per-line breakdown used to actually emit list paragraphs lives
/// in `wml-structures`, which reparses the normalized content rather than
/// threading a richer structure back through `RoutePlan`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedListSummary {
    pub item_count: usize,
    pub has_nested_levels: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteFlags {
    pub empty_original: bool,
    pub inline_formatting: bool,
    pub block_elements: bool,
    pub markdown_table: bool,
    pub structured_list: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub kind: RouteKind,
    pub normalized_content: String,
    pub parsed_list_data: Option<ParsedListSummary>,
    pub flags: RouteFlags,
}

impl RoutePlan {
    pub fn new(kind: RouteKind, normalized_content: impl Into<String>, flags: RouteFlags) -> Self {
        Self {
            kind,
            normalized_content: normalized_content.into(),
            parsed_list_data: None,
            flags,
        }
    }
}
