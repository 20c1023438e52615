//! The seven external interfaces (spec.md §6). Names are conceptual in the
//! specification; these are their Rust shapes.

use wml_markdown::preprocess_inline;
use wml_model::{FormatHint, NumberingContext, TargetSnapshot};
use wml_numbering::NumberingService;
use wml_reconcile::{build_runs_from_preprocessed, ingest_paragraph, reconcile_paragraph_text, serialize_paragraph, ReconcileContext};
use wml_route::{detect_single_line_list_fallback, plan_route as route_plan_route, ExplicitSequenceState};
use wml_structures::{generate_list_fragment as structures_generate_list_fragment, generate_table_paragraph};
use wml_xml::{serialize, QName, XmlElement, XmlNode};

pub use wml_model::RoutePlan;
pub use wml_route::ResolvedBy;

use crate::error::{RedlineError, Result};

/// Validation strictness for contract 1's `validateOutput` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Options for [`apply_redline_to_paragraph_fragment`].
#[derive(Debug, Clone, Default)]
pub struct RedlineOptions {
    pub author: Option<String>,
    pub generate_redlines: bool,
    pub target_paragraph_identity: Option<String>,
    pub validate_output: bool,
    pub validation_mode: ValidationMode,
}

impl RedlineOptions {
    pub fn new() -> Self {
        Self { generate_redlines: true, ..Default::default() }
    }
}

/// Result of reconciling one paragraph's proposed new content.
#[derive(Debug, Clone)]
pub struct RedlineOutcome {
    pub wml: String,
    pub has_changes: bool,
    pub warnings: Vec<String>,
    pub use_native_api: bool,
    pub format_hints: Option<Vec<FormatHint>>,
    pub surgical_changes: bool,
    pub is_format_only: bool,
    /// The numbering part, present when this outcome synthesized a list
    /// paragraph (structured-list-direct, block-html, or the single-line
    /// list fallback) and therefore needs a sibling `word/numbering.xml`
    /// merge (spec.md §4.6, §6 contract 2).
    pub numbering_xml: Option<String>,
}

/// Contract 1: `applyRedlineToParagraphFragment`. Routes the edit via
/// [`wml_route::plan_route`], dispatches to the matching flow, and — when
/// the diff/patch path yields no change and the content is a single
/// marker-prefixed line — falls back to synthesizing a one-item list
/// (spec.md §4.10).
#[tracing::instrument(skip(old_wml, old_text, new_content, numbering, sequence_state, ctx))]
#[allow(clippy::too_many_arguments)]
pub fn apply_redline_to_paragraph_fragment(
    old_wml: &str,
    old_text: &str,
    new_content: &str,
    opts: &RedlineOptions,
    numbering: &mut NumberingService,
    sequence_state: &mut ExplicitSequenceState,
    ctx: &mut ReconcileContext,
) -> Result<RedlineOutcome> {
    let plan = route_plan_route(old_text, new_content);

    let outcome = match plan.kind {
        wml_model::RouteKind::StructuredListDirect | wml_model::RouteKind::BlockHtml => {
            let original = if old_text.trim().is_empty() { None } else { Some(old_text) };
            let generated = structures_generate_list_fragment(&plan.normalized_content, numbering, original, ctx)?;
            RedlineOutcome {
                wml: generated.paragraphs_xml.join(""),
                has_changes: true,
                warnings: Vec::new(),
                use_native_api: false,
                format_hints: None,
                surgical_changes: false,
                is_format_only: false,
                numbering_xml: Some(generated.numbering_xml),
            }
        }
        wml_model::RouteKind::EmptyFormattedText => {
            let preprocessed = preprocess_inline(&plan.normalized_content);
            let runs = build_runs_from_preprocessed(&preprocessed.clean_text, &preprocessed.format_hints);
            let wml = build_single_insertion_paragraph(&runs, opts, ctx);
            RedlineOutcome {
                wml,
                has_changes: true,
                warnings: Vec::new(),
                use_native_api: false,
                format_hints: Some(preprocessed.format_hints),
                surgical_changes: false,
                is_format_only: false,
                numbering_xml: None,
            }
        }
        wml_model::RouteKind::EmptyHtml => {
            let run = build_plain_run(&plan.normalized_content);
            let wml = build_single_insertion_paragraph(&[run], opts, ctx);
            RedlineOutcome {
                wml,
                has_changes: true,
                warnings: Vec::new(),
                use_native_api: false,
                format_hints: None,
                surgical_changes: false,
                is_format_only: false,
                numbering_xml: None,
            }
        }
        wml_model::RouteKind::OoxmlEngine | wml_model::RouteKind::SingleLineListFallback => {
            let old_element = wml_xml::parse(old_wml)?;
            let reconciled = reconcile_paragraph_text(&old_element, &plan.normalized_content, ctx)?;

            if reconciled.has_changes {
                RedlineOutcome {
                    wml: reconciled.wml,
                    has_changes: true,
                    warnings: Vec::new(),
                    use_native_api: false,
                    format_hints: None,
                    surgical_changes: true,
                    is_format_only: reconciled.is_format_only,
                    numbering_xml: None,
                }
            } else if let Some(fallback) = try_single_line_list_fallback(
                &old_element,
                &plan.normalized_content,
                opts,
                numbering,
                sequence_state,
                ctx,
            )? {
                fallback
            } else {
                RedlineOutcome {
                    wml: reconciled.wml,
                    has_changes: false,
                    warnings: Vec::new(),
                    use_native_api: false,
                    format_hints: None,
                    surgical_changes: false,
                    is_format_only: reconciled.is_format_only,
                    numbering_xml: None,
                }
            }
        }
    };

    if should_validate(opts, &outcome) {
        validate_fragment(&outcome.wml)?;
    }

    Ok(outcome)
}

/// `validationMode` gate for spec.md §6 contract 1's `validateOutput`
/// option. `Auto` only bothers re-parsing output this call actually
/// produced fresh markup for — a no-change pass-through has nothing new to
/// validate.
fn should_validate(opts: &RedlineOptions, outcome: &RedlineOutcome) -> bool {
    if !opts.validate_output {
        return false;
    }
    match opts.validation_mode {
        ValidationMode::Never => false,
        ValidationMode::Always => true,
        ValidationMode::Auto => outcome.has_changes,
    }
}

/// spec.md §7 `validation-failed`: the output fragment must be well-formed
/// XML and contain at least one `<w:p>` element.
fn validate_fragment(wml: &str) -> Result<()> {
    let root = wml_xml::parse(wml).map_err(|e| RedlineError::ValidationFailed(e.to_string()))?;
    if !contains_paragraph(&root) {
        return Err(RedlineError::ValidationFailed("output fragment lacks a required paragraph element".to_string()));
    }
    Ok(())
}

fn contains_paragraph(element: &XmlElement) -> bool {
    if element.name.local == "p" {
        return true;
    }
    element.children.iter().any(|child| matches!(child, XmlNode::Element(e) if contains_paragraph(e)))
}

fn try_single_line_list_fallback(
    old_element: &XmlElement,
    normalized_content: &str,
    opts: &RedlineOptions,
    numbering: &mut NumberingService,
    sequence_state: &mut ExplicitSequenceState,
    ctx: &mut ReconcileContext,
) -> Result<Option<RedlineOutcome>> {
    let ingested = ingest_paragraph(old_element)?;
    let already_bound = ingested.numbering_context.is_some();
    let Some(candidate) = detect_single_line_list_fallback(normalized_content, already_bound) else {
        return Ok(None);
    };

    let key = opts.target_paragraph_identity.clone().unwrap_or_default();
    let decision = sequence_state.advance(&key, &candidate, numbering);

    let generated = structures_generate_list_fragment(normalized_content, numbering, None, ctx)?;
    let mut numbering_xml = generated.numbering_xml;
    if let Some(start_at) = decision.start_override {
        let mut parsed = wml_xml::parse(&numbering_xml)?;
        wml_numbering::apply_start_override(&mut parsed, decision.num_id, start_at)?;
        numbering_xml = serialize(&parsed)?;
    }

    Ok(Some(RedlineOutcome {
        wml: generated.paragraphs_xml.into_iter().next().unwrap_or_default(),
        has_changes: true,
        warnings: vec!["applied single-line list fallback".to_string()],
        use_native_api: false,
        format_hints: None,
        surgical_changes: false,
        is_format_only: false,
        numbering_xml: Some(numbering_xml),
    }))
}

fn build_single_insertion_paragraph(runs: &[XmlElement], opts: &RedlineOptions, ctx: &mut ReconcileContext) -> String {
    let id = ctx.next_revision_id();
    let author = opts.author.clone().unwrap_or_else(|| ctx.author().to_string());
    let date = ctx.now_rfc3339();

    let mut body = String::new();
    for run in runs {
        body.push_str(&serialize(run).unwrap_or_default());
    }
    format!(
        "<w:p><w:ins w:id=\"{id}\" w:author=\"{}\" w:date=\"{date}\">{body}</w:ins></w:p>",
        escape_attribute(&author)
    )
}

fn build_plain_run(text: &str) -> XmlElement {
    let mut t = XmlElement::new(QName::prefixed("w", "t"));
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t = t.with_attr(QName::prefixed("xml", "space"), "preserve");
    }
    t.children = vec![XmlNode::Text(text.to_string())];
    XmlElement::new(QName::prefixed("w", "r")).with_children(vec![XmlNode::Element(t)])
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Contract 2: `generateListFragment`.
pub struct ListFragmentOutcome {
    pub wml: String,
    pub numbering_xml: String,
    pub include_numbering: bool,
}

#[tracing::instrument(skip(markdown, numbering, ctx))]
pub fn generate_list_fragment(
    markdown: &str,
    numbering_context: Option<NumberingContext>,
    original_text: Option<&str>,
    numbering: &mut NumberingService,
    ctx: &mut ReconcileContext,
) -> Result<ListFragmentOutcome> {
    let _ = numbering_context;
    let generated = structures_generate_list_fragment(markdown, numbering, original_text, ctx)?;
    Ok(ListFragmentOutcome {
        wml: generated.paragraphs_xml.join(""),
        numbering_xml: generated.numbering_xml,
        include_numbering: true,
    })
}

/// Contract 3: `generateTableFragment`. Malformed input reports
/// `is_valid = false` rather than erroring (spec.md §7
/// `invalid-table-markdown` is a per-call, not whole-call, failure mode at
/// this contract).
pub struct TableFragmentOutcome {
    pub wml: String,
    pub is_valid: bool,
}

#[tracing::instrument(skip(markdown_table))]
pub fn generate_table_fragment(markdown_table: &str) -> Result<TableFragmentOutcome> {
    let lines: Vec<&str> = markdown_table.lines().collect();
    match generate_table_paragraph(&lines) {
        Ok((wml, _consumed)) => Ok(TableFragmentOutcome { wml, is_valid: true }),
        Err(wml_structures::Error::InvalidTableMarkdown(_)) => {
            Ok(TableFragmentOutcome { wml: String::new(), is_valid: false })
        }
        Err(other) => Err(other.into()),
    }
}

/// Contract 4: `injectCommentsIntoDocumentFragment`.
pub struct CommentInjectionOutcome {
    pub wml: String,
    pub comments_xml: String,
    pub comments_applied: usize,
    pub warnings: Vec<String>,
}

#[tracing::instrument(skip(doc_wml, requests, existing_ids, ctx))]
pub fn inject_comments_into_document_fragment(
    doc_wml: &str,
    requests: &[wml_comments::CommentRequest],
    existing_ids: &[u32],
    ctx: &mut ReconcileContext,
) -> Result<CommentInjectionOutcome> {
    let result = wml_comments::inject_comments_into_document(doc_wml, requests, existing_ids, ctx)?;
    let comments_xml = wml_comments::merge_comments_part(None, &result.comments)?;
    Ok(CommentInjectionOutcome {
        wml: result.wml,
        comments_xml,
        comments_applied: result.comments.len(),
        warnings: result.warnings,
    })
}

/// Contract 5: `resolveTargetParagraph`.
pub struct TargetResolution {
    pub paragraph_node_xml: String,
    pub resolved_by: ResolvedBy,
}

#[tracing::instrument(skip(doc_wml, target_text, snapshot))]
pub fn resolve_target_paragraph(
    doc_wml: &str,
    target_ref: Option<usize>,
    target_text: Option<&str>,
    snapshot: Option<&TargetSnapshot>,
) -> Result<TargetResolution> {
    let root = wml_xml::parse(doc_wml)?;
    let paragraphs = collect_paragraphs(&root);

    let mut texts = Vec::with_capacity(paragraphs.len());
    for p in &paragraphs {
        texts.push(ingest_paragraph(p)?.accepted_text);
    }

    let resolved = wml_route::resolve_target_paragraph(&texts, target_ref, target_text, snapshot)?;
    let paragraph_node_xml = serialize(&paragraphs[resolved.paragraph_index - 1])?;
    Ok(TargetResolution { paragraph_node_xml, resolved_by: resolved.resolved_by })
}

fn collect_paragraphs(root: &XmlElement) -> Vec<XmlElement> {
    fn walk(node: &XmlElement, out: &mut Vec<XmlElement>) {
        if node.name.local == "p" {
            out.push(node.clone());
            return;
        }
        for child in &node.children {
            if let XmlNode::Element(e) = child {
                walk(e, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

/// Contract 6: `planRoute`.
pub fn plan_route(old_text: &str, new_content: &str) -> RoutePlan {
    route_plan_route(old_text, new_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph_with_text(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    fn ctx() -> ReconcileContext {
        ReconcileContext::new("reviewer")
    }

    // spec.md §8 S3: mixed edit carries both an insertion and a deletion.
    #[test]
    fn mixed_edit_through_the_full_orchestrator() {
        let old_wml = paragraph_with_text("The quick brown fox jumps.");
        let mut numbering = NumberingService::new(0, 0);
        let mut sequence_state = ExplicitSequenceState::default();
        let mut ctx = ctx();
        let outcome = apply_redline_to_paragraph_fragment(
            &old_wml,
            "The quick brown fox jumps.",
            "The quick red fox hopped.",
            &RedlineOptions::new(),
            &mut numbering,
            &mut sequence_state,
            &mut ctx,
        )
        .unwrap();
        assert!(outcome.has_changes);
        assert!(outcome.wml.contains("<w:ins"));
        assert!(outcome.wml.contains("<w:del"));
        assert!(outcome.wml.contains("red"));
        assert!(outcome.wml.contains("brown"));
    }

    // spec.md §8: idempotence — feeding the output's accepted text back in
    // as old with the same new content reports no further changes.
    #[test]
    fn idempotent_reapplication_reports_no_changes() {
        let old_wml = paragraph_with_text("Same text here.");
        let mut numbering = NumberingService::new(0, 0);
        let mut sequence_state = ExplicitSequenceState::default();
        let mut ctx = ctx();
        let outcome = apply_redline_to_paragraph_fragment(
            &old_wml,
            "Same text here.",
            "Same text here.",
            &RedlineOptions::new(),
            &mut numbering,
            &mut sequence_state,
            &mut ctx,
        )
        .unwrap();
        assert!(!outcome.has_changes);
    }

    #[test]
    fn validation_auto_mode_passes_well_formed_output() {
        let old_wml = paragraph_with_text("old text");
        let mut numbering = NumberingService::new(0, 0);
        let mut sequence_state = ExplicitSequenceState::default();
        let mut ctx = ctx();
        let opts = RedlineOptions { validate_output: true, validation_mode: ValidationMode::Auto, ..RedlineOptions::new() };
        let outcome = apply_redline_to_paragraph_fragment(
            &old_wml,
            "old text",
            "new text",
            &opts,
            &mut numbering,
            &mut sequence_state,
            &mut ctx,
        )
        .unwrap();
        assert!(outcome.has_changes);
    }

    #[test]
    fn validation_rejects_fragment_without_a_paragraph_element() {
        let err = validate_fragment("<w:r><w:t>no paragraph wrapper</w:t></w:r>").unwrap_err();
        assert!(matches!(err, RedlineError::ValidationFailed(_)));
    }

    #[test]
    fn validation_never_mode_skips_even_with_validate_output_set() {
        assert!(!should_validate(
            &RedlineOptions { validate_output: true, validation_mode: ValidationMode::Never, ..RedlineOptions::new() },
            &RedlineOutcome {
                wml: "<w:r/>".to_string(),
                has_changes: true,
                warnings: Vec::new(),
                use_native_api: false,
                format_hints: None,
                surgical_changes: false,
                is_format_only: false,
                numbering_xml: None,
            }
        ));
    }

    // spec.md §8 S4: list generation shares one numbering id across all items.
    #[test]
    fn list_generation_shares_one_numbering_id() {
        let mut numbering = NumberingService::new(0, 0);
        let mut ctx = ctx();
        let outcome = generate_list_fragment(
            "- Alpha\n  - Beta\n- Gamma",
            None,
            Some("List seed"),
            &mut numbering,
            &mut ctx,
        )
        .unwrap();
        assert!(outcome.include_numbering);
        assert!(outcome.wml.contains("<w:del"));
        let num_id_count = outcome.wml.matches("w:numId").count();
        assert!(num_id_count >= 3);
    }

    // spec.md §8 S6: two comment requests produce two comment-range pairs
    // with unique identifiers.
    #[test]
    fn comment_injection_produces_unique_ids() {
        let doc = "<w:body><w:p><w:r><w:t>Paragraph with target_one and target_two.</w:t></w:r></w:p>\
                    <w:p><w:r><w:t>Second paragraph target_three.</w:t></w:r></w:p></w:body>";
        let requests = vec![
            wml_comments::CommentRequest::new(1, "target_one", "First", "reviewer"),
            wml_comments::CommentRequest::new(2, "target_three", "Second", "reviewer"),
        ];
        let mut ctx = ctx();
        let outcome = inject_comments_into_document_fragment(doc, &requests, &[], &mut ctx).unwrap();
        assert_eq!(outcome.comments_applied, 2);
        assert!(outcome.comments_xml.matches("<w:comment ").count() == 2);
    }

    #[test]
    fn invalid_table_markdown_reports_is_valid_false_not_an_error() {
        let outcome = generate_table_fragment("not a table at all").unwrap();
        assert!(!outcome.is_valid);
    }
}
