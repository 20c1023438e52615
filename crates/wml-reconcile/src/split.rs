//! Run Splitter & Patcher (spec.md §4.4): splits runs at diff boundaries and
//! rewrites the Run Model into tracked-change form, or — when the diff found
//! no textual edits — into run-property-change markers only.

use wml_model::{DiffKind, DiffOp, FormatHint, RunEntry, RunKind, RunModel};

use crate::context::ReconcileContext;
use crate::error::Result;
use crate::format::{flags_from_rpr, rpr_xml_with_flags};

/// Split every text-bearing entry that straddles one of `boundaries`
/// (accepted-text offsets) into two entries with identical properties.
/// Offsets are recomputed afterward so callers always see a consistent
/// model (spec.md §4.4 "Splitting").
pub fn split_at_boundaries(model: &mut RunModel, boundaries: &[usize]) {
    let mut sorted_boundaries: Vec<usize> = boundaries.to_vec();
    sorted_boundaries.sort_unstable();
    sorted_boundaries.dedup();

    let mut rebuilt: Vec<RunEntry> = Vec::with_capacity(model.entries.len());
    for entry in model.entries.drain(..) {
        if !entry.kind.is_text_bearing() {
            rebuilt.push(entry);
            continue;
        }
        let relevant: Vec<usize> = sorted_boundaries
            .iter()
            .copied()
            .filter(|&b| b > entry.start_offset && b < entry.end_offset)
            .collect();
        if relevant.is_empty() {
            rebuilt.push(entry);
            continue;
        }

        let text = entry.text.clone().unwrap_or_default();
        let mut cursor = entry.start_offset;
        let mut remaining = text.as_str();
        for boundary in relevant {
            let cut = boundary - cursor;
            let (left, right) = remaining.split_at(cut);
            rebuilt.push(make_like(&entry, left));
            remaining = right;
            cursor = boundary;
        }
        rebuilt.push(make_like(&entry, remaining));
    }

    model.entries = rebuilt;
    model.recompute_offsets();
}

fn make_like(template: &RunEntry, text: &str) -> RunEntry {
    let mut clone = template.clone();
    clone.text = Some(text.to_string());
    clone
}

/// Outcome of patching a Run Model against a diff.
pub struct PatchOutcome {
    pub model: RunModel,
    pub is_format_only: bool,
}

/// Apply a diff (and, when it is a no-op, format hints) to `model`,
/// producing tracked-change entries (spec.md §4.4).
#[tracing::instrument(skip(model, diff_ops, format_hints, ctx))]
pub fn patch(
    mut model: RunModel,
    diff_ops: &[DiffOp],
    format_hints: &[FormatHint],
    ctx: &mut ReconcileContext,
) -> Result<PatchOutcome> {
    let has_text_edits = diff_ops.iter().any(|op| op.kind != DiffKind::Equal);

    if !has_text_edits {
        if format_hints.is_empty() {
            return Ok(PatchOutcome { model, is_format_only: false });
        }
        let touched = apply_format_only(&mut model, format_hints, ctx);
        return Ok(PatchOutcome { model, is_format_only: touched });
    }

    let boundaries: Vec<usize> = diff_ops
        .iter()
        .flat_map(|op| [op.old_start, op.old_end])
        .collect();
    split_at_boundaries(&mut model, &boundaries);

    let author = ctx.author().to_string();
    let mut out = RunModel::new();
    out.paragraph_properties_xml = model.paragraph_properties_xml.clone();

    let mut entry_idx = 0usize;
    let mut cursor = 0usize;

    for op in diff_ops {
        flush_opaque_at_cursor(&model, &mut entry_idx, cursor, &mut out);

        match op.kind {
            DiffKind::Insert => {
                let inherited = inherited_properties(&out, &model, entry_idx);
                out.push(RunEntry::insertion(op.text.clone(), inherited, author.clone()));
            }
            DiffKind::Equal | DiffKind::Delete => {
                loop {
                    flush_opaque_at_cursor(&model, &mut entry_idx, cursor, &mut out);
                    if entry_idx >= model.entries.len()
                        || !model.entries[entry_idx].kind.is_text_bearing()
                        || model.entries[entry_idx].start_offset >= op.old_end
                    {
                        break;
                    }
                    let entry = model.entries[entry_idx].clone();
                    cursor = entry.end_offset;
                    if op.kind == DiffKind::Delete {
                        out.push(RunEntry::deletion(
                            entry.text.unwrap_or_default(),
                            entry.run_properties_xml,
                            author.clone(),
                        ));
                    } else {
                        out.push(entry);
                    }
                    entry_idx += 1;
                }
            }
        }
    }

    flush_opaque_at_cursor(&model, &mut entry_idx, cursor, &mut out);
    while entry_idx < model.entries.len() {
        out.push(model.entries[entry_idx].clone());
        entry_idx += 1;
    }

    out.recompute_offsets();
    Ok(PatchOutcome { model: out, is_format_only: false })
}

fn flush_opaque_at_cursor(model: &RunModel, entry_idx: &mut usize, cursor: usize, out: &mut RunModel) {
    while *entry_idx < model.entries.len() {
        let entry = &model.entries[*entry_idx];
        if entry.kind.is_text_bearing() || entry.start_offset != cursor {
            break;
        }
        out.push(entry.clone());
        *entry_idx += 1;
    }
}

/// Run-properties inherited by a new insertion: the entry immediately to
/// the left in the output so far, falling back to the next entry still to
/// be consumed from the source model (spec.md §4.4 "insert").
fn inherited_properties(out: &RunModel, model: &RunModel, next_source_idx: usize) -> Option<String> {
    out.entries
        .iter()
        .rev()
        .find(|e| e.kind.is_text_bearing())
        .and_then(|e| e.run_properties_xml.clone())
        .or_else(|| {
            model.entries[next_source_idx..]
                .iter()
                .find(|e| e.kind.is_text_bearing())
                .and_then(|e| e.run_properties_xml.clone())
        })
}

/// Format-only detection (spec.md §4.4): no insert/delete ops, but format
/// hints intersect existing runs. Emits `format_change` markers rather than
/// insert/delete, including the surgical-format-removal case where a hint's
/// flags are a strict subset of a run's current flags.
fn apply_format_only(model: &mut RunModel, format_hints: &[FormatHint], ctx: &mut ReconcileContext) -> bool {
    let mut touched_any = false;
    let author = ctx.author().to_string();
    let date = ctx.now_rfc3339();

    for entry in model.entries.iter_mut() {
        if entry.kind != RunKind::Text {
            continue;
        }
        let intersecting: Vec<&FormatHint> = format_hints
            .iter()
            .filter(|h| h.intersects_range(entry.start_offset, entry.end_offset))
            .collect();
        if intersecting.is_empty() {
            continue;
        }

        let mut target_flags = wml_model::FormatFlags::default();
        for hint in &intersecting {
            target_flags = target_flags.union(hint.flags);
        }

        let current_flags = flags_from_rpr(entry.run_properties_xml.as_deref());
        if current_flags == target_flags {
            continue;
        }

        let original_properties_xml = entry.run_properties_xml.clone().unwrap_or_default();
        entry.run_properties_xml = Some(rpr_xml_with_flags(entry.run_properties_xml.as_deref(), target_flags));
        entry.format_change = Some(wml_model::PropertyChange {
            original_properties_xml,
            author: author.clone(),
            date: date.clone(),
        });
        touched_any = true;
    }

    touched_any
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wml_model::FormatFlags;

    fn context() -> ReconcileContext {
        use crate::clock::FixedClock;
        use chrono::{TimeZone, Utc};
        ReconcileContext::new("reviewer")
            .with_clock(Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())))
    }

    #[test]
    fn splits_entry_straddling_single_boundary() {
        let mut model = RunModel::new();
        model.push(RunEntry::text("hello world", None));
        model.recompute_offsets();
        split_at_boundaries(&mut model, &[5]);
        assert_eq!(model.entries.len(), 2);
        assert_eq!(model.entries[0].text.as_deref(), Some("hello"));
        assert_eq!(model.entries[1].text.as_deref(), Some(" world"));
    }

    #[test]
    fn patch_converts_deleted_range_to_deletion_entry() {
        let mut model = RunModel::new();
        model.push(RunEntry::text("hello world", None));
        model.recompute_offsets();
        let ops = vec![DiffOp::equal(0, 6, 0, 6, "hello "), DiffOp::delete(6, 11, "world")];
        let mut ctx = context();
        let outcome = patch(model, &ops, &[], &mut ctx).unwrap();
        assert!(!outcome.is_format_only);
        assert!(outcome.model.entries.iter().any(|e| e.kind == RunKind::Deletion));
    }

    #[test]
    fn patch_emits_insertion_with_inherited_properties() {
        let mut model = RunModel::new();
        model.push(RunEntry::text("hello", Some("<w:rPr/>".to_string())));
        model.recompute_offsets();
        let ops = vec![DiffOp::equal(0, 5, 0, 5, "hello"), DiffOp::insert(5, 11, " there")];
        let mut ctx = context();
        let outcome = patch(model, &ops, &[], &mut ctx).unwrap();
        let insertion = outcome.model.entries.iter().find(|e| e.kind == RunKind::Insertion).unwrap();
        assert_eq!(insertion.text.as_deref(), Some(" there"));
        assert_eq!(insertion.run_properties_xml.as_deref(), Some("<w:rPr/>"));
    }

    #[test]
    fn format_only_path_emits_property_change_without_text_edits() {
        let mut model = RunModel::new();
        model.push(RunEntry::text("word", None));
        model.recompute_offsets();
        let ops = vec![DiffOp::equal(0, 4, 0, 4, "word")];
        let hints = vec![FormatHint::new(0, 4, FormatFlags { bold: true, ..Default::default() })];
        let mut ctx = context();
        let outcome = patch(model, &ops, &hints, &mut ctx).unwrap();
        assert!(outcome.is_format_only);
        assert!(outcome.model.entries[0].format_change.is_some());
    }

    #[test]
    fn surgical_removal_clears_flag_no_longer_present() {
        let base_rpr = rpr_xml_with_flags(None, FormatFlags { bold: true, italic: true, ..Default::default() });
        let mut model = RunModel::new();
        model.push(RunEntry::text("word", Some(base_rpr)));
        model.recompute_offsets();
        let ops = vec![DiffOp::equal(0, 4, 0, 4, "word")];
        let hints = vec![FormatHint::new(0, 4, FormatFlags { bold: true, ..Default::default() })];
        let mut ctx = context();
        let outcome = patch(model, &ops, &hints, &mut ctx).unwrap();
        let entry = &outcome.model.entries[0];
        assert!(entry.format_change.is_some());
        assert!(!flags_from_rpr(entry.run_properties_xml.as_deref()).italic);
        assert!(flags_from_rpr(entry.run_properties_xml.as_deref()).bold);
    }
}
