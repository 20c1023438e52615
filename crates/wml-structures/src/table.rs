//! Table Virtual Grid & Reconciler (spec.md §4.8): ingest an existing
//! `<w:tbl>` into a row/column grid honoring spans and merges, generate a
//! `<w:tbl>` fragment from a Markdown table, and diff one against the other
//! into a minimal set of row/cell operations.

use similar::{capture_diff_slices, Algorithm};
use wml_markdown::{classify_line, preprocess_inline, LineKind};
use wml_model::{GridCell, RunModel, VirtualGrid};
use wml_reconcile::{build_runs_from_preprocessed, reconcile_paragraph_text, ReconcileContext};
use wml_xml::{serialize, QName, XmlElement, XmlNode};

use crate::error::{Error, Result};

/// Percent-unit denominator OOXML uses for `w:type="pct"` widths: 100% is
/// represented as 5000 fiftieths-of-a-percent.
const FULL_WIDTH_PCT: u32 = 5000;

/// One edit to an existing table.
#[derive(Debug, Clone)]
pub enum TableOp {
    RowInsert { at: usize, row_xml: String },
    RowDelete { at: usize },
    CellModify { row: usize, col: usize, paragraph_xml: String },
}

/// Ingest an existing `<w:tbl>` element into a [`VirtualGrid`], resolving
/// `gridSpan`/`vMerge` into spans and merge-origin/continuation cells
/// (spec.md §3 grid invariant).
#[tracing::instrument(skip(table))]
pub fn ingest_table_grid(table: &XmlElement) -> Result<VirtualGrid> {
    let rows: Vec<&XmlElement> = table.children_named("tr").collect();
    let mut cells: Vec<GridCell> = Vec::new();
    // occupancy[row][col] indexes into `cells` once a cell has been placed there.
    let mut occupancy: Vec<Vec<Option<usize>>> = Vec::new();
    let mut max_cols = 0usize;

    for (row_idx, row) in rows.iter().enumerate() {
        occupancy.push(Vec::new());
        let mut col = 0usize;
        for tc in row.children_named("tc") {
            while occupancy[row_idx].len() <= col {
                occupancy[row_idx].push(None);
            }
            while occupancy[row_idx][col].is_some() {
                col += 1;
                while occupancy[row_idx].len() <= col {
                    occupancy[row_idx].push(None);
                }
            }

            let tc_pr = tc.first_child_named("tcPr");
            let span = tc_pr
                .and_then(|pr| pr.first_child_named("gridSpan"))
                .and_then(|e| e.get_attribute("val"))
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(1);
            let v_merge = tc_pr.and_then(|pr| pr.first_child_named("vMerge"));
            let is_continuation = v_merge
                .map(|e| e.get_attribute("val").map(|v| v != "restart").unwrap_or(true))
                .unwrap_or(false);

            if is_continuation && row_idx > 0 {
                if let Some(Some(origin_idx)) = occupancy[row_idx - 1].get(col).copied() {
                    let origin = cells[origin_idx].clone();
                    cells.push(GridCell::continuation(origin.grid_row, origin.grid_col));
                    let new_idx = cells.len() - 1;
                    for c in col..col + span {
                        while occupancy[row_idx].len() <= c {
                            occupancy[row_idx].push(None);
                        }
                        occupancy[row_idx][c] = Some(new_idx);
                    }
                    if let Some(origin_mut) = cells.get_mut(origin_idx) {
                        origin_mut.row_span += 1;
                    }
                    col += span;
                    max_cols = max_cols.max(col);
                    continue;
                }
            }

            let mut blocks = Vec::new();
            for p in tc.children_named("p") {
                let ingested = wml_reconcile::ingest_paragraph(p)?;
                blocks.push(ingested.run_model);
            }
            let mut cell = GridCell::origin(row_idx, col, 1, span);
            cell.blocks = blocks;
            cell.cell_properties_xml = tc_pr.map(|pr| serialize(pr)).transpose()?;
            cells.push(cell);
            let new_idx = cells.len() - 1;
            for c in col..col + span {
                while occupancy[row_idx].len() <= c {
                    occupancy[row_idx].push(None);
                }
                occupancy[row_idx][c] = Some(new_idx);
            }
            col += span;
            max_cols = max_cols.max(col);
        }
    }

    Ok(VirtualGrid { rows: rows.len(), cols: max_cols, cells })
}

/// Generate a `<w:tbl>...</w:tbl>` fragment from Markdown table lines
/// starting at `lines[0]` (a header row immediately followed by a separator
/// row). Returns the rendered XML and the number of lines consumed.
#[tracing::instrument(skip(lines))]
pub fn generate_table_paragraph(lines: &[&str]) -> Result<(String, usize)> {
    let header = match classify_line(lines.first().copied().unwrap_or_default()) {
        LineKind::TableRow { cells } => cells,
        _ => return Err(Error::InvalidTableMarkdown("expected a header row".into())),
    };
    if lines.len() < 2 || !matches!(classify_line(lines[1]), LineKind::TableSeparator) {
        return Err(Error::InvalidTableMarkdown("header row is not followed by a separator row".into()));
    }

    let mut body_rows = Vec::new();
    let mut consumed = 2;
    while consumed < lines.len() {
        match classify_line(lines[consumed]) {
            LineKind::TableRow { cells } => {
                body_rows.push(cells);
                consumed += 1;
            }
            _ => break,
        }
    }

    Ok((build_table_xml(&header, &body_rows), consumed))
}

fn build_table_xml(header: &[String], rows: &[Vec<String>]) -> String {
    let ncols = header.len().max(1);
    let col_width = FULL_WIDTH_PCT / ncols as u32;

    let mut out = String::from("<w:tbl>");
    out.push_str("<w:tblPr><w:tblStyle w:val=\"TableGrid\"/><w:tblW w:w=\"5000\" w:type=\"pct\"/></w:tblPr>");
    out.push_str("<w:tblGrid>");
    for _ in 0..ncols {
        out.push_str(&format!("<w:gridCol w:w=\"{col_width}\"/>"));
    }
    out.push_str("</w:tblGrid>");
    out.push_str(&build_row_xml(header, col_width, true));
    for row in rows {
        out.push_str(&build_row_xml(row, col_width, false));
    }
    out.push_str("</w:tbl>");
    out
}

fn build_row_xml(cells: &[String], col_width: u32, is_header: bool) -> String {
    let mut out = String::from("<w:tr>");
    for text in cells {
        out.push_str(&build_cell_xml(text, col_width, is_header));
    }
    out.push_str("</w:tr>");
    out
}

fn build_cell_xml(text: &str, col_width: u32, is_header: bool) -> String {
    let preprocessed = preprocess_inline(text);
    let mut runs = build_runs_from_preprocessed(&preprocessed.clean_text, &preprocessed.format_hints);
    if is_header {
        runs = runs.into_iter().map(force_bold).collect();
    }
    let mut paragraph = String::from("<w:p>");
    for run in &runs {
        paragraph.push_str(&serialize(run).unwrap_or_default());
    }
    paragraph.push_str("</w:p>");

    format!("<w:tc><w:tcPr><w:tcW w:w=\"{col_width}\" w:type=\"pct\"/></w:tcPr>{paragraph}</w:tc>")
}

fn force_bold(mut run: XmlElement) -> XmlElement {
    match run.children.iter_mut().find(|c| matches!(c, XmlNode::Element(e) if e.name.local == "rPr")) {
        Some(XmlNode::Element(rpr)) => {
            if rpr.first_child_named("b").is_none() {
                rpr.children.push(XmlNode::Element(XmlElement::new(QName::prefixed("w", "b"))));
            }
        }
        _ => {
            let rpr = XmlElement::new(QName::prefixed("w", "rPr"))
                .with_children(vec![XmlNode::Element(XmlElement::new(QName::prefixed("w", "b")))]);
            run.children.insert(0, XmlNode::Element(rpr));
        }
    }
    run
}

/// Diff an ingested grid against freshly parsed Markdown rows, producing the
/// minimal set of row/cell operations needed to bring the grid up to date
/// (spec.md §4.8: "`{row_insert, row_delete, cell_modify}`").
#[tracing::instrument(skip(old_grid, new_rows, ctx))]
pub fn reconcile_table(old_grid: &VirtualGrid, header: &[String], new_rows: &[Vec<String>], ctx: &mut ReconcileContext) -> Result<Vec<TableOp>> {
    let old_body_rows: Vec<Vec<&GridCell>> = (1..old_grid.rows)
        .map(|r| {
            let mut row: Vec<&GridCell> = old_grid
                .cells
                .iter()
                .filter(|c| c.grid_row == r && !c.is_merge_continuation)
                .collect();
            row.sort_by_key(|c| c.grid_col);
            row
        })
        .collect();

    let old_signatures: Vec<String> = old_body_rows.iter().map(|row| row_signature(row)).collect();
    let new_signatures: Vec<String> = new_rows.iter().map(|row| row.join("\u{1f}")).collect();

    let col_width = FULL_WIDTH_PCT / header.len().max(1) as u32;
    let raw_ops = capture_diff_slices(Algorithm::Myers, &old_signatures, &new_signatures);

    let mut ops = Vec::new();
    for raw in raw_ops {
        match raw {
            similar::DiffOp::Equal { old_index, new_index, len } => {
                for i in 0..len {
                    let old_row = &old_body_rows[old_index + i];
                    let new_row = &new_rows[new_index + i];
                    for (col, cell_text) in new_row.iter().enumerate() {
                        let Some(old_cell) = old_row.get(col) else { continue };
                        let old_text = old_cell.logical_text();
                        if &old_text == cell_text {
                            continue;
                        }
                        let fragment = paragraph_fragment_for_cell(old_cell);
                        let reconciled = reconcile_paragraph_text(&fragment, cell_text, ctx)?;
                        ops.push(TableOp::CellModify { row: old_index + i, col, paragraph_xml: reconciled.wml });
                    }
                }
            }
            similar::DiffOp::Delete { old_index, old_len, .. } => {
                for i in 0..old_len {
                    ops.push(TableOp::RowDelete { at: old_index + i });
                }
            }
            similar::DiffOp::Insert { new_index, new_len, .. } => {
                for i in 0..new_len {
                    let row_xml = build_row_xml(&new_rows[new_index + i], col_width, false);
                    ops.push(TableOp::RowInsert { at: new_index + i, row_xml });
                }
            }
            similar::DiffOp::Replace { old_index, old_len, new_index, new_len } => {
                for i in 0..old_len {
                    ops.push(TableOp::RowDelete { at: old_index + i });
                }
                for i in 0..new_len {
                    let row_xml = build_row_xml(&new_rows[new_index + i], col_width, false);
                    ops.push(TableOp::RowInsert { at: new_index + i, row_xml });
                }
            }
        }
    }

    Ok(ops)
}

fn row_signature(row: &[&GridCell]) -> String {
    row.iter().map(|c| c.logical_text()).collect::<Vec<_>>().join("\u{1f}")
}

fn paragraph_fragment_for_cell(cell: &GridCell) -> XmlElement {
    let text = cell.blocks.first().map(RunModel::accepted_text).unwrap_or_default();
    let mut run = XmlElement::new(QName::prefixed("w", "r"));
    run.children.push(XmlNode::Element(
        XmlElement::new(QName::prefixed("w", "t")).with_children(vec![XmlNode::Text(text)]),
    ));
    XmlElement::new(QName::prefixed("w", "p")).with_children(vec![XmlNode::Element(run)])
}
