use std::collections::HashMap;

use super::boxes::{total_height, BoxKind, BoxNode, HeightOracle};
use super::render::{contains_nested_table, normalize_table};
use super::Page;

/// One reflow pass: measure pages front to back, split the first overflowing
/// body found, splice the continuation page in, and report whether the page
/// list changed. The caller restarts the pass from the first page after
/// every structural change so header/footer/footnote state stays consistent;
/// a false return is the fixed point.
pub(super) fn reflow_pass(pages: &mut Vec<Page>, oracle: &dyn HeightOracle) -> bool {
    for index in 0..pages.len() {
        let page = &pages[index];
        // A page relaxed to min-height grows with its oversize content.
        if page.min_height_relaxed || page.bodies.is_empty() {
            continue;
        }

        let available = available_height(page, oracle);
        let body_height = oracle.metrics(&page.bodies[0]).height;
        if body_height <= available {
            continue;
        }

        log::debug!(
            "page {} overflows: body={body_height:.2} available={available:.2}",
            page.index
        );

        if split_page(pages, index, available, oracle) {
            for (n, page) in pages.iter_mut().enumerate() {
                page.index = n;
            }
            return true;
        }
        // No split possible: the page stays oversized rather than looping.
    }
    false
}

/// Height left for the first body region once margins and every other
/// region on the page have taken their share.
fn available_height(page: &Page, oracle: &dyn HeightOracle) -> f32 {
    let props = &page.props;
    let mut other = 0.0f32;
    for region in [&page.header, &page.footnotes, &page.endnotes, &page.footer]
        .into_iter()
        .flatten()
    {
        other += total_height(oracle, region);
    }
    for body in page.bodies.iter().skip(1) {
        other += total_height(oracle, body);
    }
    props.page_size.height - props.margins.top - props.margins.bottom - other
}

struct TableSplitPlan {
    acc: f32,
    /// Table child index rows move from; 0 means the whole table stays.
    boundary: usize,
    oversize: bool,
}

/// Walk the table's direct children (skipping the column-definition box),
/// accumulating row heights against the remaining budget. A row taller than
/// the entire available height, or a first row on an otherwise empty page,
/// is force-kept with the boundary just after it.
fn plan_table_split(
    table: &BoxNode,
    acc_before: f32,
    available: f32,
    oracle: &dyn HeightOracle,
) -> TableSplitPlan {
    let mut acc = acc_before;
    let mut kept_row = false;

    for (i, child) in table.children.iter().enumerate() {
        if child.is_column_group() {
            continue;
        }
        let row_height = total_height(oracle, child);
        acc += row_height;
        if acc >= available {
            let force_keep = row_height > available || (!kept_row && acc_before <= 0.0);
            return TableSplitPlan {
                acc,
                boundary: if force_keep { i + 1 } else { i },
                oversize: force_keep,
            };
        }
        kept_row = true;
    }

    TableSplitPlan {
        acc,
        boundary: 0,
        oversize: false,
    }
}

/// Move rows at/after `boundary` into a new table that copies the original's
/// attributes and column definitions, repairing vertical merges that cross
/// the cut.
fn split_table(table: &mut BoxNode, boundary: usize) -> BoxNode {
    repair_vertical_merges(table, boundary);

    let moved_rows: Vec<BoxNode> = table.children.drain(boundary..).collect();

    let mut new_table = table.clone_shallow();
    if let Some(colgroup) = table.children.iter().find(|c| c.is_column_group()) {
        new_table.children.push(colgroup.clone());
    }
    new_table.children.extend(moved_rows);

    if contains_nested_table(table) {
        normalize_table(table, 0);
    }
    if contains_nested_table(&new_table) {
        normalize_table(&mut new_table, 0);
    }
    new_table
}

struct MergeSpan {
    start_col: usize,
    col_span: usize,
    owner_row: usize,
    owner_cell: usize,
    end_row: usize, // exclusive, in row order
}

fn covered(spans: &[MergeSpan], row: usize, col: usize) -> bool {
    spans.iter().any(|s| {
        s.owner_row < row && s.end_row > row && s.start_col <= col && col < s.start_col + s.col_span
    })
}

/// Clamp restart cells whose merge run crosses the split boundary to the
/// rows that stay, and insert a continuation cell with the remaining span at
/// the matching grid position in the first moved row. Keeps every column's
/// row-span sum equal to its merge run length on both sides of the cut.
fn repair_vertical_merges(table: &mut BoxNode, boundary: usize) {
    let row_idxs: Vec<usize> = table
        .children
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c.kind, BoxKind::Row))
        .map(|(i, _)| i)
        .collect();
    let boundary_row = row_idxs.iter().filter(|&&i| i < boundary).count();
    if boundary_row == 0 || boundary_row >= row_idxs.len() {
        return;
    }

    // Grid walk: assign each cell a start column, tracking open spans.
    let mut spans: Vec<MergeSpan> = Vec::new();
    let mut cell_cols: HashMap<(usize, usize), usize> = HashMap::new();
    for (r, &row_child) in row_idxs.iter().enumerate() {
        let mut col = 0usize;
        for (ci, cell) in table.children[row_child].children.iter().enumerate() {
            while covered(&spans, r, col) {
                col += 1;
            }
            let (col_span, row_span) = match cell.kind {
                BoxKind::Cell {
                    col_span, row_span, ..
                } => (col_span.max(1) as usize, row_span as usize),
                _ => (1, 1),
            };
            cell_cols.insert((r, ci), col);
            if row_span > 1 {
                spans.push(MergeSpan {
                    start_col: col,
                    col_span,
                    owner_row: r,
                    owner_cell: ci,
                    end_row: r + row_span,
                });
            }
            col += col_span;
        }
    }

    let mut inserts: Vec<(usize, BoxNode)> = Vec::new();
    for span in spans
        .iter()
        .filter(|s| s.owner_row < boundary_row && s.end_row > boundary_row)
    {
        let kept = (boundary_row - span.owner_row) as u32;
        let moved = (span.end_row - boundary_row) as u32;

        let owner = &mut table.children[row_idxs[span.owner_row]].children[span.owner_cell];
        let borders = match &mut owner.kind {
            BoxKind::Cell {
                row_span, borders, ..
            } => {
                *row_span = kept;
                *borders
            }
            _ => true,
        };

        inserts.push((
            span.start_col,
            BoxNode::new(BoxKind::Cell {
                col_span: span.col_span as u16,
                row_span: moved,
                borders,
            }),
        ));
    }

    // Insert right-to-left so earlier positions stay valid.
    inserts.sort_by(|a, b| b.0.cmp(&a.0));
    let first_moved = row_idxs[boundary_row];
    for (start_col, cell) in inserts {
        let row = &mut table.children[first_moved];
        let position = (0..row.children.len())
            .find(|&ci| cell_cols.get(&(boundary_row, ci)).copied().unwrap_or(0) > start_col)
            .unwrap_or(row.children.len());
        row.children.insert(position, cell);
    }
}

/// Locate the split boundary for page `index`, partition its first body, and
/// splice a continuation page (with cloned, height-pinned header/footer)
/// right after it. Returns false when nothing can move.
fn split_page(
    pages: &mut Vec<Page>,
    index: usize,
    available: f32,
    oracle: &dyn HeightOracle,
) -> bool {
    let body = &pages[index].bodies[0];

    let mut acc = 0.0f32;
    let mut boundary = 0usize;
    let mut oversize = false;
    let mut table_plan: Option<(usize, usize)> = None;

    for (i, child) in body.children.iter().enumerate() {
        if child.is_table() {
            let plan = plan_table_split(child, acc, available, oracle);
            acc = plan.acc;
            oversize |= plan.oversize;
            if plan.boundary > 0 && plan.boundary < child.children.len() {
                table_plan = Some((i, plan.boundary));
            }
            if acc >= available {
                boundary = i + 1;
                break;
            }
        } else {
            let child_height = total_height(oracle, child);
            acc += child_height;
            if child_height > available {
                // Oversize element: force it onto this page whole.
                oversize = true;
                boundary = i + 1;
                break;
            }
            if acc >= available {
                boundary = i;
                break;
            }
        }
    }

    if boundary == 0 && table_plan.is_none() {
        return false;
    }

    let body = &mut pages[index].bodies[0];
    let keep_until = if boundary == 0 {
        body.children.len()
    } else {
        boundary
    };
    let mut moved: Vec<BoxNode> = body.children.split_off(keep_until.min(body.children.len()));

    if let Some((table_idx, table_boundary)) = table_plan {
        let new_table = split_table(&mut body.children[table_idx], table_boundary);
        moved.insert(0, new_table);
    }

    if moved.is_empty() {
        return false;
    }

    let source = &pages[index];
    let continuation = Page {
        index: source.index + 1,
        props: source.props.clone(),
        header: source.header.as_ref().map(|h| pin_height(h, oracle)),
        bodies: vec![BoxNode::with_children(
            source.bodies[0].kind.clone(),
            moved,
        )],
        footnotes: None,
        endnotes: None,
        footer: source.footer.as_ref().map(|f| pin_height(f, oracle)),
        min_height_relaxed: false,
    };

    if oversize {
        pages[index].min_height_relaxed = true;
    }
    pages.insert(index + 1, continuation);

    // A split can leave either side with no visible content (a break right
    // at a region edge); such remainders are artifacts, not pages.
    if is_blank_artifact(&pages[index + 1]) {
        pages.remove(index + 1);
    } else if is_blank_artifact(&pages[index]) {
        pages.remove(index);
    }
    true
}

/// Deep-clone a header/footer and pin its minimum height to the measured
/// height of the original, so the repeated region renders identically.
fn pin_height(region: &BoxNode, oracle: &dyn HeightOracle) -> BoxNode {
    let measured = oracle.metrics(region).height;
    let mut clone = region.clone();
    match &mut clone.kind {
        BoxKind::Header { min_height } | BoxKind::Footer { min_height } => {
            *min_height = Some(measured);
        }
        _ => {}
    }
    clone
}

/// A page whose body is at most a single paragraph with no visible text and
/// no table content.
fn is_blank_artifact(page: &Page) -> bool {
    let Some(body) = page.bodies.first() else {
        return false;
    };
    if page.bodies.len() > 1 || body.children.len() > 1 {
        return false;
    }
    match body.children.first() {
        None => true,
        Some(child) => {
            let mut has_table = false;
            child.visit(&mut |node| has_table |= node.is_table());
            !has_table && child.text_content().trim().is_empty()
        }
    }
}
