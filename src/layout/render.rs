use std::collections::HashMap;
use std::rc::Rc;

use crate::model::{
    Block, BreakKind, Document, HeaderFooterKind, HeaderFooterRef, NoteKind, Paragraph, RunChild,
    SectionProperties, Table,
};

use super::boxes::{BoxKind, BoxNode};
use super::notes::render_note_list;
use super::section::LogicalSection;
use super::{LayoutOptions, Page};

#[derive(Clone, Copy, Default)]
struct CellCursor {
    col: usize,
}

/// Mutable rendering state scoped to one materialization pass. The
/// vertical-merge map and cell cursor are stacks pushed/popped around table
/// nesting; note id lists drive reference numbering.
#[derive(Default)]
pub(super) struct LayoutContext {
    merge_stack: Vec<HashMap<usize, (usize, usize)>>,
    cursor_stack: Vec<CellCursor>,
    pub(super) footnote_ids: Vec<String>,
    pub(super) endnote_ids: Vec<String>,
}

pub(super) fn render_blocks(
    blocks: &[Block],
    ctx: &mut LayoutContext,
    opts: &LayoutOptions,
) -> Vec<BoxNode> {
    blocks
        .iter()
        .map(|block| match block {
            Block::Paragraph(para) => render_paragraph(para, ctx, opts),
            Block::Table(table) => render_table(table, ctx, opts),
        })
        .collect()
}

fn render_paragraph(para: &Paragraph, ctx: &mut LayoutContext, opts: &LayoutOptions) -> BoxNode {
    let mut children = Vec::new();

    for run in &para.runs {
        for child in &run.children {
            match child {
                RunChild::Text(text) => {
                    children.push(BoxNode::new(BoxKind::Text(text.clone())));
                }
                RunChild::Break(BreakKind::TextWrapping) => {
                    children.push(BoxNode::new(BoxKind::LineBreak));
                }
                // Hard breaks were consumed by the section splitter; any
                // survivor occupies no space.
                RunChild::Break(_) => {}
                RunChild::NoteReference { kind, id } => {
                    let number = match kind {
                        NoteKind::Footnote => {
                            ctx.footnote_ids.push(id.clone());
                            ctx.footnote_ids.len() as u32
                        }
                        NoteKind::Endnote => {
                            ctx.endnote_ids.push(id.clone());
                            ctx.endnote_ids.len() as u32
                        }
                    };
                    children.push(BoxNode::new(BoxKind::NoteRef {
                        kind: *kind,
                        id: id.clone(),
                        number,
                    }));
                }
                RunChild::Unknown(name) => {
                    if opts.debug {
                        log::debug!("skipping unknown run child: {name}");
                    }
                }
            }
        }
    }

    BoxNode::with_children(BoxKind::Paragraph, children)
}

fn render_table(table: &Table, ctx: &mut LayoutContext, opts: &LayoutOptions) -> BoxNode {
    ctx.merge_stack.push(HashMap::new());
    ctx.cursor_stack.push(CellCursor::default());

    let widths = table.columns.iter().map(|c| c.width).collect();
    let mut children = vec![BoxNode::new(BoxKind::ColumnGroup { widths })];

    let mut row_boxes: Vec<Vec<BoxNode>> = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        ctx.cursor_stack.last_mut().unwrap().col = 0;
        let mut cells: Vec<BoxNode> = Vec::with_capacity(row.cells.len());

        for cell in &row.cells {
            let span = cell.span.max(1);
            let col = ctx.cursor_stack.last().unwrap().col;

            let merged_away = match cell.vertical_merge {
                Some(crate::model::VMerge::Continue) => {
                    let merge = ctx.merge_stack.last().unwrap();
                    if let Some(&(row_idx, cell_idx)) = merge.get(&col) {
                        if let BoxKind::Cell { row_span, .. } =
                            &mut row_boxes[row_idx][cell_idx].kind
                        {
                            *row_span += 1;
                        }
                        true
                    } else {
                        // continue with no open restart renders normally
                        false
                    }
                }
                _ => false,
            };

            if !merged_away {
                let cell_children = render_blocks(&cell.blocks, ctx, opts);
                cells.push(BoxNode::with_children(
                    BoxKind::Cell {
                        col_span: span,
                        row_span: 1,
                        borders: true,
                    },
                    cell_children,
                ));

                let merge = ctx.merge_stack.last_mut().unwrap();
                match cell.vertical_merge {
                    Some(crate::model::VMerge::Restart) => {
                        merge.insert(col, (row_boxes.len(), cells.len() - 1));
                    }
                    _ => {
                        merge.remove(&col);
                    }
                }
            }

            ctx.cursor_stack.last_mut().unwrap().col = col + span as usize;
        }

        row_boxes.push(cells);
    }

    children.extend(
        row_boxes
            .into_iter()
            .map(|cells| BoxNode::with_children(BoxKind::Row, cells)),
    );

    ctx.merge_stack.pop();
    ctx.cursor_stack.pop();

    let mut table_box = BoxNode::with_children(BoxKind::Table, children);
    if contains_nested_table(&table_box) {
        normalize_table(&mut table_box, 0);
    }
    table_box
}

/// Whether any cell of this table holds another table.
pub(super) fn contains_nested_table(table: &BoxNode) -> bool {
    table
        .children
        .iter()
        .filter(|c| matches!(c.kind, BoxKind::Row))
        .flat_map(|row| row.children.iter())
        .flat_map(|cell| cell.children.iter())
        .any(|child| child.is_table())
}

/// Border/placeholder cleanup for tables that contain nested tables: inner
/// cell borders are cleared and empty paragraph placeholders next to a
/// nested table are collapsed. Re-applied after a table is split.
pub(super) fn normalize_table(table: &mut BoxNode, depth: usize) {
    for row in table
        .children
        .iter_mut()
        .filter(|c| matches!(c.kind, BoxKind::Row))
    {
        for cell in &mut row.children {
            let has_nested = cell.children.iter().any(BoxNode::is_table);
            for child in &mut cell.children {
                if child.is_table() {
                    normalize_table(child, depth + 1);
                }
            }
            if has_nested {
                cell.children.retain(|child| {
                    !(matches!(child.kind, BoxKind::Paragraph)
                        && child.children.is_empty())
                });
            }
            if depth > 0
                && let BoxKind::Cell { borders, .. } = &mut cell.kind
            {
                *borders = false;
            }
        }
    }
}

fn pick_ref<'a>(
    refs: &'a [HeaderFooterRef],
    props: &SectionProperties,
    page_index: usize,
    first_of_section: bool,
) -> Option<&'a HeaderFooterRef> {
    let first = (props.title_page && first_of_section)
        .then(|| refs.iter().find(|r| r.kind == HeaderFooterKind::First))
        .flatten();
    let even = (page_index % 2 == 1)
        .then(|| refs.iter().find(|r| r.kind == HeaderFooterKind::Even))
        .flatten();
    first
        .or(even)
        .or_else(|| refs.iter().find(|r| r.kind == HeaderFooterKind::Default))
}

/// Render a header/footer part at most once and reuse the boxes across
/// pages. Keyed by part id.
struct PartCache {
    rendered: HashMap<String, Vec<BoxNode>>,
}

impl PartCache {
    fn new() -> Self {
        Self {
            rendered: HashMap::new(),
        }
    }

    fn render(
        &mut self,
        doc: &Document,
        part_id: &str,
        is_header: bool,
        ctx: &mut LayoutContext,
        opts: &LayoutOptions,
    ) -> Option<BoxNode> {
        let parts = if is_header {
            &doc.header_parts
        } else {
            &doc.footer_parts
        };
        let Some(part) = parts.get(part_id) else {
            if opts.debug {
                log::debug!("missing header/footer part: {part_id}");
            }
            return None;
        };

        let children = self
            .rendered
            .entry(part_id.to_string())
            .or_insert_with(|| render_blocks(&part.blocks, ctx, opts))
            .clone();

        let kind = if is_header {
            BoxKind::Header { min_height: None }
        } else {
            BoxKind::Footer { min_height: None }
        };
        Some(BoxNode::with_children(kind, children))
    }
}

/// Build one page per group: page container sized from the group's first
/// section, header/footer chosen by first/even/default precedence, one body
/// region per contained section, endnotes on the final page.
pub(super) fn materialize(
    doc: &Document,
    groups: &[Vec<LogicalSection>],
    opts: &LayoutOptions,
) -> Vec<Page> {
    let mut ctx = LayoutContext::default();
    let mut cache = PartCache::new();
    let mut pages: Vec<Page> = Vec::with_capacity(groups.len());
    let mut prev_props: Option<Rc<SectionProperties>> = None;

    for (index, group) in groups.iter().enumerate() {
        // The footnote reference counter runs per page; endnotes accumulate.
        ctx.footnote_ids.clear();

        let first = group.first().expect("groups are non-empty");
        let props = first.properties.clone();
        let first_of_section = prev_props
            .as_ref()
            .is_none_or(|prev| !Rc::ptr_eq(prev, &props));

        let header = opts
            .render_headers
            .then(|| {
                pick_ref(&props.header_refs, &props, index, first_of_section).and_then(|r| {
                    cache.render(doc, &r.id, true, &mut ctx, opts)
                })
            })
            .flatten();
        let footer = opts
            .render_footers
            .then(|| {
                pick_ref(&props.footer_refs, &props, index, first_of_section).and_then(|r| {
                    cache.render(doc, &r.id, false, &mut ctx, opts)
                })
            })
            .flatten();

        let mut last_props = props.clone();
        let bodies: Vec<BoxNode> = group
            .iter()
            .map(|section| {
                last_props = section.properties.clone();
                BoxNode::with_children(
                    BoxKind::Body {
                        columns: section.properties.columns,
                    },
                    render_blocks(&section.blocks, &mut ctx, opts),
                )
            })
            .collect();

        let endnotes = (opts.render_endnotes && index == groups.len() - 1)
            .then(|| render_note_list(&ctx.endnote_ids, &doc.endnotes, NoteKind::Endnote, opts))
            .flatten();

        pages.push(Page {
            index,
            props,
            header,
            bodies,
            footnotes: None,
            endnotes,
            footer,
            min_height_relaxed: false,
        });
        prev_props = Some(last_props);
    }

    pages
}
