use std::rc::Rc;

use crate::model::{Block, BreakKind, Document, Paragraph, Run, RunChild, SectionProperties};
use crate::styles::StyleMap;

use super::LayoutOptions;

/// A run of blocks sharing one set of section properties. Produced by the
/// splitter, consumed read-only by the page grouper.
pub(super) struct LogicalSection {
    pub(super) properties: Rc<SectionProperties>,
    pub(super) blocks: Vec<Block>,
    /// Content after this section starts on a fresh page.
    pub(super) forced_page_break: bool,
}

#[derive(Default)]
struct PendingSection {
    properties: Option<SectionProperties>,
    blocks: Vec<Block>,
    forced_page_break: bool,
}

fn is_hard_break(child: &RunChild, opts: &LayoutOptions) -> bool {
    match child {
        RunChild::Break(BreakKind::Page) => true,
        RunChild::Break(BreakKind::LastRendered) => !opts.ignore_last_rendered_page_break,
        _ => false,
    }
}

/// First (run, child) position of a hard page break inside the paragraph.
fn find_break(para: &Paragraph, opts: &LayoutOptions) -> Option<(usize, usize)> {
    para.runs.iter().enumerate().find_map(|(ri, run)| {
        run.children
            .iter()
            .position(|c| is_hard_break(c, opts))
            .map(|ci| (ri, ci))
    })
}

/// Split a paragraph at a hard break. The head keeps the runs before the
/// break plus the break run's pre-break children; the tail starts with the
/// break run's remaining children. Returns `None` for the tail when the
/// break is the very last child of the last run (no continuation content).
fn split_paragraph(
    mut para: Paragraph,
    run_idx: usize,
    child_idx: usize,
) -> (Paragraph, Option<Paragraph>) {
    let has_tail =
        run_idx + 1 < para.runs.len() || child_idx + 1 < para.runs[run_idx].children.len();
    if !has_tail {
        return (para, None);
    }

    let style_name = para.style_name.clone();
    let mut tail_runs = para.runs.split_off(run_idx);
    let suffix = tail_runs[0].children.split_off(child_idx);
    let prefix = std::mem::replace(&mut tail_runs[0].children, suffix);
    para.runs.push(Run { children: prefix });

    let tail = Paragraph {
        style_name,
        section: None,
        runs: tail_runs,
    };
    (para, Some(tail))
}

/// A paragraph left with no run content by a break split.
fn is_split_artifact(block: &Block) -> bool {
    match block {
        Block::Paragraph(p) => !p.runs.is_empty() && p.runs.iter().all(|r| r.children.is_empty()),
        Block::Table(_) => false,
    }
}

/// Cut the document's block sequence into logical sections at section
/// property boundaries, style-driven page-break-before flags, and explicit
/// in-run break markers.
pub(super) fn split_sections(
    doc: &Document,
    styles: &StyleMap,
    opts: &LayoutOptions,
) -> Vec<LogicalSection> {
    let mut result: Vec<PendingSection> = vec![PendingSection::default()];

    for block in &doc.blocks {
        let block = block.clone();

        if let Block::Paragraph(ref para) = block
            && styles.page_break_before(para.style_name.as_deref())
        {
            let current = result.last_mut().expect("section list never empty");
            if !current.blocks.is_empty() {
                current.forced_page_break = true;
                result.push(PendingSection::default());
            }
        }

        let Block::Paragraph(mut para) = block else {
            result.last_mut().unwrap().blocks.push(block);
            continue;
        };

        let section_props = para.section.take();
        let break_pos = if opts.break_pages {
            find_break(&para, opts)
        } else {
            None
        };

        let (head, tail) = match break_pos {
            Some((ri, ci)) => split_paragraph(para, ri, ci),
            None => (para, None),
        };

        let current = result.last_mut().unwrap();
        current.blocks.push(Block::Paragraph(head));

        if section_props.is_some() || break_pos.is_some() {
            current.properties = section_props;
            current.forced_page_break = break_pos.is_some();
            result.push(PendingSection::default());
        }

        if let Some(tail) = tail {
            result.last_mut().unwrap().blocks.push(Block::Paragraph(tail));
        }
    }

    // Prune zero-content paragraphs left behind by a break split.
    for section in &mut result {
        if section.blocks.last().is_some_and(is_split_artifact) {
            section.blocks.pop();
        }
    }

    // A trailing sectionless remainder with no content renders nothing.
    while result.len() > 1
        && result
            .last()
            .is_some_and(|s| s.blocks.is_empty() && s.properties.is_none())
    {
        result.pop();
    }

    // Resolve unset properties backward: inherit from the next section with
    // explicit properties, or the document default. Sharing via Rc makes
    // "same properties" a pointer identity, which the materializer uses for
    // first-page header selection.
    let default_props = Rc::new(doc.default_section.clone());
    let mut sections: Vec<LogicalSection> = Vec::with_capacity(result.len());
    let mut next_props: Option<Rc<SectionProperties>> = None;

    for pending in result.into_iter().rev() {
        let properties = match pending.properties {
            Some(props) => {
                let props = Rc::new(props);
                next_props = Some(props.clone());
                props
            }
            None => next_props.clone().unwrap_or_else(|| default_props.clone()),
        };
        sections.push(LogicalSection {
            properties,
            blocks: pending.blocks,
            forced_page_break: pending.forced_page_break,
        });
    }
    sections.reverse();
    sections
}

fn geometry_differs(prev: &SectionProperties, next: &SectionProperties) -> bool {
    prev.page_size.orientation != next.page_size.orientation
        || prev.page_size.width != next.page_size.width
        || prev.page_size.height != next.page_size.height
}

/// Merge consecutive logical sections into physical page groups. A group
/// ends after a forced break; incompatible page geometry starts a new group
/// before the differing section. When implicit last-rendered breaks are
/// ignored, every section boundary is a page boundary and real breaks are
/// recomputed by the reflow engine.
pub(super) fn group_pages(
    sections: Vec<LogicalSection>,
    opts: &LayoutOptions,
) -> Vec<Vec<LogicalSection>> {
    let mut groups: Vec<Vec<LogicalSection>> = Vec::new();
    let mut current: Vec<LogicalSection> = Vec::new();
    let mut prev: Option<Rc<SectionProperties>> = None;

    for section in sections {
        if let Some(ref prev_props) = prev
            && geometry_differs(prev_props, &section.properties)
            && !current.is_empty()
        {
            groups.push(std::mem::take(&mut current));
        }

        prev = Some(section.properties.clone());
        let close_after = opts.ignore_last_rendered_page_break || section.forced_page_break;
        current.push(section);
        if close_after {
            groups.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }
    groups.retain(|g| !g.is_empty());
    groups
}
