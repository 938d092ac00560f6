use crate::model::{Note, NoteKind};

use super::boxes::{BoxKind, BoxNode};
use super::render;
use super::{LayoutOptions, Page};

/// Render the referenced notes, in reference order, as an ordered note list.
/// Ids with no matching note are skipped; an empty result yields no list.
pub(super) fn render_note_list(
    ids: &[String],
    notes: &[Note],
    kind: NoteKind,
    opts: &LayoutOptions,
) -> Option<BoxNode> {
    let mut ctx = render::LayoutContext::default();
    let items: Vec<BoxNode> = ids
        .iter()
        .filter_map(|id| notes.iter().find(|n| n.kind == kind && n.id == *id))
        .map(|note| {
            BoxNode::with_children(
                BoxKind::NoteItem {
                    id: note.id.clone(),
                },
                render::render_blocks(&note.blocks, &mut ctx, opts),
            )
        })
        .collect();

    if items.is_empty() {
        return None;
    }
    Some(BoxNode::with_children(BoxKind::NoteList { kind }, items))
}

/// Post-reflow footnote placement: re-scan each page's body regions for
/// footnote reference marks, rebuild that page's footnote list from scratch,
/// and position it before the footer (structurally, the page's `footnotes`
/// slot). Stale lists from before a split are discarded.
pub(super) fn place_footnotes(pages: &mut [Page], notes: &[Note], opts: &LayoutOptions) {
    if !opts.render_footnotes {
        return;
    }

    for page in pages {
        let mut ids: Vec<String> = Vec::new();
        for body in &page.bodies {
            body.visit(&mut |node| {
                if let BoxKind::NoteRef {
                    kind: NoteKind::Footnote,
                    id,
                    ..
                } = &node.kind
                {
                    ids.push(id.clone());
                }
            });
        }

        page.footnotes = None;
        if !ids.is_empty() {
            page.footnotes = render_note_list(&ids, notes, NoteKind::Footnote, opts);
        }
    }
}
