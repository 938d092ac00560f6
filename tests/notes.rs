mod common;

use pageflow::model::{Block, Note, NoteKind, Paragraph, Run, RunChild};
use pageflow::{BoxKind, BoxNode, FixedMetrics, Page};

fn note(kind: NoteKind, id: &str, text: &str) -> Note {
    Note {
        kind,
        id: id.to_string(),
        blocks: vec![common::para(text)],
    }
}

fn ref_run(kind: NoteKind, id: &str) -> RunChild {
    RunChild::NoteReference {
        kind,
        id: id.to_string(),
    }
}

fn note_item_ids(list: &BoxNode) -> Vec<String> {
    list.children
        .iter()
        .map(|item| match &item.kind {
            BoxKind::NoteItem { id } => id.clone(),
            other => panic!("expected a note item, got {other:?}"),
        })
        .collect()
}

#[test]
fn footnotes_land_on_their_reference_page() {
    let first = Paragraph::with_runs(vec![Run {
        children: vec![
            RunChild::Text("a".into()),
            ref_run(NoteKind::Footnote, "f1"),
        ],
    }]);
    let second = Paragraph::with_runs(vec![Run {
        children: vec![
            RunChild::Text("b".into()),
            ref_run(NoteKind::Footnote, "f2"),
            ref_run(NoteKind::Footnote, "f3"),
        ],
    }]);
    let mut doc = common::doc(vec![
        Block::Paragraph(first),
        common::page_break(),
        Block::Paragraph(second),
    ]);
    doc.footnotes = vec![
        note(NoteKind::Footnote, "f1", "note one"),
        note(NoteKind::Footnote, "f2", "note two"),
        note(NoteKind::Footnote, "f3", "note three"),
    ];
    let layout = common::layout(&doc);

    assert_eq!(layout.pages.len(), 2);
    let page1 = layout.pages[0].footnotes.as_ref().expect("footnotes");
    assert_eq!(note_item_ids(page1), vec!["f1"]);
    let page2 = layout.pages[1].footnotes.as_ref().expect("footnotes");
    assert_eq!(note_item_ids(page2), vec!["f2", "f3"]);
}

#[test]
fn footnotes_move_with_reflowed_content() {
    let tail = Paragraph::with_runs(vec![Run {
        children: vec![
            RunChild::Text("tail".into()),
            ref_run(NoteKind::Footnote, "f1"),
        ],
    }]);
    let mut doc = common::doc(vec![common::para("filler"), Block::Paragraph(tail)]);
    doc.footnotes = vec![note(NoteKind::Footnote, "f1", "note one")];

    // The filler leaves no room for the referencing paragraph once the
    // footnote list is on the page, so both move to the next page.
    let oracle = FixedMetrics::default().with_override("filler", 630.0);
    let layout = common::layout_with(&doc, &oracle);

    assert_eq!(layout.pages.len(), 2);
    assert!(layout.pages[0].footnotes.is_none());
    let moved = layout.pages[1].footnotes.as_ref().expect("footnotes");
    assert_eq!(note_item_ids(moved), vec!["f1"]);
}

#[test]
fn endnotes_collect_on_the_last_page() {
    let opener = Paragraph::with_runs(vec![Run {
        children: vec![
            RunChild::Text("a".into()),
            ref_run(NoteKind::Endnote, "e1"),
        ],
    }]);
    let mut doc = common::doc(vec![
        Block::Paragraph(opener),
        common::page_break(),
        common::para("b"),
    ]);
    doc.endnotes = vec![note(NoteKind::Endnote, "e1", "closing remark")];
    let layout = common::layout(&doc);

    assert_eq!(layout.pages.len(), 2);
    assert!(layout.pages[0].endnotes.is_none());
    let endnotes = layout.pages[1].endnotes.as_ref().expect("endnotes");
    assert_eq!(note_item_ids(endnotes), vec!["e1"]);
}

#[test]
fn unknown_note_id_is_skipped() {
    let para = Paragraph::with_runs(vec![Run {
        children: vec![
            RunChild::Text("a".into()),
            ref_run(NoteKind::Footnote, "missing"),
        ],
    }]);
    let doc = common::doc(vec![Block::Paragraph(para)]);
    let layout = common::layout(&doc);

    assert!(layout.pages[0].footnotes.is_none());
}

// Footnote reference counters restart on every page.
#[test]
fn reference_marks_number_per_page() {
    let first = Paragraph::with_runs(vec![Run {
        children: vec![ref_run(NoteKind::Footnote, "f1")],
    }]);
    let second = Paragraph::with_runs(vec![Run {
        children: vec![ref_run(NoteKind::Footnote, "f2")],
    }]);
    let mut doc = common::doc(vec![
        Block::Paragraph(first),
        common::page_break(),
        Block::Paragraph(second),
    ]);
    doc.footnotes = vec![
        note(NoteKind::Footnote, "f1", "one"),
        note(NoteKind::Footnote, "f2", "two"),
    ];
    let layout = common::layout(&doc);

    assert_eq!(first_mark_number(&layout.pages[0]), Some(1));
    assert_eq!(first_mark_number(&layout.pages[1]), Some(1));
}

fn first_mark_number(page: &Page) -> Option<u32> {
    let mut found = None;
    for body in &page.bodies {
        body.visit(&mut |node| {
            if let BoxKind::NoteRef { number, .. } = node.kind
                && found.is_none()
            {
                found = Some(number);
            }
        });
    }
    found
}
