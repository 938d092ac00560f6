mod common;

use pageflow::model::HeaderFooterKind;
use pageflow::{BoxKind, FixedMetrics, LayoutOptions, paginate};

fn three_page_doc() -> pageflow::model::Document {
    common::doc(vec![
        common::para("one"),
        common::page_break(),
        common::para("two"),
        common::page_break(),
        common::para("three"),
    ])
}

fn header_text(page: &pageflow::Page) -> Option<String> {
    page.header.as_ref().map(|h| h.text_content())
}

#[test]
fn even_pages_use_the_even_header() {
    let mut doc = three_page_doc();
    doc.default_section.header_refs = vec![
        common::part_ref(HeaderFooterKind::Default, "hd"),
        common::part_ref(HeaderFooterKind::Even, "he"),
    ];
    doc.header_parts.insert("hd".into(), common::part("DEFAULT"));
    doc.header_parts.insert("he".into(), common::part("EVEN"));
    let layout = common::layout(&doc);

    let headers: Vec<_> = layout.pages.iter().map(header_text).collect();
    assert_eq!(
        headers,
        vec![
            Some("DEFAULT".to_string()),
            Some("EVEN".to_string()),
            Some("DEFAULT".to_string()),
        ]
    );
}

#[test]
fn title_page_uses_the_first_header() {
    let mut doc = three_page_doc();
    doc.default_section.title_page = true;
    doc.default_section.header_refs = vec![
        common::part_ref(HeaderFooterKind::Default, "hd"),
        common::part_ref(HeaderFooterKind::Even, "he"),
        common::part_ref(HeaderFooterKind::First, "hf"),
    ];
    doc.header_parts.insert("hd".into(), common::part("DEFAULT"));
    doc.header_parts.insert("he".into(), common::part("EVEN"));
    doc.header_parts.insert("hf".into(), common::part("FIRST"));
    let layout = common::layout(&doc);

    let headers: Vec<_> = layout.pages.iter().map(header_text).collect();
    assert_eq!(
        headers,
        vec![
            Some("FIRST".to_string()),
            Some("EVEN".to_string()),
            Some("DEFAULT".to_string()),
        ]
    );
}

#[test]
fn first_header_requires_the_title_page_flag() {
    let mut doc = three_page_doc();
    doc.default_section.header_refs = vec![
        common::part_ref(HeaderFooterKind::Default, "hd"),
        common::part_ref(HeaderFooterKind::First, "hf"),
    ];
    doc.header_parts.insert("hd".into(), common::part("DEFAULT"));
    doc.header_parts.insert("hf".into(), common::part("FIRST"));
    let layout = common::layout(&doc);

    assert_eq!(header_text(&layout.pages[0]), Some("DEFAULT".to_string()));
}

#[test]
fn footers_follow_the_same_parity() {
    let mut doc = three_page_doc();
    doc.default_section.footer_refs = vec![
        common::part_ref(HeaderFooterKind::Default, "fd"),
        common::part_ref(HeaderFooterKind::Even, "fe"),
    ];
    doc.footer_parts.insert("fd".into(), common::part("DEF"));
    doc.footer_parts.insert("fe".into(), common::part("EVN"));
    let layout = common::layout(&doc);

    let footers: Vec<_> = layout
        .pages
        .iter()
        .map(|p| p.footer.as_ref().map(|f| f.text_content()))
        .collect();
    assert_eq!(
        footers,
        vec![
            Some("DEF".to_string()),
            Some("EVN".to_string()),
            Some("DEF".to_string()),
        ]
    );
}

#[test]
fn continuation_page_repeats_the_header_at_pinned_height() {
    let mut doc = common::doc((0..50).map(|i| common::para(&format!("p{i:02}"))).collect());
    doc.default_section.header_refs = vec![common::part_ref(HeaderFooterKind::Default, "hd")];
    doc.header_parts.insert("hd".into(), common::part("HDR"));
    let layout = common::layout(&doc);

    assert!(layout.pages.len() >= 2);
    let continuation = layout.pages[1].header.as_ref().expect("header");
    assert_eq!(continuation.text_content(), "HDR");
    match continuation.kind {
        BoxKind::Header { min_height } => assert_eq!(min_height, Some(14.0)),
        ref other => panic!("expected a header box, got {other:?}"),
    }
}

#[test]
fn missing_part_renders_no_header() {
    let mut doc = common::doc(vec![common::para("one")]);
    doc.default_section.header_refs = vec![common::part_ref(HeaderFooterKind::Default, "gone")];
    let layout = common::layout(&doc);

    assert!(layout.pages[0].header.is_none());
}

#[test]
fn headers_can_be_disabled() {
    let mut doc = common::doc(vec![common::para("one")]);
    doc.default_section.header_refs = vec![common::part_ref(HeaderFooterKind::Default, "hd")];
    doc.header_parts.insert("hd".into(), common::part("HDR"));
    let opts = LayoutOptions {
        render_headers: false,
        ..LayoutOptions::default()
    };
    let layout = paginate(&doc, &FixedMetrics::default(), &opts);

    assert!(layout.pages[0].header.is_none());
}
