//! Shared document builders for the integration tests.

#![allow(dead_code)]

use pageflow::model::{
    Block, BreakKind, Document, HeaderFooterKind, HeaderFooterPart, HeaderFooterRef, Paragraph,
    Run, RunChild, Table, TableCell, TableColumn, TableRow,
};
use pageflow::{FixedMetrics, Layout, LayoutOptions, Page, paginate};

pub fn para(text: &str) -> Block {
    Block::Paragraph(Paragraph::with_runs(vec![Run::text(text)]))
}

pub fn styled_para(style: &str, text: &str) -> Block {
    let mut p = Paragraph::with_runs(vec![Run::text(text)]);
    p.style_name = Some(style.to_string());
    Block::Paragraph(p)
}

/// Paragraph consisting of a single explicit page break.
pub fn page_break() -> Block {
    Block::Paragraph(Paragraph::with_runs(vec![Run {
        children: vec![RunChild::Break(BreakKind::Page)],
    }]))
}

pub fn cell(text: &str) -> TableCell {
    TableCell {
        span: 1,
        vertical_merge: None,
        blocks: vec![para(text)],
    }
}

pub fn simple_table(widths: &[f32], rows: &[&[&str]]) -> Block {
    Block::Table(Table {
        columns: widths.iter().map(|&w| TableColumn { width: w }).collect(),
        rows: rows
            .iter()
            .map(|texts| TableRow {
                cells: texts.iter().map(|t| cell(t)).collect(),
            })
            .collect(),
    })
}

pub fn doc(blocks: Vec<Block>) -> Document {
    Document {
        blocks,
        ..Document::default()
    }
}

pub fn part(text: &str) -> HeaderFooterPart {
    HeaderFooterPart {
        blocks: vec![para(text)],
    }
}

pub fn part_ref(kind: HeaderFooterKind, id: &str) -> HeaderFooterRef {
    HeaderFooterRef {
        kind,
        id: id.to_string(),
    }
}

pub fn layout(doc: &Document) -> Layout {
    paginate(doc, &FixedMetrics::default(), &LayoutOptions::default())
}

pub fn layout_with(doc: &Document, oracle: &FixedMetrics) -> Layout {
    paginate(doc, oracle, &LayoutOptions::default())
}

/// Concatenated visible text of every body region on the page.
pub fn page_text(page: &Page) -> String {
    page.bodies.iter().map(|b| b.text_content()).collect()
}

pub fn page_texts(layout: &Layout) -> Vec<String> {
    layout.pages.iter().map(page_text).collect()
}
