use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,  // points
    pub height: f32, // points
    pub orientation: Orientation,
}

impl Default for PageSize {
    fn default() -> Self {
        // US Letter
        Self {
            width: 612.0,
            height: 792.0,
            orientation: Orientation::Portrait,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    pub header: f32,
    pub footer: f32,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            top: 72.0,
            bottom: 72.0,
            left: 72.0,
            right: 72.0,
            header: 36.0,
            footer: 36.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionColumns {
    pub count: u16,
    pub space: f32, // gap between columns, points
    pub separator: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderFooterKind {
    Default,
    Even,
    First,
}

/// Reference from a section to a header/footer part, resolved through
/// `Document::header_parts` / `Document::footer_parts`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooterRef {
    pub kind: HeaderFooterKind,
    pub id: String,
}

/// Per-section page geometry. Only the last paragraph of a section carries
/// one; earlier sections inherit forward (see the section splitter).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub page_size: PageSize,
    pub margins: PageMargins,
    pub columns: Option<SectionColumns>,
    pub title_page: bool,
    pub header_refs: Vec<HeaderFooterRef>,
    pub footer_refs: Vec<HeaderFooterRef>,
}

impl Default for SectionProperties {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margins: PageMargins::default(),
            columns: None,
            title_page: false,
            header_refs: Vec::new(),
            footer_refs: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakKind {
    Page,
    /// The source format's own "already rendered to a given page" marker.
    LastRendered,
    TextWrapping,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    Footnote,
    Endnote,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RunChild {
    Text(String),
    Break(BreakKind),
    NoteReference { kind: NoteKind, id: String },
    /// Anything the parser produced that layout does not understand.
    /// Skipped during rendering, logged in debug mode.
    Unknown(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub children: Vec<RunChild>,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            children: vec![RunChild::Text(text.into())],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub style_name: Option<String>,
    /// Present only on the closing paragraph of a section.
    pub section: Option<SectionProperties>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn with_runs(runs: Vec<Run>) -> Self {
        Self {
            style_name: None,
            section: None,
            runs,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub width: f32, // points
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VMerge {
    Restart,
    Continue,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Horizontal merge count (grid columns covered). 0 is treated as 1.
    pub span: u16,
    pub vertical_merge: Option<VMerge>,
    /// Cell content: paragraphs and nested tables.
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// Footnote or endnote content, dispatched by `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub kind: NoteKind,
    pub id: String,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberingBinding {
    pub id: String,
    pub level: u8,
}

/// A named style from the document's style table. Only the properties the
/// layout engine consumes; the full visual cascade is the renderer's business.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub id: String,
    pub based_on: Option<String>,
    pub linked: Option<String>,
    pub page_break_before: Option<bool>,
    pub numbering: Option<NumberingBinding>,
    /// Structured style declarations (key/value), merged through the
    /// `based_on` chain. Replaces stylesheet string generation.
    pub declarations: HashMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooterPart {
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
    /// Geometry for the trailing section and fallback for sections with no
    /// explicit properties anywhere after them.
    pub default_section: SectionProperties,
    pub styles: Vec<Style>,
    pub footnotes: Vec<Note>,
    pub endnotes: Vec<Note>,
    pub header_parts: HashMap<String, HeaderFooterPart>,
    pub footer_parts: HashMap<String, HeaderFooterPart>,
}
