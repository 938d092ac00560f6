use std::collections::HashMap;

use crate::model::{NoteKind, SectionColumns};

/// Block-level box produced by the materializer. The reflow engine only ever
/// sees this shape: a tagged kind plus children. Rendering backends map it to
/// their own substrate (DOM, PDF content streams, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct BoxNode {
    pub kind: BoxKind,
    pub children: Vec<BoxNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BoxKind {
    /// One body region per section on the page.
    Body { columns: Option<SectionColumns> },
    /// `min_height` is pinned on continuation pages so a repeated header
    /// renders at the same height as the original.
    Header { min_height: Option<f32> },
    Footer { min_height: Option<f32> },
    Paragraph,
    Text(String),
    LineBreak,
    Table,
    ColumnGroup { widths: Vec<f32> },
    Row,
    Cell { col_span: u16, row_span: u32, borders: bool },
    /// Rendered note reference mark; `number` is the running display index
    /// assigned during page materialization.
    NoteRef { kind: NoteKind, id: String, number: u32 },
    NoteList { kind: NoteKind },
    NoteItem { id: String },
}

impl BoxNode {
    pub fn new(kind: BoxKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: BoxKind, children: Vec<BoxNode>) -> Self {
        Self { kind, children }
    }

    /// Copy of this box without its children (the `cloneNode(false)` of the
    /// reflow algorithm).
    pub fn clone_shallow(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            children: Vec::new(),
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, BoxKind::Table)
    }

    pub fn is_column_group(&self) -> bool {
        matches!(self.kind, BoxKind::ColumnGroup { .. })
    }

    /// Concatenated visible text of this subtree. Note reference marks count
    /// as visible (their display number is rendered).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            BoxKind::Text(text) => out.push_str(text),
            BoxKind::NoteRef { number, .. } => out.push_str(&number.to_string()),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Walk the subtree depth-first, visiting every box.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a BoxNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

/// Vertical extents of a rendered box, in points, as reported by the
/// measurement oracle. `margin`, `padding`, and `border` are the summed
/// top+bottom widths.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxMetrics {
    pub height: f32,
    pub margin: f32,
    pub padding: f32,
    pub border: f32,
}

impl BoxMetrics {
    pub fn content(height: f32) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    /// Total vertical space the box occupies in flow.
    pub fn total(&self) -> f32 {
        self.height + self.margin + self.padding + self.border
    }
}

/// The measurement collaborator. The engine never computes real layout
/// numbers itself; every height it reasons about comes through here.
pub trait HeightOracle {
    fn metrics(&self, node: &BoxNode) -> BoxMetrics;
}

pub(crate) fn total_height(oracle: &dyn HeightOracle, node: &BoxNode) -> f32 {
    oracle.metrics(node).total()
}

/// Pure offline oracle: fixed per-line heights plus optional per-box
/// overrides keyed by text content. Deterministic stand-in for a real
/// rendering backend; used by the tests and the CLI.
pub struct FixedMetrics {
    pub line_height: f32,
    pub paragraph_spacing: f32,
    /// Height override for any paragraph or row whose text content matches
    /// the key exactly.
    pub overrides: HashMap<String, f32>,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            line_height: 14.0,
            paragraph_spacing: 0.0,
            overrides: HashMap::new(),
        }
    }
}

impl FixedMetrics {
    pub fn with_override(mut self, text: impl Into<String>, height: f32) -> Self {
        self.overrides.insert(text.into(), height);
        self
    }

    fn content_height(&self, node: &BoxNode) -> f32 {
        match &node.kind {
            BoxKind::Paragraph => {
                if let Some(&h) = self.overrides.get(node.text_content().as_str()) {
                    return h;
                }
                let extra_lines = node
                    .children
                    .iter()
                    .filter(|c| matches!(c.kind, BoxKind::LineBreak))
                    .count();
                self.line_height * (1 + extra_lines) as f32
            }
            BoxKind::Row => {
                if let Some(&h) = self.overrides.get(node.text_content().as_str()) {
                    return h;
                }
                node.children
                    .iter()
                    .map(|cell| self.content_height(cell))
                    .fold(0.0, f32::max)
            }
            BoxKind::Header { min_height } | BoxKind::Footer { min_height } => {
                let content: f32 = node.children.iter().map(|c| self.total(c)).sum();
                content.max(min_height.unwrap_or(0.0))
            }
            BoxKind::Text(_) | BoxKind::LineBreak | BoxKind::NoteRef { .. } => 0.0,
            BoxKind::ColumnGroup { .. } => 0.0,
            _ => node.children.iter().map(|c| self.total(c)).sum(),
        }
    }

    fn total(&self, node: &BoxNode) -> f32 {
        self.metrics(node).total()
    }
}

impl HeightOracle for FixedMetrics {
    fn metrics(&self, node: &BoxNode) -> BoxMetrics {
        let margin = match node.kind {
            BoxKind::Paragraph => self.paragraph_spacing,
            _ => 0.0,
        };
        BoxMetrics {
            height: self.content_height(node),
            margin,
            padding: 0.0,
            border: 0.0,
        }
    }
}
