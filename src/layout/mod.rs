mod boxes;
mod notes;
mod reflow;
mod render;
mod section;

use std::rc::Rc;

use crate::model::{Document, SectionProperties};
use crate::styles::StyleMap;

pub use boxes::{BoxKind, BoxMetrics, BoxNode, FixedMetrics, HeightOracle};

/// Feature switches, mirroring the source renderer's defaults.
#[derive(Clone, Debug)]
pub struct LayoutOptions {
    /// Honour explicit page breaks and run the overflow reflow loop.
    pub break_pages: bool,
    /// Recompute page boundaries instead of trusting the format's own
    /// "last rendered page break" markers.
    pub ignore_last_rendered_page_break: bool,
    pub render_headers: bool,
    pub render_footers: bool,
    pub render_footnotes: bool,
    pub render_endnotes: bool,
    pub debug: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            break_pages: true,
            ignore_last_rendered_page_break: true,
            render_headers: true,
            render_footers: true,
            render_footnotes: true,
            render_endnotes: true,
            debug: false,
        }
    }
}

/// A materialized page. Regions are box trees; `props` is the resolved
/// section geometry the page was sized from.
#[derive(Clone, Debug)]
pub struct Page {
    pub index: usize,
    pub props: Rc<SectionProperties>,
    pub header: Option<BoxNode>,
    /// One body region per section sharing the page.
    pub bodies: Vec<BoxNode>,
    /// Footnote list, positioned before the footer.
    pub footnotes: Option<BoxNode>,
    /// Endnote list, present on the final page only.
    pub endnotes: Option<BoxNode>,
    pub footer: Option<BoxNode>,
    /// Set when oversize content forced the page taller than its nominal
    /// geometry; the height constraint is relaxed to a minimum.
    pub min_height_relaxed: bool,
}

#[derive(Clone, Debug)]
pub struct Layout {
    pub pages: Vec<Page>,
}

/// Run the full pipeline: split the block sequence into logical sections,
/// group them into pages, materialize page regions, reflow overflowing
/// bodies against the measurement oracle, and place footnotes.
pub fn build_layout(doc: &Document, oracle: &dyn HeightOracle, opts: &LayoutOptions) -> Layout {
    let styles = StyleMap::resolve(&doc.styles, opts.debug);
    let sections = section::split_sections(doc, &styles, opts);
    let groups = section::group_pages(sections, opts);
    let mut pages = render::materialize(doc, &groups, opts);

    if opts.break_pages && opts.ignore_last_rendered_page_break {
        // Footnote lists occupy body space, so they are rebuilt after every
        // structural change and the overflow check is re-run until stable.
        loop {
            notes::place_footnotes(&mut pages, &doc.footnotes, opts);
            if !reflow::reflow_pass(&mut pages, oracle) {
                break;
            }
        }
    } else {
        notes::place_footnotes(&mut pages, &doc.footnotes, opts);
    }

    Layout { pages }
}
