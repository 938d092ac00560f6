//! Section and page reflow engine for word-processing documents.
//!
//! The input is a parsed block tree ([`model::Document`]); the output is a
//! finite sequence of pages whose body regions fit their section geometry.
//! All real layout numbers come from an injected [`HeightOracle`]; the
//! engine itself only decides where content splits and which page it lands
//! on.

mod error;
pub mod layout;
pub mod model;
mod styles;

pub use error::Error;
pub use layout::{
    BoxKind, BoxMetrics, BoxNode, FixedMetrics, HeightOracle, Layout, LayoutOptions, Page,
};
pub use styles::StyleMap;

use std::fs;
use std::path::Path;
use std::time::Instant;

use model::Document;

/// Lay out a parsed document into pages. Infallible by design: malformed
/// content degrades (skipped elements, oversize pages), it never aborts.
pub fn paginate(doc: &Document, oracle: &dyn HeightOracle, options: &LayoutOptions) -> Layout {
    let t0 = Instant::now();

    let layout = layout::build_layout(doc, oracle, options);

    log::info!(
        "Layout: {} pages in {:.1}ms",
        layout.pages.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );

    layout
}

/// Deserialize a JSON document and lay it out.
pub fn layout_json(
    json: &str,
    oracle: &dyn HeightOracle,
    options: &LayoutOptions,
) -> Result<Layout, Error> {
    let doc: Document = serde_json::from_str(json)?;
    Ok(paginate(&doc, oracle, options))
}

/// Read a JSON document from disk and lay it out.
pub fn layout_path(
    path: impl AsRef<Path>,
    oracle: &dyn HeightOracle,
    options: &LayoutOptions,
) -> Result<Layout, Error> {
    let json = fs::read_to_string(path)?;
    layout_json(&json, oracle, options)
}
