use std::fs;
use std::process::ExitCode;

use clap::Parser;

use pageflow::model::Document;
use pageflow::{BoxKind, FixedMetrics, LayoutOptions, paginate};

/// Paginate a parsed document (JSON) and print a per-page summary.
#[derive(Parser)]
#[command(name = "pageflow", version, about)]
struct Args {
    /// Input document, as JSON
    input: String,

    /// Treat explicit page breaks as plain content
    #[arg(long)]
    no_break_pages: bool,

    /// Trust the document's own soft page-break markers instead of
    /// recomputing page boundaries
    #[arg(long)]
    keep_soft_breaks: bool,

    /// Skip headers and footers
    #[arg(long)]
    no_chrome: bool,

    /// Skip footnotes and endnotes
    #[arg(long)]
    no_notes: bool,

    /// Line height used by the built-in fixed measurer, in points
    #[arg(long, default_value_t = 14.0)]
    line_height: f32,

    /// Log skipped or unresolved document parts
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let json = match fs::read_to_string(&args.input) {
        Ok(json) => json,
        Err(err) => {
            eprintln!("error: failed to read {}: {err}", args.input);
            return ExitCode::FAILURE;
        }
    };

    let doc: Document = match serde_json::from_str(&json) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("error: invalid document JSON: {err}");
            return ExitCode::FAILURE;
        }
    };

    let options = LayoutOptions {
        break_pages: !args.no_break_pages,
        ignore_last_rendered_page_break: !args.keep_soft_breaks,
        render_headers: !args.no_chrome,
        render_footers: !args.no_chrome,
        render_footnotes: !args.no_notes,
        render_endnotes: !args.no_notes,
        debug: args.debug,
    };
    let oracle = FixedMetrics {
        line_height: args.line_height,
        ..FixedMetrics::default()
    };

    let layout = paginate(&doc, &oracle, &options);

    for page in &layout.pages {
        let blocks: usize = page.bodies.iter().map(|b| b.children.len()).sum();
        let mut flags = Vec::new();
        if page.header.is_some() {
            flags.push("header");
        }
        if page.footer.is_some() {
            flags.push("footer");
        }
        if page.footnotes.is_some() {
            flags.push("footnotes");
        }
        if page.endnotes.is_some() {
            flags.push("endnotes");
        }
        if page.min_height_relaxed {
            flags.push("oversize");
        }
        let columns = page
            .bodies
            .first()
            .and_then(|body| match body.kind {
                BoxKind::Body { columns } => columns.map(|c| c.count.max(1)),
                _ => None,
            })
            .unwrap_or(1);
        println!(
            "page {:>3}: {:.0}x{:.0}pt, {} section(s), {blocks} block(s), {columns} column(s){}{}",
            page.index + 1,
            page.props.page_size.width,
            page.props.page_size.height,
            page.bodies.len(),
            if flags.is_empty() { "" } else { " " },
            flags.join("+"),
        );
    }
    println!("{} page(s)", layout.pages.len());

    ExitCode::SUCCESS
}
