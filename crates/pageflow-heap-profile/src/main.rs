//! DHAT heap profile for a full layout + positioning pass.
//!
//! Run with `cargo run -p pageflow-heap-profile --release` and inspect the
//! emitted `dhat-heap.json` in the DHAT viewer.

use std::sync::Arc;

use pageflow::{FontSpec, HeuristicWidthOracle, LayoutConfig, LayoutEngine};
use pageflow_render::{position_pages, SurfaceConfig};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

const WORDS: &[&str] = &[
    "pagination",
    "column",
    "line",
    "greedy",
    "packing",
    "unicode",
    "text",
    "measure",
    "width",
    "overflow",
];

fn synthetic_text(paragraphs: usize, words_per_paragraph: usize) -> String {
    let mut out = String::new();
    for paragraph in 0..paragraphs {
        for word in 0..words_per_paragraph {
            if word > 0 {
                out.push(' ');
            }
            out.push_str(WORDS[(paragraph + word) % WORDS.len()]);
        }
        out.push('\n');
        out.push('\n');
    }
    out
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    let text = synthetic_text(400, 120);
    let cfg = LayoutConfig::new(2, vec![280.0, 280.0], 720.0, 22.0)
        .with_font(FontSpec::new("serif", 16.0));
    let engine = LayoutEngine::new(cfg.clone()).with_width_oracle(Arc::new(HeuristicWidthOracle));

    let result = engine.layout(&text);
    let pages = position_pages(&result, &cfg, &SurfaceConfig::default());
    println!(
        "laid out {} pages ({} lines), positioned {} pages",
        result.pages.len(),
        result.line_count(),
        pages.len()
    );
}
