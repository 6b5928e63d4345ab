//! Deterministic column/page pagination engine for Unicode text.
//!
//! Given a body of text, a measured font, a set of column widths, a column
//! height, and a line height, [`LayoutEngine::layout`] produces an ordered
//! sequence of pages, each holding a fixed number of columns, each column
//! holding already-wrapped lines. No line exceeds its column's width and no
//! column exceeds the configured height.
//!
//! The engine performs no I/O and no rendering. Width measurement is a
//! caller-supplied capability ([`WidthOracle`]); word segmentation is a
//! swappable strategy ([`SegmentationProvider`]) with a built-in fallback, so
//! layout correctness never depends on a particular segmentation backend.
//!
//! Consumers position and rasterize the resulting [`LayoutResult`] through
//! the companion `pageflow-render`, `pageflow-embedded-graphics`, and
//! `pageflow-export` crates; they treat lines as opaque pre-wrapped strings
//! and never re-wrap them.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod layout;
mod measure;
mod page;
mod segment;

pub use layout::{LayoutConfig, LayoutEngine, DEFAULT_FIT_EPSILON};
pub use measure::{FontSpec, HeuristicWidthOracle, WidthOracle};
pub use page::{Column, LayoutResult, Line, Page};
pub use segment::{segment_line, SegmentationProvider, Token, UnicodeWordProvider};
