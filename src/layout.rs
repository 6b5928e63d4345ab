//! Configuration, line packing, and column/page flow control.

use core::fmt;
use std::borrow::Cow;
use std::sync::Arc;

use smallvec::SmallVec;
use unicode_segmentation::UnicodeSegmentation;

use crate::measure::{FontSpec, WidthOracle};
use crate::page::{Column, LayoutResult, Line, Page};
use crate::segment::{segment_line, SegmentationProvider, Token, UnicodeWordProvider};

/// Default fit tolerance in device-independent pixels.
///
/// Absorbs floating-point accumulation from measurement backends that round
/// to fractional pixels. Tune [`LayoutConfig::fit_epsilon`] relative to the
/// precision of the installed [`WidthOracle`].
pub const DEFAULT_FIT_EPSILON: f32 = 0.1;

const MIN_COLUMN_WIDTH_PX: f32 = 1.0;
const MIN_LINE_HEIGHT_PX: f32 = 1.0;
const DEFAULT_COLUMN_WIDTH_PX: f32 = 320.0;

/// Immutable input bundle for one layout run.
///
/// Transient invalid states are expected from live settings edits; the
/// engine clamps them instead of rejecting (see [`LayoutConfig::normalized`]
/// behavior described on each field).
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Number of columns per page. Zero is clamped to one.
    pub column_count: usize,
    /// Per-position column widths in device-independent pixels.
    ///
    /// Cycled when shorter than `column_count`; an empty list falls back to
    /// one default width.
    pub column_widths: Vec<f32>,
    /// Column height in device-independent pixels; floored at one line
    /// height.
    pub column_height: f32,
    /// Vertical advance per line in device-independent pixels.
    pub line_height: f32,
    /// Font resolved by the width oracle.
    pub font: FontSpec,
    /// Fit tolerance for width and height checks.
    pub fit_epsilon: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_count: 1,
            column_widths: vec![DEFAULT_COLUMN_WIDTH_PX],
            column_height: 480.0,
            line_height: 20.0,
            font: FontSpec::default(),
            fit_epsilon: DEFAULT_FIT_EPSILON,
        }
    }
}

impl LayoutConfig {
    /// Build a configuration from the core geometry inputs.
    pub fn new(
        column_count: usize,
        column_widths: Vec<f32>,
        column_height: f32,
        line_height: f32,
    ) -> Self {
        Self {
            column_count,
            column_widths,
            column_height,
            line_height,
            ..Self::default()
        }
    }

    /// Set the font resolved by the width oracle.
    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = font;
        self
    }

    /// Set the fit tolerance used by width and height checks.
    pub fn with_fit_epsilon(mut self, fit_epsilon: f32) -> Self {
        self.fit_epsilon = fit_epsilon;
        self
    }

    /// Width of the column at `index`, cycling the width list when it is
    /// shorter than the column count.
    pub fn column_width(&self, index: usize) -> f32 {
        if self.column_widths.is_empty() {
            return DEFAULT_COLUMN_WIDTH_PX;
        }
        self.column_widths[index % self.column_widths.len()]
    }

    /// Clamp degenerate values so layout always has a workable geometry.
    fn normalized(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.column_count == 0 {
            log::warn!("column count 0 clamped to 1");
            cfg.column_count = 1;
        }
        if cfg.column_widths.is_empty() {
            log::warn!(
                "empty column width list; falling back to {}px",
                DEFAULT_COLUMN_WIDTH_PX
            );
            cfg.column_widths.push(DEFAULT_COLUMN_WIDTH_PX);
        }
        for width in &mut cfg.column_widths {
            if !width.is_finite() || *width < MIN_COLUMN_WIDTH_PX {
                log::warn!("column width {width} clamped to {MIN_COLUMN_WIDTH_PX}px");
                *width = MIN_COLUMN_WIDTH_PX;
            }
        }
        if !cfg.line_height.is_finite() || cfg.line_height < MIN_LINE_HEIGHT_PX {
            log::warn!(
                "line height {} clamped to {MIN_LINE_HEIGHT_PX}px",
                cfg.line_height
            );
            cfg.line_height = MIN_LINE_HEIGHT_PX;
        }
        if !cfg.column_height.is_finite() || cfg.column_height < cfg.line_height {
            log::warn!(
                "column height {} floored at one line height ({}px)",
                cfg.column_height,
                cfg.line_height
            );
            cfg.column_height = cfg.line_height;
        }
        if !cfg.fit_epsilon.is_finite() || cfg.fit_epsilon < 0.0 {
            cfg.fit_epsilon = DEFAULT_FIT_EPSILON;
        }
        cfg
    }
}

/// Deterministic pagination engine.
///
/// The engine is a pure synchronous computation: every call rebuilds the
/// whole result from the configuration, holds no state across calls, and is
/// safe to invoke concurrently as long as the installed oracle is reentrant.
#[derive(Clone)]
pub struct LayoutEngine {
    cfg: LayoutConfig,
    width_oracle: Option<Arc<dyn WidthOracle>>,
    segmentation: Option<Arc<dyn SegmentationProvider>>,
}

impl fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("cfg", &self.cfg)
            .field("has_width_oracle", &self.width_oracle.is_some())
            .field("has_segmentation_provider", &self.segmentation.is_some())
            .finish()
    }
}

impl LayoutEngine {
    /// Create an engine with the default UAX#29 segmentation provider and no
    /// width oracle installed.
    pub fn new(cfg: LayoutConfig) -> Self {
        Self {
            cfg,
            width_oracle: None,
            segmentation: Some(Arc::new(UnicodeWordProvider)),
        }
    }

    /// Install the width oracle used for all fit checks.
    pub fn with_width_oracle(mut self, oracle: Arc<dyn WidthOracle>) -> Self {
        self.width_oracle = Some(oracle);
        self
    }

    /// Install an explicit segmentation provider, or `None` to force the
    /// whitespace/grapheme fallback path.
    pub fn with_segmentation_provider(
        mut self,
        provider: Option<Arc<dyn SegmentationProvider>>,
    ) -> Self {
        self.segmentation = provider;
        self
    }

    /// The configuration this engine lays out against.
    pub fn config(&self) -> &LayoutConfig {
        &self.cfg
    }

    /// Lay out `text` into pages of packed columns.
    ///
    /// Returns a zero-page result when no width oracle is installed; callers
    /// treat that as "cannot lay out right now" rather than as a one-page
    /// empty document.
    pub fn layout(&self, text: &str) -> LayoutResult {
        let Some(oracle) = self.width_oracle.as_ref() else {
            log::warn!("layout requested without a width oracle; returning empty result");
            return LayoutResult::empty();
        };
        let cfg = self.cfg.normalized();
        let normalized = normalize_newlines(text);
        let lines: Vec<&str> = normalized.split('\n').collect();
        let last = lines.len().saturating_sub(1);

        let mut flow = FlowCursor::new();
        for (index, raw) in lines.iter().enumerate() {
            if raw.trim().is_empty() {
                // Preserve the paragraph gap unless this is the trailing
                // line of the whole document.
                if index < last {
                    flow.push_line(&cfg, Line::blank());
                }
                continue;
            }
            let tokens = segment_line(raw, self.segmentation.as_deref());
            pack_paragraph_line(&cfg, oracle.as_ref(), &tokens, &mut flow);
        }

        let result = flow.finish(&cfg);
        log::debug!(
            "laid out {} page(s), {} line(s)",
            result.pages.len(),
            result.line_count()
        );
        result
    }
}

/// Pack one paragraph line's tokens into closed lines on the flow cursor.
fn pack_paragraph_line(
    cfg: &LayoutConfig,
    oracle: &dyn WidthOracle,
    tokens: &[Token],
    flow: &mut FlowCursor,
) {
    let mut open = String::new();
    for token in tokens {
        match token {
            Token::Space => {
                if open.is_empty() {
                    continue;
                }
                let width = cfg.column_width(flow.active_column_index(cfg));
                open.push(' ');
                if oracle.measure_px(&open, &cfg.font) > width + cfg.fit_epsilon {
                    // A space is never allowed to overflow a line.
                    open.pop();
                    flow.push_line(cfg, Line::new(core::mem::take(&mut open)));
                }
            }
            Token::Word(word) => place_word(cfg, oracle, word, &mut open, flow),
        }
    }
    if !open.is_empty() {
        flow.push_line(cfg, Line::new(open));
    }
}

/// Place one non-whitespace token, closing and retrying on a fresh line at
/// most once before falling back to the oversized-token splitter.
fn place_word(
    cfg: &LayoutConfig,
    oracle: &dyn WidthOracle,
    word: &str,
    open: &mut String,
    flow: &mut FlowCursor,
) {
    for _attempt in 0..2 {
        let width = cfg.column_width(flow.active_column_index(cfg));
        let mut proposed = open.clone();
        proposed.push_str(word);
        if oracle.measure_px(&proposed, &cfg.font) <= width + cfg.fit_epsilon {
            *open = proposed;
            return;
        }
        if open.is_empty() {
            // Token alone is too wide for an empty column: split it, close
            // every piece but the last, and reopen the last piece so later
            // tokens can continue the same visual word.
            let pieces = split_to_width(word, width, oracle, &cfg.font, cfg.fit_epsilon);
            let Some((reopened, closed)) = pieces.split_last() else {
                return;
            };
            for piece in closed {
                flow.push_line(cfg, Line::new(piece.clone()));
            }
            *open = reopened.clone();
            return;
        }
        flow.push_line(cfg, Line::new(core::mem::take(open)));
    }
}

/// Break an oversized token into maximal pieces that each fit `max_width`.
///
/// Iterates by grapheme cluster. A cluster wider than `max_width` still
/// becomes its own piece, so the loop always makes forward progress; a
/// `max_width <= 0` degenerates to one cluster per piece.
fn split_to_width(
    token: &str,
    max_width: f32,
    oracle: &dyn WidthOracle,
    font: &FontSpec,
    fit_epsilon: f32,
) -> SmallVec<[String; 2]> {
    let mut pieces = SmallVec::new();
    if oracle.measure_px(token, font) <= max_width + fit_epsilon {
        pieces.push(token.to_string());
        return pieces;
    }
    let mut buffer = String::new();
    for cluster in token.graphemes(true) {
        if buffer.is_empty() {
            buffer.push_str(cluster);
            continue;
        }
        buffer.push_str(cluster);
        if oracle.measure_px(&buffer, font) > max_width + fit_epsilon {
            buffer.truncate(buffer.len() - cluster.len());
            pieces.push(core::mem::take(&mut buffer));
            buffer.push_str(cluster);
        }
    }
    if !buffer.is_empty() {
        pieces.push(buffer);
    }
    pieces
}

/// Cursor state for the column/page flow controller.
///
/// Local to a single layout call; nothing survives across invocations.
struct FlowCursor {
    pages: Vec<Page>,
    column_index: usize,
    used_height: f32,
}

impl FlowCursor {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            column_index: 0,
            used_height: 0.0,
        }
    }

    /// Index of the column the next appended line will start filling,
    /// accounting for a pending height-overflow advance.
    fn active_column_index(&self, cfg: &LayoutConfig) -> usize {
        let Some(page) = self.pages.last() else {
            return 0;
        };
        let occupied = page
            .columns
            .get(self.column_index)
            .is_some_and(|column| !column.is_empty());
        if occupied && self.would_overflow(cfg) {
            let next = self.column_index + 1;
            if next >= cfg.column_count {
                0
            } else {
                next
            }
        } else {
            self.column_index
        }
    }

    fn would_overflow(&self, cfg: &LayoutConfig) -> bool {
        self.used_height + cfg.line_height > cfg.column_height + cfg.fit_epsilon
    }

    fn push_line(&mut self, cfg: &LayoutConfig, line: Line) {
        if self.pages.is_empty() {
            self.open_page(cfg);
        }
        // Overflow checks only trigger once the column already holds a line;
        // an empty column always accepts one line even when that line alone
        // would overflow the height.
        let occupied = self
            .pages
            .last()
            .and_then(|page| page.columns.get(self.column_index))
            .is_some_and(|column| !column.is_empty());
        if occupied && self.would_overflow(cfg) {
            self.advance_column(cfg);
        }
        if let Some(column) = self
            .pages
            .last_mut()
            .and_then(|page| page.columns.get_mut(self.column_index))
        {
            column.lines.push(line);
            self.used_height += cfg.line_height;
        }
    }

    fn advance_column(&mut self, cfg: &LayoutConfig) {
        self.column_index += 1;
        self.used_height = 0.0;
        if self.column_index >= cfg.column_count {
            self.open_page(cfg);
        }
    }

    fn open_page(&mut self, cfg: &LayoutConfig) {
        self.pages.push(Page::with_column_count(cfg.column_count));
        self.column_index = 0;
        self.used_height = 0.0;
    }

    /// Normalize the accumulated pages into the final result.
    fn finish(mut self, cfg: &LayoutConfig) -> LayoutResult {
        if self.pages.is_empty() {
            self.pages.push(Page::with_column_count(cfg.column_count));
        }
        for page in &mut self.pages {
            while page.columns.len() < cfg.column_count {
                page.columns.push(Column::default());
            }
        }
        while self.pages.len() > 1 && self.pages.last().is_some_and(Page::is_empty) {
            self.pages.pop();
        }
        LayoutResult { pages: self.pages }
    }
}

fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::WidthOracle;

    /// Fixed-advance oracle: every char is `advance` px wide.
    struct FixedAdvance {
        advance: f32,
    }

    impl FixedAdvance {
        fn new(advance: f32) -> Self {
            Self { advance }
        }
    }

    impl WidthOracle for FixedAdvance {
        fn measure_px(&self, text: &str, _font: &FontSpec) -> f32 {
            text.chars().count() as f32 * self.advance
        }
    }

    fn engine(cfg: LayoutConfig, advance: f32) -> LayoutEngine {
        LayoutEngine::new(cfg).with_width_oracle(Arc::new(FixedAdvance::new(advance)))
    }

    fn column_texts(result: &LayoutResult, page: usize, column: usize) -> Vec<&str> {
        result.pages[page].columns[column]
            .lines
            .iter()
            .map(|line| line.text.as_str())
            .collect()
    }

    #[test]
    fn splitter_emits_maximal_fitting_pieces() {
        let oracle = FixedAdvance::new(1.0);
        let font = FontSpec::default();
        let pieces = split_to_width("aaaaaaaaaa", 4.0, &oracle, &font, 0.1);
        assert_eq!(pieces.as_slice(), ["aaaa", "aaaa", "aa"]);
    }

    #[test]
    fn splitter_returns_fitting_token_unchanged() {
        let oracle = FixedAdvance::new(1.0);
        let font = FontSpec::default();
        let pieces = split_to_width("abc", 10.0, &oracle, &font, 0.1);
        assert_eq!(pieces.as_slice(), ["abc"]);
    }

    #[test]
    fn splitter_makes_progress_on_degenerate_width() {
        let oracle = FixedAdvance::new(1.0);
        let font = FontSpec::default();
        let pieces = split_to_width("abcd", 0.0, &oracle, &font, 0.1);
        assert_eq!(pieces.as_slice(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn space_that_would_overflow_is_discarded() {
        // "ab cd" with width for exactly 2 chars: the space after "ab" would
        // overflow and must not survive into any line.
        let cfg = LayoutConfig::new(1, vec![2.0], 200.0, 10.0);
        let result = engine(cfg, 1.0).layout("ab cd");
        assert_eq!(column_texts(&result, 0, 0), vec!["ab", "cd"]);
    }

    #[test]
    fn word_retries_on_fresh_line_before_splitting() {
        let cfg = LayoutConfig::new(1, vec![5.0], 200.0, 10.0);
        let result = engine(cfg, 1.0).layout("ab cde");
        assert_eq!(column_texts(&result, 0, 0), vec!["ab ", "cde"]);
    }

    #[test]
    fn split_tail_is_reopened_for_following_tokens() {
        // "aaaaaa" splits at width 4 into "aaaa" + an open "aa"; the
        // following space and "b" continue on the reopened fragment.
        let cfg = LayoutConfig::new(1, vec![4.0], 200.0, 10.0);
        let result = engine(cfg, 1.0).layout("aaaaaa b");
        assert_eq!(column_texts(&result, 0, 0), vec!["aaaa", "aa b"]);
    }

    #[test]
    fn zero_column_count_is_clamped() {
        let cfg = LayoutConfig::new(0, vec![100.0], 200.0, 10.0);
        let result = engine(cfg, 1.0).layout("hi");
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.pages[0].columns.len(), 1);
    }

    #[test]
    fn empty_width_list_falls_back_to_default_width() {
        let cfg = LayoutConfig::new(2, Vec::new(), 200.0, 10.0);
        let result = engine(cfg, 1.0).layout("hello");
        assert_eq!(result.pages[0].columns.len(), 2);
        assert_eq!(column_texts(&result, 0, 0), vec!["hello"]);
    }

    #[test]
    fn column_height_floors_at_one_line_height() {
        let cfg = LayoutConfig::new(1, vec![100.0], -5.0, 10.0);
        let result = engine(cfg, 1.0).layout("one\ntwo");
        // Each column fits exactly one line after the floor.
        assert_eq!(column_texts(&result, 0, 0), vec!["one"]);
        assert_eq!(result.pages.len(), 2);
    }

    #[test]
    fn missing_oracle_yields_zero_pages() {
        let result = LayoutEngine::new(LayoutConfig::default()).layout("text");
        assert!(result.is_empty());
    }

    #[test]
    fn carriage_returns_are_normalized() {
        let cfg = LayoutConfig::new(1, vec![100.0], 200.0, 10.0);
        let result = engine(cfg, 1.0).layout("a\r\nb\rc");
        assert_eq!(column_texts(&result, 0, 0), vec!["a", "b", "c"]);
    }
}
