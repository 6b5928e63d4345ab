//! Output data model: lines, columns, pages, and the layout result.
//!
//! The whole model is rebuilt from nothing on every layout invocation and is
//! never mutated after layout completes. Consumers treat [`Line`] text as an
//! opaque pre-wrapped string and must not re-wrap it.

/// One packed, already-fitted row of text within a column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    /// Rendered characters for this row; empty for a paragraph-gap row.
    pub text: String,
}

impl Line {
    /// Build a line from packed text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Blank paragraph-separator row.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Whether this row carries no rendered characters.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Vertical text container holding an ordered list of lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Column {
    /// Packed lines, top to bottom.
    pub lines: Vec<Line>,
}

impl Column {
    /// Whether the column holds no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Fixed-size collection of columns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    /// Columns in left-to-right reading order; always `column_count` entries
    /// after normalization, some possibly empty.
    pub columns: Vec<Column>,
}

impl Page {
    pub(crate) fn with_column_count(count: usize) -> Self {
        Self {
            columns: vec![Column::default(); count],
        }
    }

    /// Whether every column on this page is empty.
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Column::is_empty)
    }
}

/// Ordered page sequence produced by one layout run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutResult {
    /// Pages in reading order. At least one page on success, even for empty
    /// input; zero pages only when layout could not run at all.
    pub pages: Vec<Page>,
}

impl LayoutResult {
    /// Zero-page result signalling that layout could not run.
    ///
    /// Callers distinguish "no pages" from "one empty page" and should not
    /// display page output for the former.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this result carries no pages at all.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of packed lines across all pages.
    pub fn line_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|page| page.columns.iter())
            .map(|column| column.lines.len())
            .sum()
    }
}
