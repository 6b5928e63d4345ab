//! Backend-agnostic positioning for `pageflow` layout results.
//!
//! This crate turns a [`LayoutResult`] into per-page draw-command streams
//! with absolute coordinates. It contains no layout logic: lines are opaque
//! pre-wrapped strings and are never re-wrapped here.

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

use pageflow::{LayoutConfig, LayoutResult};

/// Positioned text run for one packed line.
#[derive(Clone, Debug, PartialEq)]
pub struct TextCommand {
    /// Left edge of the run.
    pub x: f32,
    /// Baseline y-coordinate.
    pub baseline_y: f32,
    /// Opaque pre-wrapped line text.
    pub text: String,
}

/// Vertical rule drawn in the gap between adjacent columns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleCommand {
    /// Rule x-coordinate.
    pub x: f32,
    /// Top y-coordinate.
    pub y: f32,
    /// Rule length downward from `y`.
    pub length: f32,
}

/// Page chrome (footer page label).
#[derive(Clone, Debug, PartialEq)]
pub struct PageChromeCommand {
    /// Left edge of the label.
    pub x: f32,
    /// Baseline y-coordinate of the label.
    pub baseline_y: f32,
    /// Label text.
    pub text: String,
}

/// Backend-agnostic draw command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// One positioned line of body text.
    Text(TextCommand),
    /// Column separator rule.
    Rule(RuleCommand),
    /// Page chrome label.
    PageChrome(PageChromeCommand),
}

/// Page represented as positioned draw commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderPage {
    /// 1-based page number.
    pub page_number: usize,
    /// Overall page width including margins and gaps.
    pub width: f32,
    /// Overall page height including margins.
    pub height: f32,
    /// Draw commands in paint order.
    pub commands: Vec<DrawCommand>,
}

impl RenderPage {
    /// Positioned body-text commands only.
    pub fn text_commands(&self) -> impl Iterator<Item = &TextCommand> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }
}

/// Presentation geometry for positioning pages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceConfig {
    /// Left margin.
    pub margin_left: f32,
    /// Top margin.
    pub margin_top: f32,
    /// Bottom margin reserved under the columns.
    pub margin_bottom: f32,
    /// Horizontal gap between adjacent columns.
    pub column_gap_px: f32,
    /// Draw a vertical rule centered in each column gap.
    pub column_rules: bool,
    /// Emit a "Page N" footer label.
    pub footer_enabled: bool,
    /// Ascent as a fraction of the font size, used to place baselines.
    pub baseline_ratio: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            margin_left: 32.0,
            margin_top: 48.0,
            margin_bottom: 40.0,
            column_gap_px: 24.0,
            column_rules: false,
            footer_enabled: false,
            baseline_ratio: 0.78,
        }
    }
}

/// Position every page of `result` into draw commands.
///
/// Column x-offsets accumulate the per-position widths from `layout`
/// (cycled like the engine cycles them), so pages with custom width lists
/// render with the same geometry the packer fit against.
pub fn position_pages(
    result: &LayoutResult,
    layout: &LayoutConfig,
    surface: &SurfaceConfig,
) -> Vec<RenderPage> {
    let column_count = layout.column_count.max(1);
    let ascent = (layout.font.size_px * surface.baseline_ratio).min(layout.line_height);
    let columns_width: f32 = (0..column_count).map(|idx| layout.column_width(idx)).sum();
    let gaps_width = surface.column_gap_px * column_count.saturating_sub(1) as f32;
    let page_width = surface.margin_left * 2.0 + columns_width + gaps_width;
    let page_height = surface.margin_top + layout.column_height + surface.margin_bottom;

    let mut pages = Vec::with_capacity(result.pages.len());
    for (page_index, page) in result.pages.iter().enumerate() {
        let mut commands = Vec::with_capacity(8);
        let mut x = surface.margin_left;
        for (column_index, column) in page.columns.iter().enumerate() {
            let column_width = layout.column_width(column_index);
            let mut baseline_y = surface.margin_top + ascent;
            for line in &column.lines {
                if !line.is_blank() {
                    commands.push(DrawCommand::Text(TextCommand {
                        x,
                        baseline_y,
                        text: line.text.clone(),
                    }));
                }
                baseline_y += layout.line_height;
            }
            if surface.column_rules && column_index + 1 < page.columns.len() {
                commands.push(DrawCommand::Rule(RuleCommand {
                    x: x + column_width + surface.column_gap_px / 2.0,
                    y: surface.margin_top,
                    length: layout.column_height,
                }));
            }
            x += column_width + surface.column_gap_px;
        }
        if surface.footer_enabled {
            commands.push(DrawCommand::PageChrome(PageChromeCommand {
                x: surface.margin_left,
                baseline_y: surface.margin_top + layout.column_height + surface.margin_bottom / 2.0,
                text: format!("Page {}", page_index + 1),
            }));
        }
        pages.push(RenderPage {
            page_number: page_index + 1,
            width: page_width,
            height: page_height,
            commands,
        });
    }
    log::debug!("positioned {} page(s)", pages.len());
    pages
}
