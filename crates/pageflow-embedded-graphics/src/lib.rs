//! embedded-graphics renderer for `pageflow-render` pages.
//!
//! Provides a mono-font table keyed by font size, a [`MonoWidthOracle`] so
//! the layout engine fits lines against the same advances this backend
//! draws with, an owned [`Framebuffer`] draw target, and a page rasterizer.

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

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X9, FONT_7X14, FONT_8X13, FONT_9X18},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line as RuleLine, PrimitiveStyle},
    text::{Baseline, Text},
};
use pageflow::{FontSpec, WidthOracle};
use pageflow_render::{DrawCommand, RenderPage};

/// Pick the mono face whose nominal height best matches `size_px`.
pub fn select_font(size_px: f32) -> &'static MonoFont<'static> {
    if size_px < 11.0 {
        &FONT_6X9
    } else if size_px < 14.0 {
        &FONT_8X13
    } else if size_px < 17.0 {
        &FONT_7X14
    } else if size_px < 20.0 {
        &FONT_9X18
    } else {
        &FONT_10X20
    }
}

/// Backend metrics for a selected face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontMetrics {
    /// Horizontal advance per character.
    pub char_width: i32,
    /// Glyph cell height.
    pub line_height: i32,
}

/// Metrics of the face selected for `size_px`.
pub fn font_metrics(size_px: f32) -> FontMetrics {
    let font = select_font(size_px);
    FontMetrics {
        char_width: (font.character_size.width + font.character_spacing) as i32,
        line_height: font.character_size.height as i32,
    }
}

/// Width oracle backed by this backend's mono-font advances.
///
/// Measurement and rasterization share one advance table, so lines fitted by
/// the engine through this oracle never overflow when drawn here.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonoWidthOracle;

impl WidthOracle for MonoWidthOracle {
    fn measure_px(&self, text: &str, font: &FontSpec) -> f32 {
        let metrics = font_metrics(font.size_px);
        text.chars().count() as f32 * metrics.char_width as f32
    }
}

/// Owned monochrome draw target with one luma byte per pixel.
///
/// Background is white (0xff); ink pixels are written as 0x00.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Create a white framebuffer of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0xff; (width as usize) * (height as usize)],
        }
    }

    /// Framebuffer width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Framebuffer height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major luma bytes (0x00 ink, 0xff background).
    pub fn luma_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether the pixel at `(x, y)` carries ink.
    pub fn is_inked(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[(y as usize) * (self.width as usize) + x as usize] == 0x00
    }

    /// Number of ink pixels in the buffer.
    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|&&px| px == 0x00).count()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x >= self.width || y >= self.height {
                continue;
            }
            let luma = match color {
                BinaryColor::On => 0x00,
                BinaryColor::Off => 0xff,
            };
            self.pixels[(y as usize) * (self.width as usize) + x as usize] = luma;
        }
        Ok(())
    }
}

/// Rasterize one positioned page into a binary draw target.
///
/// `size_px` selects the mono face for both body text and chrome labels.
pub fn render_page<D>(page: &RenderPage, size_px: f32, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let font = select_font(size_px);
    let style = MonoTextStyle::new(font, BinaryColor::On);
    for command in &page.commands {
        match command {
            DrawCommand::Text(text) => {
                Text::with_baseline(
                    &text.text,
                    Point::new(text.x.round() as i32, text.baseline_y.round() as i32),
                    style,
                    Baseline::Alphabetic,
                )
                .draw(target)?;
            }
            DrawCommand::Rule(rule) => {
                let top = Point::new(rule.x.round() as i32, rule.y.round() as i32);
                let bottom = Point::new(
                    rule.x.round() as i32,
                    (rule.y + rule.length).round() as i32,
                );
                RuleLine::new(top, bottom)
                    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
                    .draw(target)?;
            }
            DrawCommand::PageChrome(chrome) => {
                Text::with_baseline(
                    &chrome.text,
                    Point::new(chrome.x.round() as i32, chrome.baseline_y.round() as i32),
                    style,
                    Baseline::Alphabetic,
                )
                .draw(target)?;
            }
        }
    }
    log::debug!("rasterized page {}", page.page_number);
    Ok(())
}
