//! Export pipeline for `pageflow` layout results.
//!
//! Two consumers of the same [`LayoutResult`]: a versioned JSON document
//! envelope for portable storage, and rasterized page images for previewing.
//! Both treat lines as opaque pre-wrapped strings; nothing here re-wraps.

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

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use pageflow::{Column, LayoutConfig, LayoutResult, Line, Page};
use pageflow_embedded_graphics::{render_page, Framebuffer};
use pageflow_render::{position_pages, SurfaceConfig};

const DOCUMENT_SCHEMA_VERSION: u8 = 1;

/// Persisted document envelope.
///
/// The envelope carries a schema version; decoding a payload with an
/// unknown version yields `None` instead of a partially-decoded document.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct PersistedDocument {
    version: u8,
    pages: Vec<PersistedPage>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PersistedPage {
    columns: Vec<Vec<String>>,
}

impl PersistedDocument {
    fn from_result(result: &LayoutResult) -> Self {
        Self {
            version: DOCUMENT_SCHEMA_VERSION,
            pages: result
                .pages
                .iter()
                .map(|page| PersistedPage {
                    columns: page
                        .columns
                        .iter()
                        .map(|column| {
                            column
                                .lines
                                .iter()
                                .map(|line| line.text.clone())
                                .collect()
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn into_result(self) -> Option<LayoutResult> {
        if self.version != DOCUMENT_SCHEMA_VERSION {
            return None;
        }
        Some(LayoutResult {
            pages: self
                .pages
                .into_iter()
                .map(|page| Page {
                    columns: page
                        .columns
                        .into_iter()
                        .map(|lines| Column {
                            lines: lines.into_iter().map(Line::new).collect(),
                        })
                        .collect(),
                })
                .collect(),
        })
    }
}

/// Serialize a layout result into the versioned JSON document format.
pub fn document_to_json(result: &LayoutResult) -> Option<String> {
    serde_json::to_string(&PersistedDocument::from_result(result)).ok()
}

/// Decode a JSON document back into a layout result.
///
/// Returns `None` on malformed payloads or a schema-version mismatch.
pub fn document_from_json(json: &str) -> Option<LayoutResult> {
    let envelope: PersistedDocument = serde_json::from_str(json).ok()?;
    envelope.into_result()
}

/// One rasterized page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageImage {
    /// 1-based page number.
    pub page_number: usize,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Binary PGM (P5) payload.
    pub pgm: Vec<u8>,
}

/// Rasterize every page of `result` into PGM page images.
pub fn rasterize_pages(
    result: &LayoutResult,
    layout: &LayoutConfig,
    surface: &SurfaceConfig,
) -> Vec<PageImage> {
    let rendered = position_pages(result, layout, surface);
    let mut images = Vec::with_capacity(rendered.len());
    for page in &rendered {
        let width = page.width.ceil().max(1.0) as u32;
        let height = page.height.ceil().max(1.0) as u32;
        let mut framebuffer = Framebuffer::new(width, height);
        // Framebuffer rendering is infallible.
        let _ = render_page(page, layout.font.size_px, &mut framebuffer);
        images.push(PageImage {
            page_number: page.page_number,
            width,
            height,
            pgm: encode_pgm(&framebuffer),
        });
    }
    images
}

/// Base64 data URL for one rasterized page.
pub fn page_image_data_url(image: &PageImage) -> String {
    let mut url = String::with_capacity(image.pgm.len() * 4 / 3 + 48);
    url.push_str("data:image/x-portable-graymap;base64,");
    BASE64.encode_string(&image.pgm, &mut url);
    url
}

fn encode_pgm(framebuffer: &Framebuffer) -> Vec<u8> {
    let header = format!(
        "P5\n{} {}\n255\n",
        framebuffer.width(),
        framebuffer.height()
    );
    let mut out = Vec::with_capacity(header.len() + framebuffer.luma_bytes().len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(framebuffer.luma_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pageflow::{FontSpec, LayoutEngine};
    use pageflow_embedded_graphics::MonoWidthOracle;

    fn sample_result() -> (LayoutResult, LayoutConfig) {
        let cfg = LayoutConfig::new(2, vec![120.0, 120.0], 200.0, 20.0)
            .with_font(FontSpec::new("mono", 16.0));
        let engine = LayoutEngine::new(cfg.clone()).with_width_oracle(Arc::new(MonoWidthOracle));
        (engine.layout("first paragraph\n\nsecond paragraph"), cfg)
    }

    #[test]
    fn document_round_trips_through_json() {
        let (result, _) = sample_result();
        let json = document_to_json(&result).unwrap();
        let decoded = document_from_json(&json).unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let (result, _) = sample_result();
        let json = document_to_json(&result).unwrap();
        let bumped = json.replacen("\"version\":1", "\"version\":9", 1);
        assert!(document_from_json(&bumped).is_none());
    }

    #[test]
    fn malformed_payload_is_rejected() {
        assert!(document_from_json("{not json").is_none());
    }

    #[test]
    fn rasterized_pages_carry_pgm_payloads() {
        let (result, cfg) = sample_result();
        let images = rasterize_pages(&result, &cfg, &SurfaceConfig::default());
        assert_eq!(images.len(), result.pages.len());
        let first = &images[0];
        assert!(first.pgm.starts_with(b"P5\n"));
        assert!(first.pgm.iter().any(|&px| px == 0x00));
    }

    #[test]
    fn data_url_is_base64_pgm() {
        let (result, cfg) = sample_result();
        let images = rasterize_pages(&result, &cfg, &SurfaceConfig::default());
        let url = page_image_data_url(&images[0]);
        assert!(url.starts_with("data:image/x-portable-graymap;base64,"));
    }
}
