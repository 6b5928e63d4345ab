//! Width measurement capability consumed by the layout engine.

/// Font reference resolvable by a [`WidthOracle`].
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Family name understood by the measurement backend.
    pub family: String,
    /// Font size in device-independent pixels.
    pub size_px: f32,
}

impl FontSpec {
    /// Build a font reference.
    pub fn new(family: impl Into<String>, size_px: f32) -> Self {
        Self {
            family: family.into(),
            size_px,
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "serif".to_string(),
            size_px: 16.0,
        }
    }
}

/// Measurement hook returning the rendered width of a string.
///
/// Must be consistent: the same `(text, font)` pair always yields the same
/// width, otherwise layout output is not reproducible. Implementations hold
/// no per-call state, so one oracle may serve concurrent layout runs.
pub trait WidthOracle: Send + Sync {
    /// Rendered width of `text` under `font`, in device-independent pixels.
    fn measure_px(&self, text: &str, font: &FontSpec) -> f32;
}

/// Dependency-free width oracle using per-glyph-class em widths.
///
/// Stable across font sizes and families without a font stack; useful as a
/// default oracle for tests and headless callers. Backends with real glyph
/// metrics should supply their own [`WidthOracle`] instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicWidthOracle;

impl WidthOracle for HeuristicWidthOracle {
    fn measure_px(&self, text: &str, font: &FontSpec) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let family = font.family.to_ascii_lowercase();
        let proportional = !(family.contains("mono") || family.contains("fixed"));
        let mut em_sum = 0.0f32;
        if proportional {
            for ch in text.chars() {
                em_sum += proportional_glyph_em_width(ch);
            }
        } else {
            // Fixed-width fallback still uses a small class delta for spaces.
            for ch in text.chars() {
                em_sum += if ch == ' ' { 0.52 } else { 0.58 };
            }
        }

        let family_scale = if family.contains("serif") {
            1.03
        } else if family.contains("sans") {
            0.99
        } else {
            1.00
        };
        em_sum * font.size_px * family_scale
    }
}

fn proportional_glyph_em_width(ch: char) -> f32 {
    match ch {
        ' ' => 0.32,
        '\t' => 1.28,
        '\u{00A0}' => 0.32,
        'i' | 'l' | 'I' | '|' | '!' => 0.24,
        '.' | ',' | ':' | ';' | '\'' | '"' | '`' => 0.23,
        '-' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => 0.34,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
        'f' | 't' | 'j' | 'r' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
        c if c.is_ascii_digit() => 0.52,
        c if c.is_ascii_uppercase() => 0.64,
        c if c.is_ascii_lowercase() => 0.52,
        c if c.is_whitespace() => 0.32,
        c if c.is_ascii_punctuation() => 0.42,
        _ => 0.56,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_measures_zero() {
        let oracle = HeuristicWidthOracle;
        assert_eq!(oracle.measure_px("", &FontSpec::default()), 0.0);
    }

    #[test]
    fn longer_text_measures_wider() {
        let oracle = HeuristicWidthOracle;
        let font = FontSpec::default();
        let short = oracle.measure_px("word", &font);
        let long = oracle.measure_px("word word word", &font);
        assert!(long > short);
    }

    #[test]
    fn width_scales_with_font_size() {
        let oracle = HeuristicWidthOracle;
        let small = oracle.measure_px("sample", &FontSpec::new("serif", 12.0));
        let large = oracle.measure_px("sample", &FontSpec::new("serif", 24.0));
        assert!((large / small - 2.0).abs() < 1e-3);
    }

    #[test]
    fn monospace_family_uses_fixed_advances() {
        let oracle = HeuristicWidthOracle;
        let font = FontSpec::new("mono", 16.0);
        let narrow = oracle.measure_px("iii", &font);
        let wide = oracle.measure_px("mmm", &font);
        assert_eq!(narrow, wide);
    }
}
