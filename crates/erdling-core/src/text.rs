use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// Text measurement capability.
///
/// Layout sizing and final rendering must go through the *same* measurer
/// instance, or box sizes and painted text drift apart. This is a correctness
/// invariant, not a style preference.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Fixed-factor measurer for tests: every char is `char_width_factor` em wide.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let font_size = style.font_size.max(1.0);
        let width = text.chars().count() as f64 * font_size * char_width_factor;
        TextMetrics {
            width,
            height: font_size * line_height_factor,
        }
    }
}

/// Production measurer backed by vendored per-character advance widths for a
/// generic sans-serif face, in em units. Wide (CJK) characters fall back to
/// `unicode-width` cells.
#[derive(Debug, Clone, Default)]
pub struct FontMetricsTextMeasurer;

impl FontMetricsTextMeasurer {
    fn advance_em(c: char) -> f64 {
        if c.is_ascii() {
            return ascii_advance_em(c as u8);
        }
        match UnicodeWidthChar::width(c) {
            Some(2) => 1.0,
            Some(0) => 0.0,
            _ => 0.6,
        }
    }
}

impl TextMeasurer for FontMetricsTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let font_size = style.font_size.max(1.0);
        let bold_factor = match style.font_weight.as_deref() {
            Some("bold") | Some("700") => 1.05,
            _ => 1.0,
        };
        let mut width = 0.0;
        for c in text.chars() {
            width += Self::advance_em(c);
        }
        TextMetrics {
            width: width * font_size * bold_factor,
            height: font_size * 1.2,
        }
    }
}

/// Advance widths for a Helvetica-like sans face, in em units.
fn ascii_advance_em(b: u8) -> f64 {
    match b {
        b' ' => 0.278,
        b'i' | b'j' | b'l' => 0.222,
        b'f' | b't' | b'I' | b'.' | b',' | b':' | b';' | b'\'' | b'|' | b'!' => 0.278,
        b'r' | b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'-' => 0.333,
        b'"' | b'`' => 0.355,
        b'm' => 0.833,
        b'w' => 0.722,
        b'M' | b'W' => 0.889,
        b'A'..=b'Z' => 0.667,
        b'0'..=b'9' | b'_' | b'$' | b'#' => 0.556,
        b'a'..=b'z' => 0.5,
        b'@' => 1.015,
        b'%' => 0.889,
        b'&' => 0.667,
        b'*' | b'^' => 0.469,
        b'+' | b'=' | b'<' | b'>' | b'~' => 0.584,
        b'/' | b'\\' => 0.278,
        b'?' => 0.556,
        _ => 0.6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_measure_scales_with_length_and_size() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle {
            font_size: 10.0,
            ..Default::default()
        };
        let short = m.measure("ab", &style);
        let long = m.measure("abcd", &style);
        assert_eq!(long.width, short.width * 2.0);
    }

    #[test]
    fn font_metrics_measure_is_monotone_in_text() {
        let m = FontMetricsTextMeasurer;
        let style = TextStyle::default();
        let a = m.measure("Employee", &style);
        let b = m.measure("Employee_Record", &style);
        assert!(b.width > a.width);
        assert!(a.width > 0.0);
    }

    #[test]
    fn wide_chars_use_unicode_cells() {
        let m = FontMetricsTextMeasurer;
        let style = TextStyle {
            font_size: 10.0,
            ..Default::default()
        };
        let cjk = m.measure("部门", &style);
        assert_eq!(cjk.width, 20.0);
    }
}
