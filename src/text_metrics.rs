use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use unicode_width::UnicodeWidthStr;

const EM_PX: f32 = 16.0;
pub const DEFAULT_FONT_ADVANCE: f32 = 0.6;

static FONT_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?|\.\d+)\s*(px|pt|em|rem)?\s*$").expect("valid font size regex")
});

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub size_px: f32,
    pub family: String,
}

impl Font {
    /// Parses a CSS-like font size (`12px`, `9pt`, `0.75rem`, `12`).
    pub fn parse(font_size: &str, font_family: &str) -> Result<Self> {
        let captures = FONT_SIZE
            .captures(font_size)
            .ok_or_else(|| anyhow::anyhow!("Invalid font size: {font_size}"))?;

        let value: f32 = captures[1]
            .parse()
            .with_context(|| format!("Invalid font size: {font_size}"))?;

        let size_px = match captures.get(2).map(|unit| unit.as_str()) {
            Some("pt") => value * 4.0 / 3.0,
            Some("em") | Some("rem") => value * EM_PX,
            _ => value,
        };

        Ok(Self {
            size_px,
            family: font_family.trim().to_string(),
        })
    }

    /// Family names of a CSS font list, unquoted, in preference order.
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.family
            .split(',')
            .map(|family| family.trim().trim_matches(|c: char| c == '"' || c == '\''))
            .filter(|family| !family.is_empty())
    }
}

/// Width of rendered text, in pixels.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &Font) -> f32;
}

/// Measures text as display columns times a per-family advance ratio.
#[derive(Debug, Clone)]
pub struct ColumnMeasurer {
    default_advance: f32,
    advances: HashMap<String, f32>,
}

impl Default for ColumnMeasurer {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_ADVANCE, HashMap::new())
    }
}

impl ColumnMeasurer {
    pub fn new(default_advance: f32, advances: HashMap<String, f32>) -> Self {
        let advances = advances
            .into_iter()
            .map(|(family, advance)| (family.to_ascii_lowercase(), advance))
            .collect();

        Self {
            default_advance,
            advances,
        }
    }

    fn advance_for(&self, font: &Font) -> f32 {
        font.families()
            .find_map(|family| self.advances.get(&family.to_ascii_lowercase()).copied())
            .unwrap_or(self.default_advance)
    }
}

impl TextMeasurer for ColumnMeasurer {
    fn measure(&self, text: &str, font: &Font) -> f32 {
        text.width() as f32 * font.size_px * self.advance_for(font)
    }
}

/// Number of lines `text` wraps to when broken at character boundaries.
pub fn line_count(measurer: &dyn TextMeasurer, text: &str, font: &Font, max_width: f32) -> usize {
    let mut lines = vec![String::new()];

    if measurer.measure(text, font) > max_width {
        for character in text.chars() {
            let current = lines.len() - 1;
            let mut line_text = lines[current].clone();
            line_text.push(character);

            if measurer.measure(&line_text, font) > max_width {
                lines.push(character.to_string());
            } else {
                lines[current] = line_text;
            }
        }
    }

    lines.len()
}

pub fn get_line_count(
    measurer: &dyn TextMeasurer,
    text: &str,
    font_size: &str,
    font_family: &str,
    max_width: f32,
) -> Result<usize> {
    let font = Font::parse(font_size, font_family)?;
    Ok(line_count(measurer, text, &font, max_width))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 10px wide.
    struct FixedMeasurer;

    impl TextMeasurer for FixedMeasurer {
        fn measure(&self, text: &str, _font: &Font) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    fn font() -> Font {
        Font::parse("12px", "sans-serif").unwrap()
    }

    #[test]
    fn test_parses_font_size_units() {
        assert_eq!(Font::parse("12px", "x").unwrap().size_px, 12.0);
        assert_eq!(Font::parse("12", "x").unwrap().size_px, 12.0);
        assert_eq!(Font::parse("9pt", "x").unwrap().size_px, 12.0);
        assert_eq!(Font::parse("0.75rem", "x").unwrap().size_px, 12.0);
        assert_eq!(Font::parse(" 2em ", "x").unwrap().size_px, 32.0);
    }

    #[test]
    fn test_rejects_invalid_font_size() {
        let err = Font::parse("large", "x").unwrap_err();
        assert!(err.to_string().contains("Invalid font size"));
        assert!(Font::parse("12vw", "x").is_err());
    }

    #[test]
    fn test_text_that_fits_is_one_line() {
        assert_eq!(line_count(&FixedMeasurer, "hello", &font(), 50.0), 1);
        assert_eq!(line_count(&FixedMeasurer, "", &font(), 0.0), 1);
    }

    #[test]
    fn test_wraps_at_character_boundaries() {
        assert_eq!(line_count(&FixedMeasurer, "hello world", &font(), 50.0), 3);
        assert_eq!(line_count(&FixedMeasurer, "abcdefghij", &font(), 50.0), 2);
        assert_eq!(line_count(&FixedMeasurer, "abcdefghijk", &font(), 50.0), 3);
    }

    #[test]
    fn test_character_wider_than_limit_keeps_leading_empty_line() {
        assert_eq!(line_count(&FixedMeasurer, "ab", &font(), 5.0), 3);
    }

    #[test]
    fn test_column_measurer_uses_family_advance() {
        let mut advances = HashMap::new();
        advances.insert("Courier New".to_string(), 0.5);
        let measurer = ColumnMeasurer::new(0.6, advances);

        let mono = Font::parse("10px", "\"Courier New\", monospace").unwrap();
        assert_eq!(measurer.measure("abcd", &mono), 20.0);

        let sans = Font::parse("10px", "Arial").unwrap();
        assert!((measurer.measure("abcd", &sans) - 24.0).abs() < f32::EPSILON * 32.0);
    }

    #[test]
    fn test_column_measurer_counts_wide_characters_twice() {
        let measurer = ColumnMeasurer::new(0.5, HashMap::new());
        let font = Font::parse("10px", "x").unwrap();
        assert_eq!(measurer.measure("日本", &font), 20.0);
    }

    #[test]
    fn test_get_line_count_parses_font() {
        let measurer = ColumnMeasurer::new(0.5, HashMap::new());
        // 20 columns * 10px * 0.5 = 100px wide; 40px fits 8 columns per line.
        let count = get_line_count(&measurer, "a".repeat(20).as_str(), "10px", "x", 40.0).unwrap();
        assert_eq!(count, 3);
        assert!(get_line_count(&measurer, "a", "big", "x", 40.0).is_err());
    }
}
