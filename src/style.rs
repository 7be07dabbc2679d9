//! Visual style shared by the layout engine and the renderers.
//!
//! A [`Style`] is built once (from defaults or a JSON file) and passed by
//! reference everywhere it is needed.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// An opaque RGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b])
    }

    /// ANSI truecolor foreground escape for this color
    pub fn ansi_fg(&self) -> String {
        let [r, g, b] = self.0;
        format!("\x1b[38;2;{};{};{}m", r, g, b)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| Error::InvalidColor(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::InvalidColor(s.to_string()))
        };
        Ok(Color([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Color table, one entry per token class plus page chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub line_number: Color,
    pub comment: Color,
    pub keyword: Color,
    pub operator: Color,
    pub string: Color,
    pub number: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xf5, 0xf5, 0xf5),
            text: Color::rgb(0x33, 0x33, 0x33),
            line_number: Color::rgb(0x88, 0x88, 0x88),
            comment: Color::rgb(0x5f, 0x9e, 0xa0),
            keyword: Color::rgb(0x41, 0x69, 0xe1),
            operator: Color::rgb(0x8b, 0x00, 0x8b),
            string: Color::rgb(0x8b, 0x00, 0x00),
            number: Color::rgb(0xff, 0x8c, 0x00),
        }
    }
}

/// Reserved words highlighted as keywords (exact, case-sensitive match)
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "print", "raise",
    "return", "try", "while", "with", "yield",
];

/// Single characters drawn in the operator color
pub const DEFAULT_OPERATORS: &[char] = &['=', '+', '-', '*', ':', '(', ')', '[', ']', '.'];

/// Everything the layout engine and renderer read.
///
/// Horizontal and vertical positions are in axes units (0..1); sizes on the
/// page are in inches or points as noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub palette: Palette,
    pub keywords: Vec<String>,
    pub operators: Vec<char>,
    /// Font size in points
    pub font_size: f32,
    /// Cursor position at the start of every line
    pub left_margin: f64,
    /// Horizontal position of the line-number label
    pub line_number_x: f64,
    /// Horizontal position of the vertical rule between gutter and code
    pub gutter_x: f64,
    /// Width of the gutter rule in points
    pub gutter_width: f32,
    /// Advance of a full-width (East Asian Wide/Fullwidth) character
    pub wide_advance: f64,
    /// Advance of any other character
    pub narrow_advance: f64,
    /// >1 spreads lines apart, <1 packs them together
    pub line_height_factor: f64,
    pub dpi: u32,
    /// Page width in inches
    pub page_width: f64,
    /// Page height contributed by each line, in inches
    pub line_height: f64,
    /// Page height added on top of the lines, in inches
    pub page_padding: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            operators: DEFAULT_OPERATORS.to_vec(),
            font_size: 13.0,
            left_margin: 0.06,
            line_number_x: 0.01,
            gutter_x: 0.05,
            gutter_width: 0.5,
            wide_advance: 0.02,
            narrow_advance: 0.009,
            line_height_factor: 1.0,
            dpi: 300,
            page_width: 12.0,
            line_height: 0.2,
            page_padding: 0.3,
        }
    }
}

impl Style {
    /// Load a style from a JSON file. Missing fields keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| Error::json(path, e))
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.iter().any(|k| k == word)
    }

    pub fn is_operator(&self, c: char) -> bool {
        self.operators.contains(&c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!("#4169E1".parse::<Color>().unwrap(), Color::rgb(0x41, 0x69, 0xe1));
        assert_eq!("#f5f5f5".parse::<Color>().unwrap().to_string(), "#f5f5f5");
    }

    #[test]
    fn test_color_rejects_malformed() {
        assert!("4169E1".parse::<Color>().is_err());
        assert!("#4169E".parse::<Color>().is_err());
        assert!("#zz69E1".parse::<Color>().is_err());
        assert!("#é169E".parse::<Color>().is_err());
    }

    #[test]
    fn test_keywords_are_exact() {
        let style = Style::default();
        assert!(style.is_keyword("import"));
        assert!(style.is_keyword("print"));
        assert!(!style.is_keyword("imported"));
        assert!(!style.is_keyword("Import"));
    }

    #[test]
    fn test_operators() {
        let style = Style::default();
        for c in "=+-*:()[].".chars() {
            assert!(style.is_operator(c), "{c} should be an operator");
        }
        assert!(!style.is_operator(','));
        assert!(!style.is_operator('/'));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let style: Style = serde_json::from_str(
            r##"{"font_size": 11, "palette": {"keyword": "#000000"}, "keywords": ["fn"]}"##,
        )
        .unwrap();
        assert_eq!(style.font_size, 11.0);
        assert_eq!(style.palette.keyword, Color::rgb(0, 0, 0));
        assert_eq!(style.palette.string, Palette::default().string);
        assert!(style.is_keyword("fn"));
        assert!(!style.is_keyword("import"));
        assert_eq!(style.dpi, 300);
    }

    #[test]
    fn test_invalid_color_in_json() {
        let err = serde_json::from_str::<Style>(r#"{"palette": {"text": "black"}}"#).unwrap_err();
        assert!(err.to_string().contains("invalid color"));
    }
}
