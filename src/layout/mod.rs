//! Line tokenizer and layout engine.
//!
//! Each line of a code cell is scanned once, left to right, by a two-state
//! machine (normal / inside a string). Maximal runs of characters are
//! classified into a [`TokenClass`] and placed at the running horizontal
//! cursor. This is a heuristic highlighter, not a lexer: escaped quotes are
//! not recognised and close the literal they appear in.

pub mod width;

use crate::style::{Color, Style};
use serde::Serialize;
use std::fmt::Write;

pub use width::{char_advance, is_full_width, string_close_adjustment, text_advance};

/// Color class of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Comment,
    String,
    Keyword,
    Number,
    Operator,
    /// Identifiers and any other text
    Text,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Comment => "comment",
            TokenClass::String => "string",
            TokenClass::Keyword => "keyword",
            TokenClass::Number => "number",
            TokenClass::Operator => "operator",
            TokenClass::Text => "text",
        }
    }

    pub fn color(&self, style: &Style) -> Color {
        let palette = &style.palette;
        match self {
            TokenClass::Comment => palette.comment,
            TokenClass::String => palette.string,
            TokenClass::Keyword => palette.keyword,
            TokenClass::Number => palette.number,
            TokenClass::Operator => palette.operator,
            TokenClass::Text => palette.text,
        }
    }
}

/// One positioned run of text. Coordinates are in axes units, `y` is the top edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub class: TokenClass,
}

/// Draw instructions for one source line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineLayout {
    /// 1-based
    pub line_number: usize,
    pub y: f64,
    /// Right-aligned line number, drawn at `style.line_number_x`
    pub label: String,
    pub fragments: Vec<Fragment>,
    /// Cursor position after the last fragment
    pub cursor: f64,
}

impl LineLayout {
    /// Concatenated fragment text; always equal to the source line.
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

/// Draw instructions for every line of a code cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellLayout {
    pub lines: Vec<LineLayout>,
}

impl CellLayout {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Top edge of a line, so that a cell of any length fits the unit-height canvas.
pub fn vertical_position(line_number: usize, total_lines: usize, factor: f64) -> f64 {
    1.0 - line_number as f64 / (total_lines + 1) as f64 * factor
}

/// Lay out a whole cell. The source is split on `'\n'` exactly, so a trailing
/// newline produces a trailing empty line.
pub fn layout_cell(source: &str, style: &Style) -> CellLayout {
    let lines: Vec<&str> = source.split('\n').collect();
    let total = lines.len();
    CellLayout {
        lines: lines
            .iter()
            .enumerate()
            .map(|(i, line)| layout_line(line, i + 1, total, style))
            .collect(),
    }
}

pub fn layout_line(line: &str, line_number: usize, total_lines: usize, style: &Style) -> LineLayout {
    let y = vertical_position(line_number, total_lines, style.line_height_factor);
    let mut scanner = LineScanner::new(y, style);

    if line.trim_start().starts_with('#') {
        scanner.emit(line, TokenClass::Comment);
    } else {
        for c in line.chars() {
            scanner.feed(c);
        }
        scanner.finish();
    }

    LineLayout {
        line_number,
        y,
        label: format!("{:>3}", line_number),
        cursor: scanner.cursor,
        fragments: scanner.fragments,
    }
}

/// ASCII and fullwidth decimal digits. Vulgar fractions, roman numerals and
/// other numeric symbols are words, not numbers.
fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('\u{ff10}'..='\u{ff19}').contains(&c)
}

fn is_number(word: &str) -> bool {
    !word.is_empty() && word.chars().all(is_digit)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Scanner state for a single line
struct LineScanner<'a> {
    style: &'a Style,
    y: f64,
    cursor: f64,
    word: String,
    /// Opening quote of the string being scanned
    quote: Option<char>,
    fragments: Vec<Fragment>,
}

impl<'a> LineScanner<'a> {
    fn new(y: f64, style: &'a Style) -> Self {
        Self {
            style,
            y,
            cursor: style.left_margin,
            word: String::new(),
            quote: None,
            fragments: Vec::new(),
        }
    }

    fn feed(&mut self, c: char) {
        match self.quote {
            Some(quote) => {
                self.word.push(c);
                if c == quote {
                    self.close_string();
                }
            }
            None if c == '"' || c == '\'' => {
                self.flush_word(false);
                self.quote = Some(c);
                self.word.push(c);
            }
            None if is_word_char(c) => self.word.push(c),
            None => {
                self.flush_word(true);
                let class = if self.style.is_operator(c) {
                    TokenClass::Operator
                } else {
                    TokenClass::Text
                };
                let mut buf = [0u8; 4];
                self.emit(c.encode_utf8(&mut buf), class);
            }
        }
    }

    fn finish(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let class = match self.word_class(true) {
            TokenClass::Text if self.quote.is_some() => TokenClass::String,
            class => class,
        };
        let word = std::mem::take(&mut self.word);
        self.emit(&word, class);
        self.quote = None;
    }

    /// Numbers are only recognised when `numbers` is set; a word cut short by
    /// an opening quote is never colored as a number.
    fn word_class(&self, numbers: bool) -> TokenClass {
        if numbers && is_number(&self.word) {
            TokenClass::Number
        } else if self.style.is_keyword(&self.word) {
            TokenClass::Keyword
        } else {
            TokenClass::Text
        }
    }

    fn flush_word(&mut self, numbers: bool) {
        if self.word.is_empty() {
            return;
        }
        let class = self.word_class(numbers);
        let word = std::mem::take(&mut self.word);
        self.emit(&word, class);
    }

    fn close_string(&mut self) {
        let literal = std::mem::take(&mut self.word);
        self.emit(&literal, TokenClass::String);
        self.cursor -= string_close_adjustment(&literal, self.style);
        self.quote = None;
    }

    fn emit(&mut self, text: &str, class: TokenClass) {
        self.fragments.push(Fragment {
            x: self.cursor,
            y: self.y,
            text: text.to_string(),
            class,
        });
        self.cursor += text_advance(text, self.style);
    }
}

/// Stable textual dump of a cell layout, one fragment per line.
pub fn dump_cell(layout: &CellLayout) -> String {
    let mut out = String::new();
    for line in &layout.lines {
        for fragment in &line.fragments {
            let _ = writeln!(
                out,
                "{:>3} {:<8} {:?}",
                line.line_number,
                fragment.class.as_str(),
                fragment.text
            );
        }
    }
    out
}
