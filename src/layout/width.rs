//! Horizontal advance heuristics.
//!
//! The target font renders full-width glyphs (most CJK) noticeably wider than
//! Latin ones, so the cursor advances by one of two fixed steps per character.

use crate::style::Style;
use unicode_width::UnicodeWidthChar;

/// True for characters `unicode-width` draws two columns wide.
///
/// This is East Asian Wide or Fullwidth for practically all text, but the
/// crate reports terminal column width, so a handful of code points (U+2E3A
/// TWO-EM DASH, for one) count as wide without being EAW W/F.
pub fn is_full_width(c: char) -> bool {
    c.width() == Some(2)
}

/// CJK Unified Ideographs block, the range counted by the string-closing adjustment
pub fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

pub fn char_advance(c: char, style: &Style) -> f64 {
    if is_full_width(c) {
        style.wide_advance
    } else {
        style.narrow_advance
    }
}

pub fn text_advance(text: &str, style: &Style) -> f64 {
    text.chars().map(|c| char_advance(c, style)).sum()
}

/// Kerning correction subtracted from a closed string literal's advance.
///
/// Every 4 CJK ideographs give back one wide step and every 20 other
/// characters one narrow step; partial groups give back nothing.
pub fn string_close_adjustment(literal: &str, style: &Style) -> f64 {
    let cjk = literal.chars().filter(|&c| is_cjk_ideograph(c)).count();
    let other = literal.chars().count() - cjk;
    (cjk / 4) as f64 * style.wide_advance + (other / 20) as f64 * style.narrow_advance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_full_width() {
        assert!(is_full_width('中'));
        assert!(is_full_width('，'));
        assert!(is_full_width('Ａ'));
        assert!(!is_full_width('a'));
        assert!(!is_full_width(' '));
        assert!(!is_full_width('é'));
    }

    #[test]
    fn test_text_advance() {
        let style = Style::default();
        assert!(approx(text_advance("abc", &style), 3.0 * 0.009));
        assert!(approx(text_advance("中文", &style), 2.0 * 0.02));
        assert!(approx(text_advance("a中", &style), 0.009 + 0.02));
        assert!(approx(text_advance("", &style), 0.0));
    }

    #[test]
    fn test_adjustment_below_thresholds() {
        let style = Style::default();
        assert!(approx(string_close_adjustment("\"abc\"", &style), 0.0));
        assert!(approx(string_close_adjustment("'中文字'", &style), 0.0));
    }

    #[test]
    fn test_adjustment_groups() {
        let style = Style::default();
        // 4 ideographs + 2 quotes
        assert!(approx(string_close_adjustment("'中文字符'", &style), 0.02));
        // 8 ideographs + 20 others (18 letters + 2 quotes)
        let literal = format!("\"{}{}\"", "中".repeat(8), "x".repeat(18));
        assert!(approx(string_close_adjustment(&literal, &style), 2.0 * 0.02 + 0.009));
    }

    #[test]
    fn test_fullwidth_punctuation_is_not_ideograph() {
        // Wide for advance purposes, but outside the ideograph block
        assert!(is_full_width('！'));
        assert!(!is_cjk_ideograph('！'));
    }
}
