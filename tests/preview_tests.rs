use nb_student::{Style, layout_cell, preview};

/// Helper to make ANSI codes visible for snapshot comparison
fn visible_ansi(s: &str) -> String {
    // Replace ANSI escape sequences like \x1b[38;2;51;51;51m with ‹38;2;51;51;51›
    let mut result = String::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next(); // consume '['
            result.push('‹');
            while let Some(&nc) = chars.peek() {
                if nc == 'm' {
                    chars.next();
                    result.push('›');
                    break;
                }
                result.push(chars.next().unwrap());
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn first_line(source: &str) -> String {
    let style = Style::default();
    let rendered = preview::render_terminal(&layout_cell(source, &style), &style, true);
    visible_ansi(rendered.lines().next().unwrap_or_default())
}

#[test]
fn assignment() {
    insta::assert_snapshot!(first_line("x = 1"), @"‹2›  1 |‹0› ‹38;2;51;51;51›x‹0›‹38;2;51;51;51› ‹0›‹38;2;139;0;139›=‹0›‹38;2;51;51;51› ‹0›‹38;2;255;140;0›1‹0›");
}

#[test]
fn comment() {
    insta::assert_snapshot!(first_line("# 注释"), @"‹2›  1 |‹0› ‹38;2;95;158;160›# 注释‹0›");
}

#[test]
fn keyword_call_with_string() {
    insta::assert_snapshot!(first_line("print('hi')"), @"‹2›  1 |‹0› ‹38;2;65;105;225›print‹0›‹38;2;139;0;139›(‹0›‹38;2;139;0;0›'hi'‹0›‹38;2;139;0;139›)‹0›");
}

#[test]
fn gutter_numbers_every_line() {
    let style = Style::default();
    let rendered = preview::render_terminal(&layout_cell("a\nb\nc", &style), &style, false);
    let gutters: Vec<&str> = rendered.lines().map(|l| &l[..5]).collect();
    assert_eq!(gutters, vec!["  1 |", "  2 |", "  3 |"]);
}
