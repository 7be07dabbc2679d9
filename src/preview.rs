//! Terminal preview of a cell layout.
//!
//! Shows exactly the fragments and colors the image renderer would draw,
//! which makes classification problems visible without opening a PNG.

use crate::layout::CellLayout;
use crate::style::Style;

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Render with a line-number gutter, in truecolor when `color` is true
pub fn render_terminal(layout: &CellLayout, style: &Style, color: bool) -> String {
    let mut output = String::new();
    for line in &layout.lines {
        if color {
            output.push_str(&format!("{}{} |{} ", DIM, line.label, RESET));
            for fragment in &line.fragments {
                output.push_str(&fragment.class.color(style).ansi_fg());
                output.push_str(&fragment.text);
                output.push_str(RESET);
            }
        } else {
            output.push_str(&format!("{} | {}", line.label, line.text()));
        }
        output.push('\n');
    }
    output
}

/// Layout as pretty JSON, positions included
pub fn render_json(layout: &CellLayout) -> serde_json::Result<String> {
    serde_json::to_string_pretty(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout_cell;

    #[test]
    fn test_plain_gutter() {
        let layout = layout_cell("import os\n# done", &Style::default());
        assert_eq!(
            render_terminal(&layout, &Style::default(), false),
            "  1 | import os\n  2 | # done\n"
        );
    }

    #[test]
    fn test_json_fields() {
        let layout = layout_cell("x", &Style::default());
        let value: serde_json::Value = serde_json::from_str(&render_json(&layout).unwrap()).unwrap();
        let fragment = &value["lines"][0]["fragments"][0];
        assert_eq!(fragment["text"], "x");
        assert_eq!(fragment["class"], "text");
        assert_eq!(value["lines"][0]["label"], "  1");
    }
}
