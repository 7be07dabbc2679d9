mod png;

pub use png::PngRenderer;

use crate::error::Result;
use crate::layout::CellLayout;
use crate::style::Style;
use std::path::Path;

/// Turns a laid-out cell into an image file
pub trait CellRenderer {
    fn render(&mut self, layout: &CellLayout, style: &Style, path: &Path) -> Result<()>;
}

/// Axes rectangle inside the page, as fractions of the page width
const AXES_LEFT: f64 = 0.01;
const AXES_RIGHT: f64 = 0.99;

/// Page size of a rendered cell and the mapping from axes units to pixels.
///
/// The axes span the full page height and `AXES_LEFT..AXES_RIGHT` of its width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Inches
    pub width: f64,
    /// Inches
    pub height: f64,
    pub dpi: u32,
}

impl PageGeometry {
    pub fn for_lines(line_count: usize, style: &Style) -> Self {
        Self {
            width: style.page_width,
            height: (line_count as f64 * style.line_height).max(0.0) + style.page_padding,
            dpi: style.dpi,
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.width * dpi).round().max(1.0) as u32,
            (self.height * dpi).round().max(1.0) as u32,
        )
    }

    /// Axes coordinates to pixel coordinates (origin top-left)
    pub fn to_pixels(&self, x: f64, y: f64) -> (f32, f32) {
        let (w, h) = self.pixel_size();
        let px = w as f64 * (AXES_LEFT + (AXES_RIGHT - AXES_LEFT) * x);
        let py = h as f64 * (1.0 - y);
        (px as f32, py as f32)
    }

    /// Convert a length in points to pixels
    pub fn points(&self, pt: f32) -> f32 {
        pt * self.dpi as f32 / 72.0
    }
}
