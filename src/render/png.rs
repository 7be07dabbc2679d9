use super::{CellRenderer, PageGeometry};
use crate::error::{Error, Result};
use crate::layout::CellLayout;
use crate::style::{Color, Style};
use fontdue::{Font, FontSettings};
use image::{Rgb, RgbImage};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fonts probed by [`PngRenderer::discover`], monospace first, then CJK fallbacks
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Menlo.ttc",
    "C:\\Windows\\Fonts\\consola.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
];

/// Rasterizes cells with fontdue and writes them as PNG.
///
/// Glyphs come from the first font in the chain that has them, so a Latin
/// monospace font can be paired with a CJK fallback.
pub struct PngRenderer {
    fonts: Vec<Font>,
    missing: HashSet<char>,
}

impl PngRenderer {
    pub fn new(fonts: Vec<Font>) -> Result<Self> {
        if fonts.is_empty() {
            return Err(Error::NoFont);
        }
        Ok(Self {
            fonts,
            missing: HashSet::new(),
        })
    }

    /// Load an explicit font chain. Any unreadable font is an error.
    pub fn from_paths(paths: &[PathBuf]) -> Result<Self> {
        let fonts = paths
            .iter()
            .map(|path| load_font(path))
            .collect::<Result<Vec<_>>>()?;
        Self::new(fonts)
    }

    /// Load every well-known system font that exists and parses.
    pub fn discover() -> Result<Self> {
        let mut fonts = Vec::new();
        for candidate in FONT_CANDIDATES {
            let path = Path::new(candidate);
            if !path.is_file() {
                continue;
            }
            match load_font(path) {
                Ok(font) => {
                    debug!(font = %path.display(), "loaded system font");
                    fonts.push(font);
                }
                Err(e) => warn!("skipping font: {}", e),
            }
        }
        Self::new(fonts)
    }

    fn font_for(&mut self, c: char) -> &Font {
        let index = self
            .fonts
            .iter()
            .position(|f| f.lookup_glyph_index(c) != 0)
            .unwrap_or_else(|| {
                if !c.is_whitespace() && self.missing.insert(c) {
                    warn!("no loaded font has a glyph for {:?}", c);
                }
                0
            });
        &self.fonts[index]
    }

    /// Draw `text` with its top edge at `top`, starting at `left` (pixels).
    fn draw_text(&mut self, img: &mut RgbImage, text: &str, left: f32, top: f32, px: f32, color: Color) {
        let ascent = self.fonts[0]
            .horizontal_line_metrics(px)
            .map_or(px * 0.8, |m| m.ascent);
        let baseline = (top + ascent).round() as i64;
        let mut pen = left;

        for c in text.chars() {
            let (metrics, bitmap) = self.font_for(c).rasterize(c, px);
            let glyph_left = pen.round() as i64 + metrics.xmin as i64;
            let glyph_top = baseline - metrics.height as i64 - metrics.ymin as i64;

            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let coverage = bitmap[row * metrics.width + col];
                    if coverage > 0 {
                        blend(img, glyph_left + col as i64, glyph_top + row as i64, color, coverage);
                    }
                }
            }
            pen += metrics.advance_width;
        }
    }
}

impl CellRenderer for PngRenderer {
    fn render(&mut self, layout: &CellLayout, style: &Style, path: &Path) -> Result<()> {
        let page = PageGeometry::for_lines(layout.line_count(), style);
        let (width, height) = page.pixel_size();
        let palette = &style.palette;
        let mut img = RgbImage::from_pixel(width, height, Rgb(palette.background.0));

        let (rule_x, _) = page.to_pixels(style.gutter_x, 0.0);
        let rule_width = page.points(style.gutter_width).round().max(1.0) as i64;
        let rule_left = rule_x.round() as i64 - rule_width / 2;
        for x in rule_left..rule_left + rule_width {
            for y in 0..height as i64 {
                blend(&mut img, x, y, palette.line_number, 255);
            }
        }

        let px = page.points(style.font_size);
        for line in &layout.lines {
            let (left, top) = page.to_pixels(style.line_number_x, line.y);
            self.draw_text(&mut img, &line.label, left, top, px, palette.line_number);
            for fragment in &line.fragments {
                let (left, top) = page.to_pixels(fragment.x, fragment.y);
                self.draw_text(&mut img, &fragment.text, left, top, px, fragment.class.color(style));
            }
        }

        debug!(path = %path.display(), width, height, lines = layout.line_count(), "rendered cell");
        write_png(&img, page.dpi, path)
    }
}

/// Encode `img` as RGB PNG with a pHYs chunk recording `dpi`.
fn write_png(img: &RgbImage, dpi: u32, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let image_error = |source| Error::Image {
        path: path.to_path_buf(),
        source,
    };

    let mut encoder = png::Encoder::new(BufWriter::new(file), img.width(), img.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let per_meter = (dpi as f64 / 0.0254).round() as u32;
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: per_meter,
        yppu: per_meter,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header().map_err(image_error)?;
    writer.write_image_data(img.as_raw()).map_err(image_error)?;
    writer.finish().map_err(image_error)
}

fn load_font(path: &Path) -> Result<Font> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Font::from_bytes(bytes, FontSettings::default()).map_err(|message| Error::Font {
        path: path.to_path_buf(),
        message: message.to_string(),
    })
}

/// Alpha-blend `color` onto the pixel at (x, y); out-of-bounds writes are dropped.
fn blend(img: &mut RgbImage, x: i64, y: i64, color: Color, coverage: u8) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let alpha = coverage as u32;
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = ((src as u32 * alpha + *dst as u32 * (255 - alpha)) / 255) as u8;
    }
}
