//! Built-in banner face backed by the `font8x8` bitmap glyphs

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};

use super::TextMeasure;

const CELL: u32 = 8;

/// Partial coverage given to pixels bordering a stroke when antialiasing
const EDGE_COVERAGE: u8 = 96;

/// 8x8 bitmap face scaled by an integer factor and thickened by a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapFont {
    scale: u32,
    thickness: u32,
}

/// Per-pixel coverage of a rendered line, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphMask {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.coverage[(y * self.width + x) as usize]
    }

    fn set(&mut self, x: u32, y: u32, value: u8) {
        let idx = (y * self.width + x) as usize;
        self.coverage[idx] = value;
    }
}

impl BitmapFont {
    pub fn new(scale: u32, thickness: u32) -> Self {
        Self {
            scale: scale.max(1),
            thickness: thickness.max(1),
        }
    }

    fn advance(&self) -> u32 {
        CELL * self.scale
    }

    fn glyph(c: char) -> [u8; 8] {
        BASIC_FONTS
            .get(c)
            .or_else(|| LATIN_FONTS.get(c))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }

    /// Rasterize `text` into a coverage mask sized exactly as [`measure`](TextMeasure::measure) reports.
    pub fn rasterize(&self, text: &str, antialias: bool) -> GlyphMask {
        let (width, height) = self.measure(text);
        let mut mask = GlyphMask::blank(width, height);
        let stroke = self.scale + self.thickness - 1;

        for (i, c) in text.chars().enumerate() {
            let glyph = Self::glyph(c);
            let cell_x = i as u32 * self.advance();
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..CELL {
                    if bits & (1u8 << col) == 0 {
                        continue;
                    }
                    let x0 = cell_x + col * self.scale;
                    let y0 = row as u32 * self.scale;
                    for y in y0..(y0 + stroke).min(height) {
                        for x in x0..(x0 + stroke).min(width) {
                            mask.set(x, y, u8::MAX);
                        }
                    }
                }
            }
        }

        if antialias {
            soften_edges(&mut mask);
        }
        mask
    }
}

impl TextMeasure for BitmapFont {
    fn measure(&self, text: &str) -> (u32, u32) {
        let chars = text.chars().count() as u32;
        let width = if chars == 0 {
            0
        } else {
            chars * self.advance() + self.thickness - 1
        };
        (width, CELL * self.scale + self.thickness - 1)
    }
}

fn soften_edges(mask: &mut GlyphMask) {
    let solid = mask.coverage.clone();
    let (w, h) = (mask.width as i64, mask.height as i64);
    let is_solid = |x: i64, y: i64| x >= 0 && y >= 0 && x < w && y < h && solid[(y * w + x) as usize] == u8::MAX;

    for y in 0..h {
        for x in 0..w {
            if is_solid(x, y) {
                continue;
            }
            if is_solid(x - 1, y) || is_solid(x + 1, y) || is_solid(x, y - 1) || is_solid(x, y + 1) {
                mask.set(x as u32, y as u32, EDGE_COVERAGE);
            }
        }
    }
}
