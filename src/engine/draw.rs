//! Banner compositing onto RGB frames

use image::{Rgb, RgbImage};

use crate::domain::model::{CaptionLayout, Rect};
use crate::layout::{BannerStyle, GlyphMask};

/// A layout rasterized once per chunk and stamped onto many frames
#[derive(Debug, Clone)]
pub struct BannerSprite {
    bounds: Rect,
    lines: Vec<((i32, i32), GlyphMask)>,
    background: Rgb<u8>,
    border: Rgb<u8>,
    border_thickness: u32,
    text: Rgb<u8>,
}

impl BannerSprite {
    pub fn new(layout: &CaptionLayout, style: &BannerStyle) -> Self {
        let font = style.font();
        let lines = layout
            .lines
            .iter()
            .map(|line| (line.origin, font.rasterize(&line.text, style.antialias)))
            .collect();

        Self {
            bounds: layout.bounds,
            lines,
            background: Rgb(style.background_color),
            border: Rgb(style.border_color),
            border_thickness: style.border_thickness,
            text: Rgb(style.text_color),
        }
    }

    /// Draw the box, its border and every line onto `frame`.
    ///
    /// Anything falling outside the frame is clipped.
    pub fn stamp(&self, frame: &mut RgbImage) {
        let b = self.bounds;
        fill_rect(frame, b.x, b.y, b.right(), b.bottom(), self.background);

        if self.border_thickness > 0 {
            draw_border(frame, b, self.border_thickness, self.border);
        }

        for ((ox, oy), mask) in &self.lines {
            for my in 0..mask.height {
                for mx in 0..mask.width {
                    let coverage = mask.get(mx, my);
                    if coverage == 0 {
                        continue;
                    }
                    let px = ox + mx as i32;
                    let py = oy + my as i32;
                    if let Some(pixel) = pixel_mut(frame, px, py) {
                        blend(pixel, self.text, coverage);
                    }
                }
            }
        }
    }
}

fn pixel_mut(frame: &mut RgbImage, x: i32, y: i32) -> Option<&mut Rgb<u8>> {
    if x < 0 || y < 0 || x as u32 >= frame.width() || y as u32 >= frame.height() {
        return None;
    }
    Some(frame.get_pixel_mut(x as u32, y as u32))
}

/// Fill the half-open rectangle `[x0, x1) x [y0, y1)`, clipped to the frame
fn fill_rect(frame: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(frame.width() as i32);
    let y1 = y1.min(frame.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            frame.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Outline `rect` with a band `thickness` wide, centered on its edges
fn draw_border(frame: &mut RgbImage, rect: Rect, thickness: u32, color: Rgb<u8>) {
    let outer = (thickness / 2) as i32;
    let inner = thickness as i32 - outer;

    let (ox0, oy0) = (rect.x - outer, rect.y - outer);
    let (ox1, oy1) = (rect.right() + outer, rect.bottom() + outer);
    let (ix0, iy0) = (rect.x + inner, rect.y + inner);
    let (ix1, iy1) = (rect.right() - inner, rect.bottom() - inner);

    fill_rect(frame, ox0, oy0, ox1, iy0, color);
    fill_rect(frame, ox0, iy1, ox1, oy1, color);
    fill_rect(frame, ox0, iy0, ix0, iy1, color);
    fill_rect(frame, ix1, iy0, ox1, iy1, color);
}

fn blend(pixel: &mut Rgb<u8>, color: Rgb<u8>, coverage: u8) {
    if coverage == u8::MAX {
        *pixel = color;
        return;
    }
    let alpha = coverage as u32;
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = ((src as u32 * alpha + *dst as u32 * (255 - alpha)) / 255) as u8;
    }
}
