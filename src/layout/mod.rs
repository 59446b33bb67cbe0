//! Caption banner layout
//!
//! Turns `"Video {N} | {caption}"` into word-wrapped lines and a bordered box
//! positioned against a frame. Everything here is pure: text is measured
//! through a [`TextMeasure`] oracle so the geometry can be tested without
//! decoding any video.

use serde::{Deserialize, Serialize};

use crate::domain::model::{CaptionLayout, LayoutLine, Rect};

pub mod font;

pub use font::{BitmapFont, GlyphMask};

/// Measures the rendered ink box of a line of text
pub trait TextMeasure {
    /// Width and height in pixels
    fn measure(&self, text: &str) -> (u32, u32);
}

/// RGB color triple
pub type Rgb = [u8; 3];

/// Banner appearance and spacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BannerStyle {
    /// Maximum tokens per wrapped line
    pub words_per_line: usize,
    /// Integer scale applied to the 8px bitmap face
    pub font_scale: u32,
    /// Text stroke thickness in pixels
    pub thickness: u32,
    /// Box border thickness in pixels, 0 disables the border
    pub border_thickness: u32,
    pub padding_x: u32,
    pub padding_y: u32,
    /// Gap between consecutive lines
    pub line_spacing: u32,
    /// Distance from the top of the frame to the top of the box
    pub top_margin: i32,
    pub text_color: Rgb,
    pub background_color: Rgb,
    pub border_color: Rgb,
    /// Soften glyph edges against the background
    pub antialias: bool,
}

impl Default for BannerStyle {
    fn default() -> Self {
        Self {
            words_per_line: 4,
            font_scale: 4,
            thickness: 3,
            border_thickness: 3,
            padding_x: 20,
            padding_y: 20,
            line_spacing: 15,
            top_margin: 250,
            text_color: [0, 0, 0],
            background_color: [255, 255, 255],
            border_color: [0, 0, 0],
            antialias: true,
        }
    }
}

impl BannerStyle {
    /// Font face described by this style
    pub fn font(&self) -> BitmapFont {
        BitmapFont::new(self.font_scale, self.thickness)
    }
}

/// Full banner text for a chunk
pub fn banner_text(caption: &str, unique_number: u64) -> String {
    format!("Video {} | {}", unique_number, caption)
}

/// Group whitespace-separated tokens into lines of at most `words_per_line`
pub fn wrap_words(text: &str, words_per_line: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(words_per_line.max(1))
        .map(|line| line.join(" "))
        .collect()
}

/// Compute the banner layout for one chunk.
///
/// The box is centered horizontally and anchored `top_margin` pixels below
/// the top edge regardless of its height. A box wider than the frame keeps
/// its size and extends past both edges. `frame_height` is accepted so every
/// frame dimension flows through the same call, but the fixed anchor does not
/// depend on it.
pub fn compute_layout(
    caption: &str,
    unique_number: u64,
    frame_width: u32,
    _frame_height: u32,
    style: &BannerStyle,
    measure: &dyn TextMeasure,
) -> CaptionLayout {
    let text_lines = wrap_words(&banner_text(caption, unique_number), style.words_per_line);

    let measured: Vec<(String, u32, u32)> = text_lines
        .into_iter()
        .map(|line| {
            let (width, height) = measure.measure(&line);
            (line, width, height)
        })
        .collect();

    let max_width = measured.iter().map(|(_, w, _)| *w).max().unwrap_or(0);
    let text_height: u32 = measured.iter().map(|(_, _, h)| *h).sum::<u32>()
        + style.line_spacing * (measured.len() as u32).saturating_sub(1);

    let box_width = max_width + style.padding_x * 2;
    let box_height = text_height + style.padding_y * 2;
    let box_x = (frame_width as i32 - box_width as i32).div_euclid(2);
    let box_y = style.top_margin;

    let mut current_y = box_y + style.padding_y as i32;
    let lines = measured
        .into_iter()
        .map(|(text, width, height)| {
            let origin_x = box_x + ((box_width - width) / 2) as i32;
            let line = LayoutLine {
                text,
                width,
                height,
                origin: (origin_x, current_y),
            };
            current_y += (height + style.line_spacing) as i32;
            line
        })
        .collect();

    CaptionLayout {
        lines,
        bounds: Rect::new(box_x, box_y, box_width, box_height),
    }
}
