//! Sprite decoding and half-block rendering.
//!
//! Each terminal cell shows two vertically stacked pixels: `▀` with the top
//! pixel as foreground and the bottom one as background. Cells are about
//! twice as tall as they are wide, so the pixels come out square.

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};
use serde::{Deserialize, Serialize};

/// Pixels with alpha below this are treated as transparent.
const ALPHA_CUTOFF: u8 = 128;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SpriteError {
    #[error("sprite decode failed: {0}")]
    Decode(String),
    #[error("sprite has no visible pixels")]
    Empty,
}

/// RGBA pixels of a sprite, cropped to its visible bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl SpriteData {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let px = self.rgba.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    fn opaque_color(&self, x: u32, y: u32) -> Option<Color> {
        self.pixel(x, y)
            .filter(|px| px[3] >= ALPHA_CUTOFF)
            .map(|px| Color::Rgb(px[0], px[1], px[2]))
    }
}

/// Decodes PNG (or any format `image` knows) bytes and trims the transparent
/// margin PokeAPI sprites carry.
pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteData, SpriteError> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| SpriteError::Decode(err.to_string()))?
        .to_rgba8();

    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0, 0);
    for (x, y, px) in image.enumerate_pixels() {
        if px.0[3] >= ALPHA_CUTOFF {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x == u32::MAX {
        return Err(SpriteError::Empty);
    }

    let cropped =
        image::imageops::crop_imm(&image, min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
            .to_image();
    let (width, height) = cropped.dimensions();
    Ok(SpriteData {
        width,
        height,
        rgba: cropped.into_raw(),
    })
}

/// Scaled size in (cell columns, pixel rows) that fits `max_cols` x
/// `max_rows` cells while keeping the aspect ratio.
fn scaled_size(sprite: &SpriteData, max_cols: u16, max_rows: u16) -> (u32, u32) {
    if max_cols == 0 || max_rows == 0 || sprite.width == 0 || sprite.height == 0 {
        return (0, 0);
    }
    let max_px_rows = f32::from(max_rows) * 2.0;
    let scale = (f32::from(max_cols) / sprite.width as f32).min(max_px_rows / sprite.height as f32);
    let cols = (sprite.width as f32 * scale).floor().max(1.0) as u32;
    let px_rows = (sprite.height as f32 * scale).floor().max(1.0) as u32;
    (
        cols.min(u32::from(max_cols)),
        px_rows.min(u32::from(max_rows) * 2),
    )
}

/// Cells the sprite occupies when drawn into `max_cols` x `max_rows`.
pub fn sprite_fit(sprite: &SpriteData, max_cols: u16, max_rows: u16) -> (u16, u16) {
    let (cols, px_rows) = scaled_size(sprite, max_cols, max_rows);
    (cols as u16, px_rows.div_ceil(2) as u16)
}

/// Draws a sprite centred in its area.
pub struct SpriteView<'a>(pub &'a SpriteData);

impl Widget for SpriteView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let sprite = self.0;
        let (cols, px_rows) = scaled_size(sprite, area.width, area.height);
        if cols == 0 || px_rows == 0 {
            return;
        }
        let rows = px_rows.div_ceil(2);
        let x0 = area.x + (area.width - cols as u16) / 2;
        let y0 = area.y + (area.height - rows as u16) / 2;

        // Nearest-neighbour sampling; pixel rows past the scaled height stay empty.
        let sample = |col: u32, px_row: u32| {
            if px_row >= px_rows {
                return None;
            }
            let sx = col * sprite.width / cols;
            let sy = px_row * sprite.height / px_rows;
            sprite.opaque_color(sx, sy)
        };

        for row in 0..rows {
            for col in 0..cols {
                let top = sample(col, row * 2);
                let bottom = sample(col, row * 2 + 1);
                let Some(cell) = buf.cell_mut((x0 + col as u16, y0 + row as u16)) else {
                    continue;
                };
                match (top, bottom) {
                    (Some(top), Some(bottom)) => {
                        cell.set_char('▀').set_fg(top).set_bg(bottom);
                    }
                    (Some(top), None) => {
                        cell.set_char('▀').set_fg(top);
                    }
                    (None, Some(bottom)) => {
                        cell.set_char('▄').set_fg(bottom);
                    }
                    (None, None) => {}
                }
            }
        }
    }
}
