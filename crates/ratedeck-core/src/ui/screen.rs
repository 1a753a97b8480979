// src/ui/screen.rs
//! Character-cell frame for the 128x64 display
//!
//! The panel is treated as 8 text rows of 16 cells, each cell 8x8 pixels.
//! Pages write whole rows into a [`Screen`]; [`draw_screen`] turns the frame
//! into pixels on any monochrome `embedded_graphics` target.

use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_5X8};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

pub const SCREEN_COLUMNS: usize = 16;
pub const SCREEN_ROWS: usize = 8;

pub const CELL_WIDTH: u32 = 8;
pub const ROW_HEIGHT: u32 = 8;
pub const DISPLAY_WIDTH: u32 = SCREEN_COLUMNS as u32 * CELL_WIDTH;
pub const DISPLAY_HEIGHT: u32 = SCREEN_ROWS as u32 * ROW_HEIGHT;

/// Text of one row; room for [`SCREEN_COLUMNS`] characters of any width
pub type Line = heapless::String<{ SCREEN_COLUMNS * 4 }>;

/// One text row and whether it is drawn in inverse video
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub text: Line,
    pub inverse: bool,
}

/// A full frame of text rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    rows: [Row; SCREEN_ROWS],
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank every row
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.text.clear();
            row.inverse = false;
        }
    }

    /// Replace a row, cutting `text` at [`SCREEN_COLUMNS`] characters.
    /// Rows past the bottom of the screen are ignored.
    pub fn set_row(&mut self, index: usize, text: &str, inverse: bool) {
        let Some(row) = self.rows.get_mut(index) else {
            return;
        };
        row.text.clear();
        for c in text.chars().take(SCREEN_COLUMNS) {
            // 16 chars of at most 4 bytes always fit
            let _ = row.text.push(c);
        }
        row.inverse = inverse;
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Text of a row, empty for rows past the bottom
    pub fn text(&self, index: usize) -> &str {
        self.row(index).map_or("", |row| row.text.as_str())
    }

    pub fn is_inverse(&self, index: usize) -> bool {
        self.row(index).is_some_and(|row| row.inverse)
    }
}

/// Render `screen` onto `target`, replacing whatever was there
pub fn draw_screen<D>(screen: &Screen, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off)?;

    let mut glyph = [0u8; 4];
    for (index, row) in screen.rows().iter().enumerate() {
        let top = index as i32 * ROW_HEIGHT as i32;

        let ink = if row.inverse {
            Rectangle::new(Point::new(0, top), Size::new(DISPLAY_WIDTH, ROW_HEIGHT))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(target)?;
            BinaryColor::Off
        } else {
            BinaryColor::On
        };
        let style = MonoTextStyle::new(&FONT_5X8, ink);

        for (column, c) in row.text.chars().enumerate() {
            let x = column as i32 * CELL_WIDTH as i32 + 1;
            Text::with_baseline(c.encode_utf8(&mut glyph), Point::new(x, top), style, Baseline::Top)
                .draw(target)?;
        }
    }
    Ok(())
}
