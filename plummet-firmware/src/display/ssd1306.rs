//! SSD1306 OLED display driver
//!
//! Driver for 128x64 SSD1306-based OLED displays via blocking I2C.
//! Optimized for text display with a 6x8 font (21 chars x 8 rows).
//!
//! Implements the core display trait. The timing logic has no error
//! paths, so I2C failures are logged and dropped here; a glitched
//! frame is corrected by the next refresh.

use defmt::*;

use plummet_core::render::MAX_TEXT;
use plummet_core::traits::SplitDisplay;

use super::font::get_glyph;

/// SSD1306 I2C address (typically 0x3C or 0x3D)
const SSD1306_ADDR: u8 = 0x3C;

/// Display dimensions
const WIDTH: usize = 128;
const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
}

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    /// Frame buffer (1 bit per pixel, organized as pages)
    buffer: [[u8; WIDTH]; PAGES],
}

impl<I2C> Ssd1306<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Create a new SSD1306 driver
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            buffer: [[0; WIDTH]; PAGES],
        }
    }

    /// Initialize the display and draw the static banner
    pub fn init(&mut self) {
        if self.try_init().is_err() {
            warn!("OLED init failed");
        }
    }

    fn try_init(&mut self) -> Result<(), I2C::Error> {
        // Initialization sequence for SSD1306
        let init_cmds: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80, // Default clock
            cmd::SET_MUX_RATIO,
            0x3F, // 64 lines
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE | 0x00,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            cmd::SET_MEMORY_MODE,
            0x00,                  // Horizontal addressing
            cmd::SET_SEG_REMAP,    // Flip horizontally
            cmd::SET_COM_SCAN_DEC, // Flip vertically
            cmd::SET_COM_PINS,
            0x12, // Alternative COM config
            cmd::SET_CONTRAST,
            0xCF, // High contrast
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::DISPLAY_ALL_ON_RESUME,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ];

        for &c in init_cmds {
            self.command(c)?;
        }

        self.flush_all()?;

        // Static banner, rows 0-1; time rows stay below it
        self.draw_text(0, 0, "Ball Timer")?;
        self.draw_text(1, 0, "----------")?;

        Ok(())
    }

    /// Send a command to the display
    fn command(&mut self, cmd: u8) -> Result<(), I2C::Error> {
        self.i2c.write(SSD1306_ADDR, &[0x00, cmd])
    }

    /// Draw text at the specified position (row 0-7, col 0-20)
    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), I2C::Error> {
        if row >= PAGES as u8 {
            return Ok(());
        }

        let page = &mut self.buffer[row as usize];
        let mut x = (col as usize) * 6;

        for ch in text.chars().take(MAX_TEXT) {
            if x + 6 > WIDTH {
                break;
            }

            let glyph = get_glyph(ch);
            page[x..x + 6].copy_from_slice(glyph);
            x += 6;
        }

        self.flush_page(row)
    }

    /// Blank an entire row
    fn clear_page(&mut self, row: u8) -> Result<(), I2C::Error> {
        if row >= PAGES as u8 {
            return Ok(());
        }

        self.buffer[row as usize].fill(0);
        self.flush_page(row)
    }

    /// Flush one page of the frame buffer to the display
    fn flush_page(&mut self, row: u8) -> Result<(), I2C::Error> {
        // Set page address, then reset the column pointer
        self.command(cmd::SET_PAGE_ADDR | row)?;
        self.command(cmd::SET_LOW_COLUMN | 0)?;
        self.command(cmd::SET_HIGH_COLUMN | 0)?;

        let mut data = [0u8; WIDTH + 1];
        data[0] = 0x40; // Data mode
        data[1..].copy_from_slice(&self.buffer[row as usize]);
        self.i2c.write(SSD1306_ADDR, &data)
    }

    /// Flush the whole frame buffer
    fn flush_all(&mut self) -> Result<(), I2C::Error> {
        for page in 0..PAGES as u8 {
            self.flush_page(page)?;
        }
        Ok(())
    }
}

impl<I2C> SplitDisplay for Ssd1306<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn text(&mut self, row: u8, col: u8, text: &str) {
        if self.draw_text(row, col, text).is_err() {
            warn!("OLED draw failed at row {}", row);
        }
    }

    fn clear_line(&mut self, row: u8) {
        if self.clear_page(row).is_err() {
            warn!("OLED clear failed at row {}", row);
        }
    }
}
