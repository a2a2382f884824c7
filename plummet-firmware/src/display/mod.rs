//! SSD1306 OLED text display

pub mod font;
pub mod ssd1306;

pub use ssd1306::Ssd1306;
