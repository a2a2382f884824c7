//! Split time formatting
//!
//! Times render as decimal milliseconds with an `mS` suffix. The
//! field is right-padded with spaces so a shorter value fully
//! overwrites stale digits left by the previous refresh, without a
//! flickering line clear.

use core::fmt::Write;

use heapless::String;

/// Display text bound; the display collaborator's buffers are sized
/// to this
pub const MAX_TEXT: usize = 32;

/// Rendered width of one split field, including padding
pub const FIELD_WIDTH: usize = 13;

/// Format an elapsed time for one display row
pub fn format_elapsed(ms: i32) -> String<MAX_TEXT> {
    let mut out: String<MAX_TEXT> = String::new();

    // Worst case "-2147483648mS" is exactly FIELD_WIDTH bytes
    let _ = write!(out, "{}mS", ms);
    while out.len() < FIELD_WIDTH {
        let _ = out.push(' ');
    }
    out
}
