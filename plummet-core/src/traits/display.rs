//! Display collaborator trait

/// Trait for the split time display
///
/// The timer treats the display as a dumb character grid: positioned
/// ASCII text and whole-line clears, fire-and-forget. Calls are
/// assumed to complete well inside the refresh budget; a driver that
/// can fail should log and drop the error rather than surface it
/// into the timing logic, which has no error paths.
pub trait SplitDisplay {
    /// Draw text at a position
    ///
    /// - `row`: character row (0 at the top)
    /// - `col`: character column
    /// - `text`: ASCII text, bounded by [`MAX_TEXT`](crate::render::MAX_TEXT)
    fn text(&mut self, row: u8, col: u8, text: &str);

    /// Clear an entire row
    fn clear_line(&mut self, row: u8);
}
