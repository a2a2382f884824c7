//! Event capture layer
//!
//! Shared timing state written by sensor edge handlers and read by
//! the cooperative coordinator. Every field is a word-width atomic,
//! so no handler ever takes a lock the polling loop might hold.
//!
//! Writer/reader contract, per field:
//!
//! - `start_triggered` / `finish_triggered`: incremented only by the
//!   owning edge handler; cleared only during reset processing.
//! - `start_pending` / `finish_pending` / `reset_pending`: set by the
//!   owning edge handler, consumed (swap to false) by the coordinator.
//! - `origin_ms`: written by the coordinator at the Running
//!   transition, read by split handlers.
//! - `splits[i]` / `position`: written only by split handler `i`
//!   between two resets; the coordinator is read-only here.
//! - `armed`: claimed bit-by-bit by edge handlers, restored wholesale
//!   by reset processing.
//!
//! The handlers are interrupt-safe by construction: no blocking, no
//! allocation, no formatting, nothing but single-width atomic ops.

use portable_atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU8, Ordering};

/// Maximum number of intermediate split sensors
pub const MAX_SPLITS: usize = 5;

/// Sentinel for a split slot not yet written this run
///
/// Matches the display convention: a slot holding the sentinel keeps
/// showing the live elapsed placeholder.
pub const SPLIT_UNSET: i32 = 0;

/// Logical sensor channel identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorChannel {
    /// Start beam at the top of the drop column
    Start,
    /// Intermediate split sensor, zero-based index
    Split(u8),
    /// Manual reset input
    Reset,
}

impl SensorChannel {
    /// Bit in the armed mask for triggering channels
    ///
    /// Reset never self-disables, so it has no bit.
    fn armed_bit(self) -> u8 {
        match self {
            SensorChannel::Start => 1,
            SensorChannel::Split(i) if (i as usize) < MAX_SPLITS => 1 << (1 + i),
            _ => 0,
        }
    }
}

/// Shared timing state
///
/// Lives in a `static` and is shared by reference between the
/// interrupt-context writers and the cooperative reader. One ball
/// breaking a beam can bounce into dozens of spurious edges, so each
/// triggering channel claims its armed bit with a single atomic RMW
/// on the first edge; every later edge on that channel is a no-op
/// until reset rearms it.
pub struct TimingState {
    /// Number of split sensors in use; `splits_in_use - 1` finishes the run
    splits_in_use: u8,
    /// Edge counters, distinguishing "never fired" from "fired and consumed"
    start_triggered: AtomicU32,
    finish_triggered: AtomicU32,
    /// Level flags consumed by the coordinator
    start_pending: AtomicBool,
    finish_pending: AtomicBool,
    reset_pending: AtomicBool,
    /// Run origin in monotonic milliseconds
    origin_ms: AtomicU32,
    /// 0 = no split reached, `i + 1` after split `i`; only advances
    position: AtomicU32,
    /// Elapsed milliseconds per split slot
    splits: [AtomicI32; MAX_SPLITS],
    /// Debounce-by-disable bitmask: bit 0 = start, bits 1..=5 = splits
    armed: AtomicU8,
}

impl TimingState {
    /// Create the shared state with `splits_in_use` split sensors armed
    pub const fn new(splits_in_use: u8) -> Self {
        let count = if splits_in_use as usize > MAX_SPLITS {
            MAX_SPLITS as u8
        } else if splits_in_use == 0 {
            1
        } else {
            splits_in_use
        };

        Self {
            splits_in_use: count,
            start_triggered: AtomicU32::new(0),
            finish_triggered: AtomicU32::new(0),
            start_pending: AtomicBool::new(false),
            finish_pending: AtomicBool::new(false),
            reset_pending: AtomicBool::new(false),
            origin_ms: AtomicU32::new(0),
            position: AtomicU32::new(0),
            splits: [
                AtomicI32::new(SPLIT_UNSET),
                AtomicI32::new(SPLIT_UNSET),
                AtomicI32::new(SPLIT_UNSET),
                AtomicI32::new(SPLIT_UNSET),
                AtomicI32::new(SPLIT_UNSET),
            ],
            armed: AtomicU8::new(Self::armed_mask(count)),
        }
    }

    /// Mask with the start bit and one bit per split in use
    const fn armed_mask(splits_in_use: u8) -> u8 {
        ((1u16 << (splits_in_use + 1)) - 1) as u8
    }

    /// Number of split sensors in use
    pub fn splits_in_use(&self) -> usize {
        self.splits_in_use as usize
    }

    /// Claim a channel's armed bit
    ///
    /// Returns false if the channel was already disabled. The single
    /// `fetch_and` makes repeated edges on one channel idempotent even
    /// if they race each other.
    fn claim(&self, channel: SensorChannel) -> bool {
        let bit = channel.armed_bit();
        if bit == 0 {
            return false;
        }
        self.armed.fetch_and(!bit, Ordering::AcqRel) & bit != 0
    }

    // Edge handler side -------------------------------------------------

    /// Start edge handler
    ///
    /// First edge claims the channel, bumps the trigger counter, and
    /// requests the Running transition. Returns whether the edge was
    /// accepted.
    pub fn on_start(&self) -> bool {
        if !self.claim(SensorChannel::Start) {
            return false;
        }
        self.start_triggered.fetch_add(1, Ordering::Relaxed);
        self.start_pending.store(true, Ordering::Release);
        true
    }

    /// Split edge handler for channel `index`
    ///
    /// First edge claims the channel, records elapsed time relative to
    /// the run origin, and advances the position. The last split in
    /// use additionally requests the Finished transition. Returns
    /// whether the edge was accepted.
    pub fn on_split(&self, index: u8, now_ms: u32) -> bool {
        if index >= self.splits_in_use {
            return false;
        }
        if !self.claim(SensorChannel::Split(index)) {
            return false;
        }

        let origin = self.origin_ms.load(Ordering::Acquire);
        let elapsed = now_ms.wrapping_sub(origin) as i32;
        self.splits[index as usize].store(elapsed, Ordering::Release);

        // Position only advances; a late out-of-order edge is recorded
        // in its slot but cannot regress already-frozen earlier rows.
        self.position.fetch_max(index as u32 + 1, Ordering::AcqRel);

        if index == self.splits_in_use - 1 {
            self.finish_triggered.fetch_add(1, Ordering::Relaxed);
            self.finish_pending.store(true, Ordering::Release);
        }
        true
    }

    /// Reset edge handler
    ///
    /// Sets the level flag only. All clearing is deferred to the
    /// coordinator, which runs outside interrupt context and can
    /// safely touch the display. Bounce just re-sets the flag.
    pub fn on_reset(&self) {
        self.reset_pending.store(true, Ordering::Release);
    }

    // Coordinator side --------------------------------------------------

    /// Consume the start-requested flag
    pub fn take_start_pending(&self) -> bool {
        self.start_pending.swap(false, Ordering::AcqRel)
    }

    /// Consume the finish-requested flag
    pub fn take_finish_pending(&self) -> bool {
        self.finish_pending.swap(false, Ordering::AcqRel)
    }

    /// Consume the reset-requested flag
    pub fn take_reset_pending(&self) -> bool {
        self.reset_pending.swap(false, Ordering::AcqRel)
    }

    /// Check if a finish edge has fired since the last reset
    pub fn finish_seen(&self) -> bool {
        self.finish_triggered.load(Ordering::Relaxed) != 0
    }

    /// Check if a start edge has fired since the last reset
    pub fn start_seen(&self) -> bool {
        self.start_triggered.load(Ordering::Relaxed) != 0
    }

    /// Publish the run origin for split handlers
    pub fn set_origin(&self, now_ms: u32) {
        self.origin_ms.store(now_ms, Ordering::Release);
    }

    /// Index of the furthest split reached, or None before the first
    pub fn position(&self) -> Option<u8> {
        match self.position.load(Ordering::Acquire) {
            0 => None,
            p => Some((p - 1) as u8),
        }
    }

    /// Count of splits at or below the furthest reached
    pub fn position_count(&self) -> u32 {
        self.position.load(Ordering::Acquire)
    }

    /// Elapsed milliseconds recorded in slot `index`
    ///
    /// Returns the sentinel for slots not yet written (or out of range).
    pub fn split_ms(&self, index: usize) -> i32 {
        match self.splits.get(index) {
            Some(slot) => slot.load(Ordering::Acquire),
            None => SPLIT_UNSET,
        }
    }

    /// Check if a channel is currently armed
    pub fn is_armed(&self, channel: SensorChannel) -> bool {
        let bit = channel.armed_bit();
        bit != 0 && self.armed.load(Ordering::Acquire) & bit != 0
    }

    /// Clear all run state: slots, position, counters, and flags
    ///
    /// Called only from reset processing, outside interrupt context.
    pub fn clear_run(&self) {
        self.start_triggered.store(0, Ordering::Relaxed);
        self.finish_triggered.store(0, Ordering::Relaxed);
        self.start_pending.store(false, Ordering::Release);
        self.finish_pending.store(false, Ordering::Release);
        self.origin_ms.store(0, Ordering::Release);
        self.position.store(0, Ordering::Release);
        for slot in &self.splits {
            slot.store(SPLIT_UNSET, Ordering::Release);
        }
    }

    /// Restore every triggering channel's armed bit
    ///
    /// The last action of reset processing, so no new start edge can
    /// land before the run state above is fully cleared.
    pub fn rearm_all(&self) {
        self.armed
            .store(Self::armed_mask(self.splits_in_use), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_edge_accepted_once() {
        let timing = TimingState::new(5);

        assert!(timing.on_start());
        assert!(timing.take_start_pending());

        // Bounce: channel disabled itself at the first edge
        assert!(!timing.on_start());
        assert!(!timing.take_start_pending());
        assert!(timing.start_seen());
    }

    #[test]
    fn test_split_slot_written_at_most_once() {
        let timing = TimingState::new(5);
        timing.set_origin(100);

        assert!(timing.on_split(1, 220));
        assert_eq!(timing.split_ms(1), 120);

        // Duplicate edge on the same channel is a no-op
        assert!(!timing.on_split(1, 999));
        assert_eq!(timing.split_ms(1), 120);
    }

    #[test]
    fn test_elapsed_relative_to_origin() {
        let timing = TimingState::new(5);
        timing.set_origin(1_000);

        timing.on_split(0, 1_080);
        timing.on_split(2, 1_245);

        assert_eq!(timing.split_ms(0), 80);
        assert_eq!(timing.split_ms(2), 245);
        assert_eq!(timing.split_ms(1), SPLIT_UNSET);
    }

    #[test]
    fn test_position_only_advances() {
        let timing = TimingState::new(5);
        timing.set_origin(0);

        timing.on_split(3, 300);
        assert_eq!(timing.position(), Some(3));

        // Out-of-order earlier edge: slot recorded, position unchanged
        timing.on_split(1, 350);
        assert_eq!(timing.position(), Some(3));
        assert_eq!(timing.split_ms(1), 350);
    }

    #[test]
    fn test_last_split_requests_finish() {
        let timing = TimingState::new(3);
        timing.set_origin(0);

        timing.on_split(0, 100);
        assert!(!timing.take_finish_pending());
        assert!(!timing.finish_seen());

        timing.on_split(2, 500);
        assert!(timing.take_finish_pending());
        assert!(timing.finish_seen());
    }

    #[test]
    fn test_split_out_of_range_rejected() {
        let timing = TimingState::new(3);
        timing.set_origin(0);

        assert!(!timing.on_split(3, 100));
        assert!(!timing.on_split(7, 100));
        assert_eq!(timing.position(), None);
    }

    #[test]
    fn test_reset_defers_clearing() {
        let timing = TimingState::new(5);
        timing.set_origin(0);
        timing.on_split(0, 80);

        // The handler only raises the flag
        timing.on_reset();
        assert_eq!(timing.split_ms(0), 80);
        assert_eq!(timing.position(), Some(0));
        assert!(timing.take_reset_pending());
        assert!(!timing.take_reset_pending());
    }

    #[test]
    fn test_clear_and_rearm() {
        let timing = TimingState::new(5);
        timing.set_origin(0);
        timing.on_start();
        timing.on_split(0, 80);
        timing.on_split(4, 900);

        timing.clear_run();
        timing.rearm_all();

        assert_eq!(timing.position(), None);
        assert!(!timing.start_seen());
        assert!(!timing.finish_seen());
        for i in 0..MAX_SPLITS {
            assert_eq!(timing.split_ms(i), SPLIT_UNSET);
        }
        assert!(timing.is_armed(SensorChannel::Start));
        for i in 0..MAX_SPLITS as u8 {
            assert!(timing.is_armed(SensorChannel::Split(i)));
        }

        // Channels accept edges again after rearm
        assert!(timing.on_start());
        assert!(timing.on_split(0, 50));
    }

    #[test]
    fn test_unused_splits_stay_disarmed() {
        let timing = TimingState::new(3);
        assert!(timing.is_armed(SensorChannel::Split(2)));
        assert!(!timing.is_armed(SensorChannel::Split(3)));
        assert!(!timing.is_armed(SensorChannel::Split(4)));
    }
}
