//! Timing coordinator
//!
//! Cooperatively scheduled owner of the run lifecycle and display
//! cadence. Each iteration polls the level flags published by the
//! capture layer, applies at most one transition per flag, and
//! renders split rows at a bounded refresh rate. Runs outside
//! interrupt context, so it may format strings and talk to the
//! display.
//!
//! The loop never blocks on an event, so cancelling a pending start
//! or finish is simply the reset path overwriting the flags. A run
//! has no timeout: it stays Running until the last split fires or the
//! operator resets. That is intentional, not an omission.

use crate::capture::{SensorChannel, TimingState, SPLIT_UNSET};
use crate::config::TimerConfig;
use crate::render::format_elapsed;
use crate::state::{Event, RunState};
use crate::traits::{SensorBank, SplitDisplay};

/// Timing coordinator
///
/// Owns the lifecycle bookkeeping the capture layer must not touch:
/// the run state, the origin timestamp, and the render window.
pub struct Coordinator {
    config: TimerConfig,
    run: RunState,
    origin_ms: u32,
    last_render_ms: u32,
}

impl Coordinator {
    /// Create a coordinator in Idle
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            run: RunState::Idle,
            origin_ms: 0,
            last_render_ms: 0,
        }
    }

    /// Current run state
    pub fn run_state(&self) -> RunState {
        self.run
    }

    /// One cooperative iteration
    ///
    /// Reset is processed before anything else, so a new start is
    /// only ever honored after every channel has been re-enabled and
    /// the shared state fully cleared. Returns the lifecycle event
    /// applied this iteration, if any, for logging.
    pub fn poll<D, S>(
        &mut self,
        now_ms: u32,
        timing: &TimingState,
        display: &mut D,
        sensors: &mut S,
    ) -> Option<Event>
    where
        D: SplitDisplay,
        S: SensorBank,
    {
        if timing.take_reset_pending() {
            self.process_reset(timing, display, sensors);
            return Some(Event::ResetRequested);
        }

        let mut applied = None;

        if timing.take_start_pending() {
            // Start only arms from Idle with no stale finish recorded.
            // The explicit guard also rejects a mid-run start edge if
            // the channel was somehow left enabled.
            if self.run.accepts_start() && !timing.finish_seen() {
                self.begin_run(now_ms, timing, display);
                applied = Some(Event::StartRequested);
            }
        }

        if timing.take_finish_pending() {
            // Finish without a preceding start is meaningless
            if self.run.is_running() {
                self.run = self.run.transition(Event::FinishRequested);
                // One last frame freezes the recorded values
                self.render_splits(now_ms, timing, display);
                applied = Some(Event::FinishRequested);
            }
        }

        if self.run.is_running()
            && now_ms.wrapping_sub(self.last_render_ms) >= self.config.refresh_interval_ms
        {
            self.last_render_ms = now_ms;
            self.render_splits(now_ms, timing, display);
        }

        applied
    }

    /// Transition to Running: capture the origin and clear the rows
    ///
    /// The start channel stays disabled; its handler already claimed
    /// it at the first edge.
    fn begin_run<D: SplitDisplay>(&mut self, now_ms: u32, timing: &TimingState, display: &mut D) {
        self.run = self.run.transition(Event::StartRequested);
        self.origin_ms = now_ms;
        self.last_render_ms = now_ms;
        timing.set_origin(now_ms);
        self.clear_time_rows(timing, display);
    }

    /// Process a reset request: clear everything, rearm every channel
    /// exactly once, return to Idle
    fn process_reset<D, S>(&mut self, timing: &TimingState, display: &mut D, sensors: &mut S)
    where
        D: SplitDisplay,
        S: SensorBank,
    {
        self.run = self.run.transition(Event::ResetRequested);
        self.origin_ms = 0;
        self.last_render_ms = 0;

        timing.clear_run();
        self.clear_time_rows(timing, display);

        // Rearm the software mask before the physical channels so a
        // new edge is never dropped between the two.
        timing.rearm_all();
        for index in 0..timing.splits_in_use() {
            sensors.enable(SensorChannel::Split(index as u8));
        }
        sensors.enable(SensorChannel::Start);
    }

    /// Render every split row
    ///
    /// A row is frozen once its index is below the furthest position
    /// reached and its slot was actually written; everything else
    /// shows the live elapsed placeholder. A slot skipped by a faulty
    /// sensor therefore never freezes at the unset sentinel.
    fn render_splits<D: SplitDisplay>(&self, now_ms: u32, timing: &TimingState, display: &mut D) {
        let live_ms = now_ms.wrapping_sub(self.origin_ms) as i32;
        let frozen_below = timing.position_count();

        for index in 0..timing.splits_in_use() {
            let recorded = timing.split_ms(index);
            let frozen = (index as u32) < frozen_below && recorded != SPLIT_UNSET;
            let value = if frozen { recorded } else { live_ms };

            let text = format_elapsed(value);
            display.text(self.config.row_for(index as u8), self.config.time_col, &text);
        }
    }

    /// Clear the rows used for split times, leaving the banner alone
    fn clear_time_rows<D: SplitDisplay>(&self, timing: &TimingState, display: &mut D) {
        for index in 0..timing.splits_in_use() {
            display.clear_line(self.config.row_for(index as u8));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MAX_SPLITS;
    use heapless::{String, Vec};

    #[derive(Debug, Clone, PartialEq)]
    enum DisplayCall {
        Text { row: u8, text: String<32> },
        Clear { row: u8 },
    }

    #[derive(Default)]
    struct MockDisplay {
        calls: Vec<DisplayCall, 256>,
    }

    impl MockDisplay {
        fn text_at(&self, row: u8) -> Option<&str> {
            self.calls.iter().rev().find_map(|c| match c {
                DisplayCall::Text { row: r, text } if *r == row => Some(text.as_str()),
                _ => None,
            })
        }

        fn render_count(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, DisplayCall::Text { .. }))
                .count()
        }
    }

    impl SplitDisplay for MockDisplay {
        fn text(&mut self, row: u8, _col: u8, text: &str) {
            let mut owned: String<32> = String::new();
            let _ = owned.push_str(text);
            let _ = self.calls.push(DisplayCall::Text { row, text: owned });
        }

        fn clear_line(&mut self, row: u8) {
            let _ = self.calls.push(DisplayCall::Clear { row });
        }
    }

    #[derive(Default)]
    struct MockBank {
        start_enables: u8,
        split_enables: [u8; MAX_SPLITS],
    }

    impl SensorBank for MockBank {
        fn enable(&mut self, channel: SensorChannel) {
            match channel {
                SensorChannel::Start => self.start_enables += 1,
                SensorChannel::Split(i) => self.split_enables[i as usize] += 1,
                SensorChannel::Reset => {}
            }
        }

        fn disable(&mut self, _channel: SensorChannel) {}
    }

    fn fixture() -> (TimingState, Coordinator, MockDisplay, MockBank) {
        (
            TimingState::new(5),
            Coordinator::new(TimerConfig::default()),
            MockDisplay::default(),
            MockBank::default(),
        )
    }

    #[test]
    fn test_start_transitions_to_running() {
        let (timing, mut coord, mut display, mut bank) = fixture();

        timing.on_start();
        let event = coord.poll(0, &timing, &mut display, &mut bank);

        assert_eq!(event, Some(Event::StartRequested));
        assert_eq!(coord.run_state(), RunState::Running);
        // Time rows cleared on the Running transition
        assert!(display
            .calls
            .iter()
            .any(|c| *c == DisplayCall::Clear { row: 3 }));
    }

    #[test]
    fn test_finish_while_idle_ignored() {
        let (timing, mut coord, mut display, mut bank) = fixture();

        // Last split fires with no run active
        timing.on_split(4, 900);
        let event = coord.poll(910, &timing, &mut display, &mut bank);

        assert_eq!(event, None);
        assert_eq!(coord.run_state(), RunState::Idle);
        assert_eq!(display.render_count(), 0);
    }

    #[test]
    fn test_stale_finish_blocks_start() {
        let (timing, mut coord, mut display, mut bank) = fixture();

        // Spurious double-fire: finish and start both pending in Idle
        timing.on_split(4, 50);
        timing.on_start();
        let event = coord.poll(60, &timing, &mut display, &mut bank);

        assert_eq!(event, None);
        assert_eq!(coord.run_state(), RunState::Idle);
    }

    #[test]
    fn test_start_while_running_not_rearmed() {
        let (timing, mut coord, mut display, mut bank) = fixture();

        timing.on_start();
        coord.poll(0, &timing, &mut display, &mut bank);
        assert_eq!(coord.run_state(), RunState::Running);

        // Channel already disabled, so a second edge is dropped at
        // the capture layer
        assert!(!timing.on_start());
        let event = coord.poll(10, &timing, &mut display, &mut bank);
        assert_eq!(event, None);
        assert_eq!(coord.run_state(), RunState::Running);
    }

    #[test]
    fn test_full_drop_scenario() {
        let (timing, mut coord, mut display, mut bank) = fixture();

        // start(t=0)
        timing.on_start();
        coord.poll(0, &timing, &mut display, &mut bank);

        // splits fire down the column; one duplicate, one skipped
        assert!(timing.on_split(0, 120));
        assert!(timing.on_split(1, 245));
        assert!(!timing.on_split(1, 245)); // duplicate edge, ignored
        assert!(timing.on_split(4, 900)); // last split finishes the run

        let event = coord.poll(905, &timing, &mut display, &mut bank);

        assert_eq!(event, Some(Event::FinishRequested));
        assert_eq!(coord.run_state(), RunState::Finished);
        assert_eq!(timing.position(), Some(4));
        assert_eq!(timing.split_ms(0), 120);
        assert_eq!(timing.split_ms(1), 245);
        assert_eq!(timing.split_ms(2), SPLIT_UNSET); // never passed
        assert_eq!(timing.split_ms(4), 900);

        // Frozen rows show recorded values in the final frame
        assert_eq!(display.text_at(3).map(str::trim_end), Some("120mS"));
        assert_eq!(display.text_at(4).map(str::trim_end), Some("245mS"));
        assert_eq!(display.text_at(7).map(str::trim_end), Some("900mS"));
    }

    #[test]
    fn test_skipped_slot_keeps_live_placeholder() {
        let (timing, mut coord, mut display, mut bank) = fixture();

        timing.on_start();
        coord.poll(0, &timing, &mut display, &mut bank);

        timing.on_split(0, 120);
        timing.on_split(2, 300); // split 1 never fired

        coord.poll(400, &timing, &mut display, &mut bank);

        assert_eq!(display.text_at(3).map(str::trim_end), Some("120mS"));
        // Row for the skipped slot renders the live elapsed, not 0mS
        assert_eq!(display.text_at(4).map(str::trim_end), Some("400mS"));
        assert_eq!(display.text_at(5).map(str::trim_end), Some("300mS"));
        // Rows past the position are live too
        assert_eq!(display.text_at(6).map(str::trim_end), Some("400mS"));
    }

    #[test]
    fn test_reset_mid_run() {
        let (timing, mut coord, mut display, mut bank) = fixture();

        timing.on_start();
        coord.poll(0, &timing, &mut display, &mut bank);
        timing.on_split(0, 80);

        timing.on_reset();
        let event = coord.poll(500, &timing, &mut display, &mut bank);

        assert_eq!(event, Some(Event::ResetRequested));
        assert_eq!(coord.run_state(), RunState::Idle);
        assert_eq!(timing.position(), None);
        for i in 0..MAX_SPLITS {
            assert_eq!(timing.split_ms(i), SPLIT_UNSET);
        }

        // Every channel re-enabled exactly once
        assert_eq!(bank.start_enables, 1);
        assert_eq!(bank.split_enables, [1; MAX_SPLITS]);

        // A fresh run can start
        assert!(timing.on_start());
        coord.poll(600, &timing, &mut display, &mut bank);
        assert_eq!(coord.run_state(), RunState::Running);
    }

    #[test]
    fn test_reset_processed_before_pending_start() {
        let (timing, mut coord, mut display, mut bank) = fixture();

        timing.on_start();
        timing.on_reset();

        // Reset wins the iteration; the start flag was wiped with the
        // rest of the run state
        let event = coord.poll(0, &timing, &mut display, &mut bank);
        assert_eq!(event, Some(Event::ResetRequested));
        assert_eq!(coord.run_state(), RunState::Idle);

        let event = coord.poll(10, &timing, &mut display, &mut bank);
        assert_eq!(event, None);
        assert_eq!(coord.run_state(), RunState::Idle);
    }

    #[test]
    fn test_render_cadence_bounded() {
        let (timing, mut coord, mut display, mut bank) = fixture();

        timing.on_start();
        coord.poll(0, &timing, &mut display, &mut bank);

        // Fast injected clock: poll every 10 ms for one second
        for now in (10..=1_000).step_by(10) {
            coord.poll(now, &timing, &mut display, &mut bank);
        }

        // Five 200 ms windows elapse after the origin; five rows each
        assert_eq!(display.render_count(), 5 * 5);
    }

    #[test]
    fn test_no_rendering_when_idle_or_finished() {
        let (timing, mut coord, mut display, mut bank) = fixture();

        for now in (0..1_000).step_by(10) {
            coord.poll(now, &timing, &mut display, &mut bank);
        }
        assert_eq!(display.render_count(), 0);

        timing.on_start();
        coord.poll(1_000, &timing, &mut display, &mut bank);
        timing.on_split(4, 1_500);
        coord.poll(1_510, &timing, &mut display, &mut bank);
        assert_eq!(coord.run_state(), RunState::Finished);

        let frozen_count = display.render_count();
        for now in (1_520..3_000).step_by(10) {
            coord.poll(now, &timing, &mut display, &mut bank);
        }
        // Finished holds the last frame; no further draws
        assert_eq!(display.render_count(), frozen_count);
    }
}
