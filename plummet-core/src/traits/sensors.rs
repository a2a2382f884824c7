//! Sensor channel control trait

use crate::capture::SensorChannel;

/// Trait for enabling and disabling edge-triggered sensor channels
///
/// Implementations map logical channel identities onto whatever the
/// hardware offers: interrupt attach/detach, a parked capture task,
/// or a test mock. Edge handlers never re-enable a channel they
/// disabled; only the coordinator's reset path calls `enable`, and it
/// calls it exactly once per channel.
pub trait SensorBank {
    /// Re-enable edge callbacks for a channel
    fn enable(&mut self, channel: SensorChannel);

    /// Disable edge callbacks for a channel
    fn disable(&mut self, channel: SensorChannel);
}
