//! Hardware abstraction traits
//!
//! These traits define the interface between the timing logic and
//! hardware-specific implementations.

pub mod display;
pub mod sensors;

pub use display::SplitDisplay;
pub use sensors::SensorBank;
