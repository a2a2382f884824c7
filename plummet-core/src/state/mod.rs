//! Run lifecycle state machine
//!
//! Defines the authoritative run lifecycle. The state machine is
//! explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::RunState;
