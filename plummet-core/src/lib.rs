//! Board-agnostic timing logic for the Plummet ball-drop timer
//!
//! This crate contains all timer logic that does not depend on
//! specific hardware:
//!
//! - Hardware abstraction traits (display, sensor bank)
//! - Run lifecycle state machine
//! - Interrupt-safe shared timing state (the event capture layer)
//! - The cooperative timing coordinator
//! - Split time formatting

#![no_std]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
pub mod coordinator;
pub mod render;
pub mod state;
pub mod traits;
