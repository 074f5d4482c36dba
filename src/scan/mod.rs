//! Scan vector generation.
//!
//! Turns a [`PinMap`](crate::register::PinMap) into bit vectors for the
//! boundary register:
//!
//! - [`build_safe_vector`] - every controllable output disabled
//! - [`build_toggle_steps`] - assert, de-assert and release a single pin
//! - [`build_sequential_sweep`] - toggle several pins, one at a time
//!
//! ## Bit index convention
//!
//! A [`ScanVector`] is indexed by cell number: index 0 is cell 0. Nothing in
//! this module reverses or reframes vectors. Which end reaches the device
//! first on TDI is decided by the transport (see
//! [`ShiftOrder`](crate::transport::ShiftOrder)).
//!
//! ## Contention
//!
//! Every step group starts from and ends on the safe vector, and only the
//! target pin's control cell is ever enabled. A driver may therefore stop
//! after any complete group without leaving an output asserted.

mod generator;
mod timing;
mod vector;

pub use generator::{
    build_full_sweep, build_safe_vector, build_sequential_sweep, build_toggle_steps, ScanStep, StepGroup,
    SweepPlan,
};
pub use timing::parse_hold;
pub use vector::ScanVector;
