//! Boundary register model and pin resolution.
//!
//! This module holds the validated representation of a device's boundary
//! register after parsing. [`BoundaryRegister`] owns the cell table and is
//! the single source of truth for everything downstream; [`build_pin_map`]
//! derives the name-addressable [`PinMap`] of tri-state outputs from it.

mod boundary;
mod cell;
mod pins;

pub use boundary::{BoundaryRegister, Diagnostic, RegisterOptions};
pub use cell::*;
pub use pins::{build_pin_map, PinEntry, PinMap, PinMapReport};
