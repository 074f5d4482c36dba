//! Safe-state and toggle sequence generation.

use std::time::Duration;

use log::debug;

use super::vector::ScanVector;
use crate::error::{BscanError, Result};
use crate::register::{Bit, BoundaryRegister, PinMap};

/// One vector to load, and how long to leave it applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStep {
    pub vector: ScanVector,
    pub hold: Duration,
}

/// The three steps that pulse one pin and return the chain to safe state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepGroup {
    pub port: String,
    pub steps: Vec<ScanStep>,
}

impl StepGroup {
    /// Vector left on the chain once the group has been played.
    pub fn final_vector(&self) -> Option<&ScanVector> {
        self.steps.last().map(|s| &s.vector)
    }
}

/// A sweep over several pins, one pin enabled at a time.
#[derive(Debug)]
pub struct SweepPlan {
    /// Safe vector every group starts from and returns to
    pub safe: ScanVector,
    pub groups: Vec<StepGroup>,
    /// Requested ports that are not resolved output pins
    pub skipped: Vec<BscanError>,
}

/// Safe vector for a register: every resolved pin's control cell holds its
/// disable value, every other cell is `0`.
pub fn build_safe_vector(register: &BoundaryRegister, pins: &PinMap) -> ScanVector {
    debug_assert_eq!(register.boundary_len(), pins.boundary_len());
    safe_vector(pins)
}

fn safe_vector(pins: &PinMap) -> ScanVector {
    let mut vector = ScanVector::zeros(pins.boundary_len());
    for pin in pins.iter() {
        vector.set(pin.ctrl_idx, pin.disable_value);
    }
    vector
}

/// Steps that drive `port` to `assert_value`, then to its complement, then
/// back to the safe vector.
///
/// Only this pin's control cell is ever enabled. The last step is the safe
/// vector exactly and carries no hold time of its own.
pub fn build_toggle_steps(pins: &PinMap, port: &str, assert_value: Bit, hold: Duration) -> Result<StepGroup> {
    let pin = pins.get(port).ok_or_else(|| BscanError::PinNotFound {
        port: port.to_string(),
    })?;
    let safe = safe_vector(pins);

    let mut asserted = safe.clone();
    asserted.set(pin.ctrl_idx, pin.enable_value());
    asserted.set(pin.data_idx, assert_value);

    let mut released = asserted.clone();
    released.set(pin.data_idx, assert_value.complement());

    debug!(
        "toggle {}: data cell {}, control cell {} (enable {})",
        pin.port,
        pin.data_idx,
        pin.ctrl_idx,
        pin.enable_value()
    );

    Ok(StepGroup {
        port: pin.port.clone(),
        steps: vec![
            ScanStep {
                vector: asserted,
                hold,
            },
            ScanStep {
                vector: released,
                hold,
            },
            ScanStep {
                vector: safe,
                hold: Duration::ZERO,
            },
        ],
    })
}

/// Toggle each port in order, returning to the safe vector between pins.
///
/// Ports that are not resolved output pins are skipped and reported in
/// [`SweepPlan::skipped`].
pub fn build_sequential_sweep<S: AsRef<str>>(
    pins: &PinMap,
    ports: &[S],
    assert_value: Bit,
    hold: Duration,
) -> SweepPlan {
    let safe = safe_vector(pins);
    let mut groups = Vec::with_capacity(ports.len());
    let mut skipped = Vec::new();

    for port in ports {
        match build_toggle_steps(pins, port.as_ref(), assert_value, hold) {
            Ok(group) => {
                debug_assert_eq!(group.final_vector(), Some(&safe));
                groups.push(group);
            }
            Err(e) => skipped.push(e),
        }
    }

    SweepPlan { safe, groups, skipped }
}

/// Sweep every resolved pin in data cell order.
pub fn build_full_sweep(pins: &PinMap, assert_value: Bit, hold: Duration) -> SweepPlan {
    let ports: Vec<&str> = pins.ports().collect();
    build_sequential_sweep(pins, &ports, assert_value, hold)
}
