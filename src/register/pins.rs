//! Pin map: output pins resolved to their control cells.

use std::collections::HashMap;

use log::debug;

use super::boundary::BoundaryRegister;
use super::cell::Bit;
use crate::error::BscanError;

/// A resolved tri-state output pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinEntry {
    /// Port name as declared in the BSDL
    pub port: String,
    /// Cell holding the value driven onto the pin
    pub data_idx: usize,
    /// Control cell gating the output
    pub ctrl_idx: usize,
    /// Value on `ctrl_idx` that puts the pin in its disabled state
    pub disable_value: Bit,
}

impl PinEntry {
    /// Value on `ctrl_idx` that lets the pin drive.
    pub fn enable_value(&self) -> Bit {
        self.disable_value.complement()
    }
}

/// Output pins keyed by port name (case-insensitive, as VHDL identifiers are).
///
/// Iteration order follows the data cell number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinMap {
    boundary_len: usize,
    entries: Vec<PinEntry>,
    index: HashMap<String, usize>,
}

impl PinMap {
    /// Length of the register the pins belong to.
    pub fn boundary_len(&self) -> usize {
        self.boundary_len
    }

    /// Find a pin by port name.
    pub fn get(&self, port: &str) -> Option<&PinEntry> {
        self.index.get(&port.to_ascii_uppercase()).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, port: &str) -> bool {
        self.get(port).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PinEntry> {
        self.entries.iter()
    }

    /// Port names in data cell order.
    pub fn ports(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.port.as_str())
    }
}

/// Result of resolving every output pin of a register.
#[derive(Debug)]
pub struct PinMapReport {
    /// Pins that resolved to a genuine control cell
    pub pins: PinMap,
    /// One [`BscanError::UnresolvedControlCell`] per rejected pin
    pub failures: Vec<BscanError>,
}

/// Resolve every output3 pin to its control cell and disable polarity.
///
/// A pin is rejected, without affecting the others, when its control cell
/// is missing, is not a `control`/`controlr` cell, or is shared with an
/// earlier pin that declared the opposite polarity. The control cell is
/// always the one the BSDL names; no positional guess is made.
pub fn build_pin_map(register: &BoundaryRegister) -> PinMapReport {
    let mut entries: Vec<PinEntry> = Vec::new();
    let mut index = HashMap::new();
    let mut failures = Vec::new();
    let mut polarity: HashMap<usize, Bit> = HashMap::new();

    for cell in register.output3_cells() {
        let port = match &cell.port {
            Some(port) => port,
            None => continue,
        };
        let data_idx = cell.cell_number;

        let (ctrl_idx, disable_value) = match (cell.control_ref, cell.disable_value) {
            (Some(ctrl), Some(disable)) => (ctrl, disable),
            _ => {
                failures.push(BscanError::unresolved(
                    port,
                    data_idx,
                    "no control cell and disable value declared",
                ));
                continue;
            }
        };

        match register.cell(ctrl_idx) {
            None => {
                failures.push(BscanError::unresolved(
                    port,
                    data_idx,
                    format!("control cell {} does not exist", ctrl_idx),
                ));
                continue;
            }
            Some(ctrl) if !ctrl.function.is_control() => {
                failures.push(BscanError::unresolved(
                    port,
                    data_idx,
                    format!("cell {} is a {} cell, not a control cell", ctrl_idx, ctrl.function),
                ));
                continue;
            }
            Some(_) => {}
        }

        if let Some(&claimed) = polarity.get(&ctrl_idx) {
            if claimed != disable_value {
                failures.push(BscanError::unresolved(
                    port,
                    data_idx,
                    format!(
                        "control cell {} is shared with a pin disabled by {}, this pin declares {}",
                        ctrl_idx, claimed, disable_value
                    ),
                ));
                continue;
            }
        }

        let key = port.to_ascii_uppercase();
        if index.contains_key(&key) {
            failures.push(BscanError::unresolved(
                port,
                data_idx,
                "port already mapped to an earlier output cell",
            ));
            continue;
        }

        polarity.insert(ctrl_idx, disable_value);
        index.insert(key, entries.len());
        entries.push(PinEntry {
            port: port.clone(),
            data_idx,
            ctrl_idx,
            disable_value,
        });
    }

    debug!(
        "pin map: {} output pins resolved, {} rejected",
        entries.len(),
        failures.len()
    );

    PinMapReport {
        pins: PinMap {
            boundary_len: register.boundary_len(),
            entries,
            index,
        },
        failures,
    }
}
