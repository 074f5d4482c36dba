//! Playing step sequences through a transport.

use std::thread;

use log::{info, warn};

use super::openocd::Command;
use super::{TargetConfig, Transport};
use crate::bsdl::{opcode_to_hex, InstructionSet};
use crate::error::{BscanError, Result};
use crate::scan::{ScanVector, StepGroup, SweepPlan};

/// Records commands instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub commands: Vec<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, command: &str) -> Result<String> {
        self.commands.push(command.to_string());
        Ok(String::new())
    }
}

/// A boundary-scan session on one TAP.
pub struct ScanSession<T: Transport> {
    transport: T,
    config: TargetConfig,
    boundary_len: usize,
    pace: bool,
}

impl<T: Transport> ScanSession<T> {
    /// Create a session for a register of `boundary_len` cells.
    pub fn new(transport: T, config: TargetConfig, boundary_len: usize) -> Self {
        Self {
            transport,
            config,
            boundary_len,
            pace: true,
        }
    }

    /// Whether step hold times are waited out (on by default).
    pub fn with_pacing(mut self, pace: bool) -> Self {
        self.pace = pace;
        self
    }

    /// Load EXTEST into the instruction register.
    ///
    /// The opcode comes from the configuration override when set, otherwise
    /// from the BSDL's `INSTRUCTION_OPCODE`.
    pub fn enter_extest(&mut self, instructions: &InstructionSet) -> Result<()> {
        let bits = match &self.config.extest_opcode {
            Some(bits) => bits.as_str(),
            None => instructions.opcode("EXTEST")?,
        };
        let opcode = opcode_to_hex(bits).ok_or_else(|| BscanError::UnknownInstruction {
            name: format!("EXTEST (unusable opcode '{}')", bits),
        })?;

        info!("entering EXTEST ({} = {})", bits, opcode);
        let command = Command::irscan(self.config.tap.as_str(), opcode);
        self.transport.send(&command.to_string())?;
        Ok(())
    }

    /// Shift one vector into the boundary register.
    pub fn write_vector(&mut self, vector: &ScanVector) -> Result<()> {
        let command = Command::drscan(self.config.tap.as_str(), vector, self.config.shift_order).to_string();
        if vector.len() != self.boundary_len {
            return Err(BscanError::transport(
                command,
                format!("vector has {} bits, register has {}", vector.len(), self.boundary_len),
            ));
        }
        self.transport.send(&command)?;
        Ok(())
    }

    /// Load the safe vector before anything is toggled.
    pub fn preload_safe(&mut self, safe: &ScanVector) -> Result<()> {
        self.write_vector(safe)?;
        info!("safe state loaded, all resolved outputs disabled");
        Ok(())
    }

    /// Apply each step of a group, waiting out its hold time.
    ///
    /// If a step fails, the group's final (safe) vector is written once more
    /// before the error is returned, so the pin is not left enabled.
    pub fn play_group(&mut self, group: &StepGroup) -> Result<()> {
        info!("toggling {}", group.port);
        for step in &group.steps {
            if let Err(e) = self.write_vector(&step.vector) {
                if let Some(safe) = group.final_vector() {
                    if let Err(restore) = self.write_vector(safe) {
                        warn!("could not restore safe state after {}: {}", group.port, restore);
                    }
                }
                return Err(e);
            }
            if self.pace && !step.hold.is_zero() {
                thread::sleep(step.hold);
            }
        }
        Ok(())
    }

    /// Play a sweep, one pin at a time. Skipped ports are logged.
    pub fn play_sweep(&mut self, plan: &SweepPlan) -> Result<()> {
        for skipped in &plan.skipped {
            warn!("skipping: {}", skipped);
        }
        info!("playing {} step groups", plan.groups.len());
        for group in &plan.groups {
            self.play_group(group)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// End the session and hand back the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
