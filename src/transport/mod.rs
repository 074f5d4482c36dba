//! Delivery of scan vectors to a scan-chain controller.
//!
//! Vectors are sent as OpenOCD `irscan`/`drscan` text commands over its
//! telnet interface ([`TelnetTransport`]), or recorded without any hardware
//! ([`RecordingTransport`]) for dry runs and tests.
//!
//! This is the only place where a [`ScanVector`](crate::scan::ScanVector)
//! is turned into a number, and therefore the only place where shift order
//! matters. The order is always taken from [`TargetConfig::shift_order`].

mod openocd;
mod session;
mod telnet;

use std::time::Duration;

pub use openocd::{encode_dr, Command};
pub use session::{RecordingTransport, ScanSession};
pub use telnet::TelnetTransport;

use crate::error::Result;

/// Default OpenOCD telnet port.
pub const DEFAULT_PORT: u16 = 4444;

/// Default controller host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Which end of a vector enters the chain first.
///
/// Cell 0 is the cell nearest TDO in BSDL numbering, so on a standard chain
/// it has to be shifted in first. Some controllers or adapters present the
/// register the other way round; confirm against the hardware before
/// relying on either setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftOrder {
    /// Cell 0 is shifted first (LSB of the `drscan` value)
    #[default]
    Cell0First,
    /// Cell 0 is shifted last (MSB of the `drscan` value)
    Cell0Last,
}

impl ShiftOrder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cell0-first" | "lsb" => Some(Self::Cell0First),
            "cell0-last" | "msb" => Some(Self::Cell0Last),
            _ => None,
        }
    }
}

/// A text-command channel to a scan-chain controller.
pub trait Transport {
    /// Send one command and return the controller's reply.
    fn send(&mut self, command: &str) -> Result<String>;
}

/// Where and how to reach the target TAP.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    pub host: String,
    pub port: u16,
    /// OpenOCD TAP name, e.g. `xc7a100t.tap`
    pub tap: String,
    /// EXTEST opcode bits overriding the BSDL's `INSTRUCTION_OPCODE`
    pub extest_opcode: Option<String>,
    pub shift_order: ShiftOrder,
    /// Connect and read timeout
    pub timeout: Duration,
    /// Pause between sending a command and reading its reply
    pub settle: Duration,
}

impl TargetConfig {
    /// Create a configuration for `tap` with default connection settings.
    pub fn new(tap: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tap: tap.into(),
            extest_opcode: None,
            shift_order: ShiftOrder::default(),
            timeout: Duration::from_secs(2),
            settle: Duration::from_millis(10),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Use these opcode bits for EXTEST instead of the BSDL declaration.
    pub fn with_extest_opcode(mut self, bits: impl Into<String>) -> Self {
        self.extest_opcode = Some(bits.into());
        self
    }

    pub fn with_shift_order(mut self, order: ShiftOrder) -> Self {
        self.shift_order = order;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `host:port` of the controller.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
