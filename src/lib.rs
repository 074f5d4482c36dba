//! # Bscan Core
//!
//! Safe pin toggling over JTAG boundary scan, derived from a device's BSDL.
//!
//! This library provides:
//! - A reader for the BSDL attributes that describe the boundary register
//! - A validated register model with output pins resolved to their control cells
//! - Generation of a contention-free safe vector and per-pin toggle sequences
//! - An OpenOCD transport to play those sequences on real hardware (CLI only)
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`bsdl`] - Attribute extraction and cell record parsing
//! - [`register`] - Boundary register model and pin map
//! - [`scan`] - Safe vector, toggle steps and sweeps
//! - [`transport`] - OpenOCD command rendering and sessions
//!
//! Data flows one way: text, attribute strings, cell records, register,
//! pin map, vectors. Every stage fails closed, so a malformed BSDL never
//! reaches vector generation.
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! openocd -f artix7.cfg &
//! bscan xc7a100t.bsdl --tap xc7a100t.tap --pin IO_U8 --hold 500m
//! bscan xc7a100t.bsdl --tap xc7a100t.tap --all --dry-run
//! ```
//!
//! ### Library
//!
//! ```
//! use std::time::Duration;
//! use bscan_core::{bsdl, register::{build_pin_map, Bit}, scan};
//!
//! let source = r#"
//!     attribute BOUNDARY_LENGTH of TOP : entity is 2;
//!     attribute BOUNDARY_REGISTER of TOP : entity is
//!         "1 (BC_1, LED, output3, X, 0, 1, Z)," &
//!         "0 (BC_1, *, control, 1)";
//! "#;
//! let device = bsdl::parse(source).unwrap();
//! let pins = build_pin_map(&device.register).pins;
//! let safe = scan::build_safe_vector(&device.register, &pins);
//! assert_eq!(safe.to_string(), "10");
//!
//! let group = scan::build_toggle_steps(&pins, "LED", Bit::One, Duration::from_millis(100)).unwrap();
//! assert_eq!(group.steps[0].vector.to_string(), "01");
//! ```
//!
//! ## Bit Order
//!
//! Vectors are indexed by cell number (index 0 = cell 0). Only the
//! transport turns them into shift data, using an explicit
//! [`transport::ShiftOrder`].

pub mod bsdl;
pub mod error;
pub mod register;
pub mod scan;
pub mod transport;

// Re-export main types for convenience
pub use bsdl::Bsdl;
pub use error::{BscanError, Result};
pub use register::{Bit, BoundaryRegister, PinMap};
pub use scan::ScanVector;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmBoundaryScan;

/// Default time each toggle step is held, in seconds
pub const DEFAULT_HOLD_SECS: f64 = 0.5;

/// Default hold for sweeps over every pin, in seconds
pub const DEFAULT_SWEEP_HOLD_SECS: f64 = 0.1;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::register::{build_pin_map, RegisterOptions};
    use crate::scan::{build_full_sweep, build_safe_vector, build_toggle_steps};
    use crate::transport::{RecordingTransport, ScanSession, TargetConfig};

    fn register_source(body: &str, length: Option<usize>) -> String {
        let mut source = String::from("entity DUT is\n");
        if let Some(length) = length {
            source.push_str(&format!("  attribute BOUNDARY_LENGTH of DUT : entity is {};\n", length));
        }
        source.push_str(&format!("  attribute BOUNDARY_REGISTER of DUT : entity is\n    {};\nend DUT;\n", body));
        source
    }

    #[test]
    fn test_excerpt_with_inferred_length() {
        let source = register_source(
            r#""52 (BC_2, IO_U8, output3, X, 51, 1, Z)," & "51 (BC_2, *, controlr, 1)""#,
            None,
        );
        assert!(matches!(bsdl::parse(&source), Err(BscanError::RegisterIntegrity { .. })));
        let device = bsdl::parse_with(&source, &RegisterOptions::partial()).unwrap();
        assert_eq!(device.register.boundary_len(), 53);

        let pins = build_pin_map(&device.register).pins;
        let safe = build_safe_vector(&device.register, &pins);
        assert_eq!(safe.ones(), vec![51]);

        let group = build_toggle_steps(&pins, "IO_U8", Bit::One, Duration::from_millis(500)).unwrap();
        let ones: Vec<Vec<usize>> = group.steps.iter().map(|s| s.vector.ones()).collect();
        assert_eq!(ones, vec![vec![52], vec![], vec![51]]);
        assert_eq!(group.steps[2].vector, safe);
        assert_eq!(group.steps[2].hold, Duration::ZERO);
    }

    #[test]
    fn test_unterminated_register_is_malformed() {
        let source = "attribute BOUNDARY_REGISTER of DUT : entity is \"0 (BC_1, *, control, 1)\"\nend DUT";
        assert!(matches!(bsdl::parse(source), Err(BscanError::MalformedAttribute { .. })));
    }

    #[test]
    fn test_dangling_control_reference() {
        let source = register_source(
            r#""0 (BC_1, *, control, 1)," &
    "1 (BC_1, A, output3, X, 0, 1, Z)," &
    "2 (BC_1, B, output3, X, 99, 1, Z)""#,
            Some(3),
        );
        let device = bsdl::parse(&source).unwrap();
        let report = build_pin_map(&device.register);

        assert!(report.pins.contains("A"));
        assert!(!report.pins.contains("B"));
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0],
            BscanError::UnresolvedControlCell { port, data_idx: 2, .. } if port == "B"
        ));
    }

    #[test]
    fn test_cell_beyond_declared_length() {
        let source = register_source(r#""15 (BC_1, *, control, 1)""#, Some(10));
        assert!(matches!(bsdl::parse(&source), Err(BscanError::RegisterIntegrity { .. })));
        assert!(matches!(
            bsdl::parse_with(&source, &RegisterOptions::partial()),
            Err(BscanError::RegisterIntegrity { .. })
        ));
    }

    #[test]
    fn test_sweep_through_recording_transport() {
        let source = format!(
            "{}\nattribute INSTRUCTION_LENGTH of DUT : entity is 6;\nattribute INSTRUCTION_OPCODE of DUT : entity is \"EXTEST (100110)\";",
            register_source(
                r#""3 (BC_1, B, output3, X, 2, 0, Z)," &
    "2 (BC_1, *, control, 0)," &
    "1 (BC_1, A, output3, X, 0, 1, Z)," &
    "0 (BC_1, *, control, 1)""#,
                Some(4),
            )
        );
        let device = bsdl::parse(&source).unwrap();
        let pins = build_pin_map(&device.register).pins;
        let plan = build_full_sweep(&pins, Bit::One, Duration::from_millis(1));
        assert!(plan.skipped.is_empty());

        let mut session = ScanSession::new(RecordingTransport::new(), TargetConfig::new("dut.tap"), 4).with_pacing(false);
        session.enter_extest(&device.instructions).unwrap();
        session.preload_safe(&plan.safe).unwrap();
        session.play_sweep(&plan).unwrap();

        // Safe: cell 0 = 1 (A disabled high), cell 2 = 0 (B disabled low) => "1000"
        assert_eq!(
            session.into_transport().commands,
            vec![
                "irscan dut.tap 0x26",
                "drscan dut.tap 4 0x1",
                "drscan dut.tap 4 0x2",
                "drscan dut.tap 4 0x0",
                "drscan dut.tap 4 0x1",
                "drscan dut.tap 4 0xD",
                "drscan dut.tap 4 0x5",
                "drscan dut.tap 4 0x1",
            ]
        );
    }
}
