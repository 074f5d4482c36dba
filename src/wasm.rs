//! WASM bindings for Bscan Core.
//!
//! This module exposes BSDL parsing and vector generation to JavaScript, so
//! a browser front end can preview toggle sequences or hand them to its own
//! transport (for example WebUSB).
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmBoundaryScan } from 'bscan_core';
//!
//! await init();
//!
//! const scan = new WasmBoundaryScan(bsdlText, false);
//! console.log(scan.boundary_len, scan.ports());
//!
//! // Vectors are bit strings, cell 0 leftmost
//! const safe = scan.safe_vector();
//! const steps = scan.toggle_steps("IO_U8", 1);
//! ```

use std::time::Duration;

use wasm_bindgen::prelude::*;

use crate::bsdl;
use crate::error::BscanError;
use crate::register::{build_pin_map, Bit, BoundaryRegister, PinMap, RegisterOptions};
use crate::scan::{build_safe_vector, build_toggle_steps};
use crate::transport::{encode_dr, ShiftOrder};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: BscanError) -> JsValue {
    let wrapped = BscanError::WasmError {
        message: e.to_string(),
    };
    JsValue::from_str(&wrapped.to_string())
}

/// A parsed device with its resolved output pins.
#[wasm_bindgen]
pub struct WasmBoundaryScan {
    register: BoundaryRegister,
    pins: PinMap,
    warnings: Vec<String>,
}

#[wasm_bindgen]
impl WasmBoundaryScan {
    /// Parse BSDL text.
    ///
    /// # Arguments
    /// * `bsdl_text` - Complete BSDL source
    /// * `partial` - Accept a register excerpt with missing cells
    #[wasm_bindgen(constructor)]
    pub fn new(bsdl_text: &str, partial: bool) -> Result<WasmBoundaryScan, JsValue> {
        let options = RegisterOptions::new().with_partial(partial);
        let device = bsdl::parse_with(bsdl_text, &options).map_err(to_js)?;
        let report = build_pin_map(&device.register);

        let warnings = device
            .diagnostics
            .iter()
            .map(|d| d.to_string())
            .chain(report.failures.iter().map(|e| e.to_string()))
            .collect();

        Ok(WasmBoundaryScan {
            register: device.register,
            pins: report.pins,
            warnings,
        })
    }

    /// Number of cells in the boundary register.
    #[wasm_bindgen(getter)]
    pub fn boundary_len(&self) -> usize {
        self.register.boundary_len()
    }

    /// Resolved output pins, newline separated, in data cell order.
    #[wasm_bindgen]
    pub fn ports(&self) -> String {
        self.pins.ports().collect::<Vec<_>>().join("\n")
    }

    /// Diagnostics and unresolved pins, newline separated.
    #[wasm_bindgen]
    pub fn warnings(&self) -> String {
        self.warnings.join("\n")
    }

    /// The safe vector as a bit string.
    #[wasm_bindgen]
    pub fn safe_vector(&self) -> String {
        build_safe_vector(&self.register, &self.pins).to_string()
    }

    /// The three toggle vectors for `port`, newline separated.
    ///
    /// # Arguments
    /// * `port` - Port name from the BSDL
    /// * `assert_value` - Value driven in the first step (0 or 1)
    #[wasm_bindgen]
    pub fn toggle_steps(&self, port: &str, assert_value: u8) -> Result<String, JsValue> {
        let assert_value = Bit::from(assert_value != 0);
        let group = build_toggle_steps(&self.pins, port, assert_value, Duration::ZERO).map_err(to_js)?;
        Ok(group
            .steps
            .iter()
            .map(|s| s.vector.to_string())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Hex `drscan` value of the safe vector.
    ///
    /// # Arguments
    /// * `cell0_last` - Put cell 0 in the most significant bit
    #[wasm_bindgen]
    pub fn safe_vector_hex(&self, cell0_last: bool) -> String {
        let order = if cell0_last {
            ShiftOrder::Cell0Last
        } else {
            ShiftOrder::Cell0First
        };
        encode_dr(&build_safe_vector(&self.register, &self.pins), order)
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
