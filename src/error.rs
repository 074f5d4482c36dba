//! Error types for the boundary-scan toolkit.
//!
//! This module provides a unified error type [`BscanError`] that covers
//! all error conditions that can occur during BSDL extraction, register
//! validation, pin resolution, vector generation and transport.

use thiserror::Error;

/// Result type alias using [`BscanError`].
pub type Result<T> = std::result::Result<T, BscanError>;

/// Unified error type for all bscan operations.
#[derive(Error, Debug)]
pub enum BscanError {
    // ============ BSDL Extraction Errors ============
    /// Required attribute declaration missing from the BSDL source
    #[error("Attribute '{attribute}' not found (expected 'attribute {attribute} of <entity> : entity is ...')")]
    AttributeNotFound { attribute: String },

    /// Attribute declaration found but its value could not be delimited or read
    #[error("Malformed attribute '{attribute}' at line {line}: {message}")]
    MalformedAttribute {
        attribute: String,
        line: usize,
        message: String,
    },

    /// Boundary register body could not be split into cell records
    #[error("Cell parse failure: {message} (near \"{context}\")")]
    CellParseFailure { message: String, context: String },

    // ============ Register Validation Errors ============
    /// Cell numbering or declared length is inconsistent
    #[error("Boundary register integrity error: {message}")]
    RegisterIntegrity { message: String },

    // ============ Pin Resolution Errors ============
    /// An output3 cell whose control cell cannot be resolved
    #[error("Pin '{port}' (cell {data_idx}): unresolved control cell: {message}")]
    UnresolvedControlCell {
        port: String,
        data_idx: usize,
        message: String,
    },

    /// Requested port is not a resolved output pin
    #[error("Pin '{port}' not found among resolved output pins")]
    PinNotFound { port: String },

    /// Instruction missing from INSTRUCTION_OPCODE
    #[error("Instruction '{name}' not declared in INSTRUCTION_OPCODE")]
    UnknownInstruction { name: String },

    /// Hold time could not be parsed
    #[error("Invalid hold time '{text}': {message}")]
    InvalidHold { text: String, message: String },

    // ============ I/O Errors ============
    /// Error reading BSDL file
    #[error("Failed to read BSDL file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not open a session with the scan controller
    #[error("Failed to connect to {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Session-level failure after connecting
    #[error("Transport error while sending '{command}': {message}")]
    Transport { command: String, message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl BscanError {
    /// Create an attribute-not-found error
    pub fn attribute_not_found(attribute: impl Into<String>) -> Self {
        Self::AttributeNotFound {
            attribute: attribute.into(),
        }
    }

    /// Create a malformed attribute error
    pub fn malformed(attribute: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedAttribute {
            attribute: attribute.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a cell parse failure, keeping the first ~100 characters of `context`
    pub fn cell_parse(message: impl Into<String>, context: &str) -> Self {
        Self::CellParseFailure {
            message: message.into(),
            context: context.trim().chars().take(100).collect(),
        }
    }

    /// Create a register integrity error
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::RegisterIntegrity {
            message: message.into(),
        }
    }

    /// Create an unresolved control cell error
    pub fn unresolved(port: impl Into<String>, data_idx: usize, message: impl Into<String>) -> Self {
        Self::UnresolvedControlCell {
            port: port.into(),
            data_idx,
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            command: command.into(),
            message: message.into(),
        }
    }
}
