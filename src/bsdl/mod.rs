//! BSDL (Boundary Scan Description Language) reader.
//!
//! Only the attributes needed to drive a boundary register are read; the
//! rest of the VHDL around them is skipped.
//!
//! # Grammar Overview
//!
//! ```text
//! attribute BOUNDARY_LENGTH of <entity> : entity is <integer>;
//! attribute BOUNDARY_REGISTER of <entity> : entity is
//!     "<num> (<type>, <port>, <function>[, <extra>]*)" &
//!     "<num> (<type>, <port>, <function>[, <extra>]*)" &
//!     ...;
//! attribute INSTRUCTION_LENGTH of <entity> : entity is <integer>;
//! attribute INSTRUCTION_OPCODE of <entity> : entity is
//!     "<NAME> (<bits>[, <bits>]*)," & ...;
//! ```
//!
//! `-- text` comments may appear anywhere and run to the end of the line.
//!
//! # Cell Functions
//!
//! | Function | Optional fields |
//! |----------|-----------------|
//! | `control`, `controlr` | `safe` |
//! | `input` | `safe` |
//! | `output3` | `safe, ccell, disval, rslt` |
//! | others | kept verbatim |
//!
//! # Example
//!
//! ```text
//! attribute BOUNDARY_LENGTH of XC7A100T : entity is 989;
//! attribute BOUNDARY_REGISTER of XC7A100T : entity is
//!   "  0 (BC_2, *, controlr, 1)," &
//!   "  1 (BC_2, IO_U8, output3, X, 0, 1, PULL0)," & -- PAD177
//!   "  2 (BC_2, IO_U8, input, X)," &
//!   ...;
//! ```

mod attribute;
mod cells;
mod instructions;
mod lexer;

pub use attribute::{
    entity_name, extract_register_attributes, find_attribute, AttributeValue, RegisterAttributes,
    BOUNDARY_LENGTH, BOUNDARY_REGISTER,
};
pub use cells::parse_cells;
pub use instructions::{opcode_to_hex, InstructionSet};
pub use lexer::{strip_comments, Lexer, Token, TokenKind};

use log::debug;

use crate::error::Result;
use crate::register::{BoundaryRegister, Diagnostic, RegisterOptions};

/// Everything read from one BSDL source.
#[derive(Debug, Clone)]
pub struct Bsdl {
    /// Name of the `entity` declaration, if found
    pub entity: Option<String>,
    pub register: BoundaryRegister,
    pub instructions: InstructionSet,
    /// Non-fatal findings the caller may want to show
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse BSDL text with strict register checking.
///
/// Cells must cover `0..boundary_len` exactly. For a register excerpt with
/// missing cells use [`parse_with`] and [`RegisterOptions::partial`].
pub fn parse(input: &str) -> Result<Bsdl> {
    parse_with(input, &RegisterOptions::default())
}

/// Parse BSDL text with the given register options.
pub fn parse_with(input: &str, options: &RegisterOptions) -> Result<Bsdl> {
    let attrs = extract_register_attributes(input)?;
    let cells = parse_cells(attrs.boundary_register)?;
    let (register, diagnostics) = BoundaryRegister::new(attrs.boundary_length, cells, options)?;
    let instructions = InstructionSet::from_bsdl(input)?;
    let entity = entity_name(input);

    debug!(
        "parsed BSDL for {}: {} register cells, IR length {:?}",
        entity.as_deref().unwrap_or("<unnamed entity>"),
        register.boundary_len(),
        instructions.length
    );

    Ok(Bsdl {
        entity,
        register,
        instructions,
        diagnostics,
    })
}

/// Parse a BSDL file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path, options: &RegisterOptions) -> Result<Bsdl> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::BscanError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_with(&content, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BscanError;

    const DEVICE: &str = r#"
entity TINY is
  generic (PHYSICAL_PIN_MAP : string := "PKG");
  attribute INSTRUCTION_LENGTH of TINY : entity is 4;
  attribute INSTRUCTION_OPCODE of TINY : entity is "EXTEST (0000), BYPASS (1111)";
  attribute BOUNDARY_LENGTH of TINY : entity is 4;
  attribute BOUNDARY_REGISTER of TINY : entity is
    "3 (BC_1, LED, input, X)," &
    "2 (BC_1, LED, output3, X, 1, 0, Z)," &
    "1 (BC_1, *, control, 0)," &
    "0 (BC_1, *, internal, X)";
end TINY;
"#;

    #[test]
    fn test_parse_device() {
        let bsdl = parse(DEVICE).unwrap();
        assert_eq!(bsdl.entity.as_deref(), Some("TINY"));
        assert_eq!(bsdl.register.boundary_len(), 4);
        assert!(bsdl.diagnostics.is_empty());
        assert_eq!(bsdl.instructions.opcode("EXTEST").unwrap(), "0000");
        assert_eq!(bsdl.register.cells()[0].cell_number, 0);
    }

    #[test]
    fn test_declared_length_too_short() {
        let input = DEVICE.replace("entity is 4;\n  attribute BOUNDARY_REGISTER", "entity is 3;\n  attribute BOUNDARY_REGISTER");
        assert!(matches!(parse(&input), Err(BscanError::RegisterIntegrity { .. })));
    }

    #[test]
    fn test_partial_options_are_forwarded() {
        let input = "attribute BOUNDARY_REGISTER of X : entity is \"5 (BC_1, *, control, 1)\";";
        assert!(parse(input).is_err());
        let bsdl = parse_with(input, &RegisterOptions::partial()).unwrap();
        assert_eq!(bsdl.register.boundary_len(), 6);
        assert_eq!(bsdl.diagnostics.len(), 2);
    }
}
