//! `INSTRUCTION_LENGTH` and `INSTRUCTION_OPCODE` attributes.

use super::attribute::find_attribute;
use crate::error::{BscanError, Result};

/// Instruction register description of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionSet {
    /// Declared `INSTRUCTION_LENGTH`
    pub length: Option<usize>,
    /// Instruction name and its opcodes (bit strings, leftmost = MSB)
    pub opcodes: Vec<(String, Vec<String>)>,
}

impl InstructionSet {
    /// Read both attributes. Either may be absent.
    pub fn from_bsdl(input: &str) -> Result<Self> {
        let length = match find_attribute(input, "INSTRUCTION_LENGTH")? {
            Some(attr) => Some(attr.integer()?),
            None => None,
        };

        let opcodes = match find_attribute(input, "INSTRUCTION_OPCODE")? {
            Some(attr) => parse_opcodes(&attr.concatenated_strings())
                .map_err(|message| BscanError::malformed(attr.name, attr.line, message))?,
            None => Vec::new(),
        };

        Ok(Self { length, opcodes })
    }

    /// First opcode declared for `name` (case-insensitive).
    pub fn opcode(&self, name: &str) -> Result<&str> {
        self.opcodes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, codes)| codes.first())
            .map(String::as_str)
            .ok_or_else(|| BscanError::UnknownInstruction {
                name: name.to_string(),
            })
    }
}

/// Parse `EXTEST (100110, 000000), BYPASS (111111)`.
fn parse_opcodes(text: &str) -> std::result::Result<Vec<(String, Vec<String>)>, String> {
    let mut opcodes = Vec::new();
    let mut rest = text;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            return Ok(opcodes);
        }

        let open = rest
            .find('(')
            .ok_or_else(|| format!("expected '(' after instruction name in '{}'", rest))?;
        let close = rest[open..]
            .find(')')
            .map(|i| open + i)
            .ok_or_else(|| format!("unclosed opcode list in '{}'", rest))?;

        let name = rest[..open].trim();
        if name.is_empty() {
            return Err("instruction without a name".to_string());
        }

        let mut codes = Vec::new();
        for code in rest[open + 1..close].split(',').map(str::trim) {
            if code.is_empty() || !code.chars().all(|c| matches!(c, '0' | '1' | 'x' | 'X')) {
                return Err(format!("invalid opcode '{}' for {}", code, name));
            }
            codes.push(code.to_string());
        }

        opcodes.push((name.to_string(), codes));
        rest = &rest[close + 1..];
    }
}

/// Render a binary opcode as hex for `irscan`, treating `X` as `0`.
pub fn opcode_to_hex(bits: &str) -> Option<String> {
    if bits.is_empty() {
        return None;
    }
    let mut value: u128 = 0;
    for c in bits.chars() {
        let bit = match c {
            '0' | 'x' | 'X' => 0,
            '1' => 1,
            _ => return None,
        };
        value = value.checked_mul(2)? | bit;
    }
    Some(format!("0x{:X}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNIPPET: &str = r#"
attribute INSTRUCTION_LENGTH of XC7A100T : entity is 6;
attribute INSTRUCTION_OPCODE of XC7A100T : entity is
    "EXTEST       (100110)," &
    "SAMPLE       (000001, 000010)," &  -- two encodings
    "BYPASS       (111111)";
"#;

    #[test]
    fn test_instruction_set() {
        let set = InstructionSet::from_bsdl(SNIPPET).unwrap();
        assert_eq!(set.length, Some(6));
        assert_eq!(set.opcodes.len(), 3);
        assert_eq!(set.opcode("extest").unwrap(), "100110");
        assert_eq!(set.opcode("SAMPLE").unwrap(), "000001");
        assert!(matches!(set.opcode("INTEST"), Err(BscanError::UnknownInstruction { .. })));
    }

    #[test]
    fn test_absent_attributes() {
        let set = InstructionSet::from_bsdl("entity TOP is end TOP;").unwrap();
        assert_eq!(set, InstructionSet::default());
    }

    #[test]
    fn test_bad_opcode_is_malformed() {
        let input = "attribute INSTRUCTION_OPCODE of TOP : entity is \"EXTEST (10a)\";";
        assert!(matches!(
            InstructionSet::from_bsdl(input),
            Err(BscanError::MalformedAttribute { .. })
        ));
    }

    #[test]
    fn test_opcode_to_hex() {
        assert_eq!(opcode_to_hex("100110").as_deref(), Some("0x26"));
        assert_eq!(opcode_to_hex("1111").as_deref(), Some("0xF"));
        assert_eq!(opcode_to_hex("12"), None);
        assert_eq!(opcode_to_hex(""), None);
    }
}
