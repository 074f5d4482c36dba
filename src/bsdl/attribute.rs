//! Attribute extraction.
//!
//! Locates `attribute <NAME> of <entity> : entity is <value>;` declarations
//! in BSDL source and returns the raw value text. Keywords match
//! case-insensitively, declarations may span any number of lines, and a `;`
//! inside a string literal or a comment never ends a value.

use log::debug;

use super::lexer::{Lexer, TokenKind};
use crate::error::{BscanError, Result};

/// Name of the register length attribute.
pub const BOUNDARY_LENGTH: &str = "BOUNDARY_LENGTH";

/// Name of the boundary register attribute.
pub const BOUNDARY_REGISTER: &str = "BOUNDARY_REGISTER";

/// Raw value of one attribute declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeValue<'a> {
    /// Attribute name as requested
    pub name: &'a str,
    /// Source text between `is` and the terminating `;`
    pub text: &'a str,
    /// Line of the attribute name (1-indexed)
    pub line: usize,
}

impl<'a> AttributeValue<'a> {
    /// Read the value as a single unsigned integer.
    pub fn integer(&self) -> Result<usize> {
        let mut tokens = Lexer::new(self.text);
        match (tokens.next(), tokens.next()) {
            (Some(tok), None) if tok.kind == TokenKind::Number => {
                tok.text.parse::<usize>().map_err(|e| {
                    BscanError::malformed(self.name, self.line, format!("invalid integer '{}': {}", tok.text, e))
                })
            }
            _ => Err(BscanError::malformed(
                self.name,
                self.line,
                format!("expected an integer value, found '{}'", self.text.trim()),
            )),
        }
    }

    /// Concatenate every string literal in the value (`"a" & "b"` becomes `ab`).
    pub fn concatenated_strings(&self) -> String {
        Lexer::new(self.text)
            .filter(|t| t.kind == TokenKind::StringLit)
            .map(|t| t.text)
            .collect()
    }
}

/// The two attributes that describe the boundary register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterAttributes<'a> {
    /// Declared `BOUNDARY_LENGTH`, if any
    pub boundary_length: Option<usize>,
    /// Raw `BOUNDARY_REGISTER` body
    pub boundary_register: &'a str,
    /// Line of the `BOUNDARY_REGISTER` declaration
    pub register_line: usize,
}

/// Extract `BOUNDARY_LENGTH` (optional) and `BOUNDARY_REGISTER` (required).
pub fn extract_register_attributes(input: &str) -> Result<RegisterAttributes<'_>> {
    let boundary_length = match find_attribute(input, BOUNDARY_LENGTH)? {
        Some(attr) => Some(attr.integer()?),
        None => None,
    };

    let register = find_attribute(input, BOUNDARY_REGISTER)?
        .ok_or_else(|| BscanError::attribute_not_found(BOUNDARY_REGISTER))?;

    debug!(
        "{} at line {} ({} bytes), {} = {:?}",
        BOUNDARY_REGISTER,
        register.line,
        register.text.len(),
        BOUNDARY_LENGTH,
        boundary_length
    );

    Ok(RegisterAttributes {
        boundary_length,
        boundary_register: register.text,
        register_line: register.line,
    })
}

/// Find the first `attribute <name> of ... is ...;` declaration.
///
/// Returns `Ok(None)` when no such declaration exists, and
/// [`BscanError::MalformedAttribute`] when the declaration starts but is
/// never terminated.
pub fn find_attribute<'a>(input: &'a str, name: &'a str) -> Result<Option<AttributeValue<'a>>> {
    let mut lexer = Lexer::new(input);
    let mut after_attribute = false;

    loop {
        let tok = lexer.next_token();
        if tok.kind == TokenKind::Eof {
            return Ok(None);
        }

        if after_attribute && tok.is_keyword(name) {
            let line = tok.line;
            let next = lexer.next_token();
            if next.is_keyword("of") {
                return read_value(&mut lexer, input, name, line);
            }
            after_attribute = next.is_keyword("attribute");
            continue;
        }

        after_attribute = tok.is_keyword("attribute");
    }
}

fn read_value<'a>(
    lexer: &mut Lexer<'a>,
    input: &'a str,
    name: &'a str,
    line: usize,
) -> Result<Option<AttributeValue<'a>>> {
    let start = loop {
        let tok = lexer.next_token();
        match tok.kind {
            TokenKind::Eof => return Ok(None),
            TokenKind::Semicolon => {
                return Err(BscanError::malformed(name, line, "declaration ends before 'is'"));
            }
            _ if tok.is_keyword("is") => break tok.end,
            _ => {}
        }
    };

    loop {
        let tok = lexer.next_token();
        match tok.kind {
            TokenKind::Semicolon => {
                return Ok(Some(AttributeValue {
                    name,
                    text: &input[start..tok.start],
                    line,
                }));
            }
            TokenKind::Eof => {
                return Err(BscanError::malformed(
                    name,
                    line,
                    "no terminating ';' after the attribute value",
                ));
            }
            _ => {}
        }
    }
}

/// Name of the first `entity <name> is` declaration.
pub fn entity_name(input: &str) -> Option<String> {
    let mut lexer = Lexer::new(input);
    while let Some(tok) = lexer.next() {
        if tok.is_keyword("entity") {
            let name = lexer.next()?;
            if name.kind == TokenKind::Identifier && !name.is_keyword("is") {
                let is = lexer.next()?;
                if is.is_keyword("is") {
                    return Some(name.text);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNIPPET: &str = r#"
entity XC7A100T_CSG324 is
  attribute BOUNDARY_LENGTH of XC7A100T_CSG324 : entity is 989;
  -- attribute BOUNDARY_REGISTER in a comment; must be ignored
  attribute boundary_register
      of XC7A100T_CSG324 : entity is
    "  1 (BC_2, IO_U8, output3, X, 0, 1, PULL0)," & -- PAD177
    "  0 (BC_2, *, controlr, 1)";
end XC7A100T_CSG324;
"#;

    #[test]
    fn test_extracts_length_and_register() {
        let attrs = extract_register_attributes(SNIPPET).unwrap();
        assert_eq!(attrs.boundary_length, Some(989));
        assert!(attrs.boundary_register.contains("IO_U8"));
        assert!(attrs.boundary_register.contains("controlr, 1)\""));
        assert!(!attrs.boundary_register.contains(';'));
        assert_eq!(attrs.register_line, 5);
    }

    #[test]
    fn test_length_is_optional() {
        let input = "attribute BOUNDARY_REGISTER of TOP : entity is \"0 (BC_1, *, internal, X)\";";
        let attrs = extract_register_attributes(input).unwrap();
        assert_eq!(attrs.boundary_length, None);
    }

    #[test]
    fn test_missing_register_is_not_found() {
        let input = "attribute BOUNDARY_LENGTH of TOP : entity is 4;";
        let err = extract_register_attributes(input).unwrap_err();
        assert!(matches!(err, BscanError::AttributeNotFound { .. }));
    }

    #[test]
    fn test_missing_terminator_is_malformed() {
        let input = "attribute BOUNDARY_REGISTER of TOP : entity is\n  \"52 (BC_2, IO_U8, output3, X, 51, 1, Z)\"\n";
        let err = extract_register_attributes(input).unwrap_err();
        assert!(matches!(err, BscanError::MalformedAttribute { line: 1, .. }));
    }

    #[test]
    fn test_non_integer_length_is_malformed() {
        let input = "attribute BOUNDARY_LENGTH of TOP : entity is many;\n\
                     attribute BOUNDARY_REGISTER of TOP : entity is \"\";";
        let err = extract_register_attributes(input).unwrap_err();
        assert!(matches!(err, BscanError::MalformedAttribute { .. }));
    }

    #[test]
    fn test_declaration_without_of_is_skipped() {
        let input = "attribute BOUNDARY_REGISTER : BSDL_EXTENSION;\n\
                     attribute BOUNDARY_REGISTER of TOP : entity is \"0 (BC_1, *, internal, X)\";";
        let attr = find_attribute(input, BOUNDARY_REGISTER).unwrap().unwrap();
        assert_eq!(attr.line, 2);
        assert_eq!(attr.concatenated_strings(), "0 (BC_1, *, internal, X)");
    }

    #[test]
    fn test_entity_name() {
        assert_eq!(entity_name(SNIPPET), Some("XC7A100T_CSG324".to_string()));
        assert_eq!(entity_name("attribute X of Y : entity is 1;"), None);
    }
}
