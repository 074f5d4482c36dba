//! Cell record parser for the `BOUNDARY_REGISTER` body.
//!
//! The body is a `&`-joined list of string literals. Each literal holds one
//! or more comma-separated records of the form
//!
//! ```text
//! <num> (<cell_type>, <port>, <function>[, <extra>]*)
//! ```
//!
//! How many optional fields follow `<function>` and what they mean depends on
//! the function; see [`parse_record`].

use log::debug;

use super::lexer::strip_comments;
use crate::error::{BscanError, Result};
use crate::register::{Bit, BoundaryCell, CellFunction, DisableResult};

/// Parse a register body into cells, keeping file order.
pub fn parse_cells(body: &str) -> Result<Vec<BoundaryCell>> {
    let stripped = strip_comments(body);
    let mut cells = Vec::new();

    for fragment in stripped.split('&') {
        let fragment = fragment.trim().replace('"', "");
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        parse_fragment(fragment, &mut cells)?;
    }

    if cells.is_empty() {
        return Err(BscanError::cell_parse("no cell records found in register body", body));
    }

    debug!("parsed {} boundary cells", cells.len());
    Ok(cells)
}

fn parse_fragment(fragment: &str, cells: &mut Vec<BoundaryCell>) -> Result<()> {
    let mut rest = fragment;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            return Ok(());
        }

        let open = rest
            .find('(')
            .ok_or_else(|| BscanError::cell_parse("expected '(' after cell number", rest))?;
        let close = matching_close(rest, open)
            .ok_or_else(|| BscanError::cell_parse("unclosed cell field list", rest))?;

        let number = &rest[..open];
        let fields: Vec<&str> = rest[open + 1..close].split(',').map(str::trim).collect();
        cells.push(parse_record(number, &fields, &rest[..=close])?);

        rest = &rest[close + 1..];
    }
}

/// Byte index of the `)` closing the `(` at `open`. Indexed ports such as
/// `PA(0)` nest inside the field list.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Build one cell from its number text and parenthesized fields.
///
/// Optional fields after the function:
/// - `control` / `controlr` / `input`: at most one, the safe value
/// - `output3`: safe value, control cell, disable value, disable result;
///   all four or the cell is kept without control information
/// - anything else: kept verbatim in [`BoundaryCell::extra`]
fn parse_record(number: &str, fields: &[&str], record: &str) -> Result<BoundaryCell> {
    let cell_number = number
        .trim()
        .parse::<usize>()
        .map_err(|_| BscanError::cell_parse(format!("invalid cell number '{}'", number.trim()), record))?;

    if fields.len() < 3 || fields[..3].iter().any(|f| f.is_empty()) {
        return Err(BscanError::cell_parse(
            format!("cell {} needs cell type, port and function", cell_number),
            record,
        ));
    }

    let port = match fields[1] {
        "*" => None,
        name => Some(name.to_string()),
    };
    let function = CellFunction::from_keyword(fields[2]);
    let extras = &fields[3..];

    let mut cell = BoundaryCell::new(cell_number, fields[0], port, function);

    match &cell.function {
        CellFunction::Control | CellFunction::Controlr | CellFunction::Input => {
            if extras.len() > 1 {
                return Err(BscanError::cell_parse(
                    format!(
                        "{} cell {} takes at most one optional field, found {}",
                        cell.function,
                        cell_number,
                        extras.len()
                    ),
                    record,
                ));
            }
            if let Some(safe) = extras.first() {
                cell.safe_value = parse_safe(safe, cell_number, record)?;
            }
        }
        CellFunction::Output3 => match extras.len() {
            0 => {}
            4 => {
                cell.safe_value = parse_safe(extras[0], cell_number, record)?;
                cell.control_ref = Some(extras[1].parse::<usize>().map_err(|_| {
                    BscanError::cell_parse(
                        format!("cell {}: invalid control cell '{}'", cell_number, extras[1]),
                        record,
                    )
                })?);
                cell.disable_value = Some(Bit::from_symbol(extras[2]).ok_or_else(|| {
                    BscanError::cell_parse(
                        format!("cell {}: disable value must be 0 or 1, found '{}'", cell_number, extras[2]),
                        record,
                    )
                })?);
                cell.disable_result = Some(DisableResult::from_keyword(extras[3]));
            }
            n if n > 4 => {
                return Err(BscanError::cell_parse(
                    format!("output3 cell {} takes at most four optional fields, found {}", cell_number, n),
                    record,
                ));
            }
            _ => {
                // Incomplete control triple; the pin map rejects this cell.
                cell.safe_value = parse_safe(extras[0], cell_number, record)?;
                cell.extra = extras[1..].iter().map(|s| s.to_string()).collect();
            }
        },
        _ => {
            cell.extra = extras.iter().map(|s| s.to_string()).collect();
        }
    }

    Ok(cell)
}

fn parse_safe(text: &str, cell_number: usize, record: &str) -> Result<Option<Bit>> {
    if text.eq_ignore_ascii_case("x") {
        return Ok(None);
    }
    Bit::from_symbol(text).map(Some).ok_or_else(|| {
        BscanError::cell_parse(
            format!("cell {}: safe value must be 0, 1 or X, found '{}'", cell_number, text),
            record,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output3_with_control_triple() {
        let cells = parse_cells("52 (BC_2, IO_U8, output3, X, 51, 1, Z) & 51 (BC_2, *, controlr, 1)").unwrap();
        assert_eq!(cells.len(), 2);

        let out = &cells[0];
        assert_eq!(out.cell_number, 52);
        assert_eq!(out.cell_type, "BC_2");
        assert_eq!(out.port.as_deref(), Some("IO_U8"));
        assert_eq!(out.function, CellFunction::Output3);
        assert_eq!(out.safe_value, None);
        assert_eq!(out.control_ref, Some(51));
        assert_eq!(out.disable_value, Some(Bit::One));
        assert_eq!(out.disable_result, Some(DisableResult::HighZ));

        let ctrl = &cells[1];
        assert_eq!(ctrl.port, None);
        assert_eq!(ctrl.function, CellFunction::Controlr);
        assert_eq!(ctrl.safe_value, Some(Bit::One));
    }

    #[test]
    fn test_parse_vendor_layout_with_comments() {
        let body = r#"
    "   0 (BC_2, *, controlr, 1)," &
    "   1 (BC_2, IO_AK20, output3, X, 0, 1, PULL0)," & -- PAD177 (comment, with commas)
    "   2 (BC_2, IO_AK20, input, X)," &
    -- a full-line comment & an ampersand
    "   3 (BC_1, *, internal, X), 4 (BC_4, CLK, clock, X)"
"#;
        let cells = parse_cells(body).unwrap();
        let numbers: Vec<usize> = cells.iter().map(|c| c.cell_number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
        assert_eq!(cells[1].disable_result, Some(DisableResult::Pull0));
        assert_eq!(cells[3].extra, vec!["X".to_string()]);
        assert_eq!(cells[4].function, CellFunction::Clock);
    }

    #[test]
    fn test_incomplete_output3_keeps_no_control() {
        let cells = parse_cells("\"7 (BC_1, Q, output3, 0, 6)\"").unwrap();
        assert_eq!(cells[0].safe_value, Some(Bit::Zero));
        assert_eq!(cells[0].control_ref, None);
        assert_eq!(cells[0].extra, vec!["6".to_string()]);
    }

    #[test]
    fn test_quoted_port_is_unquoted() {
        let cells = parse_cells("\"3 (BC_1, \"\"D0\"\", output2, X)\"").unwrap();
        assert_eq!(cells[0].port.as_deref(), Some("D0"));
    }

    #[test]
    fn test_empty_records_fail_with_context() {
        let err = parse_cells("\"\" & \"  \"").unwrap_err();
        match err {
            BscanError::CellParseFailure { context, .. } => assert!(context.starts_with('"')),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_garbage_fragment_fails() {
        assert!(matches!(
            parse_cells("\"hello world\"").unwrap_err(),
            BscanError::CellParseFailure { .. }
        ));
        assert!(matches!(
            parse_cells("\"-1 (BC_1, *, internal, X)\"").unwrap_err(),
            BscanError::CellParseFailure { .. }
        ));
    }

    #[test]
    fn test_field_count_rules() {
        assert!(parse_cells("0 (BC_2, *, control, 1, 0)").is_err());
        assert!(parse_cells("0 (BC_2, A, input, X, X)").is_err());
        assert!(parse_cells("1 (BC_2, A, output3, X, 0, 1, Z, EXTRA)").is_err());
        assert!(parse_cells("1 (BC_2, A, output3, X, 0, 2, Z)").is_err());
        assert!(parse_cells("1 (BC_2, A)").is_err());
    }

    #[test]
    fn test_indexed_port_names() {
        let body = r#"
    "0 (BC_1, *, control, 1)," &
    "1 (BC_1, PA(0), output3, X, 0, 1, Z)," &
    "2 (BC_1, PA(0), input, X)"
"#;
        let cells = parse_cells(body).unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[1].port.as_deref(), Some("PA(0)"));
        assert_eq!(cells[1].control_ref, Some(0));
        assert_eq!(cells[2].port.as_deref(), Some("PA(0)"));
        assert_eq!(cells[2].function, CellFunction::Input);
        assert!(parse_cells("\"3 (BC_1, D(3, output2, X)\"").is_err());
    }

    #[test]
    fn test_bidir_extras_are_retained() {
        let cells = parse_cells("9 (BC_7, IO1, bidir, X, 8, 0, Z)").unwrap();
        assert_eq!(cells[0].function, CellFunction::Bidir);
        assert_eq!(cells[0].control_ref, None);
        assert_eq!(cells[0].extra, vec!["X", "8", "0", "Z"]);
    }
}
