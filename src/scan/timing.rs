//! Hold time parsing.

use std::time::Duration;

use crate::error::{BscanError, Result};

/// Parse a hold time in seconds with an optional SI prefix and `s` unit.
///
/// `0.5`, `500m`, `500ms`, `250u` and `2s` are all accepted.
pub fn parse_hold(text: &str) -> Result<Duration> {
    let invalid = |message: &str| BscanError::InvalidHold {
        text: text.to_string(),
        message: message.to_string(),
    };

    let trimmed = text.trim();
    let without_unit = match trimmed.strip_suffix('s') {
        Some(rest) if !rest.is_empty() => rest,
        _ => trimmed,
    };
    if without_unit.is_empty() {
        return Err(invalid("empty value"));
    }

    let (num_str, multiplier) = match without_unit.chars().last() {
        Some(last) => {
            let mult = match last {
                'n' => 1e-9,
                'u' | 'µ' => 1e-6,
                'm' => 1e-3,
                _ => 1.0,
            };
            if mult != 1.0 {
                (&without_unit[..without_unit.len() - last.len_utf8()], mult)
            } else {
                (without_unit, 1.0)
            }
        }
        None => (without_unit, 1.0),
    };

    let value = num_str
        .parse::<f64>()
        .map_err(|_| invalid("expected a number of seconds, e.g. 0.5 or 500m"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid("must be a finite, non-negative number"));
    }

    Duration::try_from_secs_f64(value * multiplier).map_err(|_| invalid("too large"))
}
