//! Core types for boundary-register cells.

use std::fmt;

/// A single boundary-register bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Bit {
    #[default]
    Zero,
    One,
}

impl Bit {
    /// Parse `0` or `1`. Anything else (including `X`) is `None`.
    pub fn from_symbol(text: &str) -> Option<Self> {
        match text.trim() {
            "0" => Some(Self::Zero),
            "1" => Some(Self::One),
            _ => None,
        }
    }

    /// The logical complement.
    pub fn complement(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }

    pub fn is_one(self) -> bool {
        self == Self::One
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Self::One
        } else {
            Self::Zero
        }
    }
}

impl From<Bit> for bool {
    fn from(bit: Bit) -> Self {
        bit.is_one()
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "0"),
            Self::One => write!(f, "1"),
        }
    }
}

/// Cell function as declared in the third field of a cell record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellFunction {
    Input,
    Output2,
    /// Tri-state output, gated by a separate control cell
    Output3,
    /// Enables or disables associated output3 cells
    Control,
    /// Control cell that is also forced to its safe value in Test-Logic-Reset
    Controlr,
    Bidir,
    Internal,
    Clock,
    ObserveOnly,
    /// Any function this tool does not interpret
    Other(String),
}

impl CellFunction {
    /// Parse a cell function from its BSDL keyword.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "input" => Self::Input,
            "output2" => Self::Output2,
            "output3" => Self::Output3,
            "control" => Self::Control,
            "controlr" => Self::Controlr,
            "bidir" => Self::Bidir,
            "internal" => Self::Internal,
            "clock" => Self::Clock,
            "observe_only" => Self::ObserveOnly,
            _ => Self::Other(keyword.trim().to_string()),
        }
    }

    /// Whether this cell can gate an output3 cell.
    pub fn is_control(&self) -> bool {
        matches!(self, Self::Control | Self::Controlr)
    }
}

impl fmt::Display for CellFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Input => "input",
            Self::Output2 => "output2",
            Self::Output3 => "output3",
            Self::Control => "control",
            Self::Controlr => "controlr",
            Self::Bidir => "bidir",
            Self::Internal => "internal",
            Self::Clock => "clock",
            Self::ObserveOnly => "observe_only",
            Self::Other(name) => name,
        };
        f.write_str(text)
    }
}

/// Pin state once an output3 cell is disabled. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisableResult {
    HighZ,
    Pull0,
    Pull1,
    Weak0,
    Weak1,
    Keeper,
    Other(String),
}

impl DisableResult {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_ascii_uppercase().as_str() {
            "Z" => Self::HighZ,
            "PULL0" => Self::Pull0,
            "PULL1" => Self::Pull1,
            "WEAK0" => Self::Weak0,
            "WEAK1" => Self::Weak1,
            "KEEPER" => Self::Keeper,
            _ => Self::Other(keyword.trim().to_string()),
        }
    }
}

/// One boundary-register bit position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCell {
    /// Position in the register (0 is the cell nearest TDO)
    pub cell_number: usize,
    /// Vendor cell kind, e.g. `BC_2` (passed through untouched)
    pub cell_type: String,
    /// Physical pin name; `None` for internal cells declared as `*`
    pub port: Option<String>,
    pub function: CellFunction,
    /// Value to drive at reset, when declared (`X` means don't care)
    pub safe_value: Option<Bit>,
    /// For output3 cells: the cell that enables/disables this output
    pub control_ref: Option<usize>,
    /// Value which, driven onto `control_ref`, disables this output
    pub disable_value: Option<Bit>,
    pub disable_result: Option<DisableResult>,
    /// Optional fields this tool does not interpret, verbatim
    pub extra: Vec<String>,
}

impl BoundaryCell {
    /// Create a cell with no optional fields.
    pub fn new(
        cell_number: usize,
        cell_type: impl Into<String>,
        port: Option<String>,
        function: CellFunction,
    ) -> Self {
        Self {
            cell_number,
            cell_type: cell_type.into(),
            port,
            function,
            safe_value: None,
            control_ref: None,
            disable_value: None,
            disable_result: None,
            extra: Vec::new(),
        }
    }

    /// Check if this cell drives a tri-state output.
    pub fn is_output3(&self) -> bool {
        self.function == CellFunction::Output3
    }

    /// Check if this cell belongs to a physical pin.
    pub fn is_pin(&self) -> bool {
        self.port.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_symbols() {
        assert_eq!(Bit::from_symbol("1"), Some(Bit::One));
        assert_eq!(Bit::from_symbol(" 0 "), Some(Bit::Zero));
        assert_eq!(Bit::from_symbol("X"), None);
        assert_eq!(Bit::One.complement(), Bit::Zero);
    }

    #[test]
    fn test_function_keywords_are_case_insensitive() {
        assert_eq!(CellFunction::from_keyword("OUTPUT3"), CellFunction::Output3);
        assert!(CellFunction::from_keyword("ControlR").is_control());
        assert_eq!(
            CellFunction::from_keyword("vendor_thing"),
            CellFunction::Other("vendor_thing".to_string())
        );
    }

    #[test]
    fn test_disable_result() {
        assert_eq!(DisableResult::from_keyword("z"), DisableResult::HighZ);
        assert_eq!(DisableResult::from_keyword("PULL0"), DisableResult::Pull0);
    }
}
