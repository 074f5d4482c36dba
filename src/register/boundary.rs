//! The validated boundary register.

use std::collections::HashSet;
use std::fmt;

use log::debug;

use super::cell::BoundaryCell;
use crate::error::{BscanError, Result};

/// How strictly cell numbering is checked.
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Accept registers with missing cells and any listing order.
    pub allow_partial: bool,
}

impl RegisterOptions {
    /// Strict checking: cells must cover `0..boundary_len` exactly, listed in
    /// ascending or descending order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Partial checking for register excerpts. Missing cells are reported as
    /// [`Diagnostic::MissingCells`] and read as `0` in scan vectors.
    pub fn partial() -> Self {
        Self { allow_partial: true }
    }

    pub fn with_partial(mut self, allow_partial: bool) -> Self {
        self.allow_partial = allow_partial;
        self
    }
}

/// Non-fatal findings produced while building a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `BOUNDARY_LENGTH` was absent; the length was taken from the cells
    LengthInferred { boundary_len: usize },
    /// Cell numbers below `boundary_len` that were never declared
    MissingCells { cells: Vec<usize> },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthInferred { boundary_len } => write!(
                f,
                "BOUNDARY_LENGTH not declared; inferred {} from the highest cell number",
                boundary_len
            ),
            Self::MissingCells { cells } => match cells.as_slice() {
                [] => write!(f, "no missing cells"),
                [only] => write!(f, "cell {} is not declared", only),
                [first, .., last] => write!(
                    f,
                    "{} cells are not declared (cell {} through cell {})",
                    cells.len(),
                    first,
                    last
                ),
            },
        }
    }
}

/// Register length plus the cell table, ordered by cell number.
///
/// Built once per parse and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryRegister {
    boundary_len: usize,
    cells: Vec<BoundaryCell>,
}

impl BoundaryRegister {
    /// Validate `cells` against the declared length and build the register.
    ///
    /// Returns the register together with any diagnostics the caller may
    /// want to show (for example an inferred length).
    pub fn new(
        declared_length: Option<usize>,
        mut cells: Vec<BoundaryCell>,
        options: &RegisterOptions,
    ) -> Result<(Self, Vec<Diagnostic>)> {
        if cells.is_empty() {
            return Err(BscanError::integrity("register declares no cells"));
        }

        let mut seen = HashSet::with_capacity(cells.len());
        for cell in &cells {
            if !seen.insert(cell.cell_number) {
                return Err(BscanError::integrity(format!(
                    "cell {} is declared more than once",
                    cell.cell_number
                )));
            }
        }

        if !options.allow_partial {
            check_listing_order(&cells)?;
        }
        cells.sort_by_key(|c| c.cell_number);

        let highest = cells[cells.len() - 1].cell_number;
        let observed_len = highest + 1;
        let mut diagnostics = Vec::new();

        let boundary_len = match declared_length {
            Some(declared) if declared < observed_len => {
                return Err(BscanError::integrity(format!(
                    "BOUNDARY_LENGTH is {} but cell {} is declared",
                    declared, highest
                )));
            }
            Some(declared) => declared,
            None => {
                diagnostics.push(Diagnostic::LengthInferred {
                    boundary_len: observed_len,
                });
                observed_len
            }
        };

        if cells.len() != boundary_len {
            let missing: Vec<usize> = (0..boundary_len).filter(|n| !seen.contains(n)).collect();
            if !options.allow_partial {
                return Err(BscanError::integrity(format!(
                    "{} of {} cells are missing, first missing is cell {}",
                    missing.len(),
                    boundary_len,
                    missing[0]
                )));
            }
            diagnostics.push(Diagnostic::MissingCells { cells: missing });
        }

        debug!(
            "boundary register: {} cells declared, length {}",
            cells.len(),
            boundary_len
        );

        Ok((Self { boundary_len, cells }, diagnostics))
    }

    /// Number of bits in the register.
    pub fn boundary_len(&self) -> usize {
        self.boundary_len
    }

    /// All declared cells, ascending by cell number.
    pub fn cells(&self) -> &[BoundaryCell] {
        &self.cells
    }

    /// Look up a cell by number.
    pub fn cell(&self, cell_number: usize) -> Option<&BoundaryCell> {
        self.cells
            .binary_search_by_key(&cell_number, |c| c.cell_number)
            .ok()
            .map(|i| &self.cells[i])
    }

    /// Iterate over cells driving tri-state outputs.
    pub fn output3_cells(&self) -> impl Iterator<Item = &BoundaryCell> {
        self.cells.iter().filter(|c| c.is_output3())
    }
}

/// Files list cells either ascending from 0 or descending from the top.
fn check_listing_order(cells: &[BoundaryCell]) -> Result<()> {
    let ascending = cells.windows(2).all(|w| w[0].cell_number < w[1].cell_number);
    let descending = cells.windows(2).all(|w| w[0].cell_number > w[1].cell_number);
    if ascending || descending {
        return Ok(());
    }

    let direction_up = cells[0].cell_number < cells[1].cell_number;
    let offender = cells
        .windows(2)
        .find(|w| (w[0].cell_number < w[1].cell_number) != direction_up)
        .map(|w| (w[0].cell_number, w[1].cell_number));

    Err(BscanError::integrity(match offender {
        Some((before, after)) => format!("cells out of order: cell {} follows cell {}", after, before),
        None => "cells out of order".to_string(),
    }))
}
