//! FILENAME: engine/src/cell.rs
//! PURPOSE: Defines the fundamental data structures for a single spreadsheet cell.
//! CONTEXT: This file contains the `Cell` struct and the `CellValue`/`CellError`
//! enums. A cell's content is a tagged kind (empty, text, or formula); the
//! computed value of a formula is memoized in the cell and invalidated by the
//! sheet when anything it transitively reads changes.

use serde::{Deserialize, Serialize};

use crate::formula::Formula;
use crate::position::Position;
use crate::sheet::Sheet;

/// Marks the remainder of a cell's text as a formula when leading (and not
/// the only character).
pub const FORMULA_SIGN: char = '=';

/// When leading a text cell, suppressed from the visible value. Lets text
/// start with '=' without being read as a formula.
pub const ESCAPE_SIGN: char = '\'';

/// Represents the errors a formula evaluation can produce.
/// The categories are distinct internally, but every one of them prints as
/// the literal "#ARITHM!".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellError {
    /// Reference to a position outside the sheet limits.
    Ref,
    /// Arithmetic attempted on a text cell that is not a number.
    Value,
    /// The result is not a finite real: division by zero, overflow, NaN.
    Arithmetic,
}

impl std::fmt::Display for CellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#ARITHM!")
    }
}

/// The visible value of a cell: what rendering and formula evaluation see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Error(CellError),
}

impl CellValue {
    /// Renders the value for tabular output.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Error(e) => e.to_string(),
        }
    }
}

/// What a cell holds: nothing, literal text, or a parsed formula.
#[derive(Debug, Clone)]
pub enum CellKind {
    Empty,
    Text(String),
    Formula(Formula),
}

/// The atomic unit of the spreadsheet.
/// Cells never point at each other directly; neighbors are identified by
/// `Position` and resolved through the sheet, so the sheet stays the sole
/// owner of every cell.
#[derive(Debug)]
pub struct Cell {
    position: Position,
    kind: CellKind,
    /// Memoized result of the last successful formula evaluation.
    /// Interior mutability keeps reads `&self`; errors are never cached.
    cached_value: std::cell::Cell<Option<f64>>,
}

impl Cell {
    /// Creates an empty cell at the given position.
    pub fn new(position: Position) -> Self {
        Cell {
            position,
            kind: CellKind::Empty,
            cached_value: std::cell::Cell::new(None),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, CellKind::Empty)
    }

    /// Replaces the cell's content. The sheet is responsible for having
    /// validated the new content and for rewiring dependency edges.
    pub(crate) fn set_content(&mut self, kind: CellKind) {
        self.kind = kind;
        self.cached_value.set(None);
    }

    /// Drops the memoized value, forcing re-evaluation on the next read.
    pub(crate) fn invalidate(&self) {
        self.cached_value.set(None);
    }

    #[cfg(test)]
    pub(crate) fn has_cached_value(&self) -> bool {
        self.cached_value.get().is_some()
    }

    /// Returns the visible value of the cell.
    /// For a text cell this is its text without the escape character; for a
    /// formula it is the numeric result, or the error the evaluation hit.
    pub fn value(&self, sheet: &Sheet) -> CellValue {
        match &self.kind {
            CellKind::Empty => CellValue::Text(String::new()),
            CellKind::Text(s) => {
                CellValue::Text(s.strip_prefix(ESCAPE_SIGN).unwrap_or(s).to_string())
            }
            CellKind::Formula(formula) => {
                if let Some(n) = self.cached_value.get() {
                    return CellValue::Number(n);
                }
                match formula.evaluate(sheet) {
                    Ok(n) => {
                        self.cached_value.set(Some(n));
                        CellValue::Number(n)
                    }
                    Err(e) => CellValue::Error(e),
                }
            }
        }
    }

    /// Returns the editable text of the cell: empty for an empty cell, the
    /// raw text (escape character included) for a text cell, and "=" plus
    /// the canonical expression for a formula cell.
    pub fn text(&self) -> String {
        match &self.kind {
            CellKind::Empty => String::new(),
            CellKind::Text(s) => s.clone(),
            CellKind::Formula(formula) => format!("{}{}", FORMULA_SIGN, formula.expression()),
        }
    }

    /// Returns the cells this cell's formula directly reads, sorted
    /// ascending without duplicates. Empty for non-formula cells.
    pub fn referenced_cells(&self) -> &[Position] {
        match &self.kind {
            CellKind::Formula(formula) => formula.referenced_cells(),
            _ => &[],
        }
    }
}
