//! FILENAME: engine/src/sheet.rs
//! PURPOSE: Manages the collection of cells (the spreadsheet itself).
//! CONTEXT: This file defines the `Sheet` struct which acts as the container
//! for all cell data. It uses a sparse storage strategy (HashMap) so large
//! mostly-empty sheets stay cheap, and owns the dependency graph that keeps
//! reference edges and memoized values coherent across edits.
//!
//! EDIT PROTOCOL (every mutation):
//! 1. Validate: parse the text, reject invalid positions, out-of-range
//!    references, and reference cycles. Nothing is touched on rejection.
//! 2. Commit: materialize referenced cells that don't exist yet, rewire
//!    both edge directions, store the new content.
//! 3. Invalidate: drop the memoized value of the edited cell and of every
//!    cell in its reverse closure.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellKind, FORMULA_SIGN};
use crate::dependency_graph::DependencyGraph;
use crate::error::SheetError;
use crate::formula::Formula;
use crate::position::Position;

/// The extent of the printable area: the bounding rectangle of all cells
/// with non-empty text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}

/// The Sheet holds the state of the spreadsheet data.
/// It uses a sparse representation (HashMap) mapping positions to Cells
/// and is the sole owner of every cell; cells name their neighbors by
/// `Position` only, which keeps ownership acyclic even though the logical
/// reference graph is not a tree.
#[derive(Debug, Default)]
pub struct Sheet {
    /// Sparse storage: cells that have been written to, or materialized
    /// because a formula references them.
    cells: HashMap<Position, Cell>,

    /// Reference edges in both directions, kept symmetric with the
    /// formulas stored in `cells`.
    graph: DependencyGraph,
}

impl Sheet {
    /// Creates a new, empty Sheet.
    pub fn new() -> Self {
        Sheet {
            cells: HashMap::new(),
            graph: DependencyGraph::new(),
        }
    }

    /// Sets the content of the cell at `pos`.
    ///
    /// Text starting with '=' (and longer than one character) is parsed as
    /// a formula. On any rejection (invalid position, unparseable formula,
    /// out-of-range reference, reference cycle) the sheet is left exactly
    /// as it was.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<(), SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition(pos));
        }

        // Phase 1: build and validate the new content without touching state.
        let kind = content_from_text(text)?;
        let new_refs: HashSet<Position> = match &kind {
            CellKind::Formula(formula) => formula.referenced_cells().iter().copied().collect(),
            _ => HashSet::new(),
        };

        if let CellKind::Formula(formula) = &kind {
            if new_refs.contains(&pos) {
                return Err(SheetError::CircularDependency(pos));
            }
            if formula.referenced_cells().iter().any(|p| !p.is_valid()) {
                return Err(SheetError::Formula(format!(
                    "formula in {} references a cell outside the sheet",
                    pos
                )));
            }
            if self.graph.creates_cycle(pos, &new_refs) {
                return Err(SheetError::CircularDependency(pos));
            }
        }

        // Phase 2: commit edges and content. Materialized cells start empty,
        // with no prior cache and no dependents, so they need no
        // invalidation of their own.
        for &referenced in &new_refs {
            self.cells
                .entry(referenced)
                .or_insert_with(|| Cell::new(referenced));
        }
        log::debug!("set {}: {:?} ({} refs)", pos, text, new_refs.len());
        self.graph.rewire(pos, new_refs);
        self.cells
            .entry(pos)
            .or_insert_with(|| Cell::new(pos))
            .set_content(kind);

        // Phase 3: invalidate memoized values along reverse edges.
        self.invalidate_from(pos);
        Ok(())
    }

    /// Retrieves the cell at `pos`, or None if the position is invalid or
    /// nothing was ever written there.
    pub fn get_cell(&self, pos: Position) -> Option<&Cell> {
        if !pos.is_valid() {
            return None;
        }
        self.cells.get(&pos)
    }

    /// Clears the cell at `pos`: its forward edges are unwound, dependents
    /// are invalidated, and the cell is removed from storage. Cells that
    /// reference `pos` keep their edges and read the position as empty.
    pub fn clear_cell(&mut self, pos: Position) -> Result<(), SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition(pos));
        }

        if self.cells.contains_key(&pos) {
            log::debug!("clear {}", pos);
            self.graph.drop_edges(pos);
            self.invalidate_from(pos);
            self.cells.remove(&pos);
        }
        Ok(())
    }

    /// Calculates the size of the area involved in printing: the bounding
    /// rectangle of all cells with non-empty text. Cells materialized as
    /// empty by a formula reference do not extend it.
    pub fn get_printable_size(&self) -> Size {
        let mut size = Size { rows: 0, cols: 0 };
        for (pos, cell) in &self.cells {
            if cell.is_empty() {
                continue;
            }
            size.rows = size.rows.max(pos.row + 1);
            size.cols = size.cols.max(pos.col + 1);
        }
        size
    }

    /// Prints the visible values of the printable area: cells within a row
    /// are tab-separated, each row ends with a newline. Every error prints
    /// as "#ARITHM!".
    pub fn print_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |sheet, cell| cell.value(sheet).display())
    }

    /// Prints the editable texts of the printable area in the same layout.
    pub fn print_texts<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |_, cell| cell.text())
    }

    fn print_with<W, F>(&self, out: &mut W, render: F) -> io::Result<()>
    where
        W: Write,
        F: Fn(&Sheet, &Cell) -> String,
    {
        let size = self.get_printable_size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    write!(out, "\t")?;
                }
                if let Some(cell) = self.get_cell(Position::new(row, col)) {
                    write!(out, "{}", render(self, cell))?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Drops the memoized value of `pos` and of every transitive dependent.
    fn invalidate_from(&mut self, pos: Position) {
        if let Some(cell) = self.cells.get(&pos) {
            cell.invalidate();
        }

        let affected = self.graph.reverse_closure(pos);
        if !affected.is_empty() {
            log::trace!("invalidate {}: {} dependent(s)", pos, affected.len());
        }
        for dependent in affected {
            if let Some(cell) = self.cells.get(&dependent) {
                cell.invalidate();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

/// Classifies raw input text into cell content.
/// Empty text is an empty cell; a single character or anything not led by
/// the formula sign is literal text; the rest is parsed as a formula.
fn content_from_text(text: &str) -> Result<CellKind, SheetError> {
    if text.is_empty() {
        return Ok(CellKind::Empty);
    }
    if text.len() == 1 || !text.starts_with(FORMULA_SIGN) {
        return Ok(CellKind::Text(text.to_string()));
    }
    match Formula::parse(&text[1..]) {
        Ok(formula) => Ok(CellKind::Formula(formula)),
        Err(e) => Err(SheetError::Formula(e.to_string())),
    }
}
