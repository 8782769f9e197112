//! FILENAME: engine/src/dependency_extractor.rs
//! PURPOSE: Extracts cell references from parsed AST expressions.
//! CONTEXT: After a formula is parsed into an AST, this module walks the
//! tree to find all cell references. The references drive the dependency
//! graph and the formula's referenced-cells list. References whose
//! coordinates fall outside the sheet limits resolve to `Position::NONE`;
//! they survive extraction so the edit protocol and the evaluator can
//! report them.

use crate::position::{letters_to_col, Position};
use parser::ast::Expression;

/// Resolves a raw reference (column letters + 1-based row) to a Position.
/// Anything outside the sheet limits resolves to `Position::NONE`.
pub fn resolve_reference(col: &str, row: u32) -> Position {
    let Some(col_idx) = letters_to_col(col) else {
        return Position::NONE;
    };
    if row < 1 || row > Position::MAX_ROWS as u32 {
        return Position::NONE;
    }
    Position::new((row - 1) as i32, col_idx)
}

/// Collects every cell reference in the expression, in the order the
/// parser encountered them. The list may contain duplicates and `NONE`
/// entries; callers sort/deduplicate as needed.
pub fn extract_references(expr: &Expression) -> Vec<Position> {
    let mut refs = Vec::new();
    extract_recursive(expr, &mut refs);
    refs
}

/// Recursive helper for reference extraction.
fn extract_recursive(expr: &Expression, refs: &mut Vec<Position>) {
    match expr {
        Expression::Number(_) => {
            // Literals don't reference any cells
        }

        Expression::CellRef { col, row } => {
            refs.push(resolve_reference(col, *row));
        }

        Expression::UnaryOp { operand, .. } => {
            extract_recursive(operand, refs);
        }

        Expression::BinaryOp { left, right, .. } => {
            extract_recursive(left, refs);
            extract_recursive(right, refs);
        }
    }
}
