//! FILENAME: engine/src/lib.rs
//! PURPOSE: Main library entry point for the spreadsheet engine.
//! CONTEXT: Re-exports public types and modules for use by other crates.
//!
//! The engine keeps a sparse grid of cells, parses formulas through the
//! `parser` crate, tracks reference edges in both directions, refuses
//! edits that would create reference cycles, and memoizes formula values
//! until an edit invalidates them.

pub mod cell;
pub mod dependency_extractor;
pub mod dependency_graph;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod position;
pub mod sheet;

// Re-export commonly used types at the crate root
pub use cell::{Cell, CellError, CellKind, CellValue, ESCAPE_SIGN, FORMULA_SIGN};
pub use dependency_extractor::{extract_references, resolve_reference};
pub use dependency_graph::DependencyGraph;
pub use error::SheetError;
pub use evaluator::Evaluator;
pub use formula::Formula;
pub use position::{col_to_letters, letters_to_col, Position};
pub use sheet::{Sheet, Size};

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(reference: &str) -> Position {
        Position::from_string(reference).unwrap()
    }

    fn value(sheet: &Sheet, reference: &str) -> CellValue {
        sheet.get_cell(pos(reference)).unwrap().value(sheet)
    }

    #[test]
    fn simple_arithmetic() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=1+2*3").unwrap();

        let a1 = sheet.get_cell(pos("A1")).unwrap();
        assert_eq!(a1.position(), pos("A1"));
        assert_eq!(a1.value(&sheet), CellValue::Number(7.0));
        assert_eq!(a1.text(), "=1+2*3");
    }

    #[test]
    fn cell_reference_and_cache() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "10").unwrap();
        sheet.set_cell(pos("B1"), "=A1*2").unwrap();
        assert_eq!(value(&sheet, "B1"), CellValue::Number(20.0));

        sheet.set_cell(pos("A1"), "5").unwrap();
        assert_eq!(value(&sheet, "B1"), CellValue::Number(10.0));
    }

    #[test]
    fn cycle_rejection_preserves_state() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=B1").unwrap();
        sheet.set_cell(pos("B1"), "=C1").unwrap();

        assert_eq!(
            sheet.set_cell(pos("C1"), "=A1"),
            Err(SheetError::CircularDependency(pos("C1")))
        );
        assert_eq!(value(&sheet, "C1"), CellValue::Text(String::new()));

        // The untouched chain still evaluates: everything reads as zero
        assert_eq!(value(&sheet, "A1"), CellValue::Number(0.0));
    }

    #[test]
    fn text_to_number_coercion() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "3.14").unwrap();
        sheet.set_cell(pos("B1"), "=A1+1").unwrap();
        assert_eq!(value(&sheet, "B1"), CellValue::Number(3.14 + 1.0));

        sheet.set_cell(pos("A1"), "hello").unwrap();
        assert_eq!(value(&sheet, "B1"), CellValue::Error(CellError::Value));
    }

    #[test]
    fn division_by_zero() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=1/0").unwrap();
        assert_eq!(
            value(&sheet, "A1"),
            CellValue::Error(CellError::Arithmetic)
        );
        // Errors are not memoized; the read stays stable anyway
        assert_eq!(
            value(&sheet, "A1"),
            CellValue::Error(CellError::Arithmetic)
        );
    }

    #[test]
    fn escape_prefix() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "'=1+2").unwrap();

        let a1 = sheet.get_cell(pos("A1")).unwrap();
        assert_eq!(a1.value(&sheet), CellValue::Text("=1+2".to_string()));
        assert_eq!(a1.text(), "'=1+2");
    }

    #[test]
    fn auto_materialization() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=Z9+1").unwrap();

        assert!(sheet.get_cell(pos("Z9")).is_some());
        assert_eq!(value(&sheet, "Z9"), CellValue::Text(String::new()));
        assert_eq!(value(&sheet, "A1"), CellValue::Number(1.0));
        assert_eq!(
            sheet.get_cell(pos("A1")).unwrap().referenced_cells(),
            &[pos("Z9")]
        );
    }

    #[test]
    fn setting_canonical_text_back_is_a_noop() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "2").unwrap();
        sheet.set_cell(pos("B1"), "= (A1 * 2) + (3 / 2)").unwrap();

        let before = value(&sheet, "B1");
        let text = sheet.get_cell(pos("B1")).unwrap().text();
        assert_eq!(text, "=A1*2+3/2");

        sheet.set_cell(pos("B1"), &text).unwrap();
        assert_eq!(value(&sheet, "B1"), before);
        assert_eq!(sheet.get_cell(pos("B1")).unwrap().text(), text);
    }

    #[test]
    fn formula_chain_recomputes_through_layers() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "1").unwrap();
        sheet.set_cell(pos("B1"), "=A1+A2").unwrap();
        sheet.set_cell(pos("C1"), "=B1*2").unwrap();
        sheet.set_cell(pos("D1"), "=C1-B1").unwrap();

        assert_eq!(value(&sheet, "D1"), CellValue::Number(1.0));

        sheet.set_cell(pos("A2"), "10").unwrap();
        assert_eq!(value(&sheet, "B1"), CellValue::Number(11.0));
        assert_eq!(value(&sheet, "C1"), CellValue::Number(22.0));
        assert_eq!(value(&sheet, "D1"), CellValue::Number(11.0));
    }

    #[test]
    fn edge_symmetry_across_edits() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("C1"), "=A1+B1").unwrap();
        sheet.set_cell(pos("D1"), "=A1*C1").unwrap();
        sheet.set_cell(pos("C1"), "=B1").unwrap();

        for cell_pos in [pos("A1"), pos("B1"), pos("C1"), pos("D1")] {
            let cell = sheet.get_cell(cell_pos).unwrap();
            for &referenced in cell.referenced_cells() {
                // Every referenced cell was materialized...
                assert!(sheet.get_cell(referenced).is_some());
                // ...and carries the matching reverse edge
                assert!(sheet
                    .graph()
                    .dependents_of(referenced)
                    .is_some_and(|deps| deps.contains(&cell_pos)));
            }
        }

        // Forward lists are sorted ascending without duplicates
        let refs = sheet.get_cell(pos("D1")).unwrap().referenced_cells();
        assert_eq!(refs, &[pos("A1"), pos("C1")]);
        assert!(refs.windows(2).all(|w| w[0] < w[1]));
    }
}
