//! FILENAME: engine/src/position.rs
//! PURPOSE: Typed cell coordinates and conversions to/from A1-style notation.
//! CONTEXT: A `Position` is a (row, col) pair with 0-based indices.
//! Column "A" = 0, "B" = 1, ..., "Z" = 25, "AA" = 26, etc.
//! Row 1 in A1 notation = row 0 internally. Positions outside the sheet
//! limits (16384 rows x 16384 columns) are representable but not valid;
//! the sentinel `Position::NONE` stands for "no position".

use serde::{Deserialize, Serialize};

/// A cell coordinate as (row, col) with 0-based indices.
/// Ordering is lexicographic: by row first, then by column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const MAX_ROWS: i32 = 16384;
    pub const MAX_COLS: i32 = 16384;

    /// The "no position" sentinel, used for references that cannot be
    /// resolved to a spot on the sheet.
    pub const NONE: Position = Position { row: -1, col: -1 };

    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// Returns true if the position lies within the sheet limits.
    pub fn is_valid(&self) -> bool {
        (0..Self::MAX_ROWS).contains(&self.row) && (0..Self::MAX_COLS).contains(&self.col)
    }

    /// Parses an A1-style reference ("A1", "AA100") into a Position.
    /// Returns None for anything that is not the string form of a valid
    /// position: empty input, letters after digits, lowercase letters,
    /// more than three column letters (the most that fit in 16384
    /// columns), or a row/column outside the sheet limits.
    pub fn from_string(s: &str) -> Option<Position> {
        let letters: String = s.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        let digits = &s[letters.len()..];

        if letters.is_empty() || letters.len() > 3 || digits.is_empty() {
            return None;
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let col = letters_to_col(&letters)?;
        let row_num = digits.parse::<i64>().ok()?;
        if row_num < 1 || row_num > Self::MAX_ROWS as i64 {
            return None;
        }

        Some(Position {
            row: (row_num - 1) as i32,
            col,
        })
    }
}

impl std::fmt::Display for Position {
    /// Writes the A1-style form: (0, 0) -> "A1", (99, 26) -> "AA100".
    /// Positions outside the sheet limits have no string form and write
    /// nothing.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.is_valid() {
            return Ok(());
        }
        write!(f, "{}{}", col_to_letters(self.col), self.row + 1)
    }
}

/// Converts a column string (e.g., "A", "AA") to a 0-based column index.
/// "A" -> 0, "B" -> 1, ..., "Z" -> 25, "AA" -> 26, "AB" -> 27, etc.
/// Returns None if the string is empty, contains anything other than
/// uppercase ASCII letters, or names a column past the sheet limit.
pub fn letters_to_col(col_str: &str) -> Option<i32> {
    if col_str.is_empty() {
        return None;
    }

    let mut result: i64 = 0;
    for c in col_str.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        result = result * 26 + (c as i64 - 'A' as i64 + 1);
        if result > Position::MAX_COLS as i64 {
            return None;
        }
    }
    Some((result - 1) as i32)
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 1 -> "B", ..., 25 -> "Z", 26 -> "AA", 27 -> "AB", etc.
pub fn col_to_letters(mut col_index: i32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}
