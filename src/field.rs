//! Playing field representation and line clearing

use crate::tetromino::Tetromino;

/// Field dimensions
pub const FIELD_WIDTH: usize = 10;
pub const FIELD_HEIGHT: usize = 22;
/// Rows above the visible area, used to detect game over before pieces show
pub const HIDDEN_ROWS: usize = 2;

/// A cell on the field - either empty or holding a locked tetromino
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Block(Tetromino),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Block(_))
    }
}

/// The game field, stored row-major with row 0 at the top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    cells: [Cell; FIELD_WIDTH * FIELD_HEIGHT],
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

impl Field {
    /// Create a new empty field
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; FIELD_WIDTH * FIELD_HEIGHT],
        }
    }

    fn index(x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= FIELD_WIDTH as i32 || y >= FIELD_HEIGHT as i32 {
            return None;
        }
        Some(y as usize * FIELD_WIDTH + x as usize)
    }

    /// Get the cell at `(x, y)`, or None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        Self::index(x, y).map(|i| self.cells[i])
    }

    /// Set the cell at `(x, y)`. Returns false if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// True if `(x, y)` is inside the field and empty
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|cell| cell.is_empty())
    }

    fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * FIELD_WIDTH..(y + 1) * FIELD_WIDTH]
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y).iter().all(|cell| cell.is_filled())
    }

    /// True if any cell in the hidden top rows is occupied
    pub fn hidden_rows_occupied(&self) -> bool {
        self.cells[..HIDDEN_ROWS * FIELD_WIDTH]
            .iter()
            .any(|cell| cell.is_filled())
    }

    /// Clear every full row and return how many were cleared.
    ///
    /// Rows are scanned bottom-up. A full row is removed by shifting every
    /// row above it down by one and emptying the top row; the same row
    /// index is then examined again, since it now holds what was above.
    pub fn clear_full_lines(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = FIELD_HEIGHT;

        while y > 0 {
            let row = y - 1;
            if !self.is_row_full(row) {
                y -= 1;
                continue;
            }

            cleared += 1;
            self.cells.copy_within(..row * FIELD_WIDTH, FIELD_WIDTH);
            self.cells[..FIELD_WIDTH].fill(Cell::Empty);
        }

        cleared
    }

    /// Iterate over the rows shown to the player, top to bottom
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Cell]> {
        (HIDDEN_ROWS..FIELD_HEIGHT).map(|y| self.row(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BLOCK: Cell = Cell::Block(Tetromino::I);

    fn fill_row(field: &mut Field, y: i32) {
        for x in 0..FIELD_WIDTH as i32 {
            field.set(x, y, BLOCK);
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut field = Field::new();
        assert!(field.set(5, 5, Cell::Block(Tetromino::T)));
        assert_eq!(field.get(5, 5), Some(Cell::Block(Tetromino::T)));
        assert!(!field.is_empty(5, 5));
        assert!(field.is_empty(4, 5));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut field = Field::new();
        assert_eq!(field.get(-1, 0), None);
        assert_eq!(field.get(0, -1), None);
        assert_eq!(field.get(FIELD_WIDTH as i32, 0), None);
        assert_eq!(field.get(0, FIELD_HEIGHT as i32), None);
        assert!(!field.set(FIELD_WIDTH as i32, 0, BLOCK));
        assert!(!field.is_empty(-1, 3));
    }

    #[test]
    fn test_clear_single_line() {
        let mut field = Field::new();
        let bottom = FIELD_HEIGHT as i32 - 1;
        fill_row(&mut field, bottom);
        field.set(0, bottom - 1, Cell::Block(Tetromino::Z));

        assert_eq!(field.clear_full_lines(), 1);
        // The block above dropped into the bottom row
        assert_eq!(field.get(0, bottom), Some(Cell::Block(Tetromino::Z)));
        assert!(field.is_empty(0, bottom - 1));
    }

    #[test]
    fn test_clear_non_contiguous_lines() {
        let mut field = Field::new();
        let bottom = FIELD_HEIGHT as i32 - 1;
        fill_row(&mut field, bottom);
        field.set(3, bottom - 1, Cell::Block(Tetromino::O));
        fill_row(&mut field, bottom - 2);
        field.set(7, bottom - 3, Cell::Block(Tetromino::L));

        assert_eq!(field.clear_full_lines(), 2);
        assert_eq!(field.get(3, bottom), Some(Cell::Block(Tetromino::O)));
        assert_eq!(field.get(7, bottom - 1), Some(Cell::Block(Tetromino::L)));
        assert!(!field.is_row_full(bottom as usize));
    }

    #[test]
    fn test_hidden_rows_occupied() {
        let mut field = Field::new();
        assert!(!field.hidden_rows_occupied());
        field.set(9, HIDDEN_ROWS as i32, BLOCK);
        assert!(!field.hidden_rows_occupied());
        field.set(9, HIDDEN_ROWS as i32 - 1, BLOCK);
        assert!(field.hidden_rows_occupied());
    }

    #[test]
    fn test_visible_rows_skip_hidden() {
        let field = Field::new();
        assert_eq!(field.visible_rows().count(), FIELD_HEIGHT - HIDDEN_ROWS);
    }

    proptest! {
        #[test]
        fn prop_clear_full_lines_shifts_losslessly(
            rows in proptest::collection::vec(
                proptest::collection::vec(any::<bool>(), FIELD_WIDTH),
                FIELD_HEIGHT,
            ),
            full in proptest::collection::vec(any::<bool>(), FIELD_HEIGHT),
        ) {
            let mut field = Field::new();
            for (y, row) in rows.iter().enumerate() {
                for (x, &occupied) in row.iter().enumerate() {
                    if occupied || full[y] {
                        field.set(x as i32, y as i32, BLOCK);
                    }
                }
            }
            let before = field.clone();
            let full_rows: Vec<usize> =
                (0..FIELD_HEIGHT).filter(|&y| before.is_row_full(y)).collect();

            let cleared = field.clear_full_lines();

            prop_assert_eq!(cleared, full_rows.len());
            for y in 0..FIELD_HEIGHT {
                prop_assert!(!field.is_row_full(y));
            }
            // Row i moves down by the number of cleared rows below it
            for y in (0..FIELD_HEIGHT).filter(|y| !full_rows.contains(y)) {
                let shift = full_rows.iter().filter(|&&r| r > y).count();
                prop_assert_eq!(before.row(y), field.row(y + shift));
            }
            for y in 0..cleared {
                prop_assert!(field.row(y).iter().all(|c| c.is_empty()));
            }
        }
    }
}
