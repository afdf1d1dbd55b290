//! Active falling piece, collision tests and placement

use crate::field::{Cell, Field, FIELD_HEIGHT, FIELD_WIDTH};
use crate::tetromino::{Rotation, Tetromino};

/// Absolute cell coordinates of a piece at the given anchor and rotation
fn absolute_cells(kind: Tetromino, x: i32, y: i32, rotation: Rotation) -> [(i32, i32); 4] {
    kind.cells(rotation)
        .map(|(dx, dy)| (x + i32::from(dx), y + i32::from(dy)))
}

/// Returns true if the piece would overlap a wall, the floor or an
/// occupied cell. Cells above the top of the field are always free.
pub fn check_collision(field: &Field, kind: Tetromino, x: i32, y: i32, rotation: Rotation) -> bool {
    absolute_cells(kind, x, y, rotation).into_iter().any(|(fx, fy)| {
        if fx < 0 || fx >= FIELD_WIDTH as i32 || fy >= FIELD_HEIGHT as i32 {
            return true;
        }
        fy >= 0 && !field.is_empty(fx, fy)
    })
}

/// Write `value` into the four cells of the piece.
///
/// Cells above the top of the field are skipped. Returns false if any cell
/// lies beside or below the field; the cells inside it are still written.
pub fn place_tetromino(
    field: &mut Field,
    kind: Tetromino,
    x: i32,
    y: i32,
    rotation: Rotation,
    value: Cell,
) -> bool {
    let mut in_bounds = true;
    for (fx, fy) in absolute_cells(kind, x, y, rotation) {
        if fx < 0 || fx >= FIELD_WIDTH as i32 || fy >= FIELD_HEIGHT as i32 {
            in_bounds = false;
            continue;
        }
        if fy < 0 {
            continue;
        }
        field.set(fx, fy, value);
    }
    in_bounds
}

/// The piece currently under player control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: Tetromino,
    pub rotation: Rotation,
    /// Anchor position; y grows downward
    pub x: i32,
    pub y: i32,
    /// Whether the last successful action on this piece was a rotation
    pub rotated_last: bool,
}

impl Piece {
    /// Create a new piece at its spawn anchor
    pub fn spawn(kind: Tetromino) -> Self {
        let (x, y) = kind.spawn_position();
        Self {
            kind,
            rotation: Rotation::North,
            x,
            y,
            rotated_last: false,
        }
    }

    /// Absolute positions of all 4 blocks
    #[cfg(test)]
    pub(crate) fn block_positions(&self) -> [(i32, i32); 4] {
        absolute_cells(self.kind, self.x, self.y, self.rotation)
    }

    pub fn collides(&self, field: &Field) -> bool {
        check_collision(field, self.kind, self.x, self.y, self.rotation)
    }

    /// Write the piece into the field with its own tag
    pub fn stamp(&self, field: &mut Field) -> bool {
        place_tetromino(
            field,
            self.kind,
            self.x,
            self.y,
            self.rotation,
            Cell::Block(self.kind),
        )
    }

    /// Remove the piece from the field
    pub fn erase(&self, field: &mut Field) {
        place_tetromino(field, self.kind, self.x, self.y, self.rotation, Cell::Empty);
    }

    /// Try to move sideways by `dx`, returns true if successful
    pub fn shift(&mut self, field: &Field, dx: i32) -> bool {
        if check_collision(field, self.kind, self.x + dx, self.y, self.rotation) {
            return false;
        }
        self.x += dx;
        self.rotated_last = false;
        true
    }

    /// Try to rotate clockwise in place. No wall kicks are attempted.
    pub fn rotate(&mut self, field: &Field) -> bool {
        let rotation = self.rotation.cw();
        if check_collision(field, self.kind, self.x, self.y, rotation) {
            return false;
        }
        self.rotation = rotation;
        self.rotated_last = true;
        true
    }

    /// Check whether the piece could move down one row
    pub fn can_fall(&self, field: &Field) -> bool {
        !check_collision(field, self.kind, self.x, self.y + 1, self.rotation)
    }

    /// Detect a spin: a T piece turned into place with at least three of
    /// its four diagonal neighbours blocked
    pub fn is_spin(&self, field: &Field) -> bool {
        if self.kind != Tetromino::T || !self.rotated_last {
            return false;
        }

        let corners = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
        let blocked = corners
            .iter()
            .filter(|&&(dx, dy)| {
                let (cx, cy) = (self.x + dx, self.y + dy);
                if cy < 0 {
                    // Above the field counts as open
                    return false;
                }
                !field.is_empty(cx, cy)
            })
            .count();

        blocked >= 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::HIDDEN_ROWS;

    const BLOCK: Cell = Cell::Block(Tetromino::O);

    #[test]
    fn test_spawn_position() {
        let piece = Piece::spawn(Tetromino::T);
        assert_eq!((piece.x, piece.y), (4, 0));
        assert_eq!(piece.rotation, Rotation::North);
    }

    #[test]
    fn test_no_collision_on_empty_field() {
        let field = Field::new();
        for kind in Tetromino::ALL {
            let (x, y) = kind.spawn_position();
            assert!(!check_collision(&field, kind, x, y, Rotation::North), "{kind:?}");
        }
    }

    #[test]
    fn test_collision_with_walls_and_floor() {
        let field = Field::new();
        // I piece spans x-1..=x+2
        assert!(check_collision(&field, Tetromino::I, 0, 5, Rotation::North));
        assert!(!check_collision(&field, Tetromino::I, 1, 5, Rotation::North));
        assert!(check_collision(&field, Tetromino::I, 8, 5, Rotation::North));
        assert!(!check_collision(&field, Tetromino::I, 7, 5, Rotation::North));
        // O piece covers y..=y+1
        let floor = FIELD_HEIGHT as i32 - 2;
        assert!(!check_collision(&field, Tetromino::O, 4, floor, Rotation::North));
        assert!(check_collision(&field, Tetromino::O, 4, FIELD_HEIGHT as i32 - 1, Rotation::North));
    }

    #[test]
    fn test_cells_above_top_are_free() {
        let field = Field::new();
        // Vertical I reaches two rows above its anchor
        assert!(!check_collision(&field, Tetromino::I, 4, 0, Rotation::East));
    }

    #[test]
    fn test_collision_with_occupied_cell() {
        let mut field = Field::new();
        field.set(5, 10, BLOCK);
        assert!(check_collision(&field, Tetromino::O, 4, 9, Rotation::North));
        assert!(!check_collision(&field, Tetromino::O, 6, 9, Rotation::North));
    }

    #[test]
    fn test_place_and_erase() {
        let mut field = Field::new();
        let value = Cell::Block(Tetromino::T);
        assert!(place_tetromino(&mut field, Tetromino::T, 4, 5, Rotation::North, value));
        for (x, y) in [(3, 5), (4, 5), (5, 5), (4, 6)] {
            assert_eq!(field.get(x, y), Some(value));
        }
        assert!(place_tetromino(&mut field, Tetromino::T, 4, 5, Rotation::North, Cell::Empty));
        assert_eq!(field, Field::new());
    }

    #[test]
    fn test_place_skips_rows_above_top() {
        let mut field = Field::new();
        assert!(place_tetromino(&mut field, Tetromino::I, 4, 0, Rotation::East, BLOCK));
        assert_eq!(field.get(4, 0), Some(BLOCK));
        assert_eq!(field.get(4, 1), Some(BLOCK));
    }

    #[test]
    fn test_place_rejects_out_of_bounds() {
        let mut field = Field::new();
        assert!(!place_tetromino(&mut field, Tetromino::I, 0, 5, Rotation::North, BLOCK));
        let below = FIELD_HEIGHT as i32 - 1;
        assert!(!place_tetromino(&mut field, Tetromino::O, 0, below, Rotation::North, BLOCK));
    }

    #[test]
    fn test_shift_and_rotate_fail_silently() {
        let mut field = Field::new();
        let mut piece = Piece::spawn(Tetromino::I);
        piece.y = HIDDEN_ROWS as i32 + 3;
        piece.x = 1;
        assert!(!piece.shift(&field, -1));
        assert_eq!(piece.x, 1);
        assert!(piece.shift(&field, 1));
        assert_eq!(piece.x, 2);

        // Block the vertical footprint so the rotation is rejected
        field.set(2, piece.y + 1, BLOCK);
        assert!(!piece.rotate(&field));
        assert_eq!(piece.rotation, Rotation::North);
    }

    #[test]
    fn test_can_fall() {
        let field = Field::new();
        let mut piece = Piece::spawn(Tetromino::O);
        assert!(piece.can_fall(&field));
        piece.y = FIELD_HEIGHT as i32 - 2;
        assert!(!piece.can_fall(&field));
    }

    #[test]
    fn test_spin_detection() {
        let mut field = Field::new();
        let mut piece = Piece::spawn(Tetromino::T);
        piece.x = 4;
        piece.y = 10;
        field.set(3, 9, BLOCK);
        field.set(5, 9, BLOCK);
        field.set(3, 11, BLOCK);
        assert!(!piece.is_spin(&field));

        piece.rotated_last = true;
        assert!(piece.is_spin(&field));

        piece.kind = Tetromino::L;
        assert!(!piece.is_spin(&field));
    }
}
