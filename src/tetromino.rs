//! Tetromino catalog
//!
//! Static shape, rotation and spawn tables for the seven piece kinds.
//! Offsets are `(dx, dy)` relative to the anchor, with `y` growing downward.
//! The four rotation states of every kind are listed in clockwise order.

use ratatui::style::Color;

/// The 7 tetromino kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tetromino {
    I, // long bar
    T,
    Z,
    S, // mirrored Z
    L,
    J, // mirrored L
    O, // square
}

type Shape = [(i8, i8); 4];

const I_SHAPES: [Shape; 4] = [
    [(-1, 0), (0, 0), (1, 0), (2, 0)],
    [(0, -2), (0, -1), (0, 0), (0, 1)],
    [(-1, 0), (0, 0), (1, 0), (2, 0)],
    [(0, -2), (0, -1), (0, 0), (0, 1)],
];

const T_SHAPES: [Shape; 4] = [
    [(-1, 0), (0, 0), (1, 0), (0, 1)],
    [(0, -1), (0, 0), (0, 1), (-1, 0)],
    [(-1, 0), (0, 0), (1, 0), (0, -1)],
    [(0, -1), (0, 0), (0, 1), (1, 0)],
];

const Z_SHAPES: [Shape; 4] = [
    [(-1, -1), (0, -1), (0, 0), (1, 0)],
    [(1, -1), (1, 0), (0, 0), (0, 1)],
    [(-1, -1), (0, -1), (0, 0), (1, 0)],
    [(1, -1), (1, 0), (0, 0), (0, 1)],
];

const S_SHAPES: [Shape; 4] = [
    [(1, -1), (0, -1), (0, 0), (-1, 0)],
    [(-1, -1), (-1, 0), (0, 0), (0, 1)],
    [(1, -1), (0, -1), (0, 0), (-1, 0)],
    [(-1, -1), (-1, 0), (0, 0), (0, 1)],
];

const L_SHAPES: [Shape; 4] = [
    [(0, 1), (0, 0), (1, 0), (2, 0)],
    [(-1, 0), (0, 0), (0, 1), (0, 2)],
    [(-2, 0), (-1, 0), (0, 0), (0, -1)],
    [(0, -2), (0, -1), (0, 0), (1, 0)],
];

const J_SHAPES: [Shape; 4] = [
    [(-2, 0), (-1, 0), (0, 0), (0, 1)],
    [(-1, 0), (0, 0), (0, -1), (0, -2)],
    [(2, 0), (1, 0), (0, 0), (0, -1)],
    [(0, 2), (0, 1), (0, 0), (1, 0)],
];

const O_SHAPES: [Shape; 4] = [[(0, 0), (1, 0), (1, 1), (0, 1)]; 4];

impl Tetromino {
    /// All kinds, in catalog order
    pub const ALL: [Tetromino; 7] = [
        Tetromino::I,
        Tetromino::T,
        Tetromino::Z,
        Tetromino::S,
        Tetromino::L,
        Tetromino::J,
        Tetromino::O,
    ];

    /// Cell offsets `(dx, dy)` for this kind at the given rotation
    pub fn cells(&self, rotation: Rotation) -> [(i8, i8); 4] {
        let shapes = match self {
            Tetromino::I => &I_SHAPES,
            Tetromino::T => &T_SHAPES,
            Tetromino::Z => &Z_SHAPES,
            Tetromino::S => &S_SHAPES,
            Tetromino::L => &L_SHAPES,
            Tetromino::J => &J_SHAPES,
            Tetromino::O => &O_SHAPES,
        };
        shapes[rotation.index()]
    }

    /// Spawn anchor `(x, y)`, inside the hidden top rows
    pub fn spawn_position(&self) -> (i32, i32) {
        match self {
            Tetromino::I => (3, 1),
            Tetromino::T => (4, 0),
            Tetromino::Z => (4, 1),
            Tetromino::S => (4, 1),
            Tetromino::L => (3, 0),
            Tetromino::J => (5, 0),
            Tetromino::O => (3, 0),
        }
    }

    /// Character drawn for cells of this kind
    pub fn glyph(&self) -> char {
        match self {
            Tetromino::I => 'I',
            Tetromino::T => 'T',
            Tetromino::Z => 'Z',
            Tetromino::S => 'S',
            Tetromino::L => 'L',
            Tetromino::J => 'J',
            Tetromino::O => 'O',
        }
    }

    /// Get the color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            Tetromino::I => Color::Cyan,
            Tetromino::O => Color::Yellow,
            Tetromino::T => Color::Magenta,
            Tetromino::S => Color::Green,
            Tetromino::Z => Color::Red,
            Tetromino::J => Color::Blue,
            Tetromino::L => Color::Rgb(255, 165, 0), // Orange
        }
    }
}

/// Rotation states, clockwise quarter turns from the spawn state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise: North → East → South → West → North
    pub fn cw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Table index, 0-3
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}
