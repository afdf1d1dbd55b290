//! Screen drawing through a minimal character sink, and a sink backed by a
//! ratatui buffer

use crate::field::{Cell, FIELD_HEIGHT, FIELD_WIDTH, HIDDEN_ROWS};
use crate::game::Game;
use crate::highscore::{HIGHSCORE_CAPACITY, HighscoreTable};
use crate::scoreboard::{Scoreboard, ScoreboardState};
use crate::settings::VisualSettings;
use crate::tetromino::{Rotation, Tetromino};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier},
};

/// Size of every screen drawn here
pub const SCREEN_WIDTH: u16 = 40;
pub const SCREEN_HEIGHT: u16 = 22;

const VISIBLE_ROWS: u16 = (FIELD_HEIGHT - HIDDEN_ROWS) as u16;
/// Inner width of the board: two columns per cell
const BOARD_WIDTH: u16 = FIELD_WIDTH as u16 * 2;
const PANEL_COL: u16 = BOARD_WIDTH + 4;
const PREVIEW_ROW: u16 = 12;

/// Character output primitives
pub trait RenderSink {
    /// Move the cursor; rows and columns start at 0
    fn move_to(&mut self, row: u16, col: u16);

    /// Write a character and advance the cursor
    fn put_char(&mut self, c: char);

    fn put_str(&mut self, s: &str) {
        for c in s.chars() {
            self.put_char(c);
        }
    }

    /// Write a decimal number
    fn put_number(&mut self, n: u64) {
        self.put_str(&n.to_string());
    }

    /// Write one field cell, two columns wide
    fn put_cell(&mut self, cell: Cell) {
        match cell {
            Cell::Empty => self.put_str(" ."),
            Cell::Block(kind) => {
                self.put_char(kind.glyph());
                self.put_char(kind.glyph());
            }
        }
    }

    /// Called once a complete frame has been written
    fn present(&mut self) {}
}

/// Draw the field, the score panel and the next-piece preview
pub fn draw_game(game: &Game, sink: &mut dyn RenderSink) {
    draw_frame(sink, 0, 0, BOARD_WIDTH, VISIBLE_ROWS);
    for (i, row) in game.field().visible_rows().enumerate() {
        sink.move_to(1 + i as u16, 1);
        for &cell in row {
            sink.put_cell(cell);
        }
    }

    let score = &game.score;
    let stats = [
        ("SCORE", score.points),
        ("LEVEL", u64::from(score.level)),
        ("LINES", u64::from(score.lines)),
    ];
    for (i, (label, value)) in stats.into_iter().enumerate() {
        let row = 1 + 3 * i as u16;
        sink.move_to(row, PANEL_COL);
        sink.put_str(label);
        sink.move_to(row + 1, PANEL_COL);
        sink.put_number(value);
    }

    sink.move_to(PREVIEW_ROW - 2, PANEL_COL);
    sink.put_str("NEXT");
    draw_preview(sink, game.next());

    if game.is_over() {
        draw_banner(sink, VISIBLE_ROWS / 2, "GAME OVER");
        draw_banner(sink, VISIBLE_ROWS / 2 + 1, "press a key");
    }
}

/// Draw the preview piece in its spawn orientation
fn draw_preview(sink: &mut dyn RenderSink, kind: Tetromino) {
    let cells = kind.cells(Rotation::North);
    let min_x = cells.iter().map(|&(dx, _)| dx).min().unwrap_or(0);
    let min_y = cells.iter().map(|&(_, dy)| dy).min().unwrap_or(0);

    for row in 0..2 {
        sink.move_to(PREVIEW_ROW + row, PANEL_COL);
        for _ in 0..4 {
            sink.put_str("  ");
        }
    }
    for (dx, dy) in cells {
        let row = PREVIEW_ROW + (dy - min_y) as u16;
        let col = PANEL_COL + 2 * (dx - min_x) as u16;
        sink.move_to(row, col);
        sink.put_cell(Cell::Block(kind));
    }
}

/// Centered text across the board
fn draw_banner(sink: &mut dyn RenderSink, row: u16, text: &str) {
    let width = text.len() as u16 + 2;
    let col = 1 + BOARD_WIDTH.saturating_sub(width) / 2;
    sink.move_to(row, col);
    sink.put_char(' ');
    sink.put_str(text);
    sink.put_char(' ');
}

/// Box outline whose inside starts at `(row + 1, col + 1)`
fn draw_frame(sink: &mut dyn RenderSink, row: u16, col: u16, width: u16, height: u16) {
    let horizontal = format!("+{}+", "-".repeat(usize::from(width)));
    sink.move_to(row, col);
    sink.put_str(&horizontal);
    for r in 1..=height {
        sink.move_to(row + r, col);
        sink.put_char('|');
        sink.move_to(row + r, col + width + 1);
        sink.put_char('|');
    }
    sink.move_to(row + height + 1, col);
    sink.put_str(&horizontal);
}

pub fn draw_welcome(sink: &mut dyn RenderSink) {
    let lines = [
        (3, "F A L L E R"),
        (6, "ENTER / F5   play"),
        (7, "H / F6       highscores"),
        (8, "Q            quit"),
        (11, "arrows  move, rotate, drop"),
        (12, "SPACE   hard drop"),
    ];
    for (row, text) in lines {
        sink.move_to(row, 6);
        sink.put_str(text);
    }
}

/// Draw the highscore table and the dialog for the current state
pub fn draw_scoreboard(board: &Scoreboard, table: &HighscoreTable, sink: &mut dyn RenderSink) {
    sink.move_to(0, 2);
    sink.put_str("HIGHSCORES");

    for rank in 0..HIGHSCORE_CAPACITY {
        sink.move_to(2 + rank as u16, 2);
        sink.put_number(rank as u64 + 1);
        sink.put_str(". ");
        match table.entries().get(rank) {
            Some(entry) => {
                sink.put_str(&format!("{:<10} ", entry.display_name()));
                sink.put_number(u64::from(entry.score));
            }
            None => sink.put_str("---"),
        }
    }

    let row = 3 + HIGHSCORE_CAPACITY as u16;
    match board.state() {
        ScoreboardState::View | ScoreboardState::Exit => {
            sink.move_to(row, 2);
            sink.put_str("ENTER back    C clear");
        }
        ScoreboardState::NameEntry => {
            sink.move_to(row, 2);
            sink.put_str("NEW HIGHSCORE ");
            sink.put_number(u64::from(board.pending_score().unwrap_or(0)));
            sink.move_to(row + 1, 2);
            sink.put_str("NAME: ");
            sink.put_str(&String::from_utf8_lossy(board.name()));
            sink.put_char('_');
            sink.move_to(row + 3, 2);
            sink.put_str("F3/F4 [");
            sink.put_char(board.selected_char());
            sink.put_str("]  F2 add  F6 del");
            sink.move_to(row + 4, 2);
            sink.put_str("ENTER save    ESC skip");
        }
        ScoreboardState::ConfirmClear => {
            sink.move_to(row, 2);
            sink.put_str("Clear all highscores? (Y/N)");
        }
    }
}

/// Center a rect within another rect
pub fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Sink writing into a region of a ratatui buffer. Output outside the
/// region is clipped.
pub struct BufferSink<'a> {
    buffer: &'a mut Buffer,
    area: Rect,
    row: u16,
    col: u16,
    filled: &'static str,
    empty: &'static str,
}

impl<'a> BufferSink<'a> {
    pub fn new(buffer: &'a mut Buffer, area: Rect) -> Self {
        Self {
            buffer,
            area,
            row: 0,
            col: 0,
            filled: "[]",
            empty: " .",
        }
    }

    /// Draw field cells with the configured block characters
    pub fn with_block_style(mut self, visual: &VisualSettings) -> Self {
        (self.filled, self.empty) = visual.block_chars();
        self
    }

    fn write(&mut self, c: char, fg: Color, modifier: Modifier) {
        if self.row < self.area.height && self.col < self.area.width {
            let position = (self.area.x + self.col, self.area.y + self.row);
            if let Some(cell) = self.buffer.cell_mut(position) {
                cell.set_char(c).set_fg(fg);
                cell.modifier = modifier;
            }
        }
        self.col = self.col.saturating_add(1);
    }
}

impl RenderSink for BufferSink<'_> {
    fn move_to(&mut self, row: u16, col: u16) {
        self.row = row;
        self.col = col;
    }

    fn put_char(&mut self, c: char) {
        self.write(c, Color::Reset, Modifier::empty());
    }

    fn put_cell(&mut self, cell: Cell) {
        match cell {
            Cell::Empty => {
                for c in self.empty.chars() {
                    self.write(c, Color::DarkGray, Modifier::DIM);
                }
            }
            Cell::Block(kind) => {
                for c in self.filled.chars() {
                    self.write(c, kind.color(), Modifier::empty());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::highscore::HighscoreEntry;
    use crate::piece::Piece;
    use crate::segment::MemoryStorage;
    use crate::settings::BlockStyle;
    use crate::store::HighscoreStore;

    fn screen() -> Buffer {
        Buffer::empty(Rect::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT))
    }

    fn sink(buffer: &mut Buffer) -> BufferSink<'_> {
        let area = buffer.area;
        BufferSink::new(buffer, area)
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect()
    }

    fn screen_text(buffer: &Buffer) -> String {
        (0..buffer.area.height)
            .map(|y| row_text(buffer, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_draw_game_layout() {
        let mut buffer = screen();
        let mut game = Game::with_seed(4);
        game.process(&mut sink(&mut buffer));

        let top = row_text(&buffer, 0);
        assert!(top.starts_with("+--------------------+"));
        assert!(row_text(&buffer, 1).starts_with("| . . . . . . . . . .|"));
        assert!(row_text(&buffer, 1).contains("SCORE"));
        assert_eq!(row_text(&buffer, 2)[usize::from(PANEL_COL)..].trim(), "0");
        assert!(row_text(&buffer, 21).starts_with("+--------------------+"));
        assert!(!screen_text(&buffer).contains("GAME OVER"));
    }

    #[test]
    fn test_locked_blocks_use_piece_color() {
        let mut buffer = screen();
        let mut game = Game::with_seed(4);
        game.replace_piece(Piece::spawn(Tetromino::O));
        game.push_command(Command::HardDrop);
        game.process(&mut sink(&mut buffer));

        // Bottom visible row is screen row 20; the O lands at columns 3-4
        let cell = &buffer[(7u16, 20u16)];
        assert_eq!(cell.symbol(), "[");
        assert_eq!(cell.fg, Tetromino::O.color());
    }

    #[test]
    fn test_block_style() {
        let mut buffer = screen();
        let visual = VisualSettings {
            block_style: BlockStyle::Round,
        };
        let mut sink = sink(&mut buffer).with_block_style(&visual);
        draw_preview(&mut sink, Tetromino::O);
        assert_eq!(row_text(&buffer, PREVIEW_ROW).trim(), "()()");
        assert_eq!(row_text(&buffer, PREVIEW_ROW + 1).trim(), "()()");
    }

    #[test]
    fn test_game_over_banner_in_same_frame() {
        let mut buffer = screen();
        let mut game = Game::with_seed(4);
        game.replace_piece(Piece::spawn(Tetromino::O));
        for y in HIDDEN_ROWS as i32..FIELD_HEIGHT as i32 {
            game.field_mut().set(3, y, Cell::Block(Tetromino::I));
        }
        game.push_command(Command::SoftDrop);
        game.process(&mut sink(&mut buffer));

        assert!(game.is_over());
        assert!(screen_text(&buffer).contains(" GAME OVER "));
    }

    #[test]
    fn test_draw_scoreboard_entries() {
        let mut store = HighscoreStore::open(MemoryStorage::new()).unwrap();
        store.submit(HighscoreEntry::new(900, b"zed")).unwrap();
        store.submit(HighscoreEntry::new(1200, b"amy")).unwrap();
        let board = Scoreboard::open(&store, None);

        let mut buffer = screen();
        draw_scoreboard(&board, store.table(), &mut sink(&mut buffer));

        assert!(row_text(&buffer, 0).contains("HIGHSCORES"));
        assert!(row_text(&buffer, 2).contains("1. amy"));
        assert!(row_text(&buffer, 2).contains("1200"));
        assert!(row_text(&buffer, 3).contains("2. zed"));
        assert!(row_text(&buffer, 4).contains("3. ---"));
        assert!(screen_text(&buffer).contains("C clear"));
    }

    #[test]
    fn test_draw_name_entry() {
        let mut store = HighscoreStore::open(MemoryStorage::new()).unwrap();
        let mut board = Scoreboard::open(&store, Some(321));
        board.handle_key(crate::input::Key::Char('J'), &mut store).unwrap();

        let mut buffer = screen();
        draw_scoreboard(&board, store.table(), &mut sink(&mut buffer));
        let text = screen_text(&buffer);
        assert!(text.contains("NEW HIGHSCORE 321"));
        assert!(text.contains("NAME: J_"));
        assert!(text.contains("[A]"));
    }

    #[test]
    fn test_draw_welcome() {
        let mut buffer = screen();
        draw_welcome(&mut sink(&mut buffer));
        assert!(screen_text(&buffer).contains("F A L L E R"));
    }

    #[test]
    fn test_sink_clips_to_area() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 4, 1));
        let mut sink = BufferSink::new(&mut buffer, Rect::new(1, 0, 2, 1));
        sink.put_str("abcdef");
        sink.move_to(5, 0);
        sink.put_char('z');
        assert_eq!(row_text(&buffer, 0), " ab ");
    }

    #[test]
    fn test_center_rect() {
        let area = Rect::new(0, 0, 100, 50);
        assert_eq!(center_rect(area, 40, 22), Rect::new(30, 14, 40, 22));
        assert_eq!(center_rect(Rect::new(0, 0, 10, 10), 40, 22), Rect::new(0, 0, 10, 10));
    }
}
