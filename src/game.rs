//! Core game state and logic

use crate::command::{Command, CommandQueue};
use crate::field::Field;
use crate::gravity::Gravity;
use crate::piece::Piece;
use crate::randomizer::Randomizer;
use crate::score::Score;
use crate::settings::GameplaySettings;
use crate::tetromino::Tetromino;
use crate::ui::{self, RenderSink};
use std::time::Duration;
use tracing::{debug, info};

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A piece is falling and commands are processed
    Falling,
    /// Terminal state; no further commands are accepted
    GameOver,
}

/// Result of moving the active piece down one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropOutcome {
    Moved,
    /// The piece locked and the next one spawned
    Locked,
    ToppedOut,
}

/// The main game struct
///
/// Between drains the active piece is written into the field, so the field
/// always shows what the player sees. While commands are being applied it
/// is lifted out again.
pub struct Game {
    field: Field,
    piece: Piece,
    next: Tetromino,
    queue: CommandQueue,
    /// Score tracking
    pub score: Score,
    gravity: Gravity,
    phase: Phase,
    randomizer: Randomizer,
}

impl Game {
    pub fn new(settings: &GameplaySettings, seed: u64) -> Self {
        let mut randomizer = Randomizer::new(settings.randomizer, seed);
        let first = randomizer.next();
        let next = randomizer.next();
        let mut field = Field::new();
        let piece = Piece::spawn(first);
        piece.stamp(&mut field);

        info!(seed, gravity_ms = settings.gravity_ms, "new game");

        Self {
            field,
            piece,
            next,
            queue: CommandQueue::new(),
            score: Score::new(),
            gravity: Gravity::new(Duration::from_millis(settings.gravity_ms)),
            phase: Phase::Falling,
            randomizer,
        }
    }

    /// Create a game with default settings
    #[cfg(test)]
    pub(crate) fn with_seed(seed: u64) -> Self {
        Self::new(&GameplaySettings::default(), seed)
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    #[cfg(test)]
    pub(crate) fn piece(&self) -> &Piece {
        &self.piece
    }

    /// The piece shown in the preview
    pub fn next(&self) -> Tetromino {
        self.next
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    #[cfg(test)]
    pub(crate) fn gravity_interval(&self) -> Duration {
        self.gravity.interval()
    }

    /// Time until the next gravity tick
    pub fn time_to_tick(&self) -> Duration {
        self.gravity.remaining()
    }

    #[cfg(test)]
    pub(crate) fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// Queue a command. Returns false if it was dropped.
    pub fn push_command(&mut self, command: Command) -> bool {
        if self.is_over() {
            return false;
        }
        self.queue.push(command)
    }

    /// Feed elapsed time to the gravity source. Returns true when a tick fired.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.is_over() || !self.gravity.advance(dt) {
            return false;
        }
        self.on_tick();
        true
    }

    /// Gravity tick: request one drop unless a drop is already pending
    pub fn on_tick(&mut self) {
        if self.is_over() || self.queue.has_pending_drop() {
            return;
        }
        self.queue.push(Command::SoftDrop);
    }

    /// Drain all queued commands, then render exactly once
    pub fn process(&mut self, sink: &mut dyn RenderSink) {
        if !self.is_over() {
            self.piece.erase(&mut self.field);

            while let Some(command) = self.queue.pop() {
                self.apply(command);
                if self.is_over() {
                    break;
                }
            }

            if !self.is_over() {
                let placed = self.piece.stamp(&mut self.field);
                debug_assert!(placed, "active piece left the field");
            }
        }

        if self.is_over() {
            self.queue.clear();
        }

        ui::draw_game(self, sink);
        sink.present();
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::MoveLeft => {
                self.piece.shift(&self.field, -1);
            }
            Command::MoveRight => {
                self.piece.shift(&self.field, 1);
            }
            Command::Rotate => {
                self.piece.rotate(&self.field);
            }
            Command::SoftDrop => {
                self.gravity.reset();
                self.step_down();
            }
            Command::HardDrop => {
                self.gravity.reset();
                while self.step_down() == DropOutcome::Moved {}
            }
        }
    }

    fn step_down(&mut self) -> DropOutcome {
        if self.piece.can_fall(&self.field) {
            self.piece.y += 1;
            self.piece.rotated_last = false;
            return DropOutcome::Moved;
        }
        self.lock_piece()
    }

    /// Lock the current piece, clear lines and spawn the next one
    fn lock_piece(&mut self) -> DropOutcome {
        if !self.piece.stamp(&mut self.field) {
            return self.game_over();
        }
        debug!(kind = ?self.piece.kind, x = self.piece.x, y = self.piece.y, "piece locked");

        if self.field.hidden_rows_occupied() {
            return self.game_over();
        }
        self.finish_lock()
    }

    /// Score the stamped piece and bring in the next one
    fn finish_lock(&mut self) -> DropOutcome {
        let spin = self.piece.is_spin(&self.field);
        let cleared = self.field.clear_full_lines();
        let update = self.score.update(cleared, spin);
        if cleared > 0 {
            debug!(
                cleared,
                spin,
                points = update.points,
                combo = self.score.combo,
                "lines cleared"
            );
        }
        if update.level_up {
            self.gravity.speed_up();
            info!(
                level = self.score.level,
                interval_ms = self.gravity.interval().as_millis() as u64,
                "level up"
            );
        }

        if !self.spawn_next() {
            return self.game_over();
        }
        DropOutcome::Locked
    }

    /// Promote the preview piece. Returns false if it spawns onto blocks.
    fn spawn_next(&mut self) -> bool {
        let kind = std::mem::replace(&mut self.next, self.randomizer.next());
        self.piece = Piece::spawn(kind);
        !self.piece.collides(&self.field)
    }

    fn game_over(&mut self) -> DropOutcome {
        self.phase = Phase::GameOver;
        info!(
            score = self.score.points,
            lines = self.score.lines,
            level = self.score.level,
            "game over"
        );
        DropOutcome::ToppedOut
    }

    /// Swap in a specific active piece
    #[cfg(test)]
    pub(crate) fn replace_piece(&mut self, piece: Piece) {
        self.piece.erase(&mut self.field);
        self.piece = piece;
        self.piece.stamp(&mut self.field);
    }

    #[cfg(test)]
    pub(crate) fn set_next(&mut self, kind: Tetromino) {
        self.next = kind;
    }

    #[cfg(test)]
    pub(crate) fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }
}
