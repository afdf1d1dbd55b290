//! Scoring: points per clear, combo streaks and level progression

/// Highest combo factor, also the last row of the score table
pub const MAX_COMBO: usize = 19;
/// Cleared lines per level
pub const LINES_PER_LEVEL: u32 = 10;

const fn build_score_table() -> [[u16; 4]; MAX_COMBO + 1] {
    let mut table = [[0u16; 4]; MAX_COMBO + 1];
    let mut factor = 0;
    while factor <= MAX_COMBO {
        let mut lines = 1;
        while lines <= 4 {
            table[factor][lines - 1] = (lines * lines * (factor + 1)) as u16;
            lines += 1;
        }
        factor += 1;
    }
    table
}

/// Points for `[combo factor][cleared lines - 1]`: cleared² × (factor + 1)
pub const SCORE_TABLE: [[u16; 4]; MAX_COMBO + 1] = build_score_table();

/// Result of one score update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreUpdate {
    pub points: u32,
    /// The level changed during this update
    pub level_up: bool,
}

/// Score tracking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Total lines cleared
    pub lines: u32,
    /// Current level, starts at 0
    pub level: u32,
    /// Lines cleared toward the next level
    pub partial_lines: u32,
    /// Consecutive clearing locks, capped at MAX_COMBO
    pub combo: usize,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a lock that cleared `cleared` lines.
    ///
    /// A lock without a clear resets the combo and scores nothing. A spin
    /// doubles the points of its clear.
    pub fn update(&mut self, cleared: usize, spin: bool) -> ScoreUpdate {
        if cleared == 0 {
            self.combo = 0;
            return ScoreUpdate::default();
        }

        let last_level = self.level;
        let cleared = cleared.min(4);
        self.lines += cleared as u32;
        self.partial_lines += cleared as u32;
        while self.partial_lines >= LINES_PER_LEVEL {
            self.partial_lines -= LINES_PER_LEVEL;
            self.level += 1;
        }

        let mut points = u32::from(SCORE_TABLE[self.combo][cleared - 1]);
        if spin {
            points *= 2;
        }
        self.points += u64::from(points);

        if self.combo < MAX_COMBO {
            self.combo += 1;
        }

        ScoreUpdate {
            points,
            level_up: self.level != last_level,
        }
    }
}
