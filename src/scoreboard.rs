//! Highscore screen state machine: table view, name entry and clearing

use crate::highscore::{HighscoreEntry, NAME_MAX};
use crate::input::Key;
use crate::segment::{SegmentStorage, StorageError};
use crate::store::HighscoreStore;
use tracing::info;

/// Characters offered when entering a name with the buttons
pub const NAME_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreboardState {
    View,
    /// Typing a name for a qualifying score
    NameEntry,
    ConfirmClear,
    /// Finished; the caller resets the application
    Exit,
}

#[derive(Debug, Clone)]
pub struct Scoreboard {
    state: ScoreboardState,
    /// Score waiting for a name
    pending: Option<u32>,
    name: Vec<u8>,
    /// Index into `NAME_CHARSET` for button entry
    selected: usize,
}

impl Scoreboard {
    /// Open the scoreboard, asking for a name if `score` makes the table
    pub fn open<S: SegmentStorage>(store: &HighscoreStore<S>, score: Option<u32>) -> Self {
        let pending = score.filter(|&score| store.qualifies(score));
        let state = if pending.is_some() {
            ScoreboardState::NameEntry
        } else {
            ScoreboardState::View
        };
        Self {
            state,
            pending,
            name: Vec::with_capacity(NAME_MAX),
            selected: 0,
        }
    }

    pub fn state(&self) -> ScoreboardState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == ScoreboardState::Exit
    }

    pub fn pending_score(&self) -> Option<u32> {
        self.pending
    }

    /// Name typed so far
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Character the buttons currently point at
    pub fn selected_char(&self) -> char {
        char::from(NAME_CHARSET[self.selected % NAME_CHARSET.len()])
    }

    pub fn handle_key<S: SegmentStorage>(
        &mut self,
        key: Key,
        store: &mut HighscoreStore<S>,
    ) -> Result<(), StorageError> {
        match self.state {
            ScoreboardState::View => self.handle_view(key),
            ScoreboardState::NameEntry => self.handle_name_entry(key, store)?,
            ScoreboardState::ConfirmClear => self.handle_confirm(key, store)?,
            ScoreboardState::Exit => {}
        }
        Ok(())
    }

    fn handle_view(&mut self, key: Key) {
        match key {
            Key::Char('c' | 'C') => self.state = ScoreboardState::ConfirmClear,
            Key::Enter | Key::Esc | Key::Char('q' | 'Q') | Key::Button(5 | 6) => {
                self.state = ScoreboardState::Exit
            }
            _ => {}
        }
    }

    fn handle_name_entry<S: SegmentStorage>(
        &mut self,
        key: Key,
        store: &mut HighscoreStore<S>,
    ) -> Result<(), StorageError> {
        match key {
            Key::Char(c) if (' '..='~').contains(&c) => self.push_char(c as u8),
            Key::Backspace | Key::Button(6) => {
                self.name.pop();
            }
            Key::Enter | Key::Button(1 | 5) => return self.commit(store),
            Key::Esc => {
                info!("name entry discarded");
                self.pending = None;
                self.name.clear();
                self.state = ScoreboardState::View;
            }
            Key::Button(3) => {
                self.selected = (self.selected + NAME_CHARSET.len() - 1) % NAME_CHARSET.len();
            }
            Key::Button(4) => self.selected = (self.selected + 1) % NAME_CHARSET.len(),
            Key::Button(2) => self.push_char(NAME_CHARSET[self.selected]),
            _ => {}
        }
        Ok(())
    }

    fn push_char(&mut self, c: u8) {
        if self.name.len() < NAME_MAX {
            self.name.push(c);
        }
    }

    fn commit<S: SegmentStorage>(
        &mut self,
        store: &mut HighscoreStore<S>,
    ) -> Result<(), StorageError> {
        let Some(score) = self.pending else {
            return Ok(());
        };
        if self.name.is_empty() {
            return Ok(());
        }

        let entry = HighscoreEntry::new(score, &self.name);
        self.pending = None;
        self.name.clear();
        self.state = ScoreboardState::View;
        store.submit(entry)?;
        info!(score, name = %entry.display_name(), "highscore entered");
        Ok(())
    }

    fn handle_confirm<S: SegmentStorage>(
        &mut self,
        key: Key,
        store: &mut HighscoreStore<S>,
    ) -> Result<(), StorageError> {
        match key {
            Key::Char('y' | 'Y') | Key::Button(5) => {
                self.state = ScoreboardState::Exit;
                store.clear()?;
            }
            Key::Char('n' | 'N') | Key::Esc | Key::Button(6) => self.state = ScoreboardState::View,
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscore::HIGHSCORE_CAPACITY;
    use crate::segment::MemoryStorage;

    fn store() -> HighscoreStore<MemoryStorage> {
        HighscoreStore::open(MemoryStorage::new()).unwrap()
    }

    fn type_str<S: SegmentStorage>(board: &mut Scoreboard, store: &mut HighscoreStore<S>, s: &str) {
        for c in s.chars() {
            board.handle_key(Key::Char(c), store).unwrap();
        }
    }

    #[test]
    fn test_opens_view_without_score() {
        let store = store();
        assert_eq!(Scoreboard::open(&store, None).state(), ScoreboardState::View);
        assert_eq!(Scoreboard::open(&store, Some(0)).state(), ScoreboardState::View);
    }

    #[test]
    fn test_name_entry_commits() {
        let mut store = store();
        let mut board = Scoreboard::open(&store, Some(120));
        assert_eq!(board.state(), ScoreboardState::NameEntry);

        type_str(&mut board, &mut store, "Ada!x");
        board.handle_key(Key::Backspace, &mut store).unwrap();
        assert_eq!(board.name(), b"Ada!");

        board.handle_key(Key::Enter, &mut store).unwrap();
        assert_eq!(board.state(), ScoreboardState::View);
        assert_eq!(store.table().entries()[0].name(), b"Ada!");
        assert_eq!(store.table().entries()[0].score, 120);
    }

    #[test]
    fn test_empty_name_not_committed() {
        let mut store = store();
        let mut board = Scoreboard::open(&store, Some(5));
        board.handle_key(Key::Enter, &mut store).unwrap();
        assert_eq!(board.state(), ScoreboardState::NameEntry);
        assert!(store.table().is_empty());
    }

    #[test]
    fn test_name_length_bounded() {
        let mut store = store();
        let mut board = Scoreboard::open(&store, Some(5));
        type_str(&mut board, &mut store, "abcdefghijklmno");
        assert_eq!(board.name().len(), NAME_MAX);
        // Non-printable input is ignored
        board.handle_key(Key::Char('\u{7f}'), &mut store).unwrap();
        assert_eq!(board.name(), b"abcdefghij");
    }

    #[test]
    fn test_button_name_entry() {
        let mut store = store();
        let mut board = Scoreboard::open(&store, Some(9));
        assert_eq!(board.selected_char(), 'A');
        board.handle_key(Key::Button(3), &mut store).unwrap();
        assert_eq!(board.selected_char(), '9');
        board.handle_key(Key::Button(2), &mut store).unwrap();
        board.handle_key(Key::Button(4), &mut store).unwrap();
        board.handle_key(Key::Button(4), &mut store).unwrap();
        board.handle_key(Key::Button(2), &mut store).unwrap();
        assert_eq!(board.name(), b"9B");
        board.handle_key(Key::Button(6), &mut store).unwrap();
        assert_eq!(board.name(), b"9");
        board.handle_key(Key::Button(5), &mut store).unwrap();
        assert_eq!(store.table().entries()[0].name(), b"9");
    }

    #[test]
    fn test_escape_discards_entry() {
        let mut store = store();
        let mut board = Scoreboard::open(&store, Some(77));
        type_str(&mut board, &mut store, "bob");
        board.handle_key(Key::Esc, &mut store).unwrap();
        assert_eq!(board.state(), ScoreboardState::View);
        assert_eq!(board.pending_score(), None);
        assert!(store.table().is_empty());
    }

    #[test]
    fn test_non_qualifying_score_skips_entry() {
        let mut store = store();
        for score in 1..=HIGHSCORE_CAPACITY as u32 {
            store.submit(HighscoreEntry::new(score * 100, b"x")).unwrap();
        }
        let board = Scoreboard::open(&store, Some(100));
        assert_eq!(board.state(), ScoreboardState::View);
        assert_eq!(Scoreboard::open(&store, Some(101)).state(), ScoreboardState::NameEntry);
    }

    #[test]
    fn test_confirm_clear() {
        let mut store = store();
        store.submit(HighscoreEntry::new(10, b"x")).unwrap();
        let mut board = Scoreboard::open(&store, None);

        board.handle_key(Key::Char('c'), &mut store).unwrap();
        assert_eq!(board.state(), ScoreboardState::ConfirmClear);
        board.handle_key(Key::Char('n'), &mut store).unwrap();
        assert_eq!(board.state(), ScoreboardState::View);
        assert_eq!(store.table().len(), 1);

        board.handle_key(Key::Char('C'), &mut store).unwrap();
        board.handle_key(Key::Char('y'), &mut store).unwrap();
        assert!(board.is_finished());
        assert!(store.table().is_empty());
        assert_eq!(store.current_segment(), None);
    }

    #[test]
    fn test_view_exit() {
        let mut store = store();
        for key in [Key::Enter, Key::Esc, Key::Char('q'), Key::Button(5), Key::Button(6)] {
            let mut board = Scoreboard::open(&store, None);
            board.handle_key(key, &mut store).unwrap();
            assert!(board.is_finished(), "{key:?}");
        }
    }
}
