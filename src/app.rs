//! Top-level view flow: welcome screen, game, highscores

use crate::game::Game;
use crate::input::{Key, KeyBindings};
use crate::scoreboard::Scoreboard;
use crate::segment::SegmentStorage;
use crate::settings::{GameplaySettings, Settings};
use crate::store::HighscoreStore;
use crate::ui::{self, RenderSink};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{debug, error, info};

/// Which screen is active
pub enum View {
    Welcome,
    Playing(Game),
    Highscores(Scoreboard),
}

impl View {
    fn name(&self) -> &'static str {
        match self {
            View::Welcome => "welcome",
            View::Playing(_) => "playing",
            View::Highscores(_) => "highscores",
        }
    }
}

pub struct App<S> {
    view: View,
    store: HighscoreStore<S>,
    bindings: KeyBindings,
    gameplay: GameplaySettings,
    /// Source of per-game seeds
    seeds: ChaCha8Rng,
    quit: bool,
}

impl<S: SegmentStorage> App<S> {
    pub fn new(store: HighscoreStore<S>, settings: &Settings, seed: u64) -> Self {
        Self {
            view: View::Welcome,
            store,
            bindings: KeyBindings::from_settings(&settings.keys),
            gameplay: settings.gameplay.clone(),
            seeds: ChaCha8Rng::seed_from_u64(seed),
            quit: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn view(&self) -> &View {
        &self.view
    }

    pub fn store(&self) -> &HighscoreStore<S> {
        &self.store
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    fn switch(&mut self, view: View) {
        debug!(from = self.view.name(), to = view.name(), "view change");
        self.view = view;
    }

    pub fn start_game(&mut self) {
        let game = Game::new(&self.gameplay, self.seeds.next_u64());
        self.switch(View::Playing(game));
    }

    /// Show the scoreboard, offering name entry for `score`
    pub fn open_highscores(&mut self, score: Option<u32>) {
        let board = Scoreboard::open(&self.store, score);
        self.switch(View::Highscores(board));
    }

    /// Reload the store from storage and return to the welcome screen
    pub fn reset(&mut self) {
        info!("reset");
        if let Err(err) = self.store.reload() {
            error!("failed to reload highscores: {err}");
        }
        self.switch(View::Welcome);
    }

    pub fn handle_key(&mut self, key: Key) {
        if key == Key::Interrupt {
            self.quit = true;
            return;
        }

        match &mut self.view {
            View::Welcome => match key {
                Key::Enter | Key::Char('t' | 'T') | Key::Button(5) => self.start_game(),
                Key::Char('h' | 'H') | Key::Button(6) => self.open_highscores(None),
                _ if self.bindings.is_quit(key) => self.quit = true,
                _ => {}
            },
            View::Playing(game) => {
                if game.is_over() {
                    let score = u32::try_from(game.score.points).unwrap_or(u32::MAX);
                    self.open_highscores(Some(score));
                } else if self.bindings.is_quit(key) {
                    info!(score = game.score.points, "game abandoned");
                    self.switch(View::Welcome);
                } else if let Some(command) = self.bindings.command(key) {
                    game.push_command(command);
                }
            }
            View::Highscores(board) => {
                if let Err(err) = board.handle_key(key, &mut self.store) {
                    error!("highscore storage failed: {err}");
                }
                if board.is_finished() {
                    self.reset();
                }
            }
        }
    }

    /// Feed elapsed time to the running game
    pub fn advance(&mut self, dt: Duration) {
        if let View::Playing(game) = &mut self.view {
            game.advance(dt);
        }
    }

    /// Time until something needs to happen without input
    pub fn time_to_next_tick(&self) -> Option<Duration> {
        match &self.view {
            View::Playing(game) if !game.is_over() => Some(game.time_to_tick()),
            _ => None,
        }
    }

    /// Process pending work and draw the active view once
    pub fn render(&mut self, sink: &mut dyn RenderSink) {
        match &mut self.view {
            View::Welcome => {
                ui::draw_welcome(sink);
                sink.present();
            }
            View::Playing(game) => game.process(sink),
            View::Highscores(board) => {
                ui::draw_scoreboard(board, self.store.table(), sink);
                sink.present();
            }
        }
    }
}
