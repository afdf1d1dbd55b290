//! FALLER - a falling-block puzzle for the terminal
//!
//! Highscores are kept in two alternating storage segments so that a crash
//! in the middle of saving never loses the previous table.

mod app;
mod command;
mod field;
mod game;
mod gravity;
mod highscore;
mod input;
mod piece;
mod randomizer;
mod score;
mod scoreboard;
mod segment;
mod settings;
mod store;
mod tetromino;
mod ui;

use anyhow::Context;
use app::App;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use randomizer::RandomizerKind;
use ratatui::{Terminal, backend::CrosstermBackend};
use segment::{FileStorage, MemoryStorage, SegmentStorage};
use settings::{ConfigError, Settings, VisualSettings};
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use store::HighscoreStore;
use ui::{BufferSink, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Longest wait for input when no gravity tick is due
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(name = "faller", version, about)]
struct Args {
    /// Settings file [default: platform config directory]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the highscore segments
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Seed for piece selection
    #[arg(long)]
    seed: Option<u64>,

    /// Initial gravity interval in milliseconds
    #[arg(long, value_name = "MS")]
    gravity_ms: Option<u64>,

    /// Next-piece selection
    #[arg(long, value_enum)]
    randomizer: Option<RandomizerKind>,

    /// Open the highscore table instead of the welcome screen
    #[arg(long)]
    scores: bool,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    write_config: bool,
}

impl Args {
    /// Override file settings with command-line values
    fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.data_dir {
            settings.storage.data_dir = Some(dir.clone());
        }
        if let Some(gravity_ms) = self.gravity_ms {
            settings.gameplay.gravity_ms = gravity_ms;
        }
        if let Some(randomizer) = self.randomizer {
            settings.gameplay.randomizer = randomizer;
        }
    }
}

/// Get the faller temp directory, creating it if needed
fn faller_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("faller");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Generate session ID for this instance
    let session_id: u32 = rand::random();
    let log_dir = faller_temp_dir();
    let log_file = format!("{session_id:08x}.log");

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("faller=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "FALLER starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let config_path = args.config.clone().or_else(Settings::default_path);
    let mut settings = Settings::load(config_path.as_deref());
    args.apply(&mut settings);

    if args.write_config {
        let path = config_path.ok_or(ConfigError::NoConfigDir)?;
        settings.save_to(&path)?;
        println!("Settings written to {}", path.display());
        return Ok(());
    }

    let store = open_store(open_storage(&settings));

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(
        seed,
        segment = ?store.current_segment(),
        generation = ?store.generation(),
        "session configured"
    );
    let mut app = App::new(store, &settings, seed);
    if args.scores {
        app.open_highscores(None);
    }

    // Setup terminal
    enable_raw_mode().context("could not enable raw mode")?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, &settings.visual);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    result.context("terminal I/O failed")?;

    println!("\nThanks for playing FALLER!");
    if let Some(best) = app.store().table().entries().first() {
        println!("Best: {} by {}", best.score, best.display_name());
    }
    tracing::info!("FALLER shutting down");
    Ok(())
}

/// File-backed segments in the data directory, or RAM if that is unusable
fn open_storage(settings: &Settings) -> Box<dyn SegmentStorage> {
    let opened = settings
        .data_dir()
        .map_err(anyhow::Error::from)
        .and_then(|dir| {
            FileStorage::open(&dir)
                .with_context(|| {
                    format!("could not open highscore storage in {}", dir.display())
                })
        });
    match opened {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            tracing::warn!("highscores will not persist: {err:#}");
            Box::new(MemoryStorage::new())
        }
    }
}

/// Load the highscores, keeping them in RAM if the storage cannot be read
fn open_store(storage: Box<dyn SegmentStorage>) -> HighscoreStore<Box<dyn SegmentStorage>> {
    match HighscoreStore::open(storage) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!("could not load highscores, they will not persist: {err}");
            let fallback: Box<dyn SegmentStorage> = Box::new(MemoryStorage::new());
            HighscoreStore::empty(fallback)
        }
    }
}

fn run_app<S: SegmentStorage>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
    visual: &VisualSettings,
) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        // Render; this also drains queued game commands
        terminal.draw(|frame| {
            let area = ui::center_rect(frame.area(), SCREEN_WIDTH, SCREEN_HEIGHT);
            let mut sink = BufferSink::new(frame.buffer_mut(), area).with_block_style(visual);
            app.render(&mut sink);
        })?;

        let timeout = app.time_to_next_tick().map_or(IDLE_POLL, |t| t.min(IDLE_POLL));
        if event::poll(timeout)? {
            if let Event::Key(event) = event::read()? {
                if let Some(key) = input::key_from_event(&event) {
                    app.handle_key(key);
                }
            }
        }
        if app.should_quit() {
            return Ok(());
        }

        let now = Instant::now();
        app.advance(now - last_tick);
        last_tick = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscore::{HighscoreEntry, HighscoreTable};
    use crate::segment::{MemoryStorage, SegmentId, SegmentStorage, StorageError};

    /// Storage whose every operation fails
    struct Unreadable;

    impl SegmentStorage for Unreadable {
        fn erase_segment(&mut self, _id: SegmentId) -> Result<(), StorageError> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied).into())
        }

        fn write_segment(&mut self, _id: SegmentId, _bytes: &[u8]) -> Result<(), StorageError> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied).into())
        }

        fn read_segment(&self, _id: SegmentId) -> Result<Vec<u8>, StorageError> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied).into())
        }
    }

    #[test]
    fn test_unreadable_storage_falls_back_to_memory() {
        assert!(HighscoreStore::open(Unreadable).is_err());

        let mut store = open_store(Box::new(Unreadable));
        assert!(store.table().is_empty());
        assert_eq!(store.current_segment(), None);

        // Commits land in the in-memory segments
        assert!(store.submit(HighscoreEntry::new(40, b"amy")).unwrap());
        assert_eq!(store.current_segment(), Some(SegmentId::A));
        store.reload().unwrap();
        assert_eq!(store.table().entries()[0].score, 40);
    }

    #[test]
    fn test_readable_storage_is_kept() {
        let mut memory = MemoryStorage::new();
        let table: HighscoreTable = [HighscoreEntry::new(7, b"kit")].into_iter().collect();
        memory.write_segment(SegmentId::B, &table.encode(3)).unwrap();

        let store = open_store(Box::new(memory));
        assert_eq!(store.current_segment(), Some(SegmentId::B));
        assert_eq!(store.generation(), Some(3));
    }
}
