//! Crash-safe highscore store over two alternating segments
//!
//! The current segment holds the authoritative table. A commit erases the
//! other segment, writes the new table there with the next generation, and
//! only then makes it current. Because the generation byte is the last byte
//! of the image, an interrupted commit leaves a segment that reads as
//! uninitialized and the previous table wins the next selection.

use crate::highscore::{ERASED, HighscoreEntry, HighscoreTable, SegmentImage};
use crate::segment::{SegmentId, SegmentStorage, StorageError};
use tracing::{debug, info, warn};

/// Number of distinct generation values; `ERASED` is excluded
const GENERATION_RING: u16 = ERASED as u16;

/// Generation written after `generation`. Wraps 254 to 0 and skips the
/// erased value.
pub fn next_generation(generation: u8) -> u8 {
    if generation >= ERASED - 1 {
        0
    } else {
        generation + 1
    }
}

/// Outcome of comparing the two segments' generations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Neither segment holds a table
    Empty,
    Current(SegmentId),
    /// Both segments carry the same generation; `erase` must be wiped
    /// before anything else is written
    Conflict { keep: SegmentId, erase: SegmentId },
}

/// Pick the current segment from the generations of two valid images.
///
/// Generations are compared on a ring: `a` is newer when it is at most half
/// the ring ahead of `b`. Ties prefer segment A.
pub fn select_current_segment(a: Option<u8>, b: Option<u8>) -> Selection {
    match (a, b) {
        (None, None) => Selection::Empty,
        (Some(_), None) => Selection::Current(SegmentId::A),
        (None, Some(_)) => Selection::Current(SegmentId::B),
        (Some(a), Some(b)) => {
            let distance = (u16::from(a) + GENERATION_RING - u16::from(b)) % GENERATION_RING;
            match distance {
                0 => Selection::Conflict {
                    keep: SegmentId::A,
                    erase: SegmentId::B,
                },
                1..=127 => Selection::Current(SegmentId::A),
                _ => Selection::Current(SegmentId::B),
            }
        }
    }
}

/// Highscore table persisted in a pair of segments
#[derive(Debug)]
pub struct HighscoreStore<S> {
    storage: S,
    current: Option<SegmentId>,
    generation: Option<u8>,
    table: HighscoreTable,
}

impl<S: SegmentStorage> HighscoreStore<S> {
    /// Wrap `storage` without reading it. Only correct for erased storage.
    pub fn empty(storage: S) -> Self {
        Self {
            storage,
            current: None,
            generation: None,
            table: HighscoreTable::new(),
        }
    }

    /// Load the current table from `storage`
    pub fn open(storage: S) -> Result<Self, StorageError> {
        let mut store = Self::empty(storage);
        store.reload()?;
        Ok(store)
    }

    /// Run segment selection again, discarding in-memory state
    pub fn reload(&mut self) -> Result<(), StorageError> {
        let a = self.read_image(SegmentId::A)?;
        let b = self.read_image(SegmentId::B)?;

        let current = match select_current_segment(a.generation(), b.generation()) {
            Selection::Empty => None,
            Selection::Current(id) => Some(id),
            Selection::Conflict { keep, erase } => {
                warn!(%keep, %erase, "segments share a generation, erasing one");
                self.storage.erase_segment(erase)?;
                Some(keep)
            }
        };

        let (generation, table) = match current.map(|id| if id == SegmentId::A { a } else { b }) {
            Some(SegmentImage::Valid { generation, table }) => (Some(generation), table),
            _ => (None, HighscoreTable::new()),
        };

        self.current = current;
        self.generation = generation;
        self.table = table;

        match current {
            Some(segment) => info!(
                %segment,
                ?generation,
                entries = self.table.len(),
                "highscores loaded"
            ),
            None => info!("no highscores stored"),
        }
        Ok(())
    }

    fn read_image(&self, id: SegmentId) -> Result<SegmentImage, StorageError> {
        let image = HighscoreTable::decode(&self.storage.read_segment(id)?);
        if let SegmentImage::Corrupt { generation } = image {
            warn!(segment = %id, generation, "ignoring corrupt highscore segment");
        }
        Ok(image)
    }

    pub fn table(&self) -> &HighscoreTable {
        &self.table
    }

    pub fn current_segment(&self) -> Option<SegmentId> {
        self.current
    }

    pub fn generation(&self) -> Option<u8> {
        self.generation
    }

    pub fn qualifies(&self, score: u32) -> bool {
        self.table.qualifies(score)
    }

    /// Merge `entry` into the table and persist the result.
    /// Returns false if the entry did not make it onto the table.
    pub fn submit(&mut self, entry: HighscoreEntry) -> Result<bool, StorageError> {
        let merged = self.table.merge_insert(entry);
        if merged == self.table {
            debug!(score = entry.score, "score did not reach the table");
            return Ok(false);
        }
        self.commit(merged)?;
        Ok(true)
    }

    /// Write `table` to the non-current segment and make it current
    pub fn commit(&mut self, table: HighscoreTable) -> Result<(), StorageError> {
        let (target, generation) = match (self.current, self.generation) {
            (Some(current), Some(generation)) => (current.other(), next_generation(generation)),
            _ => (SegmentId::A, 0),
        };

        self.storage.erase_segment(target)?;
        self.storage.write_segment(target, &table.encode(generation))?;

        self.current = Some(target);
        self.generation = Some(generation);
        self.table = table;
        info!(
            segment = %target,
            generation,
            entries = self.table.len(),
            "highscores committed"
        );
        Ok(())
    }

    /// Erase both segments
    pub fn clear(&mut self) -> Result<(), StorageError> {
        for id in SegmentId::ALL {
            self.storage.erase_segment(id)?;
        }
        self.current = None;
        self.generation = None;
        self.table = HighscoreTable::new();
        info!("highscores cleared");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }

    #[cfg(test)]
    pub(crate) fn into_storage(self) -> S {
        self.storage
    }
}
