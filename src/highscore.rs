//! Highscore entries, the bounded top-N table and its segment image
//!
//! A segment image is `SEGMENT_SIZE` bytes: `HIGHSCORE_CAPACITY` entries of
//! (score u32 LE, name bytes, name length), then the entry count, then the
//! generation as the very last byte. Erased flash reads as `0xFF`, so the
//! generation byte doubles as the "initialized" marker and is written last.

use std::borrow::Cow;

/// Maximum number of entries kept
pub const HIGHSCORE_CAPACITY: usize = 8;
/// Maximum name length in bytes
pub const NAME_MAX: usize = 10;
/// Size of one encoded entry
pub const ENTRY_SIZE: usize = 4 + NAME_MAX + 1;
/// Size of one storage segment
pub const SEGMENT_SIZE: usize = 128;
/// Value of an erased byte, and of the generation of an uninitialized segment
pub const ERASED: u8 = 0xFF;

const COUNT_OFFSET: usize = HIGHSCORE_CAPACITY * ENTRY_SIZE;
const GENERATION_OFFSET: usize = SEGMENT_SIZE - 1;

const _: () = assert!(COUNT_OFFSET < GENERATION_OFFSET);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighscoreEntry {
    pub score: u32,
    name: [u8; NAME_MAX],
    name_len: u8,
}

impl HighscoreEntry {
    /// Create an entry; names longer than `NAME_MAX` bytes are cut off
    pub fn new(score: u32, name: &[u8]) -> Self {
        let len = name.len().min(NAME_MAX);
        let mut buf = [0u8; NAME_MAX];
        buf[..len].copy_from_slice(&name[..len]);
        Self {
            score,
            name: buf,
            name_len: len as u8,
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name[..usize::from(self.name_len)]
    }

    /// Name for display
    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name())
    }

    fn encode(&self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.score.to_le_bytes());
        out[4..4 + NAME_MAX].copy_from_slice(&self.name);
        out[4 + NAME_MAX] = self.name_len;
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        let score = u32::from_le_bytes(bytes[..4].try_into().ok()?);
        let name_len = bytes[4 + NAME_MAX];
        if usize::from(name_len) > NAME_MAX {
            return None;
        }
        let mut name = [0u8; NAME_MAX];
        name.copy_from_slice(&bytes[4..4 + NAME_MAX]);
        Some(Self {
            score,
            name,
            name_len,
        })
    }
}

/// Decoded contents of one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentImage {
    /// Never written, or erased
    Uninitialized,
    Valid { generation: u8, table: HighscoreTable },
    /// The generation byte is set but the contents do not form a table
    Corrupt { generation: u8 },
}

impl SegmentImage {
    /// Generation of a usable image
    pub fn generation(&self) -> Option<u8> {
        match self {
            SegmentImage::Valid { generation, .. } => Some(*generation),
            _ => None,
        }
    }
}

/// Top-N table, sorted by descending score
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighscoreTable {
    entries: Vec<HighscoreEntry>,
}

impl HighscoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HighscoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= HIGHSCORE_CAPACITY
    }

    /// Lowest score on the table
    pub fn min_score(&self) -> Option<u32> {
        self.entries.last().map(|entry| entry.score)
    }

    /// Whether `score` would earn a place on the table
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        match self.min_score() {
            Some(min) if self.is_full() => score > min,
            _ => true,
        }
    }

    /// Build a new table with `entry` merged in.
    ///
    /// The entry goes before the first old entry it outscores, so equal
    /// scores keep the older entries ahead. The result is cut at capacity.
    pub fn merge_insert(&self, entry: HighscoreEntry) -> HighscoreTable {
        let mut entries = Vec::with_capacity(HIGHSCORE_CAPACITY);
        let mut pending = Some(entry);

        for old in &self.entries {
            if entries.len() >= HIGHSCORE_CAPACITY {
                break;
            }
            if let Some(new) = pending.filter(|new| new.score > old.score) {
                entries.push(new);
                pending = None;
                if entries.len() >= HIGHSCORE_CAPACITY {
                    break;
                }
            }
            entries.push(*old);
        }
        if let Some(new) = pending {
            if entries.len() < HIGHSCORE_CAPACITY {
                entries.push(new);
            }
        }

        HighscoreTable { entries }
    }

    /// Encode into a segment image carrying `generation`
    pub fn encode(&self, generation: u8) -> [u8; SEGMENT_SIZE] {
        let mut image = [ERASED; SEGMENT_SIZE];
        for (entry, slot) in self
            .entries
            .iter()
            .zip(image[..COUNT_OFFSET].chunks_exact_mut(ENTRY_SIZE))
        {
            entry.encode(slot);
        }
        image[COUNT_OFFSET] = self.entries.len() as u8;
        image[GENERATION_OFFSET] = generation;
        image
    }

    /// Decode a segment image read back from storage
    pub fn decode(image: &[u8]) -> SegmentImage {
        let Some(&generation) = image.get(GENERATION_OFFSET) else {
            return SegmentImage::Uninitialized;
        };
        if generation == ERASED {
            return SegmentImage::Uninitialized;
        }

        let count = usize::from(image[COUNT_OFFSET]);
        if count > HIGHSCORE_CAPACITY {
            return SegmentImage::Corrupt { generation };
        }

        let mut entries = Vec::with_capacity(count);
        for slot in image[..COUNT_OFFSET].chunks_exact(ENTRY_SIZE).take(count) {
            match HighscoreEntry::decode(slot) {
                Some(entry) => entries.push(entry),
                None => return SegmentImage::Corrupt { generation },
            }
        }
        if entries.windows(2).any(|pair| pair[0].score < pair[1].score) {
            return SegmentImage::Corrupt { generation };
        }

        SegmentImage::Valid {
            generation,
            table: HighscoreTable { entries },
        }
    }
}

impl FromIterator<HighscoreEntry> for HighscoreTable {
    /// Collect entries through repeated merge-insert
    fn from_iter<I: IntoIterator<Item = HighscoreEntry>>(iter: I) -> Self {
        iter.into_iter()
            .fold(HighscoreTable::new(), |table, entry| table.merge_insert(entry))
    }
}
