//! Non-volatile segment storage
//!
//! Two independently erasable segments hold the highscore tables. Storage
//! behaves like NOR flash: erasing sets every byte to `0xFF`, and writing can
//! only clear bits, so a segment must be erased before it is rewritten.

use crate::highscore::{ERASED, SEGMENT_SIZE};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// One of the two highscore segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentId {
    A,
    B,
}

impl SegmentId {
    pub const ALL: [SegmentId; 2] = [SegmentId::A, SegmentId::B];

    pub fn other(self) -> SegmentId {
        match self {
            SegmentId::A => SegmentId::B,
            SegmentId::B => SegmentId::A,
        }
    }

    fn index(self) -> usize {
        match self {
            SegmentId::A => 0,
            SegmentId::B => 1,
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            SegmentId::A => "segment-a.bin",
            SegmentId::B => "segment-b.bin",
        }
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentId::A => f.write_str("A"),
            SegmentId::B => f.write_str("B"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("segment storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("write of {len} bytes does not fit a {capacity} byte segment")]
    SegmentOverflow { len: usize, capacity: usize },
}

/// Primitive operations on the two segments
pub trait SegmentStorage {
    /// Reset every byte of the segment to the erased value
    fn erase_segment(&mut self, id: SegmentId) -> Result<(), StorageError>;

    /// Program `bytes` at the start of the segment. Bits can only be
    /// cleared: the stored byte becomes `old & new`.
    fn write_segment(&mut self, id: SegmentId, bytes: &[u8]) -> Result<(), StorageError>;

    /// Read the whole segment
    fn read_segment(&self, id: SegmentId) -> Result<Vec<u8>, StorageError>;
}

impl<S: SegmentStorage + ?Sized> SegmentStorage for Box<S> {
    fn erase_segment(&mut self, id: SegmentId) -> Result<(), StorageError> {
        (**self).erase_segment(id)
    }

    fn write_segment(&mut self, id: SegmentId, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).write_segment(id, bytes)
    }

    fn read_segment(&self, id: SegmentId) -> Result<Vec<u8>, StorageError> {
        (**self).read_segment(id)
    }
}

fn check_len(bytes: &[u8]) -> Result<(), StorageError> {
    if bytes.len() > SEGMENT_SIZE {
        return Err(StorageError::SegmentOverflow {
            len: bytes.len(),
            capacity: SEGMENT_SIZE,
        });
    }
    Ok(())
}

fn program(target: &mut [u8], bytes: &[u8]) {
    for (old, new) in target.iter_mut().zip(bytes) {
        *old &= new;
    }
}

/// Segments held in RAM, for tests and for running without a data directory
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    segments: [[u8; SEGMENT_SIZE]; 2],
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            segments: [[ERASED; SEGMENT_SIZE]; 2],
        }
    }
}

impl SegmentStorage for MemoryStorage {
    fn erase_segment(&mut self, id: SegmentId) -> Result<(), StorageError> {
        self.segments[id.index()].fill(ERASED);
        Ok(())
    }

    fn write_segment(&mut self, id: SegmentId, bytes: &[u8]) -> Result<(), StorageError> {
        check_len(bytes)?;
        program(&mut self.segments[id.index()], bytes);
        Ok(())
    }

    fn read_segment(&self, id: SegmentId) -> Result<Vec<u8>, StorageError> {
        Ok(self.segments[id.index()].to_vec())
    }
}

/// Segments stored as two files in a directory.
///
/// A missing file reads as an erased segment.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` for the segment files, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "segment storage opened");
        Ok(Self { dir })
    }

    fn path(&self, id: SegmentId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    fn read_image(&self, id: SegmentId) -> Result<[u8; SEGMENT_SIZE], StorageError> {
        let mut image = [ERASED; SEGMENT_SIZE];
        match fs::read(self.path(id)) {
            Ok(bytes) => {
                let len = bytes.len().min(SEGMENT_SIZE);
                image[..len].copy_from_slice(&bytes[..len]);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        Ok(image)
    }
}

impl SegmentStorage for FileStorage {
    fn erase_segment(&mut self, id: SegmentId) -> Result<(), StorageError> {
        fs::write(self.path(id), [ERASED; SEGMENT_SIZE])?;
        Ok(())
    }

    fn write_segment(&mut self, id: SegmentId, bytes: &[u8]) -> Result<(), StorageError> {
        check_len(bytes)?;
        let mut image = self.read_image(id)?;
        program(&mut image, bytes);
        fs::write(self.path(id), image)?;
        Ok(())
    }

    fn read_segment(&self, id: SegmentId) -> Result<Vec<u8>, StorageError> {
        Ok(self.read_image(id)?.to_vec())
    }
}
