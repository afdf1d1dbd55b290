//! Next-piece selection
//!
//! Either a uniform pick over all seven kinds, or the "7-bag" where all
//! kinds are shuffled and dealt out before reshuffling.

use crate::tetromino::Tetromino;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RandomizerKind {
    #[default]
    Uniform,
    Bag,
}

#[derive(Debug, Clone)]
pub struct Randomizer {
    kind: RandomizerKind,
    rng: ChaCha8Rng,
    /// Remaining pieces of the current bag
    bag: Vec<Tetromino>,
}

impl Randomizer {
    pub fn new(kind: RandomizerKind, seed: u64) -> Self {
        Self {
            kind,
            rng: ChaCha8Rng::seed_from_u64(seed),
            bag: Vec::with_capacity(Tetromino::ALL.len()),
        }
    }

    /// Get the next piece
    pub fn next(&mut self) -> Tetromino {
        match self.kind {
            RandomizerKind::Uniform => Tetromino::ALL[self.rng.gen_range(0..Tetromino::ALL.len())],
            RandomizerKind::Bag => {
                if self.bag.is_empty() {
                    self.refill();
                }
                self.bag.pop().unwrap_or(Tetromino::I)
            }
        }
    }

    /// Refill the bag with a new shuffled set
    fn refill(&mut self) {
        self.bag.extend(Tetromino::ALL);
        self.bag.shuffle(&mut self.rng);
    }
}
