//! Serializable seeded random stream.
//!
//! The save contract requires that a loaded game replays exactly, so the
//! generator position is part of persisted state: the stream is stored as
//! `{seed, word_pos}` and rebuilt on load.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Wire form of a [`SessionRng`]: originating seed plus stream position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngSnapshot {
    pub seed: u64,
    pub word_pos: u128,
}

/// Seeded ChaCha20 stream whose exact position survives serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RngSnapshot", into = "RngSnapshot")]
pub struct SessionRng {
    seed: u64,
    inner: ChaCha20Rng,
}

impl SessionRng {
    /// Construct a fresh stream from a user-visible seed.
    #[must_use]
    pub fn from_seed_u64(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// The seed this stream was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Current position within the stream, in 32-bit words.
    #[must_use]
    pub fn word_pos(&self) -> u128 {
        self.inner.get_word_pos()
    }

    /// Capture the wire form without consuming the stream.
    #[must_use]
    pub fn snapshot(&self) -> RngSnapshot {
        RngSnapshot {
            seed: self.seed,
            word_pos: self.word_pos(),
        }
    }
}

impl From<RngSnapshot> for SessionRng {
    fn from(snap: RngSnapshot) -> Self {
        let mut inner = ChaCha20Rng::seed_from_u64(snap.seed);
        inner.set_word_pos(snap.word_pos);
        Self {
            seed: snap.seed,
            inner,
        }
    }
}

impl From<SessionRng> for RngSnapshot {
    fn from(rng: SessionRng) -> Self {
        rng.snapshot()
    }
}

impl PartialEq for SessionRng {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed && self.word_pos() == other.word_pos()
    }
}

impl RngCore for SessionRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }
}
