//! Versioned persistence of the game state.
//!
//! A save is one envelope record: schema version, originating seed, and the
//! JSON-encoded state as an opaque payload. Version mismatch is a hard
//! rejection, never a best-effort migration, and a failed load must leave any
//! live state untouched.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::state::GameState;

/// Schema version written into every envelope and checked on every load.
pub const SAVE_VERSION: u32 = 1;

/// Versioned container wrapping the serialized state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub save_version: u32,
    pub seed: u64,
    pub payload: String,
}

/// Failures decoding an envelope back into a state.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save version {found} is incompatible (engine expects {expected})")]
    Incompatible { found: u32, expected: u32 },
    #[error("save payload is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Serialize a state into a current-version envelope.
///
/// # Errors
///
/// Returns [`SaveError::Corrupt`] if the state cannot be encoded.
pub fn encode_state(state: &GameState) -> Result<SaveEnvelope, SaveError> {
    let payload = serde_json::to_string(state)?;
    Ok(SaveEnvelope {
        save_version: SAVE_VERSION,
        seed: state.seed,
        payload,
    })
}

/// Decode an envelope, enforcing the version gate before touching the
/// payload.
///
/// # Errors
///
/// Returns [`SaveError::Incompatible`] on a version mismatch and
/// [`SaveError::Corrupt`] when the payload does not decode.
pub fn decode_state(envelope: &SaveEnvelope) -> Result<GameState, SaveError> {
    if envelope.save_version != SAVE_VERSION {
        return Err(SaveError::Incompatible {
            found: envelope.save_version,
            expected: SAVE_VERSION,
        });
    }
    let state = serde_json::from_str(&envelope.payload)?;
    Ok(state)
}

/// Storage seam for save envelopes; platform layers provide this.
pub trait SaveStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the envelope, replacing any previous save.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope cannot be written.
    fn write(&self, envelope: &SaveEnvelope) -> Result<(), Self::Error>;

    /// Read the stored envelope, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails; a missing save is
    /// `Ok(None)`.
    fn read(&self) -> Result<Option<SaveEnvelope>, Self::Error>;

    /// Remove the stored envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn clear(&self) -> Result<(), Self::Error>;

    fn exists(&self) -> bool;
}

/// In-memory single-slot store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemorySaveStore {
    slot: RefCell<Option<SaveEnvelope>>,
}

impl MemorySaveStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemorySaveStore {
    type Error = std::convert::Infallible;

    fn write(&self, envelope: &SaveEnvelope) -> Result<(), Self::Error> {
        *self.slot.borrow_mut() = Some(envelope.clone());
        Ok(())
    }

    fn read(&self) -> Result<Option<SaveEnvelope>, Self::Error> {
        Ok(self.slot.borrow().clone())
    }

    fn clear(&self) -> Result<(), Self::Error> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

/// Errors from the file-backed store.
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("save storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl FileStoreError {
    /// Whether this failure means the bytes on disk are unreadable as an
    /// envelope, as opposed to the storage itself failing.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// File-backed store writing atomically via a temp file and rename.
#[derive(Debug, Clone)]
pub struct FileSaveStore {
    path: PathBuf,
}

impl FileSaveStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl SaveStore for FileSaveStore {
    type Error = FileStoreError;

    fn write(&self, envelope: &SaveEnvelope) -> Result<(), Self::Error> {
        let encoded = serde_json::to_string(envelope)?;
        let tmp = self.temp_path();
        fs::write(&tmp, encoded)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn read(&self) -> Result<Option<SaveEnvelope>, Self::Error> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let envelope = serde_json::from_str(&raw)?;
        Ok(Some(envelope))
    }

    fn clear(&self) -> Result<(), Self::Error> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn encode_decode_round_trips_every_field() {
        let mut state = GameState::new_game(42);
        // Advance the stream so the position is non-trivial.
        let _: u64 = state.rng.random();
        state.cash_cents = 31_337;
        state.chaos = 2.5;
        state.credit_lines[0].balance_cents = 4_000;

        let envelope = encode_state(&state).unwrap();
        assert_eq!(envelope.save_version, SAVE_VERSION);
        assert_eq!(envelope.seed, 42);

        let restored = decode_state(&envelope).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.rng.word_pos(), state.rng.word_pos());
    }

    #[test]
    fn version_mismatch_is_rejected_before_payload() {
        let state = GameState::new_game(1);
        let mut envelope = encode_state(&state).unwrap();
        envelope.save_version = 0;
        // Garbage payload must not matter: the version gate comes first.
        envelope.payload = String::from("not json");
        let err = decode_state(&envelope).unwrap_err();
        assert!(matches!(
            err,
            SaveError::Incompatible {
                found: 0,
                expected: SAVE_VERSION
            }
        ));
    }

    #[test]
    fn corrupt_payload_is_reported() {
        let envelope = SaveEnvelope {
            save_version: SAVE_VERSION,
            seed: 1,
            payload: String::from("{\"cash_cents\": }"),
        };
        assert!(matches!(
            decode_state(&envelope),
            Err(SaveError::Corrupt(_))
        ));
    }

    #[test]
    fn memory_store_single_slot_semantics() {
        let store = MemorySaveStore::new();
        assert!(!store.exists());
        assert!(store.read().unwrap().is_none());

        let envelope = encode_state(&GameState::new_game(3)).unwrap();
        store.write(&envelope).unwrap();
        assert!(store.exists());
        assert_eq!(store.read().unwrap(), Some(envelope));

        store.clear().unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let path = std::env::temp_dir().join(format!(
            "lastcall-save-test-{}.json",
            std::process::id()
        ));
        let store = FileSaveStore::new(&path);
        let _ = store.clear();

        let envelope = encode_state(&GameState::new_game(8)).unwrap();
        store.write(&envelope).unwrap();
        assert!(store.exists());
        assert_eq!(store.read().unwrap(), Some(envelope));

        store.clear().unwrap();
        assert!(!store.exists());
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn file_store_flags_malformed_bytes() {
        let path = std::env::temp_dir().join(format!(
            "lastcall-save-garbage-{}.json",
            std::process::id()
        ));
        fs::write(&path, "][").unwrap();
        let store = FileSaveStore::new(&path);
        let err = store.read().unwrap_err();
        assert!(err.is_malformed());
        store.clear().unwrap();
    }
}
