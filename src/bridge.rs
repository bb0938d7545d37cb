//! Thin presentation-to-simulation adapter.
//!
//! The UI layer drives the engine exclusively through this surface and reads
//! back `PresentationSnapshot`s. Recoverable persistence conditions become
//! short human-readable messages here and never crash the caller.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::logger::{EventBuffer, LogEvent};
use crate::save::{FileStoreError, SaveStore, decode_state, encode_state};
use crate::simulation::{SimError, Simulation};
use crate::snapshot::PresentationSnapshot;
use crate::state::GameState;

pub const MSG_SAVED: &str = "Saved!";
pub const MSG_LOADED: &str = "Loaded.";
pub const MSG_NO_SAVE: &str = "No save found.";
pub const MSG_INCOMPATIBLE: &str = "Save file is incompatible.";
pub const MSG_CORRUPT: &str = "Save file is corrupt.";
pub const MSG_STORAGE_UNAVAILABLE: &str = "Save storage unavailable.";

const CREDIT_EXHAUSTED_REASON: &str = "credit exhausted";

/// Bridge owning one live simulation and its save slot.
pub struct SimBridge<S: SaveStore> {
    store: S,
    sim: Option<Simulation<EventBuffer>>,
}

impl<S: SaveStore> SimBridge<S>
where
    S::Error: Into<anyhow::Error>,
{
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store, sim: None }
    }

    /// Construct a fresh state and simulation, replacing any live session.
    /// With no seed given, one is derived from the wall clock.
    pub fn start_new_game(&mut self, seed: Option<u64>) {
        let seed = seed.unwrap_or_else(time_derived_seed);
        let state = GameState::new_game(seed);
        self.sim = Some(Simulation::new(state, EventBuffer::new()));
    }

    #[must_use]
    pub fn has_save(&self) -> bool {
        self.store.exists()
    }

    /// Persist the live state. Returns a short status message.
    pub fn save_game(&mut self) -> String {
        let sim = self.ensure_live();
        let Ok(envelope) = encode_state(sim.state()) else {
            return MSG_STORAGE_UNAVAILABLE.to_string();
        };
        match self.store.write(&envelope) {
            Ok(()) => MSG_SAVED.to_string(),
            Err(_) => MSG_STORAGE_UNAVAILABLE.to_string(),
        }
    }

    /// Load the stored save, replacing the live session wholesale on
    /// success. On any failure the current session is left untouched.
    pub fn load_game(&mut self) -> String {
        let envelope = match self.store.read() {
            Ok(Some(envelope)) => envelope,
            Ok(None) => return MSG_NO_SAVE.to_string(),
            Err(err) => {
                let err: anyhow::Error = err.into();
                let malformed = err
                    .downcast_ref::<FileStoreError>()
                    .is_some_and(FileStoreError::is_malformed);
                return if malformed {
                    MSG_CORRUPT.to_string()
                } else {
                    MSG_STORAGE_UNAVAILABLE.to_string()
                };
            }
        };
        match decode_state(&envelope) {
            Ok(state) => {
                self.sim = Some(Simulation::new(state, EventBuffer::new()));
                MSG_LOADED.to_string()
            }
            Err(crate::save::SaveError::Incompatible { .. }) => MSG_INCOMPATIBLE.to_string(),
            Err(crate::save::SaveError::Corrupt(_)) => MSG_CORRUPT.to_string(),
        }
    }

    pub fn open_service(&mut self) {
        self.ensure_live().open_night();
    }

    pub fn close_service(&mut self, reason: &str) {
        self.ensure_live().close_night(reason);
    }

    /// Auto-open if closed, then play one round. When credit runs out the
    /// bridge forces closure for the night rather than propagating the error.
    pub fn advance(&mut self) {
        let sim = self.ensure_live();
        if !sim.state().night_open {
            sim.open_night();
        }
        match sim.play_round() {
            Ok(_) => {}
            Err(SimError::NoCreditAvailable { .. }) => {
                sim.close_night(CREDIT_EXHAUSTED_REASON);
            }
            // Unreachable: the night was just opened.
            Err(SimError::InvalidTransition) => {}
        }
    }

    /// Project the live state for rendering.
    pub fn snapshot(&mut self) -> PresentationSnapshot {
        PresentationSnapshot::from(self.ensure_live().state())
    }

    /// Drain buffered simulation events for display.
    pub fn drain_events(&mut self) -> Vec<LogEvent> {
        self.ensure_live().logger_mut().drain()
    }

    /// Borrow the live state, starting a fresh game if none exists.
    pub fn state(&mut self) -> &GameState {
        self.ensure_live().state()
    }

    fn ensure_live(&mut self) -> &mut Simulation<EventBuffer> {
        if self.sim.is_none() {
            self.start_new_game(None);
        }
        self.sim.as_mut().expect("simulation just ensured")
    }
}

#[allow(clippy::cast_possible_truncation)]
fn time_derived_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0x5eed_cafe, |elapsed| elapsed.as_nanos() as u64)
}
