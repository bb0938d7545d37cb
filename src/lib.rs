//! Last Call Simulation Engine
//!
//! Platform-agnostic core logic for the Last Call venue-management game:
//! the night-service state machine, stochastic round resolution, credit-line
//! shortfall policy, and versioned save/load. This crate provides the whole
//! simulation without UI or platform-specific dependencies.
//!
//! The engine is deterministic: a state created from a seed and driven by an
//! identical call sequence reproduces identical outcomes, and the random
//! stream position survives save/load.

pub mod bridge;
pub mod constants;
pub mod costs;
pub mod credit;
pub mod logger;
pub mod rng;
pub mod rounds;
pub mod save;
pub mod simulation;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use bridge::{
    MSG_CORRUPT, MSG_INCOMPATIBLE, MSG_LOADED, MSG_NO_SAVE, MSG_SAVED, MSG_STORAGE_UNAVAILABLE,
    SimBridge,
};
pub use costs::CostTag;
pub use credit::{CheapestRateSelector, CreditLine, CreditLineSelector, PriorityOrderSelector};
pub use logger::{EventBuffer, LogEvent, NullLogger, UiLogger};
pub use rng::{RngSnapshot, SessionRng};
pub use rounds::{RoundResolution, VipNightOutcome, resolve_round};
pub use save::{
    FileSaveStore, FileStoreError, MemorySaveStore, SAVE_VERSION, SaveEnvelope, SaveError,
    SaveStore, decode_state, encode_state,
};
pub use simulation::{SimError, Simulation};
pub use snapshot::PresentationSnapshot;
pub use state::{GameState, Punter};
