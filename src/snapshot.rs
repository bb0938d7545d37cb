//! Read-only projection of the ledger for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::state::GameState;

/// Immutable view the UI renders from; one per frame is cheap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationSnapshot {
    pub money_cents: i64,
    pub debt_cents: i64,
    pub reputation: i32,
    pub chaos: f64,
    pub service_open: bool,
    pub week: u32,
    /// 1-based for display.
    pub day: u32,
    pub round: u32,
    /// Punters present in the current round.
    pub traffic: u32,
    pub unserved_last_tick: u32,
    pub refunds_last_tick: u32,
    pub fights_last_tick: u32,
}

impl From<&GameState> for PresentationSnapshot {
    fn from(state: &GameState) -> Self {
        Self {
            money_cents: state.cash_cents,
            debt_cents: state.total_credit_balance_cents(),
            reputation: state.reputation,
            chaos: state.chaos,
            service_open: state.night_open,
            week: state.week_count,
            day: state.day_index + 1,
            round: state.round_in_night,
            traffic: u32::try_from(state.night_punters.len()).unwrap_or(u32::MAX),
            unserved_last_tick: state.night_unserved,
            refunds_last_tick: state.night_refunds,
            fights_last_tick: state.night_fights,
        }
    }
}
