//! The mutable simulation ledger.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::constants::{
    OVERDRAFT_LINE_LIMIT_CENTS, OVERDRAFT_LINE_WEEKLY_RATE, REPUTATION_MAX, REPUTATION_MIN,
    STARTING_CASH_CENTS, STARTING_REPUTATION, SUPPLIER_LINE_LIMIT_CENTS,
    SUPPLIER_LINE_WEEKLY_RATE,
};
use crate::costs::CostTag;
use crate::credit::CreditLine;
use crate::rng::SessionRng;

/// One in-progress customer for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punter {
    pub arrived_round: u32,
    pub served: bool,
}

/// The single mutable aggregate behind one play session.
///
/// Exclusively owned by one `Simulation` at a time; everything else reads it
/// through `PresentationSnapshot`. Replaced wholesale on new game or load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u64,
    /// Cash in cents; goes negative only transiently until a shortfall is
    /// absorbed by credit.
    pub cash_cents: i64,
    /// Ledger order is the selectors' default tie-break order.
    pub credit_lines: Vec<CreditLine>,
    /// Bounded quality score, 0..=100.
    pub reputation: i32,
    /// Accumulating disorder metric, never below zero.
    pub chaos: f64,
    pub night_open: bool,
    pub week_count: u32,
    /// 0-based day counter; the presentation layer shows `day_index + 1`.
    pub day_index: u32,
    pub round_in_night: u32,
    #[serde(default)]
    pub night_punters: SmallVec<[Punter; 16]>,
    #[serde(default)]
    pub night_unserved: u32,
    #[serde(default)]
    pub night_refunds: u32,
    #[serde(default)]
    pub night_fights: u32,
    /// Cost aggregation per tag, in cents.
    #[serde(default)]
    pub spent_cents_by_tag: BTreeMap<CostTag, i64>,
    pub rng: SessionRng,
}

impl GameState {
    /// Factory for a fresh game bound to `seed`, with the default credit
    /// facilities attached.
    #[must_use]
    pub fn new_game(seed: u64) -> Self {
        Self {
            seed,
            cash_cents: STARTING_CASH_CENTS,
            credit_lines: vec![
                CreditLine::new(
                    "supplier credit",
                    CostTag::Supplier,
                    SUPPLIER_LINE_LIMIT_CENTS,
                    SUPPLIER_LINE_WEEKLY_RATE,
                ),
                CreditLine::new(
                    "bank overdraft",
                    CostTag::Other,
                    OVERDRAFT_LINE_LIMIT_CENTS,
                    OVERDRAFT_LINE_WEEKLY_RATE,
                ),
            ],
            reputation: STARTING_REPUTATION,
            chaos: 0.0,
            night_open: false,
            week_count: 0,
            day_index: 0,
            round_in_night: 0,
            night_punters: SmallVec::new(),
            night_unserved: 0,
            night_refunds: 0,
            night_fights: 0,
            spent_cents_by_tag: BTreeMap::new(),
            rng: SessionRng::from_seed_u64(seed),
        }
    }

    /// Total debt across all credit lines, in cents.
    #[must_use]
    pub fn total_credit_balance_cents(&self) -> i64 {
        self.credit_lines
            .iter()
            .map(|line| line.balance_cents)
            .sum()
    }

    /// Reset the calendar and night counters between sessions, keeping the
    /// ledger itself intact.
    pub fn reset_for_menu(&mut self) {
        self.night_open = false;
        self.week_count = 0;
        self.day_index = 0;
        self.round_in_night = 0;
        self.night_punters.clear();
        self.night_unserved = 0;
        self.night_refunds = 0;
        self.night_fights = 0;
    }

    /// Shift reputation by `delta`, clamped to the valid band.
    pub(crate) fn apply_reputation_delta(&mut self, delta: i32) {
        self.reputation = (self.reputation + delta).clamp(REPUTATION_MIN, REPUTATION_MAX);
    }

    /// Raise chaos; negative deltas are a decay and floor at zero.
    pub(crate) fn apply_chaos_delta(&mut self, delta: f64) {
        self.chaos = (self.chaos + delta).max(0.0);
    }

    /// Record a tagged spend in the aggregation ledger.
    pub(crate) fn record_spend(&mut self, tag: CostTag, amount_cents: i64) {
        if amount_cents == 0 {
            return;
        }
        *self.spent_cents_by_tag.entry(tag).or_insert(0) += amount_cents;
    }

    /// Invariant guard for programming errors; cheap enough to run after
    /// every round in debug builds.
    pub(crate) fn assert_invariants(&self) {
        debug_assert!(
            (REPUTATION_MIN..=REPUTATION_MAX).contains(&self.reputation),
            "reputation out of bounds: {}",
            self.reputation
        );
        debug_assert!(self.chaos >= 0.0, "chaos went negative: {}", self.chaos);
        for line in &self.credit_lines {
            debug_assert!(
                line.balance_cents >= 0 && line.balance_cents <= line.limit_cents,
                "credit line {} balance {} outside 0..={}",
                line.name,
                line.balance_cents,
                line.limit_cents
            );
        }
    }
}
