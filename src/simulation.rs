//! The night-service state machine and round-resolution orchestrator.

use thiserror::Error;

use crate::constants::{
    CHAOS_DECAY_PER_ROUND, CHAOS_PER_FIGHT, DAYS_PER_WEEK, EVENT_COST_CENTS, FIGHT_COST_CENTS,
    LOG_CREDIT_DRAW, LOG_CREDIT_EXHAUSTED, LOG_REVENUE_ROUND, LOG_ROUND_RESOLVED,
    LOG_SERVICE_CLOSE, LOG_SERVICE_CLOSE_REDUNDANT, LOG_SERVICE_OPEN, LOG_SERVICE_OPEN_REDUNDANT,
    LOG_SPEND_PREFIX,
    LOG_WEEK_SETTLEMENT, REPUTATION_DRIFT_PER_ROUND, REPUTATION_PENALTY_PER_FIGHT, ROUNDS_PER_DAY,
    TICKET_PRICE_CENTS, WEEKLY_RENT_CENTS, WEEKLY_WAGES_CENTS,
};
use crate::costs::CostTag;
use crate::credit::{CheapestRateSelector, CreditLine, CreditLineSelector};
use crate::logger::{LogEvent, UiLogger};
use crate::rounds::{RoundResolution, VipNightOutcome, resolve_round};
use crate::state::{GameState, Punter};

/// Errors surfaced by simulation entry points.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("round played while service is closed")]
    InvalidTransition,
    #[error("no credit line has headroom for a shortfall of {shortfall_cents} cents")]
    NoCreditAvailable { shortfall_cents: i64 },
}

/// Orchestrator exclusively owning one [`GameState`].
///
/// All mutation flows through here; consumers read projections via
/// `PresentationSnapshot` and receive events through the attached logger.
pub struct Simulation<L: UiLogger> {
    state: GameState,
    logger: L,
    selector: Box<dyn CreditLineSelector>,
}

impl<L: UiLogger> Simulation<L> {
    /// Bind a simulation to a state and logger, using the default
    /// cheapest-rate credit policy.
    #[must_use]
    pub fn new(state: GameState, logger: L) -> Self {
        Self {
            state,
            logger,
            selector: Box::new(CheapestRateSelector),
        }
    }

    /// Swap the credit-selection policy.
    #[must_use]
    pub fn with_selector(mut self, selector: Box<dyn CreditLineSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Borrow the underlying immutable game state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Borrow the underlying mutable game state.
    pub const fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Borrow the attached logger.
    pub const fn logger_mut(&mut self) -> &mut L {
        &mut self.logger
    }

    /// Consume the simulation, returning the underlying game state.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// `Closed -> Open`. Resets the round counter and the per-night tallies.
    /// Redundant calls are logged no-ops.
    pub fn open_night(&mut self) {
        if self.state.night_open {
            self.logger
                .publish(LogEvent::keyed(LOG_SERVICE_OPEN_REDUNDANT));
            return;
        }
        self.state.night_open = true;
        self.state.round_in_night = 0;
        self.state.night_unserved = 0;
        self.state.night_refunds = 0;
        self.state.night_fights = 0;
        self.state.night_punters.clear();
        self.logger.publish(LogEvent::keyed(LOG_SERVICE_OPEN));
    }

    /// `Open -> Closed`, logging the reason. Redundant calls are logged
    /// no-ops.
    pub fn close_night(&mut self, reason: &str) {
        if !self.state.night_open {
            self.logger
                .publish(LogEvent::keyed(LOG_SERVICE_CLOSE_REDUNDANT));
            return;
        }
        self.state.night_open = false;
        self.logger
            .publish(LogEvent::keyed(LOG_SERVICE_CLOSE).with_detail(reason));
    }

    /// Resolve one service round while the night is open.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidTransition`] when the night is closed, and
    /// [`SimError::NoCreditAvailable`] when a cash shortfall exceeds all
    /// remaining credit headroom. In the latter case cash is left negative
    /// and the round's chaos, reputation, and calendar phases are skipped;
    /// the caller decides the fallback.
    pub fn play_round(&mut self) -> Result<VipNightOutcome, SimError> {
        if !self.state.night_open {
            return Err(SimError::InvalidTransition);
        }

        self.state.round_in_night += 1;
        let round = self.state.round_in_night;

        let RoundResolution { traffic, outcome } = resolve_round(
            self.state.reputation,
            self.state.chaos,
            round,
            &mut self.state.rng,
        );

        self.state.night_punters = (0..traffic)
            .map(|i| Punter {
                arrived_round: round,
                served: i >= outcome.unserved_count,
            })
            .collect();
        self.state.night_unserved += outcome.unserved_count;
        self.state.night_refunds += outcome.refund_count;
        self.state.night_fights += outcome.fight_count;

        self.apply_round_finances(traffic, &outcome)?;

        if outcome.fight_count > 0 {
            self.state
                .apply_chaos_delta(f64::from(outcome.fight_count) * CHAOS_PER_FIGHT);
        } else {
            self.state.apply_chaos_delta(-CHAOS_DECAY_PER_ROUND);
        }

        let penalty = i32::try_from(outcome.fight_count).unwrap_or(i32::MAX)
            * REPUTATION_PENALTY_PER_FIGHT;
        self.state
            .apply_reputation_delta(REPUTATION_DRIFT_PER_ROUND - penalty);

        if round.is_multiple_of(ROUNDS_PER_DAY) {
            self.state.day_index += 1;
            if self.state.day_index > DAYS_PER_WEEK {
                self.state.day_index = 1;
                self.state.week_count += 1;
                self.weekly_settlement()?;
            }
        }

        self.state.assert_invariants();
        self.logger.publish(LogEvent::keyed(LOG_ROUND_RESOLVED));
        Ok(outcome)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn apply_round_finances(
        &mut self,
        traffic: u32,
        outcome: &VipNightOutcome,
    ) -> Result<(), SimError> {
        let served = i64::from(traffic - outcome.unserved_count);
        let revenue_cents =
            ((served * TICKET_PRICE_CENTS) as f64 * outcome.price_multiplier).round() as i64;
        self.state.cash_cents += revenue_cents;
        self.logger.publish(LogEvent::money(
            LOG_REVENUE_ROUND,
            CostTag::Operating,
            revenue_cents,
        ));

        let refund_cost = i64::from(outcome.refund_count) * TICKET_PRICE_CENTS;
        self.spend(refund_cost, CostTag::Operating, "refunds")?;

        let fight_cost = i64::from(outcome.fight_count) * FIGHT_COST_CENTS;
        self.spend(fight_cost, CostTag::Security, "fight damages")?;

        let event_cost = i64::from(outcome.event_count) * EVENT_COST_CENTS;
        self.spend(event_cost, CostTag::Event, "special event")?;
        Ok(())
    }

    /// Deduct a tagged cost; any resulting deficit is drawn from credit.
    pub(crate) fn spend(
        &mut self,
        amount_cents: i64,
        tag: CostTag,
        reason: &str,
    ) -> Result<(), SimError> {
        if amount_cents <= 0 {
            return Ok(());
        }
        self.state.cash_cents -= amount_cents;
        self.state.record_spend(tag, amount_cents);
        self.logger.publish(
            LogEvent::money(&format!("{LOG_SPEND_PREFIX}{tag}"), tag, amount_cents)
                .with_detail(reason),
        );

        if self.state.cash_cents < 0 {
            let shortfall = -self.state.cash_cents;
            self.cover_shortfall(shortfall, reason)?;
        }
        Ok(())
    }

    /// Draw from credit lines until the shortfall is covered or every
    /// facility is exhausted.
    pub(crate) fn cover_shortfall(
        &mut self,
        shortfall_cents: i64,
        reason: &str,
    ) -> Result<(), SimError> {
        let mut need = shortfall_cents;
        while need > 0 {
            let candidates: Vec<usize> = self
                .state
                .credit_lines
                .iter()
                .enumerate()
                .filter(|(_, line)| line.headroom_cents() > 0)
                .map(|(idx, _)| idx)
                .collect();

            let options: Vec<CreditLine> = candidates
                .iter()
                .map(|&idx| self.state.credit_lines[idx].clone())
                .collect();

            let chosen = self
                .selector
                .select(&options, need, reason)
                .and_then(|pick| candidates.get(pick).copied());
            let Some(idx) = chosen else {
                self.logger.publish(
                    LogEvent::keyed(LOG_CREDIT_EXHAUSTED).with_detail(reason),
                );
                return Err(SimError::NoCreditAvailable {
                    shortfall_cents: need,
                });
            };

            let line = &mut self.state.credit_lines[idx];
            let tag = line.tag;
            let drawn = line.draw(need);
            self.state.cash_cents += drawn;
            need -= drawn;
            self.logger
                .publish(LogEvent::money(LOG_CREDIT_DRAW, tag, drawn).with_detail(reason));
        }
        Ok(())
    }

    /// Week rollover charges: rent, wages, and interest on open balances,
    /// all routed through the same spend/shortfall path.
    fn weekly_settlement(&mut self) -> Result<(), SimError> {
        self.logger.publish(LogEvent::keyed(LOG_WEEK_SETTLEMENT));
        self.spend(WEEKLY_RENT_CENTS, CostTag::Rent, "weekly rent")?;
        self.spend(WEEKLY_WAGES_CENTS, CostTag::Wages, "weekly wages")?;
        let interest: i64 = self
            .state
            .credit_lines
            .iter()
            .map(CreditLine::weekly_interest_cents)
            .sum();
        self.spend(interest, CostTag::Interest, "weekly interest")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credit::PriorityOrderSelector;
    use crate::logger::{EventBuffer, NullLogger};

    fn sim(seed: u64) -> Simulation<NullLogger> {
        Simulation::new(GameState::new_game(seed), NullLogger)
    }

    #[test]
    fn open_night_resets_round_and_tallies() {
        let mut simulation = sim(1);
        simulation.state_mut().round_in_night = 9;
        simulation.state_mut().night_fights = 3;
        simulation.state_mut().night_unserved = 2;
        simulation.open_night();
        assert!(simulation.state().night_open);
        assert_eq!(simulation.state().round_in_night, 0);
        assert_eq!(simulation.state().night_fights, 0);
        assert_eq!(simulation.state().night_unserved, 0);
    }

    #[test]
    fn redundant_open_is_a_logged_noop() {
        let mut simulation = Simulation::new(GameState::new_game(1), EventBuffer::new());
        simulation.open_night();
        let before = simulation.state().clone();
        simulation.open_night();
        assert_eq!(simulation.state(), &before);
        let keys: Vec<String> = simulation
            .logger_mut()
            .drain()
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, vec!["log.service.open", "log.service.open.redundant"]);
    }

    #[test]
    fn close_night_is_idempotent() {
        let mut simulation = sim(1);
        simulation.open_night();
        simulation.close_night("last call");
        let after_first = simulation.state().clone();
        simulation.close_night("again");
        assert_eq!(simulation.state(), &after_first);
    }

    #[test]
    fn play_round_while_closed_is_invalid() {
        let mut simulation = sim(1);
        assert_eq!(simulation.play_round(), Err(SimError::InvalidTransition));
    }

    #[test]
    fn debt_matches_line_balances_after_every_round() {
        let mut simulation = sim(42);
        simulation.state_mut().cash_cents = 200_000;
        simulation.open_night();
        for _ in 0..30 {
            simulation.play_round().expect("credit is ample");
            let total: i64 = simulation
                .state()
                .credit_lines
                .iter()
                .map(|line| line.balance_cents)
                .sum();
            assert_eq!(simulation.state().total_credit_balance_cents(), total);
            assert!(simulation.state().chaos >= 0.0);
            assert!((0..=100).contains(&simulation.state().reputation));
        }
    }

    #[test]
    fn shortfall_draws_cheapest_line_first() {
        let mut simulation = sim(1);
        simulation.state_mut().cash_cents = 0;
        simulation
            .spend(10_000, CostTag::Maintenance, "burst pipe")
            .expect("overdraft has headroom");
        // Overdraft (2%/wk) is cheaper than supplier credit (5%/wk).
        assert_eq!(simulation.state().credit_lines[1].balance_cents, 10_000);
        assert_eq!(simulation.state().credit_lines[0].balance_cents, 0);
        assert_eq!(simulation.state().cash_cents, 0);
    }

    #[test]
    fn spend_publishes_a_tag_keyed_ledger_event() {
        let mut simulation = Simulation::new(GameState::new_game(3), EventBuffer::new());
        simulation
            .spend(1_200, CostTag::Security, "door staff")
            .expect("cash covers it");
        assert!(simulation.logger_mut().drain().iter().any(|e| {
            e.key == "log.spend.security"
                && e.tag == Some(CostTag::Security)
                && e.amount_cents == Some(1_200)
        }));
    }

    #[test]
    fn shortfall_spills_into_next_line_when_clamped() {
        let mut simulation = sim(1);
        simulation.state_mut().cash_cents = 0;
        simulation.state_mut().credit_lines[1].limit_cents = 4_000;
        simulation
            .spend(10_000, CostTag::Maintenance, "burst pipe")
            .expect("combined headroom suffices");
        assert_eq!(simulation.state().credit_lines[1].balance_cents, 4_000);
        assert_eq!(simulation.state().credit_lines[0].balance_cents, 6_000);
        assert_eq!(simulation.state().cash_cents, 0);
    }

    #[test]
    fn exhausted_headroom_reports_residual_shortfall() {
        let mut simulation = Simulation::new(GameState::new_game(1), EventBuffer::new());
        simulation.state_mut().cash_cents = 0;
        for line in &mut simulation.state_mut().credit_lines {
            line.limit_cents = 1_000;
        }
        let err = simulation
            .spend(5_000, CostTag::Maintenance, "flood")
            .expect_err("headroom exhausted");
        assert_eq!(
            err,
            SimError::NoCreditAvailable {
                shortfall_cents: 3_000
            }
        );
        // Cash stays negative; the caller decides the fallback.
        assert_eq!(simulation.state().cash_cents, -3_000);
        assert!(
            simulation
                .logger_mut()
                .drain()
                .iter()
                .any(|e| e.key == "log.credit.exhausted")
        );
    }

    #[test]
    fn priority_selector_overrides_default_policy() {
        let mut simulation = Simulation::new(GameState::new_game(1), NullLogger)
            .with_selector(Box::new(PriorityOrderSelector));
        simulation.state_mut().cash_cents = 0;
        simulation
            .spend(2_000, CostTag::Maintenance, "leak")
            .expect("supplier line has headroom");
        assert_eq!(simulation.state().credit_lines[0].balance_cents, 2_000);
    }

    #[test]
    fn seven_rounds_advance_one_day_without_a_week() {
        let mut simulation = sim(1);
        simulation.state_mut().day_index = 1;
        simulation.open_night();
        for _ in 0..7 {
            simulation.play_round().expect("round plays");
        }
        assert_eq!(simulation.state().day_index, 2);
        assert_eq!(simulation.state().week_count, 0);
    }

    #[test]
    fn week_rollover_settles_rent_wages_and_interest() {
        let mut simulation = sim(7);
        simulation.state_mut().cash_cents = 10_000_000;
        simulation.state_mut().credit_lines[1].balance_cents = 10_000;
        simulation.open_night();
        for _ in 0..56 {
            simulation.play_round().expect("cash is ample");
        }
        assert_eq!(simulation.state().week_count, 1);
        assert_eq!(simulation.state().day_index, 1);
        let ledger = &simulation.state().spent_cents_by_tag;
        assert_eq!(ledger.get(&CostTag::Rent), Some(&WEEKLY_RENT_CENTS));
        assert_eq!(ledger.get(&CostTag::Wages), Some(&WEEKLY_WAGES_CENTS));
        // 2% weekly on the 10_000-cent overdraft balance.
        assert_eq!(ledger.get(&CostTag::Interest), Some(&200));
    }

    #[test]
    fn punters_match_traffic_and_service_split() {
        let mut simulation = sim(42);
        simulation.open_night();
        let outcome = simulation.play_round().expect("round plays");
        let punters = &simulation.state().night_punters;
        let unserved = punters.iter().filter(|p| !p.served).count();
        assert_eq!(unserved, outcome.unserved_count as usize);
        assert_eq!(
            punters.len(),
            14,
            "seed-42 opening round traffic is fixed by the formula"
        );
    }
}
