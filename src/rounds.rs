//! Stochastic resolution of a single service round.
//!
//! Everything here is a pure function of the state snapshot handed in and the
//! next draws from the session rng, so an identical seed and call sequence
//! always reproduces the identical outcome sequence.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BASE_TRAFFIC, CHAOS_SOFT_CAP, EVENT_CADENCE, EVENT_CHANCE, FIGHT_BASE_CHANCE,
    FIGHT_CHANCE_CAP, FIGHT_CHAOS_WEIGHT, FIGHT_EXTRA_MAX, PRICE_MULTIPLIER_MAX,
    PRICE_MULTIPLIER_MIN, REFUND_CYCLE_PERIOD, REFUND_JITTER_MAX, TRAFFIC_CYCLE_PERIOD,
    UNSERVED_CYCLE_PERIOD, UNSERVED_JITTER_MAX,
};
use crate::rng::SessionRng;

/// Immutable summary of one round's stochastic resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VipNightOutcome {
    pub unserved_count: u32,
    pub fight_count: u32,
    pub event_count: u32,
    pub refund_count: u32,
    pub price_multiplier: f64,
    pub food_quality_signal: f64,
}

/// A resolved round: customer traffic plus the outcome record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundResolution {
    pub traffic: u32,
    pub outcome: VipNightOutcome,
}

/// Bounded periodic adjustment keyed off the round counter; gives predictable
/// variety without unbounded growth.
#[must_use]
pub(crate) const fn cyclic_term(round: u32) -> i64 {
    (round % TRAFFIC_CYCLE_PERIOD) as i64
}

/// Fight probability for a given chaos level; monotone in chaos.
#[must_use]
pub(crate) fn fight_chance(chaos: f64) -> f64 {
    let chaos = chaos.max(0.0);
    let pressure = chaos / (chaos + CHAOS_SOFT_CAP);
    (FIGHT_BASE_CHANCE + pressure * FIGHT_CHAOS_WEIGHT).min(FIGHT_CHANCE_CAP)
}

/// Resolve one round from the current reputation, chaos, and round counter,
/// consuming draws from the session rng.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn resolve_round(
    reputation: i32,
    chaos: f64,
    round: u32,
    rng: &mut SessionRng,
) -> RoundResolution {
    let traffic_raw =
        BASE_TRAFFIC + i64::from(reputation / 10) - chaos.floor() as i64 + cyclic_term(round);
    let traffic = traffic_raw.max(0) as u32;

    let unserved_base = round % UNSERVED_CYCLE_PERIOD;
    let unserved_count = (unserved_base + rng.random_range(0..=UNSERVED_JITTER_MAX)).min(traffic);

    let refund_base = u32::from(round.is_multiple_of(REFUND_CYCLE_PERIOD));
    let refund_count = (refund_base + rng.random_range(0..=REFUND_JITTER_MAX)).min(traffic);

    let fight_count = if rng.random::<f64>() < fight_chance(chaos) {
        1 + rng.random_range(0..=FIGHT_EXTRA_MAX)
    } else {
        0
    };

    let event_count = if round.is_multiple_of(EVENT_CADENCE) && rng.random::<f64>() < EVENT_CHANCE
    {
        1
    } else {
        0
    };

    let price_multiplier = (1.0 + f64::from(reputation) / 200.0 - chaos / 100.0)
        .clamp(PRICE_MULTIPLIER_MIN, PRICE_MULTIPLIER_MAX);
    let food_quality_signal = (f64::from(reputation) / 100.0 - chaos / 50.0).clamp(0.0, 1.0);

    RoundResolution {
        traffic,
        outcome: VipNightOutcome {
            unserved_count,
            fight_count,
            event_count,
            refund_count,
            price_multiplier,
            food_quality_signal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traffic_is_deterministic_from_snapshot() {
        let mut rng = SessionRng::from_seed_u64(42);
        let resolution = resolve_round(50, 0.0, 1, &mut rng);
        // 8 + 50/10 - 0 + 1 % 5
        assert_eq!(resolution.traffic, 14);
    }

    #[test]
    fn traffic_never_negative() {
        let mut rng = SessionRng::from_seed_u64(3);
        let resolution = resolve_round(0, 80.0, 5, &mut rng);
        assert_eq!(resolution.traffic, 0);
        assert_eq!(resolution.outcome.unserved_count, 0);
        assert_eq!(resolution.outcome.refund_count, 0);
    }

    #[test]
    fn counts_bounded_by_traffic() {
        let mut rng = SessionRng::from_seed_u64(11);
        for round in 1..=40 {
            let resolution = resolve_round(30, 4.0, round, &mut rng);
            assert!(resolution.outcome.unserved_count <= resolution.traffic);
            assert!(resolution.outcome.refund_count <= resolution.traffic);
        }
    }

    #[test]
    fn fight_chance_monotone_in_chaos() {
        let mut previous = fight_chance(0.0);
        for step in 1..=50 {
            let chance = fight_chance(f64::from(step) * 2.0);
            assert!(chance >= previous, "chance dropped at chaos {}", step * 2);
            assert!(chance <= FIGHT_CHANCE_CAP);
            previous = chance;
        }
    }

    #[test]
    fn identical_streams_reproduce_outcomes() {
        let mut a = SessionRng::from_seed_u64(99);
        let mut b = SessionRng::from_seed_u64(99);
        for round in 1..=20 {
            let left = resolve_round(60, 3.5, round, &mut a);
            let right = resolve_round(60, 3.5, round, &mut b);
            assert_eq!(left, right);
        }
    }

    #[test]
    fn secondary_signals_stay_in_band() {
        let mut rng = SessionRng::from_seed_u64(5);
        let calm = resolve_round(100, 0.0, 1, &mut rng);
        assert!(calm.outcome.price_multiplier <= PRICE_MULTIPLIER_MAX);
        assert!((calm.outcome.food_quality_signal - 1.0).abs() <= f64::EPSILON);

        let rowdy = resolve_round(0, 200.0, 1, &mut rng);
        assert!(rowdy.outcome.price_multiplier >= PRICE_MULTIPLIER_MIN);
        assert!(rowdy.outcome.food_quality_signal.abs() <= f64::EPSILON);
    }
}
