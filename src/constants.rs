//! Centralized balance and tuning constants for Last Call simulation logic.
//!
//! These values define the deterministic math for the night-service engine.
//! Keeping them together ensures that gameplay can only be adjusted via code
//! changes reviewed in version control, rather than through external assets.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_SERVICE_OPEN: &str = "log.service.open";
pub(crate) const LOG_SERVICE_OPEN_REDUNDANT: &str = "log.service.open.redundant";
pub(crate) const LOG_SERVICE_CLOSE: &str = "log.service.close";
pub(crate) const LOG_SERVICE_CLOSE_REDUNDANT: &str = "log.service.close.redundant";
pub(crate) const LOG_ROUND_RESOLVED: &str = "log.round.resolved";
pub(crate) const LOG_SPEND_PREFIX: &str = "log.spend.";
pub(crate) const LOG_CREDIT_DRAW: &str = "log.credit.draw";
pub(crate) const LOG_CREDIT_EXHAUSTED: &str = "log.credit.exhausted";
pub(crate) const LOG_WEEK_SETTLEMENT: &str = "log.week.settlement";
pub(crate) const LOG_REVENUE_ROUND: &str = "log.revenue.round";

// Calendar -----------------------------------------------------------------
pub(crate) const ROUNDS_PER_DAY: u32 = 7;
pub(crate) const DAYS_PER_WEEK: u32 = 7;

// Starting ledger ----------------------------------------------------------
pub(crate) const STARTING_CASH_CENTS: i64 = 50_000;
pub(crate) const STARTING_REPUTATION: i32 = 50;
pub(crate) const SUPPLIER_LINE_LIMIT_CENTS: i64 = 30_000;
pub(crate) const SUPPLIER_LINE_WEEKLY_RATE: f64 = 0.05;
pub(crate) const OVERDRAFT_LINE_LIMIT_CENTS: i64 = 100_000;
pub(crate) const OVERDRAFT_LINE_WEEKLY_RATE: f64 = 0.02;

// Round resolution ---------------------------------------------------------
pub(crate) const BASE_TRAFFIC: i64 = 8;
pub(crate) const TRAFFIC_CYCLE_PERIOD: u32 = 5;
pub(crate) const UNSERVED_CYCLE_PERIOD: u32 = 3;
pub(crate) const UNSERVED_JITTER_MAX: u32 = 2;
pub(crate) const REFUND_CYCLE_PERIOD: u32 = 4;
pub(crate) const REFUND_JITTER_MAX: u32 = 1;
pub(crate) const FIGHT_BASE_CHANCE: f64 = 0.15;
pub(crate) const FIGHT_CHAOS_WEIGHT: f64 = 0.6;
pub(crate) const FIGHT_CHANCE_CAP: f64 = 0.9;
pub(crate) const FIGHT_EXTRA_MAX: u32 = 1;
pub(crate) const CHAOS_SOFT_CAP: f64 = 20.0;
pub(crate) const EVENT_CADENCE: u32 = 5;
pub(crate) const EVENT_CHANCE: f64 = 0.4;
pub(crate) const PRICE_MULTIPLIER_MIN: f64 = 0.5;
pub(crate) const PRICE_MULTIPLIER_MAX: f64 = 1.5;

// Financials ---------------------------------------------------------------
pub(crate) const TICKET_PRICE_CENTS: i64 = 1_500;
pub(crate) const FIGHT_COST_CENTS: i64 = 5_000;
pub(crate) const EVENT_COST_CENTS: i64 = 2_500;
pub(crate) const WEEKLY_RENT_CENTS: i64 = 20_000;
pub(crate) const WEEKLY_WAGES_CENTS: i64 = 14_000;

// Chaos and reputation dynamics --------------------------------------------
pub(crate) const CHAOS_PER_FIGHT: f64 = 1.5;
pub(crate) const CHAOS_DECAY_PER_ROUND: f64 = 0.5;
pub(crate) const REPUTATION_DRIFT_PER_ROUND: i32 = 1;
pub(crate) const REPUTATION_PENALTY_PER_FIGHT: i32 = 2;
pub(crate) const REPUTATION_MIN: i32 = 0;
pub(crate) const REPUTATION_MAX: i32 = 100;
