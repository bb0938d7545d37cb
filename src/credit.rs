//! Credit facilities and the shortfall-selection policy seam.

use serde::{Deserialize, Serialize};

use crate::costs::CostTag;

/// A single borrowing facility absorbing cash shortfalls up to a limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLine {
    pub name: String,
    pub tag: CostTag,
    /// Drawn balance in cents; never exceeds `limit_cents`.
    pub balance_cents: i64,
    pub limit_cents: i64,
    /// Weekly interest rate as a fraction (0.02 = 2% per week).
    pub rate: f64,
}

impl CreditLine {
    #[must_use]
    pub fn new(name: &str, tag: CostTag, limit_cents: i64, rate: f64) -> Self {
        Self {
            name: name.to_string(),
            tag,
            balance_cents: 0,
            limit_cents,
            rate,
        }
    }

    /// Remaining headroom available to draw.
    #[must_use]
    pub const fn headroom_cents(&self) -> i64 {
        self.limit_cents.saturating_sub(self.balance_cents)
    }

    /// Draw up to `amount_cents`, clamped to headroom. Returns the cents
    /// actually drawn.
    pub fn draw(&mut self, amount_cents: i64) -> i64 {
        let drawn = amount_cents.min(self.headroom_cents()).max(0);
        self.balance_cents += drawn;
        drawn
    }

    /// Weekly interest owed on the current balance, rounded to whole cents.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn weekly_interest_cents(&self) -> i64 {
        if self.balance_cents <= 0 || self.rate <= 0.0 {
            return 0;
        }
        (self.balance_cents as f64 * self.rate).round() as i64
    }
}

/// Policy choosing which credit line absorbs a cash shortfall.
///
/// `options` holds only candidates with positive headroom, in ledger order.
/// The result is an index into `options`; `None` means the policy declines
/// every candidate. Implementations must be pure selection functions.
pub trait CreditLineSelector {
    fn select(&self, options: &[CreditLine], shortfall_cents: i64, reason: &str) -> Option<usize>;
}

/// Default policy: lowest rate wins, ties broken by ledger order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheapestRateSelector;

impl CreditLineSelector for CheapestRateSelector {
    fn select(&self, options: &[CreditLine], _shortfall_cents: i64, _reason: &str) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, line) in options.iter().enumerate() {
            match best {
                Some((_, rate)) if line.rate >= rate => {}
                _ => best = Some((idx, line.rate)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}

/// Alternative policy: first facility in ledger order wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityOrderSelector;

impl CreditLineSelector for PriorityOrderSelector {
    fn select(&self, options: &[CreditLine], _shortfall_cents: i64, _reason: &str) -> Option<usize> {
        if options.is_empty() { None } else { Some(0) }
    }
}
