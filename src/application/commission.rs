//! Progressive commission brackets and their inverse.
//!
//! Both directions walk the same normalized brackets (see
//! [`crate::domain::tier::brackets`]), so for any reachable target
//! `total_commission(sales_required_for_commission(t)) == t`.

use crate::domain::money::Money;
use crate::domain::tier::{CommissionTier, brackets};
use rust_decimal::Decimal;

/// Commission earned on `sales_volume` under `tiers`.
///
/// Tiers may arrive unsorted; an empty set earns nothing. Negative volume is
/// treated as zero and negative percentages let volume through untaxed.
pub fn total_commission(sales_volume: Money, tiers: &[CommissionTier]) -> Money {
    let mut commission = Money::ZERO;
    let mut remaining = sales_volume.max(Money::ZERO);

    for bracket in brackets(tiers) {
        if !remaining.is_positive() {
            break;
        }

        let amount = match bracket.width {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        commission += amount * bracket.percentage.rate();
        remaining -= amount;
    }

    commission
}

/// Smallest sales volume that earns `target_commission` under `tiers`.
///
/// Returns `None` when the target is unreachable, which only happens when the
/// unbounded top bracket pays nothing and the finite brackets fall short.
pub fn sales_required_for_commission(
    target_commission: Money,
    tiers: &[CommissionTier],
) -> Option<Money> {
    if !target_commission.is_positive() || tiers.is_empty() {
        return Some(Money::ZERO);
    }

    let mut current = Money::ZERO;
    let mut required = Money::ZERO;

    for bracket in brackets(tiers) {
        let rate = bracket.percentage.rate();

        if rate <= Decimal::ZERO {
            // Zero-rate brackets must be crossed in full for no commission.
            required += bracket.width?;
            continue;
        }

        let missing = target_commission - current;
        match bracket.width {
            Some(width) if current + width * rate < target_commission => {
                current += width * rate;
                required += width;
            }
            _ => {
                // A vanishing rate can push the volume past Decimal's range.
                let volume = missing.value().checked_div(rate)?;
                return required.value().checked_add(volume).map(Money::new);
            }
        }
    }

    Some(required)
}

/// Where a reseller stands against their commission goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub total_sold: Money,
    pub commission: Money,
    pub goal: Money,
    /// Commission as a percentage of the goal, capped at 100.
    pub progress: Decimal,
    /// Sales still needed to reach the goal; `None` if it cannot be reached.
    pub sales_to_goal: Option<Money>,
}

/// Dashboard figures for a reseller. An unset goal counts as a goal of 1.
pub fn goal_progress(total_sold: Money, goal: Money, tiers: &[CommissionTier]) -> GoalProgress {
    let commission = total_commission(total_sold, tiers);
    let effective_goal = if goal.is_positive() {
        goal
    } else {
        Money::new(Decimal::ONE)
    };

    let progress = commission
        .value()
        .checked_div(effective_goal.value())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ONE_HUNDRED, |pct| pct.min(Decimal::ONE_HUNDRED));
    let sales_to_goal = sales_required_for_commission(effective_goal, tiers)
        .map(|required| (required - total_sold).max(Money::ZERO));

    GoalProgress {
        total_sold,
        commission,
        goal,
        progress,
        sales_to_goal,
    }
}

/// Commission as a percentage of the goal, uncapped and rounded to 2 places.
/// Zero when no goal is set; saturates at `Decimal::MAX` for vanishing goals.
pub fn goal_achievement(commission: Money, goal: Money) -> Decimal {
    if !goal.is_positive() {
        return Decimal::ZERO;
    }
    commission
        .value()
        .checked_div(goal.value())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::MAX, |pct| pct.round_dp(2))
}

/// Result of simulating commission for an arbitrary volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub volume: Money,
    pub commission: Money,
    /// Effective commission percentage across all brackets.
    pub average_rate: Decimal,
}

pub fn simulate(volume: Money, tiers: &[CommissionTier]) -> Simulation {
    let commission = total_commission(volume, tiers);
    let average_rate = if volume.is_positive() {
        commission.value() / volume.value() * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    Simulation {
        volume,
        commission,
        average_rate,
    }
}

/// True when `goal` exceeds everything the current stock could earn if it all sold.
pub fn goal_exceeds_potential(goal: Money, stock_value: Money, tiers: &[CommissionTier]) -> bool {
    let potential = total_commission(stock_value, tiers);
    potential.is_positive() && goal > potential
}
