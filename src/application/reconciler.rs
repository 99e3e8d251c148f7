//! Installment plans: generation at sale time and rebalancing on every mark.
//!
//! A paid installment keeps what was actually paid; the difference from what it
//! was expected to cover is carried to the next pending installment. Credit
//! that swallows a pending installment settles it automatically, and debt left
//! after the last entry extends the plan by one overflow entry.

use crate::domain::installment::{InstallmentEntry, InstallmentPlan, InstallmentStatus};
use crate::domain::money::{CENT, Money};
use crate::domain::sale::PaymentStatus;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// The status change requested for one installment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mark {
    /// Paid on `at`; `amount` overrides the installment's current value.
    Paid {
        at: DateTime<Utc>,
        amount: Option<Money>,
    },
    /// Reverts a payment. The value is recomputed, not restored.
    Pending,
}

/// Rebalanced schedule and the sale status it implies.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub entries: Vec<InstallmentEntry>,
    pub payment_status: PaymentStatus,
}

/// Splits `total` into `count` installments that add up to it to the cent.
///
/// Each installment gets `total / count` floored to cents; the leftover cents
/// go one each to the first installments.
pub fn generate_installments(
    total: Money,
    count: usize,
) -> Result<(InstallmentPlan, Vec<InstallmentEntry>)> {
    if count == 0 {
        return Err(LedgerError::ValidationError(
            "Installment count must be positive".to_string(),
        ));
    }
    let total = total.non_negative("Sale total")?;

    let base_value = Money::new(total.value() / Decimal::from(count as u64)).floor_cents();
    let plan = InstallmentPlan::new(base_value, count).with_total(total);
    let entries = (0..count)
        .map(|i| InstallmentEntry::pending(i as u32 + 1, plan.nominal(i)))
        .collect();

    Ok((plan, entries))
}

/// Applies `mark` to `schedule[index]` and rebalances the whole schedule.
///
/// `now` stamps installments that become settled by credit alone.
pub fn mark_installment(
    schedule: &[InstallmentEntry],
    plan: &InstallmentPlan,
    index: usize,
    mark: Mark,
    now: DateTime<Utc>,
) -> Result<Reconciliation> {
    validate(schedule, plan)?;
    if index >= schedule.len() {
        return Err(LedgerError::InvalidScheduleState(format!(
            "installment index {} out of bounds for schedule of {}",
            index,
            schedule.len()
        )));
    }

    let mut entries = schedule.to_vec();
    let entry = &mut entries[index];
    match mark {
        Mark::Paid { at, amount } => {
            if let Some(amount) = amount {
                entry.value = amount.non_negative("Paid amount")?;
            }
            entry.status = InstallmentStatus::Paid;
            entry.paid_at = Some(at);
        }
        Mark::Pending => {
            entry.status = InstallmentStatus::Pending;
            entry.paid_at = None;
        }
    }

    recompute(&entries, plan, now)
}

/// Rebalances a schedule without changing any status.
///
/// Running it on its own output changes nothing.
pub fn recompute(
    schedule: &[InstallmentEntry],
    plan: &InstallmentPlan,
    now: DateTime<Utc>,
) -> Result<Reconciliation> {
    validate(schedule, plan)?;

    let mut entries = schedule.to_vec();
    let mut remainder = Money::ZERO;

    for (i, entry) in entries.iter_mut().enumerate() {
        let expected = plan.nominal(i) + remainder;

        if entry.is_paid() {
            remainder = expected - entry.value;
        } else if expected <= CENT {
            entry.value = Money::ZERO;
            entry.status = InstallmentStatus::Paid;
            entry.paid_at = entry.paid_at.or(Some(now));
            remainder = expected;
        } else {
            entry.value = expected;
            entry.paid_at = None;
            remainder = Money::ZERO;
        }
    }

    if remainder > CENT {
        let number = entries.len() as u32 + 1;
        entries.push(InstallmentEntry::pending(number, remainder));
    }

    while entries.len() > plan.original_count {
        match entries.last() {
            Some(last) if last.is_paid() && last.value <= CENT => {
                entries.pop();
            }
            _ => break,
        }
    }

    let payment_status = if entries.iter().all(InstallmentEntry::is_paid) {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Installment
    };

    Ok(Reconciliation {
        entries,
        payment_status,
    })
}

fn validate(schedule: &[InstallmentEntry], plan: &InstallmentPlan) -> Result<()> {
    if plan.original_count > schedule.len() {
        return Err(LedgerError::InvalidScheduleState(format!(
            "plan expects {} installments but schedule has {}",
            plan.original_count,
            schedule.len()
        )));
    }
    Ok(())
}
