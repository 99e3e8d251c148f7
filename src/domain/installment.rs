use super::money::{CENT, Money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    #[default]
    Pending,
    Paid,
}

/// One installment of a sale's payment plan.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct InstallmentEntry {
    /// 1-based position, stable across recomputation.
    pub number: u32,
    #[serde(default)]
    pub status: InstallmentStatus,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    /// Amount owed while pending, amount actually paid once paid.
    pub value: Money,
}

impl InstallmentEntry {
    pub fn pending(number: u32, value: Money) -> Self {
        Self {
            number,
            status: InstallmentStatus::Pending,
            paid_at: None,
            value,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }

    /// Expands a payment stored with only a count and a per-installment value
    /// into an explicit list of pending entries.
    pub fn expand_legacy(count: usize, value: Money) -> Vec<Self> {
        (1..=count as u32).map(|n| Self::pending(n, value)).collect()
    }
}

/// The terms agreed when the plan was created.
///
/// Original entries are nominally worth `base_value`; when the sale `total` is
/// known, the cents left over by the division are owed one each by the first
/// entries, so the nominal values add up to the total exactly. Entries past
/// `original_count` are overflow entries with no nominal value of their own.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
pub struct InstallmentPlan {
    pub base_value: Money,
    pub original_count: usize,
    #[serde(default)]
    pub total: Option<Money>,
}

impl InstallmentPlan {
    pub fn new(base_value: Money, original_count: usize) -> Self {
        Self {
            base_value,
            original_count,
            total: None,
        }
    }

    pub fn with_total(mut self, total: Money) -> Self {
        self.total = Some(total);
        self
    }

    fn extra_cents(&self) -> Decimal {
        match self.total {
            Some(total) => {
                let leftover =
                    total - self.base_value * Decimal::from(self.original_count as u64);
                (leftover.value() / CENT.value())
                    .round()
                    .max(Decimal::ZERO)
            }
            None => Decimal::ZERO,
        }
    }

    /// What entry `index` (0-based) owes before any carried remainder.
    pub fn nominal(&self, index: usize) -> Money {
        if index >= self.original_count {
            Money::ZERO
        } else if Decimal::from(index as u64) < self.extra_cents() {
            self.base_value + CENT
        } else {
            self.base_value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_nominal_without_total_is_uniform() {
        let plan = InstallmentPlan::new(Money::new(dec!(33.33)), 3);
        assert_eq!(plan.nominal(0), Money::new(dec!(33.33)));
        assert_eq!(plan.nominal(2), Money::new(dec!(33.33)));
        assert_eq!(plan.nominal(3), Money::ZERO);
    }

    #[test]
    fn test_nominal_distributes_leftover_cents() {
        let plan = InstallmentPlan::new(Money::new(dec!(33.33)), 3).with_total(Money::new(dec!(100)));
        assert_eq!(plan.nominal(0), Money::new(dec!(33.34)));
        assert_eq!(plan.nominal(1), Money::new(dec!(33.33)));
        assert_eq!(plan.nominal(2), Money::new(dec!(33.33)));

        let plan = InstallmentPlan::new(Money::new(dec!(14.28)), 7).with_total(Money::new(dec!(100)));
        let nominal: Money = (0..7).map(|i| plan.nominal(i)).sum();
        assert_eq!(nominal, Money::new(dec!(100)));
    }

    #[test]
    fn test_expand_legacy() {
        let entries = InstallmentEntry::expand_legacy(3, Money::new(dec!(10)));
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].number, 3);
        assert!(entries.iter().all(|e| !e.is_paid() && e.paid_at.is_none()));
    }

    #[test]
    fn test_entry_serialization() {
        let entry = InstallmentEntry::pending(1, Money::new(dec!(33.34)));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"status\":\"pending\""));
        let back: InstallmentEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
