use super::money::Money;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    #[default]
    Pending,
    Completed,
}

/// A snapshot of a reseller's period, sent to the administrator for closing.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Settlement {
    pub reseller: u32,
    /// Per-reseller sequence number, starting at 1.
    pub number: u32,
    #[serde(default)]
    pub status: SettlementStatus,
    pub total_sold: Money,
    pub total_commission: Money,
    /// What the reseller owes the administrator: sold minus commission.
    pub amount_due: Money,
    pub items_received: u32,
    pub items_sold: u32,
    pub items_to_return: u32,
    /// Value of the unsold stock that goes back with the returned items.
    #[serde(default)]
    pub stock_returned: Money,
    pub goal_amount: Money,
    /// Commission as a percentage of the goal, uncapped; zero without a goal.
    pub goal_achievement: Decimal,
    #[serde(default)]
    pub sale_ids: Vec<u32>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Settlement {
    pub fn is_pending(&self) -> bool {
        self.status == SettlementStatus::Pending
    }

    /// `pending -> completed`; completion is final.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<()> {
        if self.status == SettlementStatus::Completed {
            return Err(LedgerError::InvalidTransition(format!(
                "settlement {} of reseller {} is already completed",
                self.number, self.reseller
            )));
        }
        self.status = SettlementStatus::Completed;
        self.finalized_at = Some(at);
        Ok(())
    }
}
