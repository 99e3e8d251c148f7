use super::money::Money;
use super::tier::CommissionTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reseller's commission policy and running goal state.
///
/// `tiers` is a copy of the global default taken at creation time (or on an
/// explicit re-apply). It does not follow later changes to the default.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ResellerAccount {
    pub reseller: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tiers: Vec<CommissionTier>,
    #[serde(default)]
    pub goal_amount: Money,
    #[serde(default)]
    pub settlement_date: Option<DateTime<Utc>>,
    /// Items received through allotments since the last settlement request.
    #[serde(default)]
    pub items_received: u32,
    /// Sale value of the allotted stock still in the reseller's hands.
    #[serde(default)]
    pub stock_value: Money,
}

impl ResellerAccount {
    pub fn new(reseller: u32, tiers: Vec<CommissionTier>) -> Self {
        Self {
            reseller,
            name: None,
            tiers,
            goal_amount: Money::ZERO,
            settlement_date: None,
            items_received: 0,
            stock_value: Money::ZERO,
        }
    }

    /// Hands the items and stock value held so far over to a settlement.
    ///
    /// The account keeps nothing of what was taken, so a later settlement only
    /// sees allotments made after this one.
    pub fn take_stock(&mut self) -> (u32, Money) {
        let taken = (self.items_received, self.stock_value);
        self.items_received = 0;
        self.stock_value = Money::ZERO;
        taken
    }

    /// Closes the goal period after a completed settlement.
    pub fn close_period(&mut self) {
        self.goal_amount = Money::ZERO;
        self.settlement_date = None;
    }
}
