use super::installment::{InstallmentEntry, InstallmentPlan};
use super::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Installment,
    Paid,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Pix,
    Credit,
    Debit,
    #[default]
    #[serde(other)]
    Other,
}

/// How a sale is being paid for.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    #[serde(default)]
    pub method: PaymentMethod,
    /// `None` when paid in full.
    #[serde(default)]
    pub plan: Option<InstallmentPlan>,
    #[serde(default)]
    pub installments: Vec<InstallmentEntry>,
    pub registered_at: DateTime<Utc>,
}

impl Payment {
    pub fn in_full(method: PaymentMethod, registered_at: DateTime<Utc>) -> Self {
        Self {
            method,
            plan: None,
            installments: Vec::new(),
            registered_at,
        }
    }

    pub fn in_installments(
        method: PaymentMethod,
        plan: InstallmentPlan,
        installments: Vec<InstallmentEntry>,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            method,
            plan: Some(plan),
            installments,
            registered_at,
        }
    }

    /// Restores the explicit installment list for payments persisted with only
    /// their plan terms.
    pub fn normalize(&mut self) {
        if let Some(plan) = self.plan
            && self.installments.is_empty()
            && plan.original_count > 0
        {
            self.installments = InstallmentEntry::expand_legacy(plan.original_count, plan.base_value);
        }
    }

    /// Sum of what pending installments still owe.
    pub fn outstanding(&self) -> Money {
        self.installments
            .iter()
            .filter(|e| !e.is_paid())
            .map(|e| e.value)
            .sum()
    }
}

/// A product sold by a reseller to a client.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Sale {
    pub id: u32,
    pub reseller: u32,
    #[serde(default)]
    pub client: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub sold_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment: Option<Payment>,
    /// Number of the settlement that captured this sale.
    #[serde(default)]
    pub settlement: Option<u32>,
    /// Set once that settlement is completed.
    #[serde(default)]
    pub settled: bool,
    /// Portion of the price taken out of the reseller's stock value.
    #[serde(default)]
    pub stock_deducted: Money,
}

impl Sale {
    pub fn new(id: u32, reseller: u32, price: Money) -> Self {
        Self {
            id,
            reseller,
            client: None,
            price,
            sold_at: None,
            payment_status: PaymentStatus::Pending,
            payment: None,
            settlement: None,
            settled: false,
            stock_deducted: Money::ZERO,
        }
    }

    /// Sales not yet captured by any settlement count towards the running totals.
    pub fn is_open(&self) -> bool {
        self.settlement.is_none()
    }

    /// What the client still owes on this sale.
    pub fn receivable(&self) -> Money {
        match (&self.payment_status, &self.payment) {
            (PaymentStatus::Paid, _) => Money::ZERO,
            (_, Some(payment)) if payment.plan.is_some() => payment.outstanding(),
            _ => self.price,
        }
    }
}
