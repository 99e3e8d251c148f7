//! Application layer: the commission engine, the installment reconciler and
//! the `LedgerService` that applies journal commands through the store ports.

pub mod commission;
pub mod ledger;
pub mod reconciler;
