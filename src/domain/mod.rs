//! Typed records of the reseller ledger and the storage ports that hold them.

pub mod command;
pub mod installment;
pub mod money;
pub mod ports;
pub mod reseller;
pub mod sale;
pub mod settlement;
pub mod tier;
