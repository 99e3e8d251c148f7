use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid installment schedule: {0}")]
    InvalidScheduleState(String),
    #[error("Reseller {0} not found")]
    ResellerNotFound(u32),
    #[error("Sale {0} not found")]
    SaleNotFound(u32),
    #[error("Sale {0} already recorded")]
    DuplicateSale(u32),
    #[error("Sale {0} already has a payment")]
    PaymentAlreadyRegistered(u32),
    #[error("Sale {0} has no payment")]
    NoPayment(u32),
    #[error("Settlement {number} of reseller {reseller} not found")]
    SettlementNotFound { reseller: u32, number: u32 },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(e: rocksdb::Error) -> Self {
        LedgerError::InternalError(Box::new(e))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::InternalError(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
