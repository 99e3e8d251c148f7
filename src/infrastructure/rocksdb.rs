use crate::domain::ports::{ResellerStore, SaleStore, SettlementStore};
use crate::domain::reseller::ResellerAccount;
use crate::domain::sale::Sale;
use crate::domain::settlement::Settlement;
use crate::domain::tier::CommissionTier;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for reseller accounts, keyed by reseller id.
pub const CF_RESELLERS: &str = "resellers";
/// Column Family for sales, keyed by sale id.
pub const CF_SALES: &str = "sales";
/// Column Family for settlements, keyed by reseller id then settlement number.
pub const CF_SETTLEMENTS: &str = "settlements";
/// Column Family for ledger-wide settings such as the default tiers.
pub const CF_CONFIG: &str = "config";

const DEFAULT_TIERS_KEY: &[u8] = b"default_tiers";

/// A persistent store implementation using RocksDB.
///
/// One database backs all three ports, each record kind in its own Column
/// Family. Values are JSON; integer keys are big-endian so iteration order
/// matches numeric order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path`, creating any missing
    /// column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_RESELLERS, CF_SALES, CF_SETTLEMENTS, CF_CONFIG]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LedgerError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.handle(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Decodes every value in `cf` whose key starts with `prefix`.
    fn scan<T: DeserializeOwned>(&self, cf: &str, prefix: &[u8]) -> Result<Vec<T>> {
        let iter = self
            .db
            .iterator_cf(self.handle(cf)?, IteratorMode::From(prefix, Direction::Forward));

        let mut values = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                LedgerError::InternalError(Box::new(std::io::Error::other(format!(
                    "RocksDB iteration error: {e}"
                ))))
            })?;
            if !key.starts_with(prefix) {
                break;
            }
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

fn settlement_key(reseller: u32, number: u32) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&reseller.to_be_bytes());
    key[4..].copy_from_slice(&number.to_be_bytes());
    key
}

#[async_trait]
impl ResellerStore for RocksDBStore {
    async fn store(&self, account: ResellerAccount) -> Result<()> {
        let value = serde_json::to_vec(&account)?;
        self.db
            .put_cf(self.handle(CF_RESELLERS)?, account.reseller.to_be_bytes(), value)?;
        Ok(())
    }

    async fn get(&self, reseller: u32) -> Result<Option<ResellerAccount>> {
        self.read(CF_RESELLERS, &reseller.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<ResellerAccount>> {
        self.scan(CF_RESELLERS, &[])
    }

    async fn default_tiers(&self) -> Result<Vec<CommissionTier>> {
        Ok(self.read(CF_CONFIG, DEFAULT_TIERS_KEY)?.unwrap_or_default())
    }

    async fn set_default_tiers(&self, tiers: Vec<CommissionTier>) -> Result<()> {
        let value = serde_json::to_vec(&tiers)?;
        self.db
            .put_cf(self.handle(CF_CONFIG)?, DEFAULT_TIERS_KEY, value)?;
        Ok(())
    }
}

#[async_trait]
impl SaleStore for RocksDBStore {
    async fn store(&self, sale: Sale) -> Result<()> {
        let value = serde_json::to_vec(&sale)?;
        self.db
            .put_cf(self.handle(CF_SALES)?, sale.id.to_be_bytes(), value)?;
        Ok(())
    }

    async fn get(&self, sale_id: u32) -> Result<Option<Sale>> {
        self.read(CF_SALES, &sale_id.to_be_bytes())
    }

    async fn exists(&self, sale_id: u32) -> Result<bool> {
        let result = self
            .db
            .get_pinned_cf(self.handle(CF_SALES)?, sale_id.to_be_bytes())?;
        Ok(result.is_some())
    }

    async fn remove(&self, sale_id: u32) -> Result<()> {
        self.db
            .delete_cf(self.handle(CF_SALES)?, sale_id.to_be_bytes())?;
        Ok(())
    }

    async fn for_reseller(&self, reseller: u32) -> Result<Vec<Sale>> {
        // Sales are keyed by id, so this is a full scan.
        let sales: Vec<Sale> = self.scan(CF_SALES, &[])?;
        Ok(sales.into_iter().filter(|s| s.reseller == reseller).collect())
    }
}

#[async_trait]
impl SettlementStore for RocksDBStore {
    async fn store(&self, settlement: Settlement) -> Result<()> {
        let value = serde_json::to_vec(&settlement)?;
        let key = settlement_key(settlement.reseller, settlement.number);
        self.db.put_cf(self.handle(CF_SETTLEMENTS)?, key, value)?;
        Ok(())
    }

    async fn get(&self, reseller: u32, number: u32) -> Result<Option<Settlement>> {
        self.read(CF_SETTLEMENTS, &settlement_key(reseller, number))
    }

    async fn for_reseller(&self, reseller: u32) -> Result<Vec<Settlement>> {
        self.scan(CF_SETTLEMENTS, &reseller.to_be_bytes())
    }
}
