use super::reseller::ResellerAccount;
use super::sale::Sale;
use super::settlement::Settlement;
use super::tier::CommissionTier;
use crate::error::Result;
use async_trait::async_trait;

/// Reseller accounts plus the global default tier set.
#[async_trait]
pub trait ResellerStore: Send + Sync {
    async fn store(&self, account: ResellerAccount) -> Result<()>;
    async fn get(&self, reseller: u32) -> Result<Option<ResellerAccount>>;
    async fn get_all(&self) -> Result<Vec<ResellerAccount>>;
    async fn default_tiers(&self) -> Result<Vec<CommissionTier>>;
    async fn set_default_tiers(&self, tiers: Vec<CommissionTier>) -> Result<()>;
}

#[async_trait]
pub trait SaleStore: Send + Sync {
    async fn store(&self, sale: Sale) -> Result<()>;
    async fn get(&self, sale_id: u32) -> Result<Option<Sale>>;
    async fn exists(&self, sale_id: u32) -> Result<bool>;
    async fn remove(&self, sale_id: u32) -> Result<()>;
    async fn for_reseller(&self, reseller: u32) -> Result<Vec<Sale>>;
}

#[async_trait]
pub trait SettlementStore: Send + Sync {
    async fn store(&self, settlement: Settlement) -> Result<()>;
    async fn get(&self, reseller: u32, number: u32) -> Result<Option<Settlement>>;
    /// All settlements of a reseller, ordered by number.
    async fn for_reseller(&self, reseller: u32) -> Result<Vec<Settlement>>;
}

pub type ResellerStoreBox = Box<dyn ResellerStore>;
pub type SaleStoreBox = Box<dyn SaleStore>;
pub type SettlementStoreBox = Box<dyn SettlementStore>;
