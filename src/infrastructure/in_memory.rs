use crate::domain::ports::{ResellerStore, SaleStore, SettlementStore};
use crate::domain::reseller::ResellerAccount;
use crate::domain::sale::Sale;
use crate::domain::settlement::Settlement;
use crate::domain::tier::CommissionTier;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for reseller accounts and the default tiers.
///
/// Ideal for testing or single runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryResellerStore {
    accounts: Arc<RwLock<HashMap<u32, ResellerAccount>>>,
    defaults: Arc<RwLock<Vec<CommissionTier>>>,
}

impl InMemoryResellerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResellerStore for InMemoryResellerStore {
    async fn store(&self, account: ResellerAccount) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.reseller, account);
        Ok(())
    }

    async fn get(&self, reseller: u32) -> Result<Option<ResellerAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&reseller).cloned())
    }

    async fn get_all(&self) -> Result<Vec<ResellerAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().cloned().collect())
    }

    async fn default_tiers(&self) -> Result<Vec<CommissionTier>> {
        Ok(self.defaults.read().await.clone())
    }

    async fn set_default_tiers(&self, tiers: Vec<CommissionTier>) -> Result<()> {
        *self.defaults.write().await = tiers;
        Ok(())
    }
}

/// A thread-safe in-memory store for sales, keyed by sale id.
#[derive(Default, Clone)]
pub struct InMemorySaleStore {
    sales: Arc<RwLock<HashMap<u32, Sale>>>,
}

impl InMemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaleStore for InMemorySaleStore {
    async fn store(&self, sale: Sale) -> Result<()> {
        let mut sales = self.sales.write().await;
        sales.insert(sale.id, sale);
        Ok(())
    }

    async fn get(&self, sale_id: u32) -> Result<Option<Sale>> {
        let sales = self.sales.read().await;
        Ok(sales.get(&sale_id).cloned())
    }

    async fn exists(&self, sale_id: u32) -> Result<bool> {
        Ok(self.sales.read().await.contains_key(&sale_id))
    }

    async fn remove(&self, sale_id: u32) -> Result<()> {
        self.sales.write().await.remove(&sale_id);
        Ok(())
    }

    async fn for_reseller(&self, reseller: u32) -> Result<Vec<Sale>> {
        let sales = self.sales.read().await;
        let mut owned: Vec<Sale> = sales
            .values()
            .filter(|s| s.reseller == reseller)
            .cloned()
            .collect();
        owned.sort_by_key(|s| s.id);
        Ok(owned)
    }
}

/// A thread-safe in-memory store for settlements.
///
/// Keyed by `(reseller, number)` in a `BTreeMap` so per-reseller listings come
/// out in number order.
#[derive(Default, Clone)]
pub struct InMemorySettlementStore {
    settlements: Arc<RwLock<BTreeMap<(u32, u32), Settlement>>>,
}

impl InMemorySettlementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettlementStore for InMemorySettlementStore {
    async fn store(&self, settlement: Settlement) -> Result<()> {
        let mut settlements = self.settlements.write().await;
        settlements.insert((settlement.reseller, settlement.number), settlement);
        Ok(())
    }

    async fn get(&self, reseller: u32, number: u32) -> Result<Option<Settlement>> {
        let settlements = self.settlements.read().await;
        Ok(settlements.get(&(reseller, number)).cloned())
    }

    async fn for_reseller(&self, reseller: u32) -> Result<Vec<Settlement>> {
        let settlements = self.settlements.read().await;
        Ok(settlements
            .range((reseller, 0)..=(reseller, u32::MAX))
            .map(|(_, s)| s.clone())
            .collect())
    }
}
