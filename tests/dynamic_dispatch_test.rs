use reseller_ledger::domain::money::Money;
use reseller_ledger::domain::ports::{ResellerStoreBox, SaleStoreBox, SettlementStoreBox};
use reseller_ledger::domain::reseller::ResellerAccount;
use reseller_ledger::domain::sale::Sale;
use reseller_ledger::infrastructure::in_memory::{
    InMemoryResellerStore, InMemorySaleStore, InMemorySettlementStore,
};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let reseller_store: ResellerStoreBox = Box::new(InMemoryResellerStore::new());
    let sale_store: SaleStoreBox = Box::new(InMemorySaleStore::new());
    let settlement_store: SettlementStoreBox = Box::new(InMemorySettlementStore::new());

    // Verify Send + Sync by spawning tasks
    let rs_handle = tokio::spawn(async move {
        reseller_store
            .store(ResellerAccount::new(1, Vec::new()))
            .await
            .unwrap();
        reseller_store.get(1).await.unwrap().unwrap()
    });

    let ss_handle = tokio::spawn(async move {
        sale_store
            .store(Sale::new(1, 1, Money::new(dec!(10))))
            .await
            .unwrap();
        sale_store.get(1).await.unwrap().unwrap()
    });

    let st_handle =
        tokio::spawn(async move { settlement_store.for_reseller(1).await.unwrap().len() });

    assert_eq!(rs_handle.await.unwrap().reseller, 1);
    assert_eq!(ss_handle.await.unwrap().price, Money::new(dec!(10)));
    assert_eq!(st_handle.await.unwrap(), 0);
}
