use crate::application::commission::{
    GoalProgress, goal_achievement, goal_exceeds_potential, goal_progress, total_commission,
};
use crate::application::reconciler::{self, Mark};
use crate::domain::command::{Command, CommandType};
use crate::domain::money::Money;
use crate::domain::ports::{ResellerStoreBox, SaleStoreBox, SettlementStoreBox};
use crate::domain::reseller::ResellerAccount;
use crate::domain::sale::{Payment, PaymentMethod, PaymentStatus, Sale};
use crate::domain::settlement::{Settlement, SettlementStatus};
use crate::domain::tier::CommissionTier;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Figures reported for one reseller.
#[derive(Debug, Clone, PartialEq)]
pub struct ResellerSummary {
    pub reseller: u32,
    pub open_sales: usize,
    pub progress: GoalProgress,
    pub amount_due: Money,
    pub receivable: Money,
    pub pending_settlements: usize,
}

/// The application shell around the commission engine and the reconciler.
///
/// Every operation reads the records it needs, computes, and writes the
/// results back before returning, so each one is a single read-modify-write
/// against the stores.
pub struct LedgerService {
    resellers: ResellerStoreBox,
    sales: SaleStoreBox,
    settlements: SettlementStoreBox,
}

impl LedgerService {
    /// Creates a new `LedgerService` over the given stores.
    pub fn new(
        resellers: ResellerStoreBox,
        sales: SaleStoreBox,
        settlements: SettlementStoreBox,
    ) -> Self {
        Self {
            resellers,
            sales,
            settlements,
        }
    }

    /// Applies one journal command. `at` defaults to the current time.
    pub async fn process_command(&self, cmd: Command) -> Result<()> {
        let now = cmd.at.unwrap_or_else(Utc::now);
        let reseller = cmd.reseller;

        match cmd.r#type {
            CommandType::Reseller => {
                self.register_reseller(reseller, cmd.client).await?;
            }
            CommandType::Defaults => {
                self.apply_defaults_to_all().await?;
            }
            CommandType::Goal => {
                let amount = require(cmd.amount, "amount", cmd.r#type)?;
                self.set_goal(reseller, amount, cmd.at).await?;
            }
            CommandType::Allot => {
                let count = require(cmd.count, "count", cmd.r#type)?;
                self.allot(reseller, count, cmd.amount.unwrap_or(Money::ZERO))
                    .await?;
            }
            CommandType::Sale => {
                let sale = require(cmd.sale, "sale", cmd.r#type)?;
                let price = require(cmd.amount, "amount", cmd.r#type)?;
                self.record_sale(reseller, sale, price, cmd.client, now)
                    .await?;
            }
            CommandType::Reassign => {
                let sale = require(cmd.sale, "sale", cmd.r#type)?;
                let client = require(cmd.client, "client", cmd.r#type)?;
                self.reassign_client(reseller, sale, client).await?;
            }
            CommandType::Cancel => {
                let sale = require(cmd.sale, "sale", cmd.r#type)?;
                self.cancel_sale(reseller, sale).await?;
            }
            CommandType::Pay => {
                let sale = require(cmd.sale, "sale", cmd.r#type)?;
                self.register_payment(
                    reseller,
                    sale,
                    cmd.method.unwrap_or_default(),
                    cmd.count,
                    now,
                )
                .await?;
            }
            CommandType::Unpay => {
                let sale = require(cmd.sale, "sale", cmd.r#type)?;
                self.delete_payment(reseller, sale).await?;
            }
            CommandType::Mark => {
                let sale = require(cmd.sale, "sale", cmd.r#type)?;
                let index = require(cmd.index, "index", cmd.r#type)?;
                let mark = Mark::Paid {
                    at: now,
                    amount: cmd.amount,
                };
                self.mark_installment(reseller, sale, index, mark, now)
                    .await?;
            }
            CommandType::Unmark => {
                let sale = require(cmd.sale, "sale", cmd.r#type)?;
                let index = require(cmd.index, "index", cmd.r#type)?;
                self.mark_installment(reseller, sale, index, Mark::Pending, now)
                    .await?;
            }
            CommandType::Settle => {
                self.request_settlement(reseller, now).await?;
            }
            CommandType::Complete => {
                self.complete_settlement(reseller, None, now).await?;
            }
        }

        Ok(())
    }

    /// Replaces the global default tier set, optionally copying it to every reseller.
    pub async fn set_default_tiers(
        &self,
        tiers: Vec<CommissionTier>,
        apply_to_all: bool,
    ) -> Result<()> {
        info!(tiers = tiers.len(), apply_to_all, "Setting default commission tiers");
        self.resellers.set_default_tiers(tiers).await?;
        if apply_to_all {
            self.apply_defaults_to_all().await?;
        }
        Ok(())
    }

    /// Copies the global default tiers onto every known reseller.
    pub async fn apply_defaults_to_all(&self) -> Result<usize> {
        let defaults = self.resellers.default_tiers().await?;
        let accounts = self.resellers.get_all().await?;
        let count = accounts.len();

        for mut account in accounts {
            account.tiers = defaults.clone();
            self.resellers.store(account).await?;
        }

        info!(resellers = count, "Applied default tiers to all resellers");
        Ok(count)
    }

    /// Registers a reseller with a copy of the default tiers. An existing
    /// reseller only has its name updated.
    pub async fn register_reseller(
        &self,
        reseller: u32,
        name: Option<String>,
    ) -> Result<ResellerAccount> {
        let mut account = match self.resellers.get(reseller).await? {
            Some(existing) => existing,
            None => {
                info!(reseller, "Registering reseller");
                ResellerAccount::new(reseller, self.resellers.default_tiers().await?)
            }
        };
        if name.is_some() {
            account.name = name;
        }
        self.resellers.store(account.clone()).await?;
        Ok(account)
    }

    /// Sets the commission goal for the current period.
    ///
    /// Returns `true` when the goal is larger than what the reseller's unsold
    /// stock could earn; the goal is stored either way.
    pub async fn set_goal(
        &self,
        reseller: u32,
        amount: Money,
        settlement_date: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let amount = amount.non_negative("Goal")?;
        let mut account = self.account(reseller).await?;

        let exceeds = goal_exceeds_potential(amount, account.stock_value, &account.tiers);
        if exceeds {
            warn!(reseller, goal = %amount, stock = %account.stock_value, "Goal exceeds the commission available from current stock");
        }

        account.goal_amount = amount;
        account.settlement_date = settlement_date;
        self.resellers.store(account).await?;
        Ok(exceeds)
    }

    /// Records items handed to the reseller, with their total sale value.
    pub async fn allot(&self, reseller: u32, items: u32, value: Money) -> Result<()> {
        let value = value.non_negative("Allotment value")?;
        let mut account = self.account(reseller).await?;
        account.items_received = account.items_received.saturating_add(items);
        account.stock_value += value;
        debug!(reseller, items, value = %value, "Stock allotted");
        self.resellers.store(account).await
    }

    pub async fn record_sale(
        &self,
        reseller: u32,
        sale_id: u32,
        price: Money,
        client: Option<String>,
        sold_at: DateTime<Utc>,
    ) -> Result<Sale> {
        let price = price.non_negative("Sale price")?;
        if self.sales.exists(sale_id).await? {
            return Err(LedgerError::DuplicateSale(sale_id));
        }

        let mut account = self.account(reseller).await?;
        let deducted = price.min(account.stock_value);
        account.stock_value -= deducted;
        self.resellers.store(account).await?;

        let mut sale = Sale::new(sale_id, reseller, price);
        sale.client = client;
        sale.sold_at = Some(sold_at);
        sale.stock_deducted = deducted;
        self.sales.store(sale.clone()).await?;

        info!(reseller, sale = sale_id, price = %price, "Sale recorded");
        Ok(sale)
    }

    pub async fn reassign_client(&self, reseller: u32, sale_id: u32, client: String) -> Result<()> {
        let mut sale = self.sale(reseller, sale_id).await?;
        debug!(sale = sale_id, client = %client, "Reassigning client");
        sale.client = Some(client);
        self.sales.store(sale).await
    }

    /// Removes a sale and its payment. Sales already captured by a
    /// settlement cannot be cancelled.
    pub async fn cancel_sale(&self, reseller: u32, sale_id: u32) -> Result<()> {
        let sale = self.sale(reseller, sale_id).await?;
        if !sale.is_open() {
            return Err(LedgerError::InvalidTransition(format!(
                "sale {sale_id} belongs to a settlement and cannot be cancelled"
            )));
        }

        let mut account = self.account(reseller).await?;
        account.stock_value += sale.stock_deducted;
        self.resellers.store(account).await?;

        self.sales.remove(sale_id).await?;
        info!(reseller, sale = sale_id, "Sale cancelled");
        Ok(())
    }

    /// Registers how a sale is paid. Two or more installments create a
    /// plan; anything else is a payment in full.
    pub async fn register_payment(
        &self,
        reseller: u32,
        sale_id: u32,
        method: PaymentMethod,
        installments: Option<u32>,
        at: DateTime<Utc>,
    ) -> Result<Sale> {
        let mut sale = self.sale(reseller, sale_id).await?;
        if sale.payment.is_some() {
            return Err(LedgerError::PaymentAlreadyRegistered(sale_id));
        }

        match installments {
            Some(count) if count >= 2 => {
                let (plan, entries) = reconciler::generate_installments(sale.price, count as usize)?;
                sale.payment = Some(Payment::in_installments(method, plan, entries, at));
                sale.payment_status = PaymentStatus::Installment;
            }
            _ => {
                sale.payment = Some(Payment::in_full(method, at));
                sale.payment_status = PaymentStatus::Paid;
            }
        }

        info!(sale = sale_id, status = ?sale.payment_status, "Payment registered");
        self.sales.store(sale.clone()).await?;
        Ok(sale)
    }

    /// Deletes a sale's payment; the sale goes back to pending.
    pub async fn delete_payment(&self, reseller: u32, sale_id: u32) -> Result<()> {
        let mut sale = self.sale(reseller, sale_id).await?;
        if sale.payment.take().is_none() {
            return Err(LedgerError::NoPayment(sale_id));
        }
        sale.payment_status = PaymentStatus::Pending;
        info!(sale = sale_id, "Payment deleted");
        self.sales.store(sale).await
    }

    /// Marks one installment and persists the rebalanced schedule.
    pub async fn mark_installment(
        &self,
        reseller: u32,
        sale_id: u32,
        index: usize,
        mark: Mark,
        now: DateTime<Utc>,
    ) -> Result<Sale> {
        let mut sale = self.sale(reseller, sale_id).await?;
        let payment = sale
            .payment
            .as_mut()
            .ok_or(LedgerError::NoPayment(sale_id))?;
        let plan = payment.plan.ok_or_else(|| {
            LedgerError::InvalidScheduleState(format!("sale {sale_id} was paid in full"))
        })?;
        payment.normalize();

        let result = reconciler::mark_installment(&payment.installments, &plan, index, mark, now)?;
        payment.installments = result.entries;
        sale.payment_status = result.payment_status;

        info!(
            sale = sale_id,
            index,
            installments = payment.installments.len(),
            status = ?sale.payment_status,
            "Installment marked"
        );
        self.sales.store(sale.clone()).await?;
        Ok(sale)
    }

    /// Snapshots the reseller's open sales into a pending settlement.
    ///
    /// Captured sales leave the running totals immediately, and the items and
    /// stock value received since the previous request move onto the
    /// settlement, so consecutive settlements never count them twice.
    pub async fn request_settlement(&self, reseller: u32, at: DateTime<Utc>) -> Result<Settlement> {
        let mut account = self.account(reseller).await?;
        let open: Vec<Sale> = self
            .sales
            .for_reseller(reseller)
            .await?
            .into_iter()
            .filter(Sale::is_open)
            .collect();

        if open.is_empty() && account.items_received == 0 && !account.stock_value.is_positive() {
            return Err(LedgerError::ValidationError(format!(
                "reseller {reseller} has nothing to settle"
            )));
        }

        let number = self
            .settlements
            .for_reseller(reseller)
            .await?
            .iter()
            .map(|s| s.number)
            .max()
            .unwrap_or(0)
            + 1;

        let total_sold: Money = open.iter().map(|s| s.price).sum();
        let total_commission = total_commission(total_sold, &account.tiers);
        let items_sold = open.len() as u32;
        let (items_received, stock_returned) = account.take_stock();

        let settlement = Settlement {
            reseller,
            number,
            status: SettlementStatus::Pending,
            total_sold,
            total_commission,
            amount_due: total_sold - total_commission,
            items_received,
            items_sold,
            items_to_return: items_received.saturating_sub(items_sold),
            stock_returned,
            goal_amount: account.goal_amount,
            goal_achievement: goal_achievement(total_commission, account.goal_amount),
            sale_ids: open.iter().map(|s| s.id).collect(),
            created_at: at,
            finalized_at: None,
        };
        self.settlements.store(settlement.clone()).await?;
        self.resellers.store(account).await?;

        for mut sale in open {
            sale.settlement = Some(number);
            self.sales.store(sale).await?;
        }

        info!(
            reseller,
            number,
            total_sold = %settlement.total_sold,
            commission = %settlement.total_commission,
            "Settlement requested"
        );
        Ok(settlement)
    }

    /// Completes a pending settlement, the oldest one when `number` is `None`,
    /// and closes the reseller's goal period.
    pub async fn complete_settlement(
        &self,
        reseller: u32,
        number: Option<u32>,
        at: DateTime<Utc>,
    ) -> Result<Settlement> {
        let mut settlement = match number {
            Some(number) => self
                .settlements
                .get(reseller, number)
                .await?
                .ok_or(LedgerError::SettlementNotFound { reseller, number })?,
            None => self
                .settlements
                .for_reseller(reseller)
                .await?
                .into_iter()
                .find(Settlement::is_pending)
                .ok_or_else(|| {
                    LedgerError::InvalidTransition(format!(
                        "reseller {reseller} has no pending settlement"
                    ))
                })?,
        };

        settlement.complete(at)?;

        for sale_id in &settlement.sale_ids {
            if let Some(mut sale) = self.sales.get(*sale_id).await? {
                sale.settled = true;
                self.sales.store(sale).await?;
            } else {
                warn!(reseller, sale = sale_id, "Settled sale no longer exists");
            }
        }

        let mut account = self.account(reseller).await?;
        account.close_period();
        self.resellers.store(account).await?;
        self.settlements.store(settlement.clone()).await?;

        info!(reseller, number = settlement.number, amount_due = %settlement.amount_due, "Settlement completed");
        Ok(settlement)
    }

    /// Completed settlements, most recently finalized first.
    pub async fn settlement_history(&self, reseller: u32) -> Result<Vec<Settlement>> {
        let mut completed: Vec<Settlement> = self
            .settlements
            .for_reseller(reseller)
            .await?
            .into_iter()
            .filter(|s| s.status == SettlementStatus::Completed)
            .collect();
        completed.sort_by(|a, b| {
            b.finalized_at
                .unwrap_or(b.created_at)
                .cmp(&a.finalized_at.unwrap_or(a.created_at))
        });
        Ok(completed)
    }

    pub async fn summary(&self, reseller: u32) -> Result<ResellerSummary> {
        let account = self
            .resellers
            .get(reseller)
            .await?
            .ok_or(LedgerError::ResellerNotFound(reseller))?;
        self.summarize(account).await
    }

    /// Summaries of every reseller, ordered by id.
    pub async fn summaries(&self) -> Result<Vec<ResellerSummary>> {
        let mut accounts = self.resellers.get_all().await?;
        accounts.sort_by_key(|a| a.reseller);

        let mut summaries = Vec::with_capacity(accounts.len());
        for account in accounts {
            summaries.push(self.summarize(account).await?);
        }
        Ok(summaries)
    }

    /// Consumes the service and returns the final summary of every reseller.
    pub async fn into_results(self) -> Result<Vec<ResellerSummary>> {
        self.summaries().await
    }

    async fn summarize(&self, account: ResellerAccount) -> Result<ResellerSummary> {
        let sales = self.sales.for_reseller(account.reseller).await?;
        let open: Vec<&Sale> = sales.iter().filter(|s| s.is_open()).collect();
        let total_sold: Money = open.iter().map(|s| s.price).sum();
        let progress = goal_progress(total_sold, account.goal_amount, &account.tiers);
        let pending_settlements = self
            .settlements
            .for_reseller(account.reseller)
            .await?
            .iter()
            .filter(|s| s.is_pending())
            .count();

        Ok(ResellerSummary {
            reseller: account.reseller,
            open_sales: open.len(),
            amount_due: total_sold - progress.commission,
            receivable: sales.iter().map(Sale::receivable).sum(),
            progress,
            pending_settlements,
        })
    }

    /// Loads a reseller, registering it with the default tiers on first use.
    async fn account(&self, reseller: u32) -> Result<ResellerAccount> {
        match self.resellers.get(reseller).await? {
            Some(account) => Ok(account),
            None => {
                debug!(reseller, "Unknown reseller, creating with default tiers");
                Ok(ResellerAccount::new(
                    reseller,
                    self.resellers.default_tiers().await?,
                ))
            }
        }
    }

    /// Loads a sale owned by `reseller`.
    async fn sale(&self, reseller: u32, sale_id: u32) -> Result<Sale> {
        match self.sales.get(sale_id).await? {
            Some(sale) if sale.reseller == reseller => Ok(sale),
            _ => Err(LedgerError::SaleNotFound(sale_id)),
        }
    }
}

fn require<T>(value: Option<T>, field: &str, kind: CommandType) -> Result<T> {
    value.ok_or_else(|| {
        LedgerError::ValidationError(format!("{kind:?} command requires '{field}'"))
    })
}
