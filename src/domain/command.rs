use super::money::Money;
use super::sale::PaymentMethod;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Reseller,
    Defaults,
    Goal,
    Allot,
    Sale,
    Reassign,
    Cancel,
    Pay,
    Unpay,
    Mark,
    Unmark,
    Settle,
    Complete,
}

/// One line of the command journal.
///
/// Which optional columns a command needs depends on its type; the ledger
/// service rejects commands missing a required column.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub r#type: CommandType,
    pub reseller: u32,
    #[serde(default)]
    pub sale: Option<u32>,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

impl Command {
    pub fn new(r#type: CommandType, reseller: u32) -> Self {
        Self {
            r#type,
            reseller,
            sale: None,
            index: None,
            amount: None,
            count: None,
            client: None,
            method: None,
            at: None,
        }
    }

    pub fn sale(mut self, sale: u32) -> Self {
        self.sale = Some(sale);
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn client(mut self, client: &str) -> Self {
        self.client = Some(client.to_string());
        self
    }

    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = Some(at);
        self
    }
}
