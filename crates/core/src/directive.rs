use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::account::Account;
use super::amount::Amount;

/// Provenance of a directive: the file it came from and, when known, the
/// 1-based line it was read from. `entries` holds extra key/value metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub filename: String,
    pub lineno: Option<usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entries: BTreeMap<String, String>,
}

impl Meta {
    pub fn new(filename: impl Into<String>, lineno: usize) -> Self {
        Meta {
            filename: filename.into(),
            lineno: Some(lineno),
            entries: BTreeMap::new(),
        }
    }

    /// Metadata for a directive that has no source line.
    pub fn unanchored(filename: impl Into<String>) -> Self {
        Meta {
            filename: filename.into(),
            lineno: None,
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    #[default]
    Cleared,
    Pending,
}

impl Flag {
    pub fn as_char(self) -> char {
        match self {
            Flag::Cleared => '*',
            Flag::Pending => '!',
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One leg of a transaction. `units: None` leaves the amount to be inferred
/// by the ledger when it balances the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub account: Account,
    pub units: Option<Amount>,
}

impl Posting {
    pub fn new(account: Account, units: Option<Amount>) -> Self {
        Posting { account, units }
    }

    pub fn with_units(account: Account, units: Amount) -> Self {
        Posting {
            account,
            units: Some(units),
        }
    }

    pub fn auto(account: Account) -> Self {
        Posting {
            account,
            units: None,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.units.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub meta: Meta,
    pub date: NaiveDate,
    pub flag: Flag,
    pub payee: Option<String>,
    pub narration: Option<String>,
    pub tags: BTreeSet<String>,
    pub links: BTreeSet<String>,
    pub postings: Vec<Posting>,
}

impl Transaction {
    pub fn primary_posting(&self) -> Option<&Posting> {
        self.postings.first()
    }

    pub fn posting_for(&self, account: &Account) -> Option<&Posting> {
        self.postings.iter().find(|p| &p.account == account)
    }
}

/// Asserts the balance of `account` at the beginning of `date`.
///
/// `date` and `amount` are `None` when the source did not provide a closing
/// balance; such an assertion is incomplete and cannot be checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub meta: Meta,
    pub date: Option<NaiveDate>,
    pub account: Account,
    pub amount: Option<Amount>,
}

impl Balance {
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.amount.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    Transaction(Transaction),
    Balance(Balance),
}

impl Directive {
    pub fn meta(&self) -> &Meta {
        match self {
            Directive::Transaction(tx) => &tx.meta,
            Directive::Balance(balance) => &balance.meta,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Directive::Transaction(tx) => Some(tx.date),
            Directive::Balance(balance) => balance.date,
        }
    }

    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Directive::Transaction(tx) => Some(tx),
            Directive::Balance(_) => None,
        }
    }

    pub fn as_balance(&self) -> Option<&Balance> {
        match self {
            Directive::Balance(balance) => Some(balance),
            Directive::Transaction(_) => None,
        }
    }
}

impl From<Transaction> for Directive {
    fn from(tx: Transaction) -> Self {
        Directive::Transaction(tx)
    }
}

impl From<Balance> for Directive {
    fn from(balance: Balance) -> Self {
        Directive::Balance(balance)
    }
}
