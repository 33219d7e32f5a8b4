use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Assets,
    Liabilities,
    Equity,
    Income,
    Expenses,
}

impl AccountType {
    pub fn from_root(root: &str) -> Option<Self> {
        match root {
            "Assets" => Some(AccountType::Assets),
            "Liabilities" => Some(AccountType::Liabilities),
            "Equity" => Some(AccountType::Equity),
            "Income" => Some(AccountType::Income),
            "Expenses" => Some(AccountType::Expenses),
            _ => None,
        }
    }

    pub fn root(self) -> &'static str {
        match self {
            AccountType::Assets => "Assets",
            AccountType::Liabilities => "Liabilities",
            AccountType::Equity => "Equity",
            AccountType::Income => "Income",
            AccountType::Expenses => "Expenses",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Account name is empty")]
    Empty,
    #[error("Unknown account type '{0}' (expected Assets, Liabilities, Equity, Income or Expenses)")]
    UnknownType(String),
    #[error("Invalid component '{component}' in account '{name}'")]
    InvalidComponent { name: String, component: String },
}

/// A colon-separated ledger account name such as `Assets:Comdirect:Checking`.
///
/// The name is validated on construction, so every `Account` in circulation
/// has a known root type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Account {
    name: String,
    account_type: AccountType,
}

impl Account {
    pub fn new(name: &str) -> Result<Self, AccountError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccountError::Empty);
        }

        let mut components = name.split(':');
        let root = components.next().unwrap_or_default();
        let account_type =
            AccountType::from_root(root).ok_or_else(|| AccountError::UnknownType(root.to_string()))?;

        if let Some(bad) = components.find(|c| !is_valid_component(c)) {
            return Err(AccountError::InvalidComponent {
                name: name.to_string(),
                component: bad.to_string(),
            });
        }

        Ok(Account {
            name: name.to_string(),
            account_type,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    /// The last component, e.g. `Checking` for `Assets:Comdirect:Checking`.
    pub fn leaf(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }
}

fn is_valid_component(component: &str) -> bool {
    let mut chars = component.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() || first.is_ascii_digit() => {
            chars.all(|c| c.is_alphanumeric() || c == '-')
        }
        _ => false,
    }
}

impl FromStr for Account {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Account::new(s)
    }
}

impl TryFrom<String> for Account {
    type Error = AccountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Account::new(&value)
    }
}

impl From<Account> for String {
    fn from(account: Account) -> Self {
        account.name
    }
}

impl AsRef<str> for Account {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
