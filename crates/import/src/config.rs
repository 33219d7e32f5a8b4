use kontor_core::{Account, DEFAULT_CURRENCY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::rules::{PayeeRule, RuleError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid payee rule: {0}")]
    Rule(#[from] RuleError),
}

/// Settings for one imported checking account.
///
/// ```toml
/// account = "Assets:Comdirect:Checking"
/// meta_code = "source_desc"
///
/// [[payee_rule]]
/// pattern = "Max Mustermann"
/// account = "Assets:Savings"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterConfig {
    pub account: Account,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Metadata key under which the raw description is attached.
    #[serde(default)]
    pub meta_code: Option<String>,
    #[serde(default, rename = "payee_rule")]
    pub payee_rules: Vec<PayeeRule>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl ImporterConfig {
    pub fn new(account: Account) -> Self {
        ImporterConfig {
            account,
            currency: default_currency(),
            meta_code: None,
            payee_rules: Vec::new(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_meta_code(mut self, meta_code: impl Into<String>) -> Self {
        self.meta_code = Some(meta_code.into());
        self
    }

    pub fn with_payee_rules(mut self, rules: Vec<PayeeRule>) -> Self {
        self.payee_rules = rules;
        self
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}
