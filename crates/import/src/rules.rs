use kontor_core::Account;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::util::similarity;

/// Maps an extracted payee to the account of a transaction's second posting.
///
/// Lookups are read-only, so one implementation can serve parallel imports.
pub trait AccountLookup: Send + Sync {
    fn account_for(&self, payee: &str) -> Option<&Account>;
}

/// Exact payee → account table.
impl AccountLookup for HashMap<String, Account> {
    fn account_for(&self, payee: &str) -> Option<&Account> {
        self.get(payee)
    }
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Invalid regex in payee rule '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Unknown match type: '{0}'")]
    UnknownMatchType(String),
    #[error("Invalid fuzzy threshold: '{0}'")]
    InvalidThreshold(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayeeRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub pattern: String,
    #[serde(default)]
    pub match_type: MatchType,
    pub account: Account,
}

impl PayeeRule {
    pub fn new(pattern: impl Into<String>, match_type: MatchType, account: Account) -> Self {
        PayeeRule {
            name: None,
            priority: 0,
            pattern: pattern.into(),
            match_type,
            account,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MatchType {
    #[default]
    Contains,
    Exact,
    Regex,
    Fuzzy {
        threshold: f32,
    },
}

impl std::str::FromStr for MatchType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contains" => Ok(MatchType::Contains),
            "exact" => Ok(MatchType::Exact),
            "regex" => Ok(MatchType::Regex),
            s if s.starts_with("fuzzy:") => {
                let threshold = s[6..]
                    .parse::<f32>()
                    .ok()
                    .filter(|t| (0.0..=1.0).contains(t))
                    .ok_or_else(|| RuleError::InvalidThreshold(s[6..].to_string()))?;
                Ok(MatchType::Fuzzy { threshold })
            }
            other => Err(RuleError::UnknownMatchType(other.to_string())),
        }
    }
}

impl TryFrom<String> for MatchType {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MatchType> for String {
    fn from(match_type: MatchType) -> Self {
        match_type.to_string()
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::Contains => write!(f, "contains"),
            MatchType::Exact => write!(f, "exact"),
            MatchType::Regex => write!(f, "regex"),
            MatchType::Fuzzy { threshold } => write!(f, "fuzzy:{threshold}"),
        }
    }
}

/// Internal pairing of a rule with its precompiled regex (if applicable).
struct CompiledRule {
    rule: PayeeRule,
    compiled_regex: Option<regex::Regex>,
}

/// Ordered payee rules. Higher priority is tried first; rules of equal
/// priority keep their configured order. The first match wins.
pub struct PayeeRuleEngine {
    rules: Vec<CompiledRule>,
}

impl PayeeRuleEngine {
    pub fn new(rules: Vec<PayeeRule>) -> Result<Self, RuleError> {
        let mut compiled = rules
            .into_iter()
            .map(|rule| -> Result<CompiledRule, RuleError> {
                let compiled_regex = match rule.match_type {
                    MatchType::Regex => Some(regex::Regex::new(&rule.pattern).map_err(|source| {
                        RuleError::InvalidRegex {
                            pattern: rule.pattern.clone(),
                            source,
                        }
                    })?),
                    _ => None,
                };
                Ok(CompiledRule { rule, compiled_regex })
            })
            .collect::<Result<Vec<_>, _>>()?;
        // Stable sort: equal priorities stay in configured order.
        compiled.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));
        Ok(Self { rules: compiled })
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn find_matching_rule(&self, payee: &str) -> Option<&PayeeRule> {
        self.rules
            .iter()
            .find(|cr| rule_matches(cr, payee))
            .map(|cr| &cr.rule)
    }
}

impl AccountLookup for PayeeRuleEngine {
    fn account_for(&self, payee: &str) -> Option<&Account> {
        self.find_matching_rule(payee).map(|rule| &rule.account)
    }
}

fn rule_matches(cr: &CompiledRule, payee: &str) -> bool {
    let rule = &cr.rule;
    let text = payee.to_lowercase();
    let pattern = rule.pattern.to_lowercase();

    match &rule.match_type {
        MatchType::Contains => text.contains(&pattern),
        MatchType::Exact => text == pattern,
        MatchType::Regex => cr
            .compiled_regex
            .as_ref()
            .is_some_and(|re| re.is_match(payee)),
        MatchType::Fuzzy { threshold } => similarity(&text, &pattern) >= *threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str) -> Account {
        Account::new(name).unwrap()
    }

    fn make_rule(pattern: &str, match_type: MatchType, target: &str, priority: i32) -> PayeeRule {
        PayeeRule {
            priority,
            ..PayeeRule::new(pattern, match_type, account(target))
        }
    }

    fn engine(rules: Vec<PayeeRule>) -> PayeeRuleEngine {
        PayeeRuleEngine::new(rules).unwrap()
    }

    #[test]
    fn contains_match_case_insensitive() {
        let e = engine(vec![make_rule("paypal", MatchType::Contains, "Expenses:Online", 0)]);
        assert_eq!(
            e.account_for("PayPal Europe S.a.r.l. et Cie S.C.A").map(Account::as_str),
            Some("Expenses:Online")
        );
        assert!(e.account_for("Max Mustermann").is_none());
    }

    #[test]
    fn exact_match() {
        let e = engine(vec![make_rule("max mustermann", MatchType::Exact, "Assets:Savings", 0)]);
        assert!(e.account_for("Max Mustermann").is_some());
        assert!(e.account_for("Max Mustermann GmbH").is_none());
    }

    #[test]
    fn regex_match_uses_original_case() {
        let e = engine(vec![make_rule(r"^BARGELD", MatchType::Regex, "Assets:Cash", 0)]);
        assert!(e.account_for("BARGELDEINZAHLUNG KARTE 0").is_some());
        assert!(e.account_for("bargeldeinzahlung").is_none());
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let result = PayeeRuleEngine::new(vec![make_rule("(unclosed", MatchType::Regex, "Assets:Cash", 0)]);
        assert!(matches!(result, Err(RuleError::InvalidRegex { pattern, .. }) if pattern == "(unclosed"));
    }

    #[test]
    fn fuzzy_match_similar_strings() {
        let e = engine(vec![make_rule(
            "max mustermann",
            MatchType::Fuzzy { threshold: 0.85 },
            "Assets:Savings",
            0,
        )]);
        assert!(e.account_for("Max Musterman").is_some());
        assert!(e.account_for("Erika Musterfrau").is_none());
    }

    #[test]
    fn first_configured_rule_wins_on_equal_priority() {
        let e = engine(vec![
            make_rule("max", MatchType::Contains, "Assets:Savings", 0),
            make_rule("mustermann", MatchType::Contains, "Income:Family", 0),
        ]);
        assert_eq!(
            e.account_for("Max Mustermann").map(Account::as_str),
            Some("Assets:Savings")
        );
    }

    #[test]
    fn priority_ordering_highest_wins() {
        let e = engine(vec![
            make_rule("max", MatchType::Contains, "Assets:Savings", 1),
            make_rule("mustermann", MatchType::Contains, "Income:Family", 10),
        ]);
        let rule = e.find_matching_rule("Max Mustermann").unwrap();
        assert_eq!(rule.account.as_str(), "Income:Family");
    }

    #[test]
    fn empty_engine_never_matches() {
        let e = PayeeRuleEngine::empty();
        assert!(e.is_empty());
        assert_eq!(e.len(), 0);
        assert!(e.account_for("anything").is_none());
    }

    #[test]
    fn hash_map_lookup_is_exact() {
        let mut table = HashMap::new();
        table.insert("Max Mustermann".to_string(), account("Assets:Savings"));
        assert!(table.account_for("Max Mustermann").is_some());
        assert!(table.account_for("max mustermann").is_none());
    }

    #[test]
    fn match_type_from_str() {
        assert_eq!("Contains".parse::<MatchType>().unwrap(), MatchType::Contains);
        assert_eq!("regex".parse::<MatchType>().unwrap(), MatchType::Regex);
        assert_eq!(
            "fuzzy:0.8".parse::<MatchType>().unwrap(),
            MatchType::Fuzzy { threshold: 0.8 }
        );
        assert!(matches!("fuzzy:2".parse::<MatchType>(), Err(RuleError::InvalidThreshold(_))));
        assert!(matches!("glob".parse::<MatchType>(), Err(RuleError::UnknownMatchType(_))));
    }

    #[test]
    fn match_type_display_round_trips() {
        for mt in [
            MatchType::Contains,
            MatchType::Exact,
            MatchType::Regex,
            MatchType::Fuzzy { threshold: 0.75 },
        ] {
            assert_eq!(mt.to_string().parse::<MatchType>().unwrap(), mt);
        }
    }
}
