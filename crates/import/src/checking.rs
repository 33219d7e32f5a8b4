//! Comdirect "Girokonto" CSV export → ledger directives.
//!
//! The export is ISO-8859-1 text with `;` separated, quoted fields. A free
//! form preamble of `label;value;` lines precedes the transaction table:
//!
//! ```text
//! "Von:";"01.04.2022";
//! "Bis:";"19.05.2022";
//! "Kontostand vom 19.05.2022:";"11.222,33 EUR";
//!
//! "Buchungstag";"Wertstellung (Valuta)";"Vorgang";"Buchungstext";"Umsatz in EUR";
//! "10.04.2022";"10.04.2022";"Bar";" Buchungstext: ... Ref. ...";"123,45";
//! ```

use chrono::NaiveDate;
use kontor_core::{Account, Amount, Balance, DateRange, Directive, Flag, Meta, Posting, Transaction};
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::{ConfigError, ImporterConfig};
use crate::error::ImportError;
use crate::extractor::{Extractor, RawRow, HEADER};
use crate::locale::{decode_latin1, parse_date_de, parse_decimal_de};
use crate::rules::{AccountLookup, PayeeRuleEngine, RuleError};

const BALANCE_LABEL: &str = "Kontostand vom";
const BALANCE_SUFFIX: &str = " EUR";

/// A preamble value and the 1-based line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub value: String,
    pub line: usize,
}

/// Preamble entries in file order. A repeated label overwrites the earlier
/// value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, MetadataEntry)>,
}

impl Metadata {
    pub fn insert(&mut self, label: &str, entry: MetadataEntry) {
        match self.entries.iter_mut().find(|(l, _)| l.as_str() == label) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((label.to_string(), entry)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&MetadataEntry> {
        self.entries
            .iter()
            .find(|(l, _)| l.as_str() == label)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataEntry)> {
        self.entries.iter().map(|(l, e)| (l.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingBalance {
    pub amount: Amount,
    /// Already shifted to the day after the statement's end-of-day balance.
    pub date: NaiveDate,
    pub line: usize,
}

/// What the preamble tells about the statement. Local to one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImporterState {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub closing_balance: Option<ClosingBalance>,
}

impl ImporterState {
    pub fn from_metadata(metadata: &Metadata, currency: &str) -> Result<Self, ImportError> {
        let mut state = ImporterState::default();
        for (label, entry) in metadata.iter() {
            if let Some((_, handler)) = METADATA_HANDLERS
                .iter()
                .find(|(prefix, _)| label.starts_with(*prefix))
            {
                handler(&mut state, label, entry, currency)?;
            }
        }
        Ok(state)
    }

    /// The reporting period, when both ends were given.
    pub fn period(&self) -> Option<DateRange> {
        DateRange::new(self.date_from?, self.date_to?)
    }
}

type MetadataHandler = fn(&mut ImporterState, &str, &MetadataEntry, &str) -> Result<(), ImportError>;

// Matched by label prefix, first match wins. Other labels are ignored.
const METADATA_HANDLERS: &[(&str, MetadataHandler)] = &[
    ("Von", set_date_from),
    ("Bis", set_date_to),
    (BALANCE_LABEL, set_closing_balance),
];

fn set_date_from(
    state: &mut ImporterState,
    _label: &str,
    entry: &MetadataEntry,
    _currency: &str,
) -> Result<(), ImportError> {
    state.date_from = Some(parse_date_de(&entry.value)?);
    Ok(())
}

fn set_date_to(
    state: &mut ImporterState,
    _label: &str,
    entry: &MetadataEntry,
    _currency: &str,
) -> Result<(), ImportError> {
    state.date_to = Some(parse_date_de(&entry.value)?);
    Ok(())
}

/// `"Kontostand vom 19.05.2022:";"11.222,33 EUR";`
///
/// The export reports the balance at the end of the labelled day; a ledger
/// balance assertion applies at the beginning of its day, hence the +1.
fn set_closing_balance(
    state: &mut ImporterState,
    label: &str,
    entry: &MetadataEntry,
    currency: &str,
) -> Result<(), ImportError> {
    let value = entry.value.trim();
    let number = parse_decimal_de(value.strip_suffix(BALANCE_SUFFIX).unwrap_or(value))?;

    let date_text = label
        .strip_prefix(BALANCE_LABEL)
        .unwrap_or(label)
        .trim()
        .trim_end_matches(':')
        .trim_end();
    let date = parse_date_de(date_text)?
        .succ_opt()
        .ok_or_else(|| ImportError::MalformedDate(date_text.to_string()))?;

    state.closing_balance = Some(ClosingBalance {
        amount: Amount::new(number, currency),
        date,
        line: entry.line,
    });
    Ok(())
}

/// Everything learned from one statement file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    pub metadata: Metadata,
    pub state: ImporterState,
    /// Transactions in file order followed by exactly one balance assertion.
    pub directives: Vec<Directive>,
}

pub struct CheckingImporter<L: AccountLookup = PayeeRuleEngine> {
    config: ImporterConfig,
    lookup: L,
}

impl CheckingImporter<PayeeRuleEngine> {
    /// Builds the importer with the payee rules from `config`.
    pub fn new(config: ImporterConfig) -> Result<Self, RuleError> {
        let lookup = PayeeRuleEngine::new(config.payee_rules.clone())?;
        Ok(Self { config, lookup })
    }

    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let config = ImporterConfig::load(config_path)?;
        Ok(Self::new(config)?)
    }
}

impl<L: AccountLookup> CheckingImporter<L> {
    /// Builds the importer with a caller-supplied payee lookup. The payee
    /// rules in `config` are not used.
    pub fn with_lookup(config: ImporterConfig, lookup: L) -> Self {
        Self { config, lookup }
    }

    pub fn name(&self) -> &'static str {
        "Comdirect CheckingImporter"
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    pub fn file_account(&self) -> &Account {
        &self.config.account
    }

    /// The end of the statement period. Requires a full parse.
    pub fn file_date(&self, path: &Path) -> Result<Option<NaiveDate>, ImportError> {
        Ok(self.parse_file(path)?.state.date_to)
    }

    /// Whether `path` looks like a checking export (contains the table header).
    pub fn identify(&self, path: &Path) -> Result<bool, ImportError> {
        let text = decode_latin1(&std::fs::read(path)?);
        Ok(text.lines().any(|line| line.trim() == HEADER))
    }

    pub fn extract(&self, path: &Path) -> Result<Vec<Directive>, ImportError> {
        Ok(self.parse_file(path)?.directives)
    }

    pub fn extract_bytes(&self, filename: &str, data: &[u8]) -> Result<Vec<Directive>, ImportError> {
        Ok(self.parse_bytes(filename, data)?.directives)
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedStatement, ImportError> {
        let data = std::fs::read(path)?;
        self.parse_bytes(&path.display().to_string(), &data)
    }

    pub fn parse_bytes(&self, filename: &str, data: &[u8]) -> Result<ParsedStatement, ImportError> {
        let text = decode_latin1(data);
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        let header_index = lines
            .iter()
            .position(|line| *line == HEADER)
            .ok_or(ImportError::InvalidFormat)?;
        let (preamble, table) = lines.split_at(header_index);

        let metadata = read_metadata(preamble)?;
        let state = ImporterState::from_metadata(&metadata, &self.config.currency)?;

        let mut directives = Vec::new();
        for (line, row) in read_rows(table, header_index)? {
            if row.is_pending() {
                tracing::debug!(file = filename, line, "skipping entry that is not booked yet");
                continue;
            }
            directives.push(Directive::Transaction(self.build_transaction(filename, line, &row)?));
        }
        tracing::debug!(file = filename, transactions = directives.len(), "extracted statement");

        directives.push(Directive::Balance(self.build_balance(filename, &state)));

        Ok(ParsedStatement {
            metadata,
            state,
            directives,
        })
    }

    fn build_transaction(&self, filename: &str, line: usize, row: &RawRow) -> Result<Transaction, ImportError> {
        let amount_text = Extractor::amount_text(row);
        let units = if amount_text.trim().is_empty() {
            None
        } else {
            Some(Amount::new(parse_decimal_de(amount_text)?, self.config.currency.as_str()))
        };

        let date = Extractor::booking_date(row)?;
        let narration = Extractor::purpose_text(row);
        let payee = Extractor::payee_text(row);

        let mut meta = Meta::new(filename, line);
        if let Some(code) = &self.config.meta_code {
            meta.insert(code.as_str(), Extractor::description_text(row));
        }

        let mut postings = vec![Posting::new(self.config.account.clone(), units)];
        if let Some(account) = payee.as_deref().and_then(|p| self.lookup.account_for(p)) {
            postings.push(Posting::auto(account.clone()));
        }

        Ok(Transaction {
            meta,
            date,
            flag: Flag::Cleared,
            payee,
            narration,
            tags: BTreeSet::new(),
            links: BTreeSet::new(),
            postings,
        })
    }

    fn build_balance(&self, filename: &str, state: &ImporterState) -> Balance {
        match &state.closing_balance {
            Some(closing) => Balance {
                meta: Meta::new(filename, closing.line),
                date: Some(closing.date),
                account: self.config.account.clone(),
                amount: Some(closing.amount.clone()),
            },
            None => {
                tracing::warn!(file = filename, "no closing balance in statement; balance assertion is incomplete");
                Balance {
                    meta: Meta::unanchored(filename),
                    date: None,
                    account: self.config.account.clone(),
                    amount: None,
                }
            }
        }
    }
}

fn csv_reader(lines: &[&str], has_headers: bool) -> csv::Reader<std::io::Cursor<Vec<u8>>> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(std::io::Cursor::new(lines.join("\n").into_bytes()))
}

fn record_line(record: &csv::StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

/// Preamble lines start at line 1 of the file, so csv line numbers are
/// file line numbers.
fn read_metadata(lines: &[&str]) -> Result<Metadata, ImportError> {
    let mut reader = csv_reader(lines, false);
    let mut metadata = Metadata::default();

    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let label = record.get(0).unwrap_or_default();
        let value = record.get(1).unwrap_or_default();
        metadata.insert(
            label,
            MetadataEntry {
                value: value.to_string(),
                line: record_line(&record),
            },
        );
    }

    Ok(metadata)
}

/// `lines` starts with the header, which sits at `header_index` (0-based)
/// in the file. Returns rows with their 1-based file line.
fn read_rows(lines: &[&str], header_index: usize) -> Result<Vec<(usize, RawRow)>, ImportError> {
    let mut reader = csv_reader(lines, true);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: RawRow = record.deserialize(Some(&headers))?;
        rows.push((header_index + record_line(&record), row));
    }
    Ok(rows)
}
