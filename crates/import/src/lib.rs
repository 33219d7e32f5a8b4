pub mod checking;
pub mod config;
pub mod error;
pub mod extractor;
pub mod locale;
pub mod rules;
pub(crate) mod util;

pub use checking::{
    CheckingImporter, ClosingBalance, ImporterState, Metadata, MetadataEntry, ParsedStatement,
};
pub use config::{ConfigError, ImporterConfig};
pub use error::ImportError;
pub use extractor::{Extractor, RawRow, HEADER};
pub use rules::{AccountLookup, MatchType, PayeeRule, PayeeRuleEngine, RuleError};

