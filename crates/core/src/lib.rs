pub mod account;
pub mod amount;
pub mod directive;
pub mod period;

pub use account::{Account, AccountError, AccountType};
pub use amount::{Amount, DEFAULT_CURRENCY};
pub use directive::{Balance, Directive, Flag, Meta, Posting, Transaction};
pub use period::DateRange;
