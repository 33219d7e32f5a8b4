use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

pub const DEFAULT_CURRENCY: &str = "EUR";

/// A decimal number tagged with a currency code.
///
/// The number keeps the scale it was parsed with, so `12.999,00` stays
/// `12999.00` rather than collapsing to `12999`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub number: Decimal,
    pub currency: String,
}

impl Amount {
    pub fn new(number: Decimal, currency: impl Into<String>) -> Self {
        Amount {
            number,
            currency: currency.into(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.number.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.number.is_sign_negative() && !self.number.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}

impl Neg for Amount {
    type Output = Self;
    fn neg(self) -> Self {
        Amount {
            number: -self.number,
            currency: self.currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn eur(s: &str) -> Amount {
        Amount::new(Decimal::from_str(s).unwrap(), DEFAULT_CURRENCY)
    }

    #[test]
    fn display_keeps_scale() {
        assert_eq!(eur("-12999.00").to_string(), "-12999.00 EUR");
        assert_eq!(eur("123.45").to_string(), "123.45 EUR");
    }

    #[test]
    fn negation_keeps_currency() {
        let negated = -eur("23.72");
        assert_eq!(negated, eur("-23.72"));
        assert!(negated.is_negative());
    }

    #[test]
    fn zero_is_not_negative() {
        let zero = eur("0.00");
        assert!(zero.is_zero());
        assert!(!zero.is_negative());
        assert!(!(-zero).is_negative());
    }

    #[test]
    fn equality_is_scale_insensitive() {
        assert_eq!(eur("12999.00"), eur("12999"));
        assert_ne!(eur("1.00"), Amount::new(Decimal::ONE, "USD"));
    }
}
