//! German number and date formats plus the legacy encoding used by the
//! Comdirect export.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ImportError;

pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Decode ISO-8859-1 text. Every byte maps to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Parse a `dd.mm.yyyy` date.
pub fn parse_date_de(s: &str) -> Result<NaiveDate, ImportError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| ImportError::MalformedDate(s.to_string()))
}

/// Parse a German-formatted decimal: `.` groups thousands, `,` separates
/// the fraction. The scale of the input is preserved.
pub fn parse_decimal_de(s: &str) -> Result<Decimal, ImportError> {
    let s = s.trim();
    let normalized: String = s
        .chars()
        .filter(|&c| c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    Decimal::from_str(&normalized).map_err(|_| ImportError::InvalidAmount(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ── parse_decimal_de ─────────────────────────────────────────────────────

    #[test]
    fn decimal_with_thousands_separator() {
        let n = parse_decimal_de("12.999,00").unwrap();
        assert_eq!(n, dec("12999.00"));
        assert_eq!(n.to_string(), "12999.00");
    }

    #[test]
    fn decimal_negative() {
        assert_eq!(parse_decimal_de("-23,72").unwrap(), dec("-23.72"));
    }

    #[test]
    fn decimal_several_groups() {
        assert_eq!(parse_decimal_de("1.234.567,89").unwrap(), dec("1234567.89"));
    }

    #[test]
    fn decimal_without_fraction() {
        assert_eq!(parse_decimal_de("42").unwrap(), dec("42"));
    }

    #[test]
    fn decimal_surrounding_whitespace() {
        assert_eq!(parse_decimal_de(" 123,45 ").unwrap(), dec("123.45"));
    }

    #[test]
    fn decimal_invalid() {
        assert!(matches!(parse_decimal_de(""), Err(ImportError::InvalidAmount(_))));
        assert!(matches!(
            parse_decimal_de("11.222,33 EUR"),
            Err(ImportError::InvalidAmount(s)) if s == "11.222,33 EUR"
        ));
    }

    // ── parse_date_de ────────────────────────────────────────────────────────

    #[test]
    fn date_day_month_year() {
        assert_eq!(
            parse_date_de("10.04.2022").unwrap(),
            NaiveDate::from_ymd_opt(2022, 4, 10).unwrap()
        );
    }

    #[test]
    fn date_rejects_iso_and_impossible_dates() {
        assert!(matches!(parse_date_de("2022-04-10"), Err(ImportError::MalformedDate(_))));
        assert!(matches!(parse_date_de("31.02.2022"), Err(ImportError::MalformedDate(_))));
        assert!(matches!(parse_date_de("offen"), Err(ImportError::MalformedDate(s)) if s == "offen"));
    }

    // ── decode_latin1 ────────────────────────────────────────────────────────

    #[test]
    fn latin1_umlauts() {
        let bytes = [0x55, 0x6d, 0x73, 0xe4, 0x74, 0x7a, 0x65];
        assert_eq!(decode_latin1(&bytes), "Umsätze");
        assert_eq!(decode_latin1(&[0xdc, 0x62, 0x65, 0x72, 0x74, 0x72, 0x61, 0x67]), "Übertrag");
        assert_eq!(decode_latin1(&[0x53, 0x74, 0x72, 0x61, 0xdf, 0x65]), "Straße");
    }
}
