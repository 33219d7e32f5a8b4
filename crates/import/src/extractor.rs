use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ImportError;
use crate::locale::parse_date_de;

pub const COLUMNS: [&str; 5] = [
    "Buchungstag",
    "Wertstellung (Valuta)",
    "Vorgang",
    "Buchungstext",
    "Umsatz in EUR",
];

/// The table header line exactly as it appears in the export, trailing
/// semicolon included.
pub const HEADER: &str =
    "\"Buchungstag\";\"Wertstellung (Valuta)\";\"Vorgang\";\"Buchungstext\";\"Umsatz in EUR\";";

/// `Buchungstag` value of entries that are not booked yet.
pub const PENDING_BOOKING_DAY: &str = "offen";

/// One line of the transaction table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Buchungstag")]
    pub booking_day: String,
    #[serde(rename = "Wertstellung (Valuta)", default)]
    pub value_date: String,
    #[serde(rename = "Vorgang", default)]
    pub event: String,
    #[serde(rename = "Buchungstext", default)]
    pub description: String,
    #[serde(rename = "Umsatz in EUR", default)]
    pub amount: String,
}

impl RawRow {
    pub fn is_pending(&self) -> bool {
        self.booking_day == PENDING_BOOKING_DAY
    }
}

/// Where to look for the payee inside a description. A row matches when its
/// trimmed description starts with `description_prefix` and, if set, its
/// event starts with `event_prefix`.
struct PayeeMarkers {
    description_prefix: &'static str,
    event_prefix: Option<&'static str>,
    start: &'static str,
    end: &'static str,
}

impl PayeeMarkers {
    fn matches(&self, description: &str, event: &str) -> bool {
        description.starts_with(self.description_prefix)
            && self.event_prefix.map_or(true, |prefix| event.starts_with(prefix))
    }
}

// First match wins. The last entry has an empty prefix and catches the rest.
const PAYEE_MARKERS: &[PayeeMarkers] = &[
    PayeeMarkers {
        description_prefix: "Auftraggeber",
        event_prefix: Some("Übertrag"),
        start: "Auftraggeber:",
        end: "Ref.",
    },
    PayeeMarkers {
        description_prefix: "Auftraggeber",
        event_prefix: None,
        start: "Auftraggeber:",
        end: "Buchungstext:",
    },
    PayeeMarkers {
        description_prefix: "Empfänger",
        event_prefix: None,
        start: "Empfänger:",
        end: "Kto/IBAN",
    },
    PayeeMarkers {
        description_prefix: "",
        event_prefix: None,
        start: "Buchungstext:",
        end: "Ref.",
    },
];

const PURPOSE_START: &str = "Buchungstext:";
const PURPOSE_END: &str = "Ref.";

/// Field extraction for Comdirect checking rows. Stateless.
pub struct Extractor;

impl Extractor {
    pub fn booking_date(row: &RawRow) -> Result<NaiveDate, ImportError> {
        parse_date_de(&row.booking_day)
    }

    /// The raw amount column. Empty for entries without an amount.
    pub fn amount_text(row: &RawRow) -> &str {
        &row.amount
    }

    pub fn description_text(row: &RawRow) -> &str {
        row.description.trim()
    }

    pub fn purpose_text(row: &RawRow) -> Option<String> {
        extract_between(&row.description, PURPOSE_START, PURPOSE_END)
    }

    pub fn payee_text(row: &RawRow) -> Option<String> {
        let description = Self::description_text(row);
        let markers = PAYEE_MARKERS
            .iter()
            .find(|m| m.matches(description, &row.event))?;
        extract_between(description, markers.start, markers.end)
    }
}

/// Returns the trimmed text between the first `start` and the first `end`
/// after it, or `None` if the markers do not appear in that order.
pub fn extract_between(text: &str, start: &str, end: &str) -> Option<String> {
    let from = text.find(start)? + start.len();
    let rest = &text[from..];
    let to = rest.find(end)?;
    Some(rest[..to].trim().to_string())
}
