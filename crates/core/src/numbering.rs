//! Human-readable document numbers.
//!
//! Numbers look like `WO-20260315-0042`: a prefix, the branch-local issue
//! date, and a sequence that restarts every day per prefix. The
//! sequence itself is allocated by the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minimum width of the sequence part.
pub const SEQUENCE_WIDTH: usize = 4;

/// Document kinds that carry a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentPrefix {
    /// `QT`
    Quotation,
    /// `WO`
    WorkOrder,
    /// `INV`
    Invoice,
    /// `PO`
    PurchaseOrder,
    /// `EXP`
    Expense,
}

impl DocumentPrefix {
    /// Returns the printed prefix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quotation => "QT",
            Self::WorkOrder => "WO",
            Self::Invoice => "INV",
            Self::PurchaseOrder => "PO",
            Self::Expense => "EXP",
        }
    }
}

impl std::fmt::Display for DocumentPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Formats a document number. Sequences past 9999 widen rather than wrap.
#[must_use]
pub fn format_number(prefix: DocumentPrefix, date: NaiveDate, sequence: u32) -> String {
    format!(
        "{prefix}-{}-{sequence:0width$}",
        date.format("%Y%m%d"),
        width = SEQUENCE_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[rstest]
    #[case(DocumentPrefix::Quotation, 1, "QT-20260315-0001")]
    #[case(DocumentPrefix::WorkOrder, 42, "WO-20260315-0042")]
    #[case(DocumentPrefix::Invoice, 9999, "INV-20260315-9999")]
    #[case(DocumentPrefix::PurchaseOrder, 10_000, "PO-20260315-10000")]
    #[case(DocumentPrefix::Expense, 7, "EXP-20260315-0007")]
    fn test_format_number(
        #[case] prefix: DocumentPrefix,
        #[case] sequence: u32,
        #[case] expected: &str,
    ) {
        assert_eq!(format_number(prefix, date(), sequence), expected);
    }

    #[test]
    fn test_numbers_sort_by_sequence_within_a_day() {
        let a = format_number(DocumentPrefix::WorkOrder, date(), 9);
        let b = format_number(DocumentPrefix::WorkOrder, date(), 10);
        assert!(a < b);
    }
}
