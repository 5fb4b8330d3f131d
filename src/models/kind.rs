//! Report kind enumeration.

use serde::{Deserialize, Serialize};

/// The active report category.
///
/// The kind selects which backend collection feeds the pipeline, which
/// column layout applies on screen and in CSV exports, and whether the
/// records are date-scoped at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Call records (duration, call type, cost).
    Call,
    /// Payment records (amount, payment method).
    Payment,
    /// Debtor records (debt amount, credit minutes, status).
    Debtor,
}

impl ReportKind {
    /// Returns `true` if records of this kind carry a timestamp.
    ///
    /// Debtor records are not date-scoped; they are exempt from date-range
    /// filters and sort as the earliest possible instant under a
    /// timestamp sort.
    #[inline]
    #[must_use]
    pub const fn is_dated(self) -> bool {
        match self {
            Self::Call | Self::Payment => true,
            Self::Debtor => false,
        }
    }

    /// Ordered CSV/display column headers for this kind.
    #[inline]
    #[must_use]
    pub const fn column_headers(self) -> &'static [&'static str] {
        match self {
            Self::Call => &["Date", "Phone number", "Call type", "Minutes", "Cost"],
            Self::Payment => &["Phone number", "Date", "Amount", "Payment method"],
            Self::Debtor => &["Phone number", "Debt", "Credit minutes", "Status"],
        }
    }

    /// Lowercase name used in endpoint dispatch and export file names.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "calls",
            Self::Payment => "payments",
            Self::Debtor => "debtors",
        }
    }
}

impl core::fmt::Display for ReportKind {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
