//! Canonical transaction model and wire-record normalization.

use chrono::{NaiveDate, NaiveDateTime};

use super::{RawRecord, ReportKind, TransactionId};

/// Sentinel shown for descriptive fields the backend did not supply.
const NOT_SPECIFIED: &str = "Not specified";

/// Sentinel shown for absent phone numbers and unparsable dates.
const NOT_AVAILABLE: &str = "N/A";

/// A generic report record: a call, payment, or debtor entry, unified
/// for report purposes.
///
/// Instances are produced only by [`Transaction::from_raw`] (so every
/// backend naming inconsistency is resolved exactly once) or constructed
/// directly for locally-entered records. Records are never mutated in
/// place; the report pipeline produces new views.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Identifier, unique within a collection snapshot.
    pub id: TransactionId,
    /// Record category.
    pub kind: ReportKind,
    /// Counterparty phone-number-like string; `"N/A"` when absent.
    pub subject_number: String,
    /// Chronological instant. `None` for debtor records (not date-scoped)
    /// and for dated records whose wire value failed to parse.
    pub timestamp: Option<NaiveDateTime>,
    /// Signed amount: call cost, payment sum, or debt. Always finite.
    pub amount: f64,
    /// Kind-specific numeric: call minutes or credit-minutes-used.
    pub secondary_measure: Option<f64>,
    /// Kind-specific descriptive qualifier: payment-method label, call
    /// type, or debtor status; `"Not specified"` when absent.
    pub qualifier: String,
}

impl Transaction {
    /// Normalizes a wire record into the canonical shape.
    ///
    /// Fail-soft policy: absent or malformed optional fields degrade to
    /// the kind's neutral value (0 for numerics, sentinels for strings,
    /// `None` for dates) so one bad record can never fail a load. `seq`
    /// is the record's position in the load; it backs a synthetic id when
    /// the backend omitted one, preserving per-snapshot uniqueness.
    #[must_use]
    pub fn from_raw(kind: ReportKind, raw: RawRecord, seq: usize) -> Self {
        let id = raw
            .id
            .map_or_else(|| format!("{kind}-{seq}"), |id| id.to_string());
        let subject_number = raw
            .phone_number
            .map_or_else(|| NOT_AVAILABLE.to_owned(), |p| p.to_string());
        let timestamp = if kind.is_dated() {
            raw.date.as_deref().and_then(parse_timestamp)
        } else {
            None
        };
        let qualifier = match kind {
            ReportKind::Call => non_empty(raw.call_type),
            ReportKind::Payment => payment_method_label(raw.payment_method.as_deref()),
            ReportKind::Debtor => non_empty(raw.status),
        };

        Self {
            id: TransactionId::new(id),
            kind,
            subject_number,
            timestamp,
            amount: finite_or_zero(raw.amount),
            secondary_measure: raw.duration_minutes.filter(|v| v.is_finite()),
            qualifier,
        }
    }

    /// Timestamp used for chronological ordering: records without one
    /// settle deterministically at the earliest possible instant.
    #[inline]
    #[must_use]
    pub fn sort_timestamp(&self) -> NaiveDateTime {
        self.timestamp.unwrap_or(NaiveDateTime::MIN)
    }

    /// Timestamp formatted for display and export (`DD.MM.YYYY HH:MM`),
    /// or `"N/A"` when absent.
    #[inline]
    #[must_use]
    pub fn display_timestamp(&self) -> String {
        self.timestamp.map_or_else(
            || NOT_AVAILABLE.to_owned(),
            |ts| ts.format("%d.%m.%Y %H:%M").to_string(),
        )
    }

    /// Amount formatted for display and export: a plain two-decimal
    /// number, no currency symbol.
    #[inline]
    #[must_use]
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.amount)
    }

    /// Secondary measure formatted for display and export; whole minutes.
    #[inline]
    #[must_use]
    pub fn display_secondary(&self) -> String {
        format!("{:.0}", self.secondary_measure.unwrap_or(0.0))
    }

    /// Projects the record to display cells in the same order as
    /// [`ReportKind::column_headers`].
    ///
    /// CSV export and on-screen rendering both go through here, so the
    /// exported representation always matches what was displayed.
    #[must_use]
    pub fn cells(&self) -> Vec<String> {
        match self.kind {
            ReportKind::Call => vec![
                self.display_timestamp(),
                self.subject_number.clone(),
                self.qualifier.clone(),
                self.display_secondary(),
                self.display_amount(),
            ],
            ReportKind::Payment => vec![
                self.subject_number.clone(),
                self.display_timestamp(),
                self.display_amount(),
                self.qualifier.clone(),
            ],
            ReportKind::Debtor => vec![
                self.subject_number.clone(),
                self.display_amount(),
                self.display_secondary(),
                self.qualifier.clone(),
            ],
        }
    }
}

/// Parses a wire date string into a naive instant.
///
/// Accepted shapes, in order: RFC 3339 with zone, ISO date-time without
/// zone (with or without fractional seconds), space-separated date-time,
/// bare calendar date (midnight).
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
}

/// Replaces a non-finite or absent amount with the neutral zero.
fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Returns the trimmed string, or the `"Not specified"` sentinel when
/// absent or blank.
fn non_empty(value: Option<String>) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        Some(_) | None => NOT_SPECIFIED.to_owned(),
    }
}

/// Translates a wire payment-method code into its display label.
///
/// Unknown non-empty codes pass through untouched.
fn payment_method_label(method: Option<&str>) -> String {
    let Some(raw) = method else {
        return NOT_SPECIFIED.to_owned();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NOT_SPECIFIED.to_owned();
    }
    match trimmed.to_lowercase().as_str() {
        "card" | "bank_card" => "Bank card".to_owned(),
        "transfer" | "bank_transfer" => "Bank transfer".to_owned(),
        "cash" => "Cash".to_owned(),
        _ => trimmed.to_owned(),
    }
}
