//! Tolerant wire-side shapes for records arriving from the backend.
//!
//! Different `CallTrack` endpoints (and different backend versions) name the
//! same fields differently — `amount` vs `sum`, `createdAt` vs
//! `paymentDate`, `phoneNumber` vs `phone_number`. All aliasing is
//! absorbed here, at deserialization time, so nothing downstream needs to
//! know about backend naming inconsistencies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An identifier that may arrive as a JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Numeric identifier.
    Num(i64),
    /// String identifier.
    Text(String),
}

impl core::fmt::Display for RawId {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Num(n) => core::fmt::Display::fmt(n, f),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A single record as returned by the backend, before normalization.
///
/// Every field is optional; absent or unknown fields degrade to the
/// kind's neutral value during normalization instead of failing the load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Record identifier (`id`, `paymentId`, or `callId`).
    #[serde(default, alias = "paymentId", alias = "callId")]
    pub id: Option<RawId>,

    /// Counterparty phone number, under any of its historical names.
    #[serde(
        default,
        alias = "phoneNumber",
        alias = "phone",
        alias = "phoneId",
        alias = "msisdn"
    )]
    pub phone_number: Option<RawId>,

    /// Raw date or date-time string (`date`, `paymentDate`, `createdAt`,
    /// `startedAt`, or `startDate`).
    #[serde(
        default,
        alias = "paymentDate",
        alias = "createdAt",
        alias = "startedAt",
        alias = "startDate"
    )]
    pub date: Option<String>,

    /// Signed amount (`amount`, `sum`, `cost`, or `debt`).
    #[serde(default, alias = "sum", alias = "cost", alias = "debt")]
    pub amount: Option<f64>,

    /// Kind-specific numeric measure: call minutes or credit-minutes-used.
    #[serde(
        default,
        alias = "durationMinutes",
        alias = "duration",
        alias = "creditUsed",
        alias = "creditMinutes",
        alias = "credit_minutes"
    )]
    pub duration_minutes: Option<f64>,

    /// Payment method qualifier (`paymentMethod`, `paymentType`, or
    /// `payment_method`).
    #[serde(default, alias = "paymentMethod", alias = "paymentType")]
    pub payment_method: Option<String>,

    /// Call type qualifier.
    #[serde(default, alias = "callType", alias = "type")]
    pub call_type: Option<String>,

    /// Debtor status qualifier.
    #[serde(default)]
    pub status: Option<String>,

    /// Free-text comment.
    #[serde(default, alias = "note")]
    pub comment: Option<String>,
}

/// Response wrapper shapes accepted by the loader.
///
/// Some endpoints return a plain array, others a Spring-Data-style page
/// (`{content: [...]}`) or a keyed envelope (`{payments: [...]}`,
/// `{transactions: [...]}`). All four decode transparently.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// Plain JSON array of records.
    Items(Vec<RawRecord>),
    /// Spring Data page format.
    Content {
        /// Records of the current page.
        content: Vec<RawRecord>,
    },
    /// Payments envelope.
    Payments {
        /// Wrapped payment records.
        payments: Vec<RawRecord>,
    },
    /// Transactions envelope.
    Transactions {
        /// Wrapped transaction records.
        transactions: Vec<RawRecord>,
    },
}

impl Envelope {
    /// Unwraps the envelope into its record list.
    #[inline]
    #[must_use]
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            Self::Items(records)
            | Self::Content { content: records }
            | Self::Payments { payments: records }
            | Self::Transactions {
                transactions: records,
            } => records,
        }
    }
}

/// Payload for registering a manually-entered call.
///
/// Mirrors the admin "log a call" form; POSTed to `/api/v1/reg/call`.
/// Registering does not touch any local collection — pair it with
/// [`crate::collection::TransactionCollection::append`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCall {
    /// Caller phone number.
    pub phone_number: String,
    /// Call type (e.g. `local`, `international`).
    pub call_type: String,
    /// Call duration in minutes.
    pub duration_minutes: i64,
    /// Calendar day the call started.
    pub start_date: NaiveDate,
    /// Optional operator comment.
    pub comment: Option<String>,
}
